//! Till configuration

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::fixtures::{Fixture, FixtureError};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Catalog, rule and item fixture settings.
#[derive(Debug, Args)]
pub struct PricingConfig {
    /// Fixture set providing the catalog and rules; the built-in store when omitted
    #[arg(short, long, env = "TILL_FIXTURE")]
    pub fixture: Option<String>,

    /// Items fixture to scan before any items given on the command line
    #[arg(short, long, env = "TILL_ITEMS")]
    pub items: Option<String>,

    /// Directory holding the fixture files
    #[arg(long, env = "TILL_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,
}

impl PricingConfig {
    /// Load the configured catalog, rules and items.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a fixture file cannot be loaded.
    pub fn load(&self) -> Result<Fixture, FixtureError> {
        let mut fixture = match &self.fixture {
            Some(name) => {
                let mut fixture = Fixture::with_base_path(&self.fixtures_dir);
                fixture.load_set(name)?;
                fixture
            }
            None => Fixture::with_defaults(&self.fixtures_dir)?,
        };

        if let Some(items) = &self.items {
            fixture.load_items(items)?;
        }

        Ok(fixture)
    }
}

/// Till checkout CLI configuration
#[derive(Debug, Parser)]
#[command(name = "till", about = "Price a checkout of scanned items", long_about = None)]
pub struct TillConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Pricing data settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Item codes to scan, in order
    pub scan: Vec<String>,
}

impl TillConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_items_and_defaults() -> TestResult {
        let config = TillConfig::try_parse_from(["till", "atv", "vga"])?;

        assert_eq!(config.scan, vec!["atv", "vga"]);
        assert_eq!(config.pricing.fixtures_dir, PathBuf::from("./fixtures"));
        assert_eq!(config.logging.log_format, LogFormat::Compact);

        Ok(())
    }

    #[test]
    fn parses_fixture_options() -> TestResult {
        let config = TillConfig::try_parse_from([
            "till",
            "--fixture",
            "default",
            "--items",
            "scenario-a",
            "--log-format",
            "json",
        ])?;

        assert_eq!(config.pricing.fixture.as_deref(), Some("default"));
        assert_eq!(config.pricing.items.as_deref(), Some("scenario-a"));
        assert_eq!(config.logging.log_format, LogFormat::Json);
        assert!(config.scan.is_empty());

        Ok(())
    }

    #[test]
    fn load_uses_builtin_store_without_fixture() -> TestResult {
        let config = TillConfig::try_parse_from(["till", "--items", "scenario-a"])?;
        let fixture = config.pricing.load()?;

        assert_eq!(fixture.checkout(None)?.total()?, Decimal::new(24900, 2));

        Ok(())
    }

    #[test]
    fn load_reads_named_fixture_set() -> TestResult {
        let config = TillConfig::try_parse_from(["till", "--fixture", "default"])?;
        let fixture = config.pricing.load()?;

        assert_eq!(fixture.rules().len(), 3);
        assert!(fixture.items().is_empty());

        Ok(())
    }
}
