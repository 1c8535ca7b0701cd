//! Till checkout CLI

use std::io;

use anyhow::Result;
use tracing::info;

use till::{config::TillConfig, observability};

/// Scan the configured items and print the receipt.
fn main() -> Result<()> {
    let config = TillConfig::load()?;

    observability::init_subscriber(&config.logging)?;

    let fixture = config.pricing.load()?;

    let mut checkout = fixture.checkout(None)?;
    checkout.scan_all(config.scan.iter().map(String::as_str))?;

    let receipt = checkout.receipt()?;

    info!(items = checkout.len(), total = %receipt.total(), "priced checkout");

    receipt.write_to(io::stdout().lock())?;

    Ok(())
}
