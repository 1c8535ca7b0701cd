//! Item Fixtures

use serde::Deserialize;

/// Wrapper for scanned items in YAML
#[derive(Debug, Deserialize)]
pub struct ItemsFixture {
    /// Item codes in scan order
    pub items: Vec<String>,
}
