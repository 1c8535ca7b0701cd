//! Integration tests for the store's reference checkouts.
//!
//! Scenario A: atv, atv, atv, vga
//! - atv: one group of 3 at 73.00 each = 219.00
//! - vga: 1 unit at 30.00 = 30.00
//! - Total: 249.00
//!
//! Scenario B: atv, ipd, ipd, atv, ipd, ipd, ipd
//! - atv: 2 units, no complete group = 219.00
//! - ipd: 5 units, minimum reached, 5 at 499.99 = 2499.95
//! - Total: 2718.95

use rust_decimal::Decimal;
use testresult::TestResult;

use till::prelude::*;

const SCENARIO_A: [&str; 4] = ["atv", "atv", "atv", "vga"];
const SCENARIO_B: [&str; 7] = ["atv", "ipd", "ipd", "atv", "ipd", "ipd", "ipd"];

fn builtin() -> Result<(Catalog, PricingRuleTable), PricingError> {
    let catalog = Catalog::default_catalog();
    let rules = PricingRuleTable::default_rules(&catalog)?;

    Ok((catalog, rules))
}

#[test]
fn scenario_a_totals_249() -> TestResult {
    let (catalog, rules) = builtin()?;
    let mut checkout = Checkout::new(&catalog, &rules);

    checkout.scan_all(SCENARIO_A)?;

    assert_eq!(checkout.total()?, Decimal::new(24900, 2));

    Ok(())
}

#[test]
fn scenario_b_totals_2718_95() -> TestResult {
    let (catalog, rules) = builtin()?;
    let mut checkout = Checkout::new(&catalog, &rules);

    checkout.scan_all(SCENARIO_B)?;

    assert_eq!(checkout.total()?, Decimal::new(271895, 2));

    Ok(())
}

#[test]
fn scenario_b_scanned_one_at_a_time() -> TestResult {
    let (catalog, rules) = builtin()?;
    let mut checkout = Checkout::new(&catalog, &rules);

    let mut running = Vec::new();

    for item in SCENARIO_B {
        checkout.scan(item)?;
        running.push(checkout.total()?);
    }

    assert_eq!(
        running.last().copied(),
        Some(Decimal::new(271895, 2)),
        "final total should match the batch scan"
    );

    // Fourth ipd is still full price; the fifth drops all five to 499.99
    assert_eq!(running.get(5).copied(), Some(Decimal::new(241896, 2)));

    Ok(())
}

#[test]
fn fixture_files_match_builtin_store() -> TestResult {
    let mut fixture = Fixture::from_set("default")?;
    fixture.load_items("scenario-a")?;

    assert_eq!(fixture.checkout(None)?.total()?, Decimal::new(24900, 2));

    let (catalog, rules) = builtin()?;

    for (id, product) in catalog.iter() {
        assert_eq!(fixture.catalog()?.get(id), Some(product), "product {id}");
        assert_eq!(fixture.rules().get(id), rules.get(id), "rule for {id}");
    }

    Ok(())
}

#[test]
fn fixture_scenario_b_totals_2718_95() -> TestResult {
    let mut fixture = Fixture::from_set("default")?;
    fixture.load_items("scenario-b")?;

    let checkout = fixture.checkout(None)?;
    let receipt = checkout.receipt()?;

    assert_eq!(receipt.total(), Decimal::new(271895, 2));
    assert_eq!(receipt.savings(), Decimal::new(25000, 2));

    Ok(())
}

#[test]
fn invalid_item_is_rejected() -> TestResult {
    let (catalog, rules) = builtin()?;
    let mut checkout = Checkout::new(&catalog, &rules);

    checkout.scan_all(SCENARIO_A)?;

    assert_eq!(
        checkout.scan("abc"),
        Err(CheckoutError::InvalidItem("abc".to_string()))
    );
    assert_eq!(checkout.total()?, Decimal::new(24900, 2));

    Ok(())
}

#[test]
fn checkouts_share_one_rule_table() -> TestResult {
    let (catalog, rules) = builtin()?;

    let mut first = Checkout::new(&catalog, &rules);
    let mut second = Checkout::new(&catalog, &rules);

    first.scan_all(SCENARIO_A)?;
    second.scan_all(SCENARIO_B)?;

    assert_eq!(first.total()?, Decimal::new(24900, 2));
    assert_eq!(second.total()?, Decimal::new(271895, 2));

    Ok(())
}
