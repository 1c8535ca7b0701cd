//! Property tests for checkout pricing.

use proptest::{prelude::*, sample::select};
use rust_decimal::Decimal;

use till::prelude::*;

const ITEM_CODES: [&str; 4] = ["ipd", "mbp", "atv", "vga"];

fn item_codes() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::collection::vec(select(ITEM_CODES.to_vec()), 0..40)
}

fn total(items: &[&str]) -> Result<Decimal, TestCaseError> {
    let catalog = Catalog::default_catalog();
    let rules = PricingRuleTable::default_rules(&catalog)?;
    let mut checkout = Checkout::new(&catalog, &rules);

    checkout.scan_all(items.iter().copied())?;

    Ok(checkout.total()?)
}

proptest! {
    #[test]
    fn scan_order_does_not_change_total(
        (items, shuffled) in item_codes().prop_flat_map(|items| {
            let shuffled = Just(items.clone()).prop_shuffle();
            (Just(items), shuffled)
        })
    ) {
        prop_assert_eq!(total(&items)?, total(&shuffled)?);
    }

    #[test]
    fn one_more_unit_never_lowers_a_default_price(
        id in select(vec!["1", "2", "3", "4"]),
        quantity in 0u32..200,
    ) {
        let catalog = Catalog::default_catalog();
        let rules = PricingRuleTable::default_rules(&catalog)?;
        let product = ProductId::from(id);

        let current = rules.price(&catalog, &product, quantity)?;
        let next = rules.price(&catalog, &product, quantity + 1)?;

        prop_assert!(next >= current, "{id}: {quantity} -> {current}, +1 -> {next}");
    }

    #[test]
    fn exact_multiples_are_fully_discounted(
        size in 1u32..20,
        groups in 0u32..20,
        normal in 0i64..100_000,
        discounted in 0i64..100_000,
    ) {
        let normal = Decimal::new(normal, 2);
        let discounted = Decimal::new(discounted, 2);
        let rule = PricingRule::exact_multiple(size, normal, discounted)?;

        prop_assert_eq!(
            rule.price(groups * size),
            Some(Decimal::from(groups) * Decimal::from(size) * discounted)
        );
    }

    #[test]
    fn rules_match_normal_price_below_their_minimum(
        min in 2u32..50,
        normal in 0i64..100_000,
        discounted in 0i64..100_000,
    ) {
        let normal = Decimal::new(normal, 2);
        let discounted = Decimal::new(discounted, 2);

        let threshold = PricingRule::minimum_threshold(min, normal, discounted)?;
        let range = PricingRule::range(min, min * 2, normal, discounted)?;
        let below = min - 1;

        prop_assert_eq!(threshold.price(below), Some(Decimal::from(below) * normal));
        prop_assert_eq!(range.price(below), Some(Decimal::from(below) * normal));
    }

    #[test]
    fn total_is_sum_of_receipt_lines(items in item_codes()) {
        let catalog = Catalog::default_catalog();
        let rules = PricingRuleTable::default_rules(&catalog)?;
        let mut checkout = Checkout::new(&catalog, &rules);

        checkout.scan_all(items.iter().copied())?;

        let receipt = checkout.receipt()?;
        let lines: Decimal = receipt.lines().iter().map(|line| line.price).sum();
        let quantity: u32 = receipt.lines().iter().map(|line| line.quantity).sum();

        prop_assert_eq!(checkout.total()?, lines);
        prop_assert_eq!(usize::try_from(quantity)?, items.len());
        prop_assert!(receipt.total() <= receipt.subtotal());
    }
}
