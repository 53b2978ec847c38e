//! Property-based tests for proposal pricing and the order form.
//!
//! Amounts are generated in cents so every value is an exact two-place decimal.

use chrono::Utc;
use enerlight_api::{
    client::OrderForm,
    models::ProductResponse,
    pricing::{format_currency, round_currency, LinePricing, OrderTotals},
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

fn money_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn line_strategy() -> impl Strategy<Value = LinePricing> {
    (quantity_strategy(), money_strategy(), money_strategy())
        .prop_map(|(quantity, unit_price, discount)| {
            LinePricing::new(quantity, unit_price, discount)
        })
}

fn product(convention_price: Decimal) -> ProductResponse {
    ProductResponse {
        id: Uuid::new_v4(),
        code: format!("P-{}", Uuid::new_v4().simple()),
        name: "Produto".into(),
        description: None,
        cost_price: Decimal::ZERO,
        sale_price: convention_price,
        convention_price,
        unit: "PC".into(),
        image_url: None,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn totals_follow_their_definitions(
        lines in prop::collection::vec(line_strategy(), 0..20),
        freight in money_strategy(),
        tax in money_strategy(),
    ) {
        let totals = OrderTotals::compute(lines.iter().copied(), freight, tax).unwrap();

        let subtotal: Decimal = lines.iter().map(|l| (l.unit_price - l.discount) * l.quantity).sum();
        let discount: Decimal = lines.iter().map(|l| l.discount * l.quantity).sum();

        prop_assert_eq!(totals.subtotal, subtotal);
        prop_assert_eq!(totals.total_discount, discount);
        prop_assert_eq!(totals.total, subtotal + freight + tax - discount);
        prop_assert_eq!(totals.freight, freight);
        prop_assert_eq!(totals.tax_substitution, tax);
    }

    #[test]
    fn line_order_does_not_change_totals(
        mut lines in prop::collection::vec(line_strategy(), 1..12),
        freight in money_strategy(),
    ) {
        let forward = OrderTotals::compute(lines.iter().copied(), freight, Decimal::ZERO);
        lines.reverse();
        let backward = OrderTotals::compute(lines.iter().copied(), freight, Decimal::ZERO);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn two_place_inputs_fit_the_line_total_column(line in line_strategy()) {
        // quantity and prices carry two places each, so a line total has at most four
        prop_assert!(line.validate().is_ok());
        let total = line.total().unwrap();
        prop_assert!(total.normalize().scale() <= 4);
        prop_assert!(total.abs() < Decimal::from(10u64.pow(18)));
    }

    #[test]
    fn arithmetic_never_panics(
        quantity in any::<i64>(),
        unit_price in any::<i64>(),
        discount in any::<i64>(),
        scale in 0u32..28,
    ) {
        let line = LinePricing::new(
            Decimal::new(quantity, scale),
            Decimal::from(unit_price) * Decimal::from(u32::MAX),
            Decimal::from(discount),
        );
        let _ = line.total();
        let _ = OrderTotals::compute([line, line, line], Decimal::MAX, Decimal::MAX);
    }

    #[test]
    fn currency_rounding_is_idempotent(value in (-10_000_000i64..10_000_000, 0u32..6)) {
        let amount = Decimal::new(value.0, value.1);
        let once = round_currency(amount);
        prop_assert_eq!(round_currency(once), once);
        prop_assert!((once - amount).abs() <= Decimal::new(5, 3));
        prop_assert!(format_currency(amount).contains("R$ "));
    }

    #[test]
    fn order_form_matches_server_pricing(
        edits in prop::collection::vec((money_strategy(), quantity_strategy(), money_strategy()), 1..10),
        freight in money_strategy(),
    ) {
        let mut form = OrderForm::new();
        form.freight = freight;
        let mut expected = Vec::new();

        for (convention, quantity, discount) in edits {
            let idx = form.add_line(&product(convention));
            form.set_quantity(idx, quantity).unwrap();
            form.set_discount(idx, discount).unwrap();
            expected.push(LinePricing::new(quantity, convention, discount));
        }

        for (line, pricing) in form.lines().iter().zip(&expected) {
            prop_assert_eq!(Ok(line.total), pricing.total());
        }
        prop_assert_eq!(form.totals(), OrderTotals::compute(expected, freight, Decimal::ZERO));

        let payload = form.to_payload();
        let from_payload = OrderTotals::compute(
            payload.items.iter().map(|item| item.pricing()),
            payload.freight,
            payload.tax_substitution,
        );
        prop_assert_eq!(from_payload, form.totals());
    }
}
