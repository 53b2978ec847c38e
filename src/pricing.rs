//! Proposal arithmetic shared by the order form and the order service.
//!
//! All amounts are exact decimals. Nothing here rounds except [`round_currency`]
//! and [`format_currency`], which exist for display.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Decimal places accepted on quantities and monetary inputs.
pub const AMOUNT_SCALE: u32 = 2;

/// Lines accepted on one proposal.
pub const MAX_LINES: usize = 500;

/// Largest quantity or monetary input, `999.999.999,99`.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999, AMOUNT_SCALE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("amount is too large to compute")]
    Overflow,
}

/// Bounds a single input to what the order columns store exactly.
pub fn check_amount(value: Decimal) -> Result<(), String> {
    if value.abs() > max_amount() {
        return Err(format!("must not exceed {}", max_amount()));
    }
    if value.normalize().scale() > AMOUNT_SCALE {
        return Err(format!("must have at most {} decimal places", AMOUNT_SCALE));
    }
    Ok(())
}

/// The three inputs that price one proposal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinePricing {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Discount per unit, not per line.
    pub discount: Decimal,
}

impl LinePricing {
    pub fn new(quantity: Decimal, unit_price: Decimal, discount: Decimal) -> Self {
        Self {
            quantity,
            unit_price,
            discount,
        }
    }

    /// `(unitPrice - discount) * quantity`
    pub fn total(&self) -> Result<Decimal, PricingError> {
        self.unit_price
            .checked_sub(self.discount)
            .and_then(|net| net.checked_mul(self.quantity))
            .ok_or(PricingError::Overflow)
    }

    /// `discount * quantity`
    pub fn discount_total(&self) -> Result<Decimal, PricingError> {
        self.discount
            .checked_mul(self.quantity)
            .ok_or(PricingError::Overflow)
    }

    /// Rejects lines that cannot be priced or stored: non-positive quantity,
    /// negative amounts, or inputs outside [`check_amount`].
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("quantity", self.quantity),
            ("unitPrice", self.unit_price),
            ("discount", self.discount),
        ] {
            check_amount(value).map_err(|msg| format!("{} {}", field, msg))?;
        }
        if self.quantity <= Decimal::ZERO {
            return Err("quantity must be greater than zero".to_string());
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err("unitPrice must not be negative".to_string());
        }
        if self.discount.is_sign_negative() && !self.discount.is_zero() {
            return Err("discount must not be negative".to_string());
        }
        Ok(())
    }
}

/// Derived monetary fields of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub freight: Decimal,
    pub tax_substitution: Decimal,
    pub total_discount: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// `total = subtotal + freight + taxSubstitution - totalDiscount`
    pub fn compute<I>(
        lines: I,
        freight: Decimal,
        tax_substitution: Decimal,
    ) -> Result<Self, PricingError>
    where
        I: IntoIterator<Item = LinePricing>,
    {
        let (subtotal, total_discount) = lines.into_iter().try_fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(subtotal, discount), line| {
                Ok::<_, PricingError>((
                    checked(subtotal.checked_add(line.total()?))?,
                    checked(discount.checked_add(line.discount_total()?))?,
                ))
            },
        )?;

        let total = subtotal
            .checked_add(freight)
            .and_then(|t| t.checked_add(tax_substitution))
            .and_then(|t| t.checked_sub(total_discount));

        Ok(Self {
            subtotal,
            freight,
            tax_substitution,
            total_discount,
            total: checked(total)?,
        })
    }
}

fn checked(value: Option<Decimal>) -> Result<Decimal, PricingError> {
    value.ok_or(PricingError::Overflow)
}

/// Two decimal places, midpoint away from zero.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Brazilian real formatting, e.g. `R$ 1.234,56`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_currency(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{}", if negative { "-" } else { "" }, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_total_nets_per_unit_discount() {
        let line = LinePricing::new(dec!(3), dec!(45), dec!(5));
        assert_eq!(line.total(), Ok(dec!(120)));
        assert_eq!(line.discount_total(), Ok(dec!(15)));
    }

    #[test]
    fn reference_proposal_totals() {
        let lines = [
            LinePricing::new(dec!(3), dec!(45), dec!(0)),
            LinePricing::new(dec!(9), dec!(49), dec!(0)),
        ];
        let totals = OrderTotals::compute(lines, dec!(200), dec!(0)).unwrap();
        assert_eq!(totals.subtotal, dec!(576));
        assert_eq!(totals.total_discount, dec!(0));
        assert_eq!(totals.total, dec!(776));
    }

    #[test]
    fn empty_proposal_is_all_zero() {
        let totals = OrderTotals::compute(Vec::new(), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(totals, Ok(OrderTotals::default()));
    }

    #[test]
    fn discounts_are_subtracted_from_grand_total() {
        let lines = [LinePricing::new(dec!(2), dec!(10), dec!(1))];
        let totals = OrderTotals::compute(lines, dec!(5), dec!(3)).unwrap();
        assert_eq!(totals.subtotal, dec!(18));
        assert_eq!(totals.total_discount, dec!(2));
        assert_eq!(totals.total, dec!(24));
    }

    #[test]
    fn decimal_arithmetic_does_not_drift() {
        let lines = std::iter::repeat(LinePricing::new(dec!(1), dec!(0.1), dec!(0))).take(10);
        let totals = OrderTotals::compute(lines, Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(totals.subtotal, dec!(1.0));
    }

    #[test]
    fn validation_rejects_unpriceable_lines() {
        assert!(LinePricing::new(dec!(0), dec!(10), dec!(0)).validate().is_err());
        assert!(LinePricing::new(dec!(1), dec!(-1), dec!(0)).validate().is_err());
        assert!(LinePricing::new(dec!(1), dec!(10), dec!(-0.5)).validate().is_err());
        assert!(LinePricing::new(dec!(0.5), dec!(0), dec!(0)).validate().is_ok());
    }

    #[test]
    fn validation_rejects_amounts_the_columns_cannot_hold() {
        assert!(LinePricing::new(dec!(1.25), dec!(10.01), dec!(0)).validate().is_ok());
        assert!(LinePricing::new(dec!(1.250), dec!(10.10), dec!(0)).validate().is_ok());
        assert!(LinePricing::new(dec!(1.255), dec!(10), dec!(0)).validate().is_err());
        assert!(LinePricing::new(dec!(1), dec!(10.001), dec!(0)).validate().is_err());
        let huge = dec!(1000000000000000);
        assert!(LinePricing::new(huge, huge, dec!(0)).validate().is_err());
        assert!(LinePricing::new(max_amount(), max_amount(), dec!(0)).validate().is_ok());
    }

    #[test]
    fn overflow_is_an_error_not_a_panic() {
        let huge = LinePricing::new(Decimal::MAX, Decimal::MAX, dec!(0));
        assert_eq!(huge.total(), Err(PricingError::Overflow));
        assert_eq!(
            LinePricing::new(Decimal::MAX, dec!(1), Decimal::MIN).total(),
            Err(PricingError::Overflow)
        );
        assert_eq!(
            OrderTotals::compute([huge], dec!(0), dec!(0)),
            Err(PricingError::Overflow)
        );

        let line = LinePricing::new(dec!(1), Decimal::MAX, dec!(0));
        assert_eq!(
            OrderTotals::compute([line], Decimal::MAX, dec!(0)),
            Err(PricingError::Overflow)
        );
    }

    #[test]
    fn bounded_inputs_never_overflow() {
        let line = LinePricing::new(max_amount(), max_amount(), dec!(0));
        let lines = std::iter::repeat(line).take(MAX_LINES);
        assert!(OrderTotals::compute(lines, max_amount(), max_amount()).is_ok());
    }

    #[test]
    fn currency_display_rounds_half_away_from_zero() {
        assert_eq!(round_currency(dec!(2.345)), dec!(2.35));
        assert_eq!(round_currency(dec!(-2.345)), dec!(-2.35));
        assert_eq!(format_currency(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_currency(dec!(776)), "R$ 776,00");
        assert_eq!(format_currency(dec!(1234567.891)), "R$ 1.234.567,89");
        assert_eq!(format_currency(dec!(-0.004)), "R$ 0,00");
        assert_eq!(format_currency(dec!(-15)), "-R$ 15,00");
    }
}
