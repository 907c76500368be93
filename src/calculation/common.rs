//! Rounding and formatting helpers shared by the calculation steps.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to whole rupees, halves away from zero.
///
/// # Examples
///
/// ```
/// use salary_tax_engine::calculation::round_rupee;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_rupee(Decimal::from_str("12500.5").unwrap()), Decimal::from(12501));
/// assert_eq!(round_rupee(Decimal::from_str("12500.49").unwrap()), Decimal::from(12500));
/// ```
pub fn round_rupee(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Rounds an amount to whole rupees and floors it at zero.
pub fn non_negative_rupees(amount: Decimal) -> Decimal {
    round_rupee(amount.max(Decimal::ZERO))
}

/// Renders an amount for an audit record.
pub(crate) fn money(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Renders a fractional rate as a percentage, e.g. `0.05` as `5%`.
pub(crate) fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}
