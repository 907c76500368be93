//! Surcharge on income tax for high incomes, with marginal relief.
//!
//! The surcharge band is chosen by gross income: the highest band whose
//! threshold the income strictly exceeds. Marginal relief ensures that
//! crossing a band threshold never costs more in tax and surcharge than the
//! income earned above the threshold.

use rust_decimal::Decimal;

use super::common::{money, non_negative_rupees, percent, round_rupee};
use crate::config::RegimeRules;
use crate::models::{AuditStep, SurchargeOutcome};

/// The clause reference for the surcharge.
pub const SURCHARGE_CLAUSE: &str = "Finance Act, First Schedule Part I";

/// The result of levying surcharge.
#[derive(Debug, Clone)]
pub struct SurchargeResult {
    /// Surcharge amount, rate and marginal relief.
    pub surcharge: SurchargeOutcome,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Levies surcharge on `base_tax` and applies marginal relief.
///
/// # Arguments
///
/// * `gross_income` - Income used to select the surcharge band
/// * `base_tax` - Tax after rebate, including capital gains tax
/// * `regime` - The regime whose surcharge bands apply
/// * `tax_below_by` - Returns the base tax that would be payable if gross
///   income were lower by the given amount
/// * `step_number` - The step number for audit trail sequencing
///
/// # Marginal relief
///
/// With `T` the band threshold and `E` the income above it, tax plus
/// surcharge is capped at the tax payable on `T` (with the previous band's
/// surcharge) plus `E`. Relief never exceeds the surcharge itself.
pub fn calculate_surcharge<F>(
    gross_income: Decimal,
    base_tax: Decimal,
    regime: &RegimeRules,
    tax_below_by: F,
    step_number: u32,
) -> SurchargeResult
where
    F: Fn(Decimal) -> Decimal,
{
    let Some((index, band)) = regime.surcharge_band(gross_income) else {
        let audit_step = AuditStep {
            step_number,
            rule_id: "surcharge".to_string(),
            rule_name: "Surcharge".to_string(),
            clause_ref: SURCHARGE_CLAUSE.to_string(),
            input: serde_json::json!({
                "gross_income": money(gross_income),
                "base_tax": money(base_tax)
            }),
            output: serde_json::json!({
                "rate": "0%",
                "surcharge": "0"
            }),
            reasoning: format!(
                "Gross income ₹{} does not exceed the lowest surcharge threshold",
                money(gross_income)
            ),
        };
        return SurchargeResult {
            surcharge: SurchargeOutcome {
                amount: Decimal::ZERO,
                rate: Decimal::ZERO,
                marginal_relief: Decimal::ZERO,
            },
            audit_step,
        };
    };

    let gross_surcharge = non_negative_rupees(base_tax * band.rate);

    let excess = gross_income - band.above;
    let previous_rate = index
        .checked_sub(1)
        .and_then(|previous| regime.surcharge.get(previous))
        .map_or(Decimal::ZERO, |previous| previous.rate);
    let tax_at_threshold = tax_below_by(excess).max(Decimal::ZERO);
    let ceiling = round_rupee(tax_at_threshold * (Decimal::ONE + previous_rate) + excess);
    let marginal_relief = (base_tax + gross_surcharge - ceiling)
        .max(Decimal::ZERO)
        .min(gross_surcharge);
    let amount = gross_surcharge - marginal_relief;

    let reasoning = if marginal_relief > Decimal::ZERO {
        format!(
            "Gross income ₹{} exceeds ₹{}: {} surcharge of ₹{} reduced by marginal relief of ₹{} to ₹{}",
            money(gross_income),
            money(band.above),
            percent(band.rate),
            money(gross_surcharge),
            money(marginal_relief),
            money(amount)
        )
    } else {
        format!(
            "Gross income ₹{} exceeds ₹{}: ₹{} × {} = ₹{}",
            money(gross_income),
            money(band.above),
            money(base_tax),
            percent(band.rate),
            money(amount)
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "surcharge".to_string(),
        rule_name: "Surcharge".to_string(),
        clause_ref: SURCHARGE_CLAUSE.to_string(),
        input: serde_json::json!({
            "gross_income": money(gross_income),
            "base_tax": money(base_tax),
            "threshold": money(band.above)
        }),
        output: serde_json::json!({
            "rate": percent(band.rate),
            "gross_surcharge": money(gross_surcharge),
            "tax_at_threshold": money(tax_at_threshold),
            "marginal_relief": money(marginal_relief),
            "surcharge": money(amount)
        }),
        reasoning,
    };

    SurchargeResult {
        surcharge: SurchargeOutcome {
            amount,
            rate: band.rate,
            marginal_relief,
        },
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::slab_tax::slab_tax;
    use crate::config::builtin_rules;
    use crate::models::RegimeId;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Surcharge for a taxpayer whose whole gross income is taxable.
    fn surcharge_on(income: &str, regime: RegimeId) -> SurchargeResult {
        let rules = builtin_rules("2025-26");
        let regime = rules.regime(regime).unwrap();
        let income = dec(income);
        let tax = |income: Decimal| slab_tax(income, &regime.slabs);
        calculate_surcharge(income, tax(income), regime, |excess| tax(income - excess), 4)
    }

    #[test]
    fn test_no_surcharge_at_threshold() {
        let result = surcharge_on("5000000", RegimeId::Old);
        assert_eq!(result.surcharge.amount, Decimal::ZERO);
        assert_eq!(result.surcharge.rate, Decimal::ZERO);
    }

    #[test]
    fn test_ten_percent_band() {
        let result = surcharge_on("8000000", RegimeId::Old);
        // 10% of (112,500 + 30% of 7,000,000)
        assert_eq!(result.surcharge.rate, dec("0.10"));
        assert_eq!(result.surcharge.amount, dec("221250"));
        assert_eq!(result.surcharge.marginal_relief, Decimal::ZERO);
    }

    #[test]
    fn test_marginal_relief_just_above_first_threshold() {
        let result = surcharge_on("5010000", RegimeId::Old);
        // Tax 1,315,500; surcharge 131,550; ceiling 1,312,500 + 10,000.
        assert_eq!(result.surcharge.marginal_relief, dec("124550"));
        assert_eq!(result.surcharge.amount, dec("7000"));
    }

    #[test]
    fn test_marginal_relief_uses_previous_band_rate() {
        let result = surcharge_on("10000100", RegimeId::Old);
        // Tax at 1 crore is 2,812,500 with 10% surcharge: ceiling 3,093,850.
        let base = dec("2812530");
        assert_eq!(result.surcharge.rate, dec("0.15"));
        assert_eq!(base + result.surcharge.amount, dec("3093850"));
    }

    #[test]
    fn test_new_regime_caps_at_twenty_five_percent() {
        let result = surcharge_on("100000000", RegimeId::New);
        assert_eq!(result.surcharge.rate, dec("0.25"));
    }

    #[test]
    fn test_old_regime_top_band() {
        let result = surcharge_on("100000000", RegimeId::Old);
        assert_eq!(result.surcharge.rate, dec("0.37"));
        assert!(result.surcharge.amount > Decimal::ZERO);
    }

    #[test]
    fn test_zero_tax_has_zero_surcharge() {
        let rules = builtin_rules("2025-26");
        let regime = rules.regime(RegimeId::Old).unwrap();
        let result = calculate_surcharge(dec("60000000"), Decimal::ZERO, regime, |_| Decimal::ZERO, 1);
        assert_eq!(result.surcharge.amount, Decimal::ZERO);
        assert_eq!(result.surcharge.marginal_relief, Decimal::ZERO);
    }
}
