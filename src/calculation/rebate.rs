//! Section 87A rebate calculation.
//!
//! A resident individual whose taxable income does not exceed the regime's
//! threshold receives a rebate of the slab tax up to a cap. The eligibility
//! test is a hard cliff: one rupee above the threshold loses the rebate.
//!
//! Regimes that enable marginal relief soften the cliff. Just above the
//! threshold, tax after rebate may not exceed the tax payable at the
//! threshold plus the income in excess of it.

use rust_decimal::Decimal;

use super::common::{money, round_rupee};
use super::slab_tax::slab_tax;
use crate::config::{RebateRule, Slab};
use crate::models::{AuditStep, RebateOutcome};

/// The clause reference for the rebate.
pub const REBATE_CLAUSE: &str = "87A";

/// The result of applying the rebate, including marginal relief.
#[derive(Debug, Clone)]
pub struct RebateResult {
    /// Rebate eligibility and amount.
    pub rebate: RebateOutcome,
    /// Marginal relief granted above the threshold.
    pub marginal_relief: Decimal,
    /// Slab tax less the rebate and marginal relief.
    pub tax_after_rebate: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Slab tax after rebate and marginal relief, without an audit record.
///
/// Returns `(rebate, marginal_relief, tax_after_rebate)`.
pub(crate) fn rebate_components(
    taxable_income: Decimal,
    slab_tax_amount: Decimal,
    slabs: &[Slab],
    rule: &RebateRule,
) -> (Decimal, Decimal, Decimal) {
    if taxable_income <= rule.threshold {
        let rebate = slab_tax_amount.min(rule.cap).max(Decimal::ZERO);
        return (rebate, Decimal::ZERO, slab_tax_amount - rebate);
    }

    if !rule.marginal_relief {
        return (Decimal::ZERO, Decimal::ZERO, slab_tax_amount);
    }

    let at_threshold = slab_tax(rule.threshold, slabs);
    let tax_at_threshold = at_threshold - at_threshold.min(rule.cap);
    let ceiling = tax_at_threshold + round_rupee(taxable_income - rule.threshold);
    let relief = (slab_tax_amount - ceiling).max(Decimal::ZERO);
    (Decimal::ZERO, relief, slab_tax_amount - relief)
}

/// Applies the section 87A rebate to slab tax.
///
/// # Arguments
///
/// * `taxable_income` - Income the slab tax was computed on
/// * `slab_tax_amount` - Slab tax before the rebate
/// * `slabs` - The slab table, used to price tax at the threshold
/// * `rule` - The regime's rebate rule
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use salary_tax_engine::calculation::apply_rebate;
/// use salary_tax_engine::config::{RebateRule, Slab};
/// use rust_decimal::Decimal;
///
/// let slabs = vec![Slab { from: Decimal::ZERO, to: None, rate: Decimal::new(5, 2) }];
/// let rule = RebateRule {
///     threshold: Decimal::from(500_000),
///     cap: Decimal::from(12_500),
///     marginal_relief: false,
/// };
///
/// let result = apply_rebate(Decimal::from(500_000), Decimal::from(25_000), &slabs, &rule, 1);
/// assert!(result.rebate.eligible);
/// assert_eq!(result.tax_after_rebate, Decimal::from(12_500));
/// ```
pub fn apply_rebate(
    taxable_income: Decimal,
    slab_tax_amount: Decimal,
    slabs: &[Slab],
    rule: &RebateRule,
    step_number: u32,
) -> RebateResult {
    let eligible = taxable_income <= rule.threshold;
    let (amount, marginal_relief, tax_after_rebate) =
        rebate_components(taxable_income, slab_tax_amount, slabs, rule);

    let reasoning = if eligible {
        format!(
            "Taxable income ₹{} is within the ₹{} threshold: rebate of ₹{} (capped at ₹{})",
            money(taxable_income),
            money(rule.threshold),
            money(amount),
            money(rule.cap)
        )
    } else if marginal_relief > Decimal::ZERO {
        format!(
            "Taxable income ₹{} exceeds the ₹{} threshold: no rebate, marginal relief of ₹{} limits tax to ₹{}",
            money(taxable_income),
            money(rule.threshold),
            money(marginal_relief),
            money(tax_after_rebate)
        )
    } else {
        format!(
            "Taxable income ₹{} exceeds the ₹{} threshold: no rebate",
            money(taxable_income),
            money(rule.threshold)
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "rebate_87a".to_string(),
        rule_name: "Rebate under Section 87A".to_string(),
        clause_ref: REBATE_CLAUSE.to_string(),
        input: serde_json::json!({
            "taxable_income": money(taxable_income),
            "slab_tax": money(slab_tax_amount),
            "threshold": money(rule.threshold),
            "cap": money(rule.cap),
            "marginal_relief_enabled": rule.marginal_relief
        }),
        output: serde_json::json!({
            "eligible": eligible,
            "rebate": money(amount),
            "marginal_relief": money(marginal_relief),
            "tax_after_rebate": money(tax_after_rebate)
        }),
        reasoning,
    };

    RebateResult {
        rebate: RebateOutcome {
            eligible,
            amount,
            threshold: rule.threshold,
        },
        marginal_relief,
        tax_after_rebate,
        audit_step,
    }
}
