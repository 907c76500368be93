//! Progressive slab-tax calculation.
//!
//! This module applies a regime's slab table to taxable income. Each slab's
//! rate applies only to the part of the income that falls inside it.

use rust_decimal::Decimal;

use super::common::{money, percent, round_rupee};
use crate::config::Slab;
use crate::models::AuditStep;

/// The result of applying a slab table, including the tax and audit step.
#[derive(Debug, Clone)]
pub struct SlabTaxResult {
    /// Tax on taxable income, in whole rupees.
    pub tax: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes slab tax on `taxable_income`, rounded to whole rupees.
///
/// Zero or negative income yields zero tax.
///
/// # Examples
///
/// ```
/// use salary_tax_engine::calculation::slab_tax;
/// use salary_tax_engine::config::Slab;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let slabs = vec![
///     Slab { from: Decimal::ZERO, to: Some(Decimal::from(250_000)), rate: Decimal::ZERO },
///     Slab { from: Decimal::from(250_000), to: None, rate: Decimal::from_str("0.05").unwrap() },
/// ];
/// assert_eq!(slab_tax(Decimal::from(500_000), &slabs), Decimal::from(12_500));
/// ```
pub fn slab_tax(taxable_income: Decimal, slabs: &[Slab]) -> Decimal {
    if taxable_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_rupee(
        slabs
            .iter()
            .map(|slab| slab.overlap(taxable_income) * slab.rate)
            .sum(),
    )
}

/// Applies a slab table to taxable income and records the per-slab split.
///
/// # Arguments
///
/// * `taxable_income` - Income after exemptions and deductions
/// * `slabs` - The slab table, already selected for the taxpayer's age
/// * `clause` - The schedule reference for the regime
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_slab_tax(
    taxable_income: Decimal,
    slabs: &[Slab],
    clause: &str,
    step_number: u32,
) -> SlabTaxResult {
    let tax = slab_tax(taxable_income, slabs);

    let brackets: Vec<serde_json::Value> = slabs
        .iter()
        .filter_map(|slab| {
            let portion = slab.overlap(taxable_income);
            (portion > Decimal::ZERO).then(|| {
                serde_json::json!({
                    "from": money(slab.from),
                    "to": slab.to.map(money),
                    "rate": percent(slab.rate),
                    "income": money(portion),
                    "tax": money(portion * slab.rate),
                })
            })
        })
        .collect();

    let reasoning = if tax.is_zero() {
        format!(
            "Taxable income ₹{} attracts no tax under the slab table",
            money(taxable_income.max(Decimal::ZERO))
        )
    } else {
        format!(
            "Taxable income ₹{} spread across {} slab(s) = ₹{}",
            money(taxable_income),
            brackets.len(),
            money(tax)
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "slab_tax".to_string(),
        rule_name: "Slab Tax".to_string(),
        clause_ref: clause.to_string(),
        input: serde_json::json!({
            "taxable_income": money(taxable_income),
            "slab_count": slabs.len()
        }),
        output: serde_json::json!({
            "brackets": brackets,
            "tax": money(tax)
        }),
        reasoning,
    };

    SlabTaxResult { tax, audit_step }
}
