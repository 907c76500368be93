//! Capital gains taxed at special rates.
//!
//! Short-term gains on listed equity are taxed under section 111A and
//! long-term gains under section 112A, outside the slab table. The 87A
//! rebate does not apply to either.

use rust_decimal::Decimal;

use super::common::{money, non_negative_rupees, percent};
use crate::config::CapitalGainsRules;
use crate::models::AuditStep;

/// The clause reference for capital gains at special rates.
pub const CAPITAL_GAINS_CLAUSE: &str = "111A, 112A";

/// The result of taxing capital gains.
#[derive(Debug, Clone)]
pub struct CapitalGainsResult {
    /// Tax on short-term gains.
    pub stcg_tax: Decimal,
    /// Tax on long-term gains above the exemption.
    pub ltcg_tax: Decimal,
    /// Combined capital gains tax.
    pub tax: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Returns the combined tax on `stcg` and `ltcg`, rounded to the rupee.
pub fn capital_gains_tax(stcg: Decimal, ltcg: Decimal, rules: &CapitalGainsRules) -> Decimal {
    let (stcg_tax, ltcg_tax, _) = gains_components(stcg, ltcg, rules);
    stcg_tax + ltcg_tax
}

/// Returns `(stcg_tax, ltcg_tax, taxable_ltcg)` with losses treated as zero.
fn gains_components(
    stcg: Decimal,
    ltcg: Decimal,
    rules: &CapitalGainsRules,
) -> (Decimal, Decimal, Decimal) {
    let taxable_ltcg = (ltcg.max(Decimal::ZERO) - rules.ltcg_exemption).max(Decimal::ZERO);
    (
        non_negative_rupees(stcg.max(Decimal::ZERO) * rules.stcg_rate),
        non_negative_rupees(taxable_ltcg * rules.ltcg_rate),
        taxable_ltcg,
    )
}

/// Taxes short- and long-term capital gains at the year's special rates.
///
/// Losses are not set off against other income; negative gains are
/// treated as zero.
pub fn calculate_capital_gains_tax(
    stcg: Decimal,
    ltcg: Decimal,
    rules: &CapitalGainsRules,
    step_number: u32,
) -> CapitalGainsResult {
    let stcg = stcg.max(Decimal::ZERO);
    let ltcg = ltcg.max(Decimal::ZERO);
    let (stcg_tax, ltcg_tax, taxable_ltcg) = gains_components(stcg, ltcg, rules);
    let tax = stcg_tax + ltcg_tax;

    let audit_step = AuditStep {
        step_number,
        rule_id: "capital_gains".to_string(),
        rule_name: "Capital Gains at Special Rates".to_string(),
        clause_ref: CAPITAL_GAINS_CLAUSE.to_string(),
        input: serde_json::json!({
            "stcg": money(stcg),
            "ltcg": money(ltcg),
            "stcg_rate": percent(rules.stcg_rate),
            "ltcg_rate": percent(rules.ltcg_rate),
            "ltcg_exemption": money(rules.ltcg_exemption)
        }),
        output: serde_json::json!({
            "stcg_tax": money(stcg_tax),
            "taxable_ltcg": money(taxable_ltcg),
            "ltcg_tax": money(ltcg_tax),
            "tax": money(tax)
        }),
        reasoning: format!(
            "STCG ₹{} × {} = ₹{}; LTCG ₹{} above ₹{} exemption × {} = ₹{}",
            money(stcg),
            percent(rules.stcg_rate),
            money(stcg_tax),
            money(taxable_ltcg),
            money(rules.ltcg_exemption),
            percent(rules.ltcg_rate),
            money(ltcg_tax)
        ),
    };

    CapitalGainsResult {
        stcg_tax,
        ltcg_tax,
        tax,
        audit_step,
    }
}
