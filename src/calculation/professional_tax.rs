//! State professional tax.
//!
//! Professional tax is levied by states on salaried employment under
//! Article 276 of the Constitution, which caps it at ₹2,500 a year. Each
//! state's schedule is a slab table applied to salary per levy period
//! (monthly for most states, half-yearly for some).

use rust_decimal::Decimal;

use super::common::{money, round_rupee};
use crate::config::{ProfessionalTaxTable, StateProfessionalTax};
use crate::models::AuditStep;

/// The clause reference for professional tax.
pub const PROFESSIONAL_TAX_CLAUSE: &str = "Article 276(2)";

/// Constitutional ceiling on annual professional tax.
pub const PROFESSIONAL_TAX_CEILING: Decimal = Decimal::from_parts(2500, 0, 0, false, 0);

/// The result of calculating annual professional tax.
#[derive(Debug, Clone)]
pub struct ProfessionalTaxResult {
    /// Normalized key of the matched state, if any.
    pub state: Option<String>,
    /// Annual professional tax.
    pub annual: Decimal,
    /// Whether the statutory ceiling reduced the amount.
    pub capped: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Looks up and applies state professional-tax schedules.
///
/// # Example
///
/// ```
/// use salary_tax_engine::calculation::ProfessionalTaxCalculator;
/// use salary_tax_engine::config::RulesFetcher;
/// use rust_decimal::Decimal;
///
/// let fetcher = RulesFetcher::builtin().unwrap();
/// let rules = fetcher.fetch_rules_for_fy("2025-26").rules;
/// let calculator = ProfessionalTaxCalculator::new(&rules.professional_tax);
///
/// let result = calculator.calculate("Maharashtra", Decimal::from(300_000), 1);
/// assert_eq!(result.annual, Decimal::from(2_500));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProfessionalTaxCalculator<'a> {
    table: &'a ProfessionalTaxTable,
}

impl<'a> ProfessionalTaxCalculator<'a> {
    /// Creates a calculator over a year's professional-tax table.
    pub fn new(table: &'a ProfessionalTaxTable) -> Self {
        Self { table }
    }

    /// Calculates annual professional tax for a state and annual gross salary.
    ///
    /// Unknown or empty states, and non-positive salaries, yield zero. The
    /// result never exceeds the table's statutory maximum or the
    /// constitutional ceiling.
    pub fn calculate(&self, state: &str, annual_gross: Decimal, step_number: u32) -> ProfessionalTaxResult {
        let Some((key, schedule)) = self.lookup(state) else {
            let reasoning = if state.trim().is_empty() {
                "No state given: professional tax not applied".to_string()
            } else {
                format!("No professional-tax schedule for '{}': treated as ₹0", state.trim())
            };
            return ProfessionalTaxResult {
                state: None,
                annual: Decimal::ZERO,
                capped: false,
                audit_step: self.audit_step(step_number, state, annual_gross, None, Decimal::ZERO, reasoning),
            };
        };

        let periods = Decimal::from(12 / schedule.period_months.max(1));
        let period_income = annual_gross.max(Decimal::ZERO) / periods;
        let slab = schedule
            .slabs
            .iter()
            .rev()
            .find(|slab| period_income > slab.above);

        let uncapped = match slab {
            Some(slab) => slab.amount * periods + schedule.annual_adjustment,
            None => Decimal::ZERO,
        };
        let ceiling = self.table.statutory_max_annual.min(PROFESSIONAL_TAX_CEILING);
        let annual = round_rupee(uncapped.min(ceiling).max(Decimal::ZERO));
        let capped = uncapped > ceiling;

        let reasoning = match slab {
            Some(slab) => format!(
                "{}: ₹{} per {}-month period above ₹{} × {} periods{} = ₹{}{}",
                schedule.name,
                money(slab.amount),
                schedule.period_months,
                money(slab.above),
                periods,
                if schedule.annual_adjustment.is_zero() {
                    String::new()
                } else {
                    format!(" + ₹{} annual adjustment", money(schedule.annual_adjustment))
                },
                money(annual),
                if capped { " (capped)" } else { "" }
            ),
            None => format!(
                "{}: period income ₹{} is below every slab, no professional tax",
                schedule.name,
                money(round_rupee(period_income))
            ),
        };

        ProfessionalTaxResult {
            state: Some(key.to_string()),
            annual,
            capped,
            audit_step: self.audit_step(step_number, state, annual_gross, Some(key), annual, reasoning),
        }
    }

    fn lookup(&self, state: &str) -> Option<(&'a str, &'a StateProfessionalTax)> {
        let schedule = self.table.find_state(state)?;
        self.table
            .states
            .iter()
            .find(|(_, candidate)| std::ptr::eq(*candidate, schedule))
            .map(|(key, schedule)| (key.as_str(), schedule))
    }

    fn audit_step(
        &self,
        step_number: u32,
        state: &str,
        annual_gross: Decimal,
        matched: Option<&str>,
        annual: Decimal,
        reasoning: String,
    ) -> AuditStep {
        AuditStep {
            step_number,
            rule_id: "professional_tax".to_string(),
            rule_name: "State Professional Tax".to_string(),
            clause_ref: PROFESSIONAL_TAX_CLAUSE.to_string(),
            input: serde_json::json!({
                "state": state,
                "annual_gross": money(annual_gross)
            }),
            output: serde_json::json!({
                "matched_state": matched,
                "annual": money(annual)
            }),
            reasoning,
        }
    }
}
