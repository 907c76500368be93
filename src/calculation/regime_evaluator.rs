//! Evaluation of a single tax regime.
//!
//! [`RegimeEvaluator`] turns a salary profile, its exemptions and
//! deductions, and the year's professional tax into a [`RegimeResult`]. The
//! evaluation is generic: every difference between regimes comes from the
//! regime's rules (slab table, rebate rule, surcharge bands, allowances).

use rust_decimal::Decimal;
use tracing::debug;

use super::capital_gains::{calculate_capital_gains_tax, capital_gains_tax};
use super::cess::calculate_cess;
use super::common::{money, non_negative_rupees, round_rupee};
use super::deductions::DeductionResult;
use super::professional_tax::ProfessionalTaxResult;
use super::rebate::{apply_rebate, rebate_components};
use super::slab_tax::{calculate_slab_tax, slab_tax};
use super::surcharge::calculate_surcharge;
use crate::config::TaxRules;
use crate::models::{
    AuditStep, EmployeeContributions, EmployerContributions, IncomeTaxBreakdown, RegimeId,
    RegimeResult, SalaryProfile,
};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Evaluates regimes against one financial year's rules.
///
/// # Example
///
/// ```
/// use salary_tax_engine::calculation::{
///     DeductionCalculator, ProfessionalTaxCalculator, RegimeEvaluator,
/// };
/// use salary_tax_engine::config::RulesFetcher;
/// use salary_tax_engine::models::{RegimeId, SalaryProfile};
/// use rust_decimal::Decimal;
///
/// let rules = RulesFetcher::builtin().unwrap().fetch_rules_for_fy("2025-26").rules;
/// let profile = SalaryProfile {
///     basic: Decimal::from(1_275_000),
///     ..SalaryProfile::default()
/// };
///
/// let pt = ProfessionalTaxCalculator::new(&rules.professional_tax)
///     .calculate(&profile.state, profile.gross_salary(), 1);
/// let regime = rules.regime(RegimeId::NewPost2025).unwrap();
/// let deductions = DeductionCalculator::new(&rules).calculate(&profile, regime, pt.annual, 2);
///
/// let result = RegimeEvaluator::new(&rules)
///     .evaluate(RegimeId::NewPost2025, &profile, &deductions, &pt)
///     .unwrap();
/// assert_eq!(result.taxable_income, Decimal::from(1_200_000));
/// assert!(result.income_tax.rebate.eligible);
/// assert_eq!(result.income_tax.total, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RegimeEvaluator<'a> {
    rules: &'a TaxRules,
}

impl<'a> RegimeEvaluator<'a> {
    /// Creates an evaluator for a year's rules.
    pub fn new(rules: &'a TaxRules) -> Self {
        Self { rules }
    }

    /// Evaluates `regime`, returning `None` if the year does not model it.
    ///
    /// The audit trace starts with the professional-tax step, continues
    /// with the deduction steps and ends with the tax computation, numbered
    /// from 1.
    pub fn evaluate(
        &self,
        regime: RegimeId,
        profile: &SalaryProfile,
        deductions: &DeductionResult,
        professional_tax: &ProfessionalTaxResult,
    ) -> Option<RegimeResult> {
        let regime_rules = self.rules.regime(regime)?;

        let mut trace: Vec<AuditStep> = Vec::with_capacity(deductions.audit_steps.len() + 8);
        trace.push(professional_tax.audit_step.clone());
        trace.extend(deductions.audit_steps.iter().cloned());
        let step = |trace: &Vec<AuditStep>| trace.len() as u32 + 1;

        let gross_salary = profile.gross_salary();
        let gross_income = profile.gross_income();
        let breakdown = deductions.breakdown.clone();
        let taxable_income =
            non_negative_rupees(profile.slab_income() - breakdown.total_reductions());

        let slabs = regime_rules.slabs_for_age(profile.age);
        let slab = calculate_slab_tax(taxable_income, slabs, &regime_rules.clause, step(&trace));
        trace.push(slab.audit_step);

        let rebate = apply_rebate(
            taxable_income,
            slab.tax,
            slabs,
            &regime_rules.rebate,
            step(&trace),
        );
        trace.push(rebate.audit_step);

        let gains = calculate_capital_gains_tax(
            profile.stcg,
            profile.ltcg,
            &self.rules.capital_gains,
            step(&trace),
        );
        trace.push(gains.audit_step);

        let base_tax = rebate.tax_after_rebate + gains.tax;
        // The excess comes off slab income first, then short- and long-term gains.
        let stcg = profile.stcg.max(Decimal::ZERO);
        let ltcg = profile.ltcg.max(Decimal::ZERO);
        let tax_below_by = |excess: Decimal| {
            let from_slab = excess.max(Decimal::ZERO).min(taxable_income);
            let from_stcg = (excess - from_slab).max(Decimal::ZERO).min(stcg);
            let from_ltcg = (excess - from_slab - from_stcg).max(Decimal::ZERO).min(ltcg);

            let reduced = taxable_income - from_slab;
            let reduced_slab_tax = slab_tax(reduced, slabs);
            let (_, _, after_rebate) =
                rebate_components(reduced, reduced_slab_tax, slabs, &regime_rules.rebate);
            after_rebate
                + capital_gains_tax(stcg - from_stcg, ltcg - from_ltcg, &self.rules.capital_gains)
        };
        let surcharge = calculate_surcharge(
            gross_income,
            base_tax,
            regime_rules,
            tax_below_by,
            step(&trace),
        );
        trace.push(surcharge.audit_step);

        let cess = calculate_cess(
            base_tax + surcharge.surcharge.amount,
            self.rules.cess_rate,
            step(&trace),
        );
        trace.push(cess.audit_step);

        let total = base_tax + surcharge.surcharge.amount + cess.cess;

        let employee_contributions = EmployeeContributions {
            pf: non_negative_rupees(profile.employee_pf()),
            nps: non_negative_rupees(profile.nps_employee),
        };
        let employer_pf = non_negative_rupees(profile.employer_pf());
        let employer_nps = non_negative_rupees(profile.nps_employer);
        let employer_contributions = EmployerContributions {
            pf: employer_pf,
            nps: employer_nps,
            cost_to_company: round_rupee(gross_salary + employer_pf + employer_nps),
        };

        let take_home = round_rupee(
            gross_salary
                - total
                - professional_tax.annual
                - employee_contributions.pf
                - employee_contributions.nps,
        );
        let monthly_take_home = round_rupee(take_home / MONTHS_PER_YEAR);
        let effective_rate = if gross_income > Decimal::ZERO {
            (total / gross_income * Decimal::ONE_HUNDRED)
                .round_dp(2)
                .normalize()
        } else {
            Decimal::ZERO
        };

        trace.push(AuditStep {
            step_number: step(&trace),
            rule_id: "take_home".to_string(),
            rule_name: "Take-home Pay".to_string(),
            clause_ref: regime_rules.clause.clone(),
            input: serde_json::json!({
                "gross_salary": money(gross_salary),
                "income_tax": money(total),
                "professional_tax": money(professional_tax.annual),
                "employee_pf": money(employee_contributions.pf),
                "employee_nps": money(employee_contributions.nps)
            }),
            output: serde_json::json!({
                "take_home": money(take_home),
                "monthly_take_home": money(monthly_take_home),
                "effective_rate": money(effective_rate)
            }),
            reasoning: format!(
                "₹{} gross less ₹{} income tax, ₹{} professional tax and ₹{} contributions = ₹{}",
                money(gross_salary),
                money(total),
                money(professional_tax.annual),
                money(employee_contributions.pf + employee_contributions.nps),
                money(take_home)
            ),
        });

        for (index, audit_step) in trace.iter_mut().enumerate() {
            audit_step.step_number = index as u32 + 1;
        }

        debug!(
            regime = %regime,
            taxable_income = %taxable_income,
            total_tax = %total,
            "Evaluated regime"
        );

        Some(RegimeResult {
            regime,
            label: regime_rules.label.clone(),
            gross_salary,
            gross_income,
            taxable_income,
            income_tax: IncomeTaxBreakdown {
                slab_tax: slab.tax,
                rebate: rebate.rebate,
                marginal_relief: rebate.marginal_relief,
                capital_gains_tax: gains.tax,
                surcharge: surcharge.surcharge,
                cess: cess.cess,
                total,
            },
            professional_tax: professional_tax.annual,
            breakdown,
            employee_contributions,
            employer_contributions,
            take_home,
            monthly_take_home,
            effective_rate,
            audit_trace: trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{DeductionCalculator, ProfessionalTaxCalculator};
    use crate::config::builtin_rules;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn profile(basic: &str) -> SalaryProfile {
        SalaryProfile {
            basic: dec(basic),
            ..SalaryProfile::default()
        }
    }

    fn evaluate_in(fy: &str, regime: RegimeId, profile: &SalaryProfile) -> Option<RegimeResult> {
        let rules = builtin_rules(fy);
        let pt = ProfessionalTaxCalculator::new(&rules.professional_tax).calculate(
            &profile.state,
            profile.gross_salary(),
            1,
        );
        let regime_rules = rules.regime(regime)?;
        let deductions =
            DeductionCalculator::new(&rules).calculate(profile, regime_rules, pt.annual, 2);
        RegimeEvaluator::new(&rules).evaluate(regime, profile, &deductions, &pt)
    }

    fn evaluate(regime: RegimeId, profile: &SalaryProfile) -> RegimeResult {
        evaluate_in("2025-26", regime, profile).unwrap()
    }

    #[test]
    fn test_old_regime_rebate_cliff() {
        // Standard deduction of 50,000 leaves taxable income at the threshold.
        let at = evaluate(RegimeId::Old, &profile("550000"));
        assert_eq!(at.taxable_income, dec("500000"));
        assert!(at.income_tax.rebate.eligible);
        assert_eq!(at.income_tax.total, Decimal::ZERO);

        let above = evaluate(RegimeId::Old, &profile("550001"));
        assert_eq!(above.taxable_income, dec("500001"));
        assert!(!above.income_tax.rebate.eligible);
        assert_eq!(above.income_tax.slab_tax, dec("12500"));
        assert_eq!(above.income_tax.cess, dec("500"));
        assert_eq!(above.income_tax.total, dec("13000"));
    }

    #[test]
    fn test_new_regime_partial_rebate_at_threshold() {
        let result = evaluate(RegimeId::New, &profile("1275000"));
        assert_eq!(result.taxable_income, dec("1200000"));
        assert!(result.income_tax.rebate.eligible);
        assert_eq!(result.income_tax.slab_tax, dec("80000"));
        assert_eq!(result.income_tax.rebate.amount, dec("25000"));
        // 55,000 plus 4% cess
        assert_eq!(result.income_tax.total, dec("57200"));
    }

    #[test]
    fn test_post_2025_marginal_relief_one_rupee_above_threshold() {
        let result = evaluate(RegimeId::NewPost2025, &profile("1275001"));
        assert!(!result.income_tax.rebate.eligible);
        assert_eq!(result.income_tax.slab_tax, dec("60000"));
        assert_eq!(result.income_tax.marginal_relief, dec("59999"));
        assert_eq!(result.income_tax.total, dec("1"));
    }

    #[test]
    fn test_zero_and_negative_salary_pay_no_tax() {
        for basic in ["0", "-100000"] {
            for regime in RegimeId::ALL {
                let result = evaluate(regime, &profile(basic));
                assert_eq!(result.taxable_income, Decimal::ZERO);
                assert_eq!(result.income_tax.total, Decimal::ZERO);
                assert_eq!(result.effective_rate, Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_maharashtra_low_salary_pays_only_professional_tax() {
        let mut p = profile("300000");
        p.age = 30;
        p.state = "Maharashtra".to_string();

        let old = evaluate(RegimeId::Old, &p);
        assert_eq!(old.professional_tax, dec("2500"));
        assert_eq!(old.taxable_income, dec("247500"));
        assert_eq!(old.income_tax.total, Decimal::ZERO);
        assert_eq!(old.take_home, dec("297500"));

        let new = evaluate(RegimeId::New, &p);
        assert_eq!(new.taxable_income, dec("225000"));
        assert_eq!(new.income_tax.total, Decimal::ZERO);
    }

    #[test]
    fn test_senior_citizen_uses_age_slabs() {
        let mut p = profile("350000");
        let young = evaluate(RegimeId::Old, &p);
        p.age = 62;
        let senior = evaluate(RegimeId::Old, &p);
        assert_eq!(young.income_tax.slab_tax, dec("2500"));
        assert_eq!(senior.income_tax.slab_tax, Decimal::ZERO);
    }

    #[test]
    fn test_capital_gains_are_taxed_after_rebate() {
        let mut p = profile("550000");
        p.stcg = dec("100000");
        let result = evaluate(RegimeId::Old, &p);
        assert!(result.income_tax.rebate.eligible);
        assert_eq!(result.income_tax.capital_gains_tax, dec("20000"));
        assert_eq!(result.income_tax.total, dec("20800"));
    }

    #[test]
    fn test_surcharge_applies_above_fifty_lakh() {
        let result = evaluate(RegimeId::Old, &profile("8050000"));
        // Taxable 8,000,000 after the standard deduction.
        assert_eq!(result.income_tax.slab_tax, dec("2212500"));
        assert_eq!(result.income_tax.surcharge.rate, dec("0.10"));
        assert_eq!(result.income_tax.surcharge.amount, dec("221250"));
        assert_eq!(result.income_tax.cess, dec("97350"));
        assert_eq!(result.income_tax.total, dec("2531100"));
    }

    #[test]
    fn test_surcharge_relief_when_income_is_mostly_gains() {
        let mut at = profile("0");
        at.stcg = dec("5000000");
        let mut above = profile("0");
        above.stcg = dec("5010000");

        let at = evaluate(RegimeId::Old, &at);
        let above = evaluate(RegimeId::Old, &above);
        assert_eq!(at.income_tax.surcharge.amount, Decimal::ZERO);
        assert_eq!(above.income_tax.capital_gains_tax, dec("1002000"));
        assert_eq!(above.income_tax.surcharge.marginal_relief, dec("92200"));
        assert_eq!(above.income_tax.surcharge.amount, dec("8000"));
        // 1,010,000 plus 4% cess
        assert_eq!(above.income_tax.total, dec("1050400"));

        let before_cess = |r: &RegimeResult| r.income_tax.total - r.income_tax.cess;
        assert!(before_cess(&above) <= before_cess(&at) + dec("10000"));
    }

    #[test]
    fn test_surcharge_relief_takes_excess_from_ltcg_after_stcg() {
        let mut p = profile("0");
        p.stcg = dec("4000");
        p.ltcg = dec("5006000");
        let result = evaluate(RegimeId::New, &p);
        // At the threshold: 0 STCG and 5,000,000 LTCG, so 609,375 + 10,000.
        assert_eq!(result.income_tax.capital_gains_tax, dec("610925"));
        assert_eq!(
            result.income_tax.capital_gains_tax + result.income_tax.surcharge.amount,
            dec("619375")
        );
    }

    #[test]
    fn test_take_home_and_contributions() {
        let mut p = profile("1200000");
        p.employee_pf_percent = dec("12");
        p.employer_pf_percent = dec("12");
        p.nps_employer = dec("50000");
        let result = evaluate(RegimeId::NewPost2025, &p);

        assert_eq!(result.employee_contributions.pf, dec("144000"));
        assert_eq!(result.employer_contributions.pf, dec("144000"));
        assert_eq!(result.employer_contributions.cost_to_company, dec("1394000"));
        assert_eq!(
            result.take_home,
            result.gross_salary - result.income_tax.total - dec("144000")
        );
        assert_eq!(result.monthly_take_home, round_rupee(result.take_home / dec("12")));
    }

    #[test]
    fn test_effective_rate_is_percentage_of_gross_income() {
        let result = evaluate(RegimeId::Old, &profile("1050000"));
        // Taxable 1,000,000: 112,500 + 4% cess = 117,000
        assert_eq!(result.income_tax.total, dec("117000"));
        assert_eq!(result.effective_rate, dec("11.14"));
    }

    #[test]
    fn test_audit_trace_is_numbered_and_complete() {
        let result = evaluate(RegimeId::Old, &profile("900000"));
        let numbers: Vec<u32> = result.audit_trace.iter().map(|s| s.step_number).collect();
        let expected: Vec<u32> = (1..=result.audit_trace.len() as u32).collect();
        assert_eq!(numbers, expected);

        let first = result.audit_trace.first().unwrap();
        let last = result.audit_trace.last().unwrap();
        assert_eq!(first.rule_id, "professional_tax");
        assert_eq!(last.rule_id, "take_home");
        assert!(result.audit_trace.iter().any(|s| s.clause_ref == "87A"));
    }

    #[test]
    fn test_regime_missing_from_year_is_none() {
        assert!(evaluate_in("2024-25", RegimeId::NewPost2025, &profile("900000")).is_none());
    }

    #[test]
    fn test_2024_25_new_regime_rebate_threshold() {
        let at = evaluate_in("2024-25", RegimeId::New, &profile("775000")).unwrap();
        assert_eq!(at.taxable_income, dec("700000"));
        assert!(at.income_tax.rebate.eligible);
        assert_eq!(at.income_tax.total, Decimal::ZERO);
    }
}
