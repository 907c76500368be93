//! Salary exemptions and chapter VI-A deductions.
//!
//! This module works out everything a regime lets a taxpayer subtract from
//! gross income before slab rates apply. Exemptions (standard deduction,
//! HRA, LTA, professional tax) are reported separately from deductions
//! (80C, 80D, 80CCD(1B), provident fund, NPS and other deductions).
//!
//! Which reliefs apply is driven entirely by the regime's allowance flags
//! in the rule book.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde_json::Value;

use super::common::{money, non_negative_rupees};
use crate::config::{RegimeRules, TaxRules};
use crate::models::{
    AuditStep, DeductionBreakdown, DeductionSection, ExemptionBreakdown, IncomeBreakdown,
    SalaryProfile,
};

/// Share of basic salary deducted from rent when computing the HRA exemption.
const HRA_RENT_OFFSET: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
/// Share of basic salary that caps the HRA exemption in a metro city.
const HRA_METRO_SHARE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
/// Share of basic salary that caps the HRA exemption elsewhere.
const HRA_NON_METRO_SHARE: Decimal = Decimal::from_parts(40, 0, 0, false, 2);

/// Exemptions and deductions for one regime, with their audit steps.
#[derive(Debug, Clone)]
pub struct DeductionResult {
    /// The amounts applied.
    pub breakdown: IncomeBreakdown,
    /// One audit step per relief considered.
    pub audit_steps: Vec<AuditStep>,
}

/// Computes the exemptions and deductions a regime allows.
///
/// # Example
///
/// ```
/// use salary_tax_engine::calculation::DeductionCalculator;
/// use salary_tax_engine::config::RulesFetcher;
/// use salary_tax_engine::models::{RegimeId, SalaryProfile};
/// use rust_decimal::Decimal;
///
/// let rules = RulesFetcher::builtin().unwrap().fetch_rules_for_fy("2025-26").rules;
/// let mut profile = SalaryProfile {
///     basic: Decimal::from(1_000_000),
///     ..SalaryProfile::default()
/// };
/// profile.investments.insert("80C".to_string(), Decimal::from(200_000));
///
/// let old = rules.regime(RegimeId::Old).unwrap();
/// let result = DeductionCalculator::new(&rules).calculate(&profile, old, Decimal::ZERO, 1);
/// assert_eq!(result.breakdown.deductions.total, Decimal::from(150_000));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DeductionCalculator<'a> {
    rules: &'a TaxRules,
}

impl<'a> DeductionCalculator<'a> {
    /// Creates a calculator using a year's deduction caps.
    pub fn new(rules: &'a TaxRules) -> Self {
        Self { rules }
    }

    /// Calculates exemptions and deductions for `profile` under `regime`.
    ///
    /// # Arguments
    ///
    /// * `profile` - The salary profile
    /// * `regime` - The regime whose allowance flags apply
    /// * `professional_tax` - Annual professional tax paid, deductible where allowed
    /// * `first_step` - The step number of the first audit step emitted
    pub fn calculate(
        &self,
        profile: &SalaryProfile,
        regime: &RegimeRules,
        professional_tax: Decimal,
        first_step: u32,
    ) -> DeductionResult {
        let mut log = StepLog::new(first_step);
        let exemptions = exemptions(profile, regime, professional_tax, &mut log);
        let deductions = self.deductions(profile, regime, &mut log);

        DeductionResult {
            breakdown: IncomeBreakdown {
                exemptions,
                deductions,
            },
            audit_steps: log.steps,
        }
    }

    fn deductions(
        &self,
        profile: &SalaryProfile,
        regime: &RegimeRules,
        log: &mut StepLog,
    ) -> DeductionBreakdown {
        if !regime.allows.chapter_via {
            log.record(
                "chapter_via",
                "Chapter VI-A Deductions",
                "80C-80U",
                serde_json::json!({ "allowed": false }),
                serde_json::json!({ "total": "0" }),
                format!("{} does not allow chapter VI-A deductions", regime.label),
            );
            return DeductionBreakdown::default();
        }

        let caps = &self.rules.deduction_caps;
        let senior = profile.age >= caps.senior_citizen_age;

        let mut by_section = BTreeMap::new();
        let mut declared = serde_json::Map::new();
        for section in DeductionSection::ALL {
            let cap = match section {
                DeductionSection::Section80C => caps.section_80c,
                DeductionSection::Section80D if senior => caps.section_80d_senior,
                DeductionSection::Section80D => caps.section_80d,
                DeductionSection::Section80Ccd1b => caps.section_80ccd1b,
            };
            let amount = profile.investment(section);
            declared.insert(section.code().to_string(), Value::String(money(amount)));
            by_section.insert(section.code().to_string(), non_negative_rupees(amount.min(cap)));
        }

        by_section.insert("employee_pf".to_string(), non_negative_rupees(profile.employee_pf()));
        by_section.insert("nps_employee".to_string(), non_negative_rupees(profile.nps_employee));
        by_section.insert("other".to_string(), non_negative_rupees(profile.other_deductions));

        let total: Decimal = by_section.values().copied().sum();
        let capped_sections: Vec<&str> = DeductionSection::ALL
            .iter()
            .filter(|section| profile.investment(**section) > by_section[section.code()])
            .map(|section| section.code())
            .collect();

        let reasoning = if capped_sections.is_empty() {
            format!("Deductions total ₹{}", money(total))
        } else {
            format!(
                "Deductions total ₹{}; declarations above the cap for {} were truncated",
                money(total),
                capped_sections.join(", ")
            )
        };

        log.record(
            "chapter_via",
            "Chapter VI-A Deductions",
            "80C, 80D, 80CCD(1B)",
            serde_json::json!({
                "declared": declared,
                "senior_citizen": senior,
                "caps": {
                    "80C": money(caps.section_80c),
                    "80D": money(if senior { caps.section_80d_senior } else { caps.section_80d }),
                    "80CCD1B": money(caps.section_80ccd1b)
                }
            }),
            serde_json::json!({
                "by_section": by_section.iter().map(|(k, v)| (k.clone(), money(*v))).collect::<BTreeMap<_, _>>(),
                "total": money(total)
            }),
            reasoning,
        );

        DeductionBreakdown { total, by_section }
    }
}

fn exemptions(
    profile: &SalaryProfile,
    regime: &RegimeRules,
    professional_tax: Decimal,
    log: &mut StepLog,
) -> ExemptionBreakdown {
    let salary = profile.gross_salary().max(Decimal::ZERO);
    let standard_deduction = regime.standard_deduction.min(salary);
    log.record(
        "standard_deduction",
        "Standard Deduction",
        "16(ia)",
        serde_json::json!({
            "gross_salary": money(salary),
            "standard_deduction": money(regime.standard_deduction)
        }),
        serde_json::json!({ "amount": money(standard_deduction) }),
        format!(
            "Lower of ₹{} and gross salary ₹{} = ₹{}",
            money(regime.standard_deduction),
            money(salary),
            money(standard_deduction)
        ),
    );

    let hra = if regime.allows.hra_exemption {
        hra_exemption(profile, log)
    } else {
        Decimal::ZERO
    };

    let lta = if regime.allows.lta_exemption {
        let lta = non_negative_rupees(profile.lta);
        log.record(
            "lta_exemption",
            "Leave Travel Allowance Exemption",
            "10(5)",
            serde_json::json!({ "lta": money(profile.lta) }),
            serde_json::json!({ "amount": money(lta) }),
            format!("Leave travel allowance ₹{} exempt", money(lta)),
        );
        lta
    } else {
        Decimal::ZERO
    };

    let professional_tax = if regime.allows.professional_tax {
        let amount = professional_tax.max(Decimal::ZERO);
        log.record(
            "professional_tax_deduction",
            "Professional Tax Deduction",
            "16(iii)",
            serde_json::json!({ "professional_tax": money(professional_tax) }),
            serde_json::json!({ "amount": money(amount) }),
            format!("Professional tax ₹{} deducted from salary", money(amount)),
        );
        amount
    } else {
        Decimal::ZERO
    };

    ExemptionBreakdown {
        standard_deduction,
        hra,
        lta,
        professional_tax,
        total: standard_deduction + hra + lta + professional_tax,
    }
}

/// Least of HRA received, rent above 10% of basic, and 50% (metro) or 40%
/// of basic.
fn hra_exemption(profile: &SalaryProfile, log: &mut StepLog) -> Decimal {
    let basic = profile.basic.max(Decimal::ZERO);
    let received = profile.hra.max(Decimal::ZERO);
    let rent_excess = (profile.rent_paid - basic * HRA_RENT_OFFSET).max(Decimal::ZERO);
    let share = if profile.lives_in_metro {
        HRA_METRO_SHARE
    } else {
        HRA_NON_METRO_SHARE
    };
    let salary_limit = basic * share;
    let exemption = non_negative_rupees(received.min(rent_excess).min(salary_limit));

    log.record(
        "hra_exemption",
        "House Rent Allowance Exemption",
        "10(13A)",
        serde_json::json!({
            "hra_received": money(received),
            "rent_paid": money(profile.rent_paid),
            "basic": money(basic),
            "lives_in_metro": profile.lives_in_metro
        }),
        serde_json::json!({
            "rent_above_10_percent_of_basic": money(rent_excess),
            "salary_limit": money(salary_limit),
            "amount": money(exemption)
        }),
        format!(
            "Least of HRA ₹{}, rent less 10% of basic ₹{}, {}% of basic ₹{} = ₹{}",
            money(received),
            money(rent_excess),
            (share * Decimal::ONE_HUNDRED).normalize(),
            money(salary_limit),
            money(exemption)
        ),
    );

    exemption
}

/// Collects audit steps with consecutive step numbers.
struct StepLog {
    next: u32,
    steps: Vec<AuditStep>,
}

impl StepLog {
    fn new(first: u32) -> Self {
        Self {
            next: first,
            steps: Vec::new(),
        }
    }

    fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        clause_ref: &str,
        input: Value,
        output: Value,
        reasoning: String,
    ) {
        self.steps.push(AuditStep {
            step_number: self.next,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            clause_ref: clause_ref.to_string(),
            input,
            output,
            reasoning,
        });
        self.next += 1;
    }
}
