//! Calculation result models for the salary tax engine.
//!
//! This module contains the [`SalaryBreakdownResult`] type and its associated
//! structures that capture all outputs from a multi-regime calculation,
//! including per-regime tax components, deductions, take-home pay and audit
//! traces.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FinancialYear, RegimeId};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the Income-tax Act section for this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate requests the engine tolerated but did not honour
/// exactly, such as an unknown regime or financial year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Warning code for a requested regime that was skipped.
    pub const UNKNOWN_REGIME: &'static str = "UNKNOWN_REGIME";
    /// Warning code for a financial year that fell back to other rules.
    pub const FY_FALLBACK: &'static str = "FY_FALLBACK";
    /// Warning code for a monetary input that was clamped.
    pub const AMOUNT_CLAMPED: &'static str = "AMOUNT_CLAMPED";

    /// Creates a new warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// Outcome of the section 87A rebate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebateOutcome {
    /// Whether taxable income was at or below the rebate threshold.
    pub eligible: bool,
    /// The rebate granted.
    pub amount: Decimal,
    /// The threshold that was applied.
    pub threshold: Decimal,
}

/// Surcharge levied on tax for high incomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeOutcome {
    /// The surcharge payable after marginal relief.
    pub amount: Decimal,
    /// The band rate that applied (e.g. 0.10 for 10%).
    pub rate: Decimal,
    /// Marginal relief granted against the surcharge.
    pub marginal_relief: Decimal,
}

/// Income-tax components for one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxBreakdown {
    /// Progressive tax from the slab table.
    pub slab_tax: Decimal,
    /// Section 87A rebate.
    pub rebate: RebateOutcome,
    /// Marginal relief granted just above the rebate threshold.
    pub marginal_relief: Decimal,
    /// Tax on capital gains at special rates.
    pub capital_gains_tax: Decimal,
    /// Surcharge on tax.
    pub surcharge: SurchargeOutcome,
    /// Health and education cess.
    pub cess: Decimal,
    /// Total income tax payable.
    pub total: Decimal,
}

/// Exemptions and allowances deducted from salary before chapter VI-A.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionBreakdown {
    /// Flat standard deduction under section 16(ia).
    pub standard_deduction: Decimal,
    /// House rent allowance exempt under section 10(13A).
    pub hra: Decimal,
    /// Leave travel allowance exempt under section 10(5).
    pub lta: Decimal,
    /// Professional tax deducted under section 16(iii).
    pub professional_tax: Decimal,
    /// Sum of all exemptions.
    pub total: Decimal,
}

/// Chapter VI-A and other deductions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    /// Sum of all deductions.
    pub total: Decimal,
    /// Allowed amount per section (e.g. `"80C"`, `"employee_pf"`).
    pub by_section: BTreeMap<String, Decimal>,
}

/// Everything subtracted from gross income to reach taxable income.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    /// Salary exemptions.
    pub exemptions: ExemptionBreakdown,
    /// Deductions.
    pub deductions: DeductionBreakdown,
}

impl IncomeBreakdown {
    /// Total reduction applied to gross income.
    pub fn total_reductions(&self) -> Decimal {
        self.exemptions.total + self.deductions.total
    }
}

/// Contributions withheld from the employee's pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeContributions {
    /// Employee provident fund.
    pub pf: Decimal,
    /// Employee NPS.
    pub nps: Decimal,
}

/// Contributions paid by the employer on top of salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributions {
    /// Employer provident fund.
    pub pf: Decimal,
    /// Employer NPS.
    pub nps: Decimal,
    /// Gross salary plus employer contributions.
    pub cost_to_company: Decimal,
}

/// The evaluation of one tax regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeResult {
    /// The regime evaluated.
    pub regime: RegimeId,
    /// Human-readable regime name from the rule book.
    pub label: String,
    /// Sum of salary components.
    pub gross_salary: Decimal,
    /// Salary plus other income and capital gains.
    pub gross_income: Decimal,
    /// Income subject to slab rates after exemptions and deductions.
    pub taxable_income: Decimal,
    /// Income-tax components.
    pub income_tax: IncomeTaxBreakdown,
    /// Annual professional tax.
    pub professional_tax: Decimal,
    /// Exemptions and deductions applied.
    pub breakdown: IncomeBreakdown,
    /// Contributions withheld from pay.
    pub employee_contributions: EmployeeContributions,
    /// Contributions paid by the employer.
    pub employer_contributions: EmployerContributions,
    /// Annual take-home pay.
    pub take_home: Decimal,
    /// Take-home pay per month.
    pub monthly_take_home: Decimal,
    /// Income tax as a percentage of gross income.
    pub effective_rate: Decimal,
    /// Rule applications for this regime.
    pub audit_trace: Vec<AuditStep>,
}

/// Side-by-side verdict across the evaluated regimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeComparison {
    /// The regime with the lowest total tax.
    pub recommended: RegimeId,
    /// Total tax under the recommended regime.
    pub recommended_tax: Decimal,
    /// Difference between the highest and lowest total tax.
    pub tax_savings: Decimal,
}

/// Information about how a calculation was performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationMetadata {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The financial year the caller asked for, verbatim.
    pub requested_fy: Option<String>,
    /// Whether the rules of a different financial year were used.
    pub fy_fallback: bool,
    /// Requested regime identifiers that were not evaluated.
    pub skipped_regimes: Vec<String>,
    /// Warnings generated during the calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of a salary breakdown calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdownResult {
    /// Always true for a returned result; failures are errors.
    pub success: bool,
    /// The financial year whose rules were applied.
    pub fy: FinancialYear,
    /// One entry per evaluated regime.
    pub regimes: BTreeMap<RegimeId, RegimeResult>,
    /// Regime recommendation, absent when no regime was evaluated.
    pub comparison: Option<RegimeComparison>,
    /// Calculation metadata.
    pub metadata: CalculationMetadata,
}

impl SalaryBreakdownResult {
    /// Returns the result for a regime, if it was evaluated.
    pub fn regime(&self, regime: RegimeId) -> Option<&RegimeResult> {
        self.regimes.get(&regime)
    }
}
