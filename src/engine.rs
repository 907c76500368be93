//! The multi-regime salary tax engine.
//!
//! [`TaxEngine`] is the library entry point. It resolves the financial
//! year's rules, computes professional tax once, evaluates every requested
//! regime independently and assembles a side-by-side comparison.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{DeductionCalculator, ProfessionalTaxCalculator, RegimeEvaluator};
use crate::config::{ResolvedRules, RulesFetcher};
use crate::error::EngineResult;
use crate::models::{
    AuditWarning, CalculationMetadata, CalculationOptions, RegimeComparison, RegimeId,
    RegimeResult, SalaryBreakdownResult, SalaryProfile,
};

/// The version reported in calculation metadata.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Evaluates salary profiles across tax regimes.
///
/// The engine owns its [`RulesFetcher`]; share it between threads behind an
/// `Arc`.
///
/// # Example
///
/// ```
/// use salary_tax_engine::engine::TaxEngine;
/// use salary_tax_engine::models::{CalculationOptions, RegimeId, SalaryProfile};
/// use rust_decimal::Decimal;
///
/// let engine = TaxEngine::builtin().unwrap();
/// let profile = SalaryProfile {
///     basic: Decimal::from(1_800_000),
///     ..SalaryProfile::default()
/// };
///
/// let result = engine
///     .calculate_salary_breakdown(&profile, &CalculationOptions::new("2025-26", &[]))
///     .unwrap();
/// assert_eq!(result.regimes.len(), 3);
/// assert_eq!(result.comparison.unwrap().recommended, RegimeId::NewPost2025);
/// ```
#[derive(Debug)]
pub struct TaxEngine {
    fetcher: RulesFetcher,
}

impl TaxEngine {
    /// Creates an engine over the given rules.
    pub fn new(fetcher: RulesFetcher) -> Self {
        Self { fetcher }
    }

    /// Creates an engine over the rule files compiled into the crate.
    pub fn builtin() -> EngineResult<Self> {
        Ok(Self::new(RulesFetcher::builtin()?))
    }

    /// Returns the rules fetcher.
    pub fn fetcher(&self) -> &RulesFetcher {
        &self.fetcher
    }

    /// Returns the regimes available for a financial year.
    pub fn available_regimes(&self, fy: &str) -> BTreeSet<RegimeId> {
        self.fetcher.get_available_regimes(fy)
    }

    /// Validates a raw JSON profile and calculates its breakdown.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidProfile`](crate::error::EngineError::InvalidProfile)
    /// when `basic` is missing, `null` or not numeric, or when any other
    /// field has the wrong type. No regime is evaluated in that case.
    pub fn calculate_from_json(
        &self,
        profile: &Value,
        options: &CalculationOptions,
    ) -> EngineResult<SalaryBreakdownResult> {
        let profile = SalaryProfile::from_value(profile).inspect_err(|e| {
            warn!(error = %e, "Rejected salary profile");
        })?;
        self.calculate_salary_breakdown(&profile, options)
    }

    /// Calculates the salary breakdown under every requested regime.
    ///
    /// Unknown regimes and financial years never fail the calculation; they
    /// are reported as warnings in the result metadata.
    pub fn calculate_salary_breakdown(
        &self,
        profile: &SalaryProfile,
        options: &CalculationOptions,
    ) -> EngineResult<SalaryBreakdownResult> {
        let start_time = Instant::now();
        let calculation_id = Uuid::new_v4();
        let mut warnings = Vec::new();

        let (profile, clamped) = profile.clamped();
        for field in &clamped {
            warnings.push(AuditWarning::new(
                AuditWarning::AMOUNT_CLAMPED,
                format!("'{field}' exceeds the supported range and was clamped"),
                "medium",
            ));
        }

        let resolved = self.fetcher.resolve(options.fy.as_deref());
        if resolved.fallback {
            warnings.push(AuditWarning::new(
                AuditWarning::FY_FALLBACK,
                format!(
                    "No rules for financial year '{}'; using {}",
                    resolved.requested.as_deref().unwrap_or_default(),
                    resolved.financial_year
                ),
                "medium",
            ));
        }

        let (selected, skipped) = select_regimes(&resolved, &options.regimes);
        for id in &skipped {
            warnings.push(AuditWarning::new(
                AuditWarning::UNKNOWN_REGIME,
                format!(
                    "Regime '{id}' is not available for {}; skipped",
                    resolved.financial_year
                ),
                "low",
            ));
        }

        let rules = resolved.rules.as_ref();
        let professional_tax = ProfessionalTaxCalculator::new(&rules.professional_tax).calculate(
            &profile.state,
            profile.gross_salary(),
            1,
        );
        let deduction_calculator = DeductionCalculator::new(rules);
        let evaluator = RegimeEvaluator::new(rules);

        let mut regimes = BTreeMap::new();
        for regime in selected {
            let Some(regime_rules) = rules.regime(regime) else {
                continue;
            };
            let deductions =
                deduction_calculator.calculate(&profile, regime_rules, professional_tax.annual, 2);
            if let Some(result) = evaluator.evaluate(regime, &profile, &deductions, &professional_tax)
            {
                regimes.insert(regime, result);
            }
        }

        let comparison = compare_regimes(&regimes);
        let duration_us = start_time.elapsed().as_micros() as u64;

        info!(
            correlation_id = %calculation_id,
            fy = %resolved.financial_year,
            regimes = regimes.len(),
            skipped = skipped.len(),
            recommended = ?comparison.as_ref().map(|c| c.recommended),
            duration_us,
            "Salary breakdown calculated"
        );

        Ok(SalaryBreakdownResult {
            success: true,
            fy: resolved.financial_year,
            regimes,
            comparison,
            metadata: CalculationMetadata {
                calculation_id,
                timestamp: Utc::now(),
                engine_version: ENGINE_VERSION.to_string(),
                requested_fy: resolved.requested,
                fy_fallback: resolved.fallback,
                skipped_regimes: skipped,
                warnings,
                duration_us,
            },
        })
    }
}

/// Splits requested regime ids into those to evaluate and those to skip.
///
/// An empty request selects every regime the year models.
fn select_regimes(resolved: &ResolvedRules, requested: &[String]) -> (BTreeSet<RegimeId>, Vec<String>) {
    let available = resolved.rules.available_regimes();
    if requested.is_empty() {
        return (available, Vec::new());
    }

    let mut selected = BTreeSet::new();
    let mut skipped = Vec::new();
    for id in requested {
        match id.parse::<RegimeId>() {
            Ok(regime) if available.contains(&regime) => {
                selected.insert(regime);
            }
            _ => {
                warn!(regime = %id, fy = %resolved.financial_year, "Skipping unavailable regime");
                skipped.push(id.clone());
            }
        }
    }
    (selected, skipped)
}

/// Recommends the regime with the lowest total tax; ties go to the newest.
fn compare_regimes(regimes: &BTreeMap<RegimeId, RegimeResult>) -> Option<RegimeComparison> {
    let (recommended, best) = regimes
        .iter()
        .min_by_key(|(id, result)| (result.income_tax.total, Reverse(**id)))?;
    let worst = regimes
        .values()
        .map(|result| result.income_tax.total)
        .max()
        .unwrap_or(best.income_tax.total);

    Some(RegimeComparison {
        recommended: *recommended,
        recommended_tax: best.income_tax.total,
        tax_savings: worst - best.income_tax.total,
    })
}
