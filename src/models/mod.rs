//! Core data models for the salary tax engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod profile;
mod regime;

pub use calculation_result::{
    AuditStep, AuditWarning, CalculationMetadata, DeductionBreakdown, EmployeeContributions,
    EmployerContributions, ExemptionBreakdown, IncomeBreakdown, IncomeTaxBreakdown,
    RebateOutcome, RegimeComparison, RegimeResult, SalaryBreakdownResult, SurchargeOutcome,
};
pub use profile::{
    CalculationOptions, DeductionSection, MAX_AMOUNT, REQUIRED_FIELDS, SalaryProfile,
};
pub use regime::{FinancialYear, InvalidFinancialYear, RegimeId, UnknownRegime};
