//! Calculation logic for the salary tax engine.
//!
//! This module contains the individual rule applications (slab tax, the
//! section 87A rebate, capital gains, surcharge with marginal relief, cess,
//! exemptions and deductions, state professional tax) and the
//! [`RegimeEvaluator`] that combines them into a per-regime result.

mod capital_gains;
mod cess;
mod common;
mod deductions;
mod professional_tax;
mod rebate;
mod regime_evaluator;
mod slab_tax;
mod surcharge;

pub use capital_gains::{
    CAPITAL_GAINS_CLAUSE, CapitalGainsResult, calculate_capital_gains_tax, capital_gains_tax,
};
pub use cess::{CESS_CLAUSE, CessResult, calculate_cess};
pub use common::{non_negative_rupees, round_rupee};
pub use deductions::{DeductionCalculator, DeductionResult};
pub use professional_tax::{
    PROFESSIONAL_TAX_CEILING, PROFESSIONAL_TAX_CLAUSE, ProfessionalTaxCalculator,
    ProfessionalTaxResult,
};
pub use rebate::{REBATE_CLAUSE, RebateResult, apply_rebate};
pub use regime_evaluator::RegimeEvaluator;
pub use slab_tax::{SlabTaxResult, calculate_slab_tax, slab_tax};
pub use surcharge::{SURCHARGE_CLAUSE, SurchargeResult, calculate_surcharge};
