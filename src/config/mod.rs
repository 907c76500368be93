//! Tax rule configuration for the salary tax engine.
//!
//! This module loads per-financial-year rule books from YAML files and
//! resolves requested financial years to the rules that govern them.
//!
//! # Example
//!
//! ```no_run
//! use salary_tax_engine::config::{ConfigLoader, RulesFetcher};
//!
//! let book = ConfigLoader::load("./config/rules").unwrap().into_rule_book();
//! let fetcher = RulesFetcher::new(book);
//! println!("Default year: {}", fetcher.default_year());
//! ```

mod fetcher;
mod loader;
mod types;

pub use fetcher::{ResolvedRules, RulesFetcher};
pub use loader::ConfigLoader;
pub use types::{
    AgeSlabs, CapitalGainsRules, DeductionCaps, ProfessionalTaxSlab, ProfessionalTaxTable,
    RebateRule, RegimeAllowances, RegimeRules, RuleBook, Slab, StateProfessionalTax,
    SurchargeBand, TaxRules, normalize_state,
};

#[cfg(test)]
pub(crate) use loader::builtin_rules;
