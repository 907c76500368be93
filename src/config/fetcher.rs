//! Financial-year resolution over a loaded rule book.
//!
//! [`RulesFetcher`] maps any financial-year string a caller sends to the
//! rule set that should govern it. Resolution never fails: years outside the
//! rule book fall back to the nearest known year, and malformed strings fall
//! back to the default year.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::EngineResult;
use crate::models::{FinancialYear, RegimeId};

use super::loader::ConfigLoader;
use super::types::{RuleBook, TaxRules};

/// The outcome of resolving a requested financial year.
#[derive(Debug, Clone)]
pub struct ResolvedRules {
    /// The string the caller asked for, if any.
    pub requested: Option<String>,
    /// The year whose rules were selected.
    pub financial_year: FinancialYear,
    /// True when `financial_year` differs from what was requested.
    pub fallback: bool,
    /// The selected rules.
    pub rules: Arc<TaxRules>,
}

/// Resolves financial years to rule sets, caching each resolution.
///
/// The fetcher owns its rule book and is shared between threads behind an
/// [`Arc`]; resolutions are computed once per distinct year and then served
/// from a read-mostly cache.
///
/// # Example
///
/// ```
/// use salary_tax_engine::config::RulesFetcher;
///
/// let fetcher = RulesFetcher::builtin().unwrap();
/// let resolved = fetcher.fetch_rules_for_fy("2031-32");
/// assert!(resolved.fallback);
/// assert_eq!(resolved.financial_year.to_string(), "2025-26");
/// ```
#[derive(Debug)]
pub struct RulesFetcher {
    book: RuleBook,
    cache: RwLock<HashMap<FinancialYear, (FinancialYear, Arc<TaxRules>)>>,
}

impl RulesFetcher {
    /// Creates a fetcher over an already loaded rule book.
    pub fn new(book: RuleBook) -> Self {
        Self {
            book,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a fetcher over the rule files compiled into the crate.
    pub fn builtin() -> EngineResult<Self> {
        Ok(Self::new(ConfigLoader::builtin()?.into_rule_book()))
    }

    /// Resolves the rules for a financial-year string such as `"2025-26"`.
    pub fn fetch_rules_for_fy(&self, fy: &str) -> ResolvedRules {
        self.resolve(Some(fy))
    }

    /// Resolves the rules for an optional financial year.
    ///
    /// `None` and blank strings select the default year without a fallback.
    pub fn resolve(&self, fy: Option<&str>) -> ResolvedRules {
        let requested = fy.map(str::trim).filter(|s| !s.is_empty());

        let Some(raw) = requested else {
            return ResolvedRules {
                requested: None,
                financial_year: self.book.default_year(),
                fallback: false,
                rules: Arc::clone(self.book.default_rules()),
            };
        };

        let parsed = match raw.parse::<FinancialYear>() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(requested = raw, error = %e, "Malformed financial year, using default rules");
                return ResolvedRules {
                    requested: Some(raw.to_string()),
                    financial_year: self.book.default_year(),
                    fallback: true,
                    rules: Arc::clone(self.book.default_rules()),
                };
            }
        };

        let (financial_year, rules) = self.lookup(parsed);
        ResolvedRules {
            requested: Some(raw.to_string()),
            financial_year,
            fallback: financial_year != parsed,
            rules,
        }
    }

    /// Returns the regimes modelled for the year `fy` resolves to.
    pub fn get_available_regimes(&self, fy: &str) -> BTreeSet<RegimeId> {
        self.fetch_rules_for_fy(fy).rules.available_regimes()
    }

    /// Returns the default (latest) financial year.
    pub fn default_year(&self) -> FinancialYear {
        self.book.default_year()
    }

    /// Returns every financial year in the rule book, oldest first.
    pub fn known_years(&self) -> Vec<FinancialYear> {
        self.book.years()
    }

    fn lookup(&self, fy: FinancialYear) -> (FinancialYear, Arc<TaxRules>) {
        if let Some((resolved, rules)) = self
            .cache
            .read()
            .get(&fy)
        {
            return (*resolved, Arc::clone(rules));
        }

        let resolved = match self.book.get(fy) {
            Some(_) => fy,
            None => {
                let nearest = self.book.nearest(fy);
                warn!(requested = %fy, using = %nearest, "No rules for financial year, using nearest");
                nearest
            }
        };
        let rules = self
            .book
            .get(resolved)
            .unwrap_or_else(|| self.book.default_rules())
            .clone();

        debug!(requested = %fy, resolved = %resolved, "Caching rule resolution");
        self.cache
            .write()
            .insert(fy, (resolved, Arc::clone(&rules)));
        (resolved, rules)
    }

    #[cfg(test)]
    fn cached_years(&self) -> usize {
        self.cache.read().len()
    }
}
