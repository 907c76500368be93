//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading tax rule
//! books from YAML files, either from a directory on disk or from the rule
//! files compiled into the binary.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

use super::types::{ProfessionalTaxTable, RegimeRules, RuleBook, Slab, TaxRules};

/// Rule files compiled into the crate, as `(file name, contents)` pairs.
const BUILTIN_RULES: &[(&str, &str)] = &[
    (
        "2024-25.yaml",
        include_str!("../../config/rules/2024-25.yaml"),
    ),
    (
        "2025-26.yaml",
        include_str!("../../config/rules/2025-26.yaml"),
    ),
];

/// Loads, validates and provides access to the tax rule book.
///
/// # Directory Structure
///
/// A rules directory holds one YAML file per financial year:
/// ```text
/// config/rules/
/// ├── 2024-25.yaml
/// └── 2025-26.yaml
/// ```
///
/// Every file is parsed and validated eagerly, so a broken rule file is
/// reported at startup rather than in the middle of a calculation.
///
/// # Example
///
/// ```
/// use salary_tax_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::builtin().unwrap();
/// assert_eq!(loader.rule_book().default_year().to_string(), "2025-26");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    book: RuleBook,
}

impl ConfigLoader {
    /// Loads every `*.yaml` rule file from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The directory is missing or contains no rule files
    /// - Any file contains invalid YAML or is missing a required field
    /// - Any rule set is internally inconsistent
    /// - Two files describe the same financial year
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        if !path.is_dir() {
            return Err(EngineError::ConfigNotFound { path: path_str });
        }

        let entries = fs::read_dir(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let mut documents = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: path_str.clone(),
            })?;

            let file = entry.path();
            if file.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
                let file_str = file.display().to_string();
                let content = fs::read_to_string(&file).map_err(|_| EngineError::ConfigNotFound {
                    path: file_str.clone(),
                })?;
                documents.push((file_str, content));
            }
        }

        if documents.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rule files found)", path_str),
            });
        }

        let loader = Self::from_documents(documents)?;
        info!(
            path = %path_str,
            years = ?loader.book.years().iter().map(ToString::to_string).collect::<Vec<_>>(),
            "Loaded tax rules from directory"
        );
        Ok(loader)
    }

    /// Loads the rule files compiled into the crate.
    pub fn builtin() -> EngineResult<Self> {
        Self::from_documents(
            BUILTIN_RULES
                .iter()
                .map(|(name, content)| (name.to_string(), content.to_string())),
        )
    }

    /// Parses and validates rule files given as `(name, YAML)` pairs.
    pub fn from_documents<I>(documents: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut rules = BTreeMap::new();

        for (name, content) in documents {
            let parsed: TaxRules =
                serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                    path: name.clone(),
                    message: e.to_string(),
                })?;
            validate_rules(&parsed)?;

            let fy = parsed.financial_year;
            debug!(file = %name, fy = %fy, "Parsed tax rules");
            if rules.insert(fy, Arc::new(parsed)).is_some() {
                return Err(EngineError::InvalidRules {
                    financial_year: fy.to_string(),
                    message: format!("defined more than once (again in '{}')", name),
                });
            }
        }

        let book = RuleBook::new(rules).ok_or_else(|| EngineError::ConfigNotFound {
            path: "(no rule files supplied)".to_string(),
        })?;
        Ok(Self { book })
    }

    /// Returns the loaded rule book.
    pub fn rule_book(&self) -> &RuleBook {
        &self.book
    }

    /// Consumes the loader, returning the rule book.
    pub fn into_rule_book(self) -> RuleBook {
        self.book
    }
}

/// Checks a parsed rule set for internal consistency.
fn validate_rules(rules: &TaxRules) -> EngineResult<()> {
    let invalid = |message: String| EngineError::InvalidRules {
        financial_year: rules.financial_year.to_string(),
        message,
    };

    if rules.regimes.is_empty() {
        return Err(invalid("no regimes defined".to_string()));
    }
    if !is_fraction(rules.cess_rate) {
        return Err(invalid(format!("cess rate {} is not between 0 and 1", rules.cess_rate)));
    }
    let gains = &rules.capital_gains;
    if !is_fraction(gains.stcg_rate) || !is_fraction(gains.ltcg_rate) {
        return Err(invalid("capital gains rates must be between 0 and 1".to_string()));
    }
    if gains.ltcg_exemption < Decimal::ZERO {
        return Err(invalid("LTCG exemption is negative".to_string()));
    }

    for (regime, regime_rules) in &rules.regimes {
        validate_regime(regime_rules).map_err(|message| invalid(format!("{regime}: {message}")))?;
    }

    validate_professional_tax(&rules.professional_tax).map_err(invalid)
}

fn validate_regime(regime: &RegimeRules) -> Result<(), String> {
    validate_slabs(&regime.slabs).map_err(|m| format!("slabs {m}"))?;
    for table in &regime.age_slabs {
        validate_slabs(&table.slabs).map_err(|m| format!("age {}+ slabs {m}", table.min_age))?;
    }

    if regime.standard_deduction < Decimal::ZERO {
        return Err("standard deduction is negative".to_string());
    }
    if regime.rebate.threshold < Decimal::ZERO || regime.rebate.cap < Decimal::ZERO {
        return Err("rebate threshold and cap must not be negative".to_string());
    }

    for pair in regime.surcharge.windows(2) {
        if pair[1].above <= pair[0].above {
            return Err("surcharge bands are not in ascending order".to_string());
        }
    }
    if let Some(band) = regime.surcharge.iter().find(|band| !is_fraction(band.rate)) {
        return Err(format!("surcharge rate {} is not between 0 and 1", band.rate));
    }

    Ok(())
}

/// Slabs must start at zero, be contiguous, and end with an open bracket.
fn validate_slabs(slabs: &[Slab]) -> Result<(), String> {
    let first = slabs.first().ok_or("are empty")?;
    if first.from != Decimal::ZERO {
        return Err("must start at 0".to_string());
    }

    for (index, slab) in slabs.iter().enumerate() {
        if !is_fraction(slab.rate) {
            return Err(format!("rate {} is not between 0 and 1", slab.rate));
        }
        match (slab.to, slabs.get(index + 1)) {
            (Some(to), Some(next)) if to == next.from && to > slab.from => {}
            (Some(_), Some(_)) => return Err(format!("are not contiguous at {}", slab.from)),
            (None, None) => {}
            (Some(_), None) => return Err("must end with an open-ended slab".to_string()),
            (None, Some(_)) => {
                return Err(format!("open-ended slab at {} is not last", slab.from));
            }
        }
    }

    Ok(())
}

fn validate_professional_tax(table: &ProfessionalTaxTable) -> Result<(), String> {
    if table.statutory_max_annual < Decimal::ZERO {
        return Err("professional tax maximum is negative".to_string());
    }

    for (key, state) in &table.states {
        if state.period_months == 0 || 12 % state.period_months != 0 {
            return Err(format!(
                "professional tax for {key}: period of {} months does not divide a year",
                state.period_months
            ));
        }
        for pair in state.slabs.windows(2) {
            if pair[1].above <= pair[0].above {
                return Err(format!("professional tax slabs for {key} are not ascending"));
            }
        }
        if state.slabs.iter().any(|slab| slab.amount < Decimal::ZERO) {
            return Err(format!("professional tax for {key} has a negative amount"));
        }
    }

    Ok(())
}

fn is_fraction(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}

/// The YAML for the latest builtin rule set, for tests that tweak rules.
#[cfg(test)]
pub(crate) fn latest_builtin_yaml() -> &'static str {
    BUILTIN_RULES[BUILTIN_RULES.len() - 1].1
}

/// Convenience for tests that need a specific year from the builtin book.
#[cfg(test)]
pub(crate) fn builtin_rules(fy: &str) -> Arc<TaxRules> {
    let fy: crate::models::FinancialYear = fy.parse().unwrap();
    ConfigLoader::builtin()
        .unwrap()
        .rule_book()
        .get(fy)
        .cloned()
        .unwrap()
}
