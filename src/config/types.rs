//! Configuration types for the tax rule book.
//!
//! This module contains the strongly-typed rule structures that are
//! deserialized from the per-financial-year YAML files. A [`TaxRules`] value
//! is immutable once loaded and shared behind an [`Arc`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{FinancialYear, RegimeId};

/// One bracket of a progressive slab table.
///
/// A slab covers income in `[from, to)`; the last slab has no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slab {
    /// Lower bound of the bracket.
    pub from: Decimal,
    /// Upper bound of the bracket, `None` for the top bracket.
    #[serde(default)]
    pub to: Option<Decimal>,
    /// Marginal rate for income inside the bracket (e.g. 0.05).
    pub rate: Decimal,
}

impl Slab {
    /// Returns the part of `income` that falls inside this bracket.
    pub fn overlap(&self, income: Decimal) -> Decimal {
        let upper = match self.to {
            Some(to) => income.min(to),
            None => income,
        };
        (upper - self.from).max(Decimal::ZERO)
    }
}

/// A slab table that replaces the regular one from a given age.
#[derive(Debug, Clone, Deserialize)]
pub struct AgeSlabs {
    /// Minimum age (inclusive) for these slabs to apply.
    pub min_age: i32,
    /// The slab table for taxpayers of at least `min_age`.
    pub slabs: Vec<Slab>,
}

/// Section 87A rebate rule.
#[derive(Debug, Clone, Deserialize)]
pub struct RebateRule {
    /// Taxable income at or below which the rebate applies.
    pub threshold: Decimal,
    /// Maximum rebate.
    pub cap: Decimal,
    /// Whether tax just above the threshold is limited to the excess income.
    #[serde(default)]
    pub marginal_relief: bool,
}

/// A surcharge band: the rate applies when income strictly exceeds `above`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SurchargeBand {
    /// Income threshold for the band.
    pub above: Decimal,
    /// Surcharge rate as a fraction of tax.
    pub rate: Decimal,
}

/// Which reliefs beyond the standard deduction a regime honours.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegimeAllowances {
    /// Chapter VI-A deductions (80C, 80D, 80CCD1B), PF, NPS and other deductions.
    #[serde(default)]
    pub chapter_via: bool,
    /// HRA exemption under section 10(13A).
    #[serde(default)]
    pub hra_exemption: bool,
    /// LTA exemption under section 10(5).
    #[serde(default)]
    pub lta_exemption: bool,
    /// Professional tax deduction under section 16(iii).
    #[serde(default)]
    pub professional_tax: bool,
}

/// Everything needed to evaluate one regime.
#[derive(Debug, Clone, Deserialize)]
pub struct RegimeRules {
    /// Human-readable name.
    pub label: String,
    /// Statutory reference for the slab schedule.
    pub clause: String,
    /// Flat standard deduction from salary.
    pub standard_deduction: Decimal,
    /// Reliefs honoured by the regime.
    #[serde(default)]
    pub allows: RegimeAllowances,
    /// Regular slab table, ordered by `from`.
    pub slabs: Vec<Slab>,
    /// Age-specific slab tables.
    #[serde(default)]
    pub age_slabs: Vec<AgeSlabs>,
    /// Section 87A rebate.
    pub rebate: RebateRule,
    /// Surcharge bands, ordered by threshold.
    #[serde(default)]
    pub surcharge: Vec<SurchargeBand>,
}

impl RegimeRules {
    /// Returns the slab table for a taxpayer of the given age.
    ///
    /// The age table with the highest `min_age` not exceeding `age` wins;
    /// otherwise the regular table applies.
    pub fn slabs_for_age(&self, age: i32) -> &[Slab] {
        self.age_slabs
            .iter()
            .filter(|table| table.min_age <= age)
            .max_by_key(|table| table.min_age)
            .map(|table| table.slabs.as_slice())
            .unwrap_or(self.slabs.as_slice())
    }

    /// Returns the index and band that apply to `income`, if any.
    pub fn surcharge_band(&self, income: Decimal) -> Option<(usize, &SurchargeBand)> {
        self.surcharge
            .iter()
            .enumerate()
            .rev()
            .find(|(_, band)| income > band.above)
    }
}

/// Statutory caps on chapter VI-A deductions.
#[derive(Debug, Clone, Deserialize)]
pub struct DeductionCaps {
    /// Section 80C cap.
    pub section_80c: Decimal,
    /// Section 80D cap.
    pub section_80d: Decimal,
    /// Section 80D cap for senior citizens.
    pub section_80d_senior: Decimal,
    /// Section 80CCD(1B) cap.
    pub section_80ccd1b: Decimal,
    /// Age from which senior-citizen caps apply.
    pub senior_citizen_age: i32,
}

/// Special rates for capital gains.
#[derive(Debug, Clone, Deserialize)]
pub struct CapitalGainsRules {
    /// Rate on short-term gains (section 111A).
    pub stcg_rate: Decimal,
    /// Rate on long-term gains (section 112A).
    pub ltcg_rate: Decimal,
    /// Annual long-term gains exempt from tax.
    pub ltcg_exemption: Decimal,
}

/// One professional-tax slab: `amount` is due per period when period
/// income strictly exceeds `above`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfessionalTaxSlab {
    /// Period income threshold.
    pub above: Decimal,
    /// Tax due per period.
    pub amount: Decimal,
}

fn default_period_months() -> u32 {
    1
}

/// Professional-tax schedule for one state.
#[derive(Debug, Clone, Deserialize)]
pub struct StateProfessionalTax {
    /// Display name of the state.
    pub name: String,
    /// Alternative spellings and codes (e.g. `MH`).
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Length of one levy period in months (1 = monthly, 6 = half-yearly).
    #[serde(default = "default_period_months")]
    pub period_months: u32,
    /// Slabs ordered by threshold. Empty means the state levies no tax.
    #[serde(default)]
    pub slabs: Vec<ProfessionalTaxSlab>,
    /// Extra amount due once a year when any slab applies.
    #[serde(default)]
    pub annual_adjustment: Decimal,
}

/// Professional-tax schedules keyed by normalized state name.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfessionalTaxTable {
    /// Constitutional ceiling on annual professional tax.
    pub statutory_max_annual: Decimal,
    /// Per-state schedules.
    pub states: BTreeMap<String, StateProfessionalTax>,
}

impl ProfessionalTaxTable {
    /// Finds the schedule for a state by key, display name or alias.
    ///
    /// Matching ignores case, surrounding whitespace, and the difference
    /// between spaces, hyphens and underscores.
    pub fn find_state(&self, state: &str) -> Option<&StateProfessionalTax> {
        let wanted = normalize_state(state);
        if wanted.is_empty() {
            return None;
        }
        self.states.get(&wanted).or_else(|| {
            self.states.values().find(|entry| {
                normalize_state(&entry.name) == wanted
                    || entry.aliases.iter().any(|alias| normalize_state(alias) == wanted)
            })
        })
    }
}

/// Lowercases a state name and joins its words with underscores.
pub fn normalize_state(state: &str) -> String {
    state
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// The complete rule set for one financial year.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxRules {
    /// The financial year these rules govern.
    pub financial_year: FinancialYear,
    /// Free-form description of the source of the rules.
    #[serde(default)]
    pub description: String,
    /// Health and education cess rate.
    pub cess_rate: Decimal,
    /// Chapter VI-A caps.
    pub deduction_caps: DeductionCaps,
    /// Capital-gains rates.
    pub capital_gains: CapitalGainsRules,
    /// Per-regime rules.
    pub regimes: BTreeMap<RegimeId, RegimeRules>,
    /// Professional-tax schedules.
    pub professional_tax: ProfessionalTaxTable,
}

impl TaxRules {
    /// Returns the rules for a regime, if this year models it.
    pub fn regime(&self, regime: RegimeId) -> Option<&RegimeRules> {
        self.regimes.get(&regime)
    }

    /// Returns every regime this year models.
    pub fn available_regimes(&self) -> BTreeSet<RegimeId> {
        self.regimes.keys().copied().collect()
    }
}

/// Every loaded rule set, keyed by financial year.
///
/// A rule book is never empty; the latest year is the default.
#[derive(Debug, Clone)]
pub struct RuleBook {
    rules: BTreeMap<FinancialYear, Arc<TaxRules>>,
    default_year: FinancialYear,
}

impl RuleBook {
    /// Builds a rule book, returning `None` when `rules` is empty.
    pub fn new(rules: BTreeMap<FinancialYear, Arc<TaxRules>>) -> Option<Self> {
        let default_year = *rules.keys().next_back()?;
        Some(Self {
            rules,
            default_year,
        })
    }

    /// Returns the rules for an exact financial year.
    pub fn get(&self, fy: FinancialYear) -> Option<&Arc<TaxRules>> {
        self.rules.get(&fy)
    }

    /// Returns the default (latest) financial year.
    pub fn default_year(&self) -> FinancialYear {
        self.default_year
    }

    /// Returns the rules for the default year.
    pub fn default_rules(&self) -> &Arc<TaxRules> {
        &self.rules[&self.default_year]
    }

    /// Returns the known year closest to `fy`, preferring the later on ties.
    pub fn nearest(&self, fy: FinancialYear) -> FinancialYear {
        self.rules
            .keys()
            .copied()
            .min_by_key(|known| (known.distance(fy), std::cmp::Reverse(*known)))
            .unwrap_or(self.default_year)
    }

    /// Returns every known financial year, oldest first.
    pub fn years(&self) -> Vec<FinancialYear> {
        self.rules.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn slab(from: &str, to: Option<&str>, rate: &str) -> Slab {
        Slab {
            from: dec(from),
            to: to.map(dec),
            rate: dec(rate),
        }
    }

    #[test]
    fn test_slab_overlap_inside_bracket() {
        let bracket = slab("250000", Some("500000"), "0.05");
        assert_eq!(bracket.overlap(dec("300000")), dec("50000"));
    }

    #[test]
    fn test_slab_overlap_above_and_below_bracket() {
        let bracket = slab("250000", Some("500000"), "0.05");
        assert_eq!(bracket.overlap(dec("900000")), dec("250000"));
        assert_eq!(bracket.overlap(dec("100000")), Decimal::ZERO);
        assert_eq!(bracket.overlap(dec("-100000")), Decimal::ZERO);
    }

    #[test]
    fn test_open_ended_slab_overlap() {
        let bracket = slab("1000000", None, "0.30");
        assert_eq!(bracket.overlap(dec("1500000")), dec("500000"));
    }

    fn regime_with_age_slabs() -> RegimeRules {
        RegimeRules {
            label: "Old regime".to_string(),
            clause: "First Schedule".to_string(),
            standard_deduction: dec("50000"),
            allows: RegimeAllowances::default(),
            slabs: vec![slab("0", Some("250000"), "0"), slab("250000", None, "0.05")],
            age_slabs: vec![
                AgeSlabs {
                    min_age: 80,
                    slabs: vec![slab("0", Some("500000"), "0"), slab("500000", None, "0.2")],
                },
                AgeSlabs {
                    min_age: 60,
                    slabs: vec![slab("0", Some("300000"), "0"), slab("300000", None, "0.05")],
                },
            ],
            rebate: RebateRule {
                threshold: dec("500000"),
                cap: dec("12500"),
                marginal_relief: false,
            },
            surcharge: vec![
                SurchargeBand {
                    above: dec("5000000"),
                    rate: dec("0.10"),
                },
                SurchargeBand {
                    above: dec("10000000"),
                    rate: dec("0.15"),
                },
            ],
        }
    }

    #[test]
    fn test_slabs_for_age_picks_highest_applicable_table() {
        let regime = regime_with_age_slabs();
        assert_eq!(regime.slabs_for_age(30)[0].to, Some(dec("250000")));
        assert_eq!(regime.slabs_for_age(60)[0].to, Some(dec("300000")));
        assert_eq!(regime.slabs_for_age(79)[0].to, Some(dec("300000")));
        assert_eq!(regime.slabs_for_age(85)[0].to, Some(dec("500000")));
    }

    #[test]
    fn test_surcharge_band_is_strictly_above_threshold() {
        let regime = regime_with_age_slabs();
        assert!(regime.surcharge_band(dec("5000000")).is_none());
        let (index, band) = regime.surcharge_band(dec("5000001")).unwrap();
        assert_eq!(index, 0);
        assert_eq!(band.rate, dec("0.10"));
        let (index, band) = regime.surcharge_band(dec("20000000")).unwrap();
        assert_eq!(index, 1);
        assert_eq!(band.rate, dec("0.15"));
    }

    #[test]
    fn test_normalize_state() {
        assert_eq!(normalize_state("  Tamil Nadu "), "tamil_nadu");
        assert_eq!(normalize_state("west-bengal"), "west_bengal");
        assert_eq!(normalize_state("MAHARASHTRA"), "maharashtra");
        assert_eq!(normalize_state(""), "");
    }

    fn pt_table() -> ProfessionalTaxTable {
        let mut states = BTreeMap::new();
        states.insert(
            "maharashtra".to_string(),
            StateProfessionalTax {
                name: "Maharashtra".to_string(),
                aliases: vec!["MH".to_string()],
                period_months: 1,
                slabs: vec![],
                annual_adjustment: Decimal::ZERO,
            },
        );
        states.insert(
            "tamil_nadu".to_string(),
            StateProfessionalTax {
                name: "Tamil Nadu".to_string(),
                aliases: vec!["TN".to_string()],
                period_months: 6,
                slabs: vec![],
                annual_adjustment: Decimal::ZERO,
            },
        );
        ProfessionalTaxTable {
            statutory_max_annual: dec("2500"),
            states,
        }
    }

    #[test]
    fn test_find_state_by_key_name_and_alias() {
        let table = pt_table();
        assert_eq!(table.find_state("maharashtra").unwrap().name, "Maharashtra");
        assert_eq!(table.find_state("Tamil Nadu").unwrap().name, "Tamil Nadu");
        assert_eq!(table.find_state("mh").unwrap().name, "Maharashtra");
        assert!(table.find_state("Atlantis").is_none());
        assert!(table.find_state("  ").is_none());
    }

    #[test]
    fn test_rule_book_requires_at_least_one_year() {
        assert!(RuleBook::new(BTreeMap::new()).is_none());
    }
}
