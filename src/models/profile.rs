//! Salary profile and calculation options.
//!
//! A [`SalaryProfile`] is the single input to a calculation. Every monetary
//! field except `basic` defaults to zero when absent, so callers only need
//! to send the components that apply to them.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

/// Largest magnitude accepted for any monetary field (₹1,000 lakh crore).
///
/// Larger inputs are clamped so that intermediate products stay well inside
/// the range of [`Decimal`].
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Fields that must be present and numeric on every profile.
pub const REQUIRED_FIELDS: &[&str] = &["basic"];

/// Chapter VI-A deduction sections a profile can declare investments under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeductionSection {
    /// Section 80C: PPF, ELSS, life insurance premiums and similar.
    Section80C,
    /// Section 80D: health insurance premiums.
    Section80D,
    /// Section 80CCD(1B): additional NPS contribution.
    Section80Ccd1b,
}

impl DeductionSection {
    /// Every capped section, in statutory order.
    pub const ALL: [DeductionSection; 3] = [
        DeductionSection::Section80C,
        DeductionSection::Section80D,
        DeductionSection::Section80Ccd1b,
    ];

    /// Returns the key used for this section in `investments`.
    pub fn code(&self) -> &'static str {
        match self {
            DeductionSection::Section80C => "80C",
            DeductionSection::Section80D => "80D",
            DeductionSection::Section80Ccd1b => "80CCD1B",
        }
    }
}

/// An employee's annual salary structure and declarations.
///
/// # Example
///
/// ```
/// use salary_tax_engine::models::SalaryProfile;
/// use rust_decimal::Decimal;
///
/// let profile = SalaryProfile {
///     basic: Decimal::from(600_000),
///     hra: Decimal::from(240_000),
///     state: "Karnataka".to_string(),
///     ..SalaryProfile::default()
/// };
/// assert_eq!(profile.gross_salary(), Decimal::from(840_000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryProfile {
    /// Annual basic salary.
    pub basic: Decimal,
    /// Annual house rent allowance received.
    #[serde(default)]
    pub hra: Decimal,
    /// Annual conveyance allowance.
    #[serde(default)]
    pub conveyance: Decimal,
    /// Annual special allowances.
    #[serde(default, alias = "specialAllowances")]
    pub special_allowances: Decimal,
    /// Annual leave travel allowance.
    #[serde(default)]
    pub lta: Decimal,
    /// Annual bonus.
    #[serde(default)]
    pub bonus: Decimal,
    /// Any other fully taxable salary component.
    #[serde(default, alias = "otherTaxable")]
    pub other_taxable: Decimal,
    /// Employee provident-fund contribution as a percentage of basic.
    #[serde(default, alias = "employeePfPercent")]
    pub employee_pf_percent: Decimal,
    /// Employer provident-fund contribution as a percentage of basic.
    #[serde(default, alias = "employerPfPercent")]
    pub employer_pf_percent: Decimal,
    /// Employee NPS contribution.
    #[serde(default, alias = "npsEmployee")]
    pub nps_employee: Decimal,
    /// Employer NPS contribution.
    #[serde(default, alias = "npsEmployer")]
    pub nps_employer: Decimal,
    /// Other deductions claimed under the old regime.
    #[serde(default, alias = "otherDeductions")]
    pub other_deductions: Decimal,
    /// Declared investments keyed by section code (`"80C"`, `"80D"`, `"80CCD1B"`).
    #[serde(default)]
    pub investments: BTreeMap<String, Decimal>,
    /// Annual rent paid, used for the HRA exemption.
    #[serde(default, alias = "rentPaid")]
    pub rent_paid: Decimal,
    /// Whether the employee lives in a metro city (50% HRA limit instead of 40%).
    #[serde(default, alias = "livesInMetro")]
    pub lives_in_metro: bool,
    /// Age in completed years at the end of the financial year.
    #[serde(default)]
    pub age: i32,
    /// State of employment, used for professional tax.
    #[serde(default)]
    pub state: String,
    /// Interest, rent and other non-salary income taxed at slab rates.
    #[serde(default, alias = "incomeFromOtherSources")]
    pub income_from_other_sources: Decimal,
    /// Short-term capital gains taxed at the special STCG rate.
    #[serde(default)]
    pub stcg: Decimal,
    /// Long-term capital gains taxed at the special LTCG rate.
    #[serde(default)]
    pub ltcg: Decimal,
}

impl SalaryProfile {
    /// Builds a profile from raw JSON, failing fast on structural problems.
    ///
    /// Every field in [`REQUIRED_FIELDS`] must be present and numeric (a
    /// number or a numeric string). `null` counts as missing. Any other
    /// field with the wrong type is reported against the whole profile.
    ///
    /// # Example
    ///
    /// ```
    /// use salary_tax_engine::models::SalaryProfile;
    /// use serde_json::json;
    ///
    /// assert!(SalaryProfile::from_value(&json!({ "basic": 300000 })).is_ok());
    /// assert!(SalaryProfile::from_value(&json!({ "basic": null })).is_err());
    /// ```
    pub fn from_value(value: &Value) -> EngineResult<Self> {
        let object = value.as_object().ok_or_else(|| EngineError::InvalidProfile {
            field: "profile".to_string(),
            message: format!("expected a JSON object, found {}", json_type_name(value)),
        })?;

        for field in REQUIRED_FIELDS {
            match object.get(*field) {
                None | Some(Value::Null) => {
                    return Err(EngineError::InvalidProfile {
                        field: field.to_string(),
                        message: "is required".to_string(),
                    });
                }
                Some(v) if !is_numeric(v) => {
                    return Err(EngineError::InvalidProfile {
                        field: field.to_string(),
                        message: format!("expected a number, found {}", json_type_name(v)),
                    });
                }
                Some(_) => {}
            }
        }

        serde_json::from_value(value.clone()).map_err(|e| EngineError::InvalidProfile {
            field: "profile".to_string(),
            message: e.to_string(),
        })
    }

    /// Sum of all salary components.
    pub fn gross_salary(&self) -> Decimal {
        self.basic
            + self.hra
            + self.conveyance
            + self.special_allowances
            + self.lta
            + self.bonus
            + self.other_taxable
    }

    /// Income taxed at slab rates: salary plus income from other sources.
    pub fn slab_income(&self) -> Decimal {
        self.gross_salary() + self.income_from_other_sources
    }

    /// Total income including capital gains, used to pick surcharge bands.
    pub fn gross_income(&self) -> Decimal {
        self.slab_income() + self.stcg + self.ltcg
    }

    /// Employee PF contribution for the year.
    pub fn employee_pf(&self) -> Decimal {
        percent_of_basic(self.basic, self.employee_pf_percent)
    }

    /// Employer PF contribution for the year.
    pub fn employer_pf(&self) -> Decimal {
        percent_of_basic(self.basic, self.employer_pf_percent)
    }

    /// Declared amount for a section, treating negatives and absences as zero.
    pub fn investment(&self, section: DeductionSection) -> Decimal {
        self.investments
            .get(section.code())
            .copied()
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO)
    }

    /// Returns a copy with every monetary field clamped to [`MAX_AMOUNT`],
    /// along with the names of the fields that were clamped.
    pub fn clamped(&self) -> (Self, Vec<String>) {
        let mut profile = self.clone();
        let mut clamped = Vec::new();

        {
            let fields: [(&str, &mut Decimal); 16] = [
                ("basic", &mut profile.basic),
                ("hra", &mut profile.hra),
                ("conveyance", &mut profile.conveyance),
                ("special_allowances", &mut profile.special_allowances),
                ("lta", &mut profile.lta),
                ("bonus", &mut profile.bonus),
                ("other_taxable", &mut profile.other_taxable),
                ("employee_pf_percent", &mut profile.employee_pf_percent),
                ("employer_pf_percent", &mut profile.employer_pf_percent),
                ("nps_employee", &mut profile.nps_employee),
                ("nps_employer", &mut profile.nps_employer),
                ("other_deductions", &mut profile.other_deductions),
                ("rent_paid", &mut profile.rent_paid),
                ("income_from_other_sources", &mut profile.income_from_other_sources),
                ("stcg", &mut profile.stcg),
                ("ltcg", &mut profile.ltcg),
            ];
            for (name, value) in fields {
                if clamp_amount(value) {
                    clamped.push(name.to_string());
                }
            }
        }

        for (code, value) in profile.investments.iter_mut() {
            if clamp_amount(value) {
                clamped.push(format!("investments.{code}"));
            }
        }

        (profile, clamped)
    }
}

/// Clamps `value` into `[-MAX_AMOUNT, MAX_AMOUNT]`, returning true if it changed.
fn clamp_amount(value: &mut Decimal) -> bool {
    let bounded = (*value).clamp(-MAX_AMOUNT, MAX_AMOUNT);
    let changed = bounded != *value;
    *value = bounded;
    changed
}

fn percent_of_basic(basic: Decimal, percent: Decimal) -> Decimal {
    let percent = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    basic.max(Decimal::ZERO) * percent / Decimal::ONE_HUNDRED
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<Decimal>().is_ok(),
        _ => false,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Options controlling which rules and regimes a calculation uses.
///
/// Regimes are given as strings so that unknown identifiers can be skipped
/// with a warning instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOptions {
    /// Financial year key such as `"2025-26"`. `None` selects the default rules.
    #[serde(default)]
    pub fy: Option<String>,
    /// Regimes to evaluate. Empty means every regime available for the year.
    #[serde(default)]
    pub regimes: Vec<String>,
}

impl CalculationOptions {
    /// Creates options for an explicit financial year and regime list.
    pub fn new(fy: impl Into<String>, regimes: &[&str]) -> Self {
        Self {
            fy: Some(fy.into()),
            regimes: regimes.iter().map(|r| r.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_max_amount_is_one_quadrillion() {
        assert_eq!(MAX_AMOUNT, dec("1000000000000000"));
    }

    #[test]
    fn test_missing_monetary_fields_default_to_zero() {
        let profile = SalaryProfile::from_value(&json!({ "basic": 300000 })).unwrap();
        assert_eq!(profile.basic, dec("300000"));
        assert_eq!(profile.hra, Decimal::ZERO);
        assert_eq!(profile.stcg, Decimal::ZERO);
        assert!(profile.investments.is_empty());
        assert_eq!(profile.age, 0);
    }

    #[test]
    fn test_missing_basic_is_a_validation_error() {
        let err = SalaryProfile::from_value(&json!({ "hra": 1000 })).unwrap_err();
        match err {
            EngineError::InvalidProfile { field, message } => {
                assert_eq!(field, "basic");
                assert_eq!(message, "is required");
            }
            other => panic!("Expected InvalidProfile, got {:?}", other),
        }
    }

    #[test]
    fn test_null_basic_is_a_validation_error() {
        let err = SalaryProfile::from_value(&json!({ "basic": null })).unwrap_err();
        assert!(matches!(err, EngineError::InvalidProfile { ref field, .. } if field == "basic"));
    }

    #[test]
    fn test_non_numeric_basic_is_a_validation_error() {
        let err = SalaryProfile::from_value(&json!({ "basic": "lots" })).unwrap_err();
        match err {
            EngineError::InvalidProfile { field, message } => {
                assert_eq!(field, "basic");
                assert!(message.contains("a string"));
            }
            other => panic!("Expected InvalidProfile, got {:?}", other),
        }
    }

    #[test]
    fn test_wrongly_typed_optional_field_is_reported() {
        let err = SalaryProfile::from_value(&json!({ "basic": 1, "hra": [1] })).unwrap_err();
        assert!(matches!(err, EngineError::InvalidProfile { ref field, .. } if field == "profile"));
    }

    #[test]
    fn test_profile_must_be_an_object() {
        let err = SalaryProfile::from_value(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_camel_case_aliases_are_accepted() {
        let profile = SalaryProfile::from_value(&json!({
            "basic": "500000",
            "specialAllowances": 100000,
            "employeePfPercent": 12,
            "livesInMetro": true,
            "incomeFromOtherSources": 5000
        }))
        .unwrap();
        assert_eq!(profile.special_allowances, dec("100000"));
        assert_eq!(profile.employee_pf_percent, dec("12"));
        assert!(profile.lives_in_metro);
        assert_eq!(profile.income_from_other_sources, dec("5000"));
    }

    #[test]
    fn test_gross_figures() {
        let profile = SalaryProfile {
            basic: dec("500000"),
            hra: dec("200000"),
            bonus: dec("50000"),
            income_from_other_sources: dec("10000"),
            stcg: dec("20000"),
            ltcg: dec("30000"),
            ..SalaryProfile::default()
        };
        assert_eq!(profile.gross_salary(), dec("750000"));
        assert_eq!(profile.slab_income(), dec("760000"));
        assert_eq!(profile.gross_income(), dec("810000"));
    }

    #[test]
    fn test_pf_contributions_are_percent_of_basic() {
        let profile = SalaryProfile {
            basic: dec("600000"),
            employee_pf_percent: dec("12"),
            employer_pf_percent: dec("12"),
            ..SalaryProfile::default()
        };
        assert_eq!(profile.employee_pf(), dec("72000"));
        assert_eq!(profile.employer_pf(), dec("72000"));
    }

    #[test]
    fn test_pf_is_never_negative() {
        let profile = SalaryProfile {
            basic: dec("-600000"),
            employee_pf_percent: dec("12"),
            employer_pf_percent: dec("-5"),
            ..SalaryProfile::default()
        };
        assert_eq!(profile.employee_pf(), Decimal::ZERO);
        assert_eq!(profile.employer_pf(), Decimal::ZERO);
    }

    #[test]
    fn test_investment_lookup_by_section() {
        let mut profile = SalaryProfile::default();
        profile.investments.insert("80C".to_string(), dec("120000"));
        profile.investments.insert("80D".to_string(), dec("-5"));
        assert_eq!(profile.investment(DeductionSection::Section80C), dec("120000"));
        assert_eq!(profile.investment(DeductionSection::Section80D), Decimal::ZERO);
        assert_eq!(
            profile.investment(DeductionSection::Section80Ccd1b),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_clamped_bounds_extreme_values() {
        let mut profile = SalaryProfile {
            basic: Decimal::from_scientific("1e20").unwrap(),
            stcg: Decimal::from_scientific("-1e20").unwrap(),
            hra: dec("1000"),
            ..SalaryProfile::default()
        };
        profile
            .investments
            .insert("80C".to_string(), Decimal::from_scientific("1e25").unwrap());

        let (clamped, fields) = profile.clamped();
        assert_eq!(clamped.basic, MAX_AMOUNT);
        assert_eq!(clamped.stcg, -MAX_AMOUNT);
        assert_eq!(clamped.hra, dec("1000"));
        assert_eq!(clamped.investments["80C"], MAX_AMOUNT);
        assert_eq!(fields, vec!["basic", "stcg", "investments.80C"]);
    }

    #[test]
    fn test_default_options_select_defaults() {
        let options: CalculationOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options.fy, None);
        assert!(options.regimes.is_empty());
    }

    #[test]
    fn test_options_constructor() {
        let options = CalculationOptions::new("2025-26", &["old", "new"]);
        assert_eq!(options.fy.as_deref(), Some("2025-26"));
        assert_eq!(options.regimes, vec!["old", "new"]);
    }
}
