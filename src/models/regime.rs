//! Regime identifiers and financial-year keys.
//!
//! Both types are small `Copy` values used as map keys throughout the
//! engine, in rule files and in calculation results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the alternative statutory tax-computation methods.
///
/// The serialized names are stable identifiers shared with callers and
/// with the YAML rule files.
///
/// # Example
///
/// ```
/// use salary_tax_engine::models::RegimeId;
///
/// let regime: RegimeId = "new_post_2025".parse().unwrap();
/// assert_eq!(regime, RegimeId::NewPost2025);
/// assert_eq!(regime.to_string(), "new_post_2025");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegimeId {
    /// The old regime, which honours exemptions and chapter VI-A deductions.
    #[serde(rename = "old")]
    Old,
    /// The new regime under section 115BAC.
    #[serde(rename = "new")]
    New,
    /// The new regime as amended by the Finance Act 2025.
    #[serde(rename = "new_post_2025")]
    NewPost2025,
}

impl RegimeId {
    /// Every regime the engine knows how to name.
    pub const ALL: [RegimeId; 3] = [RegimeId::Old, RegimeId::New, RegimeId::NewPost2025];

    /// Returns the stable string identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegimeId::Old => "old",
            RegimeId::New => "new",
            RegimeId::NewPost2025 => "new_post_2025",
        }
    }
}

impl fmt::Display for RegimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known regime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown regime '{0}'")]
pub struct UnknownRegime(pub String);

impl FromStr for RegimeId {
    type Err = UnknownRegime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        RegimeId::ALL
            .into_iter()
            .find(|regime| regime.as_str() == normalized)
            .ok_or_else(|| UnknownRegime(s.to_string()))
    }
}

/// An Indian financial year, written `YYYY-YY` (e.g. `2025-26`).
///
/// The year runs from 1 April of the start year to 31 March of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FinancialYear {
    start_year: u16,
}

/// Returned when a string is not a well-formed `YYYY-YY` financial year.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid financial year '{0}': expected the form YYYY-YY")]
pub struct InvalidFinancialYear(pub String);

impl FinancialYear {
    /// Creates the financial year starting in April of `start_year`.
    pub fn new(start_year: u16) -> Self {
        Self { start_year }
    }

    /// Returns the calendar year in which this financial year starts.
    pub fn start_year(&self) -> u16 {
        self.start_year
    }

    /// Returns the number of years between two financial years.
    pub fn distance(&self, other: FinancialYear) -> u16 {
        self.start_year.abs_diff(other.start_year)
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start_year, (self.start_year + 1) % 100)
    }
}

impl FromStr for FinancialYear {
    type Err = InvalidFinancialYear;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidFinancialYear(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;

        if start.len() != 4 || end.len() != 2 {
            return Err(invalid());
        }
        if !start.bytes().chain(end.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let start_year: u16 = start.parse().map_err(|_| invalid())?;
        let end_suffix: u16 = end.parse().map_err(|_| invalid())?;
        if (start_year + 1) % 100 != end_suffix {
            return Err(invalid());
        }

        Ok(Self { start_year })
    }
}

impl TryFrom<String> for FinancialYear {
    type Error = InvalidFinancialYear;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FinancialYear> for String {
    fn from(fy: FinancialYear) -> Self {
        fy.to_string()
    }
}
