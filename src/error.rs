//! Error types for the salary tax engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading tax rules or
//! evaluating a salary profile.

use thiserror::Error;

/// The main error type for the salary tax engine.
///
/// Only two families of errors exist: rule-book problems, which surface at
/// startup while loading configuration, and profile validation failures,
/// which abort a calculation before any regime is evaluated. Unknown regimes
/// and unknown financial years are reported as warnings, never as errors.
///
/// # Example
///
/// ```
/// use salary_tax_engine::error::EngineError;
///
/// let error = EngineError::InvalidProfile {
///     field: "basic".to_string(),
///     message: "is required".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid profile field 'basic': is required");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A rule set parsed correctly but is internally inconsistent.
    #[error("Invalid tax rules for FY {financial_year}: {message}")]
    InvalidRules {
        /// The financial year of the offending rule set.
        financial_year: String,
        /// What is wrong with the rule set.
        message: String,
    },

    /// A salary profile field was missing or had the wrong type.
    #[error("Invalid profile field '{field}': {message}")]
    InvalidProfile {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
