//! Request types for the salary tax engine API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::CalculationOptions;

/// Request body for the `/calculate` endpoint.
///
/// The profile is kept as raw JSON so that a missing or mistyped field is
/// reported against that field rather than as a generic parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The salary profile.
    pub profile: Value,
    /// Financial year and regimes to evaluate.
    #[serde(default)]
    pub options: CalculationOptions,
}

/// Query parameters for the `/regimes` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegimesQuery {
    /// Financial year such as `2025-26`; the default year when absent.
    #[serde(default)]
    pub fy: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_default_when_absent() {
        let request: CalculationRequest =
            serde_json::from_value(json!({ "profile": { "basic": 500000 } })).unwrap();
        assert_eq!(request.options, CalculationOptions::default());
        assert_eq!(request.profile["basic"], 500000);
    }

    #[test]
    fn test_options_are_parsed() {
        let request: CalculationRequest = serde_json::from_value(json!({
            "profile": { "basic": 500000 },
            "options": { "fy": "2024-25", "regimes": ["old", "new"] }
        }))
        .unwrap();
        assert_eq!(request.options.fy.as_deref(), Some("2024-25"));
        assert_eq!(request.options.regimes, vec!["old", "new"]);
    }

    #[test]
    fn test_profile_is_required() {
        let result = serde_json::from_value::<CalculationRequest>(json!({ "options": {} }));
        assert!(result.unwrap_err().to_string().contains("missing field `profile`"));
    }
}
