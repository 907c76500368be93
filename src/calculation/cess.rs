//! Health and education cess.

use rust_decimal::Decimal;

use super::common::{money, non_negative_rupees, percent};
use crate::models::AuditStep;

/// The clause reference for the cess.
pub const CESS_CLAUSE: &str = "Finance Act, section 2(11)";

/// The result of levying cess.
#[derive(Debug, Clone)]
pub struct CessResult {
    /// Cess payable, in whole rupees.
    pub cess: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Levies cess on income tax plus surcharge.
pub fn calculate_cess(tax_with_surcharge: Decimal, rate: Decimal, step_number: u32) -> CessResult {
    let cess = non_negative_rupees(tax_with_surcharge * rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "cess".to_string(),
        rule_name: "Health and Education Cess".to_string(),
        clause_ref: CESS_CLAUSE.to_string(),
        input: serde_json::json!({
            "tax_with_surcharge": money(tax_with_surcharge),
            "rate": percent(rate)
        }),
        output: serde_json::json!({
            "cess": money(cess)
        }),
        reasoning: format!(
            "₹{} × {} = ₹{}",
            money(tax_with_surcharge),
            percent(rate),
            money(cess)
        ),
    };

    CessResult { cess, audit_step }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_four_percent_cess() {
        let result = calculate_cess(dec("12500"), dec("0.04"), 5);
        assert_eq!(result.cess, dec("500"));
        assert_eq!(result.audit_step.reasoning, "₹12500 × 4% = ₹500");
    }

    #[test]
    fn test_cess_rounds_to_rupees() {
        // 4% of 13 = 0.52
        assert_eq!(calculate_cess(dec("13"), dec("0.04"), 1).cess, dec("1"));
        // 4% of 1 = 0.04
        assert_eq!(calculate_cess(dec("1"), dec("0.04"), 1).cess, Decimal::ZERO);
    }

    #[test]
    fn test_no_tax_no_cess() {
        assert_eq!(calculate_cess(Decimal::ZERO, dec("0.04"), 1).cess, Decimal::ZERO);
    }
}
