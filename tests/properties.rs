//! Property-based tests for the salary tax engine.
//!
//! These run random salary profiles through every regime and check the
//! relationships that must hold for any input.

use proptest::prelude::*;
use rust_decimal::Decimal;

use salary_tax_engine::engine::TaxEngine;
use salary_tax_engine::models::{CalculationOptions, RegimeId, SalaryBreakdownResult, SalaryProfile};

const STATES: &[&str] = &["", "Maharashtra", "Karnataka", "Tamil Nadu", "West Bengal", "Atlantis"];

fn engine() -> TaxEngine {
    TaxEngine::builtin().expect("Failed to load builtin rules")
}

fn calculate(engine: &TaxEngine, profile: &SalaryProfile) -> SalaryBreakdownResult {
    engine
        .calculate_salary_breakdown(
            profile,
            &CalculationOptions::new("2025-26", &["old", "new", "new_post_2025"]),
        )
        .expect("calculation should succeed")
}

prop_compose! {
    fn salary_profile()(
        basic in 0u64..30_000_000u64,
        hra in 0u64..3_000_000u64,
        special in 0u64..5_000_000u64,
        rent in 0u64..3_000_000u64,
        pf_percent in 0u8..=20u8,
        c80 in 0u64..400_000u64,
        d80 in 0u64..100_000u64,
        age in 18i32..95i32,
        state in 0usize..STATES.len(),
        metro in any::<bool>(),
        stcg in 0u64..2_000_000u64,
        ltcg in 0u64..2_000_000u64,
    ) -> SalaryProfile {
        let mut profile = SalaryProfile {
            basic: Decimal::from(basic),
            hra: Decimal::from(hra),
            special_allowances: Decimal::from(special),
            rent_paid: Decimal::from(rent),
            employee_pf_percent: Decimal::from(pf_percent),
            age,
            state: STATES[state].to_string(),
            lives_in_metro: metro,
            stcg: Decimal::from(stcg),
            ltcg: Decimal::from(ltcg),
            ..SalaryProfile::default()
        };
        profile.investments.insert("80C".to_string(), Decimal::from(c80));
        profile.investments.insert("80D".to_string(), Decimal::from(d80));
        profile
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_tax_components_are_non_negative(profile in salary_profile()) {
        let result = calculate(&engine(), &profile);
        prop_assert_eq!(result.regimes.len(), 3);

        for r in result.regimes.values() {
            let tax = &r.income_tax;
            prop_assert!(tax.slab_tax >= Decimal::ZERO);
            prop_assert!(tax.rebate.amount >= Decimal::ZERO);
            prop_assert!(tax.marginal_relief >= Decimal::ZERO);
            prop_assert!(tax.surcharge.amount >= Decimal::ZERO);
            prop_assert!(tax.cess >= Decimal::ZERO);
            prop_assert!(tax.total >= Decimal::ZERO);
            prop_assert!(r.taxable_income >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_taxable_income_never_exceeds_gross_income(profile in salary_profile()) {
        let result = calculate(&engine(), &profile);
        for r in result.regimes.values() {
            prop_assert!(
                r.taxable_income <= r.gross_income,
                "{}: taxable {} > gross {}", r.regime, r.taxable_income, r.gross_income
            );
        }
    }

    #[test]
    fn test_total_is_sum_of_components(profile in salary_profile()) {
        let result = calculate(&engine(), &profile);
        for r in result.regimes.values() {
            let tax = &r.income_tax;
            let expected = tax.slab_tax - tax.rebate.amount - tax.marginal_relief
                + tax.capital_gains_tax
                + tax.surcharge.amount
                + tax.cess;
            prop_assert_eq!(tax.total, expected, "{}", r.regime);
        }
    }

    #[test]
    fn test_deductions_only_reduce_old_regime_income(profile in salary_profile()) {
        let result = calculate(&engine(), &profile);
        for regime in [RegimeId::New, RegimeId::NewPost2025] {
            let r = result.regime(regime).unwrap();
            prop_assert_eq!(r.breakdown.deductions.total, Decimal::ZERO);
            prop_assert_eq!(r.breakdown.exemptions.hra, Decimal::ZERO);
        }
    }

    #[test]
    fn test_tax_is_monotonic_in_basic(
        basic in 0u64..60_000_000u64,
        raise in 1u64..2_000_000u64,
    ) {
        let engine = engine();
        let lower = SalaryProfile { basic: Decimal::from(basic), ..SalaryProfile::default() };
        let higher = SalaryProfile { basic: Decimal::from(basic + raise), ..SalaryProfile::default() };

        let lower = calculate(&engine, &lower);
        let higher = calculate(&engine, &higher);
        for regime in RegimeId::ALL {
            let a = lower.regime(regime).unwrap().income_tax.total;
            let b = higher.regime(regime).unwrap().income_tax.total;
            prop_assert!(a <= b, "{}: {} then {}", regime, a, b);
        }
    }

    #[test]
    fn test_professional_tax_within_ceiling(profile in salary_profile()) {
        let result = calculate(&engine(), &profile);
        for r in result.regimes.values() {
            prop_assert!(r.professional_tax >= Decimal::ZERO);
            prop_assert!(r.professional_tax <= Decimal::from(2500));
        }
    }
}
