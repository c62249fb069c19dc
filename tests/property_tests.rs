/// Property-based tests using proptest
/// Invariants of the portfolio statistics calculator
use loan_portfolio_api::models::LoanRecord;
use loan_portfolio_api::stats::portfolio_statistics;
use proptest::prelude::*;

fn arb_record() -> impl Strategy<Value = LoanRecord> {
    (
        proptest::option::of(300u16..=850),
        any::<bool>(),
        0i64..5_000_000,
        0.0f64..150.0,
        0.0f64..100.0,
    )
        .prop_map(|(fico_score, defaulted, loan_amount, ltv_ratio, dti)| LoanRecord {
            id: "resource".to_string(),
            loan_id: "LOAN-X".to_string(),
            borrower_name: "Borrower".to_string(),
            borrower_state: "VA".to_string(),
            loan_amount,
            fico_score,
            ltv_ratio,
            dti,
            defaulted,
            risk_summary: None,
            internal_id: None,
        })
}

// Property: statistics computation should never panic
proptest! {
    #[test]
    fn statistics_never_panic(records in proptest::collection::vec(arb_record(), 0..60)) {
        let _ = portfolio_statistics(&records);
    }
}

// Property: counts always mirror the input set
proptest! {
    #[test]
    fn totals_match_input(records in proptest::collection::vec(arb_record(), 0..60)) {
        let stats = portfolio_statistics(&records);
        prop_assert_eq!(stats.total, records.len());
        prop_assert_eq!(stats.defaulted, records.iter().filter(|r| r.defaulted).count());
        prop_assert!(stats.defaulted <= stats.total);
    }
}

// Property: the default rate is exactly the rounded percentage ratio
proptest! {
    #[test]
    fn default_rate_is_rounded_ratio(records in proptest::collection::vec(arb_record(), 1..60)) {
        let stats = portfolio_statistics(&records);
        let expected = (stats.defaulted as f64 / stats.total as f64 * 100.0).round() as u32;
        prop_assert_eq!(stats.default_rate_pct, expected);
        prop_assert!(stats.default_rate_pct <= 100);
    }
}

// Property: the average stays inside the observed score range, with
// missing scores counting as zero
proptest! {
    #[test]
    fn average_bounded_by_observed_scores(records in proptest::collection::vec(arb_record(), 1..60)) {
        let stats = portfolio_statistics(&records);
        let scores: Vec<u32> = records
            .iter()
            .map(|r| u32::from(r.fico_score.unwrap_or(0)))
            .collect();
        let min = *scores.iter().min().unwrap();
        let max = *scores.iter().max().unwrap();
        prop_assert!(stats.avg_fico >= min, "avg {} below min {}", stats.avg_fico, min);
        prop_assert!(stats.avg_fico <= max, "avg {} above max {}", stats.avg_fico, max);
    }
}

// Property: record order never changes the statistics
proptest! {
    #[test]
    fn statistics_are_order_independent(records in proptest::collection::vec(arb_record(), 0..40)) {
        let forward = portfolio_statistics(&records);
        let mut reversed = records.clone();
        reversed.reverse();
        prop_assert_eq!(forward, portfolio_statistics(&reversed));
    }
}
