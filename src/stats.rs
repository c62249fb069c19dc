use crate::models::{LoanRecord, PortfolioStatistics};

/// Derives portfolio statistics from the complete current record set.
///
/// Pure: no incremental aggregation is permitted anywhere, so this is the
/// single place totals come from. Empty input yields all-zero statistics.
/// Averages and rates round half away from zero; they are display figures
/// only.
pub fn portfolio_statistics(records: &[LoanRecord]) -> PortfolioStatistics {
    if records.is_empty() {
        return PortfolioStatistics::default();
    }

    let total = records.len();
    let defaulted = records.iter().filter(|r| r.defaulted).count();
    // Records without a score count as zero, matching how partial data is
    // displayed.
    let fico_sum: u64 = records
        .iter()
        .map(|r| u64::from(r.fico_score.unwrap_or(0)))
        .sum();
    let avg_fico = (fico_sum as f64 / total as f64).round() as u32;
    let default_rate_pct = (defaulted as f64 / total as f64 * 100.0).round() as u32;

    PortfolioStatistics {
        total,
        defaulted,
        default_rate_pct,
        avg_fico,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fico: Option<u16>, defaulted: bool) -> LoanRecord {
        LoanRecord {
            id: "test".to_string(),
            loan_id: "LOAN-001".to_string(),
            borrower_name: "Test Borrower".to_string(),
            borrower_state: "VA".to_string(),
            loan_amount: 250_000,
            fico_score: fico,
            ltv_ratio: 80.0,
            dti: 36.0,
            defaulted,
            risk_summary: None,
            internal_id: Some(1),
        }
    }

    #[test]
    fn empty_input_yields_all_zero_statistics() {
        let stats = portfolio_statistics(&[]);
        assert_eq!(
            stats,
            PortfolioStatistics {
                total: 0,
                defaulted: 0,
                default_rate_pct: 0,
                avg_fico: 0,
            }
        );
    }

    #[test]
    fn two_record_portfolio() {
        let records = vec![record(Some(800), false), record(Some(600), true)];
        let stats = portfolio_statistics(&records);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.defaulted, 1);
        assert_eq!(stats.avg_fico, 700);
        assert_eq!(stats.default_rate_pct, 50);
    }

    #[test]
    fn missing_fico_counts_as_zero_in_average() {
        let records = vec![record(Some(800), false), record(None, false)];
        let stats = portfolio_statistics(&records);
        assert_eq!(stats.avg_fico, 400);
    }

    #[test]
    fn average_rounds_half_away_from_zero() {
        let records = vec![record(Some(700), false), record(Some(701), false)];
        // 700.5 rounds up, not to even
        assert_eq!(portfolio_statistics(&records).avg_fico, 701);
    }

    #[test]
    fn default_rate_rounds_to_nearest_percent() {
        let records = vec![
            record(Some(700), true),
            record(Some(700), false),
            record(Some(700), false),
        ];
        assert_eq!(portfolio_statistics(&records).default_rate_pct, 33);

        let records = vec![
            record(Some(700), true),
            record(Some(700), true),
            record(Some(700), false),
        ];
        assert_eq!(portfolio_statistics(&records).default_rate_pct, 67);
    }

    #[test]
    fn all_defaulted_is_one_hundred_percent() {
        let records = vec![record(Some(500), true), record(Some(510), true)];
        assert_eq!(portfolio_statistics(&records).default_rate_pct, 100);
    }
}
