//! Dashboard aggregation
//!
//! Pure functions over snapshots of analysis results:
//! - Brand-level metrics, distributions and leaderboards
//! - Daily visibility history
//! - Per-query run summaries
//!
//! None of them fail on empty input.

mod by_query;
mod dashboard;
mod history;

pub use by_query::{group_by_query, QueryResults};
pub use dashboard::{
    aggregate, CitationSummary, DashboardMetrics, LeaderboardEntry, MentionAggregator,
    RankDistribution, SentimentDistribution, DEFAULT_TOP_CITATIONS,
};
pub use history::{aggregate_by_day, DaySummary};

use crate::analysis::MentionSentiment;
use serde::{Deserialize, Serialize};

/// Counts over the three mention sentiments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentTally {
    pub fn add(&mut self, sentiment: MentionSentiment) {
        match sentiment {
            MentionSentiment::Positive => self.positive += 1,
            MentionSentiment::Negative => self.negative += 1,
            MentionSentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// `round(100 * part / total)`, 0 when total is 0
pub(crate) fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * part as f64 / total as f64).round() as u32
}

/// Mean rounded to one decimal place, `None` for no values
pub(crate) fn mean_one_decimal(values: &[u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: u64 = values.iter().map(|&v| v as u64).sum();
    let mean = sum as f64 / values.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn test_mean_one_decimal() {
        assert_eq!(mean_one_decimal(&[]), None);
        assert_eq!(mean_one_decimal(&[1, 2, 4]), Some(2.3));
        assert_eq!(mean_one_decimal(&[1, 2]), Some(1.5));
        assert_eq!(mean_one_decimal(&[2, 2, 3]), Some(2.3));
    }

    #[test]
    fn test_tally() {
        let mut tally = SentimentTally::default();
        tally.add(MentionSentiment::Positive);
        tally.add(MentionSentiment::Neutral);
        tally.add(MentionSentiment::Positive);
        assert_eq!(tally.positive, 2);
        assert_eq!(tally.total(), 3);
    }
}
