//! Daily visibility history

use super::{mean_one_decimal, percent, SentimentTally};
use crate::analysis::AnalysisResult;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tracked-brand figures for one UTC calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total: usize,
    pub mentioned: usize,
    pub visibility: u32,
    pub avg_rank: Option<f64>,
    pub sentiments: SentimentTally,
}

#[derive(Default)]
struct DayBucket {
    total: usize,
    mentioned: usize,
    ranks: Vec<u32>,
    sentiments: SentimentTally,
}

/// Bucket results analyzed within `window_days` of `now` by UTC date.
///
/// Days without results are omitted; output is ascending by date.
pub fn aggregate_by_day(
    results: &[AnalysisResult],
    window_days: i64,
    now: DateTime<Utc>,
) -> Vec<DaySummary> {
    // A window too large to represent covers everything
    let cutoff = Duration::try_days(window_days.max(0))
        .and_then(|window| now.checked_sub_signed(window));
    let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for result in results.iter().filter(|r| cutoff.map_or(true, |c| r.analyzed_at >= c)) {
        let bucket = days.entry(result.analyzed_at.date_naive()).or_default();
        bucket.total += 1;

        if result.user_brand_mentioned {
            bucket.mentioned += 1;
            if let Some(rank) = result.user_brand_rank {
                bucket.ranks.push(rank);
            }
        }

        // NotMentioned has no slot in the day tally
        if let Some(sentiment) = result.user_brand_sentiment.as_mention() {
            bucket.sentiments.add(sentiment);
        }
    }

    days.into_iter()
        .map(|(date, bucket)| DaySummary {
            date,
            total: bucket.total,
            mentioned: bucket.mentioned,
            visibility: percent(bucket.mentioned, bucket.total),
            avg_rank: mean_one_decimal(&bucket.ranks),
            sentiments: bucket.sentiments,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BrandSentiment, Platform};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn result_at(at: DateTime<Utc>, rank: Option<u32>, sentiment: BrandSentiment) -> AnalysisResult {
        AnalysisResult {
            id: Uuid::new_v4(),
            brand_id: Uuid::nil(),
            query_id: Uuid::nil(),
            query_text: "q".to_string(),
            ai_response: String::new(),
            brand_mentions: vec![],
            citations: vec![],
            user_brand_mentioned: sentiment != BrandSentiment::NotMentioned,
            user_brand_rank: rank,
            user_brand_sentiment: sentiment,
            total_brands_mentioned: 0,
            total_citations: 0,
            platform: Platform::Chatgpt,
            analyzed_at: at,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_two_day_history() {
        let results = vec![
            result_at(at(2, 9), None, BrandSentiment::NotMentioned),
            result_at(at(1, 10), Some(1), BrandSentiment::Positive),
            result_at(at(1, 15), None, BrandSentiment::NotMentioned),
        ];
        let history = aggregate_by_day(&results, 30, at(3, 0));

        assert_eq!(history.len(), 2);

        let first = &history[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(first.total, 2);
        assert_eq!(first.mentioned, 1);
        assert_eq!(first.visibility, 50);
        assert_eq!(first.avg_rank, Some(1.0));
        assert_eq!(first.sentiments.positive, 1);

        let second = &history[1];
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(second.total, 1);
        assert_eq!(second.visibility, 0);
        assert_eq!(second.avg_rank, None);
        assert_eq!(second.sentiments.total(), 0);
    }

    #[test]
    fn test_window_excludes_old_results() {
        let results = vec![
            result_at(at(1, 0), Some(2), BrandSentiment::Neutral),
            result_at(at(20, 0), Some(3), BrandSentiment::Negative),
        ];
        let history = aggregate_by_day(&results, 7, at(21, 0));

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
        assert_eq!(history[0].sentiments.negative, 1);
    }

    #[test]
    fn test_window_start_is_inclusive() {
        let now = at(8, 12);
        let results = vec![
            result_at(now - Duration::days(7), None, BrandSentiment::Neutral),
            result_at(now - Duration::days(7) - Duration::seconds(1), None, BrandSentiment::Neutral),
        ];
        let history = aggregate_by_day(&results, 7, now);

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(history[0].total, 1);
    }

    #[test]
    fn test_huge_window_covers_everything() {
        let results = vec![result_at(at(1, 0), Some(1), BrandSentiment::Positive)];
        let history = aggregate_by_day(&results, 1_000_000_000, at(2, 0));
        assert_eq!(history.len(), 1);
        assert!(aggregate_by_day(&[], i64::MAX, at(2, 0)).is_empty());
    }

    #[test]
    fn test_empty_history() {
        assert!(aggregate_by_day(&[], 30, at(1, 0)).is_empty());
    }
}
