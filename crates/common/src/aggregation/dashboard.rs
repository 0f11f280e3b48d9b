//! Brand dashboard metrics
//!
//! Rolls a brand's analysis results up into visibility, sentiment and rank
//! figures, a leaderboard of every brand seen in the answers and the most
//! cited source domains.

use super::{mean_one_decimal, percent, SentimentTally};
use crate::analysis::{is_same_brand, mention_key, AnalysisResult, BrandSentiment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Citation domains kept when no limit is configured
pub const DEFAULT_TOP_CITATIONS: usize = 10;

/// Counts over the four brand-level sentiments; every key always present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub not_mentioned: usize,
}

impl SentimentDistribution {
    fn add(&mut self, sentiment: BrandSentiment) {
        match sentiment {
            BrandSentiment::Positive => self.positive += 1,
            BrandSentiment::Negative => self.negative += 1,
            BrandSentiment::Neutral => self.neutral += 1,
            BrandSentiment::NotMentioned => self.not_mentioned += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral + self.not_mentioned
    }
}

/// Tracked-brand rank buckets over ranked results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankDistribution {
    pub first: usize,
    pub second: usize,
    pub third: usize,
    pub other: usize,
}

impl RankDistribution {
    fn add(&mut self, rank: u32) {
        match rank {
            1 => self.first += 1,
            2 => self.second += 1,
            3 => self.third += 1,
            _ => self.other += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// First-seen spelling
    pub name: String,
    pub mentions: usize,
    pub visibility: u32,
    pub avg_rank: Option<f64>,
    pub sentiment: SentimentTally,
    pub is_user_brand: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationSummary {
    pub domain: String,
    pub count: usize,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub visibility_score: u32,
    pub total_prompts: usize,
    pub answers_mentioned: usize,
    pub average_rank: Option<f64>,
    /// Share of positive verdicts among answers that mention the brand
    pub sentiment_score: u32,
    pub sentiment_distribution: SentimentDistribution,
    pub rank_distribution: RankDistribution,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub top_citations: Vec<CitationSummary>,
}

struct BrandGroup {
    name: String,
    count: usize,
    ranks: Vec<u32>,
    sentiment: SentimentTally,
}

/// Aggregator with a configurable citation cut-off
#[derive(Debug, Clone)]
pub struct MentionAggregator {
    top_citations: usize,
}

impl Default for MentionAggregator {
    fn default() -> Self {
        Self {
            top_citations: DEFAULT_TOP_CITATIONS,
        }
    }
}

/// Aggregate with default settings
pub fn aggregate(results: &[AnalysisResult], tracked_brand: &str) -> DashboardMetrics {
    MentionAggregator::default().aggregate(results, tracked_brand)
}

impl MentionAggregator {
    pub fn new(top_citations: usize) -> Self {
        Self { top_citations }
    }

    pub fn aggregate(&self, results: &[AnalysisResult], tracked_brand: &str) -> DashboardMetrics {
        let total = results.len();
        let answers_mentioned = results.iter().filter(|r| r.user_brand_mentioned).count();

        let mut sentiment_distribution = SentimentDistribution::default();
        let mut rank_distribution = RankDistribution::default();
        let mut ranks = Vec::new();

        for result in results {
            sentiment_distribution.add(result.user_brand_sentiment);
            if let Some(rank) = result.user_brand_rank {
                rank_distribution.add(rank);
                ranks.push(rank);
            }
        }

        let sentiment_score = if total == 0 {
            0
        } else {
            let mentioned = total - sentiment_distribution.not_mentioned;
            percent(sentiment_distribution.positive, mentioned.max(1))
        };

        DashboardMetrics {
            visibility_score: percent(answers_mentioned, total),
            total_prompts: total,
            answers_mentioned,
            average_rank: mean_one_decimal(&ranks),
            sentiment_score,
            sentiment_distribution,
            rank_distribution,
            leaderboard: leaderboard(results, tracked_brand),
            top_citations: top_citations(results, self.top_citations),
        }
    }
}

/// Every brand mentioned across `results`, most mentioned first
fn leaderboard(results: &[AnalysisResult], tracked_brand: &str) -> Vec<LeaderboardEntry> {
    let total = results.len();

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<BrandGroup> = Vec::new();

    for mention in results.iter().flat_map(|r| r.brand_mentions.iter()) {
        if mention.brand_name.trim().is_empty() {
            continue;
        }
        let slot = *index.entry(mention_key(&mention.brand_name)).or_insert_with(|| {
            groups.push(BrandGroup {
                name: mention.brand_name.clone(),
                count: 0,
                ranks: Vec::new(),
                sentiment: SentimentTally::default(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.count += 1;
        group.sentiment.add(mention.sentiment);
        if let Some(rank) = mention.rank {
            group.ranks.push(rank);
        }
    }

    let mut entries: Vec<LeaderboardEntry> = groups
        .into_iter()
        .map(|g| {
            let is_user_brand = is_same_brand(&g.name, tracked_brand);
            LeaderboardEntry {
                visibility: percent(g.count, total),
                avg_rank: mean_one_decimal(&g.ranks),
                name: g.name,
                mentions: g.count,
                sentiment: g.sentiment,
                is_user_brand,
            }
        })
        .collect();

    // Stable: ties keep encounter order
    entries.sort_by(|a, b| b.mentions.cmp(&a.mentions));
    entries
}

/// Most cited domains (URL when the domain is missing), top `limit`
fn top_citations(results: &[AnalysisResult], limit: usize) -> Vec<CitationSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut summaries: Vec<CitationSummary> = Vec::new();

    for citation in results.iter().flat_map(|r| r.citations.iter()) {
        let key = if citation.domain.is_empty() {
            &citation.url
        } else {
            &citation.domain
        };
        if key.is_empty() {
            continue;
        }

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            summaries.push(CitationSummary {
                domain: key.clone(),
                count: 0,
                urls: Vec::new(),
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[slot];
        summary.count += 1;
        if !summary.urls.contains(&citation.url) {
            summary.urls.push(citation.url.clone());
        }
    }

    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries.truncate(limit);
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BrandMention, Citation, MentionSentiment, Platform};
    use chrono::Utc;
    use uuid::Uuid;

    fn mention(name: &str, rank: Option<u32>, user: bool) -> BrandMention {
        BrandMention {
            brand_name: name.to_string(),
            rank,
            context: String::new(),
            sentiment: MentionSentiment::Positive,
            is_user_brand: user,
        }
    }

    fn citation(domain: &str, url: &str) -> Citation {
        Citation {
            url: url.to_string(),
            title: String::new(),
            domain: domain.to_string(),
        }
    }

    fn result(
        rank: Option<u32>,
        sentiment: BrandSentiment,
        mentions: Vec<BrandMention>,
        citations: Vec<Citation>,
    ) -> AnalysisResult {
        AnalysisResult {
            id: Uuid::new_v4(),
            brand_id: Uuid::nil(),
            query_id: Uuid::nil(),
            query_text: "best crm?".to_string(),
            ai_response: String::new(),
            total_brands_mentioned: mentions.len() as u32,
            total_citations: citations.len() as u32,
            brand_mentions: mentions,
            citations,
            user_brand_mentioned: sentiment != BrandSentiment::NotMentioned,
            user_brand_rank: rank,
            user_brand_sentiment: sentiment,
            platform: Platform::Chatgpt,
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_input() {
        let metrics = aggregate(&[], "Acme");
        assert_eq!(metrics.visibility_score, 0);
        assert_eq!(metrics.total_prompts, 0);
        assert_eq!(metrics.average_rank, None);
        assert_eq!(metrics.sentiment_score, 0);
        assert_eq!(metrics.sentiment_distribution, SentimentDistribution::default());
        assert_eq!(metrics.rank_distribution, RankDistribution::default());
        assert!(metrics.leaderboard.is_empty());
        assert!(metrics.top_citations.is_empty());
    }

    #[test]
    fn test_visibility_and_distributions() {
        let results = vec![
            result(Some(1), BrandSentiment::Positive, vec![], vec![]),
            result(Some(2), BrandSentiment::Positive, vec![], vec![]),
            result(Some(4), BrandSentiment::Positive, vec![], vec![]),
            result(None, BrandSentiment::Neutral, vec![], vec![]),
            result(None, BrandSentiment::NotMentioned, vec![], vec![]),
            result(None, BrandSentiment::NotMentioned, vec![], vec![]),
        ];
        let metrics = aggregate(&results, "Acme");

        assert_eq!(metrics.visibility_score, 67);
        assert_eq!(metrics.answers_mentioned, 4);
        assert_eq!(metrics.average_rank, Some(2.3));
        assert_eq!(metrics.sentiment_distribution.total(), results.len());
        assert_eq!(metrics.sentiment_distribution.not_mentioned, 2);
        assert_eq!(
            metrics.rank_distribution,
            RankDistribution { first: 1, second: 1, third: 0, other: 1 }
        );
        assert_eq!(metrics.sentiment_score, 75);
    }

    #[test]
    fn test_sentiment_score_when_never_mentioned() {
        let results = vec![result(None, BrandSentiment::NotMentioned, vec![], vec![])];
        assert_eq!(aggregate(&results, "Acme").sentiment_score, 0);
    }

    #[test]
    fn test_leaderboard_grouping_and_order() {
        let results = vec![
            result(
                Some(2),
                BrandSentiment::Positive,
                vec![mention("Beta", Some(1), false), mention("Acme", Some(2), true)],
                vec![],
            ),
            result(
                None,
                BrandSentiment::NotMentioned,
                vec![mention("beta", Some(1), false), mention("Gamma", Some(2), false)],
                vec![],
            ),
            result(
                Some(1),
                BrandSentiment::Positive,
                vec![mention("ACME Inc.", Some(1), true), mention("BETA", Some(3), false)],
                vec![],
            ),
        ];
        let metrics = aggregate(&results, "Acme");
        let board = &metrics.leaderboard;

        let total_mentions: usize = results.iter().map(|r| r.brand_mentions.len()).sum();
        assert_eq!(board.iter().map(|e| e.mentions).sum::<usize>(), total_mentions);
        assert!(board.windows(2).all(|w| w[0].mentions >= w[1].mentions));

        assert_eq!(board[0].name, "Beta");
        assert_eq!(board[0].mentions, 3);
        assert_eq!(board[0].visibility, 100);
        assert_eq!(board[0].avg_rank, Some(1.7));
        assert!(!board[0].is_user_brand);

        assert_eq!(board[1].name, "Acme");
        assert_eq!(board[1].mentions, 2);
        assert_eq!(board[1].visibility, 67);
        assert!(board[1].is_user_brand);

        assert_eq!(board[2].name, "Gamma");
        assert_eq!(board[2].sentiment.positive, 1);
    }

    #[test]
    fn test_leaderboard_ties_keep_encounter_order() {
        let results = vec![result(
            None,
            BrandSentiment::NotMentioned,
            vec![
                mention("Zeta", Some(1), false),
                mention("Alpha", Some(2), false),
                mention("Mu", Some(3), false),
            ],
            vec![],
        )];
        let names: Vec<_> = aggregate(&results, "Acme")
            .leaderboard
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mu"]);
    }

    #[test]
    fn test_top_citations() {
        let results = vec![
            result(
                None,
                BrandSentiment::NotMentioned,
                vec![],
                vec![
                    citation("g2.com", "https://g2.com/a"),
                    citation("", "https://blog.example/post"),
                ],
            ),
            result(
                None,
                BrandSentiment::NotMentioned,
                vec![],
                vec![
                    citation("g2.com", "https://g2.com/b"),
                    citation("g2.com", "https://g2.com/a"),
                    citation("capterra.com", "https://capterra.com"),
                ],
            ),
        ];
        let citations = aggregate(&results, "Acme").top_citations;

        assert_eq!(citations[0].domain, "g2.com");
        assert_eq!(citations[0].count, 3);
        assert_eq!(citations[0].urls, vec!["https://g2.com/a", "https://g2.com/b"]);
        assert_eq!(citations[1].domain, "https://blog.example/post");
        assert_eq!(citations[2].domain, "capterra.com");
    }

    #[test]
    fn test_top_citations_limit() {
        let citations = (0..15)
            .map(|i| citation(&format!("site{}.com", i), &format!("https://site{}.com", i)))
            .collect();
        let results = vec![result(None, BrandSentiment::NotMentioned, vec![], citations)];

        assert_eq!(aggregate(&results, "Acme").top_citations.len(), DEFAULT_TOP_CITATIONS);
        assert_eq!(
            MentionAggregator::new(3).aggregate(&results, "Acme").top_citations.len(),
            3
        );
    }
}
