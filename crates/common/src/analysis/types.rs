//! Analysis records shared by the analyzer, the aggregators and the store

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Sentiment attached to a single brand mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionSentiment {
    Positive,
    Negative,
    Neutral,
}

/// Sentiment of the tracked brand across a whole answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandSentiment {
    Positive,
    Negative,
    Neutral,
    NotMentioned,
}

/// AI platform an answer was collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Chatgpt,
    Perplexity,
    Claude,
    Gemini,
}

impl MentionSentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl BrandSentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::NotMentioned => "not_mentioned",
        }
    }

    /// The per-mention sentiment, if the brand was mentioned at all
    pub fn as_mention(&self) -> Option<MentionSentiment> {
        match self {
            Self::Positive => Some(MentionSentiment::Positive),
            Self::Negative => Some(MentionSentiment::Negative),
            Self::Neutral => Some(MentionSentiment::Neutral),
            Self::NotMentioned => None,
        }
    }
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chatgpt => "chatgpt",
            Self::Perplexity => "perplexity",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
        }
    }
}

impl FromStr for MentionSentiment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(AppError::InvalidFormat {
                message: format!("unknown mention sentiment '{}'", other),
            }),
        }
    }
}

impl FromStr for BrandSentiment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "not_mentioned" => Ok(Self::NotMentioned),
            other => Err(AppError::InvalidFormat {
                message: format!("unknown brand sentiment '{}'", other),
            }),
        }
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chatgpt" => Ok(Self::Chatgpt),
            "perplexity" => Ok(Self::Perplexity),
            "claude" => Ok(Self::Claude),
            "gemini" => Ok(Self::Gemini),
            other => Err(AppError::InvalidFormat {
                message: format!("unknown platform '{}'", other),
            }),
        }
    }
}

impl fmt::Display for BrandSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One brand detected in an AI answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandMention {
    pub brand_name: String,

    /// 1-based order of first appearance
    #[serde(default)]
    pub rank: Option<u32>,

    /// At most 100 characters plus an ellipsis
    #[serde(default)]
    pub context: String,

    pub sentiment: MentionSentiment,

    #[serde(default)]
    pub is_user_brand: bool,
}

/// A source referenced by an AI answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: String,
}

/// Structured facts extracted from one AI answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub brand_mentions: Vec<BrandMention>,
    pub citations: Vec<Citation>,
    pub user_brand_mentioned: bool,
    pub user_brand_rank: Option<u32>,
    pub user_brand_sentiment: BrandSentiment,
    pub total_brands_mentioned: u32,
    pub summary: String,
    pub user_brand_context: Option<String>,
}

/// One analysis run of one query, as stored and aggregated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub query_id: Uuid,
    pub query_text: String,
    pub ai_response: String,
    pub brand_mentions: Vec<BrandMention>,
    pub citations: Vec<Citation>,
    pub user_brand_mentioned: bool,
    pub user_brand_rank: Option<u32>,
    pub user_brand_sentiment: BrandSentiment,
    pub total_brands_mentioned: u32,
    pub total_citations: u32,
    pub platform: Platform,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Build a new result record from an analyzer outcome
    pub fn from_outcome(
        brand_id: Uuid,
        query_id: Uuid,
        query_text: impl Into<String>,
        ai_response: impl Into<String>,
        outcome: AnalysisOutcome,
        platform: Platform,
        analyzed_at: DateTime<Utc>,
    ) -> Self {
        let total_citations = outcome.citations.len() as u32;
        Self {
            id: Uuid::new_v4(),
            brand_id,
            query_id,
            query_text: query_text.into(),
            ai_response: ai_response.into(),
            brand_mentions: outcome.brand_mentions,
            citations: outcome.citations,
            user_brand_mentioned: outcome.user_brand_mentioned,
            user_brand_rank: outcome.user_brand_rank,
            user_brand_sentiment: outcome.user_brand_sentiment,
            total_brands_mentioned: outcome.total_brands_mentioned,
            total_citations,
            platform,
            analyzed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_wire_names() {
        let json = serde_json::to_string(&BrandSentiment::NotMentioned).unwrap();
        assert_eq!(json, "\"not_mentioned\"");
        assert_eq!("not_mentioned".parse::<BrandSentiment>().unwrap(), BrandSentiment::NotMentioned);
    }

    #[test]
    fn test_unknown_sentiment_is_rejected() {
        assert!("mixed".parse::<MentionSentiment>().is_err());
        assert!("not_mentioned".parse::<MentionSentiment>().is_err());
        assert!(serde_json::from_str::<BrandSentiment>("\"great\"").is_err());
    }

    #[test]
    fn test_mention_defaults_at_boundary() {
        let mention: BrandMention =
            serde_json::from_str(r#"{"brandName": "Acme", "sentiment": "neutral"}"#).unwrap();
        assert_eq!(mention.rank, None);
        assert_eq!(mention.context, "");
        assert!(!mention.is_user_brand);
    }

    #[test]
    fn test_platform_default() {
        assert_eq!(Platform::default(), Platform::Chatgpt);
        assert_eq!("gemini".parse::<Platform>().unwrap().as_str(), "gemini");
    }
}
