//! Response Analyzer - turns a free-text AI answer into brand-mention facts
//!
//! Provides:
//! - Numbered-list mention extraction (rank, context, sentiment)
//! - Tracked-brand verdict (rank, sentiment, context, summary)
//! - Citation extraction from markdown links and bare URLs
//! - Optional upstream (LLM) analysis with local fallback

use super::matcher::{is_match, is_same_brand};
use super::normalizer::normalize;
use super::types::{AnalysisOutcome, BrandMention, BrandSentiment, Citation, MentionSentiment};
use crate::errors::{AppError, Result};
use crate::llm::{extract_json_block, AiClient, CompletionOptions};
use crate::metrics;
use regex_lite::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// Maximum context length kept per mention, before the ellipsis
pub const MAX_CONTEXT_CHARS: usize = 100;

/// `1. **Name**: rest`, `1. *Name* - rest`, `1. **Name** rest`
fn emphasized_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\.\s*\*{1,2}([^*]+?)\*{1,2}(?:\s*[:\-–—])?\s*")
            .expect("valid list item pattern")
    })
}

/// `1. Name: rest`, `1. Name - rest`
fn plain_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\.\s+([^*:\n]+?)(?::|\s+[-–—]\s+)\s*")
            .expect("valid list item pattern")
    })
}

fn markdown_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[([^\]]+)\]\((https?://[^\s)]+)\)").expect("valid link pattern")
    })
}

fn bare_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s)\]>"'<]+"#).expect("valid url pattern"))
}

/// Truncate to `MAX_CONTEXT_CHARS` characters, appending `...` when cut
pub fn truncate_context(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > MAX_CONTEXT_CHARS {
        let head: String = text.chars().take(MAX_CONTEXT_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Key under which two mentions count as the same brand
pub(crate) fn mention_key(name: &str) -> String {
    let key = normalize(name);
    if key.is_empty() {
        name.trim().to_lowercase()
    } else {
        key
    }
}

/// Parse one line as a numbered list item: `(rank, name, context)`.
///
/// Ranks are 1-based; an item numbered `0.` is kept unranked.
fn parse_list_item(line: &str) -> Option<(Option<u32>, String, String)> {
    let caps = emphasized_item()
        .captures(line)
        .or_else(|| plain_item().captures(line))?;

    let whole = caps.get(0)?;
    let rank = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let rank = (rank > 0).then_some(rank);
    let name = caps
        .get(2)?
        .as_str()
        .trim()
        .trim_end_matches([':', '-', '–', '—'])
        .trim();

    if name.is_empty() {
        return None;
    }

    let context = truncate_context(&line[whole.end()..]);
    Some((rank, name.to_string(), context))
}

/// Extract list-derived mentions in order of first appearance.
///
/// Repeated names keep their first occurrence only.
pub fn extract_mentions(text: &str) -> Vec<BrandMention> {
    let mut seen = HashSet::new();
    let mut mentions = Vec::new();

    for line in text.lines() {
        let Some((rank, name, context)) = parse_list_item(line) else {
            continue;
        };

        if !seen.insert(mention_key(&name)) {
            continue;
        }

        mentions.push(BrandMention {
            brand_name: name,
            rank,
            context,
            sentiment: MentionSentiment::Positive,
            is_user_brand: false,
        });
    }

    mentions
}

/// Host of a URL, lower-cased and without a leading `www.`
pub fn domain_of(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .rsplit('@')
        .next()
        .unwrap_or("");
    let host = host.split(':').next().unwrap_or("").to_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

/// Extract citations from markdown links and bare URLs, unique by URL
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let mut seen = HashSet::new();
    let mut citations = Vec::new();

    for caps in markdown_link().captures_iter(text) {
        let (Some(title), Some(url)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let url = url.as_str().to_string();
        if seen.insert(url.clone()) {
            citations.push(Citation {
                domain: domain_of(&url),
                title: title.as_str().trim().to_string(),
                url,
            });
        }
    }

    for m in bare_url().find_iter(text) {
        let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if seen.insert(url.to_string()) {
            let domain = domain_of(url);
            citations.push(Citation {
                url: url.to_string(),
                title: domain.clone(),
                domain,
            });
        }
    }

    citations
}

fn summary_for(rank: Option<u32>, sentiment: BrandSentiment) -> String {
    match (rank, sentiment) {
        (Some(rank), _) => format!("Your brand was ranked #{} in the list of recommendations.", rank),
        (None, BrandSentiment::NotMentioned) => {
            "Your brand was not mentioned in the top results.".to_string()
        }
        (None, _) => "Your brand was mentioned in the text but not ranked.".to_string(),
    }
}

/// First sentence of `text` that mentions the brand
fn mention_sentence(text: &str, brand_name: &str) -> Option<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .find(|s| is_match(s, brand_name))
        .map(str::to_string)
}

/// Flag the first mention matching the tracked brand; returns its index
fn flag_user_brand(mentions: &mut [BrandMention], user_brand: &str) -> Option<usize> {
    for mention in mentions.iter_mut() {
        mention.is_user_brand = false;
    }
    let index = mentions
        .iter()
        .position(|m| is_same_brand(&m.brand_name, user_brand))?;
    mentions[index].is_user_brand = true;
    Some(index)
}

/// Analyze an answer locally. Deterministic; never fails.
pub fn analyze(text: &str, user_brand: &str, category: &str) -> AnalysisOutcome {
    let mut mentions = extract_mentions(text);
    let citations = extract_citations(text);

    let mut rank = None;
    let mut sentiment = BrandSentiment::NotMentioned;
    let mut context = None;

    if let Some(index) = flag_user_brand(&mut mentions, user_brand) {
        let mention = &mentions[index];
        rank = mention.rank;
        sentiment = BrandSentiment::Positive;
        context = Some(mention.context.clone());
    } else if is_match(text, user_brand) {
        sentiment = BrandSentiment::Neutral;
        context = mention_sentence(text, user_brand);
    }

    tracing::debug!(
        category,
        mentions = mentions.len(),
        citations = citations.len(),
        user_rank = ?rank,
        sentiment = %sentiment,
        "Analyzed response locally"
    );

    AnalysisOutcome {
        total_brands_mentioned: mentions.len() as u32,
        user_brand_mentioned: rank.is_some() || sentiment != BrandSentiment::NotMentioned,
        summary: summary_for(rank, sentiment),
        brand_mentions: mentions,
        citations,
        user_brand_rank: rank,
        user_brand_sentiment: sentiment,
        user_brand_context: context,
    }
}

/// Analysis as returned by the upstream model; every field optional
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamAnalysis {
    #[serde(default)]
    brand_mentions: Vec<BrandMention>,
    #[serde(default)]
    citations: Vec<Citation>,
    #[serde(default)]
    user_brand_sentiment: Option<BrandSentiment>,
    #[serde(default)]
    summary: Option<String>,
}

/// Build an outcome from upstream JSON, re-establishing the record invariants
fn outcome_from_upstream(content: &str, text: &str, user_brand: &str) -> Result<AnalysisOutcome> {
    let json = extract_json_block(content, '{', '}').ok_or_else(|| {
        AppError::MalformedUpstreamOutput {
            message: "no JSON object in analysis response".to_string(),
        }
    })?;

    let upstream: UpstreamAnalysis =
        serde_json::from_str(json).map_err(|e| AppError::MalformedUpstreamOutput {
            message: format!("analysis JSON did not match schema: {}", e),
        })?;

    let mut seen = HashSet::new();
    let mut mentions: Vec<BrandMention> = upstream
        .brand_mentions
        .into_iter()
        .filter(|m| !m.brand_name.trim().is_empty())
        .filter(|m| seen.insert(mention_key(&m.brand_name)))
        .map(|m| BrandMention {
            brand_name: m.brand_name.trim().to_string(),
            context: truncate_context(&m.context),
            rank: m.rank.filter(|r| *r > 0),
            ..m
        })
        .collect();

    let user_index = flag_user_brand(&mut mentions, user_brand);
    let mentioned = user_index.is_some() || is_match(text, user_brand);

    let (rank, context, mention_sentiment) = match user_index {
        Some(i) => (
            mentions[i].rank,
            Some(mentions[i].context.clone()),
            Some(mentions[i].sentiment),
        ),
        None => (None, mentioned.then(|| mention_sentence(text, user_brand)).flatten(), None),
    };

    let sentiment = if !mentioned {
        BrandSentiment::NotMentioned
    } else {
        match upstream.user_brand_sentiment {
            Some(BrandSentiment::NotMentioned) | None => match mention_sentiment {
                Some(MentionSentiment::Positive) => BrandSentiment::Positive,
                Some(MentionSentiment::Negative) => BrandSentiment::Negative,
                Some(MentionSentiment::Neutral) | None => BrandSentiment::Neutral,
            },
            Some(s) => s,
        }
    };

    let mut urls = HashSet::new();
    let citations: Vec<Citation> = upstream
        .citations
        .into_iter()
        .filter(|c| !c.url.trim().is_empty())
        .filter(|c| urls.insert(c.url.clone()))
        .map(|c| Citation {
            domain: if c.domain.is_empty() { domain_of(&c.url) } else { c.domain },
            ..c
        })
        .collect();

    let summary = upstream
        .summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| summary_for(rank, sentiment));

    Ok(AnalysisOutcome {
        total_brands_mentioned: mentions.len() as u32,
        brand_mentions: mentions,
        citations,
        user_brand_mentioned: mentioned,
        user_brand_rank: rank,
        user_brand_sentiment: sentiment,
        summary,
        user_brand_context: context,
    })
}

fn analysis_prompt(text: &str, user_brand: &str, category: &str) -> String {
    format!(
        "Analyze the following AI response for brand mentions and citations.\n\n\
        AI Response to analyze:\n\"\"\"\n{text}\n\"\"\"\n\n\
        User's Brand to track: \"{user_brand}\"\nCategory: \"{category}\"\n\n\
        Return a JSON object with:\n\
        1. \"brandMentions\": array of {{\"brandName\", \"rank\" (order of appearance, 1 = first), \"context\", \"sentiment\" (positive/negative/neutral)}}\n\
        2. \"citations\": array of {{\"url\", \"title\", \"domain\"}}\n\
        3. \"userBrandMentioned\": boolean\n\
        4. \"userBrandRank\": number or null\n\
        5. \"userBrandSentiment\": \"positive\", \"negative\", \"neutral\" or \"not_mentioned\"\n\
        6. \"totalBrandsMentioned\": number of unique brands\n\
        7. \"summary\": brief summary of how brands are discussed\n\n\
        Return ONLY valid JSON, no explanation."
    )
}

/// Analyzer with an optional upstream model in front of the local extractor
pub struct ResponseAnalyzer {
    client: Arc<dyn AiClient>,
    options: CompletionOptions,
}

impl ResponseAnalyzer {
    pub fn new(client: Arc<dyn AiClient>, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    /// Analyze an answer, preferring the upstream model.
    ///
    /// Upstream failures and malformed output fall back to [`analyze`]; the
    /// caller always receives a complete outcome.
    pub async fn analyze(&self, text: &str, user_brand: &str, category: &str) -> AnalysisOutcome {
        let prompt = analysis_prompt(text, user_brand, category);

        let upstream = match self.client.complete(&prompt, &self.options).await {
            Ok(content) => outcome_from_upstream(&content, text, user_brand),
            Err(e) => Err(e),
        };

        match upstream {
            Ok(outcome) => outcome,
            Err(e) => {
                if matches!(e, AppError::UpstreamDisabled) {
                    tracing::debug!("Upstream analysis disabled, using local extraction");
                } else {
                    tracing::warn!(error = %e, "Upstream analysis failed, using local extraction");
                }
                metrics::record_fallback("analysis", &format!("{:?}", e.code()));
                analyze(text, user_brand, category)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{DisabledClient, MockClient};

    const LIST: &str = "1. **Acme**: great tool\n2. **Beta**: also good";

    #[test]
    fn test_ranked_list_scenario() {
        let outcome = analyze(LIST, "Acme", "crm");
        assert!(outcome.user_brand_mentioned);
        assert_eq!(outcome.user_brand_rank, Some(1));
        assert_eq!(outcome.user_brand_sentiment, BrandSentiment::Positive);
        assert_eq!(outcome.total_brands_mentioned, 2);
        assert_eq!(outcome.user_brand_context.as_deref(), Some("great tool"));
        assert!(outcome.brand_mentions[0].is_user_brand);
        assert!(!outcome.brand_mentions[1].is_user_brand);
        assert_eq!(
            outcome.summary,
            "Your brand was ranked #1 in the list of recommendations."
        );
    }

    #[test]
    fn test_unranked_mention_scenario() {
        let outcome = analyze("Acme is a solid choice. Others exist too.", "Acme", "crm");
        assert!(outcome.user_brand_mentioned);
        assert_eq!(outcome.user_brand_rank, None);
        assert_eq!(outcome.user_brand_sentiment, BrandSentiment::Neutral);
        assert_eq!(outcome.user_brand_context.as_deref(), Some("Acme is a solid choice"));
        assert_eq!(outcome.total_brands_mentioned, 0);
    }

    #[test]
    fn test_absent_brand_scenario() {
        let outcome = analyze(LIST, "Zyx", "crm");
        assert!(!outcome.user_brand_mentioned);
        assert_eq!(outcome.user_brand_rank, None);
        assert_eq!(outcome.user_brand_sentiment, BrandSentiment::NotMentioned);
        assert!(outcome.brand_mentions.iter().all(|m| !m.is_user_brand));
        assert_eq!(
            outcome.summary,
            "Your brand was not mentioned in the top results."
        );
    }

    #[test]
    fn test_list_item_variants() {
        let text = "1. **Alpha** - fast\n2. *Bravo*: cheap\n3. Charlie: simple\n4. Delta – solid\n5. **Echo** strong community\n6. **Foxtrot:** tidy";
        let mentions = extract_mentions(text);
        let names: Vec<_> = mentions.iter().map(|m| m.brand_name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot"]);
        assert_eq!(mentions[0].context, "fast");
        assert_eq!(mentions[4].context, "strong community");
        assert_eq!(mentions[5].context, "tidy");
        assert!(mentions.iter().all(|m| m.sentiment == MentionSentiment::Positive));
    }

    #[test]
    fn test_rank_comes_from_list_number() {
        let mentions = extract_mentions("3. **Gamma**: third\n7. **Kappa**: seventh");
        assert_eq!(mentions[0].rank, Some(3));
        assert_eq!(mentions[1].rank, Some(7));
    }

    #[test]
    fn test_zero_numbered_item_is_unranked() {
        let outcome = analyze("0. **Acme**: x\n1. **Beta**: y", "Acme", "crm");
        assert!(outcome.user_brand_mentioned);
        assert_eq!(outcome.user_brand_rank, None);
        assert_eq!(outcome.brand_mentions[0].rank, None);
        assert_eq!(outcome.brand_mentions[1].rank, Some(1));
    }

    #[test]
    fn test_non_list_lines_ignored() {
        let text = "Version 2.5 is out\n- **Bullet**: not numbered\nIn 2024. We saw growth";
        assert!(extract_mentions(text).is_empty());
    }

    #[test]
    fn test_duplicate_names_counted_once() {
        let text = "1. **Acme**: first\n2. **Beta**: second\n3. **ACME Inc.**: again";
        let outcome = analyze(text, "Acme", "crm");
        assert_eq!(outcome.total_brands_mentioned, 2);
        assert_eq!(outcome.user_brand_rank, Some(1));
    }

    #[test]
    fn test_single_user_brand_flag() {
        let text = "1. **Acme Robotics**: one\n2. **Acme Cloud**: two";
        let outcome = analyze(text, "Acme", "crm");
        let flagged = outcome.brand_mentions.iter().filter(|m| m.is_user_brand).count();
        assert_eq!(flagged, 1);
        assert_eq!(outcome.user_brand_rank, Some(1));
    }

    #[test]
    fn test_context_truncated() {
        let long = "x".repeat(150);
        let mentions = extract_mentions(&format!("1. **Acme**: {}", long));
        assert_eq!(mentions[0].context.chars().count(), MAX_CONTEXT_CHARS + 3);
        assert!(mentions[0].context.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let text = "é".repeat(120);
        let truncated = truncate_context(&text);
        assert_eq!(truncated.chars().count(), 103);
    }

    #[test]
    fn test_mentioned_outside_list() {
        let text = "Some teams still prefer Acme! It is cheap.\n\n1. **Beta**: good\n2. **Gamma**: fine";
        let outcome = analyze(text, "Acme", "crm");
        assert_eq!(outcome.user_brand_sentiment, BrandSentiment::Neutral);
        assert_eq!(outcome.user_brand_rank, None);
        assert_eq!(
            outcome.user_brand_context.as_deref(),
            Some("Some teams still prefer Acme")
        );
        assert_eq!(
            outcome.summary,
            "Your brand was mentioned in the text but not ranked."
        );
    }

    #[test]
    fn test_citation_extraction() {
        let text = "See [G2 Reviews](https://www.g2.com/categories/crm) and https://capterra.com/crm. \
                    Also [G2 again](https://www.g2.com/categories/crm).";
        let citations = extract_citations(text);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].title, "G2 Reviews");
        assert_eq!(citations[0].domain, "g2.com");
        assert_eq!(citations[1].url, "https://capterra.com/crm");
        assert_eq!(citations[1].domain, "capterra.com");
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://www.TechRadar.com/best/x?y=1"), "techradar.com");
        assert_eq!(domain_of("http://user@example.org:8080/path"), "example.org");
        assert_eq!(domain_of("example.net/page"), "example.net");
    }

    #[tokio::test]
    async fn test_upstream_disabled_falls_back() {
        let analyzer = ResponseAnalyzer::new(Arc::new(DisabledClient), CompletionOptions::default());
        let outcome = analyzer.analyze(LIST, "Acme", "crm").await;
        assert_eq!(outcome, analyze(LIST, "Acme", "crm"));
    }

    #[tokio::test]
    async fn test_malformed_upstream_falls_back() {
        let client = MockClient::new("I could not analyze that, sorry.");
        let analyzer = ResponseAnalyzer::new(Arc::new(client), CompletionOptions::default());
        let outcome = analyzer.analyze(LIST, "Acme", "crm").await;
        assert_eq!(outcome.user_brand_rank, Some(1));
    }

    #[tokio::test]
    async fn test_unknown_upstream_sentiment_falls_back() {
        let client = MockClient::new(
            r#"{"brandMentions": [{"brandName": "Acme", "rank": 1, "sentiment": "ecstatic"}]}"#,
        );
        let analyzer = ResponseAnalyzer::new(Arc::new(client), CompletionOptions::default());
        let outcome = analyzer.analyze(LIST, "Acme", "crm").await;
        assert_eq!(outcome, analyze(LIST, "Acme", "crm"));
    }

    #[tokio::test]
    async fn test_upstream_zero_rank_dropped() {
        let client = MockClient::new(
            r#"{"brandMentions": [{"brandName": "Acme", "rank": 0, "context": "x", "sentiment": "positive"}]}"#,
        );
        let analyzer = ResponseAnalyzer::new(Arc::new(client), CompletionOptions::default());
        let outcome = analyzer.analyze("Acme is fine", "Acme", "crm").await;

        assert!(outcome.user_brand_mentioned);
        assert_eq!(outcome.user_brand_rank, None);
    }

    #[tokio::test]
    async fn test_upstream_output_normalized() {
        let client = MockClient::new(
            r#"```json
            {
              "brandMentions": [
                {"brandName": "Beta", "rank": 1, "context": "solid", "sentiment": "neutral", "isUserBrand": true},
                {"brandName": "Acme Inc", "rank": 2, "context": "pricey", "sentiment": "negative"}
              ],
              "userBrandSentiment": "not_mentioned",
              "userBrandRank": 5,
              "totalBrandsMentioned": 9
            }
            ```"#,
        );
        let analyzer = ResponseAnalyzer::new(Arc::new(client), CompletionOptions::default());
        let outcome = analyzer.analyze("1. Beta: solid\n2. Acme: pricey", "Acme", "crm").await;

        assert!(!outcome.brand_mentions[0].is_user_brand);
        assert!(outcome.brand_mentions[1].is_user_brand);
        assert_eq!(outcome.user_brand_rank, Some(2));
        assert_eq!(outcome.user_brand_sentiment, BrandSentiment::Negative);
        assert_eq!(outcome.total_brands_mentioned, 2);
        assert!(outcome.citations.is_empty());
        assert_eq!(outcome.summary, "Your brand was ranked #2 in the list of recommendations.");
    }
}
