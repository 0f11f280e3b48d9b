//! Response analysis engine
//!
//! The analysis layer turns raw AI answers into structured facts:
//! - Brand name normalization and fuzzy matching
//! - Numbered-list mention extraction and tracked-brand verdicts
//! - Citation extraction
//! - Synthetic answers and template queries when the model is unavailable

mod analyzer;
mod matcher;
mod normalizer;
mod queries;
mod source;
mod synthetic;
mod types;

pub use analyzer::{
    analyze, domain_of, extract_citations, extract_mentions, truncate_context, ResponseAnalyzer,
    MAX_CONTEXT_CHARS,
};
pub(crate) use analyzer::mention_key;
pub use matcher::{is_match, is_same_brand};
pub use normalizer::{normalize, CORPORATE_SUFFIXES};
pub use queries::{parse_query_list, QueryGenerator, GENERATED_QUERY_COUNT};
pub use source::{AnswerSource, LlmAnswerSource};
pub use synthetic::{competitors_for, template_queries, SyntheticResponder};
pub use types::{
    AnalysisOutcome, AnalysisResult, BrandMention, BrandSentiment, Citation, MentionSentiment,
    Platform,
};
