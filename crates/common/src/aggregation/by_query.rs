//! Per-query run summaries

use super::percent;
use crate::analysis::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    pub query: String,
    pub total_runs: usize,
    pub user_brand_mention_count: usize,
    pub visibility: u32,
    pub latest_result: AnalysisResult,
    /// Newest first
    pub results: Vec<AnalysisResult>,
}

/// Group results by query text.
///
/// Results are ordered newest first before grouping, so groups appear in the
/// order of their most recent run.
pub fn group_by_query(results: &[AnalysisResult]) -> Vec<QueryResults> {
    let mut ordered: Vec<&AnalysisResult> = results.iter().collect();
    ordered.sort_by(|a, b| b.analyzed_at.cmp(&a.analyzed_at));

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&AnalysisResult>> = Vec::new();

    for result in ordered {
        let slot = *index.entry(result.query_text.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(result);
    }

    groups
        .into_iter()
        .filter_map(|runs| {
            let latest = (*runs.first()?).clone();
            let mentioned = runs.iter().filter(|r| r.user_brand_mentioned).count();
            Some(QueryResults {
                query: latest.query_text.clone(),
                total_runs: runs.len(),
                user_brand_mention_count: mentioned,
                visibility: percent(mentioned, runs.len()),
                results: runs.into_iter().cloned().collect(),
                latest_result: latest,
            })
        })
        .collect()
}
