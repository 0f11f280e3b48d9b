//! Query generation for newly tracked brands

use super::synthetic::template_queries;
use crate::errors::{AppError, Result};
use crate::llm::{extract_json_block, AiClient, CompletionOptions};
use crate::metrics;
use std::sync::Arc;

/// Number of queries requested per generation
pub const GENERATED_QUERY_COUNT: usize = 5;

/// Generates natural search prompts under which a brand could be recommended
pub struct QueryGenerator {
    client: Arc<dyn AiClient>,
    options: CompletionOptions,
}

impl QueryGenerator {
    pub fn new(client: Arc<dyn AiClient>, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    /// Generate queries, falling back to templates when the model is
    /// unavailable or returns something other than a string array.
    pub async fn generate(&self, brand_name: &str, category: &str, website: &str) -> Vec<String> {
        match self.generate_upstream(brand_name, category, website).await {
            Ok(queries) => queries,
            Err(e) => {
                if !matches!(e, AppError::UpstreamDisabled) {
                    tracing::warn!(brand = brand_name, error = %e, "Query generation failed, using templates");
                }
                metrics::record_fallback("queries", &format!("{:?}", e.code()));
                template_queries(brand_name, category)
            }
        }
    }

    async fn generate_upstream(
        &self,
        brand_name: &str,
        category: &str,
        website: &str,
    ) -> Result<Vec<String>> {
        let prompt = format!(
            "You are an AI visibility expert. Generate {count} natural search queries that a user might ask \
            an AI assistant where the brand \"{brand_name}\" (category: {category}, website: {website}) could \
            potentially be mentioned or recommended.\n\n\
            These should be realistic questions people would ask when looking for products/services in this category.\n\n\
            Return ONLY a JSON array of {count} query strings, no explanation. Example format:\n\
            [\"What is the best CRM software for startups?\", \"Which project management tool should I use?\"]",
            count = GENERATED_QUERY_COUNT,
        );

        let content = self.client.complete(&prompt, &self.options).await?;
        parse_query_list(&content)
    }
}

/// Parse the first JSON string array in `content`, dropping blank entries
pub fn parse_query_list(content: &str) -> Result<Vec<String>> {
    let json = extract_json_block(content, '[', ']').ok_or_else(|| {
        AppError::MalformedUpstreamOutput {
            message: "no JSON array in query generation response".to_string(),
        }
    })?;

    let queries: Vec<String> =
        serde_json::from_str(json).map_err(|e| AppError::MalformedUpstreamOutput {
            message: format!("query list is not a string array: {}", e),
        })?;

    let queries: Vec<String> = queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    if queries.is_empty() {
        return Err(AppError::MalformedUpstreamOutput {
            message: "query list is empty".to_string(),
        });
    }

    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{DisabledClient, MockClient};

    #[test]
    fn test_parse_query_list() {
        let content = "Here you go:\n[\"Best CRM?\", \"  \", \"Top CRM for agencies\"]";
        let queries = parse_query_list(content).unwrap();
        assert_eq!(queries, vec!["Best CRM?", "Top CRM for agencies"]);
    }

    #[test]
    fn test_parse_rejects_non_strings() {
        assert!(parse_query_list("[1, 2, 3]").is_err());
        assert!(parse_query_list("[]").is_err());
        assert!(parse_query_list("no list").is_err());
    }

    #[tokio::test]
    async fn test_generate_from_upstream() {
        let client = MockClient::new(r#"["What is the best CRM?", "Is Acme good?"]"#);
        let generator = QueryGenerator::new(Arc::new(client), CompletionOptions::default());
        let queries = generator.generate("Acme", "CRM", "acme.io").await;
        assert_eq!(queries.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_falls_back_to_templates() {
        let generator = QueryGenerator::new(Arc::new(DisabledClient), CompletionOptions::default());
        let queries = generator.generate("Acme", "CRM", "acme.io").await;
        assert_eq!(queries, template_queries("Acme", "CRM"));
        assert_eq!(queries.len(), GENERATED_QUERY_COUNT);
    }
}
