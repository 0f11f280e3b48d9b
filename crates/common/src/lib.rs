//! BrandLens Common Library
//!
//! Shared code for the BrandLens services including:
//! - Response analysis: brand normalization, matching and mention extraction
//! - Dashboard and history aggregation
//! - The query lifecycle and batch analysis runner
//! - LLM client abstraction with synthetic fallback
//! - Database models and repository patterns
//! - Error types, configuration, metrics

pub mod aggregation;
pub mod analysis;
pub mod config;
pub mod db;
pub mod errors;
pub mod llm;
pub mod metrics;
pub mod pipeline;

// Re-export commonly used types
pub use aggregation::{aggregate, aggregate_by_day, DashboardMetrics, DaySummary};
pub use analysis::{analyze, is_match, normalize, AnalysisResult, ResponseAnalyzer};
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};
pub use llm::AiClient;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
