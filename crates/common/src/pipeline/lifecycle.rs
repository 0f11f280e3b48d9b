//! Query status lifecycle
//!
//! ```text
//! pending ──► processing ──► completed
//!                 │   ▲          │
//!                 ▼   └──────────┘ (re-run)
//!               failed ──► processing
//! ```

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, next: QueryStatus) -> bool {
        use QueryStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Failed, Processing)
                | (Completed, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
        )
    }

    /// Move to `next`, rejecting edges outside the lifecycle
    pub fn transition(self, next: QueryStatus) -> Result<QueryStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }

    pub fn begin(self) -> Result<QueryStatus> {
        self.transition(Self::Processing)
    }

    pub fn complete(self) -> Result<QueryStatus> {
        self.transition(Self::Completed)
    }

    pub fn fail(self) -> Result<QueryStatus> {
        self.transition(Self::Failed)
    }

    /// Picked up by a batch run without an explicit query
    pub fn is_batch_eligible(&self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(AppError::InvalidFormat {
                message: format!("unknown query status '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let status = QueryStatus::Pending.begin().unwrap();
        assert_eq!(status, QueryStatus::Processing);
        assert_eq!(status.complete().unwrap(), QueryStatus::Completed);
    }

    #[test]
    fn test_retry_and_rerun() {
        assert_eq!(QueryStatus::Failed.begin().unwrap(), QueryStatus::Processing);
        assert_eq!(QueryStatus::Completed.begin().unwrap(), QueryStatus::Processing);
        assert_eq!(QueryStatus::Processing.fail().unwrap(), QueryStatus::Failed);
    }

    #[test]
    fn test_invalid_transitions() {
        let err = QueryStatus::Pending.complete().unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert!(QueryStatus::Pending.fail().is_err());
        assert!(QueryStatus::Completed.fail().is_err());
        assert!(QueryStatus::Processing.begin().is_err());
        assert!(QueryStatus::Failed.transition(QueryStatus::Pending).is_err());
    }

    #[test]
    fn test_every_status_can_move_on() {
        let all = [
            QueryStatus::Pending,
            QueryStatus::Processing,
            QueryStatus::Completed,
            QueryStatus::Failed,
        ];
        for from in all {
            assert!(all.iter().any(|to| from.can_transition_to(*to)), "{} is stuck", from);
        }
    }

    #[test]
    fn test_batch_eligibility() {
        assert!(QueryStatus::Pending.is_batch_eligible());
        assert!(QueryStatus::Failed.is_batch_eligible());
        assert!(!QueryStatus::Processing.is_batch_eligible());
        assert!(!QueryStatus::Completed.is_batch_eligible());
    }

    #[test]
    fn test_parse() {
        assert_eq!("processing".parse::<QueryStatus>().unwrap(), QueryStatus::Processing);
        assert!("done".parse::<QueryStatus>().is_err());
        assert_eq!(QueryStatus::Failed.to_string(), "failed");
    }
}
