//! Error kinds raised by the transaction feed pipeline.

use thiserror::Error;

/// Failure of a single synchronization cycle or of one of its steps.
///
/// Errors are cloneable so that a failed cycle can be stored in the published
/// view and observed by every subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The retrieval request failed or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// A raw record or response violates the expected shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// A formatter received input it cannot render
    #[error("Formatting error: {0}")]
    Formatting(String),
}

impl FeedError {
    pub fn is_network(&self) -> bool {
        matches!(self, FeedError::Network(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FeedError::Validation(_))
    }

    pub fn is_formatting(&self) -> bool {
        matches!(self, FeedError::Formatting(_))
    }

    /// Prefixes the message with the offending record id, keeping the kind.
    pub fn in_record(self, id: &str) -> Self {
        match self {
            FeedError::Network(msg) => FeedError::Network(format!("transaction {id}: {msg}")),
            FeedError::Validation(msg) => FeedError::Validation(format!("transaction {id}: {msg}")),
            FeedError::Formatting(msg) => FeedError::Formatting(format!("transaction {id}: {msg}")),
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Network(format!("request timed out: {err}"))
        } else {
            FeedError::Network(err.to_string())
        }
    }
}

pub type Result<T, E = FeedError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_predicates() {
        assert!(FeedError::Network("down".into()).is_network());
        assert!(FeedError::Validation("bad".into()).is_validation());
        assert!(FeedError::Formatting("NaN".into()).is_formatting());
        assert!(!FeedError::Formatting("NaN".into()).is_network());
    }

    #[test]
    fn test_error_display() {
        let err = FeedError::Validation("unknown transaction type 'transfer'".into());
        assert_eq!(
            err.to_string(),
            "Validation error: unknown transaction type 'transfer'"
        );
    }
}
