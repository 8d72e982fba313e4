// src/services/summary.rs

//! Hand-off to the remote summarization service.
//!
//! The service itself is a collaborator; this module bounds what is sent to it and types
//! what comes back.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AnnouncementSummary, SummaryConfig};
use crate::utils::text::truncate_with_ellipsis;

/// Failure reported by a summarizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    /// Nothing to summarize
    #[error("empty excerpt")]
    EmptyInput,

    /// The service could not be reached or rejected the request
    #[error("summarization service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something that is not a summary
    #[error("malformed summary response: {0}")]
    Malformed(String),
}

/// A bounded excerpt plus title, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub title: String,
    pub excerpt: String,
}

impl SummaryRequest {
    /// Bound `excerpt` to `max_chars` characters, appending `...` when cut.
    pub fn new(title: &str, excerpt: &str, max_chars: usize) -> Result<Self, SummaryError> {
        let excerpt = excerpt.trim();
        if excerpt.is_empty() {
            return Err(SummaryError::EmptyInput);
        }
        Ok(Self {
            title: title.to_string(),
            excerpt: truncate_with_ellipsis(excerpt, max_chars),
        })
    }

    pub fn from_config(title: &str, excerpt: &str, config: &SummaryConfig) -> Result<Self, SummaryError> {
        Self::new(title, excerpt, config.max_input_chars)
    }
}

/// Capability: summarize one announcement excerpt.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<AnnouncementSummary, SummaryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_is_bounded() {
        let text = "가".repeat(8100);
        let request = SummaryRequest::from_config("제목", &text, &SummaryConfig::default()).unwrap();
        assert_eq!(request.excerpt.chars().count(), 8003);
        assert!(request.excerpt.ends_with("..."));
    }

    #[test]
    fn test_short_excerpt_untouched() {
        let request = SummaryRequest::new("제목", "  사업개요 본문  ", 8000).unwrap();
        assert_eq!(request.excerpt, "사업개요 본문");
    }

    #[test]
    fn test_empty_excerpt_rejected() {
        assert_eq!(
            SummaryRequest::new("제목", "   ", 8000),
            Err(SummaryError::EmptyInput)
        );
    }
}
