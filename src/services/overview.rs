// src/services/overview.rs

//! Overview locator.
//!
//! Finds the "business overview" passage inside unstructured extracted text. Each start
//! keyword opens a candidate span that runs to the nearest end keyword after it (or to the
//! end of the text). Candidates are scored by keyword priority first and length second:
//!
//! ```text
//! score = (start_keywords.len() - index) * 10 + min(chars / 100, 10)
//! ```

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::OverviewConfig;

/// Upper bound of the length component of the score.
const LENGTH_SCORE_CAP: usize = 10;

/// Keyword-scored overview locator.
#[derive(Debug, Clone)]
pub struct OverviewLocator {
    starts: Vec<Regex>,
    ends: Vec<Regex>,
    min_chars: usize,
}

impl OverviewLocator {
    /// Build a locator. Keywords match literally and case-insensitively.
    pub fn new<S: AsRef<str>>(start_keywords: &[S], end_keywords: &[S], min_chars: usize) -> Result<Self> {
        Ok(Self {
            starts: compile(start_keywords)?,
            ends: compile(end_keywords)?,
            min_chars,
        })
    }

    pub fn from_config(config: &OverviewConfig) -> Result<Self> {
        Self::new(&config.start_keywords, &config.end_keywords, config.min_section_chars)
    }

    /// Locate the best-scoring overview section.
    pub fn locate(&self, full_text: &str) -> Option<String> {
        let mut best: Option<(usize, &str)> = None;

        for (index, start) in self.starts.iter().enumerate() {
            let Some(section) = self.span(start, full_text) else {
                continue;
            };

            let score = self.score(index, section);
            let better = best.is_none_or(|(best_score, _)| score > best_score);
            if better && section.chars().count() > self.min_chars {
                log::debug!("Overview candidate '{}' scored {}", start.as_str(), score);
                best = Some((score, section));
            }
        }

        best.map(|(_, section)| section.to_string())
    }

    /// Trimmed span from the first match of `start` to the nearest end keyword.
    fn span<'t>(&self, start: &Regex, text: &'t str) -> Option<&'t str> {
        let found = start.find(text)?;
        let end = self.nearest_end(text, found.end());
        Some(text[found.start()..end].trim())
    }

    fn score(&self, index: usize, section: &str) -> usize {
        let length = section.chars().count();
        (self.starts.len() - index) * 10 + (length / 100).min(LENGTH_SCORE_CAP)
    }

    /// Byte offset of the first end keyword at or after `from`, or the end of the text.
    fn nearest_end(&self, text: &str, from: usize) -> usize {
        self.ends
            .iter()
            .filter_map(|end| end.find_at(text, from).map(|m| m.start()))
            .min()
            .unwrap_or(text.len())
    }
}

fn compile<S: AsRef<str>>(keywords: &[S]) -> Result<Vec<Regex>> {
    keywords
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .map(|k| Regex::new(&format!("(?i){}", regex::escape(k))).map_err(AppError::from))
        .collect()
}

/// Locate the overview with the default keyword vocabulary.
pub fn locate_overview(full_text: &str) -> Option<String> {
    OverviewLocator::from_config(&OverviewConfig::default())
        .ok()?
        .locate(full_text)
}
