//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Format;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Attachment selection rules
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Text extraction and converter settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Overview section keywords
    #[serde(default)]
    pub overview: OverviewConfig,

    /// Announcement store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Summarization hand-off settings
    #[serde(default)]
    pub summary: SummaryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.selection.title_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(AppError::validation("selection.title_keywords is empty"));
        }
        if self.selection.format_priority.is_empty() {
            return Err(AppError::validation("selection.format_priority is empty"));
        }
        for tag in &self.selection.format_priority {
            if Format::from_tag(tag).is_none() {
                return Err(AppError::validation(format!(
                    "selection.format_priority contains unknown format '{tag}'"
                )));
            }
        }
        if self.extraction.prefix_cap_chars == 0 {
            return Err(AppError::validation(
                "extraction.prefix_cap_chars must be > 0",
            ));
        }
        if self.extraction.converter_timeout_secs == 0 {
            return Err(AppError::validation(
                "extraction.converter_timeout_secs must be > 0",
            ));
        }
        if self.extraction.primary_converter.program.trim().is_empty() {
            return Err(AppError::validation(
                "extraction.primary_converter.program is empty",
            ));
        }
        if self.overview.start_keywords.is_empty() {
            return Err(AppError::validation("overview.start_keywords is empty"));
        }
        if self.store.capacity == 0 {
            return Err(AppError::validation("store.capacity must be > 0"));
        }
        if self.store.identity_param.trim().is_empty() {
            return Err(AppError::validation("store.identity_param is empty"));
        }
        if self.summary.max_input_chars == 0 {
            return Err(AppError::validation("summary.max_input_chars must be > 0"));
        }
        Ok(())
    }

    /// Format priority as parsed formats; unknown tags are skipped.
    pub fn format_priority(&self) -> Vec<Format> {
        self.selection
            .format_priority
            .iter()
            .filter_map(|tag| Format::from_tag(tag))
            .collect()
    }
}

/// Attachment selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Substrings a file name must contain (any, case-insensitive)
    #[serde(default = "defaults::title_keywords")]
    pub title_keywords: Vec<String>,

    /// Format tags in the order they are tried
    #[serde(default = "defaults::format_priority")]
    pub format_priority: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            title_keywords: defaults::title_keywords(),
            format_priority: defaults::format_priority(),
        }
    }
}

/// An external program invocation. `{input}` and `{output}` are substituted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConverterCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Character cap for prefix-based overviews
    #[serde(default = "defaults::prefix_cap_chars")]
    pub prefix_cap_chars: usize,

    /// Per-invocation converter timeout in seconds
    #[serde(default = "defaults::converter_timeout")]
    pub converter_timeout_secs: u64,

    /// HWP → XHTML converter; writes `index.xhtml` into `{output}`
    #[serde(default = "defaults::primary_converter")]
    pub primary_converter: ConverterCommand,

    /// HWP → plain text converter; writes to stdout
    #[serde(default = "defaults::secondary_converter")]
    pub secondary_converter: ConverterCommand,

    /// Whether HWP/PDF fall back to the prefix cap when no overview is located
    #[serde(default = "defaults::enabled")]
    pub overview_prefix_fallback: bool,

    /// Parent of converter staging directories (system temp dir if unset)
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            prefix_cap_chars: defaults::prefix_cap_chars(),
            converter_timeout_secs: defaults::converter_timeout(),
            primary_converter: defaults::primary_converter(),
            secondary_converter: defaults::secondary_converter(),
            overview_prefix_fallback: defaults::enabled(),
            staging_dir: None,
        }
    }
}

/// Overview locator vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewConfig {
    /// Section headers that open an overview, highest priority first
    #[serde(default = "defaults::start_keywords")]
    pub start_keywords: Vec<String>,

    /// Section headers that close an overview
    #[serde(default = "defaults::end_keywords")]
    pub end_keywords: Vec<String>,

    /// Candidate sections must be strictly longer than this (characters)
    #[serde(default = "defaults::min_section_chars")]
    pub min_section_chars: usize,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            start_keywords: defaults::start_keywords(),
            end_keywords: defaults::end_keywords(),
            min_section_chars: defaults::min_section_chars(),
        }
    }
}

/// Announcement store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of retained announcements
    #[serde(default = "defaults::capacity")]
    pub capacity: usize,

    /// Query parameter carrying the numeric identity key
    #[serde(default = "defaults::identity_param")]
    pub identity_param: String,

    /// chrono format of the open date
    #[serde(default = "defaults::date_format")]
    pub date_format: String,

    /// Search keyword recorded with the baseline
    #[serde(default)]
    pub search_keyword: String,

    /// Baseline file name inside the storage directory
    #[serde(default = "defaults::baseline_file")]
    pub baseline_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::capacity(),
            identity_param: defaults::identity_param(),
            date_format: defaults::date_format(),
            search_keyword: String::new(),
            baseline_file: defaults::baseline_file(),
        }
    }
}

/// Summarization hand-off settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Excerpts longer than this are truncated before being sent
    #[serde(default = "defaults::max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_input_chars: defaults::max_input_chars(),
        }
    }
}

mod defaults {
    use super::ConverterCommand;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // Selection defaults
    pub fn title_keywords() -> Vec<String> {
        strings(&["공고", "공고문", "announcement"])
    }
    pub fn format_priority() -> Vec<String> {
        strings(&["hwp", "pdf", "hwpx", "doc", "docx"])
    }

    // Extraction defaults
    pub fn prefix_cap_chars() -> usize {
        3000
    }
    pub fn converter_timeout() -> u64 {
        60
    }
    pub fn primary_converter() -> ConverterCommand {
        ConverterCommand {
            program: "hwp5html".into(),
            args: vec!["--output".into(), "{output}".into(), "{input}".into()],
        }
    }
    pub fn secondary_converter() -> ConverterCommand {
        ConverterCommand {
            program: "hwp5txt".into(),
            args: vec!["{input}".into()],
        }
    }
    pub fn enabled() -> bool {
        true
    }

    // Overview defaults
    pub fn start_keywords() -> Vec<String> {
        strings(&[
            "사업개요",
            "사업목적",
            "추진배경",
            "사업내용",
            "지원내용",
            "사업 개요",
            "사업 목적",
            "추진 배경",
            "1. 사업개요",
            "가. 사업개요",
        ])
    }
    pub fn end_keywords() -> Vec<String> {
        strings(&[
            "지원대상",
            "신청자격",
            "지원규모",
            "신청방법",
            "제출서류",
            "문의처",
            "접수방법",
            "신청기간",
            "2.",
            "나.",
            "다.",
        ])
    }
    pub fn min_section_chars() -> usize {
        50
    }

    // Store defaults
    pub fn capacity() -> usize {
        30
    }
    pub fn identity_param() -> String {
        "roRndUid".into()
    }
    pub fn date_format() -> String {
        "%Y.%m.%d".into()
    }
    pub fn baseline_file() -> String {
        "ntis_managed_data.json".into()
    }

    // Summary defaults
    pub fn max_input_chars() -> usize {
        8000
    }
}
