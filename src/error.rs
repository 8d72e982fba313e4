// src/error.rs

//! Error types for the digest pipeline.
//!
//! Two layers are kept apart:
//! - [`AppError`] aborts a run (unreadable download directory, baseline not writable, bad config).
//! - [`DocumentError`] is scoped to a single announcement and is recorded on its output record.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Format;

/// Result type alias for run-level operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Run-fatal application error.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Regex compilation failed
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The download directory could not be listed
    #[error("Cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The baseline could not be persisted
    #[error("Cannot write baseline {key}: {message}")]
    BaselineWrite { key: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a directory listing error.
    pub fn directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryUnreadable {
            path: path.into(),
            source,
        }
    }

    /// Create a baseline write error.
    pub fn baseline_write(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::BaselineWrite {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

/// Per-document failure, recorded on the announcement's output record.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentError {
    /// Byte signature matches no known container
    #[error("unrecognized file format: {path}")]
    FormatUnrecognized { path: PathBuf },

    /// Declared format disagrees with the byte content
    #[error("{path} is named as {declared} but its signature is {detected}")]
    SignatureMismatch {
        path: PathBuf,
        declared: Format,
        detected: Format,
    },

    /// Every extraction path ran but produced no text
    #[error("no text could be extracted from {path}")]
    ExtractionEmpty { path: PathBuf },

    /// A converter process or parsing library failed
    #[error("{tool} failed: {reason}")]
    ExternalToolFailure {
        tool: String,
        reason: String,
        timed_out: bool,
    },

    /// No file in the directory survived keyword and signature filtering
    #[error("no announcement file found in {directory}")]
    NoCandidateFound { directory: PathBuf },

    /// The announcement's document was never downloaded
    #[error("announcement document unavailable: {reason}")]
    NotDownloaded { reason: String },

    /// Full text is usable but the overview section was not found
    #[error("overview section not located")]
    OverviewNotLocated,
}

impl DocumentError {
    /// Stable machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FormatUnrecognized { .. } => "format_unrecognized",
            Self::SignatureMismatch { .. } => "signature_mismatch",
            Self::ExtractionEmpty { .. } => "extraction_empty",
            Self::ExternalToolFailure { .. } => "external_tool_failure",
            Self::NoCandidateFound { .. } => "no_candidate_found",
            Self::NotDownloaded { .. } => "not_downloaded",
            Self::OverviewNotLocated => "overview_not_located",
        }
    }

    /// Create an external tool failure.
    pub fn tool(tool: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::ExternalToolFailure {
            tool: tool.into(),
            reason: reason.to_string(),
            timed_out: false,
        }
    }
}

/// Failure of a markup conversion capability.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The converter could not be started
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter did not finish in time and was killed
    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    /// The converter exited unsuccessfully
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },

    /// The converter succeeded but its expected output is missing
    #[error("{program} produced no output at {path}")]
    MissingOutput { program: String, path: PathBuf },

    /// Staging or reading converter files failed
    #[error("I/O error during conversion: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// Name of the program involved, if any.
    pub fn program(&self) -> &str {
        match self {
            Self::Spawn { program, .. }
            | Self::Timeout { program, .. }
            | Self::Exit { program, .. }
            | Self::MissingOutput { program, .. } => program,
            Self::Io(_) => "converter",
        }
    }
}

impl From<ConversionError> for DocumentError {
    fn from(err: ConversionError) -> Self {
        Self::ExternalToolFailure {
            tool: err.program().to_string(),
            timed_out: matches!(err, ConversionError::Timeout { .. }),
            reason: err.to_string(),
        }
    }
}
