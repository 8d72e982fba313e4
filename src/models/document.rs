//! Document-side data: formats, candidate files, extraction results and output records.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// Document format, either declared by extension or detected from bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Hwp,
    Hwpx,
    Pdf,
    Doc,
    Docx,
    Unknown,
}

impl Format {
    /// Formats in default selection priority order.
    pub const PRIORITY: [Format; 5] = [
        Format::Hwp,
        Format::Pdf,
        Format::Hwpx,
        Format::Doc,
        Format::Docx,
    ];

    /// Lowercase tag, also the canonical file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Hwp => "hwp",
            Format::Hwpx => "hwpx",
            Format::Pdf => "pdf",
            Format::Doc => "doc",
            Format::Docx => "docx",
            Format::Unknown => "unknown",
        }
    }

    /// Parse a format tag or extension (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "hwp" => Some(Format::Hwp),
            "hwpx" => Some(Format::Hwpx),
            "pdf" => Some(Format::Pdf),
            "doc" => Some(Format::Doc),
            "docx" => Some(Format::Docx),
            _ => None,
        }
    }

    /// Format declared by a path's extension.
    pub fn from_path(path: &Path) -> Format {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_tag)
            .unwrap_or(Format::Unknown)
    }

    /// Whether selection must confirm the byte signature before accepting a file.
    pub fn requires_signature(&self) -> bool {
        matches!(self, Format::Hwp | Format::Hwpx | Format::Pdf)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A downloaded file considered for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,

    /// Format implied by the file extension
    pub declared: Format,

    /// First bytes of the file, empty if unreadable
    pub signature: Vec<u8>,

    /// Format implied by the byte signature
    pub detected: Format,

    /// Size in bytes
    pub size: u64,

    /// Whether the signature matches the format family the file is grouped under
    pub valid: bool,
}

impl CandidateFile {
    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Signature as lowercase hex.
    pub fn signature_hex(&self) -> String {
        self.signature.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// The file chosen for extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub format: Format,
    pub size: u64,
}

/// How the overview text was bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverviewSource {
    /// Keyword-located subsection
    Located,
    /// Fixed character prefix of the full text
    PrefixCap,
}

/// Outcome of extracting a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub success: bool,
    pub full_text: Option<String>,
    pub overview_text: Option<String>,
    pub overview_source: Option<OverviewSource>,
    pub error: Option<DocumentError>,

    /// Non-fatal conditions (e.g. overview not located)
    pub warnings: Vec<DocumentError>,
}

impl ExtractionResult {
    /// Successful extraction.
    pub fn extracted(full_text: String, overview_text: String, source: OverviewSource) -> Self {
        Self {
            success: true,
            full_text: Some(full_text),
            overview_text: Some(overview_text),
            overview_source: Some(source),
            error: None,
            warnings: Vec::new(),
        }
    }

    /// Full text without any overview.
    pub fn without_overview(full_text: String) -> Self {
        Self {
            success: true,
            full_text: Some(full_text),
            overview_text: None,
            overview_source: None,
            error: None,
            warnings: Vec::new(),
        }
    }

    /// Failed extraction.
    pub fn failed(error: DocumentError) -> Self {
        Self {
            success: false,
            full_text: None,
            overview_text: None,
            overview_source: None,
            error: Some(error),
            warnings: Vec::new(),
        }
    }

    /// Attach a non-fatal warning.
    pub fn with_warning(mut self, warning: DocumentError) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Length of the full text in characters.
    pub fn full_text_length(&self) -> usize {
        self.full_text.as_deref().map_or(0, |t| t.chars().count())
    }
}

/// Per-announcement output consumed by the report writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub title: String,
    pub full_text_length: usize,
    pub overview_text: Option<String>,
    pub overview_source: Option<OverviewSource>,
    pub format: Format,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DocumentError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DocumentError>,
}

impl OutputRecord {
    /// Build a record from an extraction result.
    pub fn from_extraction(title: &str, format: Format, result: &ExtractionResult) -> Self {
        Self {
            title: title.to_string(),
            full_text_length: result.full_text_length(),
            overview_text: result.overview_text.clone(),
            overview_source: result.overview_source,
            format,
            success: result.success,
            error: result.error.clone(),
            warnings: result.warnings.clone(),
        }
    }

    /// Record for an announcement that never reached extraction.
    pub fn failed(title: &str, format: Format, error: DocumentError) -> Self {
        Self {
            title: title.to_string(),
            full_text_length: 0,
            overview_text: None,
            overview_source: None,
            format,
            success: false,
            error: Some(error),
            warnings: Vec::new(),
        }
    }
}

/// What the browser collaborator reports for an announcement's attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Attachments were written into this directory
    Downloaded(PathBuf),
    /// The detail page lists no attachments
    NoAttachment,
    /// Only an image of the announcement is attached
    ImageOnly { filename: String },
    /// Attachments exist but none is named like an announcement
    NoAnnouncementFile,
    /// Download failed or timed out
    Failed(String),
}

impl DownloadOutcome {
    /// Processing note recorded on the announcement for non-download outcomes.
    pub fn note(&self) -> Option<String> {
        match self {
            DownloadOutcome::Downloaded(_) => None,
            DownloadOutcome::NoAttachment => Some("첨부파일이 없습니다".to_string()),
            DownloadOutcome::ImageOnly { .. } => Some("공고문이 이미지 파일입니다".to_string()),
            DownloadOutcome::NoAnnouncementFile => {
                Some("공고 파일을 찾을 수 없습니다".to_string())
            }
            DownloadOutcome::Failed(reason) => Some(format!("다운로드 실패: {reason}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path_is_case_insensitive() {
        assert_eq!(Format::from_path(Path::new("a/공고.HWP")), Format::Hwp);
        assert_eq!(Format::from_path(Path::new("x.Pdf")), Format::Pdf);
        assert_eq!(Format::from_path(Path::new("x.png")), Format::Unknown);
        assert_eq!(Format::from_path(Path::new("noext")), Format::Unknown);
    }

    #[test]
    fn test_signature_requirement() {
        assert!(Format::Hwp.requires_signature());
        assert!(Format::Pdf.requires_signature());
        assert!(!Format::Doc.requires_signature());
        assert!(!Format::Docx.requires_signature());
    }

    #[test]
    fn test_output_record_from_failure() {
        let result = ExtractionResult::failed(DocumentError::ExtractionEmpty {
            path: "x.pdf".into(),
        });
        let record = OutputRecord::from_extraction("제목", Format::Pdf, &result);
        assert!(!record.success);
        assert_eq!(record.full_text_length, 0);
        assert_eq!(record.error.unwrap().kind(), "extraction_empty");
    }

    #[test]
    fn test_download_outcome_notes() {
        assert!(DownloadOutcome::Downloaded("d".into()).note().is_none());
        assert!(DownloadOutcome::NoAttachment.note().is_some());
        let image = DownloadOutcome::ImageOnly {
            filename: "공고.png".into(),
        };
        assert_eq!(image.note().unwrap(), "공고문이 이미지 파일입니다");
    }
}
