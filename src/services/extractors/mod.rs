// src/services/extractors/mod.rs

//! Format-specific text extractors.
//!
//! Every extractor honours the same contract: `extract(path)` never fails outright, it
//! returns an [`ExtractionResult`] carrying either normalized text or a typed error.

mod hwp;
mod hwpx;
mod pdf;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

pub use hwp::HwpExtractor;
pub use hwpx::HwpxExtractor;
pub use pdf::PdfExtractor;

use crate::error::{DocumentError, Result};
use crate::models::{Config, ExtractionResult, Format, OverviewSource, SelectedFile};
use crate::services::overview::OverviewLocator;
use crate::services::selector::group_of;
use crate::services::signature::classify;
use crate::utils::text::prefix_cap;

/// Text extractor for one document format.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Format handled by this extractor.
    fn format(&self) -> Format;

    async fn extract(&self, path: &Path) -> ExtractionResult;
}

/// How the overview is derived from located full text.
#[derive(Debug, Clone)]
pub struct OverviewPolicy {
    locator: OverviewLocator,
    prefix_cap_chars: usize,
    prefix_fallback: bool,
}

impl OverviewPolicy {
    pub fn new(locator: OverviewLocator, prefix_cap_chars: usize, prefix_fallback: bool) -> Self {
        Self {
            locator,
            prefix_cap_chars,
            prefix_fallback,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            OverviewLocator::from_config(&config.overview)?,
            config.extraction.prefix_cap_chars,
            config.extraction.overview_prefix_fallback,
        ))
    }

    /// Bound the overview with the locator, falling back to the prefix cap.
    pub fn located(&self, full_text: String) -> ExtractionResult {
        if let Some(overview) = self.locator.locate(&full_text) {
            return ExtractionResult::extracted(full_text, overview, OverviewSource::Located);
        }

        log::warn!("Overview section not located");
        let result = if self.prefix_fallback {
            let overview = prefix_cap(&full_text, self.prefix_cap_chars);
            ExtractionResult::extracted(full_text, overview, OverviewSource::PrefixCap)
        } else {
            ExtractionResult::without_overview(full_text)
        };
        result.with_warning(DocumentError::OverviewNotLocated)
    }

    /// Bound the overview with the prefix cap only.
    pub fn capped(&self, full_text: String) -> ExtractionResult {
        let overview = prefix_cap(&full_text, self.prefix_cap_chars);
        ExtractionResult::extracted(full_text, overview, OverviewSource::PrefixCap)
    }
}

/// The full set of extractors, dispatched by selected format.
pub struct Extractors {
    hwp: HwpExtractor,
    hwpx: HwpxExtractor,
    pdf: PdfExtractor,
}

impl Extractors {
    pub fn new(hwp: HwpExtractor, hwpx: HwpxExtractor, pdf: PdfExtractor) -> Self {
        Self { hwp, hwpx, pdf }
    }

    /// Build extractors with the configured converters and overview vocabulary.
    pub fn from_config(config: &Config) -> Result<Self> {
        let policy = Arc::new(OverviewPolicy::from_config(config)?);
        Ok(Self::new(
            HwpExtractor::from_config(config, Arc::clone(&policy)),
            HwpxExtractor::new(Arc::clone(&policy)),
            PdfExtractor::new(policy),
        ))
    }

    /// Extractor for a format, if one exists.
    pub fn get(&self, format: Format) -> Option<&dyn Extractor> {
        match format {
            Format::Hwp => Some(&self.hwp),
            Format::Hwpx => Some(&self.hwpx),
            Format::Pdf => Some(&self.pdf),
            Format::Doc | Format::Docx | Format::Unknown => None,
        }
    }

    /// Extract text from a selected file.
    ///
    /// Formats that need a signature are re-checked against the bytes first.
    pub async fn extract(&self, file: &SelectedFile) -> ExtractionResult {
        if file.format.requires_signature() {
            let detected = classify(&file.path);
            if detected == Format::Unknown {
                return ExtractionResult::failed(DocumentError::FormatUnrecognized {
                    path: file.path.clone(),
                });
            }
            if group_of(file.format, detected) != file.format {
                return ExtractionResult::failed(DocumentError::SignatureMismatch {
                    path: file.path.clone(),
                    declared: file.format,
                    detected,
                });
            }
        }

        match self.get(file.format) {
            Some(extractor) => extractor.extract(&file.path).await,
            None => {
                log::warn!(
                    "No text extractor for {} ({})",
                    file.path.display(),
                    file.format
                );
                ExtractionResult::failed(DocumentError::tool(
                    file.format.as_str(),
                    "no text extractor for this format",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(fallback: bool) -> OverviewPolicy {
        let config = crate::models::OverviewConfig::default();
        OverviewPolicy::new(OverviewLocator::from_config(&config).unwrap(), 10, fallback)
    }

    #[test]
    fn test_prefix_fallback_carries_warning() {
        let result = policy(true).located("개요 없음 본문 텍스트가 여기에 있습니다".to_string());
        assert!(result.success);
        assert_eq!(result.overview_source, Some(OverviewSource::PrefixCap));
        assert_eq!(result.overview_text.as_deref(), Some("개요 없음 본문 텍"));
        assert_eq!(result.warnings, vec![DocumentError::OverviewNotLocated]);
    }

    #[test]
    fn test_no_fallback_leaves_overview_empty() {
        let result = policy(false).located("본문".to_string());
        assert!(result.success);
        assert!(result.overview_text.is_none());
        assert_eq!(result.warnings.len(), 1);
    }

    fn selected(dir: &tempfile::TempDir, name: &str, bytes: &[u8], format: Format) -> SelectedFile {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        SelectedFile {
            path,
            format,
            size: bytes.len() as u64,
        }
    }

    #[test]
    fn test_dispatch_by_format() {
        let extractors = Extractors::from_config(&Config::default()).unwrap();
        for format in [Format::Hwp, Format::Hwpx, Format::Pdf] {
            assert_eq!(extractors.get(format).unwrap().format(), format);
        }
        assert!(extractors.get(Format::Doc).is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let extractors = Extractors::from_config(&Config::default()).unwrap();
        let file = selected(&dir, "공고문.pdf", b"<html>", Format::Pdf);

        let result = extractors.extract(&file).await;
        assert_eq!(result.error.unwrap().kind(), "format_unrecognized");
    }

    #[tokio::test]
    async fn test_signature_mismatch() {
        let dir = tempfile::TempDir::new().unwrap();
        let extractors = Extractors::from_config(&Config::default()).unwrap();
        let file = selected(&dir, "공고문.pdf", b"PK\x03\x04rest", Format::Pdf);

        let result = extractors.extract(&file).await;
        assert_eq!(
            result.error.unwrap(),
            DocumentError::SignatureMismatch {
                path: file.path.clone(),
                declared: Format::Pdf,
                detected: Format::Hwpx,
            }
        );
    }

    #[tokio::test]
    async fn test_docx_has_no_extractor() {
        let extractors = Extractors::from_config(&Config::default()).unwrap();
        let result = extractors
            .extract(&SelectedFile {
                path: "공고.docx".into(),
                format: Format::Docx,
                size: 1,
            })
            .await;
        assert!(!result.success);
        assert_eq!(result.error.unwrap().kind(), "external_tool_failure");
    }
}
