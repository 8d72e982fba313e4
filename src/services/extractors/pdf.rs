// src/services/extractors/pdf.rs

//! PDF text-layer extraction.
//!
//! `pdf-extract` lays out text using each font's encoding and ToUnicode map. When it fails or
//! yields nothing, `lopdf` extracts each page's text on its own. A document with no text layer
//! from either path is reported as empty.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lopdf::Document;

use super::{Extractor, OverviewPolicy};
use crate::error::DocumentError;
use crate::models::{ExtractionResult, Format};
use crate::utils::text::{Whitelist, normalize};

/// Extracts the text layer of a PDF.
pub struct PdfExtractor {
    policy: Arc<OverviewPolicy>,
}

impl PdfExtractor {
    pub fn new(policy: Arc<OverviewPolicy>) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    fn format(&self) -> Format {
        Format::Pdf
    }

    async fn extract(&self, path: &Path) -> ExtractionResult {
        let owned = path.to_path_buf();
        let text = match tokio::task::spawn_blocking(move || read_text(&owned)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return ExtractionResult::failed(e),
            Err(e) => return ExtractionResult::failed(DocumentError::tool("pdf", e)),
        };

        let full_text = normalize(&text, Whitelist::Standard);
        if full_text.is_empty() {
            return ExtractionResult::failed(DocumentError::ExtractionEmpty {
                path: path.to_path_buf(),
            });
        }

        log::info!("{}: {} chars from text layer", path.display(), full_text.chars().count());
        self.policy.located(full_text)
    }
}

fn read_text(path: &Path) -> Result<String, DocumentError> {
    let bytes = std::fs::read(path).map_err(|e| DocumentError::tool("pdf", e))?;

    // pdf-extract panics on some malformed fonts
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&bytes))) {
        Ok(Ok(text)) if !text.trim().is_empty() => return Ok(text),
        Ok(Ok(_)) => log::debug!("{}: pdf-extract found no text", path.display()),
        Ok(Err(e)) => log::warn!("{}: pdf-extract failed: {}", path.display(), e),
        Err(_) => log::warn!("{}: pdf-extract panicked", path.display()),
    }

    log::info!("{}: falling back to lopdf page extraction", path.display());
    let mut document = Document::load_mem(&bytes).map_err(|e| DocumentError::tool("lopdf", e))?;
    let _ = document.decompress();
    Ok(page_texts(&document, path))
}

/// Per-page text joined by newlines. Failing pages are skipped.
fn page_texts(document: &Document, path: &Path) -> String {
    let mut pages = Vec::new();
    for page in document.get_pages().keys() {
        match document.extract_text(&[*page]) {
            Ok(text) => pages.push(text),
            Err(e) => log::warn!("{}: page {} skipped: {}", path.display(), page, e),
        }
    }
    pages.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OverviewConfig;
    use crate::services::overview::OverviewLocator;
    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Object, Stream};
    use tempfile::TempDir;

    fn extractor() -> PdfExtractor {
        let locator = OverviewLocator::from_config(&OverviewConfig::default()).unwrap();
        PdfExtractor::new(Arc::new(OverviewPolicy::new(locator, 3000, true)))
    }

    fn dict(entries: Vec<(&str, Object)>) -> Dictionary {
        let mut dict = Dictionary::new();
        for (key, value) in entries {
            dict.set(key, value);
        }
        dict
    }

    fn name(value: &str) -> Object {
        Object::Name(value.as_bytes().to_vec())
    }

    /// Single-page PDF with a Courier font and the given content operations.
    fn write_pdf(path: &Path, operations: Vec<Operation>) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dict(vec![
            ("Type", name("Font")),
            ("Subtype", name("Type1")),
            ("BaseFont", name("Courier")),
        ]));
        let resources_id = doc.add_object(dict(vec![(
            "Font",
            Object::Dictionary(dict(vec![("F1", font_id.into())])),
        )]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(dict(vec![
            ("Type", name("Page")),
            ("Parent", pages_id.into()),
            ("Contents", content_id.into()),
        ]));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dict(vec![
                ("Type", name("Pages")),
                ("Kids", Object::Array(vec![page_id.into()])),
                ("Count", 1.into()),
                ("Resources", resources_id.into()),
                (
                    "MediaBox",
                    Object::Array(vec![0.into(), 0.into(), 595.into(), 842.into()]),
                ),
            ])),
        );
        let catalog_id = doc.add_object(dict(vec![
            ("Type", name("Catalog")),
            ("Pages", pages_id.into()),
        ]));
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_single_page_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notice.pdf");
        write_pdf(
            &path,
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![name("F1"), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal("Annual research call")]),
                Operation::new("ET", vec![]),
            ],
        );

        let result = extractor().extract(&path).await;
        assert!(result.success, "{:?}", result.error);
        assert!(result.full_text.as_deref().unwrap().contains("Annual research call"));
        assert_eq!(result.warnings, vec![DocumentError::OverviewNotLocated]);
    }

    #[tokio::test]
    async fn test_page_without_text_layer_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scanned.pdf");
        write_pdf(
            &path,
            vec![
                Operation::new("m", vec![0.into(), 0.into()]),
                Operation::new("l", vec![100.into(), 100.into()]),
                Operation::new("S", vec![]),
            ],
        );

        let result = extractor().extract(&path).await;
        assert!(!result.success);
        assert_eq!(result.error.unwrap().kind(), "extraction_empty");
        assert!(result.full_text.is_none());
    }

    #[tokio::test]
    async fn test_corrupted_pdf_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\nthis is not a pdf").unwrap();

        let result = extractor().extract(&path).await;
        assert!(!result.success);
        let kind = result.error.unwrap().kind();
        assert!(kind == "external_tool_failure" || kind == "extraction_empty");
    }
}
