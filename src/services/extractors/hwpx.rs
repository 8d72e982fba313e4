// src/services/extractors/hwpx.rs

//! HWPX (ZIP + XML) extraction.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;

use super::{Extractor, OverviewPolicy};
use crate::error::DocumentError;
use crate::models::{ExtractionResult, Format};
use crate::utils::text::{Whitelist, normalize};

const SECTION_PREFIX: &str = "Contents/section";
const SECTION_SUFFIX: &str = ".xml";

/// Reads section XML members directly from the container.
pub struct HwpxExtractor {
    policy: Arc<OverviewPolicy>,
}

impl HwpxExtractor {
    pub fn new(policy: Arc<OverviewPolicy>) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Extractor for HwpxExtractor {
    fn format(&self) -> Format {
        Format::Hwpx
    }

    async fn extract(&self, path: &Path) -> ExtractionResult {
        let owned = path.to_path_buf();
        let joined = match tokio::task::spawn_blocking(move || read_sections(&owned)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return ExtractionResult::failed(e),
            Err(e) => return ExtractionResult::failed(DocumentError::tool("hwpx", e)),
        };

        let full_text = normalize(&joined, Whitelist::Extended);
        if full_text.is_empty() {
            return ExtractionResult::failed(DocumentError::ExtractionEmpty {
                path: path.to_path_buf(),
            });
        }

        log::info!("{}: {} chars from sections", path.display(), full_text.chars().count());
        self.policy.capped(full_text)
    }
}

/// Concatenate text of every section member, ordered by member name.
fn read_sections(path: &Path) -> Result<String, DocumentError> {
    let file = File::open(path).map_err(|e| DocumentError::tool("zip", e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| DocumentError::tool("zip", e))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with(SECTION_PREFIX) && name.ends_with(SECTION_SUFFIX))
        .map(str::to_string)
        .collect();
    names.sort();

    if names.is_empty() {
        log::warn!("{} has no section members", path.display());
    }

    let mut sections = Vec::with_capacity(names.len());
    for name in &names {
        let mut xml = String::new();
        let read = archive
            .by_name(name)
            .map_err(|e| e.to_string())
            .and_then(|mut member| member.read_to_string(&mut xml).map_err(|e| e.to_string()));
        if let Err(e) = read {
            log::warn!("Skipping {} in {}: {}", name, path.display(), e);
            continue;
        }

        match section_text(&xml) {
            Ok(text) => sections.push(text),
            Err(e) => log::warn!("Skipping malformed {} in {}: {}", name, path.display(), e),
        }
    }

    Ok(sections.join("\n\n"))
}

/// Text and CDATA content in document order, each piece trimmed, joined by spaces.
fn section_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut pieces: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => {
                let text = match e.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(_) => String::from_utf8_lossy(&e).into_owned(),
                };
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    pieces.push(trimmed.to_string());
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    pieces.push(trimmed.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e),
            _ => {}
        }
        buf.clear();
    }

    Ok(pieces.join(" "))
}
