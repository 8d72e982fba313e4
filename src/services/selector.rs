// src/services/selector.rs

//! Candidate validation and selection among downloaded attachments.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{CandidateFile, Config, Format, SelectedFile};
use crate::services::signature::{detect, read_signature};

/// Picks the single best announcement file in a download directory.
#[derive(Debug, Clone)]
pub struct FileSelector {
    /// Lowercased filename keywords
    keywords: Vec<String>,
    priority: Vec<Format>,
}

impl FileSelector {
    /// Create a selector with explicit keywords and format priority.
    pub fn new<S: AsRef<str>>(keywords: &[S], priority: &[Format]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            priority: priority.to_vec(),
        }
    }

    /// Create a selector from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.selection.title_keywords, &config.format_priority())
    }

    fn matches_keyword(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Every keyword-matching file with a known extension, in file name order.
    pub fn candidates(&self, directory: &Path) -> Result<Vec<CandidateFile>> {
        let entries =
            fs::read_dir(directory).map_err(|e| AppError::directory(directory, e))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", directory.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let candidates = paths
            .into_iter()
            .filter(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Format::from_path(path) != Format::Unknown && self.matches_keyword(&name)
            })
            .map(build_candidate)
            .collect();

        Ok(candidates)
    }

    /// Select the best candidate by format priority, then by size.
    ///
    /// Returns `Ok(None)` when no candidate survives keyword and signature filtering.
    pub fn select_best(&self, directory: &Path) -> Result<Option<SelectedFile>> {
        let candidates = self.candidates(directory)?;
        log::debug!(
            "{} candidate(s) in {}",
            candidates.len(),
            directory.display()
        );

        for format in &self.priority {
            let group: Vec<&CandidateFile> = candidates
                .iter()
                .filter(|c| group_of(c.declared, c.detected) == *format)
                .collect();
            if group.is_empty() {
                continue;
            }

            let winner = group
                .into_iter()
                .filter(|c| c.valid)
                .fold(None::<&CandidateFile>, |best, c| match best {
                    Some(b) if b.size >= c.size => Some(b),
                    _ => Some(c),
                });

            match winner {
                Some(c) => {
                    log::info!(
                        "Selected {} ({}, {} bytes)",
                        c.file_name(),
                        format,
                        c.size
                    );
                    return Ok(Some(SelectedFile {
                        path: c.path.clone(),
                        format: *format,
                        size: c.size,
                    }));
                }
                None => {
                    log::warn!("No {format} candidate has a valid signature, trying next format");
                }
            }
        }

        log::warn!("No announcement file selected in {}", directory.display());
        Ok(None)
    }
}

/// Format family a file is grouped under.
///
/// Detected signature wins; the declared extension only separates `doc` from `hwp` and
/// `docx` from `hwpx`, and names the group when the signature is unrecognized.
pub fn group_of(declared: Format, detected: Format) -> Format {
    match detected {
        Format::Hwp if declared == Format::Doc => Format::Doc,
        Format::Hwpx if declared == Format::Docx => Format::Docx,
        Format::Unknown => declared,
        other => other,
    }
}

fn build_candidate(path: PathBuf) -> CandidateFile {
    let declared = Format::from_path(&path);
    let signature = read_signature(&path);
    let detected = detect(&signature);
    let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    let group = group_of(declared, detected);
    let valid = !group.requires_signature() || detected != Format::Unknown;

    CandidateFile {
        path,
        declared,
        signature,
        detected,
        size,
        valid,
    }
}

/// Select the best file in `directory`.
pub fn select_best<S: AsRef<str>>(
    directory: &Path,
    title_keywords: &[S],
    format_priority: &[Format],
) -> Result<Option<SelectedFile>> {
    FileSelector::new(title_keywords, format_priority).select_best(directory)
}

/// List every candidate with its signature and validity.
pub fn inspect<S: AsRef<str>>(directory: &Path, title_keywords: &[S]) -> Result<Vec<CandidateFile>> {
    FileSelector::new(title_keywords, &Format::PRIORITY).candidates(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signature::OLE_MAGIC;
    use tempfile::TempDir;

    const KEYWORDS: [&str; 3] = ["공고", "공고문", "announcement"];

    fn ole(size: usize) -> Vec<u8> {
        let mut bytes = OLE_MAGIC.to_vec();
        bytes.resize(size, 0);
        bytes
    }

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) {
        std::fs::write(dir.path().join(name), bytes).unwrap();
    }

    fn select(dir: &TempDir) -> Option<SelectedFile> {
        select_best(dir.path(), &KEYWORDS, &Format::PRIORITY).unwrap()
    }

    #[test]
    fn test_largest_hwp_wins_over_cover() {
        let dir = TempDir::new().unwrap();
        write(&dir, "공고문_표지.hwp", &ole(12 * 1024));
        write(&dir, "공고문.hwp", &ole(340 * 1024));

        let selected = select(&dir).unwrap();
        assert_eq!(selected.path.file_name().unwrap(), "공고문.hwp");
        assert_eq!(selected.format, Format::Hwp);
        assert_eq!(selected.size, 340 * 1024);
    }

    #[test]
    fn test_corrupted_pdf_is_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "공고문.pdf", b"<html>not a pdf</html>");
        assert!(select(&dir).is_none());
    }

    #[test]
    fn test_invalid_hwp_falls_through_to_pdf() {
        let dir = TempDir::new().unwrap();
        write(&dir, "공고문.hwp", b"garbage bytes here");
        write(&dir, "공고문.pdf", b"%PDF-1.5 content");

        let selected = select(&dir).unwrap();
        assert_eq!(selected.format, Format::Pdf);
    }

    #[test]
    fn test_priority_prefers_hwp_over_larger_pdf() {
        let dir = TempDir::new().unwrap();
        write(&dir, "공고.hwp", &ole(100));
        let mut pdf = b"%PDF-1.5".to_vec();
        pdf.resize(10_000, b' ');
        write(&dir, "공고.pdf", &pdf);

        assert_eq!(select(&dir).unwrap().format, Format::Hwp);
    }

    #[test]
    fn test_grouping_follows_signature() {
        let dir = TempDir::new().unwrap();
        // A PDF saved with an .hwp name
        write(&dir, "공고문.hwp", b"%PDF-1.4 real pdf");

        let selected = select(&dir).unwrap();
        assert_eq!(selected.format, Format::Pdf);
    }

    #[test]
    fn test_docx_accepted_without_signature() {
        let dir = TempDir::new().unwrap();
        write(&dir, "Announcement.DOCX", b"whatever");

        let selected = select(&dir).unwrap();
        assert_eq!(selected.format, Format::Docx);
    }

    #[test]
    fn test_keyword_and_extension_filter() {
        let dir = TempDir::new().unwrap();
        write(&dir, "신청서.hwp", &ole(5000));
        write(&dir, "공고문.png", b"\x89PNG");
        assert!(select(&dir).is_none());
    }

    #[test]
    fn test_selection_is_deterministic_on_ties() {
        let dir = TempDir::new().unwrap();
        write(&dir, "공고_b.hwp", &ole(2048));
        write(&dir, "공고_a.hwp", &ole(2048));

        let first = select(&dir).unwrap();
        let second = select(&dir).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.path.file_name().unwrap(), "공고_a.hwp");
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = select_best(&dir.path().join("nope"), &KEYWORDS, &Format::PRIORITY).unwrap_err();
        assert!(matches!(err, AppError::DirectoryUnreadable { .. }));
    }

    #[test]
    fn test_inspect_reports_validity() {
        let dir = TempDir::new().unwrap();
        write(&dir, "공고문.pdf", b"nope");
        write(&dir, "공고문.hwp", &ole(64));

        let report = inspect(dir.path(), &KEYWORDS).unwrap();
        assert_eq!(report.len(), 2);
        let pdf = report.iter().find(|c| c.declared == Format::Pdf).unwrap();
        assert!(!pdf.valid);
        let hwp = report.iter().find(|c| c.declared == Format::Hwp).unwrap();
        assert!(hwp.valid);
        assert_eq!(hwp.signature_hex(), "d0cf11e0a1b11ae1");
    }
}
