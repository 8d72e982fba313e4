//! Sequential batch processing: select → extract → locate → summarize.
//!
//! Documents are handled one at a time. Per-document failures are recorded on the output
//! record and on the announcement's processing note; only an unreadable download directory
//! aborts the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{DocumentError, Result};
use crate::models::{
    Announcement, Config, DownloadOutcome, ExtractionResult, Format, OutputRecord, OverviewSource,
    SummaryConfig, timestamp_now,
};
use crate::services::{Extractors, FileSelector, Summarizer, SummaryRequest};
use crate::utils::url::IdentityKey;

/// Run statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub extracted: usize,
    pub failed: usize,
    pub overview_located: usize,
    pub overview_capped: usize,
    pub summarized: usize,
    pub summary_failed: usize,
    /// Announcements without a downloadable document
    pub skipped: usize,
}

/// Output of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One record per announcement, in input order
    pub records: Vec<OutputRecord>,
    /// Announcements with their processing fields filled in
    pub announcements: Vec<Announcement>,
    pub stats: BatchStats,
}

/// Document processing chain for new announcements.
pub struct DigestPipeline {
    selector: FileSelector,
    extractors: Extractors,
    summarizer: Option<Arc<dyn Summarizer>>,
    summary: SummaryConfig,
}

impl DigestPipeline {
    pub fn new(selector: FileSelector, extractors: Extractors, summary: SummaryConfig) -> Self {
        Self {
            selector,
            extractors,
            summarizer: None,
            summary,
        }
    }

    /// Build the chain from configuration, without a summarizer.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            FileSelector::from_config(config),
            Extractors::from_config(config)?,
            config.summary.clone(),
        ))
    }

    /// Attach a summarization service.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Select and extract the announcement file in `directory`.
    pub async fn extract_directory(&self, directory: &Path) -> Result<(Format, ExtractionResult, Option<PathBuf>)> {
        match self.selector.select_best(directory)? {
            Some(selected) => {
                let result = self.extractors.extract(&selected).await;
                Ok((selected.format, result, Some(selected.path)))
            }
            None => Ok((
                Format::Unknown,
                ExtractionResult::failed(DocumentError::NoCandidateFound {
                    directory: directory.to_path_buf(),
                }),
                None,
            )),
        }
    }

    /// Process one announcement, enriching it in place.
    pub async fn process_one(
        &self,
        announcement: &mut Announcement,
        download: &DownloadOutcome,
    ) -> Result<OutputRecord> {
        let directory = match download {
            DownloadOutcome::Downloaded(directory) => directory,
            other => {
                let note = other.note().unwrap_or_default();
                log::warn!("{}: {}", announcement.title, note);
                announcement.set_processing_note(note.clone());
                let error = match other {
                    DownloadOutcome::Failed(reason) => DocumentError::tool("download", reason),
                    DownloadOutcome::ImageOnly { filename } => DocumentError::NotDownloaded {
                        reason: format!("{note}: {filename}"),
                    },
                    _ => DocumentError::NotDownloaded { reason: note.clone() },
                };
                return Ok(OutputRecord::failed(&announcement.title, Format::Unknown, error));
            }
        };

        let (format, result, path) = self.extract_directory(directory).await?;
        if let Some(name) = path.as_deref().and_then(Path::file_name) {
            announcement.attachment_name = Some(name.to_string_lossy().into_owned());
        }

        match &result.error {
            Some(error) => {
                log::warn!("{}: {}", announcement.title, error);
                announcement.set_processing_note(error.to_string());
            }
            None => self.summarize(announcement, &result).await,
        }

        Ok(OutputRecord::from_extraction(&announcement.title, format, &result))
    }

    async fn summarize(&self, announcement: &mut Announcement, result: &ExtractionResult) {
        let Some(summarizer) = &self.summarizer else {
            return;
        };
        let excerpt = result
            .overview_text
            .as_deref()
            .or(result.full_text.as_deref())
            .unwrap_or_default();

        let outcome = match SummaryRequest::from_config(&announcement.title, excerpt, &self.summary) {
            Ok(request) => summarizer.summarize(&request).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(summary) => {
                announcement.attach_summary(summary, &timestamp_now());
            }
            Err(e) => {
                log::warn!("{}: summary failed: {}", announcement.title, e);
                announcement.set_processing_note(format!("요약 실패: {e}"));
            }
        }
    }

    /// Process every item sequentially.
    pub async fn process_batch(
        &self,
        items: Vec<(Announcement, DownloadOutcome)>,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        report.stats.total = items.len();

        for (index, (mut announcement, download)) in items.into_iter().enumerate() {
            log::info!("[{}/{}] {}", index + 1, report.stats.total, announcement.title);

            let had_summary = announcement.ai_summary.is_some();
            let downloaded = matches!(download, DownloadOutcome::Downloaded(_));
            let record = self.process_one(&mut announcement, &download).await?;

            let stats = &mut report.stats;
            if !downloaded {
                stats.skipped += 1;
            } else if record.success {
                stats.extracted += 1;
                match record.overview_source {
                    Some(OverviewSource::Located) => stats.overview_located += 1,
                    Some(OverviewSource::PrefixCap) => stats.overview_capped += 1,
                    None => {}
                }
                if self.summarizer.is_some() {
                    if !had_summary && announcement.ai_summary.is_some() {
                        stats.summarized += 1;
                    } else if announcement.ai_summary.is_none() {
                        stats.summary_failed += 1;
                    }
                }
            } else {
                stats.failed += 1;
            }

            report.records.push(record);
            report.announcements.push(announcement);
        }

        log::info!(
            "Batch complete: {} extracted, {} failed, {} skipped",
            report.stats.extracted,
            report.stats.failed,
            report.stats.skipped
        );
        Ok(report)
    }
}

/// Copy processing fields from processed announcements into the baseline, write-once.
pub fn apply_enrichment(baseline: &mut [Announcement], processed: &[Announcement], key: &IdentityKey) {
    for item in processed {
        let Some(id) = item.identity_key(key) else {
            continue;
        };
        let Some(target) = baseline
            .iter_mut()
            .find(|a| a.identity_key(key).as_deref() == Some(id.as_str()))
        else {
            continue;
        };

        if let (Some(summary), Some(at)) = (&item.ai_summary, &item.summarized_at) {
            target.attach_summary(summary.clone(), at);
        }
        if let Some(note) = &item.processing_note {
            target.set_processing_note(note.clone());
        }
        if target.attachment_name.is_none() {
            target.attachment_name = item.attachment_name.clone();
        }
    }
}
