//! Announcement records as crawled from the listing and persisted in the baseline.
//!
//! Field names on the wire keep the Korean keys the baseline file has always used.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::utils::url::IdentityKey;

/// Timestamp format used for all wall-clock fields.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time formatted as [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A single program announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Announcement {
    /// Listing status label (e.g. 접수중)
    #[serde(rename = "현황", default)]
    pub status: String,

    #[serde(rename = "공고명")]
    pub title: String,

    /// Issuing ministry or agency
    #[serde(rename = "부처명", default)]
    pub agency: String,

    /// Open date as listed, `YYYY.MM.DD`
    #[serde(rename = "접수일", default)]
    pub open_date: String,

    #[serde(rename = "마감일", default)]
    pub close_date: String,

    #[serde(rename = "상세_URL", default)]
    pub detail_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onclick: Option<String>,

    #[serde(rename = "D_day", default, skip_serializing_if = "Option::is_none")]
    pub d_day: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawled_at: Option<String>,

    #[serde(default)]
    pub is_detailed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_crawled_at: Option<String>,

    /// Why the announcement could not be fully processed
    #[serde(rename = "처리상태", default, skip_serializing_if = "Option::is_none")]
    pub processing_note: Option<String>,

    #[serde(rename = "첨부파일명", default, skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,

    #[serde(rename = "ai_요약", default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<AnnouncementSummary>,

    #[serde(rename = "요약_처리시간", default, skip_serializing_if = "Option::is_none")]
    pub summarized_at: Option<String>,

    #[serde(rename = "ai_메타데이터", default, skip_serializing_if = "Option::is_none")]
    pub ai_metadata: Option<serde_json::Value>,
}

impl Announcement {
    /// Create a bare announcement with the listing fields most callers have.
    pub fn new(title: impl Into<String>, open_date: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            open_date: open_date.into(),
            detail_url: detail_url.into(),
            ..Default::default()
        }
    }

    /// Identity key derived from the detail URL.
    pub fn identity_key(&self, key: &IdentityKey) -> Option<String> {
        key.extract(&self.detail_url)
    }

    /// Parsed open date; `None` when it does not match `format`.
    pub fn parsed_open_date(&self, format: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.open_date.trim(), format).ok()
    }

    /// Stamp a newly observed record.
    pub fn standardize(&mut self, crawled_at: &str) {
        if self.crawled_at.is_none() {
            self.crawled_at = Some(crawled_at.to_string());
        }
        self.is_detailed = false;
    }

    /// Record detail-page data. Returns `false` if already detailed.
    pub fn mark_detailed(&mut self, detail_data: Option<serde_json::Value>, at: &str) -> bool {
        if self.is_detailed {
            return false;
        }
        self.is_detailed = true;
        self.detail_data = detail_data;
        self.detail_crawled_at = Some(at.to_string());
        true
    }

    /// Attach a summary. Returns `false` if one is already attached.
    pub fn attach_summary(&mut self, summary: AnnouncementSummary, at: &str) -> bool {
        if self.ai_summary.is_some() {
            return false;
        }
        self.ai_summary = Some(summary);
        self.summarized_at = Some(at.to_string());
        true
    }

    /// Set the processing note. Returns `false` if one is already set.
    pub fn set_processing_note(&mut self, note: impl Into<String>) -> bool {
        if self.processing_note.is_some() {
            return false;
        }
        self.processing_note = Some(note.into());
        true
    }
}

/// Structured summary returned by the summarization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnnouncementSummary {
    #[serde(rename = "사업목적", default)]
    pub purpose: String,

    #[serde(rename = "지원내용", default)]
    pub support: String,

    #[serde(rename = "지원규모", default)]
    pub scale: String,

    #[serde(rename = "신청대상", default)]
    pub eligibility: String,

    #[serde(rename = "주요특징", default)]
    pub highlights: String,

    #[serde(rename = "전체요약", default)]
    pub overall: String,
}

impl AnnouncementSummary {
    /// Whether every section is blank.
    pub fn is_empty(&self) -> bool {
        [
            &self.purpose,
            &self.support,
            &self.scale,
            &self.eligibility,
            &self.highlights,
            &self.overall,
        ]
        .iter()
        .all(|s| s.trim().is_empty())
    }
}
