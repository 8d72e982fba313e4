//! Service layer for the digest pipeline.
//!
//! This module contains the document-side logic:
//! - Byte-signature classification (`signature`)
//! - Attachment selection (`FileSelector`)
//! - External conversion (`MarkupConverter`)
//! - Per-format text extraction (`Extractors`)
//! - Overview location (`OverviewLocator`)
//! - Summarization hand-off (`Summarizer`)

pub mod converter;
pub mod extractors;
pub mod overview;
pub mod selector;
pub mod signature;
pub mod summary;

pub use converter::{CommandConverter, ExtractedMarkup, MarkupConverter, MarkupKind};
pub use extractors::{Extractor, Extractors, HwpExtractor, HwpxExtractor, OverviewPolicy, PdfExtractor};
pub use overview::{OverviewLocator, locate_overview};
pub use selector::{FileSelector, inspect, select_best};
pub use signature::classify;
pub use summary::{SummaryError, SummaryRequest, Summarizer};
