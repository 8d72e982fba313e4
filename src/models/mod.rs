// src/models/mod.rs

//! Domain models for the digest pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod announcement;
mod config;
mod document;

// Re-export all public types
pub use announcement::{Announcement, AnnouncementSummary, TIMESTAMP_FORMAT, timestamp_now};
pub use config::{
    Config, ConverterCommand, ExtractionConfig, OverviewConfig, SelectionConfig, StoreConfig,
    SummaryConfig,
};
pub use document::{
    CandidateFile, DownloadOutcome, ExtractionResult, Format, OutputRecord, OverviewSource,
    SelectedFile,
};
