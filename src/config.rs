// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading configuration
//! and crawled announcement lists from files.

use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Announcement, Config};

/// Config file name inside the storage directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load configuration from `{storage_dir}/config.toml` and validate it.
///
/// Falls back to defaults if the file is missing or unreadable; invalid values are an error.
pub fn load_config(storage_dir: &Path) -> Result<Config> {
    let config = Config::load_or_default(storage_dir.join(CONFIG_FILE));
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;
    Ok(config)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CrawledFile {
    List(Vec<Announcement>),
    Wrapped { announcements: Vec<Announcement> },
}

/// Load crawled announcements from JSON, either a bare array or `{"announcements": [...]}`.
pub fn load_announcements(path: &Path) -> Result<Vec<Announcement>> {
    let content = std::fs::read_to_string(path)?;
    let parsed: CrawledFile = serde_json::from_str(&content)?;
    Ok(match parsed {
        CrawledFile::List(items) => items,
        CrawledFile::Wrapped { announcements } => announcements,
    })
}
