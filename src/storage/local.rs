//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml
//! └── {baseline_file}       # Baseline JSON, written via tmp + rename
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::StoreConfig;
use crate::storage::{BaselineData, BaselineStorage};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    baseline_key: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, baseline_key: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            baseline_key: baseline_key.into(),
        }
    }

    /// Create a LocalStorage using the configured baseline file name.
    pub fn from_config(root_dir: impl Into<PathBuf>, config: &StoreConfig) -> Self {
        Self::new(root_dir, config.baseline_file.clone())
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Full path of the baseline file.
    pub fn baseline_path(&self) -> PathBuf {
        self.path(&self.baseline_key)
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, &path).await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                log::warn!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
            return Err(AppError::Io(e));
        }
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BaselineStorage for LocalStorage {
    async fn load_baseline(&self) -> Result<BaselineData> {
        match self.read_json::<BaselineData>(&self.baseline_key).await? {
            Some(data) => {
                log::info!(
                    "Loaded baseline with {} announcements (updated {})",
                    data.announcements.len(),
                    data.last_updated
                );
                Ok(data)
            }
            None => {
                log::warn!("No baseline found at {}", self.baseline_path().display());
                Ok(BaselineData::default())
            }
        }
    }

    async fn save_baseline(&self, data: &BaselineData) -> Result<()> {
        self.write_json(&self.baseline_key, data)
            .await
            .map_err(|e| AppError::baseline_write(&self.baseline_key, e))?;
        log::info!(
            "Baseline saved: {} announcements to {}",
            data.total_count,
            self.baseline_path().display()
        );
        Ok(())
    }
}
