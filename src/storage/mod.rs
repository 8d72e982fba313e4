//! Storage abstractions for the announcement baseline.
//!
//! The baseline is a single JSON document holding the most recent announcements plus
//! bookkeeping about the last reconciliation:
//!
//! ```text
//! storage/
//! ├── config.toml               # Digest configuration
//! └── ntis_managed_data.json    # Baseline (rewritten atomically each cycle)
//! ```

pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Announcement, timestamp_now};
use crate::pipeline::ReconcileResult;
use crate::utils::url::IdentityKey;

// Re-export for convenience
pub use local::LocalStorage;

/// Persisted baseline document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BaselineData {
    /// `%Y-%m-%d %H:%M:%S` of the last write
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub search_keyword: String,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub new_items_count: usize,
    #[serde(default)]
    pub removed_old_count: usize,
    #[serde(default)]
    pub announcements: Vec<Announcement>,
}

impl BaselineData {
    /// Next baseline from a reconciliation. New records are stamped as freshly crawled.
    pub fn from_reconcile(result: &ReconcileResult, search_keyword: &str, key: &IdentityKey) -> Self {
        let now = timestamp_now();
        let new_keys: Vec<Option<String>> =
            result.new_items.iter().map(|a| a.identity_key(key)).collect();

        let announcements: Vec<Announcement> = result
            .merged
            .iter()
            .cloned()
            .map(|mut a| {
                let k = a.identity_key(key);
                if (k.is_none() || new_keys.contains(&k)) && a.crawled_at.is_none() {
                    a.standardize(&now);
                }
                a
            })
            .collect();

        Self {
            last_updated: now,
            search_keyword: search_keyword.to_string(),
            total_count: announcements.len(),
            new_items_count: result.new_items.len(),
            removed_old_count: result.removed_count,
            announcements,
        }
    }

    /// Records still waiting for their detail page.
    pub fn pending_detail(&self) -> Vec<&Announcement> {
        self.announcements.iter().filter(|a| !a.is_detailed).collect()
    }

    /// Mark the record with identity `id` as detailed. Returns `false` if absent or already done.
    pub fn mark_detailed(
        &mut self,
        key: &IdentityKey,
        id: &str,
        detail_data: Option<serde_json::Value>,
    ) -> bool {
        let at = timestamp_now();
        self.announcements
            .iter_mut()
            .find(|a| a.identity_key(key).as_deref() == Some(id))
            .is_some_and(|a| a.mark_detailed(detail_data, &at))
    }

    /// Counts for reporting.
    pub fn summary(&self) -> StoreSummary {
        let detailed = self.announcements.iter().filter(|a| a.is_detailed).count();
        StoreSummary {
            total: self.announcements.len(),
            new_items: self.new_items_count,
            removed: self.removed_old_count,
            detailed,
            pending: self.announcements.len() - detailed,
            last_updated: self.last_updated.clone(),
            search_keyword: self.search_keyword.clone(),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub total: usize,
    pub new_items: usize,
    pub removed: usize,
    pub detailed: usize,
    pub pending: usize,
    pub last_updated: String,
    pub search_keyword: String,
}

/// Trait for baseline storage backends.
#[async_trait]
pub trait BaselineStorage: Send + Sync {
    /// Load the baseline. A missing baseline is empty.
    async fn load_baseline(&self) -> Result<BaselineData>;

    /// Replace the baseline atomically.
    async fn save_baseline(&self, data: &BaselineData) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Reconciler;

    fn item(uid: u32, date: &str) -> Announcement {
        Announcement::new(
            format!("공고 {uid}"),
            date,
            format!("https://www.ntis.go.kr/view.do?roRndUid={uid}"),
        )
    }

    fn key() -> IdentityKey {
        IdentityKey::new("roRndUid").unwrap()
    }

    #[test]
    fn test_from_reconcile_stamps_only_new() {
        let mut old = item(1, "2026.01.01");
        old.crawled_at = Some("2025-12-31 09:00:00".into());
        old.is_detailed = true;

        let reconciler = Reconciler::new(key(), 30, "%Y.%m.%d");
        let result = reconciler.reconcile(&[item(2, "2026.01.02")], &[old]);
        let data = BaselineData::from_reconcile(&result, "인공지능", &key());

        assert_eq!(data.total_count, 2);
        assert_eq!(data.new_items_count, 1);
        assert_eq!(data.search_keyword, "인공지능");
        let new = &data.announcements[0];
        assert!(new.crawled_at.is_some());
        assert!(!new.is_detailed);
        let kept = &data.announcements[1];
        assert_eq!(kept.crawled_at.as_deref(), Some("2025-12-31 09:00:00"));
        assert!(kept.is_detailed);
    }

    #[test]
    fn test_detail_bookkeeping() {
        let mut data = BaselineData {
            announcements: vec![item(1, "2026.01.01"), item(2, "2026.01.02")],
            ..Default::default()
        };

        assert_eq!(data.pending_detail().len(), 2);
        assert!(data.mark_detailed(&key(), "2", None));
        assert!(!data.mark_detailed(&key(), "2", None));
        assert!(!data.mark_detailed(&key(), "99", None));

        let summary = data.summary();
        assert_eq!(summary.detailed, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(data.pending_detail()[0].title, "공고 1");
    }
}
