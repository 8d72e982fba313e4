//! Reconciliation of newly crawled announcements against the persisted baseline.
//!
//! The store is a most-recent-N window: previous baseline plus unseen postings, sorted by
//! open date (newest first, stable) and truncated to capacity. New postings are the crawled
//! items whose identity key the baseline has not seen and that survive the truncation, so a
//! posting older than a full window is never reported.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Announcement, StoreConfig};
use crate::utils::url::IdentityKey;

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileResult {
    /// Crawled items not present in the baseline that made it into the window, in crawl order
    pub new_items: Vec<Announcement>,
    /// The next baseline
    pub merged: Vec<Announcement>,
    /// Baseline records pushed out by the capacity limit
    pub removed_count: usize,
}

impl ReconcileResult {
    /// Check if anything new was observed.
    pub fn has_changes(&self) -> bool {
        !self.new_items.is_empty()
    }
}

/// Merges crawled announcements into a capped, date-sorted baseline.
#[derive(Debug, Clone)]
pub struct Reconciler {
    key: IdentityKey,
    capacity: usize,
    date_format: String,
}

impl Reconciler {
    /// Create a reconciler.
    pub fn new(key: IdentityKey, capacity: usize, date_format: impl Into<String>) -> Self {
        Self {
            key,
            capacity,
            date_format: date_format.into(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(
            IdentityKey::from_config(config)?,
            config.capacity,
            config.date_format.clone(),
        ))
    }

    pub fn identity_key(&self) -> &IdentityKey {
        &self.key
    }

    /// Reconcile `crawled` against `baseline`. Neither input is modified.
    pub fn reconcile(&self, crawled: &[Announcement], baseline: &[Announcement]) -> ReconcileResult {
        let mut known: HashSet<String> = baseline
            .iter()
            .filter_map(|a| a.identity_key(&self.key))
            .collect();

        let mut unseen = Vec::new();
        for item in crawled {
            match item.identity_key(&self.key) {
                Some(key) => {
                    if known.insert(key) {
                        unseen.push(item);
                    }
                }
                None => {
                    log::warn!(
                        "No {} in detail URL of '{}', treating as new",
                        self.key.param(),
                        item.title
                    );
                    unseen.push(item);
                }
            }
        }

        // Tag unseen items with their crawl position so survivors can be told apart
        let mut window: Vec<(Option<usize>, &Announcement)> = baseline
            .iter()
            .map(|a| (None, a))
            .chain(unseen.iter().enumerate().map(|(i, a)| (Some(i), *a)))
            .collect();

        // Stable: equal dates keep baseline-then-crawl order
        window.sort_by(|(_, a), (_, b)| self.open_date(b).cmp(&self.open_date(a)));
        window.truncate(self.capacity);

        let mut kept = vec![false; unseen.len()];
        for i in window.iter().filter_map(|(tag, _)| *tag) {
            kept[i] = true;
        }

        let mut new_items = Vec::new();
        for (item, kept) in unseen.into_iter().zip(kept) {
            if kept {
                log::info!("New announcement: {}", item.title);
                new_items.push(item.clone());
            } else {
                log::debug!("'{}' is older than the window, not kept", item.title);
            }
        }

        let merged: Vec<Announcement> = window.into_iter().map(|(_, a)| a.clone()).collect();
        let removed_count = baseline.len() + new_items.len() - merged.len();
        log::info!(
            "Reconciled: {} new, {} removed, {} kept",
            new_items.len(),
            removed_count,
            merged.len()
        );

        ReconcileResult {
            new_items,
            merged,
            removed_count,
        }
    }

    /// Parsed open date; unparsable dates sort as the oldest.
    fn open_date(&self, item: &Announcement) -> NaiveDate {
        item.parsed_open_date(&self.date_format)
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Reconcile with the default store settings.
pub fn reconcile(crawled: &[Announcement], baseline: &[Announcement]) -> Result<ReconcileResult> {
    Ok(Reconciler::from_config(&StoreConfig::default())?.reconcile(crawled, baseline))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(uid: u32, date: &str) -> Announcement {
        Announcement::new(
            format!("공고 {uid}"),
            date,
            format!("https://www.ntis.go.kr/rndgate/eg/un/ra/view.do?roRndUid={uid}&flag=rndList"),
        )
    }

    fn keys(items: &[Announcement]) -> Vec<String> {
        let key = IdentityKey::new("roRndUid").unwrap();
        items.iter().filter_map(|a| a.identity_key(&key)).collect()
    }

    fn date_for(day: u32) -> String {
        let d = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Days::new(day as u64);
        d.format("%Y.%m.%d").to_string()
    }

    #[test]
    fn test_full_baseline_plus_five_new() {
        let baseline: Vec<_> = (1..=30).map(|i| make(i, &date_for(i))).collect();
        let crawled: Vec<_> = (26..=35).map(|i| make(i, &date_for(i))).collect();

        let result = reconcile(&crawled, &baseline).unwrap();

        assert_eq!(keys(&result.new_items), vec!["31", "32", "33", "34", "35"]);
        assert_eq!(result.merged.len(), 30);
        assert_eq!(result.removed_count, 5);
        let merged_keys = keys(&result.merged);
        assert_eq!(merged_keys.first().map(String::as_str), Some("35"));
        assert_eq!(merged_keys.last().map(String::as_str), Some("6"));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let baseline: Vec<_> = (1..=10).map(|i| make(i, &date_for(i))).collect();
        let crawled: Vec<_> = (8..=14).map(|i| make(i, &date_for(i))).collect();

        let first = reconcile(&crawled, &baseline).unwrap();
        let second = reconcile(&crawled, &first.merged).unwrap();

        assert!(second.new_items.is_empty());
        assert!(!second.has_changes());
        assert_eq!(second.merged, first.merged);
    }

    #[test]
    fn test_item_older_than_full_window_is_not_new() {
        let baseline: Vec<_> = (1..=30).map(|i| make(i, "2026.05.01")).collect();
        let crawled = vec![make(99, "2020.01.01"), make(100, "2026.06.01")];

        let first = reconcile(&crawled, &baseline).unwrap();
        assert_eq!(keys(&first.new_items), vec!["100"]);
        assert_eq!(first.merged.len(), 30);
        assert_eq!(first.removed_count, 1);
        assert!(!keys(&first.merged).contains(&"99".to_string()));

        let second = reconcile(&crawled, &first.merged).unwrap();
        assert!(second.new_items.is_empty());
        assert_eq!(second.merged, first.merged);
    }

    #[test]
    fn test_unparsable_dates_sort_last_and_stable() {
        let baseline = vec![make(1, "미정"), make(2, "2026.02.01"), make(3, "")];
        let crawled = vec![make(4, "2026.03.01"), make(5, "날짜오류")];

        let result = reconcile(&crawled, &baseline).unwrap();
        assert_eq!(keys(&result.merged), vec!["4", "2", "1", "3", "5"]);
    }

    #[test]
    fn test_capacity_and_sort_invariant() {
        let crawled: Vec<_> = (1..=45).map(|i| make(i, &date_for(i * 7 % 45))).collect();

        let result = reconcile(&crawled, &[]).unwrap();
        assert!(result.merged.len() <= 30);

        let dates: Vec<_> = result
            .merged
            .iter()
            .map(|a| a.parsed_open_date("%Y.%m.%d").unwrap())
            .collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_unextractable_key_is_new() {
        let baseline = vec![make(1, "2026.01.01")];
        let mut odd = make(2, "2026.01.02");
        odd.detail_url = "javascript:void(0)".into();

        let result = reconcile(&[odd.clone()], &baseline).unwrap();
        assert_eq!(result.new_items, vec![odd]);
    }

    #[test]
    fn test_duplicate_keys_in_crawl_counted_once() {
        let crawled = vec![make(7, "2026.01.07"), make(7, "2026.01.07")];
        let result = reconcile(&crawled, &[]).unwrap();
        assert_eq!(result.new_items.len(), 1);
    }

    #[test]
    fn test_empty_inputs() {
        let result = reconcile(&[], &[]).unwrap();
        assert!(result.merged.is_empty());
        assert_eq!(result.removed_count, 0);
    }
}
