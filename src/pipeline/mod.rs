//! Pipeline entry points for digest operations.
//!
//! - `reconcile`: Merge newly crawled announcements into the baseline
//! - `process`: Select, extract and summarize the documents of new announcements

pub mod process;
pub mod reconcile;

pub use process::{BatchReport, BatchStats, DigestPipeline, apply_enrichment};
pub use reconcile::{ReconcileResult, Reconciler, reconcile};
