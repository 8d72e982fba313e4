// src/lib.rs

//! NTIS announcement digest library.
//!
//! Picks the real announcement document out of a directory of downloaded attachments,
//! extracts its text (HWP, HWPX, PDF), bounds the business-overview passage, and keeps a
//! capped, de-duplicated baseline of announcements between runs.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
