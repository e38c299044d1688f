//! Presentation layer
//!
//! This module turns feed state into view decisions:
//! - Read-only feed snapshots, footer and expand-control state
//! - Grouping records by calendar day

pub mod day_buckets;
pub mod feed_view;

pub use day_buckets::{day_label, group_by_day, DayBucket};
pub use feed_view::{FeedSnapshot, Footer};
