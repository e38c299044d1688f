//! Domain logic
//!
//! This module contains the feed model shared by every other layer:
//! - Feed kinds and records
//! - Ordered record sequences and the dedup merge

pub mod collections;
pub mod feed_kind;
pub mod record;

pub use collections::{merge, RecordList};
pub use feed_kind::FeedKind;
pub use record::{CommentBody, FeedbackBody, Rating, Record, RecordBody, RecordId, SortKey};
