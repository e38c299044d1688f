//! # feedsync - paginated feed synchronization
//!
//! Keeps a local, newest-first view of a remote, append-mostly collection in
//! step with the store, one page at a time. Two independent feeds (comments and
//! feedback) share one contact surface.
//!
//! ## Architecture Overview
//!
//! The crate follows an Elm-like split between pure state and side effects:
//!
//! - **State** (`core::state`): cursor, exhaustion flag and record projections
//! - **Message** (`core::state::Message`): past-tense events that change state
//! - **Gate** (`core::gate`): at most one fetch per feed at a time
//! - **Controller** (`integration`): admits triggers and talks to the store
//! - **View** (`presentation`): read-only snapshots and display helpers
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use feedsync::{
//!     domain::{CommentBody, FeedKind, RecordBody, SortKey},
//!     infrastructure::MemoryCursorStore,
//!     integration::{FeedController, FeedOptions},
//! };
//!
//! let store = Arc::new(MemoryCursorStore::new());
//! store.insert_at(
//!     FeedKind::Comments,
//!     SortKey::from_millis(1_000),
//!     RecordBody::Comment(CommentBody {
//!         author: "ada".to_string(),
//!         message: "Nice site".to_string(),
//!         avatar_url: None,
//!         provider: None,
//!     }),
//! );
//!
//! let feed = FeedController::new(FeedKind::Comments, store, FeedOptions::default());
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     feed.on_tab_activated().await;
//!     feed.on_visible().await;
//! });
//!
//! assert_eq!(feed.snapshot().preview.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`domain`] - Records, feed kinds and the dedup merge
//! - [`core`] - Pure feed state, fetch gate and scroll triggers
//! - [`infrastructure`] - Store boundary, in-memory store, config and CLI
//! - [`integration`] - Feed controllers and the contact surface
//! - [`presentation`] - Snapshots, footer state and day grouping
//! - [`utils`] - Logging, panic handling and paths

pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod integration;
pub mod presentation;
pub mod utils;

// Re-exports for convenience
pub use crate::core::{FeedPhase, FeedState, FetchMode, ViewMode};
pub use domain::{FeedKind, Record, RecordId, RecordList};
pub use infrastructure::{CursorStore, MemoryCursorStore, RecordWriter, StoreError};
pub use integration::{ContactSurface, FeedController, FeedOptions, FetchOutcome};
pub use presentation::{FeedSnapshot, Footer};

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
