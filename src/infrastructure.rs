//! Infrastructure layer
//!
//! This module handles external integrations:
//! - The Cursor Store boundary and an in-memory implementation
//! - CLI argument processing
//! - Configuration loading

pub mod cli;
pub mod config;
pub mod memory_store;
pub mod store;

pub use memory_store::{MemoryCursorStore, MemoryStoreConfig, StoreMetrics};
pub use store::{CursorHandle, CursorStore, Page, RecordWriter, StoreError};
