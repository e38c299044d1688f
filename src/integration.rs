//! Integration layer
//!
//! This module wires the pure core to the store:
//! - Per-feed controllers that admit, run and apply fetches
//! - The contact surface coordinating both feeds and the write path

pub mod contact_surface;
pub mod feed_controller;

pub use contact_surface::{ContactSurface, SurfaceSnapshot};
pub use feed_controller::{FeedController, FeedOptions, FetchOutcome};
