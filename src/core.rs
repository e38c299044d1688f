//! Core feed engine
//!
//! This module contains the parts of the engine that never touch I/O:
//! - Feed state and its Elm-style update logic
//! - The fetch gate
//! - Scroll trigger decisions

pub mod gate;
pub mod state;
pub mod trigger;

pub use gate::{FetchGate, GatePass};
pub use state::{FeedPhase, FeedState, FetchMode, ViewMode};
pub use trigger::{ScrollPosition, ScrollThrottle};
