//! Read-only feed snapshot and the derived view decisions
//!
//! A snapshot is cheap to take: the record lists are shared, not copied.

use crate::{
    core::state::{FeedPhase, FeedState, ViewMode},
    domain::{FeedKind, RecordList},
};

/// What to render below the visible list
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Footer {
    /// A continuation page is in flight
    Loading,
    /// More records exist; offer an explicit "load more" action
    LoadMore,
    /// Everything has been loaded
    EndOfFeed,
    /// Nothing to show, e.g. in preview mode
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub kind: FeedKind,
    pub preview: RecordList,
    pub expanded: RecordList,
    /// Length of the authoritative list
    pub total: usize,
    pub loading_initial: bool,
    pub loading_more: bool,
    pub has_more: bool,
    pub view_mode: ViewMode,
    pub phase: FeedPhase,
}

impl FeedSnapshot {
    pub fn capture(state: &FeedState) -> Self {
        Self {
            kind: state.kind(),
            preview: state.preview().clone(),
            expanded: state.expanded().clone(),
            total: state.authoritative().len(),
            loading_initial: state.is_loading_initial(),
            loading_more: state.is_loading_more(),
            has_more: state.has_more(),
            view_mode: state.view_mode(),
            phase: state.phase(),
        }
    }

    /// The projection matching the current view mode
    pub fn visible(&self) -> &RecordList {
        match self.view_mode {
            ViewMode::Preview => &self.preview,
            ViewMode::Expanded => &self.expanded,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn footer(&self) -> Footer {
        match self.view_mode {
            ViewMode::Preview => Footer::Hidden,
            ViewMode::Expanded if self.loading_more => Footer::Loading,
            ViewMode::Expanded if self.has_more => Footer::LoadMore,
            ViewMode::Expanded if self.expanded.is_empty() => Footer::Hidden,
            ViewMode::Expanded => Footer::EndOfFeed,
        }
    }

    /// Label for the control that switches to the expanded view
    ///
    /// `None` while already expanded or before anything has loaded.
    pub fn expand_label(&self) -> Option<String> {
        match self.view_mode {
            ViewMode::Preview if !self.is_empty() => {
                Some(format!("Show all {} ({})", self.kind, self.total))
            }
            _ => None,
        }
    }
}
