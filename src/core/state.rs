//! Feed state aggregate
//!
//! `FeedState` owns everything one feed kind knows: the cursor, the three
//! record projections, the view mode and first-load activation. It acts as a
//! parent component coordinating those children:
//!
//! - Messages are defined at the `FeedState` level rather than wrapping child
//!   messages (e.g. `PageLoaded` instead of `Projection(ResetLoaded)`)
//! - `update` handles both plain delegation and coordination (a loaded page
//!   updates pagination and projections together)
//! - `update` never performs I/O; when a message calls for a fetch it returns
//!   the [`FetchMode`] and the caller decides whether the gate admits it

pub mod lifecycle;
pub mod pagination;
pub mod projection;
pub mod view_mode;

use crate::domain::{FeedKind, Record, RecordList};

pub use pagination::{FetchMode, Loading, DEFAULT_PAGE_SIZE};
pub use view_mode::ViewMode;

use self::{
    lifecycle::{Lifecycle, Message as LifecycleMessage},
    pagination::{Message as PaginationMessage, Pagination},
    projection::{Message as ProjectionMessage, Projections},
};

/// Where a feed is in its load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FeedPhase {
    /// Nothing requested yet
    Idle,
    /// First page in flight
    LoadingInitial,
    /// Data present and more pages may exist
    IdleWithData,
    /// Continuation page in flight
    LoadingMore,
    /// No further pages until the next reset
    Exhausted,
}

/// Messages that can be sent to update a feed
///
/// Following Elm conventions, messages are named in past tense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Activation
    /// The contact surface scrolled into the viewport
    SurfaceRevealed,
    /// This feed became the active tab
    TabActivated,
    /// Another feed became the active tab
    TabDeactivated,

    // View mode
    /// The user switched between preview and expanded
    ViewModeChanged(ViewMode),

    // Fetch lifecycle
    /// The gate admitted a fetch
    FetchStarted(FetchMode),
    /// The store answered with a page
    PageLoaded { mode: FetchMode, records: Vec<Record> },
    /// The cursor's anchor record disappeared upstream
    CursorAnchorLost,
    /// The store failed
    FetchFailed(FetchMode),
}

#[derive(Debug, Clone)]
pub struct FeedState {
    kind: FeedKind,
    page_size: usize,
    pagination: Pagination,
    projections: Projections,
    view_mode: ViewMode,
    lifecycle: Lifecycle,
}

impl FeedState {
    pub fn new(kind: FeedKind, page_size: usize) -> Self {
        Self {
            kind,
            page_size: page_size.max(1),
            pagination: Pagination::new(),
            projections: Projections::new(),
            view_mode: ViewMode::default(),
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    // Delegate to Projections
    pub fn authoritative(&self) -> &RecordList {
        self.projections.authoritative()
    }

    pub fn expanded(&self) -> &RecordList {
        self.projections.expanded()
    }

    pub fn preview(&self) -> &RecordList {
        self.projections.preview()
    }

    // Delegate to Pagination
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn is_exhausted(&self) -> bool {
        self.pagination.is_exhausted()
    }

    pub fn has_more(&self) -> bool {
        !self.pagination.is_exhausted()
    }

    pub fn is_loading_initial(&self) -> bool {
        self.pagination.is_loading_initial()
    }

    pub fn is_loading_more(&self) -> bool {
        self.pagination.is_loading_more()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Pre-gate admission check
    ///
    /// Resets are always admissible; a continuation needs a cursor and a feed
    /// that is not exhausted.
    pub fn admits(&self, mode: FetchMode) -> bool {
        match mode {
            FetchMode::Reset => true,
            FetchMode::Continue => self.pagination.can_continue(),
        }
    }

    pub fn phase(&self) -> FeedPhase {
        match self.pagination.loading() {
            Loading::Initial => FeedPhase::LoadingInitial,
            Loading::More => FeedPhase::LoadingMore,
            Loading::Idle if !self.pagination.has_loaded() => FeedPhase::Idle,
            Loading::Idle if self.pagination.is_exhausted() => FeedPhase::Exhausted,
            Loading::Idle => FeedPhase::IdleWithData,
        }
    }

    /// Update the feed based on a message
    ///
    /// Returns the fetch the message calls for, if any. Only activation
    /// messages ever request one; everything else is bookkeeping.
    pub fn update(&mut self, message: Message) -> Option<FetchMode> {
        match message {
            Message::SurfaceRevealed => self.activate(LifecycleMessage::SurfaceRevealed),
            Message::TabActivated => self.activate(LifecycleMessage::TabActivated),
            Message::TabDeactivated => {
                self.lifecycle.update(LifecycleMessage::TabDeactivated);
                None
            }
            Message::ViewModeChanged(mode) => {
                self.view_mode = mode;
                None
            }
            Message::FetchStarted(mode) => {
                self.pagination.update(PaginationMessage::FetchStarted(mode));
                None
            }
            Message::PageLoaded { mode, records } => {
                self.pagination.update(PaginationMessage::PageLoaded {
                    mode,
                    last: records.last().map(|record| record.id().clone()),
                    len: records.len(),
                    page_size: self.page_size,
                });
                self.projections.update(match mode {
                    FetchMode::Reset => ProjectionMessage::ResetLoaded(records),
                    FetchMode::Continue => ProjectionMessage::ContinuationLoaded(records),
                });
                None
            }
            Message::CursorAnchorLost => {
                self.pagination.update(PaginationMessage::CursorAnchorLost);
                None
            }
            Message::FetchFailed(mode) => {
                self.pagination.update(PaginationMessage::FetchFailed);
                // A first load that never landed must be retried by the next activation
                if mode == FetchMode::Reset && !self.pagination.has_loaded() {
                    self.lifecycle
                        .update(LifecycleMessage::InitialFetchAbandoned);
                }
                None
            }
        }
    }

    fn activate(&mut self, message: LifecycleMessage) -> Option<FetchMode> {
        if self.lifecycle.update(message) && !self.pagination.has_loaded() {
            Some(FetchMode::Reset)
        } else {
            None
        }
    }
}
