//! Cursor and exhaustion bookkeeping for one feed
//!
//! This module follows the Elm Architecture pattern:
//! - State changes only through the `update` function
//! - All state transitions are explicitly defined as `Message` variants
//! - The module knows nothing about the record sequences themselves

use crate::domain::RecordId;

/// Records requested per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Which page a fetch asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FetchMode {
    /// First page; replaces everything accumulated so far
    Reset,
    /// The page strictly after the current cursor
    Continue,
}

/// What the presentation layer shows while a fetch is in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Loading {
    #[default]
    Idle,
    Initial,
    More,
}

/// Messages that can be sent to update the pagination state
///
/// Following Elm conventions, messages are named in past tense
/// to indicate "what happened" rather than "what to do"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A fetch was admitted and is about to hit the store
    FetchStarted(FetchMode),
    /// A page arrived; `last` is the last record of the batch
    PageLoaded {
        mode: FetchMode,
        last: Option<RecordId>,
        len: usize,
        page_size: usize,
    },
    /// The record anchoring the cursor no longer exists upstream
    CursorAnchorLost,
    /// The store failed; everything but the loading flag stays as it was
    FetchFailed,
}

/// Manages cursor state for paged loading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    cursor: Option<RecordId>,
    exhausted: bool,
    loading: Loading,
    loaded: bool,
}

impl Pagination {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the last record returned so far, if any
    pub fn cursor(&self) -> Option<&RecordId> {
        self.cursor.as_ref()
    }

    /// True once a page came back shorter than the page size
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn loading(&self) -> Loading {
        self.loading
    }

    pub fn is_loading_initial(&self) -> bool {
        self.loading == Loading::Initial
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading == Loading::More
    }

    /// Whether a first page has ever been applied
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a continuation fetch would make sense right now
    pub fn can_continue(&self) -> bool {
        self.cursor.is_some() && !self.exhausted
    }

    /// Update the pagination state based on a message
    pub fn update(&mut self, message: Message) {
        match message {
            Message::FetchStarted(mode) => {
                self.loading = match mode {
                    FetchMode::Reset => Loading::Initial,
                    FetchMode::Continue => Loading::More,
                };
            }
            Message::PageLoaded {
                mode,
                last,
                len,
                page_size,
            } => {
                self.loading = Loading::Idle;
                self.exhausted = len < page_size;
                match mode {
                    FetchMode::Reset => {
                        // A reset forgets the old cursor even if the new page is empty
                        self.cursor = last;
                        self.loaded = true;
                    }
                    FetchMode::Continue => {
                        if last.is_some() {
                            self.cursor = last;
                        }
                    }
                }
            }
            Message::CursorAnchorLost => {
                self.loading = Loading::Idle;
                self.exhausted = true;
            }
            Message::FetchFailed => {
                self.loading = Loading::Idle;
            }
        }
    }
}
