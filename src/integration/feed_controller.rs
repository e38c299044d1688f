//! Page fetcher for one feed kind
//!
//! `FeedController` owns a feed's state, its fetch gate and its scroll
//! throttle, and is the only thing that mutates them. Every trigger source
//! (surface reveal, tab switch, scroll, manual "load more", post-write reset)
//! ends up in [`FeedController::fetch_page`] or
//! [`FeedController::reset_after_write`].
//!
//! Admission is synchronous: the gate is claimed before the first `.await`, so
//! triggers racing on the same tick cannot both reach the store. Store faults
//! never escape; every call resolves to a [`FetchOutcome`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        gate::{FetchGate, GatePass},
        state::{FeedPhase, FeedState, FetchMode, Message, ViewMode, DEFAULT_PAGE_SIZE},
        trigger::{ScrollPosition, ScrollThrottle, DEFAULT_SCROLL_THRESHOLD_PX},
    },
    domain::{FeedKind, RecordId},
    infrastructure::{
        config::FeedSettings,
        store::{CursorStore, Page, StoreError},
    },
    presentation::feed_view::FeedSnapshot,
    utils::sync::lock,
};

/// Tunables for a feed controller
#[derive(Debug, Clone, PartialEq)]
pub struct FeedOptions {
    pub page_size: usize,
    pub scroll_threshold_px: f64,
    pub scroll_throttle: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            scroll_throttle: Duration::ZERO,
        }
    }
}

impl From<&FeedSettings> for FeedOptions {
    fn from(settings: &FeedSettings) -> Self {
        Self {
            page_size: settings.page_size,
            scroll_threshold_px: settings.scroll_threshold_px,
            scroll_throttle: settings.scroll_throttle(),
        }
    }
}

/// How a fetch request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was applied; `added` counts records new to the authoritative list
    Loaded {
        mode: FetchMode,
        fetched: usize,
        added: usize,
    },
    /// Not admitted: gate closed, feed exhausted, no cursor, or nothing to do
    Skipped,
    /// A post-write reset was queued behind the fetch currently in flight
    Deferred,
    /// The store failed; state is as it was before the fetch
    Failed(StoreError),
    /// The cursor's anchor record is gone; the feed is now exhausted
    AnchorLost,
    /// The result arrived after teardown and was dropped
    Discarded,
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchOutcome::Loaded { .. })
    }
}

/// An admitted fetch: holds the gate until dropped
struct Ticket {
    mode: FetchMode,
    cursor: Option<RecordId>,
    pass: GatePass,
}

impl Ticket {
    fn reset(pass: GatePass) -> Self {
        Self {
            mode: FetchMode::Reset,
            cursor: None,
            pass,
        }
    }

    fn into_reset(self) -> Self {
        Self::reset(self.pass)
    }
}

pub struct FeedController<S: ?Sized> {
    kind: FeedKind,
    options: FeedOptions,
    gate: FetchGate,
    state: Mutex<FeedState>,
    throttle: Mutex<ScrollThrottle>,
    pending_reset: AtomicBool,
    cancel: CancellationToken,
    store: Arc<S>,
}

impl<S: CursorStore + ?Sized> FeedController<S> {
    pub fn new(kind: FeedKind, store: Arc<S>, options: FeedOptions) -> Self {
        Self::with_cancellation(kind, store, options, CancellationToken::new())
    }

    /// Creates a controller that goes inert once `cancel` fires
    pub fn with_cancellation(
        kind: FeedKind,
        store: Arc<S>,
        options: FeedOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            kind,
            state: Mutex::new(FeedState::new(kind, options.page_size)),
            throttle: Mutex::new(ScrollThrottle::new(options.scroll_throttle)),
            gate: FetchGate::new(),
            pending_reset: AtomicBool::new(false),
            cancel,
            options,
            store,
        }
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    pub fn options(&self) -> &FeedOptions {
        &self.options
    }

    /// Read-only copy of everything the presentation layer needs
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot::capture(&self.state())
    }

    pub fn phase(&self) -> FeedPhase {
        self.state().phase()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state().view_mode()
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.gate.is_in_flight()
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stops all further fetches; results still in flight are discarded
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    // === Trigger sources ===

    /// The contact surface scrolled into view
    pub async fn on_visible(&self) -> FetchOutcome {
        self.activate(Message::SurfaceRevealed).await
    }

    /// This feed became the active tab
    pub async fn on_tab_activated(&self) -> FetchOutcome {
        self.activate(Message::TabActivated).await
    }

    /// Marks the feed as the active tab at mount time, before it can be seen
    pub(crate) fn preselect(&self) {
        self.apply(Message::TabActivated);
    }

    /// Another feed became the active tab
    pub fn on_tab_deactivated(&self) {
        self.apply(Message::TabDeactivated);
    }

    /// Window scroll sample; only acts in expanded mode near the bottom
    pub async fn on_scroll(&self, position: ScrollPosition) -> FetchOutcome {
        if !self.view_mode().is_expanded()
            || !position.is_near_bottom(self.options.scroll_threshold_px)
            || !lock(&self.throttle).admit(Instant::now())
        {
            return FetchOutcome::Skipped;
        }
        self.fetch_page(FetchMode::Continue).await
    }

    /// Explicit "load more" action, independent of scroll position
    pub async fn load_more(&self) -> FetchOutcome {
        self.fetch_page(FetchMode::Continue).await
    }

    /// Switches between preview and expanded; never fetches
    pub fn set_view_mode(&self, mode: ViewMode) {
        self.apply(Message::ViewModeChanged(mode));
        if mode.is_expanded() {
            lock(&self.throttle).reset();
        }
    }

    pub fn toggle_view_mode(&self) -> ViewMode {
        let mode = self.view_mode().toggled();
        self.set_view_mode(mode);
        mode
    }

    /// Refetches the first page after the current user's write was acknowledged
    ///
    /// If a fetch is already in flight the reset is queued and runs as soon as
    /// that fetch completes, before the gate reopens.
    pub async fn reset_after_write(&self) -> FetchOutcome {
        if self.is_torn_down() {
            return FetchOutcome::Discarded;
        }

        self.pending_reset.store(true, Ordering::SeqCst);
        match self.gate.try_enter() {
            Some(pass) => self.drive(Ticket::reset(pass)).await,
            None => {
                log::debug!("{} reset queued behind in-flight fetch", self.kind);
                FetchOutcome::Deferred
            }
        }
    }

    /// Runs a reset or continuation fetch if admitted
    ///
    /// A rejected request is a normal overlap outcome and returns
    /// [`FetchOutcome::Skipped`] without logging.
    pub async fn fetch_page(&self, mode: FetchMode) -> FetchOutcome {
        match self.admit(mode) {
            Some(ticket) => self.drive(ticket).await,
            None => FetchOutcome::Skipped,
        }
    }

    // === Internals ===

    fn state(&self) -> MutexGuard<'_, FeedState> {
        lock(&self.state)
    }

    fn apply(&self, message: Message) -> Option<FetchMode> {
        self.state().update(message)
    }

    async fn activate(&self, message: Message) -> FetchOutcome {
        if self.is_torn_down() {
            return FetchOutcome::Skipped;
        }
        match self.apply(message) {
            Some(mode) => self.fetch_page(mode).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Claims the gate, then checks the request against current state
    ///
    /// Checking after the claim means nothing else can change the cursor or
    /// exhaustion between the check and the fetch. A rejected request still
    /// releases the gate, so it must pick up any reset queued meanwhile.
    fn admit(&self, mode: FetchMode) -> Option<Ticket> {
        if self.is_torn_down() {
            return None;
        }
        let pass = self.gate.try_enter()?;

        {
            let state = self.state();
            if state.admits(mode) {
                let cursor = match mode {
                    FetchMode::Reset => None,
                    FetchMode::Continue => state.pagination().cursor().cloned(),
                };
                return Some(Ticket { mode, cursor, pass });
            }
        }

        drop(pass);
        self.claim_pending_reset()
    }

    /// Takes the gate for a queued write reset, if one is waiting
    ///
    /// Runs after every gate release. A writer that found the gate closed
    /// returned `Deferred` and relies on the releasing side to see its flag.
    fn claim_pending_reset(&self) -> Option<Ticket> {
        while !self.is_torn_down() && self.pending_reset.load(Ordering::SeqCst) {
            let pass = self.gate.try_enter()?;
            if self.pending_reset.load(Ordering::SeqCst) {
                return Some(Ticket::reset(pass));
            }
        }
        None
    }

    /// Executes a ticket, then any reset queued while it ran
    async fn drive(&self, mut ticket: Ticket) -> FetchOutcome {
        loop {
            if self.pending_reset.swap(false, Ordering::SeqCst) {
                ticket = ticket.into_reset();
            }

            let outcome = self.execute(&ticket).await;
            drop(ticket);

            // A writer may have queued a reset after our swap
            match self.claim_pending_reset() {
                Some(next) => ticket = next,
                None => return outcome,
            }
        }
    }

    async fn execute(&self, ticket: &Ticket) -> FetchOutcome {
        let mode = ticket.mode;
        log::debug!("{} {mode} fetch admitted", self.kind);
        self.apply(Message::FetchStarted(mode));

        let result = match mode {
            FetchMode::Reset => self
                .store
                .query_first_page(self.kind, self.options.page_size)
                .await
                .map(Some),
            FetchMode::Continue => self.query_continuation(ticket.cursor.as_ref()).await,
        };

        if self.is_torn_down() {
            log::warn!(
                "{} {mode} fetch resolved after teardown; result dropped",
                self.kind
            );
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(Some(page)) => self.apply_page(mode, page),
            Ok(None) => {
                log::warn!(
                    "{} cursor anchor no longer exists; treating feed as exhausted",
                    self.kind
                );
                self.apply(Message::CursorAnchorLost);
                FetchOutcome::AnchorLost
            }
            Err(error) => {
                if error.is_transient() {
                    log::warn!("{} {mode} fetch failed, retry on next trigger: {error}", self.kind);
                } else {
                    log::error!("{} {mode} fetch failed: {error}", self.kind);
                }
                self.apply(Message::FetchFailed(mode));
                FetchOutcome::Failed(error)
            }
        }
    }

    /// Resolves the cursor, then asks for the page after it
    ///
    /// `Ok(None)` means the anchor record has disappeared upstream.
    async fn query_continuation(
        &self,
        cursor: Option<&RecordId>,
    ) -> Result<Option<Page>, StoreError> {
        let Some(cursor) = cursor else {
            return Ok(None);
        };
        let Some(handle) = self
            .store
            .resolve_cursor_handle(self.kind, cursor)
            .await?
        else {
            return Ok(None);
        };
        self.store
            .query_next_page(self.kind, &handle, self.options.page_size)
            .await
            .map(Some)
    }

    fn apply_page(&self, mode: FetchMode, page: Page) -> FetchOutcome {
        let fetched = page.len();
        let mut state = self.state();
        let before = match mode {
            FetchMode::Reset => 0,
            FetchMode::Continue => state.authoritative().len(),
        };
        state.update(Message::PageLoaded {
            mode,
            records: page.records,
        });
        let added = state.authoritative().len() - before;
        log::debug!(
            "{} {mode} page: {fetched} fetched, {added} new, exhausted={}",
            self.kind,
            state.is_exhausted()
        );
        FetchOutcome::Loaded {
            mode,
            fetched,
            added,
        }
    }
}
