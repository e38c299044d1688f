//! The contact surface: one comments feed and one feedback feed behind tabs
//!
//! The surface forwards visibility, tab and scroll events to the right
//! controller and routes submissions through the store's write side. Each
//! controller keeps its own gate, so the two feeds fetch independently.

use std::mem;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::{
    core::{state::ViewMode, trigger::ScrollPosition},
    domain::{CommentBody, FeedKind, FeedbackBody, Record, RecordBody},
    infrastructure::store::{CursorStore, RecordWriter, StoreError},
    presentation::feed_view::FeedSnapshot,
    utils::sync::lock,
};

use super::feed_controller::{FeedController, FeedOptions, FetchOutcome};

/// Both feeds as the presentation layer sees them
#[derive(Debug, Clone)]
pub struct SurfaceSnapshot {
    pub active: FeedKind,
    pub comments: FeedSnapshot,
    pub feedback: FeedSnapshot,
}

impl SurfaceSnapshot {
    pub fn feed(&self, kind: FeedKind) -> &FeedSnapshot {
        match kind {
            FeedKind::Comments => &self.comments,
            FeedKind::Feedback => &self.feedback,
        }
    }

    pub fn active_feed(&self) -> &FeedSnapshot {
        self.feed(self.active)
    }
}

pub struct ContactSurface<S: ?Sized> {
    comments: FeedController<S>,
    feedback: FeedController<S>,
    active: Mutex<FeedKind>,
    cancel: CancellationToken,
    store: Arc<S>,
}

impl<S: CursorStore + ?Sized> ContactSurface<S> {
    /// Mounts the surface with the comments tab active
    ///
    /// Nothing is fetched until the surface is revealed.
    pub fn mount(store: Arc<S>, options: FeedOptions) -> Self {
        let cancel = CancellationToken::new();
        let controller = |kind| {
            FeedController::with_cancellation(
                kind,
                Arc::clone(&store),
                options.clone(),
                cancel.child_token(),
            )
        };
        let surface = Self {
            comments: controller(FeedKind::Comments),
            feedback: controller(FeedKind::Feedback),
            active: Mutex::new(FeedKind::Comments),
            cancel,
            store,
        };
        surface.comments.preselect();
        surface
    }

    pub fn feed(&self, kind: FeedKind) -> &FeedController<S> {
        match kind {
            FeedKind::Comments => &self.comments,
            FeedKind::Feedback => &self.feedback,
        }
    }

    pub fn active_tab(&self) -> FeedKind {
        *lock(&self.active)
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            active: self.active_tab(),
            comments: self.comments.snapshot(),
            feedback: self.feedback.snapshot(),
        }
    }

    /// The surface entered the viewport
    ///
    /// Both feeds learn about it; only the active one can start loading.
    /// Returns the active feed's outcome.
    pub async fn on_visible(&self) -> FetchOutcome {
        let (comments, feedback) =
            futures::join!(self.comments.on_visible(), self.feedback.on_visible());
        match self.active_tab() {
            FeedKind::Comments => comments,
            FeedKind::Feedback => feedback,
        }
    }

    /// Switches tabs, loading the newly active feed the first time it is shown
    pub async fn select_tab(&self, kind: FeedKind) -> FetchOutcome {
        let previous = mem::replace(&mut *lock(&self.active), kind);
        if previous == kind {
            return FetchOutcome::Skipped;
        }
        log::debug!("tab switched from {previous} to {kind}");
        self.feed(previous).on_tab_deactivated();
        self.feed(kind).on_tab_activated().await
    }

    /// Scroll samples only reach the active feed
    pub async fn on_scroll(&self, position: ScrollPosition) -> FetchOutcome {
        self.feed(self.active_tab()).on_scroll(position).await
    }

    pub async fn load_more(&self, kind: FeedKind) -> FetchOutcome {
        self.feed(kind).load_more().await
    }

    pub fn set_view_mode(&self, kind: FeedKind, mode: ViewMode) {
        self.feed(kind).set_view_mode(mode);
    }

    pub fn toggle_view_mode(&self, kind: FeedKind) -> ViewMode {
        self.feed(kind).toggle_view_mode()
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Unmounts the surface; both feeds go inert and late results are dropped
    pub fn teardown(&self) {
        log::info!("contact surface torn down");
        self.cancel.cancel();
    }
}

impl<S: CursorStore + RecordWriter + ?Sized> ContactSurface<S> {
    /// Posts a comment, then reloads the comments feed from the top
    ///
    /// The error is the write's; a failed reload is reported in the outcome
    /// and leaves the feed as it was.
    pub async fn submit_comment(
        &self,
        body: CommentBody,
    ) -> Result<(Record, FetchOutcome), StoreError> {
        self.submit(FeedKind::Comments, RecordBody::Comment(body))
            .await
    }

    /// Posts feedback, then reloads the feedback feed from the top
    pub async fn submit_feedback(
        &self,
        body: FeedbackBody,
    ) -> Result<(Record, FetchOutcome), StoreError> {
        self.submit(FeedKind::Feedback, RecordBody::Feedback(body))
            .await
    }

    async fn submit(
        &self,
        kind: FeedKind,
        body: RecordBody,
    ) -> Result<(Record, FetchOutcome), StoreError> {
        let record = self.store.append(kind, body).await.map_err(|error| {
            log::error!("{kind} submission rejected: {error}");
            error
        })?;
        log::info!("{kind} submission stored as {}", record.id());

        let outcome = self.feed(kind).reset_after_write().await;
        Ok((record, outcome))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        core::state::{FeedPhase, FetchMode},
        domain::{Rating, SortKey},
        infrastructure::memory_store::MemoryCursorStore,
    };

    fn comment(message: &str) -> RecordBody {
        RecordBody::Comment(CommentBody {
            author: "visitor".to_string(),
            message: message.to_string(),
            avatar_url: None,
            provider: None,
        })
    }

    fn store_with(comments: i64, feedback: i64) -> Arc<MemoryCursorStore> {
        let store = MemoryCursorStore::new();
        for n in 0..comments {
            store.insert_at(
                FeedKind::Comments,
                SortKey::from_millis(1_000 * (n + 1)),
                comment(&format!("comment {n}")),
            );
        }
        for n in 0..feedback {
            store.insert_at(
                FeedKind::Feedback,
                SortKey::from_millis(1_000 * (n + 1)),
                RecordBody::Feedback(FeedbackBody {
                    author: "visitor".to_string(),
                    message: format!("feedback {n}"),
                    rating: Rating::new(4).expect("valid rating"),
                    avatar_url: None,
                    provider: None,
                }),
            );
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_mount_does_not_fetch() {
        let store = store_with(3, 3);
        let surface = ContactSurface::mount(Arc::clone(&store), FeedOptions::default());

        assert_eq!(surface.active_tab(), FeedKind::Comments);
        assert_eq!(store.metrics(FeedKind::Comments).total_reads(), 0);
        assert_eq!(surface.feed(FeedKind::Comments).phase(), FeedPhase::Idle);
    }

    #[tokio::test]
    async fn test_reveal_loads_only_active_tab() {
        let store = store_with(3, 3);
        let surface = ContactSurface::mount(Arc::clone(&store), FeedOptions::default());

        assert!(surface.on_visible().await.is_loaded());
        assert_eq!(store.metrics(FeedKind::Comments).first_page_calls, 1);
        assert_eq!(store.metrics(FeedKind::Feedback).total_reads(), 0);

        // Revealing again is not a new activation
        assert_eq!(surface.on_visible().await, FetchOutcome::Skipped);
        assert_eq!(store.metrics(FeedKind::Comments).first_page_calls, 1);
    }

    #[tokio::test]
    async fn test_tab_switch_loads_other_feed_once() {
        let store = store_with(3, 3);
        let surface = ContactSurface::mount(Arc::clone(&store), FeedOptions::default());
        surface.on_visible().await;

        assert!(surface.select_tab(FeedKind::Feedback).await.is_loaded());
        surface.select_tab(FeedKind::Comments).await;
        assert_eq!(
            surface.select_tab(FeedKind::Feedback).await,
            FetchOutcome::Skipped
        );

        assert_eq!(store.metrics(FeedKind::Feedback).first_page_calls, 1);
        assert_eq!(store.metrics(FeedKind::Comments).first_page_calls, 1);
        assert_eq!(surface.snapshot().active_feed().kind, FeedKind::Comments);
    }

    #[tokio::test]
    async fn test_submission_resets_its_feed() {
        let store = store_with(12, 0);
        let surface = ContactSurface::mount(Arc::clone(&store), FeedOptions::default());
        surface.on_visible().await;
        surface.load_more(FeedKind::Comments).await;
        assert_eq!(surface.snapshot().comments.expanded.len(), 12);

        let (record, outcome) = surface
            .submit_comment(CommentBody {
                author: "me".to_string(),
                message: "hello".to_string(),
                avatar_url: None,
                provider: None,
            })
            .await
            .expect("write should succeed");

        assert_eq!(
            outcome,
            FetchOutcome::Loaded {
                mode: FetchMode::Reset,
                fetched: 10,
                added: 10
            }
        );
        let snapshot = surface.snapshot().comments;
        assert_eq!(snapshot.expanded.len(), 10);
        assert_eq!(snapshot.preview[0].id(), record.id());
        assert!(snapshot.has_more);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_feed_untouched() {
        let store = store_with(3, 0);
        let surface = ContactSurface::mount(Arc::clone(&store), FeedOptions::default());
        surface.on_visible().await;
        store.reset_metrics();

        store.fail_next(
            FeedKind::Comments,
            StoreError::PermissionDenied("closed".into()),
        );
        let result = surface
            .submit_comment(CommentBody {
                author: "me".to_string(),
                message: "rejected".to_string(),
                avatar_url: None,
                provider: None,
            })
            .await;

        assert_eq!(
            result.map(|(_, outcome)| outcome),
            Err(StoreError::PermissionDenied("closed".into()))
        );
        assert_eq!(store.metrics(FeedKind::Comments).first_page_calls, 0);
        assert_eq!(surface.snapshot().comments.expanded.len(), 3);
    }

    #[tokio::test]
    async fn test_teardown_silences_both_feeds() {
        let store = store_with(3, 3);
        let surface = ContactSurface::mount(Arc::clone(&store), FeedOptions::default());
        surface.teardown();

        assert_eq!(surface.on_visible().await, FetchOutcome::Skipped);
        assert_eq!(
            surface.select_tab(FeedKind::Feedback).await,
            FetchOutcome::Skipped
        );
        assert!(surface.feed(FeedKind::Feedback).is_torn_down());
        assert_eq!(store.metrics(FeedKind::Comments).total_reads(), 0);
        assert_eq!(store.metrics(FeedKind::Feedback).total_reads(), 0);
    }
}
