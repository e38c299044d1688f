use std::sync::Arc;

use pretty_assertions::assert_eq;

use feedsync::{
    core::state::{FeedPhase, FetchMode, ViewMode},
    domain::{CommentBody, FeedKind, RecordBody, RecordId, SortKey},
    infrastructure::memory_store::MemoryCursorStore,
    integration::{ContactSurface, FeedController, FeedOptions, FetchOutcome},
    presentation::Footer,
};

fn comment(n: usize) -> RecordBody {
    RecordBody::Comment(CommentBody {
        author: format!("author-{n}"),
        message: format!("comment {n}"),
        avatar_url: None,
        provider: None,
    })
}

/// Store with `count` comments, oldest first in insertion order
fn store_with_comments(count: usize) -> Arc<MemoryCursorStore> {
    let store = MemoryCursorStore::new();
    for n in 0..count {
        store.insert_at(
            FeedKind::Comments,
            SortKey::from_millis(1_000 * (n as i64 + 1)),
            comment(n),
        );
    }
    Arc::new(store)
}

fn comments_feed(store: &Arc<MemoryCursorStore>) -> FeedController<MemoryCursorStore> {
    FeedController::new(FeedKind::Comments, Arc::clone(store), FeedOptions::default())
}

fn ids(records: &[feedsync::Record]) -> Vec<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

/// Cold start against an empty collection
#[tokio::test]
async fn test_cold_start_with_empty_store() {
    let store = store_with_comments(0);
    let feed = comments_feed(&store);

    feed.on_tab_activated().await;
    let outcome = feed.on_visible().await;

    assert_eq!(
        outcome,
        FetchOutcome::Loaded {
            mode: FetchMode::Reset,
            fetched: 0,
            added: 0
        }
    );
    let snapshot = feed.snapshot();
    assert!(snapshot.preview.is_empty());
    assert!(snapshot.expanded.is_empty());
    assert!(!snapshot.loading_initial);
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.phase, FeedPhase::Exhausted);
}

/// A page exactly `page_size` long is not exhaustion; the empty follow-up is
#[tokio::test]
async fn test_exactly_one_full_page() {
    let store = store_with_comments(10);
    let feed = comments_feed(&store);

    feed.fetch_page(FetchMode::Reset).await;
    assert!(feed.snapshot().has_more);

    let outcome = feed.load_more().await;
    assert_eq!(
        outcome,
        FetchOutcome::Loaded {
            mode: FetchMode::Continue,
            fetched: 0,
            added: 0
        }
    );

    let snapshot = feed.snapshot();
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.expanded.len(), 10);
    assert_eq!(store.metrics(FeedKind::Comments).next_page_calls, 1);
}

/// Two triggers in the same tick reach the store once
#[tokio::test]
async fn test_same_tick_triggers_issue_one_query() {
    let store = store_with_comments(25);
    let feed = comments_feed(&store);
    feed.fetch_page(FetchMode::Reset).await;
    store.reset_metrics();
    store.hold();

    let (first, second, ()) = futures::join!(feed.load_more(), feed.load_more(), async {
        tokio::task::yield_now().await;
        store.release();
    });

    assert!(first.is_loaded());
    assert_eq!(second, FetchOutcome::Skipped);
    let metrics = store.metrics(FeedKind::Comments);
    assert_eq!(metrics.resolve_calls, 1);
    assert_eq!(metrics.next_page_calls, 1);
    assert_eq!(feed.snapshot().expanded.len(), 20);
}

/// A write after several pages replaces everything with a fresh first page
#[tokio::test]
async fn test_write_reset_after_several_pages() {
    let store = store_with_comments(40);
    let surface = ContactSurface::mount(Arc::clone(&store), FeedOptions::default());
    surface.on_visible().await;
    surface.load_more(FeedKind::Comments).await;
    surface.load_more(FeedKind::Comments).await;
    assert_eq!(surface.snapshot().comments.expanded.len(), 30);

    let (record, outcome) = surface
        .submit_comment(CommentBody {
            author: "me".to_string(),
            message: "fresh".to_string(),
            avatar_url: None,
            provider: None,
        })
        .await
        .expect("write should succeed");
    assert!(outcome.is_loaded());

    let snapshot = surface.snapshot().comments;
    assert_eq!(snapshot.expanded.len(), 10);
    assert_eq!(snapshot.preview.len(), 10);
    assert_eq!(snapshot.expanded[0].id(), record.id());
    assert!(snapshot.has_more);

    // The cursor was rebuilt from the new first page
    surface.load_more(FeedKind::Comments).await;
    let snapshot = surface.snapshot().comments;
    assert_eq!(snapshot.expanded.len(), 20);
    assert_eq!(snapshot.expanded[10].id(), &RecordId::new("comments-000031"));
}

/// Toggling the view only switches projections; preview lags until reset
#[tokio::test]
async fn test_view_toggle_does_not_fetch() {
    let store = store_with_comments(15);
    let feed = comments_feed(&store);
    feed.fetch_page(FetchMode::Reset).await;
    let first_page = ids(&feed.snapshot().preview);

    feed.set_view_mode(ViewMode::Expanded);
    feed.load_more().await;
    assert_eq!(feed.snapshot().visible().len(), 15);
    assert_eq!(feed.snapshot().footer(), Footer::EndOfFeed);

    store.reset_metrics();
    assert_eq!(feed.toggle_view_mode(), ViewMode::Preview);

    let snapshot = feed.snapshot();
    assert_eq!(ids(snapshot.visible()), first_page);
    assert_eq!(snapshot.expanded.len(), 15);
    assert_eq!(snapshot.footer(), Footer::Hidden);
    assert_eq!(store.metrics(FeedKind::Comments).total_reads(), 0);
}

#[tokio::test]
async fn test_pages_never_overlap_or_reorder() {
    let store = store_with_comments(23);
    let feed = comments_feed(&store);
    feed.fetch_page(FetchMode::Reset).await;
    while feed.load_more().await.is_loaded() {}

    let snapshot = feed.snapshot();
    assert_eq!(snapshot.expanded.len(), 23);
    let keys: Vec<_> = snapshot.expanded.iter().map(|r| r.sort_key()).collect();
    let mut sorted = keys.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn test_exhausted_feed_never_queries_again() {
    let store = store_with_comments(12);
    let feed = comments_feed(&store);
    feed.fetch_page(FetchMode::Reset).await;
    feed.load_more().await;
    assert_eq!(feed.phase(), FeedPhase::Exhausted);

    // New data upstream does not reopen pagination without a reset
    store.insert_at(FeedKind::Comments, SortKey::from_millis(1), comment(99));
    store.reset_metrics();
    for _ in 0..5 {
        assert_eq!(feed.load_more().await, FetchOutcome::Skipped);
    }
    assert_eq!(store.metrics(FeedKind::Comments).total_reads(), 0);

    feed.fetch_page(FetchMode::Reset).await;
    assert!(feed.snapshot().has_more);
}

#[tokio::test]
async fn test_newer_records_wait_for_next_reset() {
    let store = store_with_comments(15);
    let feed = comments_feed(&store);
    feed.fetch_page(FetchMode::Reset).await;

    let newest = store.insert_at(FeedKind::Comments, SortKey::from_millis(60_000), comment(50));
    feed.load_more().await;

    let snapshot = feed.snapshot();
    assert_eq!(snapshot.expanded.len(), 15);
    assert!(!snapshot.expanded.contains(newest.id()));

    feed.fetch_page(FetchMode::Reset).await;
    assert_eq!(feed.snapshot().preview[0].id(), newest.id());
}
