use std::sync::Arc;

use chrono::{Duration, Local, Utc};
use clap::Parser;
use color_eyre::eyre::Result;

use feedsync::{
    core::{state::ViewMode, trigger::ScrollPosition},
    domain::{CommentBody, FeedKind, FeedbackBody, Rating, RecordBody, SortKey},
    infrastructure::{
        cli::Cli,
        config::{Config, SeedSettings},
        memory_store::{MemoryCursorStore, MemoryStoreConfig},
    },
    integration::{ContactSurface, FeedOptions, FetchOutcome},
    presentation::{group_by_day, FeedSnapshot},
    utils::{initialize_logging, initialize_panic_handler},
};

const AUTHORS: [&str; 5] = ["ada", "grace", "linus", "barbara", "ken"];

fn plant<F>(
    store: &MemoryCursorStore,
    kind: FeedKind,
    count: usize,
    spread: Duration,
    body: F,
) -> Result<()>
where
    F: Fn(usize, &str) -> Result<RecordBody>,
{
    let now = Utc::now();
    let step = spread / i32::try_from(count.max(1))?;
    for n in 0..count {
        let author = AUTHORS[n % AUTHORS.len()];
        let at = now - step * i32::try_from(n)?;
        store.insert_at(kind, SortKey::new(at), body(n, author)?);
    }
    Ok(())
}

fn seed(store: &MemoryCursorStore, settings: &SeedSettings) -> Result<()> {
    let spread = Duration::hours(settings.spread_hours.max(1));

    plant(store, FeedKind::Comments, settings.comments, spread, |n, author| {
        Ok(RecordBody::Comment(CommentBody {
            author: author.to_string(),
            message: format!("Comment number {}", n + 1),
            avatar_url: None,
            provider: Some("guest".to_string()),
        }))
    })?;
    plant(store, FeedKind::Feedback, settings.feedback, spread, |n, author| {
        Ok(RecordBody::Feedback(FeedbackBody {
            author: author.to_string(),
            message: format!("Feedback number {}", n + 1),
            rating: Rating::try_from(u8::try_from(n % 5 + 1)?)?,
            avatar_url: None,
            provider: Some("guest".to_string()),
        }))
    })
}

fn print_feed(snapshot: &FeedSnapshot) {
    let today = Local::now().date_naive();
    println!(
        "== {} [{}] {} shown, {} loaded, footer: {}",
        snapshot.kind,
        snapshot.view_mode,
        snapshot.visible().len(),
        snapshot.total,
        snapshot.footer()
    );
    for bucket in group_by_day(snapshot.visible(), &Local) {
        println!("  {}", bucket.label(today));
        for record in bucket.records {
            let rating = record
                .body()
                .rating()
                .map(|rating| format!(" ({}/{})", rating.value(), Rating::MAX))
                .unwrap_or_default();
            println!(
                "    {} {}: {}{rating}",
                record.sort_key().as_datetime().with_timezone(&Local).format("%H:%M"),
                record.body().author(),
                record.body().message()
            );
        }
    }
    if let Some(label) = snapshot.expand_label() {
        println!("  [{label}]");
    }
}

fn report(step: &str, outcome: &FetchOutcome) {
    println!("-> {step}: {outcome:?}");
}

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = <Cli as Parser>::parse();

    // Load configuration (file-based), then apply CLI overrides
    let mut config = Config::new()?;
    args.apply(&mut config);

    let store = Arc::new(MemoryCursorStore::with_config(MemoryStoreConfig {
        latency: config.store.latency(),
    }));
    seed(&store, &config.seed)?;
    log::info!(
        "seeded {} comments and {} feedback entries",
        store.len(FeedKind::Comments),
        store.len(FeedKind::Feedback)
    );

    let options = FeedOptions::from(&config.feed);
    let surface = ContactSurface::mount(Arc::clone(&store), options);

    report("surface revealed", &surface.on_visible().await);
    print_feed(&surface.snapshot().comments);

    surface.set_view_mode(FeedKind::Comments, ViewMode::Expanded);
    let bottom = ScrollPosition::new(1_000.0, 800.0, 1_900.0);
    report("scrolled near bottom", &surface.on_scroll(bottom).await);
    loop {
        let outcome = surface.load_more(FeedKind::Comments).await;
        report("load more", &outcome);
        if !outcome.is_loaded() {
            break;
        }
    }
    print_feed(&surface.snapshot().comments);

    report(
        "feedback tab selected",
        &surface.select_tab(FeedKind::Feedback).await,
    );
    let (record, outcome) = surface
        .submit_feedback(FeedbackBody {
            author: "you".to_string(),
            message: "Thanks for the demo".to_string(),
            rating: Rating::new(Rating::MAX)?,
            avatar_url: None,
            provider: None,
        })
        .await?;
    report(&format!("feedback {} submitted", record.id()), &outcome);
    print_feed(&surface.snapshot().feedback);

    surface.teardown();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
