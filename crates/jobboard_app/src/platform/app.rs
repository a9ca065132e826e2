use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use board_logging::{board_debug, board_info, board_warn};
use chrono::Local;
use jobboard_core::{FeedSnapshot, JobId, LoadOutcome, Msg, ScreenViewModel};
use jobboard_engine::{
    BookmarkStore, FetchError, KeyValueStore, PageFetcher, PaginatedFeedController,
    ReqwestPageFetcher,
};
use tokio::sync::mpsc;

use super::config::{load_config, AppConfig, CONFIG_FILENAME};
use super::logging;
use super::persistence::FileKeyValueStore;
use super::render;

pub fn run_app() -> anyhow::Result<()> {
    let (config, config_error) = match load_config(Path::new(CONFIG_FILENAME)) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    logging::initialize(config.log_destination);
    if let Some(err) = config_error {
        board_warn!("Using default configuration: {}", err);
    }
    board_info!("Job board starting against {}", config.base_url);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(ReqwestPageFetcher::new(config.fetch_settings()));
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(config.data_dir.clone()));
    let bookmarks = BookmarkStore::open(kv);
    let (feed, _initial_load) = PaginatedFeedController::spawn(fetcher, config.feed_settings());

    let mut msg_rx = spawn_input_reader();
    let mut feed_rx = feed.subscribe();
    let mut bookmark_rx = bookmarks.subscribe();

    let mut latest = feed_rx.borrow_and_update().clone();
    redraw(&latest, &bookmarks);

    loop {
        tokio::select! {
            changed = feed_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                latest = feed_rx.borrow_and_update().clone();
                redraw(&latest, &bookmarks);
            }
            changed = bookmark_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                drop(bookmark_rx.borrow_and_update());
                redraw(&latest, &bookmarks);
            }
            msg = msg_rx.recv() => match msg {
                None | Some(Msg::Quit) => break,
                Some(msg) => dispatch(&feed, &bookmarks, &latest, msg),
            },
        }
    }

    board_info!("Job board shutting down");
    bookmarks.shutdown().await;
    Ok(())
}

fn dispatch(
    feed: &Arc<PaginatedFeedController>,
    bookmarks: &BookmarkStore,
    latest: &FeedSnapshot,
    msg: Msg,
) {
    board_debug!("Dispatching {:?}", msg);
    match msg {
        Msg::LoadMore => {
            let feed = Arc::clone(feed);
            tokio::spawn(async move { report("load more", feed.load_next().await) });
        }
        Msg::Refresh => {
            let feed = Arc::clone(feed);
            tokio::spawn(async move { report("refresh", feed.refresh().await) });
        }
        Msg::Retry => {
            let feed = Arc::clone(feed);
            tokio::spawn(async move { report("retry", feed.retry_after_error().await) });
        }
        Msg::Scrolled { remaining } => {
            let feed = Arc::clone(feed);
            tokio::spawn(async move { report("scroll", feed.on_scroll(remaining).await) });
        }
        Msg::ToggleBookmark(id) => toggle_bookmark(bookmarks, latest, &id),
        Msg::Quit | Msg::NoOp => {}
    }
}

/// Bookmarks a posting on screen, or un-bookmarks one that has scrolled away.
fn toggle_bookmark(bookmarks: &BookmarkStore, latest: &FeedSnapshot, id: &JobId) {
    let job = latest
        .items
        .iter()
        .find(|job| job.id == *id)
        .cloned()
        .or_else(|| bookmarks.bookmarks().into_iter().find(|job| job.id == *id));
    match job {
        Some(job) => {
            let toggle = bookmarks.toggle_bookmark(&job);
            board_info!("Bookmark {:?} for job {}", toggle, id);
        }
        None => board_warn!("No job with id {} to bookmark", id),
    }
}

fn report(action: &str, result: Result<LoadOutcome, FetchError>) {
    match result {
        Ok(outcome) => board_debug!("{} finished: {:?}", action, outcome),
        // Already recorded in the feed's error state.
        Err(err) => board_debug!("{} failed: {}", action, err),
    }
}

fn redraw(feed: &FeedSnapshot, bookmarks: &BookmarkStore) {
    let view = ScreenViewModel::build(feed, |id| bookmarks.is_bookmarked(id));
    let updated_at = Local::now().format("%H:%M:%S").to_string();
    println!("{}", render::render(&view, &updated_at));
}

/// Forwards stdin lines as messages; end of input quits.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<Msg> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(Msg::parse(&line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Msg::Quit);
    });
    rx
}
