use std::sync::{Arc, Mutex, PoisonError};

use board_logging::{board_debug, board_info, board_trace, board_warn};
use jobboard_core::{FeedSettings, FeedSnapshot, FeedState, LoadOutcome, PageRequest};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{FetchError, PageFetcher};

/// Drives a [`FeedState`] against a [`PageFetcher`].
///
/// The state lock is only taken between suspension points, so each
/// transition is atomic with respect to other calls on the same controller.
/// Each change is published to receivers from [`subscribe`](Self::subscribe).
pub struct PaginatedFeedController {
    fetcher: Arc<dyn PageFetcher>,
    state: Mutex<FeedState>,
    snapshots: watch::Sender<FeedSnapshot>,
}

impl PaginatedFeedController {
    /// Builds an idle controller. Nothing is fetched until the first `load_next`.
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: FeedSettings) -> Self {
        let state = FeedState::new(settings);
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            fetcher,
            state: Mutex::new(state),
            snapshots,
        }
    }

    /// Builds a controller and starts the initial page load on the current
    /// tokio runtime. The first page is claimed before this returns, so the
    /// feed reports `loading` immediately.
    pub fn spawn(
        fetcher: Arc<dyn PageFetcher>,
        settings: FeedSettings,
    ) -> (Arc<Self>, JoinHandle<Result<LoadOutcome, FetchError>>) {
        let controller = Arc::new(Self::new(fetcher, settings));
        let request = controller.update(FeedState::begin_load_next);
        let task = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                match request {
                    Some(request) => controller.execute(request).await,
                    None => Ok(LoadOutcome::Skipped),
                }
            })
        };
        (controller, task)
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Fetches the next page unless a load is in flight or the feed is exhausted.
    ///
    /// Failures are recorded in the feed's `error` and also returned.
    pub async fn load_next(&self) -> Result<LoadOutcome, FetchError> {
        let Some(request) = self.update(FeedState::begin_load_next) else {
            board_trace!("load_next skipped: busy or exhausted");
            return Ok(LoadOutcome::Skipped);
        };
        self.execute(request).await
    }

    /// Restarts from page 1 and replaces the items on success.
    pub async fn refresh(&self) -> Result<LoadOutcome, FetchError> {
        let request = self.update(FeedState::begin_refresh);
        board_debug!("Refreshing feed (generation {})", request.generation);
        self.execute(request).await
    }

    /// Re-issues the next page and clears the error once it is claimed.
    /// While a load or refresh is in flight the error stays visible.
    pub async fn retry_after_error(&self) -> Result<LoadOutcome, FetchError> {
        let Some(request) = self.update(FeedState::begin_retry) else {
            board_trace!("retry skipped: busy or exhausted");
            return Ok(LoadOutcome::Skipped);
        };
        self.execute(request).await
    }

    /// Scroll hook: loads the next page once less than the configured
    /// fraction of content remains below the viewport.
    pub async fn on_scroll(&self, remaining_ratio: f32) -> Result<LoadOutcome, FetchError> {
        let should_load = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .should_load_on_scroll(remaining_ratio);
        if !should_load {
            return Ok(LoadOutcome::Skipped);
        }
        self.load_next().await
    }

    async fn execute(&self, request: PageRequest) -> Result<LoadOutcome, FetchError> {
        let guard = InFlight {
            controller: self,
            request,
            armed: true,
        };
        let result = self
            .fetcher
            .fetch_page(request.page, request.page_size)
            .await;
        guard.disarm();

        match result {
            Ok(jobs) => {
                let outcome = self.update(|state| state.apply_page(&request, jobs));
                match outcome {
                    LoadOutcome::Loaded { page, received } => {
                        board_info!("Loaded page {} with {} postings", page, received);
                    }
                    _ => board_debug!("Dropped stale page {}", request.page),
                }
                Ok(outcome)
            }
            Err(err) => {
                if self.update(|state| state.apply_failure(&request, &err.message)) {
                    board_warn!("Page {} failed: {} ({})", request.page, err, err.kind);
                    Err(err)
                } else {
                    board_debug!("Dropped stale failure for page {}: {}", request.page, err);
                    Ok(LoadOutcome::Superseded)
                }
            }
        }
    }

    fn update<R>(&self, apply: impl FnOnce(&mut FeedState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let result = apply(&mut state);
        let next = state.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        result
    }
}

/// Releases the busy flag if the fetch future is dropped before settling.
struct InFlight<'a> {
    controller: &'a PaginatedFeedController,
    request: PageRequest,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            board_debug!("Page {} request dropped before settling", self.request.page);
            let request = self.request;
            self.controller.update(|state| state.abandon(&request));
        }
    }
}
