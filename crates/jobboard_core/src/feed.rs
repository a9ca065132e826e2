use crate::{FeedSettings, JobPosting};

/// Fallback shown when a fetch fails without a usable message.
const DEFAULT_ERROR_MESSAGE: &str = "Failed to load jobs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Incremental load driven by scrolling or the initial mount.
    Next,
    /// Pull-to-refresh: restart from page 1.
    Refresh,
}

/// A fetch the state machine has committed to. It must be handed back to
/// exactly one of `apply_page`, `apply_failure` or `abandon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub page: u32,
    pub page_size: u32,
    pub mode: LoadMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The busy/exhaustion guard refused the call; nothing was fetched.
    Skipped,
    /// The page was merged into the feed.
    Loaded { page: u32, received: usize },
    /// A refresh started while this request was in flight; its result was dropped.
    Superseded,
}

/// Observable copy of the feed, published after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub items: Vec<JobPosting>,
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
}

/// Paging state for one feed.
///
/// Every mutation is synchronous; callers perform the fetch between
/// `begin_*` and `apply_*`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    settings: FeedSettings,
    items: Vec<JobPosting>,
    page: u32,
    has_more: bool,
    loading: bool,
    refreshing: bool,
    error: Option<String>,
    generation: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(FeedSettings::default())
    }
}

impl FeedState {
    pub fn new(settings: FeedSettings) -> Self {
        Self {
            settings: FeedSettings {
                page_size: settings.page_size.max(1),
                ..settings
            },
            items: Vec::new(),
            page: 1,
            has_more: true,
            loading: false,
            refreshing: false,
            error: None,
            generation: 0,
        }
    }

    pub fn items(&self) -> &[JobPosting] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn settings(&self) -> FeedSettings {
        self.settings
    }

    /// Claims the next page, or returns `None` while busy or exhausted.
    pub fn begin_load_next(&mut self) -> Option<PageRequest> {
        if self.loading || self.refreshing || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(self.request(LoadMode::Next))
    }

    /// Restarts paging from page 1, superseding anything in flight.
    pub fn begin_refresh(&mut self) -> PageRequest {
        self.generation += 1;
        self.page = 1;
        self.has_more = true;
        self.loading = false;
        self.refreshing = true;
        self.request(LoadMode::Refresh)
    }

    /// Merges a fetched page. Page 1 always replaces the list so a retry
    /// after a failed refresh cannot duplicate stale rows.
    pub fn apply_page(&mut self, request: &PageRequest, jobs: Vec<JobPosting>) -> LoadOutcome {
        if !self.settle(request) {
            return LoadOutcome::Superseded;
        }
        let received = jobs.len();
        if request.page == 1 {
            self.items = jobs;
        } else {
            self.items.extend(jobs);
        }
        if received < request.page_size as usize {
            self.has_more = false;
        }
        self.page = request.page + 1;
        LoadOutcome::Loaded {
            page: request.page,
            received,
        }
    }

    /// Records a failed fetch. Items, page and `has_more` stay untouched.
    /// Returns false when the request was superseded and nothing was recorded.
    pub fn apply_failure(&mut self, request: &PageRequest, message: &str) -> bool {
        if !self.settle(request) {
            return false;
        }
        let message = message.trim();
        self.error = Some(if message.is_empty() {
            DEFAULT_ERROR_MESSAGE.to_owned()
        } else {
            message.to_owned()
        });
        true
    }

    /// Releases the busy flag of a request that never settled.
    pub fn abandon(&mut self, request: &PageRequest) {
        self.settle(request);
    }

    /// Claims the next page like [`begin_load_next`](Self::begin_load_next)
    /// and clears the error, but only when a request was actually claimed.
    pub fn begin_retry(&mut self) -> Option<PageRequest> {
        let request = self.begin_load_next()?;
        self.error = None;
        Some(request)
    }

    /// Whether a scroll position `remaining_ratio` away from the end should
    /// trigger the next page.
    pub fn should_load_on_scroll(&self, remaining_ratio: f32) -> bool {
        remaining_ratio <= self.settings.end_reached_threshold
            && !self.loading
            && !self.refreshing
            && self.has_more
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: self.items.clone(),
            page: self.page,
            has_more: self.has_more,
            loading: self.loading,
            refreshing: self.refreshing,
            error: self.error.clone(),
        }
    }

    fn request(&self, mode: LoadMode) -> PageRequest {
        PageRequest {
            generation: self.generation,
            page: self.page,
            page_size: self.settings.page_size,
            mode,
        }
    }

    /// Clears the busy flag owned by `request`. Returns false for stale requests.
    fn settle(&mut self, request: &PageRequest) -> bool {
        if request.generation != self.generation {
            return false;
        }
        match request.mode {
            LoadMode::Next => self.loading = false,
            LoadMode::Refresh => self.refreshing = false,
        }
        true
    }
}
