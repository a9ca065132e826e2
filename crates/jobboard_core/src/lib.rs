//! Job board core: pure feed/bookmark state and view-model helpers.
mod bookmarks;
mod feed;
mod job;
mod msg;
mod settings;
mod view_model;

pub use bookmarks::{BookmarkSet, Toggle};
pub use feed::{FeedSnapshot, FeedState, LoadMode, LoadOutcome, PageRequest};
pub use job::{JobId, JobPosting};
pub use msg::Msg;
pub use settings::{FeedSettings, END_REACHED_THRESHOLD, PAGE_SIZE};
pub use view_model::{ErrorDisplay, JobRowView, ScreenViewModel, HEADING};
