use crate::{FeedSnapshot, JobId};

pub const HEADING: &str = "Latest Opportunities";

/// How a feed error should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDisplay {
    /// Nothing loaded yet: replace the list with the message and a retry action.
    FullScreen(String),
    /// Keep the list and show the message next to it.
    Inline(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub title: String,
    pub company: Option<String>,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScreenViewModel {
    pub heading: &'static str,
    pub rows: Vec<JobRowView>,
    pub show_footer_spinner: bool,
    pub refreshing: bool,
    pub has_more: bool,
    pub error: Option<ErrorDisplay>,
}

impl ScreenViewModel {
    /// Decorates the feed's items with their bookmark status.
    pub fn build(feed: &FeedSnapshot, is_bookmarked: impl Fn(&JobId) -> bool) -> Self {
        let rows = feed
            .items
            .iter()
            .map(|job| JobRowView {
                job_id: job.id.clone(),
                title: job
                    .title()
                    .map_or_else(|| format!("Job {}", job.id), ToOwned::to_owned),
                company: job.company().map(ToOwned::to_owned),
                bookmarked: is_bookmarked(&job.id),
            })
            .collect::<Vec<_>>();

        let error = feed.error.clone().map(|message| {
            if rows.is_empty() {
                ErrorDisplay::FullScreen(message)
            } else {
                ErrorDisplay::Inline(message)
            }
        });

        Self {
            heading: HEADING,
            rows,
            show_footer_spinner: feed.loading && feed.has_more,
            refreshing: feed.refreshing,
            has_more: feed.has_more,
            error,
        }
    }
}
