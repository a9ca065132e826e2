use jobboard_core::{ErrorDisplay, FeedSnapshot, JobId, JobPosting, ScreenViewModel, HEADING};
use pretty_assertions::assert_eq;

fn snapshot(items: Vec<JobPosting>) -> FeedSnapshot {
    FeedSnapshot {
        items,
        page: 2,
        has_more: true,
        loading: false,
        refreshing: false,
        error: None,
    }
}

#[test]
fn rows_are_decorated_with_bookmark_status() {
    let feed = snapshot(vec![
        JobPosting::new(1)
            .with_field("title", "Rust Engineer")
            .with_field("company", "Ferris Inc"),
        JobPosting::new(2),
    ]);

    let view = ScreenViewModel::build(&feed, |id| *id == JobId::from(2));

    assert_eq!(view.heading, HEADING);
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].title, "Rust Engineer");
    assert_eq!(view.rows[0].company.as_deref(), Some("Ferris Inc"));
    assert!(!view.rows[0].bookmarked);
    assert_eq!(view.rows[1].title, "Job 2");
    assert!(view.rows[1].bookmarked);
}

#[test]
fn error_is_full_screen_only_without_items() {
    let mut feed = snapshot(Vec::new());
    feed.error = Some("Network error".to_string());
    let view = ScreenViewModel::build(&feed, |_| false);
    assert_eq!(
        view.error,
        Some(ErrorDisplay::FullScreen("Network error".to_string()))
    );

    feed.items.push(JobPosting::new(1));
    let view = ScreenViewModel::build(&feed, |_| false);
    assert_eq!(view.error, Some(ErrorDisplay::Inline("Network error".to_string())));
}

#[test]
fn footer_spinner_needs_loading_and_more_pages() {
    let mut feed = snapshot(vec![JobPosting::new(1)]);
    feed.loading = true;
    assert!(ScreenViewModel::build(&feed, |_| false).show_footer_spinner);

    feed.has_more = false;
    assert!(!ScreenViewModel::build(&feed, |_| false).show_footer_spinner);
}
