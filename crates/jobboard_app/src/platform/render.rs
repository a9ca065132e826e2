use std::fmt::Write;

use jobboard_core::{ErrorDisplay, ScreenViewModel};

const HELP: &str = "commands: more | refresh | retry | scroll <ratio> | bookmark <id> | quit";

/// Renders the screen as plain text.
pub(crate) fn render(view: &ScreenViewModel, updated_at: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", view.heading);

    if let Some(ErrorDisplay::FullScreen(message)) = &view.error {
        let _ = writeln!(out, "{message}");
        let _ = writeln!(out, "[ Retry ]  (type `retry`)");
        return out;
    }

    if view.refreshing {
        let _ = writeln!(out, "(refreshing...)");
    }
    for row in &view.rows {
        let marker = if row.bookmarked { "*" } else { " " };
        let _ = match &row.company {
            Some(company) => writeln!(out, "[{marker}] {:>6}  {} ({company})", row.job_id, row.title),
            None => writeln!(out, "[{marker}] {:>6}  {}", row.job_id, row.title),
        };
    }
    if view.show_footer_spinner {
        let _ = writeln!(out, "loading more...");
    } else if !view.has_more && !view.rows.is_empty() {
        let _ = writeln!(out, "(end of list)");
    }
    if let Some(ErrorDisplay::Inline(message)) = &view.error {
        let _ = writeln!(out, "! {message} (type `retry`)");
    }
    let _ = writeln!(out, "{} rows, updated {updated_at}", view.rows.len());
    let _ = writeln!(out, "{HELP}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobboard_core::{FeedSnapshot, JobId, JobPosting};

    fn feed(items: Vec<JobPosting>) -> FeedSnapshot {
        FeedSnapshot {
            items,
            page: 2,
            has_more: false,
            loading: false,
            refreshing: false,
            error: None,
        }
    }

    #[test]
    fn full_screen_error_hides_list() {
        let mut snapshot = feed(Vec::new());
        snapshot.error = Some("Network error".to_string());
        let text = render(&ScreenViewModel::build(&snapshot, |_| false), "now");

        assert!(text.contains("Network error"));
        assert!(text.contains("Retry"));
        assert!(!text.contains("rows"));
    }

    #[test]
    fn rows_show_bookmark_marker_and_end_of_list() {
        let snapshot = feed(vec![
            JobPosting::new(5).with_field("title", "X").with_field("company", "Acme"),
            JobPosting::new(6).with_field("title", "Y"),
        ]);
        let view = ScreenViewModel::build(&snapshot, |id| *id == JobId::from(5));
        let text = render(&view, "12:00:00");

        assert!(text.contains("[*]      5  X (Acme)"));
        assert!(text.contains("[ ]      6  Y"));
        assert!(text.contains("(end of list)"));
        assert!(text.contains("2 rows, updated 12:00:00"));
    }
}
