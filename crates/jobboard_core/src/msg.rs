use crate::JobId;

/// User intents coming from the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Explicit request for the next page.
    LoadMore,
    /// Pull-to-refresh.
    Refresh,
    /// Retry button on the error state.
    Retry,
    /// The list scrolled; `remaining` is the fraction of content left below the viewport.
    Scrolled { remaining: f32 },
    /// Bookmark button on a row.
    ToggleBookmark(JobId),
    /// Leave the screen.
    Quit,
    /// Unrecognised or empty input.
    NoOp,
}

impl Msg {
    /// Parses one line of terminal input.
    pub fn parse(line: &str) -> Msg {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Msg::NoOp;
        };
        let argument = parts.next();
        match (command.to_ascii_lowercase().as_str(), argument) {
            ("more" | "m", None) => Msg::LoadMore,
            ("refresh" | "r", None) => Msg::Refresh,
            ("retry", None) => Msg::Retry,
            ("quit" | "q" | "exit", None) => Msg::Quit,
            ("scroll" | "s", Some(raw)) => match raw.parse::<f32>() {
                Ok(remaining) if remaining.is_finite() => Msg::Scrolled {
                    remaining: remaining.clamp(0.0, 1.0),
                },
                _ => Msg::NoOp,
            },
            ("bookmark" | "b", Some(raw)) => JobId::parse(raw).map_or(Msg::NoOp, Msg::ToggleBookmark),
            _ => Msg::NoOp,
        }
    }
}
