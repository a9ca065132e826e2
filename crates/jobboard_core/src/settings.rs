/// Number of postings requested per page.
pub const PAGE_SIZE: u32 = 10;

/// Fraction of remaining scroll content at which the next page is requested.
pub const END_REACHED_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedSettings {
    pub page_size: u32,
    pub end_reached_threshold: f32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            end_reached_threshold: END_REACHED_THRESHOLD,
        }
    }
}
