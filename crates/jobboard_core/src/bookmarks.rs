use std::collections::HashSet;

use crate::{JobId, JobPosting};

/// Result of toggling a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Recorded, but applied only once the persisted set has loaded.
    Deferred,
}

/// Bookmarked postings in insertion order, with O(1) membership checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkSet {
    entries: Vec<JobPosting>,
    ids: HashSet<JobId>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a persisted sequence; the first entry for an id wins.
    pub fn from_entries(entries: impl IntoIterator<Item = JobPosting>) -> Self {
        let mut set = Self::new();
        for job in entries {
            if set.ids.insert(job.id.clone()) {
                set.entries.push(job);
            }
        }
        set
    }

    /// Decodes the JSON array stored under the bookmarks key.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<JobPosting> = serde_json::from_str(raw)?;
        Ok(Self::from_entries(entries))
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.ids.contains(id)
    }

    /// Removes `job` if its id is present, otherwise stores the full posting.
    pub fn toggle(&mut self, job: &JobPosting) -> Toggle {
        if self.ids.remove(&job.id) {
            self.entries.retain(|entry| entry.id != job.id);
            Toggle::Removed
        } else {
            self.ids.insert(job.id.clone());
            self.entries.push(job.clone());
            Toggle::Added
        }
    }

    pub fn entries(&self) -> &[JobPosting] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_collapses_duplicate_ids() {
        let set = BookmarkSet::decode(r#"[{"id":1,"title":"a"},{"id":1,"title":"b"},{"id":2}]"#)
            .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.entries()[0].title(), Some("a"));
    }

    #[test]
    fn decode_rejects_non_arrays() {
        assert!(BookmarkSet::decode("{\"id\":1}").is_err());
        assert!(BookmarkSet::decode("not json").is_err());
    }
}
