//! Job board engine: IO adapters and the async feed/bookmark components.
mod bookmarks;
mod feed;
mod fetch;
mod kv;
mod persist;
mod types;

pub use bookmarks::{BookmarkStore, BOOKMARKS_KEY};
pub use feed::PaginatedFeedController;
pub use fetch::{FetchSettings, PageFetcher, ReqwestPageFetcher};
pub use kv::{KeyValueStore, MemoryKeyValueStore};
pub use persist::{ensure_store_dir, AtomicFileWriter, PersistError};
pub use types::{FailureKind, FetchError};
