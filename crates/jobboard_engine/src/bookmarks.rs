use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use board_logging::{board_debug, board_info, board_warn};
use jobboard_core::{BookmarkSet, JobId, JobPosting, Toggle};
use tokio::sync::{mpsc, oneshot, watch, OnceCell};
use tokio::task::JoinHandle;

use crate::KeyValueStore;

/// Storage key holding the JSON array of bookmarked postings.
pub const BOOKMARKS_KEY: &str = "@bookmarked_jobs";

enum WriterCommand {
    Persist(String),
    /// Re-read storage and merge toggles made while it was unreadable.
    Resync,
    Flush(oneshot::Sender<()>),
}

#[derive(Default)]
struct Inner {
    set: BookmarkSet,
    loaded: bool,
    /// Toggles issued before the persisted set arrived, replayed in order.
    deferred: Vec<JobPosting>,
    /// Set when reading storage failed. Holds the toggles made since, which
    /// are replayed onto the stored set once it can be read again. Nothing is
    /// written while this is set, so an unread set never overwrites storage.
    unsynced: Option<Vec<JobPosting>>,
}

/// State shared between the store handle and its writer task.
struct Shared {
    inner: Mutex<Inner>,
    snapshots: watch::Sender<BookmarkSet>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, set: &BookmarkSet) {
        self.snapshots.send_replace(set.clone());
    }
}

/// Bookmarked postings, persisted write-through to a [`KeyValueStore`].
///
/// Reads and toggles never wait on storage. Every mutation enqueues the whole
/// encoded set to a single writer task, so writes land in mutation order.
/// Write failures are logged and otherwise ignored; memory stays authoritative.
/// If the initial read fails, toggles still apply in memory but writes wait
/// until storage can be read and merged, so stored bookmarks are never lost.
pub struct BookmarkStore {
    kv: Arc<dyn KeyValueStore>,
    shared: Arc<Shared>,
    load_once: OnceCell<()>,
    writer_tx: Mutex<Option<mpsc::UnboundedSender<WriterCommand>>>,
    writer_task: Mutex<Option<JoinHandle<()>>>,
}

impl BookmarkStore {
    /// Creates an unloaded store and starts its writer on the current tokio
    /// runtime. Call [`init`](Self::init) (or use [`open`](Self::open)) to
    /// load persisted bookmarks.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let (snapshots, _) = watch::channel(BookmarkSet::new());
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner::default()),
            snapshots,
        });
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(run_writer(
            Arc::clone(&kv),
            Arc::clone(&shared),
            writer_rx,
        ));
        Self {
            kv,
            shared,
            load_once: OnceCell::new(),
            writer_tx: Mutex::new(Some(writer_tx)),
            writer_task: Mutex::new(Some(writer_task)),
        }
    }

    /// Creates a store and loads it in the background. Until the load
    /// finishes every id reads as not bookmarked.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Arc<Self> {
        let store = Arc::new(Self::new(kv));
        let background = Arc::clone(&store);
        tokio::spawn(async move { background.init().await });
        store
    }

    /// Loads the persisted set once; later calls return immediately.
    pub async fn init(&self) {
        self.load_once.get_or_init(|| self.load()).await;
    }

    pub fn is_loaded(&self) -> bool {
        self.shared.lock().loaded
    }

    pub fn is_bookmarked(&self, id: &JobId) -> bool {
        let inner = self.shared.lock();
        inner.loaded && inner.set.contains(id)
    }

    /// Flips the bookmark for `job` and schedules a write of the whole set.
    pub fn toggle_bookmark(&self, job: &JobPosting) -> Toggle {
        let mut inner = self.shared.lock();
        if !inner.loaded {
            board_debug!("Deferring bookmark toggle for {} until load completes", job.id);
            inner.deferred.push(job.clone());
            return Toggle::Deferred;
        }
        let toggle = self.apply(&mut inner, job);
        self.shared.publish(&inner.set);
        toggle
    }

    pub fn bookmarks(&self) -> Vec<JobPosting> {
        self.shared.lock().set.entries().to_vec()
    }

    pub fn subscribe(&self) -> watch::Receiver<BookmarkSet> {
        self.shared.snapshots.subscribe()
    }

    /// Resolves once every write scheduled before this call has been attempted.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.send(WriterCommand::Flush(ack_tx)) {
            let _ = ack_rx.await;
        }
    }

    /// Stops accepting writes and waits for the queued ones to finish.
    pub async fn shutdown(&self) {
        drop(self.writer_tx.lock().unwrap_or_else(PoisonError::into_inner).take());
        let task = self
            .writer_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                board_warn!("Bookmark writer ended abnormally: {}", err);
            }
        }
    }

    async fn load(&self) {
        let (loaded, readable) = match self.kv.get(BOOKMARKS_KEY).await {
            Ok(stored) => (decode_stored(stored), true),
            Err(err) => {
                board_warn!("Failed to read bookmarks, holding writes until storage recovers: {}", err);
                (BookmarkSet::new(), false)
            }
        };

        let mut inner = self.shared.lock();
        inner.set = loaded;
        inner.loaded = true;
        if !readable {
            inner.unsynced = Some(Vec::new());
        }
        let deferred = mem::take(&mut inner.deferred);
        for job in &deferred {
            self.apply(&mut inner, job);
        }
        self.shared.publish(&inner.set);
        board_info!(
            "Loaded {} bookmarks ({} deferred toggles replayed)",
            inner.set.len(),
            deferred.len()
        );
    }

    /// Toggles `job` in memory and schedules the matching storage work.
    fn apply(&self, inner: &mut Inner, job: &JobPosting) -> Toggle {
        let toggle = inner.set.toggle(job);
        board_debug!("Bookmark {:?} for job {}", toggle, job.id);
        match inner.unsynced.as_mut() {
            Some(pending) => {
                pending.push(job.clone());
                self.send(WriterCommand::Resync);
            }
            None => self.persist(&inner.set),
        }
        toggle
    }

    fn persist(&self, set: &BookmarkSet) {
        match set.encode() {
            Ok(encoded) => {
                self.send(WriterCommand::Persist(encoded));
            }
            Err(err) => board_warn!("Failed to encode bookmarks: {}", err),
        }
    }

    fn send(&self, command: WriterCommand) -> bool {
        let writer = self.writer_tx.lock().unwrap_or_else(PoisonError::into_inner);
        let sent = writer
            .as_ref()
            .is_some_and(|tx| tx.send(command).is_ok());
        if !sent {
            board_warn!("Bookmark writer is closed; change kept in memory only");
        }
        sent
    }
}

/// Absent or unparsable payloads read as an empty set.
fn decode_stored(stored: Option<String>) -> BookmarkSet {
    match stored {
        Some(raw) => BookmarkSet::decode(&raw).unwrap_or_else(|err| {
            board_warn!("Discarding unreadable bookmarks: {}", err);
            BookmarkSet::new()
        }),
        None => BookmarkSet::new(),
    }
}

async fn run_writer(
    kv: Arc<dyn KeyValueStore>,
    shared: Arc<Shared>,
    mut rx: mpsc::UnboundedReceiver<WriterCommand>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            WriterCommand::Persist(value) => write(kv.as_ref(), &value).await,
            WriterCommand::Resync => resync(kv.as_ref(), &shared).await,
            WriterCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    board_debug!("Bookmark writer stopped");
}

async fn write(kv: &dyn KeyValueStore, value: &str) {
    if let Err(err) = kv.set(BOOKMARKS_KEY, value).await {
        board_warn!("Failed to persist bookmarks: {}", err);
    }
}

async fn resync(kv: &dyn KeyValueStore, shared: &Shared) {
    if shared.lock().unsynced.is_none() {
        return;
    }
    let stored = match kv.get(BOOKMARKS_KEY).await {
        Ok(stored) => decode_stored(stored),
        Err(err) => {
            board_warn!("Bookmarks still unreadable, change kept in memory only: {}", err);
            return;
        }
    };

    let encoded = {
        let mut inner = shared.lock();
        let Some(pending) = inner.unsynced.take() else {
            return;
        };
        let mut merged = stored;
        for job in &pending {
            merged.toggle(job);
        }
        inner.set = merged;
        shared.publish(&inner.set);
        board_info!(
            "Recovered {} bookmarks from storage ({} toggles merged)",
            inner.set.len(),
            pending.len()
        );
        inner.set.encode()
    };
    match encoded {
        Ok(value) => write(kv, &value).await,
        Err(err) => board_warn!("Failed to encode bookmarks: {}", err),
    }
}
