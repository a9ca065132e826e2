use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use board_logging::{board_debug, board_warn};
use jobboard_engine::{AtomicFileWriter, KeyValueStore, PersistError};
use serde::{Deserialize, Serialize};

const STORE_FILENAME: &str = ".jobboard_store.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedStore {
    entries: BTreeMap<String, String>,
}

/// Key-value store backed by a single RON document in `dir`.
///
/// File IO runs on tokio's blocking pool so callers on the runtime never
/// stall on disk.
pub(crate) struct FileKeyValueStore {
    document: Arc<DocumentFile>,
}

struct DocumentFile {
    writer: AtomicFileWriter,
    /// Serializes read-modify-write cycles on the document.
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self {
            document: Arc::new(DocumentFile {
                writer: AtomicFileWriter::new(dir),
                write_lock: Mutex::new(()),
            }),
        }
    }

    async fn run_blocking<T, F>(&self, job: F) -> Result<T, PersistError>
    where
        T: Send + 'static,
        F: FnOnce(&DocumentFile) -> Result<T, PersistError> + Send + 'static,
    {
        let document = Arc::clone(&self.document);
        tokio::task::spawn_blocking(move || job(&document))
            .await
            .map_err(|err| PersistError::Backend(format!("storage task failed: {err}")))?
    }
}

impl DocumentFile {
    fn path(&self) -> PathBuf {
        self.writer.dir().join(STORE_FILENAME)
    }

    fn read(path: &Path) -> Result<PersistedStore, PersistError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedStore::default());
            }
            Err(err) => return Err(PersistError::Io(err)),
        };
        ron::from_str(&content).map_err(|err| PersistError::Encode(err.to_string()))
    }

    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let document = Self::read(&self.path())?;
        Ok(document.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let path = self.path();
        let mut document = Self::read(&path).unwrap_or_else(|err| {
            board_warn!("Replacing unreadable store at {:?}: {}", path, err);
            PersistedStore::default()
        });
        document.entries.insert(key.to_owned(), value.to_owned());

        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&document, pretty)
            .map_err(|err| PersistError::Encode(err.to_string()))?;
        let target = self.writer.write(STORE_FILENAME, &content)?;
        board_debug!("Wrote {} ({} bytes) to {:?}", key, value.len(), target);
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let key = key.to_owned();
        self.run_blocking(move |document| document.get(&key)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let key = key.to_owned();
        let value = value.to_owned();
        self.run_blocking(move |document| document.set(&key, &value))
            .await
    }
}
