//! File-backed document collection.
//!
//! The whole collection lives in memory and is rewritten to a single JSON
//! array after every mutation. Writes go to a temporary file in the same
//! directory which is then renamed over the target, so readers never see a
//! half-written collection.

use super::RecordStore;
use super::memory::InMemoryMirrorStore;
use crate::core::{MirrorEmployee, MirrorId, StoreError, StoreResult, WriteMode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// On-disk document layout: `{ "_id": .., "name": .., "role": .. }`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    #[serde(rename = "_id")]
    id: MirrorId,
    name: String,
    role: String,
}

impl From<StoredDocument> for MirrorEmployee {
    fn from(doc: StoredDocument) -> Self {
        MirrorEmployee::with_id(doc.id, doc.name, doc.role)
    }
}

pub struct JsonFileMirrorStore {
    path: PathBuf,
    documents: InMemoryMirrorStore,
    /// Serializes mutate-then-flush so the file always reflects the latest write.
    flush_gate: Mutex<()>,
}

impl JsonFileMirrorStore {
    /// Opens the collection at `path`, loading existing documents if the file exists.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let documents = if path.exists() {
            let raw = fs::read(&path)?;
            let stored: Vec<StoredDocument> = if raw.iter().all(u8::is_ascii_whitespace) {
                Vec::new()
            } else {
                serde_json::from_slice(&raw)?
            };
            InMemoryMirrorStore::with_records(stored.into_iter().map(MirrorEmployee::from))
        } else {
            InMemoryMirrorStore::new()
        };

        Ok(Self {
            path,
            documents,
            flush_gate: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self) -> StoreResult<()> {
        let stored: Vec<StoredDocument> = self
            .documents
            .find_all()
            .await?
            .into_iter()
            .filter_map(|doc| {
                let MirrorEmployee { id, name, role } = doc;
                id.map(|id| StoredDocument { id, name, role })
            })
            .collect();
        let bytes = serde_json::to_vec_pretty(&stored)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| StoreError::Backend(format!("flush task failed: {e}")))?
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

#[async_trait]
impl RecordStore for JsonFileMirrorStore {
    type Id = MirrorId;
    type Record = MirrorEmployee;

    async fn init(&self) -> StoreResult<()> {
        let _gate = self.flush_gate.lock().await;
        if !self.path.exists() {
            self.flush().await?;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &MirrorId) -> StoreResult<Option<MirrorEmployee>> {
        self.documents.find_by_id(id).await
    }

    async fn find_all(&self) -> StoreResult<Vec<MirrorEmployee>> {
        self.documents.find_all().await
    }

    async fn write(&self, record: MirrorEmployee, mode: WriteMode) -> StoreResult<MirrorEmployee> {
        let _gate = self.flush_gate.lock().await;
        let before = self.documents.find_all().await?;
        let stored = self.documents.write(record, mode).await?;
        if let Err(err) = self.flush().await {
            self.documents.restore(before).await;
            return Err(err);
        }
        Ok(stored)
    }

    async fn delete_by_id(&self, id: &MirrorId) -> StoreResult<bool> {
        let _gate = self.flush_gate.lock().await;
        let before = self.documents.find_all().await?;
        let deleted = self.documents.delete_by_id(id).await?;
        if deleted && let Err(err) = self.flush().await {
            self.documents.restore(before).await;
            return Err(err);
        }
        Ok(deleted)
    }

    async fn count(&self) -> StoreResult<usize> {
        self.documents.count().await
    }

    fn backend(&self) -> &'static str {
        "json_file"
    }
}
