//! # Change Store
//!
//! Durable, append-only storage for change records.
//!
//! - **Memory-backed**: for tests and documents that are never saved
//! - **File-backed**: JSON lines, one record per line, flushed on every append
//!
//! Records are handed out as `Arc<ChangeRecord>` handles; the store keeps
//! every record for its lifetime and never rewrites one.

use crate::errors::StoreError;
use chrono::{DateTime, Utc};
use scenarist_patch::PatchBlob;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// An immutable, reversible change to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: Uuid,

    /// Position in the log, starting at zero
    pub sequence: u64,

    pub datetime: DateTime<Utc>,

    pub author: String,

    /// Compressed patch taking the new text back to the previous one
    pub undo_patch: PatchBlob,

    /// Compressed patch taking the previous text to the new one
    pub redo_patch: PatchBlob,

    pub is_draft: bool,
}

/// Contents of a record about to be appended
#[derive(Debug, Clone)]
pub struct NewChange {
    pub author: String,
    pub undo_patch: PatchBlob,
    pub redo_patch: PatchBlob,
    pub is_draft: bool,
}

impl NewChange {
    fn into_record(self, sequence: u64) -> ChangeRecord {
        ChangeRecord {
            id: Uuid::new_v4(),
            sequence,
            datetime: Utc::now(),
            author: self.author,
            undo_patch: self.undo_patch,
            redo_patch: self.redo_patch,
            is_draft: self.is_draft,
        }
    }
}

pub trait ChangeStore: Send {
    /// Persist a new record and return its handle
    fn append(&mut self, change: NewChange) -> Result<Arc<ChangeRecord>, StoreError>;

    /// All records in append order
    fn records(&self) -> &[Arc<ChangeRecord>];

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryChangeStore {
    records: Vec<Arc<ChangeRecord>>,
}

impl InMemoryChangeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChangeStore for InMemoryChangeStore {
    fn append(&mut self, change: NewChange) -> Result<Arc<ChangeRecord>, StoreError> {
        let record = Arc::new(change.into_record(self.records.len() as u64));
        self.records.push(Arc::clone(&record));
        Ok(record)
    }

    fn records(&self) -> &[Arc<ChangeRecord>] {
        &self.records
    }
}

/// JSON-lines file store
#[derive(Debug)]
pub struct FileChangeStore {
    path: PathBuf,
    file: File,
    records: Vec<Arc<ChangeRecord>>,
}

impl FileChangeStore {
    /// Open a store file, loading any records it already holds
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            Self::read_records(&path)?
        } else {
            Vec::new()
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(path = %path.display(), records = records.len(), "Opened change store");

        Ok(Self {
            path,
            file,
            records,
        })
    }

    /// Read every record of a store file without opening it for writing
    pub fn read_records(path: &Path) -> Result<Vec<Arc<ChangeRecord>>, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record: ChangeRecord = serde_json::from_str(&line).map_err(|source| {
                StoreError::Corrupt {
                    line: index + 1,
                    source,
                }
            })?;
            records.push(Arc::new(record));
        }

        Ok(records)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChangeStore for FileChangeStore {
    fn append(&mut self, change: NewChange) -> Result<Arc<ChangeRecord>, StoreError> {
        let sequence = self
            .records
            .last()
            .map_or(0, |record| record.sequence + 1);
        let record = change.into_record(sequence);

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        append_line(&mut self.file, line.as_bytes())?;
        self.file.sync_data()?;

        let record = Arc::new(record);
        self.records.push(Arc::clone(&record));
        Ok(record)
    }

    fn records(&self) -> &[Arc<ChangeRecord>] {
        &self.records
    }
}

/// Append-only file a store writes whole lines to
trait LineSink: Write {
    fn end(&self) -> io::Result<u64>;

    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LineSink for File {
    fn end(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write one complete line, or nothing: a failed write is cut back off so
/// the file never ends in a partial record.
fn append_line<S: LineSink>(sink: &mut S, line: &[u8]) -> io::Result<()> {
    let end = sink.end()?;
    let written = sink.write_all(line).and_then(|()| sink.flush());

    if let Err(err) = written {
        if let Err(truncate_err) = sink.truncate(end) {
            warn!(error = %truncate_err, "Failed to roll back partial change record");
        }
        return Err(err);
    }
    Ok(())
}
