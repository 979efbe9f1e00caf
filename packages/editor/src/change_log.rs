//! # Change Log
//!
//! The append-only history of a document.
//!
//! Every committed edit appends one record. Undo and redo never remove or
//! edit records; they append a new record whose patches are the swapped
//! patches of the record being undone or redone. The log therefore always
//! reads as a forward sequence, and replaying every redo patch in order
//! reproduces the document.

use crate::settings::{InMemorySettings, SettingsScope, SettingsStore, USER_NAME_KEY};
use crate::store::{ChangeRecord, ChangeStore, InMemoryChangeStore, NewChange};
use crate::EditorResult;
use scenarist_patch::{apply, PatchBlob, PatchCodec};
use std::sync::Arc;
use tracing::debug;

/// Author recorded when no user name is configured
pub const UNKNOWN_AUTHOR: &str = "unknown";

pub struct ChangeLog {
    store: Box<dyn ChangeStore>,
    settings: Box<dyn SettingsStore>,
}

impl std::fmt::Debug for ChangeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeLog")
            .field("records", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl ChangeLog {
    pub fn new(store: impl ChangeStore + 'static, settings: impl SettingsStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            settings: Box::new(settings),
        }
    }

    /// Memory-backed log with no configured user
    pub fn in_memory() -> Self {
        Self::new(InMemoryChangeStore::new(), InMemorySettings::new())
    }

    /// Current identity recorded as the author of new records
    pub fn author(&self) -> String {
        self.settings
            .value(USER_NAME_KEY, SettingsScope::Application)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        self.settings.as_mut()
    }

    /// Append a record authored by the current identity
    pub fn append(
        &mut self,
        undo_patch: PatchBlob,
        redo_patch: PatchBlob,
        is_draft: bool,
    ) -> EditorResult<Arc<ChangeRecord>> {
        let record = self.store.append(NewChange {
            author: self.author(),
            undo_patch,
            redo_patch,
            is_draft,
        })?;

        debug!(
            sequence = record.sequence,
            author = %record.author,
            is_draft,
            "Appended change record"
        );
        Ok(record)
    }

    pub fn records(&self) -> &[Arc<ChangeRecord>] {
        self.store.records()
    }

    pub fn last(&self) -> Option<&Arc<ChangeRecord>> {
        self.store.records().last()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Rebuild a canonical text by applying every redo patch, in order, to `base`
    pub fn replay(&self, base: &str, codec: &dyn PatchCodec) -> EditorResult<String> {
        replay_records(self.records(), base, codec)
    }
}

/// Apply the redo patches of `records`, in order, to `base`
pub fn replay_records(
    records: &[Arc<ChangeRecord>],
    base: &str,
    codec: &dyn PatchCodec,
) -> EditorResult<String> {
    let mut text = base.to_string();
    for record in records {
        let patch = codec.decode(&record.redo_patch)?;
        text = apply(&text, &patch)?;
    }
    Ok(text)
}
