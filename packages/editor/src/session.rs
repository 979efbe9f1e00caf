//! # Sync Session
//!
//! Tracks the exchange of changes between one open document and its peers.
//!
//! A `SyncSession` holds the remote patches waiting to be absorbed into the
//! local document and the locally committed changes that no peer has
//! acknowledged yet.

use crate::document::ScenarioDocument;
use crate::serializer::CanonicalSerializer;
use crate::store::ChangeRecord;
use crate::EditorResult;
use chrono::{DateTime, Utc};
use scenarist_patch::PatchBlob;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Sync state for one document
#[derive(Debug)]
pub struct SyncSession {
    /// Unique session identifier
    pub id: String,

    /// Remote redo patches waiting to be absorbed, oldest first
    incoming: Vec<PatchBlob>,

    /// Local changes waiting for acknowledgment
    outgoing: Vec<PendingChange>,
}

/// Local change waiting for acknowledgment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub id: Uuid,
    pub sequence: u64,

    /// When the change was recorded
    pub timestamp: DateTime<Utc>,
}

impl SyncSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Queue a remote patch
    pub fn receive(&mut self, patch: PatchBlob) {
        self.incoming.push(patch);
    }

    pub fn incoming_count(&self) -> usize {
        self.incoming.len()
    }

    /// Remember a local change until a peer confirms it
    pub fn track(&mut self, record: &ChangeRecord) {
        self.outgoing.push(PendingChange {
            id: record.id,
            sequence: record.sequence,
            timestamp: record.datetime,
        });
    }

    /// Confirm that a peer accepted a change.
    ///
    /// Returns false if the change was not pending.
    pub fn confirm(&mut self, id: Uuid) -> bool {
        let before = self.outgoing.len();
        self.outgoing.retain(|change| change.id != id);
        self.outgoing.len() != before
    }

    pub fn pending(&self) -> &[PendingChange] {
        &self.outgoing
    }

    pub fn pending_count(&self) -> usize {
        self.outgoing.len()
    }

    /// Absorb every queued patch into `document`.
    ///
    /// Local edits are committed first so the remote changes land on a
    /// recorded snapshot. A single patch replaces only the region it touches;
    /// a batch reloads the document once. The queue is kept if absorbing
    /// fails. Returns the number of patches absorbed.
    #[instrument(skip(self, document), fields(session = %self.id))]
    pub fn flush<S: CanonicalSerializer>(
        &mut self,
        document: &mut ScenarioDocument<S>,
    ) -> EditorResult<usize> {
        if let Some(record) = document.commit()? {
            self.track(&record);
        }

        match self.incoming.as_slice() {
            [] => return Ok(0),
            [patch] => document.apply_patch(patch)?,
            patches => document.apply_patches(patches)?,
        }

        let absorbed = self.incoming.len();
        self.incoming.clear();

        debug!(absorbed, pending = self.outgoing.len(), "Flushed incoming patches");
        Ok(absorbed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_log::ChangeLog;
    use crate::config::EditorConfig;
    use crate::document::ScriptDocument;
    use scenarist_patch::diff;

    fn document() -> ScriptDocument {
        ScriptDocument::script(ChangeLog::in_memory(), EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_session_creation() {
        let session = SyncSession::new("client-1");
        assert_eq!(session.id, "client-1");
        assert_eq!(session.incoming_count(), 0);
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn test_confirm_change() {
        let mut doc = document();
        let mut session = SyncSession::new("client-1");

        doc.buffer_mut().insert_text(0, "INT. HOUSE");
        let record = doc.commit().unwrap().unwrap();
        session.track(&record);
        assert_eq!(session.pending_count(), 1);
        assert_eq!(session.pending()[0].sequence, record.sequence);

        assert!(session.confirm(record.id));
        assert!(!session.confirm(record.id));
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn test_flush_single_and_batch() {
        let mut doc = document();
        let mut session = SyncSession::new("client-1");

        let v0 = doc.canonical().unwrap();
        let v1 = v0.replace("\"text\":\"\"", "\"text\":\"INT. HOUSE\"");
        let v2 = v1.replace("HOUSE", "BARN");
        let v3 = v2.replace("INT.", "EXT.");

        session.receive(doc.codec().encode(&diff(&v0, &v1)).unwrap());
        assert_eq!(session.flush(&mut doc).unwrap(), 1);
        assert_eq!(doc.canonical().unwrap(), v1);

        session.receive(doc.codec().encode(&diff(&v1, &v2)).unwrap());
        session.receive(doc.codec().encode(&diff(&v2, &v3)).unwrap());
        assert_eq!(session.flush(&mut doc).unwrap(), 2);
        assert_eq!(doc.canonical().unwrap(), v3);
        assert_eq!(doc.last_snapshot(), v3);

        assert_eq!(session.incoming_count(), 0);
        assert!(doc.change_log().is_empty());
    }

    #[test]
    fn test_flush_commits_local_edits_first() {
        let mut doc = document();
        let mut session = SyncSession::new("client-1");

        doc.buffer_mut().insert_text(0, "INT. HOUSE");
        assert_eq!(session.flush(&mut doc).unwrap(), 0);
        assert_eq!(session.pending_count(), 1);
        assert_eq!(doc.change_log().len(), 1);
    }

    #[test]
    fn test_failed_flush_keeps_queue() {
        let mut doc = document();
        let mut session = SyncSession::new("client-1");

        session.receive(PatchBlob::new(vec![0xff; 8]));
        assert!(session.flush(&mut doc).is_err());
        assert_eq!(session.incoming_count(), 1);
    }
}
