//! # Document Controller
//!
//! Core versioned-document abstraction for Scenarist editing.
//!
//! A `ScenarioDocument` owns the live buffer of one open script and keeps it
//! in step with a durable change log:
//! - **commit** records the difference between the buffer and the last
//!   recorded snapshot as a reversible change
//! - **apply_patch** replays one change by replacing only the blocks it
//!   touches, so everything outside that region keeps its identity
//! - **apply_patches** absorbs a batch of changes with one full reload
//! - **undo/redo** move changes between bounded stacks and log the move
//!   itself as a new forward change
//!
//! ## Lifecycle
//!
//! ```text
//!          edit                 commit
//!  Clean ────────→ Dirty ──────────────────→ Clean
//!    │                                         ↑
//!    └── apply_patch(es) ──→ Applying ─────────┘
//!                       (commit is a no-op)
//! ```

use crate::buffer::{ScriptBuffer, TextBuffer};
use crate::change_log::ChangeLog;
use crate::config::EditorConfig;
use crate::digest::ContentHash;
use crate::serializer::{CanonicalSerializer, ScriptSerializer};
use crate::store::ChangeRecord;
use crate::undo_stack::UndoStack;
use crate::EditorResult;
use scenarist_patch::{
    apply, clamp_position, diff_with_context, locate_changed_region, BrotliCodec, PatchBlob,
    PatchCodec,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// Notifications around patch application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    BeforePatchApply,
    AfterPatchApply,
}

/// Receives [`DocumentEvent`]s from a document
pub trait DocumentObserver {
    fn on_event(&mut self, event: DocumentEvent);
}

impl<F: FnMut(DocumentEvent)> DocumentObserver for F {
    fn on_event(&mut self, event: DocumentEvent) {
        self(event)
    }
}

/// Where the buffer stands relative to the last recorded snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Buffer matches the last recorded snapshot
    Clean,
    /// Buffer has edits that are not recorded yet
    Dirty,
    /// A patch is being applied; commits are ignored
    Applying,
}

/// Versioned script document
pub struct ScenarioDocument<S: CanonicalSerializer> {
    buffer: S::Buffer,
    serializer: S,
    change_log: ChangeLog,
    codec: Box<dyn PatchCodec>,
    config: EditorConfig,
    history: UndoStack,

    /// Canonical text as of the last recorded change
    last_snapshot: String,
    last_snapshot_hash: ContentHash,

    /// Set while a patch is being applied
    applying_patch: bool,

    observers: Vec<Box<dyn DocumentObserver>>,
}

/// A document over the built-in script buffer
pub type ScriptDocument = ScenarioDocument<ScriptSerializer>;

impl ScriptDocument {
    /// Script document holding one empty scene heading
    pub fn script(change_log: ChangeLog, config: EditorConfig) -> EditorResult<Self> {
        let mut document = Self::new(ScriptBuffer::new(), ScriptSerializer, change_log, config)?;
        document.load("")?;
        Ok(document)
    }
}

impl<S: CanonicalSerializer> ScenarioDocument<S> {
    /// Wrap a buffer; its current content becomes the recorded snapshot
    pub fn new(
        buffer: S::Buffer,
        serializer: S,
        change_log: ChangeLog,
        config: EditorConfig,
    ) -> EditorResult<Self> {
        let last_snapshot = serializer.to_canonical(&buffer, None)?;
        let last_snapshot_hash = ContentHash::of(&last_snapshot);

        Ok(Self {
            buffer,
            serializer,
            change_log,
            codec: Box::new(BrotliCodec::default()),
            history: UndoStack::with_max_levels(config.undo_capacity),
            config,
            last_snapshot,
            last_snapshot_hash,
            applying_patch: false,
            observers: Vec::new(),
        })
    }

    /// Replace the patch codec used for new and stored changes
    pub fn with_codec(mut self, codec: impl PatchCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn subscribe(&mut self, observer: impl DocumentObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Load a canonical text, replacing the buffer and resetting history.
    ///
    /// An empty text loads the serializer's empty document.
    #[instrument(skip(self, canonical), fields(len = canonical.len()))]
    pub fn load(&mut self, canonical: &str) -> EditorResult<()> {
        let text = if canonical.is_empty() {
            self.serializer.empty_document()
        } else {
            canonical.to_string()
        };

        let fragment = self.serializer.parse_fragment(&text)?;

        self.buffer.begin_edit_group();
        self.buffer.clear();
        self.serializer.insert_fragment(&mut self.buffer, 0, fragment);
        self.buffer.end_edit_group();

        self.refresh_snapshot()?;
        self.history.clear();

        info!(hash = %self.last_snapshot_hash, "Loaded document");
        Ok(())
    }

    /// Canonical fragment between two plain positions, in either order
    pub fn export_range(&self, start: usize, end: usize) -> EditorResult<String> {
        let (start, end) = if start > end { (end, start) } else { (start, end) };
        self.serializer.to_canonical(&self.buffer, Some(start..end))
    }

    /// Insert a canonical fragment at a plain position.
    ///
    /// Nothing is recorded; the next commit picks the insertion up.
    pub fn import_at(&mut self, position: usize, fragment: &str) -> EditorResult<()> {
        let fragment = self.serializer.parse_fragment(fragment)?;
        self.buffer.begin_edit_group();
        self.serializer.insert_fragment(&mut self.buffer, position, fragment);
        self.buffer.end_edit_group();
        Ok(())
    }

    /// Record the buffer's unrecorded edits as one change.
    ///
    /// Returns `None` when nothing changed or while a patch is being applied.
    #[instrument(skip(self))]
    pub fn commit(&mut self) -> EditorResult<Option<Arc<ChangeRecord>>> {
        if self.applying_patch {
            trace!("Commit ignored while applying patch");
            return Ok(None);
        }

        let new_text = self.serializer.to_canonical(&self.buffer, None)?;
        let new_hash = ContentHash::of(&new_text);
        if new_hash == self.last_snapshot_hash {
            return Ok(None);
        }

        let context = self.config.context_chars;
        let undo_patch = self
            .codec
            .encode(&diff_with_context(&new_text, &self.last_snapshot, context))?;
        let redo_patch = self
            .codec
            .encode(&diff_with_context(&self.last_snapshot, &new_text, context))?;

        let change = self
            .change_log
            .append(undo_patch, redo_patch, self.config.draft_by_default)?;

        self.last_snapshot = new_text;
        self.last_snapshot_hash = new_hash;
        self.history.push(Arc::clone(&change));

        info!(
            sequence = change.sequence,
            hash = %new_hash,
            undo_levels = self.history.undo_levels(),
            "Committed change"
        );
        Ok(Some(change))
    }

    /// Buffer change notification; commits when auto-commit is on
    pub fn contents_changed(&mut self) -> EditorResult<Option<Arc<ChangeRecord>>> {
        if self.config.auto_commit {
            self.commit()
        } else {
            Ok(None)
        }
    }

    /// Apply one compressed patch by replacing only the region it changes.
    ///
    /// A patch that cannot be decoded or placed leaves the buffer untouched.
    #[instrument(skip(self, patch), fields(bytes = patch.len()))]
    pub fn apply_patch(&mut self, patch: &PatchBlob) -> EditorResult<()> {
        self.begin_patch_apply();
        let result = self.apply_patch_region(patch);
        self.end_patch_apply();

        if let Err(err) = &result {
            warn!(error = %err, "Patch not applied");
        }
        result
    }

    /// Apply compressed patches in order, then reload the buffer once
    #[instrument(skip(self, patches), fields(count = patches.len()))]
    pub fn apply_patches(&mut self, patches: &[PatchBlob]) -> EditorResult<()> {
        self.begin_patch_apply();
        let result = self.apply_patches_reload(patches);
        self.end_patch_apply();

        if let Err(err) = &result {
            warn!(error = %err, "Patches not applied");
        }
        result
    }

    /// Revert the most recent change.
    ///
    /// Unrecorded edits are committed first. Returns the record logging the
    /// undo, or `None` when there is nothing to undo.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> EditorResult<Option<Arc<ChangeRecord>>> {
        self.commit()?;

        let Some(change) = self.history.peek_undo().cloned() else {
            debug!("Nothing to undo");
            return Ok(None);
        };

        self.apply_patch(&change.undo_patch)?;
        self.history.undo();

        let logged = self.change_log.append(
            change.redo_patch.clone(),
            change.undo_patch.clone(),
            change.is_draft,
        )?;

        info!(undone = change.sequence, logged = logged.sequence, "Undo");
        Ok(Some(logged))
    }

    /// Reapply the most recently undone change.
    ///
    /// Redo is deliberately more than a stack pop: unrecorded edits are
    /// committed first, which empties the redo stack, so a pending edit is
    /// never overwritten by a stale redo patch. Returns the record logging
    /// the redo, or `None` when there is nothing to redo.
    #[instrument(skip(self))]
    pub fn redo(&mut self) -> EditorResult<Option<Arc<ChangeRecord>>> {
        self.commit()?;

        let Some(change) = self.history.peek_redo().cloned() else {
            debug!("Nothing to redo");
            return Ok(None);
        };

        self.apply_patch(&change.redo_patch)?;
        self.history.redo();

        let logged = self.change_log.append(
            change.undo_patch.clone(),
            change.redo_patch.clone(),
            change.is_draft,
        )?;

        info!(redone = change.sequence, logged = logged.sequence, "Redo");
        Ok(Some(logged))
    }

    pub fn is_undo_available(&self) -> bool {
        self.history.can_undo()
    }

    pub fn is_redo_available(&self) -> bool {
        self.history.can_redo()
    }

    pub fn state(&self) -> EditorResult<DocumentState> {
        if self.applying_patch {
            return Ok(DocumentState::Applying);
        }

        let text = self.serializer.to_canonical(&self.buffer, None)?;
        if ContentHash::of(&text) == self.last_snapshot_hash {
            Ok(DocumentState::Clean)
        } else {
            Ok(DocumentState::Dirty)
        }
    }

    /// Current canonical text of the buffer
    pub fn canonical(&self) -> EditorResult<String> {
        self.serializer.to_canonical(&self.buffer, None)
    }

    pub fn buffer(&self) -> &S::Buffer {
        &self.buffer
    }

    /// Mutable buffer access for user edits; call [`Self::commit`] or
    /// [`Self::contents_changed`] afterwards
    pub fn buffer_mut(&mut self) -> &mut S::Buffer {
        &mut self.buffer
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    pub fn last_snapshot(&self) -> &str {
        &self.last_snapshot
    }

    pub fn last_snapshot_hash(&self) -> ContentHash {
        self.last_snapshot_hash
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    pub fn change_log_mut(&mut self) -> &mut ChangeLog {
        &mut self.change_log
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn codec(&self) -> &dyn PatchCodec {
        self.codec.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn apply_patch_region(&mut self, blob: &PatchBlob) -> EditorResult<()> {
        let patch = self.codec.decode(blob)?;
        let current = self.serializer.to_canonical(&self.buffer, None)?;
        let region = locate_changed_region(&current, &patch, &self.serializer)?;

        if region.is_empty() {
            debug!("Patch changes no blocks");
            return self.refresh_snapshot();
        }

        // Resolve the replacement before anything is removed.
        let fragment = self.serializer.parse_fragment(&region.replacement)?;

        let len = self.buffer.character_count();
        let start = clamp_position(to_i64(region.plain_position), len);
        let end = clamp_position(to_i64(region.plain_position + region.plain_length), len);

        self.buffer.begin_edit_group();
        self.buffer.remove_range(start..end);
        self.serializer.insert_fragment(&mut self.buffer, start, fragment);
        self.buffer.end_edit_group();
        self.contents_changed()?;

        debug!(start, end, "Replaced changed region");
        self.refresh_snapshot()
    }

    fn apply_patches_reload(&mut self, blobs: &[PatchBlob]) -> EditorResult<()> {
        if blobs.is_empty() {
            return Ok(());
        }

        let mut text = self.serializer.to_canonical(&self.buffer, None)?;
        for blob in blobs {
            let patch = self.codec.decode(blob)?;
            text = apply(&text, &patch)?;
        }

        let fragment = self.serializer.parse_fragment(&text)?;

        self.buffer.begin_edit_group();
        self.buffer.clear();
        self.serializer.insert_fragment(&mut self.buffer, 0, fragment);
        self.buffer.end_edit_group();
        self.contents_changed()?;

        debug!(patches = blobs.len(), "Reloaded document from patched text");
        self.refresh_snapshot()
    }

    fn begin_patch_apply(&mut self) {
        self.notify(DocumentEvent::BeforePatchApply);
        self.applying_patch = true;
    }

    fn end_patch_apply(&mut self) {
        self.applying_patch = false;
        self.notify(DocumentEvent::AfterPatchApply);
    }

    fn notify(&mut self, event: DocumentEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }

    fn refresh_snapshot(&mut self) -> EditorResult<()> {
        self.last_snapshot = self.serializer.to_canonical(&self.buffer, None)?;
        self.last_snapshot_hash = ContentHash::of(&self.last_snapshot);
        Ok(())
    }
}

impl<S: CanonicalSerializer> std::fmt::Debug for ScenarioDocument<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioDocument")
            .field("last_snapshot_hash", &self.last_snapshot_hash)
            .field("undo_levels", &self.history.undo_levels())
            .field("redo_levels", &self.history.redo_levels())
            .field("applying_patch", &self.applying_patch)
            .finish_non_exhaustive()
    }
}

fn to_i64(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Block, BlockKind};
    use scenarist_patch::diff;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn document() -> ScriptDocument {
        ScriptDocument::script(ChangeLog::in_memory(), EditorConfig::default()).unwrap()
    }

    fn three_blocks() -> String {
        let buffer = ScriptBuffer::from_blocks(vec![
            Block::new(BlockKind::SceneHeading, "INT. HOUSE - DAY"),
            Block::new(BlockKind::Action, "John enters."),
            Block::new(BlockKind::Character, "JOHN"),
        ]);
        ScriptSerializer.to_canonical(&buffer, None).unwrap()
    }

    #[test]
    fn test_load_is_clean() {
        let mut doc = document();
        doc.load(&three_blocks()).unwrap();

        assert_eq!(doc.state().unwrap(), DocumentState::Clean);
        assert_eq!(doc.last_snapshot(), three_blocks());
        assert!(doc.commit().unwrap().is_none());
        assert!(doc.change_log().is_empty());
    }

    #[test]
    fn test_empty_load_uses_default_document() {
        let mut doc = document();
        doc.load("").unwrap();
        assert_eq!(doc.last_snapshot(), ScriptSerializer.empty_document());
        assert_eq!(doc.buffer().blocks(), &[Block::default()]);
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut doc = document();
        doc.buffer_mut().insert_text(0, "INT. HOUSE");
        assert_eq!(doc.state().unwrap(), DocumentState::Dirty);

        assert!(doc.commit().unwrap().is_some());
        assert!(doc.commit().unwrap().is_none());
        assert_eq!(doc.change_log().len(), 1);
        assert_eq!(doc.state().unwrap(), DocumentState::Clean);
    }

    #[test]
    fn test_committed_patches_reverse_each_other() {
        let mut doc = document();
        let before = doc.last_snapshot().to_string();
        doc.buffer_mut().insert_text(0, "INT. HOUSE");
        let change = doc.commit().unwrap().unwrap();
        let after = doc.last_snapshot().to_string();

        let codec = BrotliCodec::default();
        let redo = codec.decode(&change.redo_patch).unwrap();
        let undo = codec.decode(&change.undo_patch).unwrap();
        assert_eq!(apply(&before, &redo).unwrap(), after);
        assert_eq!(apply(&after, &undo).unwrap(), before);
    }

    #[test]
    fn test_apply_patch_replaces_only_changed_block() {
        let mut doc = document();
        doc.load(&three_blocks()).unwrap();

        let current = doc.canonical().unwrap();
        let target = current.replace("John enters.", "John enters, soaked.");
        let patch = doc.codec().encode(&diff(&current, &target)).unwrap();

        let revision = doc.buffer().revision();
        doc.apply_patch(&patch).unwrap();

        assert_eq!(doc.canonical().unwrap(), target);
        assert_eq!(doc.last_snapshot(), target);
        assert_eq!(doc.buffer().revision(), revision + 1);
        assert_eq!(doc.buffer().blocks()[1].kind, BlockKind::Action);
        assert!(doc.change_log().is_empty());
    }

    #[test]
    fn test_apply_patch_inserting_block() {
        let mut doc = document();
        doc.load(&three_blocks()).unwrap();

        let current = doc.canonical().unwrap();
        let mut blocks = doc.buffer().blocks().to_vec();
        blocks.push(Block::new(BlockKind::Dialogue, "Anyone home?"));
        let target = ScriptSerializer
            .to_canonical(&ScriptBuffer::from_blocks(blocks), None)
            .unwrap();

        let patch = doc.codec().encode(&diff(&current, &target)).unwrap();
        doc.apply_patch(&patch).unwrap();
        assert_eq!(doc.canonical().unwrap(), target);
    }

    #[test]
    fn test_events_and_guard_around_patch() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let config = EditorConfig {
            auto_commit: true,
            ..EditorConfig::default()
        };
        let mut doc = ScriptDocument::script(ChangeLog::in_memory(), config).unwrap();
        doc.subscribe(move |event: DocumentEvent| sink.borrow_mut().push(event));

        doc.buffer_mut().insert_text(0, "INT. HOUSE");
        assert!(doc.contents_changed().unwrap().is_some());
        let logged = doc.change_log().len();

        let current = doc.canonical().unwrap();
        let target = current.replace("HOUSE", "BARN");
        let patch = doc.codec().encode(&diff(&current, &target)).unwrap();
        doc.apply_patch(&patch).unwrap();

        assert_eq!(doc.change_log().len(), logged);
        assert_eq!(
            *events.borrow(),
            vec![DocumentEvent::BeforePatchApply, DocumentEvent::AfterPatchApply]
        );
        assert_eq!(doc.state().unwrap(), DocumentState::Clean);
    }

    #[test]
    fn test_corrupt_patch_leaves_buffer_untouched() {
        let mut doc = document();
        doc.load(&three_blocks()).unwrap();
        let hash = doc.last_snapshot_hash();

        let err = doc
            .apply_patch(&PatchBlob::new(vec![1, 2, 3, 4]))
            .unwrap_err();
        assert!(err.is_corrupt_patch());
        assert_eq!(doc.canonical().unwrap(), three_blocks());
        assert_eq!(doc.last_snapshot_hash(), hash);
        assert_eq!(doc.state().unwrap(), DocumentState::Clean);
    }

    #[test]
    fn test_export_range_normalizes_order() {
        let mut doc = document();
        doc.load(&three_blocks()).unwrap();
        assert_eq!(
            doc.export_range(20, 5).unwrap(),
            doc.export_range(5, 20).unwrap()
        );
    }

    #[test]
    fn test_import_at_is_not_recorded() {
        let mut doc = document();
        let fragment = doc.export_range(0, 0).unwrap();
        doc.import_at(0, &fragment).unwrap();
        assert!(doc.change_log().is_empty());

        let copied = {
            let mut source = document();
            source.load(&three_blocks()).unwrap();
            source.export_range(0, 16).unwrap()
        };
        doc.import_at(0, &copied).unwrap();
        assert!(doc.change_log().is_empty());
        assert_eq!(doc.buffer().plain_text(), "INT. HOUSE - DAY");
        assert!(doc.commit().unwrap().is_some());
    }
}
