//! # Scenarist Editor
//!
//! Versioned document engine for Scenarist scripts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ buffer: live script (typed blocks)          │
//! └─────────────────────────────────────────────┘
//!          ↑ to_canonical / from_canonical
//! ┌─────────────────────────────────────────────┐
//! │ document: ScenarioDocument                  │
//! │  - commit edits as reversible changes       │
//! │  - apply patches by minimal region          │
//! │  - bounded undo/redo                        │
//! └─────────────────────────────────────────────┘
//!          ↓ append
//! ┌─────────────────────────────────────────────┐
//! │ change_log: append-only ChangeRecords       │
//! │  (memory or JSON-lines file store)          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The log only grows**: undo and redo are recorded as new changes
//! 2. **Canonical text is the unit of comparison**: diffs, digests and
//!    clipboard exchange all go through the serializer
//! 3. **Patches touch as little as possible**: only the changed blocks are
//!    replaced in the live buffer
//! 4. **Applying a patch never records a change**
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scenarist_editor::{ChangeLog, EditorConfig, ScriptDocument};
//!
//! let mut doc = ScriptDocument::script(ChangeLog::in_memory(), EditorConfig::default())?;
//!
//! // User types
//! doc.buffer_mut().insert_text(0, "INT. HOUSE - DAY");
//! doc.commit()?;
//!
//! // And changes their mind
//! doc.undo()?;
//! assert!(doc.is_redo_available());
//! ```

mod buffer;
mod change_log;
mod config;
mod digest;
mod document;
mod errors;
mod serializer;
mod session;
mod settings;
mod store;
mod undo_stack;

pub use buffer::{Block, BlockKind, ScriptBuffer, TextBuffer};
pub use change_log::{replay_records, ChangeLog, UNKNOWN_AUTHOR};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use digest::ContentHash;
pub use document::{
    DocumentEvent, DocumentObserver, DocumentState, ScenarioDocument, ScriptDocument,
};
pub use errors::{ConfigError, EditorError, EditorResult, StoreError};
pub use serializer::{CanonicalSerializer, ScriptSerializer};
pub use session::{PendingChange, SyncSession};
pub use settings::{InMemorySettings, SettingsScope, SettingsStore, USER_NAME_KEY};
pub use store::{ChangeRecord, ChangeStore, FileChangeStore, InMemoryChangeStore, NewChange};
pub use undo_stack::{UndoStack, DEFAULT_UNDO_LEVELS};

// Re-export patch types used across the editor API
pub use scenarist_patch::{BrotliCodec, PatchBlob, PatchCodec, PlainCodec};
