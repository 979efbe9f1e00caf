//! # Undo/Redo Stack
//!
//! In-memory undo and redo pointers over the change log.
//!
//! ## Design
//!
//! - Both stacks hold `Arc<ChangeRecord>` handles, never copies
//! - A handle lives in at most one stack; undo and redo move it across
//! - Pushing a new change clears the redo stack
//! - The undo stack is bounded; the oldest handle is dropped on overflow
//!   while the record itself stays in the change log
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::with_max_levels(50);
//! stack.push(record);
//!
//! // Move the newest change onto the redo stack
//! let undone = stack.undo();
//!
//! // And back again
//! let redone = stack.redo();
//! ```

use crate::store::ChangeRecord;
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of undo levels
pub const DEFAULT_UNDO_LEVELS: usize = 50;

#[derive(Debug, Clone)]
pub struct UndoStack {
    /// Committed changes (most recent last)
    undo_stack: VecDeque<Arc<ChangeRecord>>,

    /// Undone changes (most recent last)
    redo_stack: Vec<Arc<ChangeRecord>>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (50)
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_UNDO_LEVELS)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a newly committed change
    pub fn push(&mut self, change: Arc<ChangeRecord>) {
        self.undo_stack.push_back(change);

        // Trim if exceeded max levels
        while self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }

        // Clear redo stack (new action invalidates future)
        self.redo_stack.clear();
    }

    /// The change the next undo will revert
    pub fn peek_undo(&self) -> Option<&Arc<ChangeRecord>> {
        self.undo_stack.back()
    }

    /// The change the next redo will reapply
    pub fn peek_redo(&self) -> Option<&Arc<ChangeRecord>> {
        self.redo_stack.last()
    }

    /// Move the most recent change onto the redo stack
    pub fn undo(&mut self) -> Option<Arc<ChangeRecord>> {
        let change = self.undo_stack.pop_back()?;
        self.redo_stack.push(Arc::clone(&change));
        Some(change)
    }

    /// Move the most recently undone change back onto the undo stack
    pub fn redo(&mut self) -> Option<Arc<ChangeRecord>> {
        let change = self.redo_stack.pop()?;
        self.undo_stack.push_back(Arc::clone(&change));
        Some(change)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Handles on the undo stack, oldest first
    pub fn undo_changes(&self) -> impl Iterator<Item = &Arc<ChangeRecord>> {
        self.undo_stack.iter()
    }

    /// Handles on the redo stack, oldest first
    pub fn redo_changes(&self) -> impl Iterator<Item = &Arc<ChangeRecord>> {
        self.redo_stack.iter()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChangeStore, InMemoryChangeStore, NewChange};
    use scenarist_patch::PatchBlob;

    fn records(count: usize) -> Vec<Arc<ChangeRecord>> {
        let mut store = InMemoryChangeStore::new();
        (0..count)
            .map(|_| {
                store
                    .append(NewChange {
                        author: "test".to_string(),
                        undo_patch: PatchBlob::default(),
                        redo_patch: PatchBlob::default(),
                        is_draft: false,
                    })
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert_eq!(stack.max_levels(), DEFAULT_UNDO_LEVELS);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_redo_transfer_handles() {
        let mut stack = UndoStack::new();
        let changes = records(2);
        for change in &changes {
            stack.push(Arc::clone(change));
        }

        let undone = stack.undo().unwrap();
        assert!(Arc::ptr_eq(&undone, &changes[1]));
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 1);

        let redone = stack.redo().unwrap();
        assert!(Arc::ptr_eq(&redone, &changes[1]));
        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.redo_levels(), 0);

        // Stack + test vector + the two returned handles
        assert_eq!(Arc::strong_count(&changes[1]), 4);
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut stack = UndoStack::new();
        let changes = records(2);

        stack.push(Arc::clone(&changes[0]));
        stack.undo();
        assert_eq!(stack.redo_levels(), 1);

        stack.push(Arc::clone(&changes[1]));
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut stack = UndoStack::with_max_levels(2);
        for change in records(3) {
            stack.push(change);
        }

        // Should only keep 2 (max levels), newest last
        assert_eq!(stack.undo_levels(), 2);
        let sequences: Vec<u64> = stack.undo_changes().map(|change| change.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
    }

    #[test]
    fn test_empty_stack_is_noop() {
        let mut stack = UndoStack::new();
        assert!(stack.undo().is_none());
        assert!(stack.redo().is_none());
    }
}
