//! # Script Buffer
//!
//! The live, mutable script: an ordered list of typed text blocks.
//!
//! Positions are plain-text character positions, with one separator
//! character between consecutive blocks, so a buffer holding the blocks
//! `"INT. HOUSE"` and `"John enters."` has 23 characters.
//!
//! The buffer always holds at least one block.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Mutable document the controller edits
pub trait TextBuffer {
    /// Plain-text length, separators included
    fn character_count(&self) -> usize;

    /// Remove a plain-text range; blocks the range spans are merged
    fn remove_range(&mut self, range: Range<usize>);

    /// Start an edit group; nested groups collapse into the outermost one
    fn begin_edit_group(&mut self);

    /// Close an edit group, making its edits one step of the buffer's own history
    fn end_edit_group(&mut self);

    /// Remove all content
    fn clear(&mut self) {
        let len = self.character_count();
        self.remove_range(0..len);
    }
}

/// Screenplay paragraph types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    SceneHeading,
    SceneCharacters,
    Action,
    Character,
    Parenthetical,
    Dialogue,
    Transition,
    Note,
    Title,
    NoprintableText,
    FolderHeader,
    FolderFooter,
}

/// A single paragraph of the script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub text: String,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Block-structured script buffer
#[derive(Debug, Clone)]
pub struct ScriptBuffer {
    blocks: Vec<Block>,

    /// Open edit groups
    group_depth: usize,

    /// Whether the open edit group changed anything
    group_changed: bool,

    /// Incremented once per edit outside a group and once per changed group
    revision: u64,
}

impl Default for ScriptBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptBuffer {
    /// A buffer holding one empty scene heading
    pub fn new() -> Self {
        Self::from_blocks(vec![Block::default()])
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let blocks = if blocks.is_empty() {
            vec![Block::default()]
        } else {
            blocks
        };

        Self {
            blocks,
            group_depth: 0,
            group_changed: false,
            revision: 0,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of completed edits, counting a whole edit group as one
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Block texts joined by newlines
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Insert typed text; newlines start new blocks of the same kind
    pub fn insert_text(&mut self, position: usize, text: &str) {
        if text.is_empty() {
            return;
        }

        let (index, offset) = self.locate(position);
        let host_kind = self.blocks[index].kind;
        let split = byte_offset(&self.blocks[index].text, offset);
        let right = self.blocks[index].text.split_off(split);

        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            self.blocks[index].text.push_str(first);
        }

        let mut inserted: Vec<Block> = pieces.map(|piece| Block::new(host_kind, piece)).collect();
        match inserted.last_mut() {
            Some(last) => last.text.push_str(&right),
            None => self.blocks[index].text.push_str(&right),
        }

        self.blocks.splice(index + 1..index + 1, inserted);
        self.touch();
    }

    /// Change the kind of the block containing `position`
    pub fn set_block_kind(&mut self, position: usize, kind: BlockKind) {
        let (index, _) = self.locate(position);
        if self.blocks[index].kind != kind {
            self.blocks[index].kind = kind;
            self.touch();
        }
    }

    /// Blocks covering a plain-text range; edge blocks are cut to the range
    pub fn slice(&self, range: Range<usize>) -> Vec<Block> {
        let len = self.character_count();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        let (first, first_offset) = self.locate(start);
        let (last, last_offset) = self.locate(end);

        (first..=last)
            .map(|index| {
                let block = &self.blocks[index];
                let from = if index == first { first_offset } else { 0 };
                let to = if index == last {
                    last_offset
                } else {
                    block.char_len()
                };
                let text = &block.text[byte_offset(&block.text, from)..byte_offset(&block.text, to)];
                Block::new(block.kind, text)
            })
            .collect()
    }

    /// Insert whole blocks at a plain-text position.
    ///
    /// The first block continues the block at `position` and the last one
    /// takes over the text after `position`. The first block's kind wins
    /// when it is pasted into an empty block, or at the start of a block when
    /// more than one block is inserted.
    pub fn insert_blocks(&mut self, position: usize, blocks: Vec<Block>) {
        let mut incoming = blocks.into_iter();
        let Some(first) = incoming.next() else {
            return;
        };
        let mut rest: Vec<Block> = incoming.collect();

        let (index, offset) = self.locate(position);
        let split = byte_offset(&self.blocks[index].text, offset);
        let right = self.blocks[index].text.split_off(split);
        let left_empty = self.blocks[index].text.is_empty();

        let host = &mut self.blocks[index];
        if left_empty && (right.is_empty() || !rest.is_empty()) {
            host.kind = first.kind;
        }
        host.text.push_str(&first.text);

        match rest.last_mut() {
            Some(last) => last.text.push_str(&right),
            None => host.text.push_str(&right),
        }

        self.blocks.splice(index + 1..index + 1, rest);
        self.touch();
    }

    /// Block index and character offset inside it for a plain position
    fn locate(&self, position: usize) -> (usize, usize) {
        let mut remaining = position;
        for (index, block) in self.blocks.iter().enumerate() {
            let len = block.char_len();
            if remaining <= len {
                return (index, remaining);
            }
            remaining -= len + 1;
        }

        let last = self.blocks.len() - 1;
        (last, self.blocks[last].char_len())
    }

    fn touch(&mut self) {
        if self.group_depth == 0 {
            self.revision += 1;
        } else {
            self.group_changed = true;
        }
    }
}

impl TextBuffer for ScriptBuffer {
    fn character_count(&self) -> usize {
        self.blocks.iter().map(Block::char_len).sum::<usize>() + self.blocks.len() - 1
    }

    fn remove_range(&mut self, range: Range<usize>) {
        let len = self.character_count();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        if start == end {
            return;
        }

        let (first, first_offset) = self.locate(start);
        let (last, last_offset) = self.locate(end);

        let tail = {
            let block = &self.blocks[last];
            block.text[byte_offset(&block.text, last_offset)..].to_string()
        };

        let head = &mut self.blocks[first];
        head.text.truncate(byte_offset(&head.text, first_offset));
        head.text.push_str(&tail);

        self.blocks.drain(first + 1..=last);
        self.touch();
    }

    fn begin_edit_group(&mut self) {
        if self.group_depth == 0 {
            self.group_changed = false;
        }
        self.group_depth += 1;
    }

    fn end_edit_group(&mut self) {
        if self.group_depth == 0 {
            return;
        }

        self.group_depth -= 1;
        if self.group_depth == 0 && self.group_changed {
            self.revision += 1;
            self.group_changed = false;
        }
    }
}

/// Byte offset of the `chars`-th character, or the end of the text
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScriptBuffer {
        ScriptBuffer::from_blocks(vec![
            Block::new(BlockKind::SceneHeading, "INT. HOUSE"),
            Block::new(BlockKind::Action, "John enters."),
            Block::new(BlockKind::Character, "JOHN"),
        ])
    }

    #[test]
    fn test_character_count_includes_separators() {
        assert_eq!(ScriptBuffer::new().character_count(), 0);
        assert_eq!(sample().character_count(), 10 + 1 + 12 + 1 + 4);
    }

    #[test]
    fn test_insert_text_splits_on_newline() {
        let mut buffer = ScriptBuffer::new();
        buffer.insert_text(0, "INT. HOUSE\nEXT. GARDEN");
        assert_eq!(buffer.blocks().len(), 2);
        assert_eq!(buffer.plain_text(), "INT. HOUSE\nEXT. GARDEN");
        assert!(buffer
            .blocks()
            .iter()
            .all(|block| block.kind == BlockKind::SceneHeading));
    }

    #[test]
    fn test_remove_range_merges_blocks() {
        let mut buffer = sample();
        // "INT. HO" + "JOHN"
        buffer.remove_range(7..24);
        assert_eq!(buffer.plain_text(), "INT. HOJOHN");
        assert_eq!(buffer.blocks()[0].kind, BlockKind::SceneHeading);
    }

    #[test]
    fn test_remove_whole_blocks_leaves_empty_block() {
        let mut buffer = sample();
        buffer.remove_range(11..23);
        assert_eq!(buffer.blocks().len(), 3);
        assert_eq!(buffer.blocks()[1], Block::new(BlockKind::Action, ""));

        buffer.clear();
        assert_eq!(buffer.blocks(), &[Block::new(BlockKind::SceneHeading, "")]);
    }

    #[test]
    fn test_insert_blocks_into_empty_block_adopts_kind() {
        let mut buffer = ScriptBuffer::new();
        buffer.insert_blocks(
            0,
            vec![
                Block::new(BlockKind::Action, "Rain."),
                Block::new(BlockKind::Character, "MARY"),
            ],
        );
        assert_eq!(
            buffer.blocks(),
            &[
                Block::new(BlockKind::Action, "Rain."),
                Block::new(BlockKind::Character, "MARY"),
            ]
        );
    }

    #[test]
    fn test_insert_single_block_mid_text_keeps_host_kind() {
        let mut buffer = sample();
        buffer.insert_blocks(5, vec![Block::new(BlockKind::Note, "BIG ")]);
        assert_eq!(buffer.blocks()[0], Block::new(BlockKind::SceneHeading, "INT. BIG HOUSE"));
    }

    #[test]
    fn test_insert_blocks_mid_text_carries_tail() {
        let mut buffer = sample();
        buffer.insert_blocks(
            4,
            vec![
                Block::new(BlockKind::Action, " ONE"),
                Block::new(BlockKind::Note, "TWO"),
            ],
        );
        assert_eq!(buffer.blocks()[0], Block::new(BlockKind::SceneHeading, "INT. ONE"));
        assert_eq!(buffer.blocks()[1], Block::new(BlockKind::Note, "TWO HOUSE"));
        assert_eq!(buffer.blocks().len(), 4);
    }

    #[test]
    fn test_slice_cuts_edge_blocks() {
        let buffer = sample();
        let slice = buffer.slice(5..15);
        assert_eq!(
            slice,
            vec![
                Block::new(BlockKind::SceneHeading, "HOUSE"),
                Block::new(BlockKind::Action, "John"),
            ]
        );
    }

    #[test]
    fn test_edit_group_is_one_revision() {
        let mut buffer = sample();
        let before = buffer.revision();

        buffer.begin_edit_group();
        buffer.remove_range(0..4);
        buffer.insert_text(0, "EXT.");
        buffer.end_edit_group();

        assert_eq!(buffer.revision(), before + 1);

        buffer.begin_edit_group();
        buffer.end_edit_group();
        assert_eq!(buffer.revision(), before + 1);
    }

    #[test]
    fn test_positions_are_characters() {
        let mut buffer = ScriptBuffer::from_blocks(vec![Block::new(BlockKind::Action, "Ёлка")]);
        buffer.insert_text(2, "-");
        assert_eq!(buffer.plain_text(), "Ёл-ка");
        assert_eq!(buffer.character_count(), 5);
    }
}
