//! # Canonical Serializer
//!
//! Converts the live buffer to and from the canonical text used for
//! diffing, storage and clipboard exchange.
//!
//! The script format is JSON lines: one block object per line, in document
//! order. A fragment (clipboard data, patch replacement) has the same shape.
//!
//! ```text
//! {"type":"scene_heading","text":"INT. HOUSE - DAY"}
//! {"type":"action","text":"John enters."}
//! ```

use crate::buffer::{Block, BlockKind, ScriptBuffer, TextBuffer};
use crate::{EditorError, EditorResult};
use scenarist_patch::{CanonicalLayout, LayoutUnit, PatchError, PatchResult};
use std::ops::Range;

/// Bidirectional conversion between a buffer and its canonical text
pub trait CanonicalSerializer: CanonicalLayout {
    type Buffer: TextBuffer;

    /// Parsed, ready-to-insert canonical fragment
    type Fragment;

    /// Canonical text of the whole buffer, or of a plain-text range of it
    fn to_canonical(&self, buffer: &Self::Buffer, range: Option<Range<usize>>) -> EditorResult<String>;

    /// Parse a fragment without touching any buffer
    fn parse_fragment(&self, text: &str) -> EditorResult<Self::Fragment>;

    /// Insert a parsed fragment at a plain-text position
    fn insert_fragment(&self, buffer: &mut Self::Buffer, position: usize, fragment: Self::Fragment);

    /// Canonical text of a new, empty document
    fn empty_document(&self) -> String;

    /// Parse and insert a fragment; nothing is inserted if parsing fails
    fn from_canonical(&self, buffer: &mut Self::Buffer, position: usize, text: &str) -> EditorResult<()> {
        let fragment = self.parse_fragment(text)?;
        self.insert_fragment(buffer, position, fragment);
        Ok(())
    }
}

/// JSON-lines serializer for [`ScriptBuffer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptSerializer;

impl ScriptSerializer {
    pub fn new() -> Self {
        Self
    }

    fn encode(blocks: &[Block]) -> EditorResult<String> {
        let lines = blocks
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }
}

impl CanonicalSerializer for ScriptSerializer {
    type Buffer = ScriptBuffer;
    type Fragment = Vec<Block>;

    fn to_canonical(&self, buffer: &ScriptBuffer, range: Option<Range<usize>>) -> EditorResult<String> {
        match range {
            Some(range) => Self::encode(&buffer.slice(range)),
            None => Self::encode(buffer.blocks()),
        }
    }

    fn parse_fragment(&self, text: &str) -> EditorResult<Vec<Block>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        text.split('\n')
            .enumerate()
            .map(|(index, line)| {
                serde_json::from_str::<Block>(line)
                    .map_err(|err| EditorError::malformed_fragment(index + 1, err.to_string()))
            })
            .collect()
    }

    fn insert_fragment(&self, buffer: &mut ScriptBuffer, position: usize, fragment: Vec<Block>) {
        buffer.insert_blocks(position, fragment);
    }

    fn empty_document(&self) -> String {
        // A lone empty scene heading always encodes.
        serde_json::to_string(&Block::new(BlockKind::SceneHeading, ""))
            .unwrap_or_else(|_| r#"{"type":"scene_heading","text":""}"#.to_string())
    }
}

impl CanonicalLayout for ScriptSerializer {
    fn units<'a>(&self, canonical: &'a str) -> PatchResult<Vec<LayoutUnit<'a>>> {
        if canonical.is_empty() {
            return Ok(Vec::new());
        }

        canonical
            .split('\n')
            .enumerate()
            .map(|(index, line)| {
                let block: Block = serde_json::from_str(line)
                    .map_err(|err| PatchError::layout(format!("line {}: {err}", index + 1)))?;
                Ok(LayoutUnit {
                    canonical: line,
                    plain_len: block.text.chars().count(),
                })
            })
            .collect()
    }

    fn fragment(&self, units: &[LayoutUnit<'_>]) -> String {
        units
            .iter()
            .map(|unit| unit.canonical)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
