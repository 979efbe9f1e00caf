//! # Text Patches
//!
//! Character-level patches between two canonical texts.
//!
//! ## Design
//!
//! - A patch is a list of hunks, each carrying some unchanged context around
//!   the edit so it can be found again in a text that has shifted
//! - Offsets are byte offsets into the source (`source_offset`) and into the
//!   target (`target_offset`) of the diff
//! - Hunks are applied in order; the drift between where a hunk was expected
//!   and where it was found carries over to the next hunk
//! - Application is all-or-nothing: a hunk that cannot be placed fails the
//!   whole patch
//!
//! ## Example
//!
//! ```rust
//! use scenarist_patch::{apply, diff};
//!
//! let patch = diff("INT. HOUSE - DAY", "INT. HOUSE - NIGHT");
//! let shifted = "FADE IN:\nINT. HOUSE - DAY";
//! assert_eq!(apply(shifted, &patch).unwrap(), "FADE IN:\nINT. HOUSE - NIGHT");
//! ```

use crate::{PatchError, PatchResult};
use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};
use std::time::Duration;
use tracing::trace;

/// Characters of unchanged text kept on each side of a change.
pub const DEFAULT_CONTEXT_CHARS: usize = 32;

/// Upper bound on time spent searching for a minimal diff.
const DIFF_TIMEOUT: Duration = Duration::from_secs(1);

/// One run of the diff inside a hunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "text", rename_all = "snake_case")]
pub enum Segment {
    Equal(String),
    Delete(String),
    Insert(String),
}

impl Segment {
    fn text(&self) -> &str {
        match self {
            Segment::Equal(text) | Segment::Delete(text) | Segment::Insert(text) => text,
        }
    }

    fn tag(&self) -> ChangeTag {
        match self {
            Segment::Equal(_) => ChangeTag::Equal,
            Segment::Delete(_) => ChangeTag::Delete,
            Segment::Insert(_) => ChangeTag::Insert,
        }
    }

    fn push_str(&mut self, value: &str) {
        match self {
            Segment::Equal(text) | Segment::Delete(text) | Segment::Insert(text) => {
                text.push_str(value)
            }
        }
    }
}

/// A contiguous edit plus its surrounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// Byte offset of the hunk in the text the diff was taken from
    pub source_offset: usize,

    /// Byte offset of the hunk in the text the diff produced
    pub target_offset: usize,

    /// Context, deletions and insertions in text order
    pub segments: Vec<Segment>,
}

impl Hunk {
    /// Text this hunk expects to find (context + deletions)
    pub fn source_text(&self) -> String {
        self.segments
            .iter()
            .filter(|segment| !matches!(segment, Segment::Insert(_)))
            .map(Segment::text)
            .collect()
    }

    /// Text this hunk leaves behind (context + insertions)
    pub fn target_text(&self) -> String {
        self.segments
            .iter()
            .filter(|segment| !matches!(segment, Segment::Delete(_)))
            .map(Segment::text)
            .collect()
    }

    fn push(&mut self, tag: ChangeTag, value: &str) {
        match self.segments.last_mut() {
            Some(last) if last.tag() == tag => last.push_str(value),
            _ => self.segments.push(match tag {
                ChangeTag::Equal => Segment::Equal(value.to_string()),
                ChangeTag::Delete => Segment::Delete(value.to_string()),
                ChangeTag::Insert => Segment::Insert(value.to_string()),
            }),
        }
    }
}

/// Transformation from one canonical text to another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub hunks: Vec<Hunk>,
}

impl Patch {
    /// A patch with no hunks leaves any text unchanged
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Encode to the textual exchange form
    pub fn to_text(&self) -> PatchResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from the textual exchange form
    pub fn from_text(text: &str) -> PatchResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Compute the patch taking `old` to `new`
pub fn diff(old: &str, new: &str) -> Patch {
    diff_with_context(old, new, DEFAULT_CONTEXT_CHARS)
}

/// Compute the patch taking `old` to `new`, keeping `context` characters of
/// unchanged text around every change
pub fn diff_with_context(old: &str, new: &str, context: usize) -> Patch {
    if old == new {
        return Patch::default();
    }

    let text_diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .timeout(DIFF_TIMEOUT)
        .diff_chars(old, new);

    let old_offsets = char_offsets(old);
    let new_offsets = char_offsets(new);

    let mut hunks = Vec::new();
    for group in text_diff.grouped_ops(context) {
        let Some(first) = group.first() else {
            continue;
        };

        let mut hunk = Hunk {
            source_offset: old_offsets[first.old_range().start],
            target_offset: new_offsets[first.new_range().start],
            segments: Vec::new(),
        };

        for op in &group {
            for change in text_diff.iter_changes(op) {
                hunk.push(change.tag(), change.value());
            }
        }

        hunks.push(hunk);
    }

    trace!(hunks = hunks.len(), "Computed patch");
    Patch { hunks }
}

/// Apply `patch` to `text`, returning the patched text
pub fn apply(text: &str, patch: &Patch) -> PatchResult<String> {
    let mut result = text.to_string();
    let mut drift: isize = 0;

    for (index, hunk) in patch.hunks.iter().enumerate() {
        let source = hunk.source_text();
        let target = hunk.target_text();

        let expected = (hunk.target_offset as isize + drift).clamp(0, result.len() as isize) as usize;
        let location =
            find_nearest(&result, &source, expected).ok_or(PatchError::HunkNotFound { index })?;

        if location != expected {
            trace!(index, expected, location, "Hunk applied at shifted offset");
        }

        result.replace_range(location..location + source.len(), &target);
        drift = location as isize - hunk.target_offset as isize;
    }

    Ok(result)
}

/// Byte offset of every char plus the end of the string.
fn char_offsets(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect()
}

fn find_nearest(haystack: &str, needle: &str, expected: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(floor_char_boundary(haystack, expected));
    }

    if haystack
        .get(expected..)
        .is_some_and(|rest| rest.starts_with(needle))
    {
        return Some(expected);
    }

    // Overlapping occurrences count, so step one char past each hit
    let mut nearest: Option<usize> = None;
    let mut from = 0;
    while let Some(found) = haystack.get(from..).and_then(|rest| rest.find(needle)) {
        let offset = from + found;
        if nearest.map_or(true, |best| offset.abs_diff(expected) < best.abs_diff(expected)) {
            nearest = Some(offset);
        }
        if offset > expected {
            break;
        }
        from = offset + haystack[offset..].chars().next().map_or(1, char::len_utf8);
    }
    nearest
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
