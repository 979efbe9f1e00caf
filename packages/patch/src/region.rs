//! # Changed Region Lookup
//!
//! Finds the smallest run of top-level units (blocks, paragraphs...) that a
//! patch changes, so a live document can replace just that run instead of
//! reloading everything.
//!
//! The canonical format is opaque to this crate; a [`CanonicalLayout`]
//! tells it where units start and end and how long each one is in the plain
//! text of the live document.

use crate::{apply, Patch, PatchResult};
use tracing::debug;

/// One top-level unit of a canonical text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutUnit<'a> {
    /// The unit's canonical source
    pub canonical: &'a str,

    /// Length of the unit's plain text, in characters
    pub plain_len: usize,
}

/// Unit boundaries of a canonical format
pub trait CanonicalLayout {
    /// Split a canonical text into its top-level units, in order
    fn units<'a>(&self, canonical: &'a str) -> PatchResult<Vec<LayoutUnit<'a>>>;

    /// Join units back into a canonical fragment
    fn fragment(&self, units: &[LayoutUnit<'_>]) -> String;

    /// Plain-text characters between two consecutive units
    fn separator_len(&self) -> usize {
        1
    }
}

/// The part of a document a patch touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedRegion {
    /// Start of the region in the live document's plain text
    pub plain_position: usize,

    /// Length of the region in the live document's plain text
    pub plain_length: usize,

    /// Canonical fragment replacing the region
    pub replacement: String,

    /// The whole patched canonical text
    pub target: String,
}

impl ChangedRegion {
    /// True when the patch leaves every unit untouched
    pub fn is_empty(&self) -> bool {
        self.plain_length == 0 && self.replacement.is_empty()
    }
}

/// Apply `patch` to `current` and locate the units that differ.
///
/// The region always covers whole units. When the change is a pure insertion
/// or a pure deletion of units, the region is widened by one neighbouring
/// unit so that neither side of the replacement is empty.
pub fn locate_changed_region<L>(current: &str, patch: &Patch, layout: &L) -> PatchResult<ChangedRegion>
where
    L: CanonicalLayout + ?Sized,
{
    let target = apply(current, patch)?;

    let old_units = layout.units(current)?;
    let new_units = layout.units(&target)?;

    let prefix = old_units
        .iter()
        .zip(&new_units)
        .take_while(|(old, new)| old.canonical == new.canonical)
        .count();

    let max_suffix = old_units.len().min(new_units.len()) - prefix;
    let suffix = old_units
        .iter()
        .rev()
        .zip(new_units.iter().rev())
        .take(max_suffix)
        .take_while(|(old, new)| old.canonical == new.canonical)
        .count();

    let mut old_range = prefix..old_units.len() - suffix;
    let mut new_range = prefix..new_units.len() - suffix;

    if old_range.is_empty() && new_range.is_empty() {
        return Ok(ChangedRegion {
            plain_position: 0,
            plain_length: 0,
            replacement: String::new(),
            target,
        });
    }

    if old_range.is_empty() || new_range.is_empty() {
        if prefix > 0 {
            old_range.start -= 1;
            new_range.start -= 1;
        } else if suffix > 0 {
            old_range.end += 1;
            new_range.end += 1;
        }
    }

    let separator = layout.separator_len();
    let plain_position = old_units[..old_range.start]
        .iter()
        .map(|unit| unit.plain_len + separator)
        .sum();
    let changed = &old_units[old_range.clone()];
    let plain_length = changed.iter().map(|unit| unit.plain_len).sum::<usize>()
        + separator * changed.len().saturating_sub(1);

    let replacement = layout.fragment(&new_units[new_range.clone()]);

    debug!(
        plain_position,
        plain_length,
        old_units = old_range.len(),
        new_units = new_range.len(),
        "Located changed region"
    );

    Ok(ChangedRegion {
        plain_position,
        plain_length,
        replacement,
        target,
    })
}
