//! # Scenarist Patch
//!
//! Diff, patch and region lookup over canonical document texts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ patch: diff(a, b) → Patch, apply(t, Patch)  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ region: Patch + CanonicalLayout →           │
//! │         (plain position, length, fragment)  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ codec: Patch ⇄ compressed PatchBlob         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The crate knows nothing about the document model. Canonical texts are
//! plain strings; the editor describes their unit structure through
//! [`CanonicalLayout`].

mod codec;
mod error;
mod patch;
mod region;

pub use codec::{BrotliCodec, PatchBlob, PatchCodec, PlainCodec};
pub use error::{PatchError, PatchResult};
pub use patch::{apply, diff, diff_with_context, Hunk, Patch, Segment, DEFAULT_CONTEXT_CHARS};
pub use region::{locate_changed_region, CanonicalLayout, ChangedRegion, LayoutUnit};

/// Clamp a possibly out-of-range position into `0..=len`.
///
/// Negative positions map to the start, positions past the end map to the end.
pub fn clamp_position(position: i64, len: usize) -> usize {
    if position <= 0 {
        0
    } else {
        usize::try_from(position).map_or(len, |position| position.min(len))
    }
}
