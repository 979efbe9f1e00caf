//! Patch round trips over realistic script text

use scenarist_patch::{
    apply, clamp_position, diff, diff_with_context, locate_changed_region, BrotliCodec,
    CanonicalLayout, LayoutUnit, PatchBlob, PatchCodec, PatchError, PatchResult,
};

const DRAFT: &str = "INT. HOUSE - DAY\n\
John enters, shaking off the rain.\n\
JOHN\n\
Anyone home?\n\
EXT. GARDEN - CONTINUOUS\n\
Mary waters the roses.";

/// Paragraph-per-line layout
struct Paragraphs;

impl CanonicalLayout for Paragraphs {
    fn units<'a>(&self, canonical: &'a str) -> PatchResult<Vec<LayoutUnit<'a>>> {
        Ok(canonical
            .split('\n')
            .map(|line| LayoutUnit {
                canonical: line,
                plain_len: line.chars().count(),
            })
            .collect())
    }

    fn fragment(&self, units: &[LayoutUnit<'_>]) -> String {
        units
            .iter()
            .map(|unit| unit.canonical)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[test]
fn test_round_trip_edits() {
    let edits = [
        DRAFT.replace("DAY", "NIGHT"),
        DRAFT.replace("Anyone home?\n", ""),
        format!("FADE IN:\n{DRAFT}\nFADE OUT."),
        DRAFT.replace("Mary", "Марья"),
        String::new(),
    ];

    for edited in &edits {
        assert_eq!(&apply(DRAFT, &diff(DRAFT, edited)).unwrap(), edited);
        assert_eq!(apply(edited, &diff(edited, DRAFT)).unwrap(), DRAFT);
    }
}

#[test]
fn test_patch_applies_to_shifted_text() {
    let edited = DRAFT.replace("roses", "tulips");
    let patch = diff_with_context(DRAFT, &edited, 8);

    // Someone else added a scene up front meanwhile
    let shifted = format!("INT. CELLAR - NIGHT\nDark.\n{DRAFT}");
    let result = apply(&shifted, &patch).unwrap();
    assert_eq!(result, format!("INT. CELLAR - NIGHT\nDark.\n{edited}"));
}

#[test]
fn test_conflicting_text_is_rejected() {
    let patch = diff(DRAFT, &DRAFT.replace("roses", "tulips"));
    let rewritten = DRAFT.replace("Mary waters the roses.", "Nobody is here.");

    let err = apply(&rewritten, &patch).unwrap_err();
    assert!(matches!(err, PatchError::HunkNotFound { .. }));
}

#[test]
fn test_compressed_patch_is_smaller_than_text() -> anyhow::Result<()> {
    let long: String = std::iter::repeat(DRAFT).take(20).collect::<Vec<_>>().join("\n");
    let edited = long.replacen("DAY", "NIGHT", 1);
    let patch = diff_with_context("", &edited, 0);

    let codec = BrotliCodec::default();
    let blob = codec.encode(&patch)?;
    assert!(blob.len() < edited.len());

    let restored = PatchBlob::from_base64(&blob.to_base64())?;
    assert_eq!(apply("", &codec.decode(&restored)?)?, edited);
    Ok(())
}

#[test]
fn test_region_of_scene_rewrite() {
    let edited = DRAFT.replace("JOHN\nAnyone home?", "MARY (O.S.)\nIn here!");
    let region = locate_changed_region(DRAFT, &diff(DRAFT, &edited), &Paragraphs).unwrap();

    // Starts at "JOHN", spans through "Anyone home?"
    assert_eq!(region.plain_position, DRAFT.find("JOHN").unwrap());
    assert_eq!(region.plain_length, "JOHN\nAnyone home?".len());
    assert_eq!(region.replacement, "MARY (O.S.)\nIn here!");
    assert_eq!(region.target, edited);
}

#[test]
fn test_clamp_position() {
    assert_eq!(clamp_position(-5, 10), 0);
    assert_eq!(clamp_position(4, 10), 4);
    assert_eq!(clamp_position(11, 10), 10);
}
