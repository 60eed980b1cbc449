//! # Lead Sheet Documents
//!
//! A lead sheet written as a YAML document, the way the corpus stores one tune.
//!
//! ## Format
//! ```yaml
//! title: Blue Bossa
//! composer: Kenny Dorham
//! key: Cm            # key name or code (3f)
//! pickup: 0          # quavers before bar 0
//! repeats: once      # once | played
//! normalise-key: true
//! chords: "[ 2Cm7 2Fm7 [ 2Dm7b5 2G7 ] [ 2Dm7b5 2G7 ] ]"
//! notes: [-1, 1, 1, 1, 4, ...]   # quavers per note, negative for rests
//! pitches: [67, 67, 65, ...]     # MIDI pitch of each non-rest note, in order
//! bars: [8, 8, 8, 8]             # quavers per bar
//! ```
//!
//! `chords`, `notes` and `bars` are required. `pitches` may be longer than the number of notes
//! (the extra pitches are ignored with a warning), never shorter.
//!
//! ## Entry Points
//! - [`parse_lead_sheet`] - document to validated [`Piece`]
//! - [`parse_lead_sheet_unchecked`] - document to [`Piece`] without duration validation

use log::debug;
use serde::Deserialize;

use crate::bars::Bar;
use crate::error::LeadSheetError;
use crate::melody::Melody;
use crate::progression::{ChordProgression, RepeatMode};
use crate::timestep::Piece;
use crate::transpose::{normalise_chords, normalise_melody, KeySignature};
use crate::QUAVER_DURATION;

/// Raw document as written, before any validation.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawLeadSheet {
    title: Option<String>,
    composer: Option<String>,
    key: Option<String>,
    #[serde(default)]
    pickup: u32,
    chords: String,
    notes: Vec<f64>,
    #[serde(default)]
    pitches: Vec<u8>,
    bars: Vec<u32>,
    #[serde(default)]
    repeats: RepeatMode,
    #[serde(default)]
    normalise_key: bool,
}

/// A lead sheet with every field parsed, ready to merge.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadSheet {
    pub title: Option<String>,
    pub composer: Option<String>,
    pub key: Option<KeySignature>,
    /// In time units.
    pub pickup: u32,
    pub melody: Melody,
    pub chords: ChordProgression,
    pub bars: Vec<Bar>,
}

impl LeadSheet {
    /// Parse a YAML document, normalising to C when `normalise-key` is set.
    pub fn from_yaml(source: &str) -> Result<Self, LeadSheetError> {
        let raw: RawLeadSheet =
            serde_yaml::from_str(source).map_err(|e| LeadSheetError::MetadataError(e.to_string()))?;

        let key = raw.key.as_deref().map(KeySignature::parse).transpose()?;
        let pickup = raw.pickup.checked_mul(QUAVER_DURATION).ok_or_else(|| {
            LeadSheetError::MetadataError(format!("pickup is too long: {} quavers", raw.pickup))
        })?;
        let mut sheet = LeadSheet {
            title: raw.title,
            composer: raw.composer,
            key,
            pickup,
            melody: Melody::from_relative_durations(&raw.notes, &raw.pitches)?,
            chords: ChordProgression::parse(&raw.chords, raw.repeats)?,
            bars: Bar::from_quavers(&raw.bars)?,
        };

        if raw.normalise_key {
            let key = sheet.key.ok_or_else(|| {
                LeadSheetError::MetadataError("normalise-key is set but no key is given".to_string())
            })?;
            sheet.normalise(&key)?;
        }
        Ok(sheet)
    }

    /// Transpose melody and chords from `key` to C.
    pub fn normalise(&mut self, key: &KeySignature) -> Result<(), LeadSheetError> {
        normalise_melody(&mut self.melody.notes, key)?;
        normalise_chords(&mut self.chords.chords, key);
        self.key = Some(KeySignature::C_MAJOR);
        Ok(())
    }

    /// Validate durations and merge.
    pub fn into_piece(self) -> Result<Piece, LeadSheetError> {
        let (title, composer) = (self.title, self.composer);
        let piece = Piece::new(self.melody.into(), self.chords.into(), self.bars, self.pickup)?;
        Ok(with_metadata(piece, title, composer))
    }

    /// Merge without validation (useful for sheets whose totals are known to disagree)
    pub fn into_piece_unchecked(self) -> Piece {
        let (title, composer) = (self.title, self.composer);
        let piece = Piece::new_unchecked(self.melody.into(), self.chords.into(), self.bars, self.pickup);
        with_metadata(piece, title, composer)
    }
}

fn with_metadata(mut piece: Piece, title: Option<String>, composer: Option<String>) -> Piece {
    piece.title = title;
    piece.composer = composer;
    debug!(
        "{}: {} timesteps",
        piece.title.as_deref().unwrap_or("untitled"),
        piece.timesteps.len()
    );
    piece
}

/// Parse a YAML lead sheet into a validated, merged [`Piece`].
///
/// # Examples
/// ```
/// use leadsheet::parse_lead_sheet;
///
/// let source = r#"
/// title: Pickup
/// key: F
/// normalise-key: true
/// pickup: 1
/// chords: "2F"
/// notes: [1, 8]
/// pitches: [60, 65]
/// bars: [8]
/// "#;
/// let piece = parse_lead_sheet(source).unwrap();
/// assert_eq!(piece.pickup, 30);
/// assert_eq!(piece.melody[1].pitch, Some(60)); // F normalised to C
/// assert_eq!(piece.chords[0].root, 0);
/// assert_eq!(piece.timesteps.len(), 2);
/// ```
pub fn parse_lead_sheet(source: &str) -> Result<Piece, LeadSheetError> {
    LeadSheet::from_yaml(source)?.into_piece()
}

/// Parse without duration validation
pub fn parse_lead_sheet_unchecked(source: &str) -> Result<Piece, LeadSheetError> {
    Ok(LeadSheet::from_yaml(source)?.into_piece_unchecked())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTUMN: &str = r#"
title: Autumn Leaves (A section)
composer: Joseph Kosma
key: "1f"
repeats: played
chords: "[ 2Cm7 2F7 2BbM7 2EbM7 ]"
notes: [2, 2, 2, 2, 8, 8, 8, 8, 8, 8, 8]
pitches: [62, 63, 65, 70, 70, 69, 67, 65, 63, 62, 60]
bars: [8, 8, 8, 8, 8, 8, 8, 8]
"#;

    #[test]
    fn test_played_repeats() {
        let piece = parse_lead_sheet(AUTUMN).unwrap();
        assert_eq!(piece.title.as_deref(), Some("Autumn Leaves (A section)"));
        assert_eq!(piece.composer.as_deref(), Some("Joseph Kosma"));
        assert_eq!(piece.chords.len(), 8);
        assert_eq!(piece.bars.len(), 8);
        assert_eq!(piece.total_duration(), 8 * 240);
    }

    #[test]
    fn test_once_mode_is_default() {
        let source = AUTUMN.replace("repeats: played\n", "");
        let err = parse_lead_sheet(&source).unwrap_err();
        assert!(matches!(err, LeadSheetError::DurationMismatch { chords: 960, .. }));

        let piece = parse_lead_sheet_unchecked(&source).unwrap();
        assert_eq!(piece.chords.len(), 4);
        assert_eq!(piece.total_duration(), 8 * 240);
    }

    #[test]
    fn test_key_without_normalisation_is_kept() {
        let sheet = LeadSheet::from_yaml(AUTUMN).unwrap();
        assert_eq!(sheet.key.map(|k| k.code()), Some("1f".to_string()));
        assert_eq!(sheet.melody.notes[0].pitch, Some(62));
    }

    #[test]
    fn test_normalise_requires_key() {
        let source = "chords: C\nnotes: [8]\npitches: [60]\nbars: [8]\nnormalise-key: true\n";
        assert!(matches!(
            LeadSheet::from_yaml(source),
            Err(LeadSheetError::MetadataError(_))
        ));
    }

    #[test]
    fn test_document_errors() {
        for source in [
            "notes: [1]\nbars: [1]\n",
            "chords: C\nnotes: [1]\nbars: [1]\ntempo: 120\n",
            "chords: C\nnotes: one\nbars: [1]\n",
            "chords: C\nnotes: [1]\nbars: [1]\nrepeats: twice\n",
            "chords: C\nnotes: [1]\nbars: [1]\nkey: H\n",
            "chords: C\nnotes: [1]\nbars: [1]\npickup: 4294967295\n",
            "chords: C\nnotes: [1]\npitches: [60]\nbars: [4294967295]\n",
        ] {
            assert!(
                matches!(LeadSheet::from_yaml(source), Err(LeadSheetError::MetadataError(_))),
                "{:?}",
                source
            );
        }
    }

    #[test]
    fn test_errors_from_inner_parsers() {
        let bad_chord = "chords: C Xm7\nnotes: [1]\npitches: [60]\nbars: [1]\n";
        assert!(matches!(
            LeadSheet::from_yaml(bad_chord),
            Err(LeadSheetError::ChordSymbol { .. })
        ));

        let no_pitch = "chords: C\nnotes: [1, 1]\npitches: [60]\nbars: [1]\n";
        assert!(matches!(LeadSheet::from_yaml(no_pitch), Err(LeadSheetError::Melody(_))));
    }
}
