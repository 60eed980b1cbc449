//! The Piece: owner of the three timed sequences and their merged timesteps

use serde::Serialize;

use super::engine::merge;
use super::types::Timestep;
use crate::bars::{self, Bar};
use crate::chord::Chord;
use crate::error::LeadSheetError;
use crate::melody::Note;
use crate::semantic::validate_durations;

/// A lead sheet merged into timesteps.
///
/// `pickup` is in time units. Everything is computed once on construction; the timesteps never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    pub pickup: u32,
    pub melody: Vec<Note>,
    pub chords: Vec<Chord>,
    pub bars: Vec<Bar>,
    pub timesteps: Vec<Timestep>,
}

impl Piece {
    /// Validate the sequence durations, then merge.
    ///
    /// ```
    /// use leadsheet::{Bar, Chord, LeadSheetError, Note, Piece};
    ///
    /// let melody = vec![Note::new(60, 240)];
    /// let chords = vec![Chord::from_symbol("2C").unwrap()];
    /// let piece = Piece::new(melody.clone(), chords, Bar::from_quavers(&[8]).unwrap(), 0).unwrap();
    /// assert_eq!(piece.timesteps.len(), 1);
    ///
    /// let short = vec![Chord::from_symbol("C").unwrap()];
    /// let err = Piece::new(melody, short, Bar::from_quavers(&[8]).unwrap(), 0).unwrap_err();
    /// assert!(matches!(err, LeadSheetError::DurationMismatch { chords: 120, .. }));
    /// ```
    pub fn new(
        melody: Vec<Note>,
        chords: Vec<Chord>,
        bars: Vec<Bar>,
        pickup: u32,
    ) -> Result<Self, LeadSheetError> {
        validate_durations(&melody, &chords, &bars, pickup)?;
        Ok(Self::new_unchecked(melody, chords, bars, pickup))
    }

    /// Merge without validation (the totals may disagree)
    pub fn new_unchecked(melody: Vec<Note>, chords: Vec<Chord>, bars: Vec<Bar>, pickup: u32) -> Self {
        let timesteps = merge(&melody, &chords, &bars, pickup);
        Self {
            title: None,
            composer: None,
            pickup,
            melody,
            chords,
            bars,
            timesteps,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_composer(mut self, composer: impl Into<String>) -> Self {
        self.composer = Some(composer.into());
        self
    }

    /// Length of the merged piece in time units.
    pub fn total_duration(&self) -> u32 {
        self.timesteps.iter().map(|t| t.duration).sum()
    }

    /// Bar lengths plus the pickup; equals [`Piece::total_duration`] for a validated piece.
    pub fn notated_duration(&self) -> u32 {
        bars::total_duration(&self.bars) + self.pickup
    }
}
