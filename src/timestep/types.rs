//! Timestep type definitions

use serde::Serialize;

use crate::chord::Chord;
use crate::melody::Note;
use crate::pitch::{NoteSet, PitchClass};

/// A maximal span of time during which the note, the chord and the bar all stay the same.
///
/// # Fields
/// - `pitch`: MIDI pitch, `None` for a rest (and for tie rows rebuilt from model output, whose
///   pitch is whatever they continue)
/// - `root` / `bass` / `notes`: the active chord; `root == None` means no chord is sounding
///   (the pickup, or a decoded "no chord" row)
/// - `duration`: length in time units, never longer than the bar it sits in
/// - `same_note`: this span continues the previous timestep's note instead of starting one
/// - `is_barline`: this span starts a new bar
///
/// `bar_number`, `note_name`, `note_octave` and `core_notes` are not used by the vector codec.
/// They are carried for alternative model inputs (a chord's core set is far more frequent in the
/// corpus than any one of its altered forms).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestep {
    pub pitch: Option<u8>,
    pub root: Option<PitchClass>,
    pub bass: Option<PitchClass>,
    pub notes: NoteSet,
    pub duration: u32,
    pub same_note: bool,
    pub is_barline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_octave: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_notes: Option<NoteSet>,
}

impl Timestep {
    /// A timestep holding only the fields the vector codec carries.
    pub fn new(
        pitch: Option<u8>,
        chord: Option<&Chord>,
        duration: u32,
        same_note: bool,
        is_barline: bool,
    ) -> Self {
        Self {
            pitch,
            root: chord.map(|c| c.root),
            bass: chord.map(|c| c.bass),
            notes: chord.map(|c| c.full_notes).unwrap_or_default(),
            duration,
            same_note,
            is_barline,
            bar_number: None,
            note_name: None,
            note_octave: None,
            core_notes: None,
        }
    }

    pub(crate) fn with_note(mut self, note: Option<&Note>) -> Self {
        self.note_name = note.and_then(Note::name);
        self.note_octave = note.and_then(Note::octave);
        self
    }

    /// The chord sounding during this timestep, if any.
    pub fn chord(&self) -> Option<Chord> {
        let root = self.root?;
        Some(Chord::new(
            root,
            self.bass.unwrap_or(root),
            self.notes,
            self.duration,
        ))
    }

    pub fn is_rest(&self) -> bool {
        self.pitch.is_none() && !self.same_note
    }
}
