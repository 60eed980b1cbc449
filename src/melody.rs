//! Melody: the note sequence of a piece
//!
//! A melody is a single line of notes and rests. It can be assembled two ways:
//! 1. Relative durations in quavers (negative for rests) paired with an ordered pitch list.
//!    This is how most of the corpus is written down: pitches played in without timing, and
//!    rhythm typed as numbers.
//! 2. Timed notes (pitch, start, end) plus the piece length, with rests filling the gaps.

use log::warn;
use serde::Serialize;

use crate::error::LeadSheetError;
use crate::pitch::{midi_note_name, midi_octave};
use crate::QUAVER_DURATION;

/// A note or a rest (`pitch == None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub pitch: Option<u8>,
    pub duration: u32,
}

impl Note {
    pub fn new(pitch: u8, duration: u32) -> Self {
        Self {
            pitch: Some(pitch),
            duration,
        }
    }

    pub fn rest(duration: u32) -> Self {
        Self {
            pitch: None,
            duration,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }

    /// Note name with sharps, e.g. `"F#"`. `None` for rests.
    pub fn name(&self) -> Option<&'static str> {
        self.pitch.map(midi_note_name)
    }

    /// MIDI octave (C4 = 60). `None` for rests.
    pub fn octave(&self) -> Option<i8> {
        self.pitch.map(midi_octave)
    }
}

/// A sounding note positioned in time, as MIDI tools see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedNote {
    pub pitch: u8,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Melody {
    pub notes: Vec<Note>,
}

impl Melody {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Combine relative durations with a pitch list.
    ///
    /// Each duration is a number of quavers; a negative value is a rest and consumes no pitch.
    ///
    /// # Examples
    /// ```
    /// use leadsheet::Melody;
    ///
    /// let melody = Melody::from_relative_durations(&[1.0, -2.0, 1.5], &[60, 64]).unwrap();
    /// assert_eq!(melody.notes.len(), 3);
    /// assert_eq!(melody.notes[1].pitch, None);
    /// assert_eq!(melody.notes[1].duration, 60);
    /// assert_eq!(melody.notes[2].pitch, Some(64));
    /// assert_eq!(melody.notes[2].duration, 45);
    /// ```
    pub fn from_relative_durations(durations: &[f64], pitches: &[u8]) -> Result<Self, LeadSheetError> {
        let mut pitches_iter = pitches.iter();
        let mut notes = Vec::with_capacity(durations.len());

        for (index, &quavers) in durations.iter().enumerate() {
            let duration = (quavers.abs() * QUAVER_DURATION as f64).round() as u32;
            if duration == 0 {
                return Err(LeadSheetError::InvalidDuration {
                    what: "note",
                    index,
                    duration,
                });
            }

            if quavers < 0.0 {
                notes.push(Note::rest(duration));
                continue;
            }
            let pitch = pitches_iter.next().ok_or_else(|| {
                LeadSheetError::Melody(format!(
                    "note {} has no pitch ({} pitches for {} notes)",
                    index,
                    pitches.len(),
                    durations.iter().filter(|d| **d > 0.0).count()
                ))
            })?;
            notes.push(Note::new(*pitch, duration));
        }

        let unused = pitches_iter.len();
        if unused > 0 {
            warn!("{} pitches left over after assembling {} notes", unused, notes.len());
        }
        Ok(Self { notes })
    }

    /// Build a melody from (pitch, duration) events; `None` pitches are rests.
    pub fn from_events<I>(events: I) -> Result<Self, LeadSheetError>
    where
        I: IntoIterator<Item = (Option<u8>, u32)>,
    {
        events
            .into_iter()
            .enumerate()
            .map(|(index, (pitch, duration))| {
                if duration == 0 {
                    Err(LeadSheetError::InvalidDuration {
                        what: "note",
                        index,
                        duration,
                    })
                } else {
                    Ok(Note { pitch, duration })
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Build a melody from timed notes, inserting rests for gaps and a final rest up to
    /// `piece_duration`. Notes must be in order and must not overlap.
    ///
    /// ```
    /// use leadsheet::{Melody, Note, TimedNote};
    ///
    /// let timed = [
    ///     TimedNote { pitch: 67, start: 30, end: 90 },
    ///     TimedNote { pitch: 65, start: 90, end: 120 },
    /// ];
    /// let melody = Melody::from_timed_notes(&timed, 240).unwrap();
    /// assert_eq!(
    ///     melody.notes,
    ///     vec![Note::rest(30), Note::new(67, 60), Note::new(65, 30), Note::rest(120)]
    /// );
    /// ```
    pub fn from_timed_notes(timed: &[TimedNote], piece_duration: u32) -> Result<Self, LeadSheetError> {
        let mut notes = Vec::with_capacity(timed.len() * 2);
        let mut elapsed = 0;

        for (index, note) in timed.iter().enumerate() {
            if note.end <= note.start {
                return Err(LeadSheetError::InvalidDuration {
                    what: "note",
                    index,
                    duration: note.end.saturating_sub(note.start),
                });
            }
            if note.start < elapsed {
                return Err(LeadSheetError::Melody(format!(
                    "note {} starts at {} before the previous note ends at {}",
                    index, note.start, elapsed
                )));
            }
            if note.start > elapsed {
                notes.push(Note::rest(note.start - elapsed));
            }
            notes.push(Note::new(note.pitch, note.end - note.start));
            elapsed = note.end;
        }

        if piece_duration > elapsed {
            notes.push(Note::rest(piece_duration - elapsed));
        }
        Ok(Self { notes })
    }

    /// The sounding notes with absolute start and end times. Rests are dropped.
    pub fn to_timed_notes(&self) -> Vec<TimedNote> {
        let mut elapsed = 0;
        let mut timed = Vec::new();
        for note in &self.notes {
            if let Some(pitch) = note.pitch {
                timed.push(TimedNote {
                    pitch,
                    start: elapsed,
                    end: elapsed + note.duration,
                });
            }
            elapsed += note.duration;
        }
        timed
    }

    pub fn total_duration(&self) -> u32 {
        self.notes.iter().map(|n| n.duration).sum()
    }
}

impl From<Melody> for Vec<Note> {
    fn from(melody: Melody) -> Self {
        melody.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_name_and_octave() {
        let note = Note::new(61, 30);
        assert_eq!(note.name(), Some("C#"));
        assert_eq!(note.octave(), Some(4));
        assert_eq!(Note::new(59, 30).octave(), Some(3));

        let rest = Note::rest(30);
        assert!(rest.is_rest());
        assert_eq!(rest.name(), None);
        assert_eq!(rest.octave(), None);
    }

    #[test]
    fn test_relative_durations_run_out_of_pitches() {
        let err = Melody::from_relative_durations(&[1.0, 1.0, 1.0], &[60, 62]).unwrap_err();
        assert!(matches!(err, LeadSheetError::Melody(_)));
    }

    #[test]
    fn test_relative_durations_reject_zero() {
        let err = Melody::from_relative_durations(&[1.0, 0.0], &[60, 62]).unwrap_err();
        assert_eq!(
            err,
            LeadSheetError::InvalidDuration {
                what: "note",
                index: 1,
                duration: 0
            }
        );
    }

    #[test]
    fn test_unused_pitches_are_not_an_error() {
        let melody = Melody::from_relative_durations(&[2.0], &[60, 62, 64]).unwrap();
        assert_eq!(melody.notes, vec![Note::new(60, 60)]);
    }

    #[test]
    fn test_triplet_quavers_round() {
        let third = 2.0 / 3.0;
        let melody = Melody::from_relative_durations(&[third, third, third], &[60, 62, 64]).unwrap();
        assert!(melody.notes.iter().all(|n| n.duration == 20));
    }

    #[test]
    fn test_from_events() {
        let melody = Melody::from_events([(Some(60), 30), (None, 30)]).unwrap();
        assert_eq!(melody.notes, vec![Note::new(60, 30), Note::rest(30)]);
        assert!(Melody::from_events([(Some(60), 0)]).is_err());
    }

    #[test]
    fn test_timed_notes_overlap_rejected() {
        let timed = [
            TimedNote { pitch: 60, start: 0, end: 60 },
            TimedNote { pitch: 62, start: 30, end: 90 },
        ];
        assert!(matches!(
            Melody::from_timed_notes(&timed, 120),
            Err(LeadSheetError::Melody(_))
        ));
    }

    #[test]
    fn test_timed_notes_inverse() {
        let melody = Melody::new(vec![
            Note::rest(30),
            Note::new(60, 60),
            Note::new(62, 30),
            Note::rest(30),
            Note::new(64, 90),
        ]);
        let timed = melody.to_timed_notes();
        assert_eq!(timed.len(), 3);
        assert_eq!(timed[2], TimedNote { pitch: 64, start: 150, end: 240 });
        assert_eq!(
            Melody::from_timed_notes(&timed, melody.total_duration()).unwrap(),
            melody
        );
    }
}
