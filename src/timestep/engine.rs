//! Timestep merge engine
//!
//! A three-way scan over the note, chord and bar sequences. Each sequence has a cursor holding
//! its current item and the time left on it. Every step emits one timestep lasting until the
//! earliest cursor runs out, then moves every finished cursor on to its next item.
//!
//! The pickup is modelled as extra time on the chord and bar cursors before their first item,
//! so during the pickup there is no chord and no bar number.
//!
//! Totals are expected to agree (`melody == chords + pickup == bars + pickup`). When they do
//! not, a sequence that runs out first keeps its last item for the remaining timesteps (its
//! note counts as tied) and the scan stops once every sequence is used up.

use log::{debug, warn};

use super::types::Timestep;
use crate::bars::Bar;
use crate::chord::Chord;
use crate::melody::Note;

/// Anything with a length in time units.
pub(crate) trait Timed {
    fn duration(&self) -> u32;
}

impl Timed for Note {
    fn duration(&self) -> u32 {
        self.duration
    }
}

impl Timed for Chord {
    fn duration(&self) -> u32 {
        self.duration
    }
}

impl Timed for Bar {
    fn duration(&self) -> u32 {
        self.duration
    }
}

#[derive(Debug)]
struct Cursor<'a, T> {
    items: &'a [T],
    next: usize,
    current: Option<&'a T>,
    remaining: u32,
}

impl<'a, T: Timed> Cursor<'a, T> {
    fn new(items: &'a [T]) -> Self {
        Self {
            items,
            next: 0,
            current: None,
            remaining: 0,
        }
    }

    /// Time left on the current item, or items still to come.
    fn is_pending(&self) -> bool {
        self.remaining > 0 || self.next < self.items.len()
    }

    /// `None` once the last item has run out.
    fn time_left(&self) -> Option<u32> {
        (self.remaining > 0).then_some(self.remaining)
    }

    /// Spend `step` units, loading the next item if the current one is finished.
    /// Returns whether a new item was loaded.
    fn consume(&mut self, step: u32) -> bool {
        self.remaining = self.remaining.saturating_sub(step);
        let mut advanced = false;
        while self.remaining == 0 && self.next < self.items.len() {
            let item = &self.items[self.next];
            self.next += 1;
            self.current = Some(item);
            self.remaining = item.duration();
            advanced = true;
        }
        advanced
    }
}

/// Iterator over merged timesteps. Use [`merge`] to collect them.
#[derive(Debug)]
pub struct Merge<'a> {
    notes: Cursor<'a, Note>,
    chords: Cursor<'a, Chord>,
    bars: Cursor<'a, Bar>,
    pickup: u32,
    started: bool,
    note_advanced: bool,
    bar_advanced: bool,
    warned_stale: bool,
}

impl<'a> Merge<'a> {
    pub fn new(melody: &'a [Note], chords: &'a [Chord], bars: &'a [Bar], pickup: u32) -> Self {
        Self {
            notes: Cursor::new(melody),
            chords: Cursor::new(chords),
            bars: Cursor::new(bars),
            pickup,
            started: false,
            note_advanced: false,
            bar_advanced: false,
            warned_stale: false,
        }
    }

    fn is_pending(&self) -> bool {
        self.notes.is_pending() || self.chords.is_pending() || self.bars.is_pending()
    }

    fn advance(&mut self, step: u32) {
        self.note_advanced = self.notes.consume(step);
        self.chords.consume(step);
        self.bar_advanced = self.bars.consume(step);
    }

    fn emit(&mut self, step: u32) -> Timestep {
        let stale = self.notes.time_left().is_none()
            || self.chords.time_left().is_none()
            || self.bars.time_left().is_none();
        if stale && !self.warned_stale {
            warn!(
                "sequence durations disagree: merging with an exhausted sequence (notes {}/{}, chords {}/{}, bars {}/{})",
                self.notes.next,
                self.notes.items.len(),
                self.chords.next,
                self.chords.items.len(),
                self.bars.next,
                self.bars.items.len()
            );
            self.warned_stale = true;
        }

        let note = self.notes.current;
        let chord = self.chords.current;
        let mut timestep = Timestep::new(
            note.and_then(|n| n.pitch),
            chord,
            step,
            !self.note_advanced,
            self.bar_advanced,
        )
        .with_note(note);
        timestep.bar_number = self.bars.current.map(|b| b.number);
        timestep.core_notes = chord.and_then(|c| c.core_notes);
        timestep
    }
}

impl Iterator for Merge<'_> {
    type Item = Timestep;

    fn next(&mut self) -> Option<Timestep> {
        loop {
            if !self.is_pending() {
                return None;
            }

            let step = [
                self.notes.time_left(),
                self.chords.time_left(),
                self.bars.time_left(),
            ]
            .into_iter()
            .flatten()
            .min();

            let Some(step) = step else {
                // Every cursor is between items: only at the start, or after zero-length items
                if !self.started && self.pickup > 0 {
                    self.chords.remaining = self.pickup;
                    self.bars.remaining = self.pickup;
                }
                self.started = true;
                self.advance(0);
                continue;
            };

            self.started = true;
            let timestep = self.emit(step);
            self.advance(step);
            return Some(timestep);
        }
    }
}

/// Merge the three timed sequences into timesteps.
///
/// # Examples
/// ```
/// use leadsheet::{merge, Bar, Chord, Note};
///
/// let melody = [Note::new(60, 30), Note::new(62, 30)];
/// let chords = [Chord::from_symbol("0.25C").unwrap(), Chord::from_symbol("0.25G7").unwrap()];
/// let bars = Bar::from_quavers(&[2]).unwrap();
///
/// let timesteps = merge(&melody, &chords, &bars, 0);
/// assert_eq!(timesteps.len(), 2);
/// assert!(timesteps[0].is_barline);
/// assert_eq!(timesteps[1].pitch, Some(62));
/// assert_eq!(timesteps[1].root, Some(7));
/// ```
pub fn merge(melody: &[Note], chords: &[Chord], bars: &[Bar], pickup: u32) -> Vec<Timestep> {
    let timesteps: Vec<Timestep> = Merge::new(melody, chords, bars, pickup).collect();
    debug!(
        "merged {} notes, {} chords, {} bars (pickup {}) into {} timesteps",
        melody.len(),
        chords.len(),
        bars.len(),
        pickup,
        timesteps.len()
    );
    timesteps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_skips_zero_length_items() {
        let notes = [Note::new(60, 0), Note::new(62, 30)];
        let mut cursor = Cursor::new(&notes);
        assert!(cursor.consume(0));
        assert_eq!(cursor.current, Some(&notes[1]));
        assert_eq!(cursor.remaining, 30);
        assert!(!cursor.consume(10));
        assert!(!cursor.consume(20));
        assert!(!cursor.is_pending());
        assert_eq!(cursor.current, Some(&notes[1]));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge(&[], &[], &[], 0).is_empty());
        assert!(merge(&[], &[], &[], 60).is_empty());
    }
}
