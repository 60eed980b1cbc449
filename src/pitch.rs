//! # Pitch-Class Vocabulary
//!
//! All chord reasoning happens in a 12-tone chromatic space, relative to the chord root
//! (positions 0-11). This module holds the named scale-degree positions, the note-name tables,
//! and [`NoteSet`], a compact set of root-relative intervals.
//!
//! ## Scale-Degree Positions
//! ```text
//! P1 0   F2 1   P2 2   S2 3   F3 3   P3 4   P4 5   S4 6
//! F5 6   P5 7   S5 8   F6 8   P6 9   D7 9   F7 10  P7 11
//! ```
//! `F` = flat, `P` = perfect/major, `S` = sharp, `D7` = diminished seventh.
//!
//! All tables are immutable constants, safe to share between threads processing different
//! pieces.

use serde::{Serialize, Serializer};
use std::fmt;

/// A pitch class, 0 (C) to 11 (B).
pub type PitchClass = u8;

pub const P1: u8 = 0;
pub const F2: u8 = 1;
pub const P2: u8 = 2;
pub const S2: u8 = 3;
pub const F3: u8 = 3;
pub const P3: u8 = 4;
pub const P4: u8 = 5;
pub const S4: u8 = 6;
pub const F5: u8 = 6;
pub const P5: u8 = 7;
pub const S5: u8 = 8;
pub const F6: u8 = 8;
pub const P6: u8 = 9;
pub const D7: u8 = 9;
pub const F7: u8 = 10;
pub const P7: u8 = 11;

/// Note names (including common enharmonic spellings) and their pitch class in C.
const NOTE_NAME_TABLE: [(&str, PitchClass); 21] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("Fb", 4),
    ("E#", 5),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
    ("Cb", 11),
    ("B#", 0),
];

/// Spelling used for chord roots and bass notes in generated chord symbols.
const FLAT_NAMES: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// Spelling used for melody note names.
const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Look up a note name such as `"C#"`, `"Db"` or `"B#"`.
///
/// # Examples
/// ```
/// use leadsheet::pitch::pitch_class_from_name;
///
/// assert_eq!(pitch_class_from_name("C#"), Some(1));
/// assert_eq!(pitch_class_from_name("Db"), Some(1));
/// assert_eq!(pitch_class_from_name("H"), None);
/// ```
pub fn pitch_class_from_name(name: &str) -> Option<PitchClass> {
    NOTE_NAME_TABLE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, pc)| *pc)
}

/// Chord-symbol spelling of a pitch class (flats).
pub fn chord_root_name(pc: PitchClass) -> &'static str {
    FLAT_NAMES[(pc % 12) as usize]
}

/// Melody spelling of a pitch class (sharps).
pub fn note_name(pc: PitchClass) -> &'static str {
    SHARP_NAMES[(pc % 12) as usize]
}

/// Note name of a MIDI pitch, e.g. 61 -> `"C#"`.
pub fn midi_note_name(pitch: u8) -> &'static str {
    note_name(pitch % 12)
}

/// MIDI octave of a pitch (C4 = 60).
pub fn midi_octave(pitch: u8) -> i8 {
    (pitch / 12) as i8 - 1
}

/// A set of root-relative intervals (0-11), stored as a 12-bit mask.
///
/// # Examples
/// ```
/// use leadsheet::pitch::NoteSet;
///
/// let triad = NoteSet::from_intervals(&[0, 4, 7]);
/// assert!(triad.contains(4));
/// assert!(triad.is_subset(&NoteSet::from_intervals(&[0, 4, 7, 10])));
/// assert_eq!(triad.iter().collect::<Vec<_>>(), vec![0, 4, 7]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoteSet(u16);

impl NoteSet {
    pub const EMPTY: NoteSet = NoteSet(0);

    const MASK: u16 = 0x0fff;

    /// Build a set from intervals; values are reduced modulo 12.
    pub const fn from_intervals(intervals: &[u8]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < intervals.len() {
            bits |= 1 << (intervals[i] % 12);
            i += 1;
        }
        NoteSet(bits)
    }

    pub const fn from_bits(bits: u16) -> Self {
        NoteSet(bits & Self::MASK)
    }

    pub const fn bits(&self) -> u16 {
        self.0
    }

    pub const fn contains(&self, interval: u8) -> bool {
        interval < 12 && self.0 & (1 << interval) != 0
    }

    pub fn insert(&mut self, interval: u8) {
        self.0 |= 1 << (interval % 12);
    }

    pub fn remove(&mut self, interval: u8) {
        self.0 &= !(1 << (interval % 12));
    }

    pub const fn union(&self, other: &NoteSet) -> NoteSet {
        NoteSet(self.0 | other.0)
    }

    pub const fn difference(&self, other: &NoteSet) -> NoteSet {
        NoteSet(self.0 & !other.0)
    }

    pub const fn is_subset(&self, other: &NoteSet) -> bool {
        self.0 & other.0 == self.0
    }

    pub const fn is_disjoint(&self, other: &NoteSet) -> bool {
        self.0 & other.0 == 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Intervals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..12u8).filter(move |i| self.contains(*i))
    }
}

impl fmt::Debug for NoteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<u8> for NoteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = NoteSet::EMPTY;
        for interval in iter {
            set.insert(interval);
        }
        set
    }
}

impl Serialize for NoteSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enharmonic_lookup() {
        assert_eq!(pitch_class_from_name("E#"), pitch_class_from_name("F"));
        assert_eq!(pitch_class_from_name("Cb"), Some(11));
        assert_eq!(pitch_class_from_name("B#"), Some(0));
        assert_eq!(pitch_class_from_name("c"), None);
    }

    #[test]
    fn test_midi_names() {
        assert_eq!(midi_note_name(60), "C");
        assert_eq!(midi_octave(60), 4);
        assert_eq!(midi_note_name(70), "A#");
        assert_eq!(midi_octave(47), 2);
    }

    #[test]
    fn test_note_set_operations() {
        let mut set = NoteSet::from_intervals(&[0, 4, 7, 10]);
        set.remove(4);
        set.insert(5);
        assert_eq!(set, NoteSet::from_intervals(&[0, 5, 7, 10]));
        assert_eq!(set.len(), 4);
        assert!(set.is_disjoint(&NoteSet::from_intervals(&[3, 4])));
        assert_eq!(
            set.difference(&NoteSet::from_intervals(&[0, 7])),
            NoteSet::from_intervals(&[5, 10])
        );
        // Wraps into the octave
        assert_eq!(NoteSet::from_intervals(&[12, 14]), NoteSet::from_intervals(&[0, 2]));
    }
}
