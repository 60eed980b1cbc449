//! Chord type definitions
//!
//! Chord qualities, alterations, and the [`Chord`] entity that flows through the merge engine.

use serde::Serialize;

use crate::pitch::{NoteSet, PitchClass};

/// The four triads built by stacking thirds on the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Triad {
    Major,
    Minor,
    Augmented,
    Diminished,
}

impl Triad {
    pub const fn notes(self) -> NoteSet {
        match self {
            Triad::Major => NoteSet::from_intervals(&[0, 4, 7]),
            Triad::Minor => NoteSet::from_intervals(&[0, 3, 7]),
            Triad::Augmented => NoteSet::from_intervals(&[0, 4, 8]),
            Triad::Diminished => NoteSet::from_intervals(&[0, 3, 6]),
        }
    }
}

/// Seventh qualities. There is no augmented seventh (it would double the root).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Seventh {
    Major,
    Minor,
    Diminished,
}

impl Seventh {
    pub const fn interval(self) -> u8 {
        match self {
            Seventh::Major => 11,
            Seventh::Minor => 10,
            Seventh::Diminished => 9,
        }
    }
}

/// The 12 core chord qualities: a triad plus an optional seventh.
///
/// | Token | Triad | Seventh |
/// |-------|-------|---------|
/// | ``    | maj   | -       |
/// | `m`   | min   | -       |
/// | `+`   | aug   | -       |
/// | `o`   | dim   | -       |
/// | `7`   | maj   | min     |
/// | `M7`  | maj   | maj     |
/// | `m7`  | min   | min     |
/// | `mM7` | min   | maj     |
/// | `+7`  | aug   | min     |
/// | `+M7` | aug   | maj     |
/// | `o7`  | dim   | dim     |
/// | `ø7`  | dim   | min     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Quality {
    Major,
    Minor,
    Augmented,
    Diminished,
    Dominant7,
    Major7,
    Minor7,
    MinorMajor7,
    Augmented7,
    AugmentedMajor7,
    Diminished7,
    HalfDiminished7,
}

impl Quality {
    /// Naming priority: four-note qualities before triads, so the first quality whose notes
    /// are all present gives the simplest name.
    pub const NAMING_ORDER: [Quality; 12] = [
        Quality::Dominant7,
        Quality::Major7,
        Quality::Augmented7,
        Quality::AugmentedMajor7,
        Quality::Minor7,
        Quality::MinorMajor7,
        Quality::Diminished7,
        Quality::HalfDiminished7,
        Quality::Major,
        Quality::Augmented,
        Quality::Minor,
        Quality::Diminished,
    ];

    pub const fn token(self) -> &'static str {
        match self {
            Quality::Major => "",
            Quality::Minor => "m",
            Quality::Augmented => "+",
            Quality::Diminished => "o",
            Quality::Dominant7 => "7",
            Quality::Major7 => "M7",
            Quality::Minor7 => "m7",
            Quality::MinorMajor7 => "mM7",
            Quality::Augmented7 => "+7",
            Quality::AugmentedMajor7 => "+M7",
            Quality::Diminished7 => "o7",
            Quality::HalfDiminished7 => "ø7",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::NAMING_ORDER.into_iter().find(|q| q.token() == token)
    }

    pub const fn triad(self) -> Triad {
        match self {
            Quality::Major | Quality::Dominant7 | Quality::Major7 => Triad::Major,
            Quality::Minor | Quality::Minor7 | Quality::MinorMajor7 => Triad::Minor,
            Quality::Augmented | Quality::Augmented7 | Quality::AugmentedMajor7 => Triad::Augmented,
            Quality::Diminished | Quality::Diminished7 | Quality::HalfDiminished7 => {
                Triad::Diminished
            }
        }
    }

    pub const fn seventh(self) -> Option<Seventh> {
        match self {
            Quality::Dominant7 | Quality::Minor7 | Quality::Augmented7 => Some(Seventh::Minor),
            Quality::HalfDiminished7 => Some(Seventh::Minor),
            Quality::Major7 | Quality::MinorMajor7 | Quality::AugmentedMajor7 => {
                Some(Seventh::Major)
            }
            Quality::Diminished7 => Some(Seventh::Diminished),
            Quality::Major | Quality::Minor | Quality::Augmented | Quality::Diminished => None,
        }
    }

    pub const fn has_seventh(self) -> bool {
        self.seventh().is_some()
    }

    /// Core note-set: triad intervals plus the seventh, if any.
    pub const fn notes(self) -> NoteSet {
        let triad = self.triad().notes();
        match self.seventh() {
            Some(seventh) => NoteSet::from_bits(triad.bits() | 1 << seventh.interval()),
            None => triad,
        }
    }
}

/// Alteration operator preceding a scale degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlterationKind {
    /// `b<degree>`
    Flat,
    /// `#<degree>`
    Sharp,
    /// `add<degree>`
    Add,
    /// `sus<degree>`: adds the degree and drops both thirds
    Sus,
}

impl AlterationKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            AlterationKind::Flat => "b",
            AlterationKind::Sharp => "#",
            AlterationKind::Add => "add",
            AlterationKind::Sus => "sus",
        }
    }
}

/// One alteration token, e.g. `b9` or `sus4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alteration {
    pub kind: AlterationKind,
    pub degree: u8,
}

/// Chromatic interval of a scale degree. Extension degrees reuse their lower-octave interval.
///
/// ```
/// use leadsheet::chord::degree_interval;
///
/// assert_eq!(degree_interval(9), Some(2));
/// assert_eq!(degree_interval(13), Some(9));
/// assert_eq!(degree_interval(8), None);
/// ```
pub const fn degree_interval(degree: u8) -> Option<u8> {
    match degree {
        1 => Some(0),
        2 | 9 => Some(2),
        3 => Some(4),
        4 | 11 => Some(5),
        5 => Some(7),
        6 | 13 => Some(9),
        7 => Some(11),
        _ => None,
    }
}

impl Alteration {
    pub const fn new(kind: AlterationKind, degree: u8) -> Self {
        Self { kind, degree }
    }

    /// Apply this alteration to a working note-set. Unknown degrees leave the set untouched;
    /// the parser never produces them.
    pub fn apply(&self, notes: &mut NoteSet) {
        let Some(interval) = degree_interval(self.degree) else {
            return;
        };
        match self.kind {
            AlterationKind::Flat => {
                notes.remove(interval);
                notes.insert((interval + 11) % 12);
            }
            AlterationKind::Sharp => {
                notes.remove(interval);
                notes.insert((interval + 1) % 12);
            }
            AlterationKind::Add => notes.insert(interval),
            AlterationKind::Sus => {
                notes.insert(interval);
                notes.remove(3);
                notes.remove(4);
            }
        }
    }
}

/// A single chord in a progression.
///
/// # Fields
/// - `root` / `bass`: pitch classes in C (equal unless the symbol has a `/bass` part)
/// - `core_notes`: the quality's triad+seventh set; `None` for chords rebuilt from model output
/// - `full_notes`: the core set after alterations, always containing the root interval 0 when
///   built from a symbol
/// - `duration`: length in time units (quaver = 30)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chord {
    pub root: PitchClass,
    pub bass: PitchClass,
    pub core_notes: Option<NoteSet>,
    pub full_notes: NoteSet,
    pub duration: u32,
}

impl Chord {
    /// Chord from explicit values, without a known core quality.
    pub fn new(root: PitchClass, bass: PitchClass, full_notes: NoteSet, duration: u32) -> Self {
        Self {
            root: root % 12,
            bass: bass % 12,
            core_notes: None,
            full_notes,
            duration,
        }
    }
}
