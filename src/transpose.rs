//! Key normalisation: transpose a piece so that its key signature becomes C major / A minor
//!
//! Keys are identified by their signature: a count of flats or sharps, written as a code like
//! `3f` (three flats) or `2s` (two sharps), or by name (`Eb`, `Cm`, `F#`). A minor key has its
//! relative major's signature, so both `Eb` and `Cm` normalise by the same distance.

use serde::Serialize;

use crate::chord::Chord;
use crate::error::LeadSheetError;
use crate::melody::Note;
use crate::pitch::PitchClass;

/// Tonic of the major key with `n` flats, indexed by `n`.
const FLAT_TONICS: [PitchClass; 8] = [0, 5, 10, 3, 8, 1, 6, 11];

/// Tonic of the major key with `n` sharps, indexed by `n`.
const SHARP_TONICS: [PitchClass; 8] = [0, 7, 2, 9, 4, 11, 6, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidentals {
    Flats,
    Sharps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeySignature {
    pub accidentals: Accidentals,
    /// 0 to 7
    pub count: u8,
}

/// Major key names to signature; minor keys are looked up three semitones up.
fn major_key(name: &str) -> Option<KeySignature> {
    let (accidentals, count) = match name {
        "C" => (Accidentals::Sharps, 0),
        "G" => (Accidentals::Sharps, 1),
        "D" => (Accidentals::Sharps, 2),
        "A" => (Accidentals::Sharps, 3),
        "E" => (Accidentals::Sharps, 4),
        "B" => (Accidentals::Sharps, 5),
        "F#" => (Accidentals::Sharps, 6),
        "C#" => (Accidentals::Sharps, 7),
        "F" => (Accidentals::Flats, 1),
        "Bb" => (Accidentals::Flats, 2),
        "Eb" => (Accidentals::Flats, 3),
        "Ab" => (Accidentals::Flats, 4),
        "Db" => (Accidentals::Flats, 5),
        "Gb" => (Accidentals::Flats, 6),
        "Cb" => (Accidentals::Flats, 7),
        _ => return None,
    };
    Some(KeySignature { accidentals, count })
}

fn minor_key(name: &str) -> Option<KeySignature> {
    let relative_major = match name {
        "A" => "C",
        "E" => "G",
        "B" => "D",
        "F#" => "A",
        "C#" => "E",
        "G#" => "B",
        "D#" => "F#",
        "A#" => "C#",
        "D" => "F",
        "G" => "Bb",
        "C" => "Eb",
        "F" => "Ab",
        "Bb" => "Db",
        "Eb" => "Gb",
        "Ab" => "Cb",
        _ => return None,
    };
    major_key(relative_major)
}

impl KeySignature {
    pub const C_MAJOR: KeySignature = KeySignature {
        accidentals: Accidentals::Sharps,
        count: 0,
    };

    /// Parse a key code (`0`, `3f`, `2s`) or a key name (`Eb`, `Cm`, `F#m`).
    ///
    /// ```
    /// use leadsheet::KeySignature;
    ///
    /// assert_eq!(KeySignature::parse("3f").unwrap(), KeySignature::parse("Eb").unwrap());
    /// assert_eq!(KeySignature::parse("Cm").unwrap().code(), "3f");
    /// assert_eq!(KeySignature::parse("E").unwrap().distance(), 4);
    /// assert!(KeySignature::parse("H").is_err());
    /// ```
    pub fn parse(key: &str) -> Result<Self, LeadSheetError> {
        let key = key.trim();
        Self::from_code(key)
            .or_else(|| match key.strip_suffix('m') {
                Some(tonic) => minor_key(tonic),
                None => major_key(key),
            })
            .ok_or_else(|| LeadSheetError::MetadataError(format!("Unknown key: {}", key)))
    }

    /// Parse a key code: a count of 0 to 7, followed by `f` or `s` unless it is 0.
    pub fn from_code(code: &str) -> Option<Self> {
        if code == "0" {
            return Some(Self::C_MAJOR);
        }
        let accidentals = match code.chars().last()? {
            'f' => Accidentals::Flats,
            's' => Accidentals::Sharps,
            _ => return None,
        };
        let count: u8 = code[..code.len() - 1]
            .parse()
            .ok()
            .filter(|c| (1..=7).contains(c))?;
        Some(Self { accidentals, count })
    }

    pub fn code(&self) -> String {
        match (self.count, self.accidentals) {
            (0, _) => "0".to_string(),
            (n, Accidentals::Flats) => format!("{}f", n),
            (n, Accidentals::Sharps) => format!("{}s", n),
        }
    }

    /// Semitones from C up to the major tonic of this signature.
    pub fn distance(&self) -> u8 {
        let table = match self.accidentals {
            Accidentals::Flats => &FLAT_TONICS,
            Accidentals::Sharps => &SHARP_TONICS,
        };
        table[usize::from(self.count.min(7))]
    }
}

/// Shift melody pitches down by the key's distance from C.
pub fn normalise_melody(notes: &mut [Note], key: &KeySignature) -> Result<(), LeadSheetError> {
    let distance = key.distance();
    for (index, note) in notes.iter_mut().enumerate() {
        if let Some(pitch) = note.pitch {
            let shifted = pitch.checked_sub(distance).ok_or_else(|| {
                LeadSheetError::Melody(format!(
                    "note {} (pitch {}) is too low to normalise from key {}",
                    index,
                    pitch,
                    key.code()
                ))
            })?;
            note.pitch = Some(shifted);
        }
    }
    Ok(())
}

/// Move chord roots and basses by the key's distance from C. Note-sets are root-relative and
/// do not change.
pub fn normalise_chords(chords: &mut [Chord], key: &KeySignature) {
    let distance = key.distance();
    for chord in chords {
        chord.root = (chord.root + 12 - distance) % 12;
        chord.bass = (chord.bass + 12 - distance) % 12;
    }
}
