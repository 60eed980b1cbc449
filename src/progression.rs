//! # Chord Progression Module
//!
//! Unrolls a bracketed chord sequence into the chords in the order they are heard.
//!
//! ## Format
//! Whitespace-separated tokens: chord symbols and the markers `[` and `]`.
//! - `[ ... ]` at the top level is a repeated section
//! - `[ ... ]` one level inside a section is an alternate ending (first/second time bar)
//! - Endings come last in their section; nothing may follow them before the closing `]`
//! - Deeper nesting is rejected
//!
//! ```text
//! [ 2CM7 Cm7 F7 [ Dm7 G7 ] [ 2CM7 ] ] 2Dm7 2G7
//! ```
//!
//! ## Repeat Modes
//! - [`RepeatMode::Once`]: the main section once, followed by the last ending. This is the
//!   ending taken on the final pass, so the result reads like the lead sheet's last chorus.
//! - [`RepeatMode::Played`]: every pass as performed. With endings, the main section is
//!   replayed before each one; without endings the section is played twice.
//!
//! ## Example
//! ```rust
//! use leadsheet::{unroll, RepeatMode};
//!
//! let sequence = "[ A B [ C ] [ D ] ] E";
//! assert_eq!(unroll(sequence, RepeatMode::Once).unwrap(), vec!["A", "B", "D", "E"]);
//! assert_eq!(
//!     unroll(sequence, RepeatMode::Played).unwrap(),
//!     vec!["A", "B", "C", "A", "B", "D", "E"]
//! );
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::chord::Chord;
use crate::error::LeadSheetError;

/// How repeated sections are unrolled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Once,
    Played,
}

/// One top-level element of a chord sequence.
#[derive(Debug, Clone, PartialEq)]
enum Segment<'a> {
    Chord(&'a str),
    Repeat(RepeatSection<'a>),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct RepeatSection<'a> {
    main: Vec<&'a str>,
    endings: Vec<Vec<&'a str>>,
}

impl<'a> RepeatSection<'a> {
    fn unroll_into(&self, mode: RepeatMode, out: &mut Vec<&'a str>) {
        match (mode, self.endings.last()) {
            (RepeatMode::Once, last_ending) => {
                out.extend(&self.main);
                if let Some(ending) = last_ending {
                    out.extend(ending);
                }
            }
            (RepeatMode::Played, None) => {
                out.extend(&self.main);
                out.extend(&self.main);
            }
            (RepeatMode::Played, Some(_)) => {
                for ending in &self.endings {
                    out.extend(&self.main);
                    out.extend(ending);
                }
            }
        }
    }
}

fn structure_error(position: usize, message: &str) -> LeadSheetError {
    LeadSheetError::RepeatStructure {
        position,
        message: message.to_string(),
    }
}

/// Split a chord sequence into plain chords and repeated sections.
fn parse_structure(sequence: &str) -> Result<Vec<Segment<'_>>, LeadSheetError> {
    let mut segments = Vec::new();
    let mut section: Option<RepeatSection> = None;
    let mut ending: Option<Vec<&str>> = None;
    let mut position = 0;

    for token in sequence.split_whitespace() {
        match token {
            "[" => match (section.is_some(), ending.is_some()) {
                (false, _) => section = Some(RepeatSection::default()),
                (true, false) => ending = Some(Vec::new()),
                (true, true) => {
                    return Err(structure_error(
                        position,
                        "repeats can be nested at most one level deep",
                    ))
                }
            },
            "]" => {
                if let Some(tokens) = ending.take() {
                    if tokens.is_empty() {
                        return Err(structure_error(position, "empty alternate ending"));
                    }
                    if let Some(open) = section.as_mut() {
                        open.endings.push(tokens);
                    }
                } else if let Some(closed) = section.take() {
                    if closed.main.is_empty() && closed.endings.is_empty() {
                        return Err(structure_error(position, "empty repeated section"));
                    }
                    segments.push(Segment::Repeat(closed));
                } else {
                    return Err(structure_error(position, "']' without a matching '['"));
                }
            }
            chord => {
                if let Some(tokens) = ending.as_mut() {
                    tokens.push(chord);
                } else if let Some(open) = section.as_mut() {
                    if !open.endings.is_empty() {
                        return Err(structure_error(
                            position,
                            "chords cannot follow an alternate ending inside its section",
                        ));
                    }
                    open.main.push(chord);
                } else {
                    segments.push(Segment::Chord(chord));
                }
            }
        }
        position += 1;
    }

    if section.is_some() {
        return Err(structure_error(position, "unclosed '['"));
    }
    Ok(segments)
}

/// Unroll a chord sequence into chord-symbol tokens in playing order.
pub fn unroll(sequence: &str, mode: RepeatMode) -> Result<Vec<&str>, LeadSheetError> {
    let mut symbols = Vec::new();
    for segment in parse_structure(sequence)? {
        match segment {
            Segment::Chord(symbol) => symbols.push(symbol),
            Segment::Repeat(section) => section.unroll_into(mode, &mut symbols),
        }
    }
    Ok(symbols)
}

/// The chords of a piece in playing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordProgression {
    pub chords: Vec<Chord>,
}

impl ChordProgression {
    /// Unroll and parse a chord sequence.
    ///
    /// ```
    /// use leadsheet::{ChordProgression, RepeatMode};
    ///
    /// let progression = ChordProgression::parse("[ 2Dm7 G7 ] 2CM7", RepeatMode::Played).unwrap();
    /// assert_eq!(progression.chords.len(), 5);
    /// assert_eq!(progression.total_duration(), 960);
    /// ```
    pub fn parse(sequence: &str, mode: RepeatMode) -> Result<Self, LeadSheetError> {
        let chords = unroll(sequence, mode)?
            .into_iter()
            .map(Chord::from_symbol)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("unrolled {} chords ({:?} repeats)", chords.len(), mode);
        Ok(Self { chords })
    }

    pub fn total_duration(&self) -> u32 {
        self.chords.iter().map(|c| c.duration).sum()
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}

impl From<ChordProgression> for Vec<Chord> {
    fn from(progression: ChordProgression) -> Self {
        progression.chords
    }
}
