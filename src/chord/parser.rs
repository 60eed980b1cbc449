//! Chord symbol parsing
//!
//! Grammar, every part optional except the root:
//!
//! ```text
//! [minims] root[#|b] [quality] [alteration]* [/bass[#|b]]
//!
//! minims      := digits ['.' digits] | '.' digits      (default 1)
//! quality     := [m|+|o|ø] [M] (7|9|11|13)  |  m | + | o | ø
//! alteration  := (b|#|add|sus) degree        degree in 1-7, 9, 11, 13
//! ```
//!
//! A bare extension number in the quality (`m9`, `M13`) is rewritten to its seventh form and
//! implies an `add` for every odd degree from 9 up to the stated one. Those implied additions
//! are applied before the written alterations, so `C13#11` sharpens the eleventh instead of
//! carrying both a natural and a sharp eleventh.
//!
//! `b` and `#` directly after the root letter belong to the root when that gives a valid
//! symbol (`Cb13` is C-flat thirteen); otherwise they start an alteration (`Cb5`).

use std::iter::Peekable;
use std::str::CharIndices;

use super::types::{degree_interval, Alteration, AlterationKind, Chord, Quality};
use crate::error::LeadSheetError;
use crate::pitch::{pitch_class_from_name, PitchClass};
use crate::MINIM_DURATION;

/// A chord symbol broken into its grammatical parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordSymbol {
    pub minims: f64,
    pub root: PitchClass,
    pub quality: Quality,
    /// Additions implied by an extension number, followed by the written alterations.
    pub alterations: Vec<Alteration>,
    pub bass: Option<PitchClass>,
}

impl ChordSymbol {
    pub fn duration(&self) -> u32 {
        (self.minims * MINIM_DURATION as f64).round() as u32
    }
}

/// Parse a chord symbol into its parts.
///
/// # Examples
/// ```
/// use leadsheet::chord::{parse_chord_symbol, Quality};
///
/// let parsed = parse_chord_symbol("2Ebm9/Bb").unwrap();
/// assert_eq!(parsed.minims, 2.0);
/// assert_eq!(parsed.root, 3);
/// assert_eq!(parsed.quality, Quality::Minor7);
/// assert_eq!(parsed.alterations.len(), 1); // implied add9
/// assert_eq!(parsed.bass, Some(10));
/// ```
pub fn parse_chord_symbol(symbol: &str) -> Result<ChordSymbol, LeadSheetError> {
    match SymbolScanner::new(symbol, true).parse() {
        Ok(parsed) => Ok(parsed),
        Err(greedy_error) => SymbolScanner::new(symbol, false)
            .parse()
            .map_err(|_| greedy_error),
    }
}

impl Chord {
    /// Build a chord from its symbol, e.g. `"C13#9"`, `"0.5F#ø7"`, `"Bb7sus4/Ab"`.
    ///
    /// # Examples
    /// ```
    /// use leadsheet::{Chord, NoteSet};
    ///
    /// let chord = Chord::from_symbol("G7b9").unwrap();
    /// assert_eq!(chord.root, 7);
    /// assert_eq!(chord.full_notes, NoteSet::from_intervals(&[0, 1, 4, 7, 10]));
    /// assert_eq!(chord.duration, 120);
    /// ```
    pub fn from_symbol(symbol: &str) -> Result<Self, LeadSheetError> {
        let parsed = parse_chord_symbol(symbol)?;
        let duration = parsed.duration();
        if duration == 0 {
            return Err(LeadSheetError::chord_symbol(
                symbol,
                1,
                "chord duration must be positive",
            ));
        }

        let core_notes = parsed.quality.notes();
        let mut full_notes = core_notes;
        for alteration in &parsed.alterations {
            alteration.apply(&mut full_notes);
        }

        Ok(Self {
            root: parsed.root,
            bass: parsed.bass.unwrap_or(parsed.root),
            core_notes: Some(core_notes),
            full_notes,
            duration,
        })
    }
}

impl std::str::FromStr for Chord {
    type Err = LeadSheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chord::from_symbol(s)
    }
}

/// Single-pass scanner over one chord symbol.
struct SymbolScanner<'a> {
    symbol: &'a str,
    chars: Peekable<CharIndices<'a>>,
    column: usize,
    root_accidental: bool,
}

impl<'a> SymbolScanner<'a> {
    fn new(symbol: &'a str, root_accidental: bool) -> Self {
        Self {
            symbol,
            chars: symbol.char_indices().peekable(),
            column: 1,
            root_accidental,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        self.column += 1;
        Some(c)
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.symbol.len())
    }

    fn error(&self, message: impl Into<String>) -> LeadSheetError {
        LeadSheetError::chord_symbol(self.symbol, self.column, message)
    }

    fn unexpected(&mut self) -> LeadSheetError {
        match self.peek() {
            Some(c) => self.error(format!("unexpected '{}'", c)),
            None => self.error("unexpected end of symbol"),
        }
    }

    fn expect_literal(&mut self, literal: &str) -> Result<(), LeadSheetError> {
        for expected in literal.chars() {
            if self.peek() != Some(expected) {
                return Err(self.error(format!("expected '{}'", literal)));
            }
            self.advance();
        }
        Ok(())
    }

    fn digits(&mut self) -> &'a str {
        let start = self.offset();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let end = self.offset();
        let symbol = self.symbol;
        &symbol[start..end]
    }

    fn parse(mut self) -> Result<ChordSymbol, LeadSheetError> {
        let minims = self.parse_minims()?;
        let root = self.parse_note(self.root_accidental)?;
        let (quality, extension) = self.parse_quality()?;

        let mut alterations: Vec<Alteration> = match extension {
            Some(top) => (9..=top)
                .step_by(2)
                .map(|degree| Alteration::new(AlterationKind::Add, degree))
                .collect(),
            None => Vec::new(),
        };
        alterations.extend(self.parse_alterations()?);

        let bass = if self.peek() == Some('/') {
            self.advance();
            Some(self.parse_note(true)?)
        } else {
            None
        };

        if self.peek().is_some() {
            return Err(self.unexpected());
        }

        Ok(ChordSymbol {
            minims,
            root,
            quality,
            alterations,
            bass,
        })
    }

    fn parse_minims(&mut self) -> Result<f64, LeadSheetError> {
        let start = self.offset();
        self.digits();
        if self.peek() == Some('.') {
            self.advance();
            if self.digits().is_empty() {
                return Err(self.error("expected digits after '.' in duration"));
            }
        }
        let end = self.offset();
        if start == end {
            return Ok(1.0);
        }
        self.symbol[start..end]
            .parse::<f64>()
            .map_err(|e| self.error(format!("invalid duration: {}", e)))
    }

    fn parse_note(&mut self, accidental: bool) -> Result<PitchClass, LeadSheetError> {
        let start = self.offset();
        match self.peek() {
            Some('A'..='G') => {
                self.advance();
            }
            _ => return Err(self.error("expected a note letter A-G")),
        }
        if accidental && matches!(self.peek(), Some('#') | Some('b')) {
            self.advance();
        }
        let end = self.offset();
        let name = &self.symbol[start..end];
        pitch_class_from_name(name).ok_or_else(|| self.error(format!("unknown note '{}'", name)))
    }

    /// Returns the quality and, for `9`/`11`/`13` qualities, the extension number.
    fn parse_quality(&mut self) -> Result<(Quality, Option<u8>), LeadSheetError> {
        let mut token = String::new();
        if let Some(c @ ('m' | '+' | 'o' | 'ø')) = self.peek() {
            token.push(c);
            self.advance();
        }

        let mut extension = None;
        let major_seventh = self.peek() == Some('M');
        if major_seventh {
            token.push('M');
            self.advance();
        }
        match self.peek() {
            Some('7') => {
                self.advance();
                token.push('7');
            }
            Some('9') => {
                self.advance();
                token.push('7');
                extension = Some(9);
            }
            Some('1') => {
                self.advance();
                match self.advance() {
                    Some('1') => extension = Some(11),
                    Some('3') => extension = Some(13),
                    _ => return Err(self.error("expected 11 or 13")),
                }
                token.push('7');
            }
            _ if major_seventh => return Err(self.error("expected 7, 9, 11 or 13 after 'M'")),
            _ => {}
        }

        Quality::from_token(&token)
            .map(|quality| (quality, extension))
            .ok_or_else(|| self.error(format!("unknown chord quality '{}'", token)))
    }

    fn parse_alterations(&mut self) -> Result<Vec<Alteration>, LeadSheetError> {
        let mut alterations = Vec::new();
        loop {
            let kind = match self.peek() {
                Some('b') => {
                    self.advance();
                    AlterationKind::Flat
                }
                Some('#') => {
                    self.advance();
                    AlterationKind::Sharp
                }
                Some('a') => {
                    self.expect_literal("add")?;
                    AlterationKind::Add
                }
                Some('s') => {
                    self.expect_literal("sus")?;
                    AlterationKind::Sus
                }
                _ => return Ok(alterations),
            };

            let digits = self.digits();
            if digits.is_empty() {
                return Err(self.error(format!(
                    "expected a scale degree after '{}'",
                    kind.prefix()
                )));
            }
            let degree = digits
                .parse::<u8>()
                .ok()
                .filter(|d| degree_interval(*d).is_some())
                .ok_or_else(|| self.error(format!("unknown scale degree '{}'", digits)))?;
            if degree == 1 && matches!(kind, AlterationKind::Flat | AlterationKind::Sharp) {
                return Err(self.error("the root cannot be altered"));
            }
            alterations.push(Alteration::new(kind, degree));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::NoteSet;

    #[test]
    fn test_duration_prefix() {
        assert_eq!(Chord::from_symbol("C").unwrap().duration, 120);
        assert_eq!(Chord::from_symbol("2C").unwrap().duration, 240);
        assert_eq!(Chord::from_symbol("0.5C").unwrap().duration, 60);
        assert_eq!(Chord::from_symbol(".25C").unwrap().duration, 30);
        assert_eq!(Chord::from_symbol("1.5Dm7").unwrap().duration, 180);
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(Chord::from_symbol("0C").is_err());
    }

    #[test]
    fn test_root_accidental_backtracking() {
        // Greedy: C-flat dominant 13th
        let chord = Chord::from_symbol("Cb13").unwrap();
        assert_eq!(chord.root, 11);
        // Falls back to C with a flat fifth
        let chord = Chord::from_symbol("Cb5").unwrap();
        assert_eq!(chord.root, 0);
        assert_eq!(chord.full_notes, NoteSet::from_intervals(&[0, 4, 6]));
        // C-sharp ninth, not C with a sharp ninth
        let chord = Chord::from_symbol("C#9").unwrap();
        assert_eq!(chord.root, 1);
        assert_eq!(chord.full_notes, NoteSet::from_intervals(&[0, 2, 4, 7, 10]));
    }

    #[test]
    fn test_slash_bass() {
        let chord = Chord::from_symbol("Am7/G").unwrap();
        assert_eq!(chord.root, 9);
        assert_eq!(chord.bass, 7);
        let chord = Chord::from_symbol("F/Eb").unwrap();
        assert_eq!(chord.bass, 3);
    }

    #[test]
    fn test_extension_rewrite() {
        let parsed = parse_chord_symbol("M13").err();
        assert!(parsed.is_some(), "root is required");

        let parsed = parse_chord_symbol("CM13").unwrap();
        assert_eq!(parsed.quality, Quality::Major7);
        assert_eq!(
            parsed.alterations,
            vec![
                Alteration::new(AlterationKind::Add, 9),
                Alteration::new(AlterationKind::Add, 11),
                Alteration::new(AlterationKind::Add, 13),
            ]
        );
    }

    #[test]
    fn test_implied_additions_precede_written_alterations() {
        let parsed = parse_chord_symbol("C9sus4").unwrap();
        assert_eq!(
            parsed.alterations,
            vec![
                Alteration::new(AlterationKind::Add, 9),
                Alteration::new(AlterationKind::Sus, 4),
            ]
        );

        // The written sharp eleventh replaces the implied natural one
        let chord = Chord::from_symbol("C13#11").unwrap();
        assert_eq!(chord.full_notes, NoteSet::from_intervals(&[0, 2, 4, 6, 7, 9, 10]));
    }

    #[test]
    fn test_grammar_errors() {
        for bad in ["", "H7", "C7x", "CM", "Cadd", "Cb8", "Cadd10", "C/", "C/H", "Cad9", "C1", "oM7", "C#1", "2.C"] {
            assert!(
                matches!(parse_chord_symbol(bad), Err(LeadSheetError::ChordSymbol { .. })),
                "expected grammar error for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_error_column() {
        match parse_chord_symbol("C7x") {
            Err(LeadSheetError::ChordSymbol { column, .. }) => assert_eq!(column, 3),
            other => panic!("unexpected {:?}", other),
        }
    }
}
