//! # Error Types
//!
//! This module defines all error types for the lead-sheet codec.
//!
//! Every error carries enough location information (symbol and column, token position,
//! timestep index) to find the offending input.
//!
//! ## Error Types
//! - `ChordSymbol` - A chord symbol does not match the chord grammar
//! - `RepeatStructure` - Unbalanced or too deeply nested `[` `]` markers in a chord sequence
//! - `DurationMismatch` - Melody, chord and bar totals disagree (pre-merge validation)
//! - `InvalidDuration` - A zero-length note, chord or bar
//! - `Melody` - A melody could not be assembled from its inputs
//! - `Encoding` / `Decoding` - Timestep vector codec failures
//! - `MetadataError` - Invalid YAML lead-sheet document
//!
//! An unnameable chord note-set is not an error: [`crate::chord::chord_name`] returns `None`.
//!
//! ## Usage
//! ```rust
//! use leadsheet::{Chord, LeadSheetError};
//!
//! match Chord::from_symbol("H7") {
//!     Ok(chord) => println!("root {}", chord.root),
//!     Err(LeadSheetError::ChordSymbol { column, message, .. }) => {
//!         eprintln!("bad chord at column {}: {}", column, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LeadSheetError {
    /// Chord grammar error with location information.
    ///
    /// # Example
    /// ```
    /// # use leadsheet::LeadSheetError;
    /// let err = LeadSheetError::ChordSymbol {
    ///     symbol: "Cx7".to_string(),
    ///     column: 2,
    ///     message: "unexpected 'x'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid chord symbol 'Cx7' at column 2: unexpected 'x'");
    /// ```
    #[error("Invalid chord symbol '{symbol}' at column {column}: {message}")]
    ChordSymbol {
        symbol: String,
        column: usize,
        message: String,
    },

    /// Bracket structure error in a chord sequence. `position` is the 0-based token index.
    #[error("Invalid repeat structure at token {position}: {message}")]
    RepeatStructure { position: usize, message: String },

    /// The three input sequences do not cover the same span of time.
    ///
    /// # Example
    /// ```
    /// # use leadsheet::LeadSheetError;
    /// let err = LeadSheetError::DurationMismatch { melody: 240, chords: 120, bars: 240, pickup: 0 };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Duration mismatch: melody 240, chords 120 + pickup 0, bars 240 + pickup 0"
    /// );
    /// ```
    #[error("Duration mismatch: melody {melody}, chords {chords} + pickup {pickup}, bars {bars} + pickup {pickup}")]
    DurationMismatch {
        melody: u32,
        chords: u32,
        bars: u32,
        pickup: u32,
    },

    /// A note, chord or bar with a zero duration.
    #[error("Invalid duration for {what} {index}: {duration}")]
    InvalidDuration {
        what: &'static str,
        index: usize,
        duration: u32,
    },

    #[error("Invalid melody: {0}")]
    Melody(String),

    /// A timestep that cannot be represented as a vector row.
    #[error("Cannot encode timestep {index}: {message}")]
    Encoding { index: usize, message: String },

    /// A vector row or decoded timestep sequence that cannot be turned back into music.
    #[error("Cannot decode timestep {index}: {message}")]
    Decoding { index: usize, message: String },

    /// Invalid YAML lead-sheet document.
    #[error("Invalid metadata: {0}")]
    MetadataError(String),
}

impl LeadSheetError {
    pub(crate) fn chord_symbol(symbol: &str, column: usize, message: impl Into<String>) -> Self {
        LeadSheetError::ChordSymbol {
            symbol: symbol.to_string(),
            column,
            message: message.into(),
        }
    }
}
