//! # Vector Module
//!
//! Fixed-width rows for a sequence model, and the way back to symbolic music.
//!
//! ## Row Layout (width 100)
//! | Field    | Offset | Width | Encoding                                           |
//! |----------|--------|-------|----------------------------------------------------|
//! | pitch    | 0      | 38    | one-hot: `pitch - 48` (0-35), tie = 36, rest = 37  |
//! | root     | 38     | 13    | one-hot: pitch class, 12 = no chord                |
//! | bass     | 51     | 13    | one-hot: pitch class, 12 = no chord                |
//! | chord    | 64     | 12    | multi-hot: one entry per interval in the note-set  |
//! | duration | 76     | 24    | one-hot: `duration / 10 - 1` (10 to 240)           |
//!
//! Decoding takes the first maximum of each one-hot field and every nonzero chord entry. An
//! all-zero chord field means "no chord" only when the root field says so; with a root it is a
//! chord whose note-set is empty.
//!
//! Barlines are not encoded. A timestep never crosses a barline, so a decoded sequence gets
//! them back from a [`BarGrid`] (pickup length and bar length).
//!
//! ## Sub-modules
//! - `codec` - one timestep <-> one row
//! - `reassembly` - decoded timesteps -> melody, chords and bars ([`DecodedPiece`])
//!
//! ## Example
//! ```rust
//! use leadsheet::vector::{decode_batch, encode_piece, BarGrid};
//! use leadsheet::{Bar, ChordProgression, Melody, Piece, RepeatMode};
//!
//! let melody = Melody::from_relative_durations(&[-1.0, 3.0, 4.0], &[64, 62]).unwrap();
//! let chords = ChordProgression::parse("Dm7 G7", RepeatMode::Once).unwrap();
//! let piece = Piece::new(melody.into(), chords.into(), Bar::from_quavers(&[8]).unwrap(), 0).unwrap();
//!
//! let rows = encode_piece(&piece).unwrap();
//! let decoded = decode_batch(&[rows], &BarGrid::new(0, 240)).unwrap();
//! assert_eq!(decoded[0].chord_sequence().as_deref(), Some("Dm7 G7"));
//! assert_eq!(decoded[0].melody, piece.melody);
//! ```

mod codec;
mod reassembly;

pub use codec::{decode_row, decode_rows, encode_piece, encode_timestep, TimestepVector};
pub use reassembly::{decode_batch, reassemble, BarGrid, ChordSpan, DecodedPiece, NO_CHORD_SYMBOL};

pub const VECTOR_WIDTH: usize = 100;

pub const PITCH_OFFSET: u8 = 48;
pub const PITCH_RANGE: u8 = 36;
pub const TIE_INDEX: usize = 36;
pub const REST_INDEX: usize = 37;

pub const ROOT_OFFSET: usize = 38;
pub const BASS_OFFSET: usize = 51;
/// Class index meaning "no chord" in the root and bass fields.
pub const NO_CHORD: usize = 12;

pub const CHORD_OFFSET: usize = 64;
pub const DURATION_OFFSET: usize = 76;
pub const DURATION_STEP: u32 = 10;
pub const MAX_DURATION: u32 = 240;
