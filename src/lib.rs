//! # leadsheet
//!
//! Jazz lead sheets (a melody, a chord progression and a bar structure, each timed on its own)
//! merged into one sequence of fixed-format timesteps, encoded as vectors for a sequence model,
//! and decoded back into symbolic notation.
//!
//! ## Pipeline
//! 1. `chord` - chord symbols to note-sets and back
//! 2. `progression` - bracketed repeat structure unrolled into a flat chord list
//! 3. `melody` / `bars` - the other two timed sequences
//! 4. `timestep` - three-way merge into [`Timestep`]s, owned by a [`Piece`]
//! 5. `vector` - 100-wide rows for the model, and reassembly of sampled rows
//!
//! `sheet` reads a YAML lead-sheet document, `transpose` normalises it to C, and `musicxml`
//! renders a piece for notation software.
//!
//! ## Example
//! ```rust
//! let source = r#"
//! title: Two Quavers
//! chords: "0.25C 0.25G7"
//! notes: [1, 1]
//! pitches: [60, 62]
//! bars: [2]
//! "#;
//!
//! let rows = leadsheet::encode(source).unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].len(), leadsheet::vector::VECTOR_WIDTH);
//! ```

pub mod bars;
pub mod chord;
pub mod error;
pub mod melody;
pub mod musicxml;
pub mod pitch;
pub mod progression;
pub mod semantic;
pub mod sheet;
pub mod timestep;
pub mod transpose;
pub mod vector;

pub use bars::Bar;
pub use chord::{Chord, ChordName, Quality};
pub use error::*;
pub use melody::{Melody, Note, TimedNote};
pub use musicxml::to_musicxml;
pub use pitch::{NoteSet, PitchClass};
pub use progression::{unroll, ChordProgression, RepeatMode};
pub use semantic::validate_durations;
pub use sheet::{parse_lead_sheet, parse_lead_sheet_unchecked, LeadSheet};
pub use timestep::{merge, Piece, Timestep};
pub use transpose::KeySignature;
pub use vector::{
    decode_batch, decode_rows, encode_piece, reassemble, ChordSpan, DecodedPiece, TimestepVector,
};

/// Time units in a quaver, the most common subdivision.
pub const QUAVER_DURATION: u32 = 30;

/// Time units in a minim, the unit of chord-symbol duration prefixes.
pub const MINIM_DURATION: u32 = 4 * QUAVER_DURATION;

/// Encode a YAML lead sheet into model rows, one per timestep.
/// This is the main entry point for the library.
pub fn encode(source: &str) -> Result<Vec<TimestepVector>, LeadSheetError> {
    let piece = parse_lead_sheet(source)?;
    encode_piece(&piece)
}

/// Encode without duration validation (useful for sheets whose totals are known to disagree)
pub fn encode_unchecked(source: &str) -> Result<Vec<TimestepVector>, LeadSheetError> {
    let piece = parse_lead_sheet_unchecked(source)?;
    encode_piece(&piece)
}

/// Render a YAML lead sheet as MusicXML.
pub fn compile(source: &str) -> Result<String, LeadSheetError> {
    let piece = parse_lead_sheet(source)?;
    Ok(to_musicxml(&piece))
}
