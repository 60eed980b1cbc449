//! # Chord Module
//!
//! Jazz chord symbols to note-sets and back.
//!
//! ## Sub-modules
//! - `types` - Quality, Triad, Seventh, Alteration and Chord definitions
//! - `parser` - Chord symbol grammar (symbol -> [`Chord`])
//! - `naming` - Chord naming heuristic (note-set -> symbol)
//!
//! ## Symbol Format
//! Every symbol is written the same way: optional duration in minims, root, core quality,
//! alterations, optional slash bass. `Cø7`, `Cm7b5` and `C-7b5` are the same chord; only the
//! first spelling is accepted, and naming always produces it.
//!
//! ## Example
//! ```rust
//! use leadsheet::Chord;
//!
//! let chord = Chord::from_symbol("F13#11").unwrap();
//! let symbol = chord.symbol().unwrap();
//! assert_eq!(symbol, "F13#11");
//! assert_eq!(Chord::from_symbol(&symbol).unwrap().full_notes, chord.full_notes);
//! ```
//!
//! ## Round Trip
//! Naming is not the exact inverse of parsing (`Cadd9add13` comes back as `Cadd6add9`), and
//! parse -> name -> parse does not always give back the same chord. A plain triad with a
//! sharpened or flattened extension (`C#4`, `Cb6`) is named `C#11` / `Cb13`, which read as
//! sharp and flat roots. [`Chord::parseable_symbol`] only returns names that survive a
//! second parse.

mod naming;
mod parser;
mod types;


pub use naming::{chord_name, chord_symbol, ChordName};
pub use parser::{parse_chord_symbol, ChordSymbol};
pub use types::{degree_interval, Alteration, AlterationKind, Chord, Quality, Seventh, Triad};
