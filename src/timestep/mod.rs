//! # Timestep Module
//!
//! Merge a melody, a chord progression and a bar structure into one sequence of timesteps.
//!
//! ## Purpose
//! The three inputs are timed independently: notes split wherever the rhythm changes, chords
//! wherever the harmony changes, bars at fixed lengths. A [`Timestep`] starts whenever any of
//! the three changes, so timesteps vary in length but never cross a barline. A note held across
//! a barline becomes two timesteps, the second flagged `same_note`.
//!
//! ## Sub-modules
//! - `types` - Timestep definition
//! - `engine` - The merge scan ([`merge`], [`Merge`])
//! - `piece` - [`Piece`], which owns the inputs and the merged result
//!
//! ## Example
//! ```rust
//! use leadsheet::{Bar, Chord, Note, Piece};
//!
//! // A crotchet pickup, then one 2/4 bar with a note tied over from the pickup's second quaver
//! let melody = vec![Note::new(67, 30), Note::new(64, 90), Note::new(60, 60)];
//! let chords = vec![Chord::from_symbol("C").unwrap()];
//! let bars = Bar::from_quavers(&[4]).unwrap();
//!
//! let piece = Piece::new(melody, chords, bars, 60).unwrap();
//! let shape: Vec<_> = piece
//!     .timesteps
//!     .iter()
//!     .map(|t| (t.pitch, t.duration, t.same_note, t.is_barline))
//!     .collect();
//! assert_eq!(
//!     shape,
//!     vec![
//!         (Some(67), 30, false, false),
//!         (Some(64), 30, false, false),
//!         (Some(64), 60, true, true),
//!         (Some(60), 60, false, false),
//!     ]
//! );
//! assert_eq!(piece.timesteps[0].root, None); // no chord during the pickup
//! ```
//!
//! ## Invariants
//! - Sum of timestep durations == bar total + pickup (for validated pieces)
//! - Timesteps with `is_barline` == number of bars
//! - A `same_note` timestep has the same pitch as the one before it

mod engine;
mod piece;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{merge, Merge};
pub use piece::Piece;
pub use types::Timestep;
