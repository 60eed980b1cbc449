//! # Duration Validation Module
//!
//! Checks that a melody, a chord list and a bar list can be merged.
//!
//! ## Purpose
//! The merge engine assumes its three inputs cover the same span of time. It does not check
//! this itself: with mismatched totals it still terminates, but the tail of the piece is merged
//! against stale chords or bars. This pass runs before the merge and fails fast instead.
//!
//! ## Validation Rules
//!
//! ### Positive Durations
//! - Every note, chord and bar lasts at least one time unit
//!
//! ### Matching Totals
//! - The pickup precedes the first chord and the first bar, so
//!   `melody == chords + pickup == bars + pickup`
//!
//! ## Entry Point
//! `validate_durations(melody, chords, bars, pickup) -> Result<(), LeadSheetError>`
//!
//! ## Example
//! ```rust
//! use leadsheet::{validate_durations, Bar, Chord, Note};
//!
//! let melody = [Note::new(60, 30), Note::new(64, 90)];
//! let chords = [Chord::from_symbol("0.5C").unwrap()];
//! let bars = Bar::from_quavers(&[2]).unwrap();
//! validate_durations(&melody, &chords, &bars, 60).unwrap();
//! ```

use crate::bars::Bar;
use crate::chord::Chord;
use crate::error::LeadSheetError;
use crate::melody::Note;

/// Validate a piece's inputs before merging
pub fn validate_durations(
    melody: &[Note],
    chords: &[Chord],
    bars: &[Bar],
    pickup: u32,
) -> Result<(), LeadSheetError> {
    check_positive("note", melody.iter().map(|n| n.duration))?;
    check_positive("chord", chords.iter().map(|c| c.duration))?;
    check_positive("bar", bars.iter().map(|b| b.duration))?;

    let melody_total: u32 = melody.iter().map(|n| n.duration).sum();
    let chord_total: u32 = chords.iter().map(|c| c.duration).sum();
    let bar_total = crate::bars::total_duration(bars);

    if melody_total != chord_total + pickup || melody_total != bar_total + pickup {
        return Err(LeadSheetError::DurationMismatch {
            melody: melody_total,
            chords: chord_total,
            bars: bar_total,
            pickup,
        });
    }
    Ok(())
}

fn check_positive(
    what: &'static str,
    durations: impl Iterator<Item = u32>,
) -> Result<(), LeadSheetError> {
    for (index, duration) in durations.enumerate() {
        if duration == 0 {
            return Err(LeadSheetError::InvalidDuration {
                what,
                index,
                duration,
            });
        }
    }
    Ok(())
}
