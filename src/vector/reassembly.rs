//! Timestep reassembly: decoded rows back into melody, chords and bars

use log::{debug, warn};
use serde::Serialize;

use super::codec::decode_rows;
use crate::bars::Bar;
use crate::chord::Chord;
use crate::error::LeadSheetError;
use crate::melody::Note;
use crate::timestep::{Piece, Timestep};
use crate::MINIM_DURATION;

/// Where barlines fall in a decoded sequence: after `pickup` time units, then every
/// `bar_duration` units. Vector rows do not carry barlines, so sampled output needs a metre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGrid {
    pub pickup: u32,
    pub bar_duration: u32,
}

impl BarGrid {
    pub fn new(pickup: u32, bar_duration: u32) -> Self {
        Self {
            pickup,
            bar_duration,
        }
    }

    /// Set `is_barline` and `bar_number` from each timestep's start time. A timestep that
    /// straddles a barline does not start a bar.
    pub fn mark_barlines(&self, timesteps: &mut [Timestep]) {
        let mut start: u32 = 0;
        for timestep in timesteps {
            let into_bars = start.checked_sub(self.pickup).filter(|_| self.bar_duration > 0);
            timestep.is_barline = into_bars.is_some_and(|t| t % self.bar_duration == 0);
            timestep.bar_number = into_bars.map(|t| (t / self.bar_duration) as usize);
            start += timestep.duration;
        }
    }
}

/// Symbol shown for a span with no chord.
pub const NO_CHORD_SYMBOL: &str = "N.C.";

/// One run of the decoded chord stream: a chord, or a stretch of time with none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChordSpan {
    Chord(Chord),
    /// `timestep` is the index of the first decoded timestep in the span.
    NoChord { timestep: usize, duration: u32 },
}

impl ChordSpan {
    pub fn duration(&self) -> u32 {
        match self {
            ChordSpan::Chord(chord) => chord.duration,
            ChordSpan::NoChord { duration, .. } => *duration,
        }
    }

    pub fn chord(&self) -> Option<&Chord> {
        match self {
            ChordSpan::Chord(chord) => Some(chord),
            ChordSpan::NoChord { .. } => None,
        }
    }
}

/// A piece rebuilt from decoded timesteps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPiece {
    /// Time before the first barline.
    pub pickup: u32,
    pub melody: Vec<Note>,
    /// Chords and no-chord gaps after the pickup, covering the same time as the bars.
    pub chords: Vec<ChordSpan>,
    pub bars: Vec<Bar>,
}

impl DecodedPiece {
    /// Chord names: [`NO_CHORD_SYMBOL`] for a gap, `None` where the note-set is not a valid
    /// chord.
    pub fn chord_symbols(&self) -> Vec<Option<String>> {
        self.chords
            .iter()
            .map(|span| match span {
                ChordSpan::Chord(chord) => chord.symbol(),
                ChordSpan::NoChord { .. } => Some(NO_CHORD_SYMBOL.to_string()),
            })
            .collect()
    }

    /// Total time covered by the chord spans.
    pub fn chord_duration(&self) -> u32 {
        self.chords.iter().map(ChordSpan::duration).sum()
    }

    /// The chords as a chord-sequence string with minim duration prefixes, ready to be parsed
    /// again. `None` if the stream has a no-chord gap or a chord whose name would not parse
    /// back to the same chord.
    ///
    /// ```
    /// use leadsheet::vector::reassemble;
    /// use leadsheet::{Chord, Timestep};
    ///
    /// let dm7 = Chord::from_symbol("Dm7").unwrap();
    /// let g7 = Chord::from_symbol("G7").unwrap();
    /// let timesteps = [
    ///     Timestep::new(Some(62), Some(&dm7), 240, false, true),
    ///     Timestep::new(Some(65), Some(&g7), 60, false, true),
    /// ];
    /// let decoded = reassemble(&timesteps).unwrap();
    /// assert_eq!(decoded.chord_sequence().as_deref(), Some("2Dm7 0.5G7"));
    /// ```
    pub fn chord_sequence(&self) -> Option<String> {
        let symbols = self
            .chords
            .iter()
            .map(|span| {
                let chord = span.chord()?;
                let symbol = chord.parseable_symbol()?;
                Some(match chord.duration {
                    MINIM_DURATION => symbol,
                    d => format!("{}{}", d as f64 / MINIM_DURATION as f64, symbol),
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Some(symbols.join(" "))
    }

    /// Merge the decoded sequences again. Fails on a no-chord gap, which the merge cannot
    /// represent, and when a chord spans the pickup, since the merge models the pickup as time
    /// before the first chord.
    pub fn to_piece(&self) -> Result<Piece, LeadSheetError> {
        let chords = self
            .chords
            .iter()
            .map(|span| match span {
                ChordSpan::Chord(chord) => Ok(chord.clone()),
                ChordSpan::NoChord { timestep, duration } => Err(LeadSheetError::Decoding {
                    index: *timestep,
                    message: format!("{} time units without a chord cannot be merged", duration),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Piece::new(self.melody.clone(), chords, self.bars.clone(), self.pickup)
    }
}

/// Run-length merge of decoded timesteps.
///
/// - A note starts on every timestep that is not `same_note`; ties extend it
/// - A chord starts whenever (root, bass, notes) changes
/// - Time with no chord before the first barline and the first chord is pickup; any other
///   stretch without a chord becomes a [`ChordSpan::NoChord`] gap
/// - A bar starts on every `is_barline`; time before the first barline is the pickup
///
/// The first timestep must not be a tie.
pub fn reassemble(timesteps: &[Timestep]) -> Result<DecodedPiece, LeadSheetError> {
    let mut decoded = DecodedPiece::default();
    let Some(first) = timesteps.first() else {
        return Ok(decoded);
    };
    if first.same_note {
        return Err(LeadSheetError::Decoding {
            index: 0,
            message: "first timestep is tied to a note that does not exist".to_string(),
        });
    }

    for (index, timestep) in timesteps.iter().enumerate() {
        let duration = timestep.duration;

        match decoded.melody.last_mut() {
            Some(note) if timestep.same_note => note.duration += duration,
            _ => decoded.melody.push(Note {
                pitch: timestep.pitch,
                duration,
            }),
        }

        let in_pickup = !timestep.is_barline && decoded.bars.is_empty();
        if timestep.is_barline {
            decoded.bars.push(Bar::new(decoded.bars.len(), duration));
        } else if let Some(bar) = decoded.bars.last_mut() {
            bar.duration += duration;
        } else {
            decoded.pickup += duration;
        }

        let chord = timestep.root.map(|root| {
            let bass = timestep.bass.unwrap_or_else(|| {
                warn!("timestep {} has root {} but no bass; using the root", index, root);
                root
            });
            (root, bass, timestep.notes)
        });
        match (chord, decoded.chords.last_mut()) {
            (Some(key), Some(ChordSpan::Chord(last)))
                if (last.root, last.bass, last.full_notes) == key =>
            {
                last.duration += duration
            }
            (Some((root, bass, notes)), _) => decoded
                .chords
                .push(ChordSpan::Chord(Chord::new(root, bass, notes, duration))),
            (None, None) if in_pickup => {}
            (None, Some(ChordSpan::NoChord { duration: gap, .. })) => *gap += duration,
            (None, _) => decoded.chords.push(ChordSpan::NoChord {
                timestep: index,
                duration,
            }),
        }
    }

    debug!(
        "reassembled {} timesteps into {} notes, {} chord spans, {} bars",
        timesteps.len(),
        decoded.melody.len(),
        decoded.chords.len(),
        decoded.bars.len()
    );
    Ok(decoded)
}

/// Decode a batch of sampled pieces, each a sequence of rows.
pub fn decode_batch<R: AsRef<[f32]>>(
    batch: &[Vec<R>],
    grid: &BarGrid,
) -> Result<Vec<DecodedPiece>, LeadSheetError> {
    batch
        .iter()
        .map(|rows| {
            let mut timesteps = decode_rows(rows)?;
            grid.mark_barlines(&mut timesteps);
            reassemble(&timesteps)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::NoteSet;

    fn chord(symbol: &str) -> Chord {
        Chord::from_symbol(symbol).unwrap()
    }

    #[test]
    fn test_first_tie_is_fatal() {
        let c = chord("C");
        let timesteps = [Timestep::new(None, Some(&c), 30, true, true)];
        assert!(matches!(
            reassemble(&timesteps),
            Err(LeadSheetError::Decoding { index: 0, .. })
        ));
    }

    #[test]
    fn test_runs_are_coalesced() {
        let c = chord("C");
        let f = chord("F");
        let timesteps = [
            Timestep::new(Some(60), Some(&c), 60, false, true),
            Timestep::new(None, Some(&c), 60, true, false),
            Timestep::new(Some(65), Some(&f), 30, false, true),
            Timestep::new(None, Some(&f), 30, false, false),
            Timestep::new(Some(60), Some(&c), 60, false, false),
        ];
        let decoded = reassemble(&timesteps).unwrap();
        assert_eq!(
            decoded.melody,
            vec![Note::new(60, 120), Note::new(65, 30), Note::rest(30), Note::new(60, 60)]
        );
        assert_eq!(
            decoded
                .chords
                .iter()
                .map(|span| span.chord().map(|c| (c.root, c.duration)))
                .collect::<Vec<_>>(),
            vec![Some((0, 120)), Some((5, 60)), Some((0, 60))]
        );
        assert_eq!(decoded.bars, vec![Bar::new(0, 120), Bar::new(1, 120)]);
        assert_eq!(decoded.pickup, 0);
    }

    #[test]
    fn test_pickup_without_chord() {
        let c = chord("C");
        let timesteps = [
            Timestep::new(Some(67), None, 30, false, false),
            Timestep::new(Some(60), Some(&c), 240, false, true),
        ];
        let decoded = reassemble(&timesteps).unwrap();
        assert_eq!(decoded.pickup, 30);
        assert_eq!(decoded.chords.len(), 1);
        assert_eq!(decoded.bars, vec![Bar::new(0, 240)]);

        let piece = decoded.to_piece().unwrap();
        assert_eq!(piece.timesteps.len(), 2);
    }

    #[test]
    fn test_same_chord_after_gap_starts_again() {
        let c = chord("C");
        let timesteps = [
            Timestep::new(Some(60), Some(&c), 30, false, true),
            Timestep::new(Some(62), None, 30, false, false),
            Timestep::new(Some(64), Some(&c), 30, false, false),
        ];
        let decoded = reassemble(&timesteps).unwrap();
        assert_eq!(decoded.chords.len(), 3);
        assert_eq!(decoded.chords[1], ChordSpan::NoChord { timestep: 1, duration: 30 });
    }

    #[test]
    fn test_gap_keeps_its_time() {
        let c = chord("C");
        let g7 = chord("G7");
        let timesteps = [
            Timestep::new(Some(60), Some(&c), 60, false, true),
            Timestep::new(Some(62), None, 60, false, false),
            Timestep::new(None, None, 30, true, false),
            Timestep::new(Some(67), Some(&g7), 90, false, false),
        ];
        let decoded = reassemble(&timesteps).unwrap();
        assert_eq!(decoded.pickup, 0);
        assert_eq!(decoded.chord_duration(), 240);
        assert_eq!(
            decoded.chords.iter().map(ChordSpan::duration).collect::<Vec<_>>(),
            vec![60, 90, 90]
        );
        assert_eq!(
            decoded.chord_symbols(),
            vec![Some("C".to_string()), Some(NO_CHORD_SYMBOL.to_string()), Some("G7".to_string())]
        );
        assert_eq!(decoded.chord_sequence(), None);
        assert!(matches!(
            decoded.to_piece(),
            Err(LeadSheetError::Decoding { index: 1, .. })
        ));
    }

    #[test]
    fn test_no_chord_after_pickup_is_a_gap() {
        let c = chord("C");
        let timesteps = [
            Timestep::new(Some(67), None, 30, false, false),
            Timestep::new(Some(60), None, 120, false, true),
            Timestep::new(Some(64), Some(&c), 120, false, false),
        ];
        let decoded = reassemble(&timesteps).unwrap();
        assert_eq!(decoded.pickup, 30);
        assert_eq!(decoded.chords.len(), 2);
        assert_eq!(decoded.chords[0], ChordSpan::NoChord { timestep: 1, duration: 120 });
        assert_eq!(decoded.chord_duration(), 240);
        assert_eq!(decoded.bars, vec![Bar::new(0, 240)]);
    }

    #[test]
    fn test_sequence_skips_misread_names() {
        let decoded = DecodedPiece {
            chords: vec![ChordSpan::Chord(Chord::from_symbol("C#4").unwrap())],
            ..DecodedPiece::default()
        };
        assert_eq!(decoded.chord_symbols(), vec![Some("C#11".to_string())]);
        assert_eq!(decoded.chord_sequence(), None);
    }

    #[test]
    fn test_bar_grid() {
        let c = chord("C");
        let mut timesteps: Vec<_> = [30, 90, 30, 120, 60]
            .iter()
            .map(|d| Timestep::new(Some(60), Some(&c), *d, false, false))
            .collect();
        BarGrid::new(30, 120).mark_barlines(&mut timesteps);
        assert_eq!(
            timesteps.iter().map(|t| (t.is_barline, t.bar_number)).collect::<Vec<_>>(),
            vec![
                (false, None),
                (true, Some(0)),
                (false, Some(0)),
                (true, Some(1)),
                (true, Some(2)),
            ]
        );
    }

    #[test]
    fn test_unnameable_chord_sequence() {
        let decoded = DecodedPiece {
            chords: vec![ChordSpan::Chord(Chord::new(
                0,
                0,
                NoteSet::from_intervals(&[0, 1, 2]),
                120,
            ))],
            ..DecodedPiece::default()
        };
        assert_eq!(decoded.chord_symbols(), vec![None]);
        assert_eq!(decoded.chord_sequence(), None);
    }
}
