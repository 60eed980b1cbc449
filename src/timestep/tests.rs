use super::*;
use crate::bars::Bar;
use crate::chord::Chord;
use crate::melody::{Melody, Note};
use crate::pitch::NoteSet;
use crate::progression::{ChordProgression, RepeatMode};

fn chords(sequence: &str) -> Vec<Chord> {
    ChordProgression::parse(sequence, RepeatMode::Once).unwrap().into()
}

fn assert_invariants(piece: &Piece) {
    assert_eq!(piece.total_duration(), piece.notated_duration());
    assert_eq!(
        piece.timesteps.iter().filter(|t| t.is_barline).count(),
        piece.bars.len()
    );
    for pair in piece.timesteps.windows(2) {
        if pair[1].same_note {
            assert_eq!(pair[1].pitch, pair[0].pitch, "tie changes pitch: {:?}", pair);
        }
    }
    assert!(piece.timesteps.iter().all(|t| t.duration > 0));
}

#[test]
fn test_two_quavers_two_chords() {
    let melody = vec![Note::new(60, 30), Note::new(62, 30)];
    let piece = Piece::new(melody, chords("0.25C 0.25G7"), Bar::from_quavers(&[2]).unwrap(), 0).unwrap();

    assert_eq!(piece.timesteps.len(), 2);
    let first = &piece.timesteps[0];
    assert_eq!(first.pitch, Some(60));
    assert_eq!(first.duration, 30);
    assert_eq!(first.root, Some(0));
    assert_eq!(first.notes, NoteSet::from_intervals(&[0, 4, 7]));
    assert!(first.is_barline);
    assert!(!first.same_note);

    let second = &piece.timesteps[1];
    assert_eq!(second.pitch, Some(62));
    assert_eq!(second.root, Some(7));
    assert_eq!(second.notes, NoteSet::from_intervals(&[0, 4, 7, 10]));
    assert!(!second.is_barline);
    assert_invariants(&piece);
}

#[test]
fn test_note_tied_across_barline() {
    // Dotted crotchet starting on the last quaver of bar 0
    let melody = Melody::from_relative_durations(&[3.0, 3.0, 2.0], &[60, 64, 67]).unwrap();
    let piece = Piece::new(melody.into(), chords("2C"), Bar::from_quavers(&[4, 4]).unwrap(), 0).unwrap();

    let shape: Vec<_> = piece
        .timesteps
        .iter()
        .map(|t| (t.pitch, t.duration, t.same_note, t.is_barline, t.bar_number))
        .collect();
    assert_eq!(
        shape,
        vec![
            (Some(60), 90, false, true, Some(0)),
            (Some(64), 30, false, false, Some(0)),
            (Some(64), 60, true, true, Some(1)),
            (Some(67), 60, false, false, Some(1)),
        ]
    );
    assert_invariants(&piece);
}

#[test]
fn test_chord_change_splits_note() {
    let melody = vec![Note::new(65, 240)];
    let piece = Piece::new(melody, chords("Dm7 G7"), Bar::from_quavers(&[8]).unwrap(), 0).unwrap();

    assert_eq!(piece.timesteps.len(), 2);
    assert!(piece.timesteps[1].same_note);
    assert_eq!(piece.timesteps[0].root, Some(2));
    assert_eq!(piece.timesteps[1].root, Some(7));
    assert_invariants(&piece);
}

#[test]
fn test_pickup_has_no_chord_or_bar() {
    let melody = vec![Note::new(67, 30), Note::new(69, 30), Note::new(72, 240)];
    let piece = Piece::new(melody, chords("2CM7"), Bar::from_quavers(&[8]).unwrap(), 60).unwrap();

    assert_eq!(piece.timesteps.len(), 3);
    for pickup in &piece.timesteps[..2] {
        assert_eq!(pickup.root, None);
        assert_eq!(pickup.bass, None);
        assert_eq!(pickup.bar_number, None);
        assert!(pickup.notes.is_empty());
        assert!(!pickup.is_barline);
    }
    assert!(piece.timesteps[2].is_barline);
    assert_eq!(piece.timesteps[2].bar_number, Some(0));
    assert_invariants(&piece);
}

#[test]
fn test_rests_and_redundant_attributes() {
    let melody = vec![Note::rest(60), Note::new(70, 60)];
    let piece = Piece::new(melody, chords("Bb7sus4"), Bar::from_quavers(&[4]).unwrap(), 0).unwrap();

    let rest = &piece.timesteps[0];
    assert_eq!(rest.pitch, None);
    assert_eq!(rest.note_name, None);
    assert!(rest.is_rest());

    let note = &piece.timesteps[1];
    assert_eq!(note.note_name, Some("A#"));
    assert_eq!(note.note_octave, Some(4));
    assert_eq!(note.core_notes, Some(NoteSet::from_intervals(&[0, 4, 7, 10])));
    assert_eq!(note.notes, NoteSet::from_intervals(&[0, 5, 7, 10]));
}

#[test]
fn test_repeated_pitch_is_not_a_tie() {
    let melody = vec![Note::new(60, 60), Note::new(60, 60)];
    let piece = Piece::new(melody, chords("C"), Bar::from_quavers(&[4]).unwrap(), 0).unwrap();
    assert_eq!(piece.timesteps.len(), 2);
    assert!(!piece.timesteps[1].same_note);
}

#[test]
fn test_slash_chord_bass() {
    let melody = vec![Note::new(60, 120)];
    let piece = Piece::new(melody, chords("C/E"), Bar::from_quavers(&[4]).unwrap(), 0).unwrap();
    assert_eq!(piece.timesteps[0].root, Some(0));
    assert_eq!(piece.timesteps[0].bass, Some(4));
}

#[test]
fn test_mismatched_totals_terminate() {
    // Chords run a crotchet past the melody and the bar
    let melody = vec![Note::new(60, 30), Note::new(62, 30)];
    let timesteps = merge(&melody, &chords("0.5C 0.5G7"), &Bar::from_quavers(&[2]).unwrap(), 0);

    assert_eq!(timesteps.len(), 3);
    let stale = &timesteps[2];
    assert_eq!(stale.duration, 60);
    assert_eq!(stale.pitch, Some(62));
    assert!(stale.same_note);
    assert!(!stale.is_barline);
    assert_eq!(stale.bar_number, Some(0));
    assert_eq!(stale.root, Some(7));

    let total: u32 = timesteps.iter().map(|t| t.duration).sum();
    assert_eq!(total, 120);
}

#[test]
fn test_validated_constructor_rejects_mismatch() {
    let melody = vec![Note::new(60, 60)];
    assert!(Piece::new(melody.clone(), chords("0.5C"), Bar::from_quavers(&[4]).unwrap(), 0).is_err());
    assert!(Piece::new(melody, chords("0.25C"), Bar::from_quavers(&[2]).unwrap(), 0).is_err());
}

#[test]
fn test_merge_is_lazy() {
    let melody = vec![Note::new(60, 30); 8];
    let chords = chords("2C");
    let bars = Bar::from_quavers(&[8]).unwrap();
    let mut merge = Merge::new(&melody, &chords, &bars, 0);
    assert_eq!(merge.next().map(|t| t.is_barline), Some(true));
    assert_eq!(merge.count(), 7);
}

#[test]
fn test_metadata_builders() {
    let piece = Piece::new_unchecked(vec![], vec![], vec![], 0)
        .with_title("Blue Monk")
        .with_composer("Thelonious Monk");
    assert_eq!(piece.title.as_deref(), Some("Blue Monk"));
    assert_eq!(piece.composer.as_deref(), Some("Thelonious Monk"));
    assert!(piece.timesteps.is_empty());
}
