//! Timestep <-> vector row conversion

use log::warn;

use super::{
    BASS_OFFSET, CHORD_OFFSET, DURATION_OFFSET, DURATION_STEP, MAX_DURATION, NO_CHORD,
    PITCH_OFFSET, PITCH_RANGE, REST_INDEX, ROOT_OFFSET, TIE_INDEX, VECTOR_WIDTH,
};
use crate::error::LeadSheetError;
use crate::pitch::{NoteSet, PitchClass};
use crate::timestep::{Piece, Timestep};

/// One model row.
pub type TimestepVector = [f32; VECTOR_WIDTH];

fn encoding_error(index: usize, message: String) -> LeadSheetError {
    LeadSheetError::Encoding { index, message }
}

fn pitch_index(timestep: &Timestep, index: usize) -> Result<usize, LeadSheetError> {
    if timestep.same_note {
        return Ok(TIE_INDEX);
    }
    match timestep.pitch {
        None => Ok(REST_INDEX),
        Some(pitch) if (PITCH_OFFSET..PITCH_OFFSET + PITCH_RANGE).contains(&pitch) => {
            Ok(usize::from(pitch - PITCH_OFFSET))
        }
        Some(pitch) => Err(encoding_error(
            index,
            format!(
                "pitch {} is outside the encodable range {}..{}",
                pitch,
                PITCH_OFFSET,
                PITCH_OFFSET + PITCH_RANGE
            ),
        )),
    }
}

fn class_index(class: Option<PitchClass>, field: &str, index: usize) -> Result<usize, LeadSheetError> {
    match class {
        None => Ok(NO_CHORD),
        Some(pc) if usize::from(pc) < NO_CHORD => Ok(usize::from(pc)),
        Some(pc) => Err(encoding_error(
            index,
            format!("{} {} is not a pitch class", field, pc),
        )),
    }
}

fn duration_index(duration: u32, index: usize) -> Result<usize, LeadSheetError> {
    if duration == 0 || duration % DURATION_STEP != 0 || duration > MAX_DURATION {
        return Err(encoding_error(
            index,
            format!(
                "duration {} is not a positive multiple of {} up to {}",
                duration, DURATION_STEP, MAX_DURATION
            ),
        ));
    }
    Ok((duration / DURATION_STEP) as usize - 1)
}

/// Encode one timestep. `index` is only used for error messages.
///
/// # Examples
/// ```
/// use leadsheet::vector::{decode_row, encode_timestep};
/// use leadsheet::{Chord, Timestep};
///
/// let chord = Chord::from_symbol("C").unwrap();
/// let timestep = Timestep::new(Some(60), Some(&chord), 30, false, true);
/// let row = encode_timestep(&timestep, 0).unwrap();
/// assert_eq!(row.iter().filter(|v| **v == 1.0).count(), 7);
///
/// let decoded = decode_row(&row, 0).unwrap();
/// assert_eq!(decoded.root, Some(0));
/// assert_eq!(decoded.notes, chord.full_notes);
/// assert_eq!(decoded.duration, 30);
/// ```
pub fn encode_timestep(timestep: &Timestep, index: usize) -> Result<TimestepVector, LeadSheetError> {
    let mut row = [0.0; VECTOR_WIDTH];

    row[pitch_index(timestep, index)?] = 1.0;
    row[ROOT_OFFSET + class_index(timestep.root, "root", index)?] = 1.0;
    row[BASS_OFFSET + class_index(timestep.bass, "bass", index)?] = 1.0;
    for interval in timestep.notes.iter() {
        row[CHORD_OFFSET + usize::from(interval)] = 1.0;
    }
    row[DURATION_OFFSET + duration_index(timestep.duration, index)?] = 1.0;

    Ok(row)
}

/// Encode every timestep of a piece, in order.
pub fn encode_piece(piece: &Piece) -> Result<Vec<TimestepVector>, LeadSheetError> {
    piece
        .timesteps
        .iter()
        .enumerate()
        .map(|(index, timestep)| encode_timestep(timestep, index))
        .collect()
}

/// Index of the first largest value.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

/// Decode one row into the fields the vector carries.
///
/// Barlines are not part of the row: `is_barline` is always `false` here (see
/// [`BarGrid`](super::BarGrid)). A tie row has `same_note` set and no pitch.
pub fn decode_row(row: &[f32], index: usize) -> Result<Timestep, LeadSheetError> {
    if row.len() != VECTOR_WIDTH {
        return Err(LeadSheetError::Decoding {
            index,
            message: format!("row has width {}, expected {}", row.len(), VECTOR_WIDTH),
        });
    }

    let (pitch, same_note) = match argmax(&row[..ROOT_OFFSET]) {
        TIE_INDEX => (None, true),
        REST_INDEX => (None, false),
        i => (Some(PITCH_OFFSET + i as u8), false),
    };

    let class = |offset: usize| match argmax(&row[offset..offset + NO_CHORD + 1]) {
        NO_CHORD => None,
        i => Some(i as u8),
    };
    let root = class(ROOT_OFFSET);
    let bass = class(BASS_OFFSET);

    let notes: NoteSet = row[CHORD_OFFSET..DURATION_OFFSET]
        .iter()
        .enumerate()
        .filter(|(_, value)| **value != 0.0)
        .map(|(i, _)| i as u8)
        .collect();
    if root.is_none() && !notes.is_empty() {
        warn!("row {} has chord notes {:?} but no root; treating as no chord", index, notes);
    }

    let duration = (argmax(&row[DURATION_OFFSET..]) as u32 + 1) * DURATION_STEP;

    Ok(Timestep {
        pitch,
        root,
        bass,
        notes,
        duration,
        same_note,
        is_barline: false,
        bar_number: None,
        note_name: None,
        note_octave: None,
        core_notes: None,
    })
}

/// Decode a sequence of rows.
pub fn decode_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Vec<Timestep>, LeadSheetError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| decode_row(row.as_ref(), index))
        .collect()
}
