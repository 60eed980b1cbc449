//! MusicXML export of a merged piece
//!
//! One measure per bar, with the pickup as an implicit measure 0. Notes split by the merge are
//! joined with ties; a `<harmony>` element is written wherever the chord changes.

use std::ops::Range;

use log::debug;

use crate::chord::{chord_name, Quality};
use crate::pitch::{chord_root_name, midi_note_name, midi_octave, NoteSet, PitchClass};
use crate::timestep::{Piece, Timestep};

/// Divisions per quarter note: one time unit per division.
const DIVISIONS: u32 = 60;

/// Convert a Piece to MusicXML format
pub fn to_musicxml(piece: &Piece) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#);
    xml.push('\n');

    xml.push_str(r#"<score-partwise version="4.0">"#);
    xml.push('\n');

    if let Some(title) = &piece.title {
        xml.push_str("  <work>\n");
        xml.push_str(&format!("    <work-title>{}</work-title>\n", escape_xml(title)));
        xml.push_str("  </work>\n");
    }

    if let Some(composer) = &piece.composer {
        xml.push_str("  <identification>\n");
        xml.push_str(&format!(
            "    <creator type=\"composer\">{}</creator>\n",
            escape_xml(composer)
        ));
        xml.push_str("  </identification>\n");
    }

    xml.push_str("  <part-list>\n");
    xml.push_str("    <score-part id=\"P1\">\n");
    xml.push_str("      <part-name>Lead</part-name>\n");
    xml.push_str("    </score-part>\n");
    xml.push_str("  </part-list>\n");

    xml.push_str("  <part id=\"P1\">\n");

    let measures = split_measures(&piece.timesteps);
    let has_pickup = piece.timesteps.first().is_some_and(|t| !t.is_barline);
    let first_number = if has_pickup { 0 } else { 1 };
    let bar_duration = piece.bars.first().map_or(4 * DIVISIONS, |bar| bar.duration);

    let mut state = VoiceState::default();
    for (i, range) in measures.iter().enumerate() {
        let number = first_number + i;
        let attributes = (i == 0).then_some(bar_duration);
        xml.push_str(&measure_to_xml(
            &piece.timesteps,
            range.clone(),
            number,
            attributes,
            &mut state,
        ));
    }

    xml.push_str("  </part>\n");
    xml.push_str("</score-partwise>\n");

    debug!("rendered {} measures", measures.len());
    xml
}

/// What carries over from one timestep to the next: the held pitch and the last chord.
#[derive(Default)]
struct VoiceState {
    held: Option<u8>,
    chord: Option<(PitchClass, PitchClass, NoteSet)>,
}

/// Index ranges of the timesteps in each measure, cut at every barline.
fn split_measures(timesteps: &[Timestep]) -> Vec<Range<usize>> {
    let mut measures = Vec::new();
    let mut start = 0;
    for (i, timestep) in timesteps.iter().enumerate() {
        if timestep.is_barline && i > start {
            measures.push(start..i);
            start = i;
        }
    }
    if start < timesteps.len() {
        measures.push(start..timesteps.len());
    }
    measures
}

fn measure_to_xml(
    timesteps: &[Timestep],
    range: Range<usize>,
    number: usize,
    bar_duration: Option<u32>,
    state: &mut VoiceState,
) -> String {
    let mut xml = String::new();

    if number == 0 {
        xml.push_str("    <measure number=\"0\" implicit=\"yes\">\n");
    } else {
        xml.push_str(&format!("    <measure number=\"{}\">\n", number));
    }

    if let Some(bar_duration) = bar_duration {
        xml.push_str("      <attributes>\n");
        xml.push_str(&format!("        <divisions>{}</divisions>\n", DIVISIONS));
        xml.push_str("        <time>\n");
        match time_signature(bar_duration) {
            Some((beats, beat_type)) => {
                xml.push_str(&format!("          <beats>{}</beats>\n", beats));
                xml.push_str(&format!("          <beat-type>{}</beat-type>\n", beat_type));
            }
            None => xml.push_str("          <senza-misura/>\n"),
        }
        xml.push_str("        </time>\n");
        xml.push_str("        <clef>\n");
        xml.push_str("          <sign>G</sign>\n");
        xml.push_str("          <line>2</line>\n");
        xml.push_str("        </clef>\n");
        xml.push_str("      </attributes>\n");
    }

    for i in range {
        let timestep = &timesteps[i];
        let chord = timestep
            .root
            .map(|root| (root, timestep.bass.unwrap_or(root), timestep.notes));
        if chord.is_some() && chord != state.chord {
            if let Some((root, bass, notes)) = chord {
                xml.push_str(&harmony_to_xml(root, bass, notes));
            }
        }
        state.chord = chord;

        let pitch = if timestep.same_note { state.held } else { timestep.pitch };
        state.held = pitch;

        // The next timestep may be in the next measure.
        let tie_next = timesteps.get(i + 1).is_some_and(|next| next.same_note);
        match pitch {
            Some(pitch) => {
                xml.push_str(&note_to_xml(pitch, timestep.duration, timestep.same_note, tie_next))
            }
            None => xml.push_str(&rest_to_xml(timestep.duration)),
        }
    }

    xml.push_str("    </measure>\n");
    xml
}

fn note_to_xml(pitch: u8, duration: u32, tie_stop: bool, tie_start: bool) -> String {
    let mut xml = String::new();
    let (step, alter) = step_and_alter(midi_note_name(pitch));

    xml.push_str("      <note>\n");

    xml.push_str("        <pitch>\n");
    xml.push_str(&format!("          <step>{}</step>\n", step));
    if alter != 0 {
        xml.push_str(&format!("          <alter>{}</alter>\n", alter));
    }
    xml.push_str(&format!("          <octave>{}</octave>\n", midi_octave(pitch)));
    xml.push_str("        </pitch>\n");

    xml.push_str(&format!("        <duration>{}</duration>\n", duration));
    if tie_stop {
        xml.push_str("        <tie type=\"stop\"/>\n");
    }
    if tie_start {
        xml.push_str("        <tie type=\"start\"/>\n");
    }
    xml.push_str(&note_type_to_xml(duration));

    if alter != 0 {
        xml.push_str("        <accidental>sharp</accidental>\n");
    }

    if tie_stop || tie_start {
        xml.push_str("        <notations>\n");
        if tie_stop {
            xml.push_str("          <tied type=\"stop\"/>\n");
        }
        if tie_start {
            xml.push_str("          <tied type=\"start\"/>\n");
        }
        xml.push_str("        </notations>\n");
    }

    xml.push_str("      </note>\n");
    xml
}

fn rest_to_xml(duration: u32) -> String {
    let mut xml = String::new();

    xml.push_str("      <note>\n");
    xml.push_str("        <rest/>\n");
    xml.push_str(&format!("        <duration>{}</duration>\n", duration));
    xml.push_str(&note_type_to_xml(duration));
    xml.push_str("      </note>\n");
    xml
}

/// `<type>` and `<dot/>` for durations with a written note value; nothing otherwise.
fn note_type_to_xml(duration: u32) -> String {
    let (name, dotted) = match duration {
        240 => ("whole", false),
        180 => ("half", true),
        120 => ("half", false),
        90 => ("quarter", true),
        60 => ("quarter", false),
        45 => ("eighth", true),
        30 => ("eighth", false),
        15 => ("16th", false),
        _ => return String::new(),
    };
    let mut xml = format!("        <type>{}</type>\n", name);
    if dotted {
        xml.push_str("        <dot/>\n");
    }
    xml
}

fn harmony_to_xml(root: PitchClass, bass: PitchClass, notes: NoteSet) -> String {
    let mut xml = String::new();
    let name = chord_name(root, bass, notes);

    xml.push_str("      <harmony>\n");

    let (step, alter) = step_and_alter(chord_root_name(root));
    xml.push_str("        <root>\n");
    xml.push_str(&format!("          <root-step>{}</root-step>\n", step));
    if alter != 0 {
        xml.push_str(&format!("          <root-alter>{}</root-alter>\n", alter));
    }
    xml.push_str("        </root>\n");

    match &name {
        Some(name) => xml.push_str(&format!(
            "        <kind text=\"{}\">{}</kind>\n",
            escape_xml(&name.suffix()),
            kind(name.quality, name.extension)
        )),
        None => xml.push_str("        <kind>other</kind>\n"),
    }

    if bass != root {
        let (step, alter) = step_and_alter(chord_root_name(bass));
        xml.push_str("        <bass>\n");
        xml.push_str(&format!("          <bass-step>{}</bass-step>\n", step));
        if alter != 0 {
            xml.push_str(&format!("          <bass-alter>{}</bass-alter>\n", alter));
        }
        xml.push_str("        </bass>\n");
    }

    xml.push_str("      </harmony>\n");
    xml
}

/// MusicXML `<kind>` value. Alterations only appear in the `text` attribute.
fn kind(quality: Quality, extension: Option<u8>) -> &'static str {
    match (quality, extension) {
        (Quality::Major, _) => "major",
        (Quality::Minor, _) => "minor",
        (Quality::Augmented, _) => "augmented",
        (Quality::Diminished, _) => "diminished",
        (Quality::Dominant7, Some(9)) => "dominant-ninth",
        (Quality::Dominant7, Some(11)) => "dominant-11th",
        (Quality::Dominant7, Some(13)) => "dominant-13th",
        (Quality::Dominant7, _) => "dominant",
        (Quality::Major7, Some(9)) => "major-ninth",
        (Quality::Major7, Some(11)) => "major-11th",
        (Quality::Major7, Some(13)) => "major-13th",
        (Quality::Major7, _) => "major-seventh",
        (Quality::Minor7, Some(9)) => "minor-ninth",
        (Quality::Minor7, Some(11)) => "minor-11th",
        (Quality::Minor7, Some(13)) => "minor-13th",
        (Quality::Minor7, _) => "minor-seventh",
        (Quality::MinorMajor7, _) => "major-minor",
        (Quality::Augmented7, _) => "augmented-seventh",
        (Quality::AugmentedMajor7, _) => "other",
        (Quality::Diminished7, _) => "diminished-seventh",
        (Quality::HalfDiminished7, _) => "half-diminished",
    }
}

/// Split a spelled name like `Bb` or `F#` into its letter and chromatic alteration.
fn step_and_alter(name: &str) -> (&str, i8) {
    let (step, accidental) = name.split_at(1);
    let alter = match accidental {
        "#" => 1,
        "b" => -1,
        _ => 0,
    };
    (step, alter)
}

/// The coarsest of quarters, quavers and semiquavers that fills the bar exactly. `None` when
/// none does (the bar is written without a metre).
fn time_signature(bar_duration: u32) -> Option<(u32, u32)> {
    [(DIVISIONS, 4), (DIVISIONS / 2, 8), (DIVISIONS / 4, 16)]
        .into_iter()
        .find(|(unit, _)| bar_duration > 0 && bar_duration % unit == 0)
        .map(|(unit, beat_type)| (bar_duration / unit, beat_type))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
