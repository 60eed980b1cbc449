//! Chord naming: the inverse of chord symbol parsing
//!
//! Rebuilds a readable chord symbol from a root, a bass and an arbitrary set of intervals
//! (typically a multi-hot chord field predicted by a model). The set may be musically
//! meaningless, in which case no name is produced.
//!
//! The naming is a heuristic, not a bijection. Several note-sets can be spelled more than one
//! way; the steps below run in a fixed order and that order decides:
//!
//! 1. Suspension: no third, but a 2nd or 4th to stand in for it
//! 2. Validity: root, a third and a fifth, and no clashing scale degrees
//! 3. Fifth alteration (`b5` preferred over `#5`), unless the chord is diminished-family
//! 4. Core quality: first match in [`Quality::NAMING_ORDER`]
//! 5. Extensions: every leftover interval gets an extension token
//! 6. Folding: `add9`/`add11`/`add13` fold into a `9`/`11`/`13` quality; on a plain triad
//!    `add13` is spelled `add6`

use std::fmt;

use log::debug;

use super::types::{Chord, Quality};
use crate::pitch::{chord_root_name, NoteSet, PitchClass, F2, F3, F5, P1, P2, P3, P4, P5, P7, S5};

/// Every chord needs one note from each of these.
const MINIMUM_REQUIREMENTS: [NoteSet; 3] = [
    NoteSet::from_intervals(&[P1]),
    NoteSet::from_intervals(&[3, 4]),
    NoteSet::from_intervals(&[6, 7, 8]),
];

/// Simultaneous scale degrees that cannot be spelled in one chord.
const INVALID_COMBINATIONS: [NoteSet; 7] = [
    NoteSet::from_intervals(&[1, 2]),
    NoteSet::from_intervals(&[2, 3, 4]),
    NoteSet::from_intervals(&[1, 3, 4]),
    NoteSet::from_intervals(&[5, 6, 7]),
    NoteSet::from_intervals(&[5, 6, 8, 9]),
    NoteSet::from_intervals(&[7, 8, 9]),
    NoteSet::from_intervals(&[10, 11]),
];

/// Leftover interval -> extension token. Interval 3 is a sharp ninth here: the third has
/// already been taken by the core quality.
const EXTENSIONS: [(u8, &str); 7] = [
    (1, "b9"),
    (2, "add9"),
    (3, "#9"),
    (5, "add11"),
    (6, "#11"),
    (8, "b13"),
    (9, "add13"),
];

/// A decoded chord name.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordName {
    pub root: PitchClass,
    pub bass: PitchClass,
    pub quality: Quality,
    /// 9, 11 or 13 when additions were folded into the quality.
    pub extension: Option<u8>,
    pub alterations: Vec<&'static str>,
}

impl ChordName {
    /// Quality token with any folded extension, e.g. `m7` -> `m11`.
    pub fn quality_token(&self) -> String {
        match self.extension {
            Some(ext) => self.quality.token().replace('7', &ext.to_string()),
            None => self.quality.token().to_string(),
        }
    }

    /// Quality and alteration text without root or bass, e.g. `13#11`.
    pub fn suffix(&self) -> String {
        let mut suffix = self.quality_token();
        for alteration in &self.alterations {
            suffix.push_str(alteration);
        }
        suffix
    }
}

impl fmt::Display for ChordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", chord_root_name(self.root), self.suffix())?;
        if self.bass != self.root {
            write!(f, "/{}", chord_root_name(self.bass))?;
        }
        Ok(())
    }
}

/// Name a chord note-set. Returns `None` when the set is not a valid chord.
///
/// # Examples
/// ```
/// use leadsheet::chord::chord_name;
/// use leadsheet::NoteSet;
///
/// let name = chord_name(7, 7, NoteSet::from_intervals(&[0, 2, 4, 7, 10])).unwrap();
/// assert_eq!(name.to_string(), "G9");
///
/// // Root with both seconds and nothing to suspend: not a chord
/// assert!(chord_name(0, 0, NoteSet::from_intervals(&[0, 1, 2])).is_none());
/// ```
pub fn chord_name(root: PitchClass, bass: PitchClass, notes: NoteSet) -> Option<ChordName> {
    let mut working = notes;
    let mut alterations = Vec::new();

    if let Some(sus) = detect_suspension(&mut working) {
        alterations.push(sus);
    }

    if !is_valid(&working) {
        return None;
    }

    if let Some(fifth) = detect_fifth_alteration(&mut working) {
        alterations.push(fifth);
    }

    let quality = Quality::NAMING_ORDER
        .into_iter()
        .find(|q| q.notes().is_subset(&working))?;
    let remainder = working.difference(&quality.notes());

    alterations.extend(
        EXTENSIONS
            .iter()
            .filter(|(interval, _)| remainder.contains(*interval))
            .map(|(_, token)| *token),
    );

    let extension = fold_extensions(quality, &mut alterations);

    Some(ChordName {
        root: root % 12,
        bass: bass % 12,
        quality,
        extension,
        alterations,
    })
}

/// Chord symbol text for a note-set, e.g. `"Bbm7b5"`. `None` when the set is not a chord.
pub fn chord_symbol(root: PitchClass, bass: PitchClass, notes: NoteSet) -> Option<String> {
    chord_name(root, bass, notes).map(|name| name.to_string())
}

impl Chord {
    /// Canonical symbol for this chord's full note-set (duration is not included).
    ///
    /// ```
    /// use leadsheet::Chord;
    ///
    /// let chord = Chord::from_symbol("Dbm7add11").unwrap();
    /// assert_eq!(chord.symbol().as_deref(), Some("Dbm7add11"));
    /// ```
    pub fn symbol(&self) -> Option<String> {
        chord_symbol(self.root, self.bass, self.full_notes)
    }

    /// [`Chord::symbol`], kept only if parsing it gives back the same root, bass and full
    /// note-set.
    ///
    /// A plain triad whose first alteration is a flat or sharp is named with that accidental
    /// straight after a natural root, and the parser reads it as part of the root: C with a
    /// sharp eleventh is named `C#11`, which parses as C-sharp eleven. Some sets also lose a
    /// note to the naming rules. Neither kind of name can be written back into a chord
    /// sequence.
    ///
    /// ```
    /// use leadsheet::{Chord, NoteSet};
    ///
    /// let chord = Chord::new(0, 0, NoteSet::from_intervals(&[0, 4, 6, 7]), 120);
    /// assert_eq!(chord.symbol().as_deref(), Some("C#11"));
    /// assert_eq!(chord.parseable_symbol(), None);
    ///
    /// let chord = Chord::from_symbol("G7#11").unwrap();
    /// assert_eq!(chord.parseable_symbol().as_deref(), Some("G7#11"));
    /// ```
    pub fn parseable_symbol(&self) -> Option<String> {
        let symbol = self.symbol()?;
        let reparsed = Chord::from_symbol(&symbol).ok()?;
        let same = reparsed.root == self.root % 12
            && reparsed.bass == self.bass % 12
            && reparsed.full_notes == self.full_notes;
        if !same {
            debug!(
                "chord {:?} is named {} but that symbol parses as {:?}",
                self.full_notes, symbol, reparsed.full_notes
            );
        }
        same.then_some(symbol)
    }
}

/// Replace a missing third with a major third when a 2nd or 4th stands in for it.
pub(crate) fn detect_suspension(working: &mut NoteSet) -> Option<&'static str> {
    let thirds = NoteSet::from_intervals(&[F3, P3]);
    let stand_ins = NoteSet::from_intervals(&[P2, P4]);
    if !thirds.is_disjoint(working) || stand_ins.is_disjoint(working) {
        return None;
    }

    let both_seconds = NoteSet::from_intervals(&[F2, P2]).is_subset(working);
    let sus = if working.contains(P4) && !both_seconds {
        working.remove(P4);
        "sus4"
    } else {
        working.remove(P2);
        "sus2"
    };
    working.insert(P3);
    Some(sus)
}

fn is_valid(working: &NoteSet) -> bool {
    MINIMUM_REQUIREMENTS.iter().all(|req| !req.is_disjoint(working))
        && !INVALID_COMBINATIONS.iter().any(|combo| combo.is_subset(working))
}

/// Rewrite an altered fifth to a perfect fifth, returning `b5` or `#5`.
fn detect_fifth_alteration(working: &mut NoteSet) -> Option<&'static str> {
    let diminished_family = working.contains(F3)
        && working.contains(F5)
        && NoteSet::from_intervals(&[P3, P5, P7]).is_disjoint(working);
    if diminished_family || working.contains(P5) {
        return None;
    }

    if working.contains(F5) && (!working.contains(S5) || working.contains(P4)) {
        working.remove(F5);
        working.insert(P5);
        Some("b5")
    } else if working.contains(S5) && !working.contains(P3) {
        working.remove(S5);
        working.insert(P5);
        Some("#5")
    } else {
        None
    }
}

/// Fold unbroken `add9`/`add11`/`add13` runs into the quality's seventh. A degree also counts
/// as present for the run when it is altered (`b9`, `#9`, `#11`, `b13`).
fn fold_extensions(quality: Quality, alterations: &mut Vec<&'static str>) -> Option<u8> {
    if !quality.has_seventh() {
        if let Some(pos) = alterations.iter().position(|a| *a == "add13") {
            alterations.remove(pos);
            alterations.insert(0, "add6");
        }
        return None;
    }

    const DEGREES: [(u8, &str, &[&str]); 3] = [
        (9, "add9", &["b9", "#9"]),
        (11, "add11", &["#11"]),
        (13, "add13", &["b13"]),
    ];

    let mut folded = None;
    for (degree, addition, altered) in DEGREES {
        let added = alterations.contains(&addition);
        if !added && !altered.iter().any(|a| alterations.contains(a)) {
            break;
        }
        if added {
            alterations.retain(|a| *a != addition);
            folded = Some(degree);
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(intervals: &[u8]) -> NoteSet {
        NoteSet::from_intervals(intervals)
    }

    #[test]
    fn test_suspension_rewrites_to_major_third() {
        let mut working = set(&[0, 5, 7]);
        assert_eq!(detect_suspension(&mut working), Some("sus4"));
        assert_eq!(working, set(&[0, 4, 7]));
    }

    #[test]
    fn test_sus2_when_both_seconds_present() {
        let mut working = set(&[0, 1, 2, 5, 7]);
        assert_eq!(detect_suspension(&mut working), Some("sus2"));
        assert_eq!(working, set(&[0, 1, 4, 5, 7]));
    }

    #[test]
    fn test_no_suspension_with_third() {
        let mut working = set(&[0, 3, 5, 7]);
        assert_eq!(detect_suspension(&mut working), None);
        assert_eq!(working, set(&[0, 3, 5, 7]));
    }

    #[test]
    fn test_invalid_sets() {
        assert!(chord_name(0, 0, set(&[0, 1, 2])).is_none());
        assert!(chord_name(0, 0, set(&[4, 7])).is_none());
        assert!(chord_name(0, 0, set(&[0, 4])).is_none());
        assert!(chord_name(0, 0, set(&[0, 4, 7, 10, 11])).is_none());
        assert!(chord_name(0, 0, set(&[0, 3, 4, 2, 7])).is_none());
        assert!(chord_name(0, 0, NoteSet::EMPTY).is_none());
    }

    #[test]
    fn test_flat_five_preferred() {
        assert_eq!(chord_symbol(0, 0, set(&[0, 4, 6])).as_deref(), Some("Cb5"));
        assert_eq!(chord_symbol(0, 0, set(&[0, 3, 8])).as_deref(), Some("Cm#5"));
        // Augmented triad stays augmented rather than #5
        assert_eq!(chord_symbol(0, 0, set(&[0, 4, 8])).as_deref(), Some("C+"));
    }

    #[test]
    fn test_diminished_family_skips_fifth_alteration() {
        assert_eq!(chord_symbol(0, 0, set(&[0, 3, 6])).as_deref(), Some("Co"));
        assert_eq!(chord_symbol(0, 0, set(&[0, 3, 6, 9])).as_deref(), Some("Co7"));
        assert_eq!(chord_symbol(0, 0, set(&[0, 3, 6, 10])).as_deref(), Some("Cø7"));
    }

    #[test]
    fn test_folding_requires_unbroken_run() {
        // add9 + add13 without an eleventh: only the ninth folds
        assert_eq!(
            chord_symbol(0, 0, set(&[0, 2, 4, 7, 9, 10])).as_deref(),
            Some("C9add13")
        );
        // #11 bridges the gap so the thirteenth folds
        assert_eq!(
            chord_symbol(0, 0, set(&[0, 2, 4, 6, 7, 9, 10])).as_deref(),
            Some("C13#11")
        );
        // b9 keeps the run alive without folding the ninth itself
        assert_eq!(
            chord_symbol(0, 0, set(&[0, 1, 4, 5, 7, 10])).as_deref(),
            Some("C11b9")
        );
    }

    #[test]
    fn test_triad_thirteenth_is_a_sixth() {
        assert_eq!(chord_symbol(0, 0, set(&[0, 4, 7, 9])).as_deref(), Some("Cadd6"));
        assert_eq!(chord_symbol(0, 0, set(&[0, 2, 4, 7, 9])).as_deref(), Some("Cadd6add9"));
    }

    #[test]
    fn test_slash_bass_uses_flat_spelling() {
        assert_eq!(
            chord_symbol(10, 8, set(&[0, 4, 7, 10])).as_deref(),
            Some("Bb7/Ab")
        );
    }
}
