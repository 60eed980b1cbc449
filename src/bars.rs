//! Bar structure of a piece
//!
//! Bars are given as one length per bar in quavers, so changes of metre need no special
//! handling: a 3/4 bar is `6`, a 4/4 bar is `8`. The pickup (anacrusis) is not a bar; it is
//! passed to the merge separately and precedes bar 0.

use serde::Serialize;

use crate::error::LeadSheetError;
use crate::QUAVER_DURATION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    /// Zero-based bar number.
    pub number: usize,
    pub duration: u32,
}

impl Bar {
    pub fn new(number: usize, duration: u32) -> Self {
        Self { number, duration }
    }

    /// Number the bars in order from per-bar quaver counts.
    ///
    /// ```
    /// use leadsheet::Bar;
    ///
    /// let bars = Bar::from_quavers(&[8, 8, 6]).unwrap();
    /// assert_eq!(bars[2], Bar::new(2, 180));
    /// assert!(Bar::from_quavers(&[8, u32::MAX]).is_err());
    /// ```
    pub fn from_quavers(quavers: &[u32]) -> Result<Vec<Bar>, LeadSheetError> {
        quavers
            .iter()
            .enumerate()
            .map(|(number, q)| {
                q.checked_mul(QUAVER_DURATION)
                    .map(|duration| Bar::new(number, duration))
                    .ok_or_else(|| {
                        LeadSheetError::MetadataError(format!(
                            "bar {} is too long: {} quavers",
                            number, q
                        ))
                    })
            })
            .collect()
    }
}

/// Sum of bar lengths in time units.
pub fn total_duration(bars: &[Bar]) -> u32 {
    bars.iter().map(|b| b.duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_and_total() {
        let bars = Bar::from_quavers(&[8, 8, 8, 4]).unwrap();
        assert_eq!(
            bars.iter().map(|b| b.number).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(total_duration(&bars), 840);
        assert!(Bar::from_quavers(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_oversized_bar() {
        assert!(matches!(
            Bar::from_quavers(&[8, u32::MAX / 2]),
            Err(LeadSheetError::MetadataError(_))
        ));
    }
}
