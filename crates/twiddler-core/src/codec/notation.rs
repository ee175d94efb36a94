//! Chord notation: `T02F1LMR3R` and friends.
//!
//! ```text
//! T<thumbs>            thumb keys, digits 0-4, e.g. T02
//! F<row><cols>         first finger row, cols from {L, M, R}
//! <row><cols>          further finger rows (after the first F block)
//! _                    the empty chord
//! ```
//!
//! Parsing is case-insensitive and skips any character it does not
//! understand.  Serialization is canonical: thumbs first, rows ascending,
//! columns in L, M, R order.

use crate::model::{Chord, FingerColumn};

/// Notation of the chord with no cells set.
pub const EMPTY_CHORD: &str = "_";

fn row_index(c: char) -> Option<usize> {
    match c {
        '0'..='4' => Some(c as usize - '0' as usize),
        _ => None,
    }
}

/// Parses chord notation.  Never fails; unrecognized characters are skipped.
pub fn chord_from_text(notation: &str) -> Chord {
    let s: Vec<char> = notation.trim().to_uppercase().chars().collect();
    let mut chord = Chord::default();
    let mut seen_first_finger = false;
    let mut i = 0;

    // Consumes a run of L/M/R after a row digit.
    let read_columns = |chord: &mut Chord, row: usize, i: &mut usize| {
        while let Some(col) = s.get(*i).copied().and_then(FingerColumn::from_letter) {
            chord.set_finger(row, col);
            *i += 1;
        }
    };

    while i < s.len() {
        let c = s[i];
        if c == 'T' {
            i += 1;
            while let Some(thumb) = s.get(i).copied().and_then(row_index) {
                chord.set_thumb(thumb);
                i += 1;
            }
        } else if c == 'F' && !seen_first_finger {
            i += 1;
            if let Some(row) = s.get(i).copied().and_then(row_index) {
                i += 1;
                read_columns(&mut chord, row, &mut i);
                seen_first_finger = true;
            }
        } else if let (true, Some(row)) = (seen_first_finger, row_index(c)) {
            i += 1;
            read_columns(&mut chord, row, &mut i);
        } else {
            i += 1;
        }
    }
    chord
}

/// Formats a chord in canonical notation.
pub fn chord_to_text(chord: &Chord) -> String {
    let mut out = String::new();

    let thumbs: String = chord
        .thumbs
        .iter()
        .enumerate()
        .filter(|(_, set)| **set)
        .map(|(i, _)| char::from(b'0' + i as u8))
        .collect();
    if !thumbs.is_empty() {
        out.push('T');
        out.push_str(&thumbs);
    }

    let mut first_finger = true;
    for row in 0..chord.fingers.len() {
        let cols: String = [FingerColumn::Left, FingerColumn::Middle, FingerColumn::Right]
            .into_iter()
            .filter(|col| chord.finger(row, *col))
            .map(FingerColumn::letter)
            .collect();
        if cols.is_empty() {
            continue;
        }
        if first_finger {
            out.push('F');
            first_finger = false;
        }
        out.push(char::from(b'0' + row as u8));
        out.push_str(&cols);
    }

    if out.is_empty() {
        EMPTY_CHORD.to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_f_after_first_finger_block() {
        let chord = chord_from_text("T02F1LMR3R");

        assert_eq!(chord.thumbs, [true, false, true, false, false]);
        assert_eq!(chord.fingers[1], [true, true, true]);
        assert_eq!(chord.fingers[3], [true, false, false]);
        assert_eq!(chord.fingers[0], [false; 3]);
        assert_eq!(chord.fingers[2], [false; 3]);
        assert_eq!(chord.fingers[4], [false; 3]);
    }

    #[test]
    fn test_bare_digit_before_first_f_is_ignored() {
        let chord = chord_from_text("1L");
        assert!(chord.is_empty());
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(chord_from_text("  t1f0rm "), chord_from_text("T1F0RM"));
    }

    #[test]
    fn test_columns_in_any_order() {
        assert_eq!(chord_from_text("F2RL"), chord_from_text("F2LR"));
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        let chord = chord_from_text("F0R+2M");
        assert!(chord.finger(0, FingerColumn::Right));
        assert!(chord.finger(2, FingerColumn::Middle));
    }

    #[test]
    fn test_second_f_is_skipped_but_row_still_parses() {
        let chord = chord_from_text("F0RF2L");
        assert!(chord.finger(0, FingerColumn::Right));
        assert!(chord.finger(2, FingerColumn::Left));
    }

    #[test]
    fn test_to_text_orders_columns_l_m_r() {
        let mut chord = Chord::default();
        chord.set_finger(1, FingerColumn::Right);
        chord.set_finger(1, FingerColumn::Left);
        assert_eq!(chord_to_text(&chord), "F1LR");
    }

    #[test]
    fn test_to_text_prefixes_only_first_row() {
        let chord = chord_from_text("T02F1LMR3R");
        assert_eq!(chord_to_text(&chord), "T02F1LMR3R");
    }

    #[test]
    fn test_thumb_only_chord() {
        let mut chord = Chord::default();
        chord.set_thumb(4);
        assert_eq!(chord_to_text(&chord), "T4");
        assert_eq!(chord_from_text("T4"), chord);
    }

    #[test]
    fn test_empty_chord_is_placeholder() {
        assert_eq!(chord_to_text(&Chord::default()), "_");
        assert!(chord_from_text("_").is_empty());
    }

    #[test]
    fn test_round_trip_every_single_cell() {
        for bit in 0..20 {
            let chord = Chord::from_bits(1 << bit);
            assert_eq!(chord_from_text(&chord_to_text(&chord)), chord, "bit {bit}");
        }
    }
}
