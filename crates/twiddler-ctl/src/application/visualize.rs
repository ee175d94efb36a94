//! `visualize`: draw each chord as a small braille picture of the keypad.
//!
//! A chart is two lines of three braille cells.  The top line holds thumbs
//! 0 and 1 with finger rows 0 and 1, the bottom line thumbs 2–4 with finger
//! rows 2–4.

use twiddler_core::model::chord::CHORD_BITS;
use twiddler_core::Config;

/// First code point of the Unicode braille block (no dots raised).
const BRAILLE_BLANK: u32 = 0x2800;

const CELLS: usize = 6;

/// Columns one chart takes, including its `|` separator.
const CHART_WIDTH: usize = 4;

/// Cell index and braille dot for each chord bit.
const KEY_BRAILLE_MAP: [(usize, u32); CHORD_BITS] = [
    (0, 0x40), // T1
    (1, 0x40),
    (1, 0x80),
    (2, 0x40),
    (3, 0x01), // T2
    (4, 0x01),
    (4, 0x08),
    (5, 0x01),
    (3, 0x02), // T3
    (4, 0x02),
    (4, 0x10),
    (5, 0x02),
    (3, 0x04), // T4
    (4, 0x04),
    (4, 0x20),
    (5, 0x04),
    (1, 0x02),
    (1, 0x10),
    (2, 0x02),
    (0, 0x02), // T0
];

/// One chord picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    pub top: String,
    pub bottom: String,
}

/// Draws the chord with bit value `bits`.
pub fn chart(bits: u32) -> Chart {
    let mut cells = [BRAILLE_BLANK; CELLS];
    for (bit, &(cell, dot)) in KEY_BRAILLE_MAP.iter().enumerate() {
        if bits & (1 << bit) != 0 {
            cells[cell] |= dot;
        }
    }
    let line = |cells: &[u32]| -> String { cells.iter().filter_map(|&c| char::from_u32(c)).collect() };
    Chart {
        top: line(&cells[..3]),
        bottom: line(&cells[3..]),
    }
}

/// Charts for every bound dedicated key, then every mapping.
pub fn charts(config: &Config) -> Vec<Chart> {
    let dedicated = config
        .dedicated
        .iter()
        .enumerate()
        .filter(|(_, &action)| action != 0)
        .map(|(slot, _)| chart(1 << slot));
    let mappings = config.mappings.iter().map(|m| chart(m.chord.to_bits()));
    dedicated.chain(mappings).collect()
}

/// Lays charts out side by side, separated by `|`, wrapping to fit `width`
/// terminal columns.
pub fn render(charts: &[Chart], width: usize) -> String {
    let per_row = (width / CHART_WIDTH).max(1);
    let mut out = String::new();
    for row in charts.chunks(per_row) {
        let top: Vec<&str> = row.iter().map(|c| c.top.as_str()).collect();
        let bottom: Vec<&str> = row.iter().map(|c| c.bottom.as_str()).collect();
        out.push_str(&top.join("|"));
        out.push('\n');
        out.push_str(&bottom.join("|"));
        out.push('\n');
    }
    out
}
