//! Chords and their packed 20-bit form.
//!
//! A chord has 20 independent cells: five thumb keys and a 5×3 grid of finger
//! keys (row 0–4 × right/middle/left column).  On the device each cell owns
//! one bit of a `u32`; the assignment is fixed by firmware and is not in any
//! obvious order:
//!
//! ```text
//!          thumb   R    M    L
//! row 0     19    16   17   18
//! row 1      0     1    2    3
//! row 2      4     5    6    7
//! row 3      8     9   10   11
//! row 4     12    13   14   15
//! ```
//!
//! (The thumb column lists the bit for thumb key N on row N.)

/// Bit position of thumb key `i`.
const THUMB_BITS: [u32; 5] = [19, 0, 4, 8, 12];

/// Bit position of finger cell `[row][column]`, columns ordered R, M, L.
const FINGER_BITS: [[u32; 3]; 5] = [
    [16, 17, 18],
    [1, 2, 3],
    [5, 6, 7],
    [9, 10, 11],
    [13, 14, 15],
];

/// Number of keys, and so of bits, in a chord.
pub const CHORD_BITS: usize = 20;

/// Mask of every bit a chord can occupy.
pub const CHORD_MASK: u32 = (1 << CHORD_BITS) - 1;

/// Column of a finger key within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum FingerColumn {
    Right = 0,
    Middle = 1,
    Left = 2,
}

impl FingerColumn {
    /// Notation letter for this column.
    pub fn letter(self) -> char {
        match self {
            FingerColumn::Right => 'R',
            FingerColumn::Middle => 'M',
            FingerColumn::Left => 'L',
        }
    }

    /// Parses an uppercase notation letter.
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'R' => Some(FingerColumn::Right),
            'M' => Some(FingerColumn::Middle),
            'L' => Some(FingerColumn::Left),
            _ => None,
        }
    }
}

/// A combination of simultaneously pressed device keys.
///
/// Value type: two chords are equal exactly when the same cells are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Chord {
    pub thumbs: [bool; 5],
    /// `fingers[row][column]`, columns indexed by [`FingerColumn`].
    pub fingers: [[bool; 3]; 5],
}

impl Chord {
    /// Packs the chord into its device bitmask.
    pub fn to_bits(&self) -> u32 {
        let mut value = 0u32;
        for (set, bit) in self.thumbs.iter().zip(THUMB_BITS) {
            if *set {
                value |= 1 << bit;
            }
        }
        for (row, bits) in self.fingers.iter().zip(FINGER_BITS) {
            for (set, bit) in row.iter().zip(bits) {
                if *set {
                    value |= 1 << bit;
                }
            }
        }
        value
    }

    /// Unpacks a device bitmask.  Bits above bit 19 are ignored.
    pub fn from_bits(value: u32) -> Self {
        let mut chord = Chord::default();
        for (set, bit) in chord.thumbs.iter_mut().zip(THUMB_BITS) {
            *set = value & (1 << bit) != 0;
        }
        for (row, bits) in chord.fingers.iter_mut().zip(FINGER_BITS) {
            for (set, bit) in row.iter_mut().zip(bits) {
                *set = value & (1 << bit) != 0;
            }
        }
        chord
    }

    /// Returns `true` when no cell is set.
    pub fn is_empty(&self) -> bool {
        self.to_bits() == 0
    }

    pub fn set_thumb(&mut self, index: usize) {
        self.thumbs[index] = true;
    }

    pub fn set_finger(&mut self, row: usize, column: FingerColumn) {
        self.fingers[row][column as usize] = true;
    }

    pub fn finger(&self, row: usize, column: FingerColumn) -> bool {
        self.fingers[row][column as usize]
    }
}
