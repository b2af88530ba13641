use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::BoardError;

/// A board coordinate. Row 0 is black's back rank (rank 8 in algebraic
/// notation), row 7 is white's back rank. Column 0 is the a-file.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

static ALGEBRAIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^([a-hA-H])([1-8])$").expect("algebraic square regex is valid"));

impl Square {
    pub fn new(row: u8, col: u8) -> Result<Self, BoardError> {
        if row > 7 || col > 7 {
            return Err(BoardError::SquareOutOfRange { row, col });
        }
        Ok(Self { row, col })
    }

    pub fn from_index(index: usize) -> Result<Self, BoardError> {
        if index >= 64 {
            return Err(BoardError::IndexOutOfRange { index });
        }
        Ok(Self {
            row: (index / 8) as u8,
            col: (index % 8) as u8,
        })
    }

    pub fn from_algebraic(coord: &str) -> Result<Self, BoardError> {
        let caps = ALGEBRAIC_RE
            .captures(coord)
            .ok_or_else(|| BoardError::InvalidAlgebraicSquare {
                coord: coord.to_string(),
            })?;
        let file_char = caps[1].chars().next().unwrap().to_ascii_lowercase();
        let rank_digit = caps[2].chars().next().unwrap().to_digit(10).unwrap() as u8;

        let col = file_char as u8 - b'a';
        let row = 8 - rank_digit;
        Self::new(row, col)
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    pub fn index(&self) -> usize {
        self.row as usize * 8 + self.col as usize
    }

    /// The square offset by `(d_row, d_col)`, or `None` if it falls off the
    /// board. This is the edge guard used by every stepper and slider.
    pub fn offset(&self, d_row: i8, d_col: i8) -> Option<Square> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if !(0..8).contains(&row) || !(0..8).contains(&col) {
            return None;
        }
        Some(Square {
            row: row as u8,
            col: col as u8,
        })
    }

    pub fn to_algebraic(&self) -> String {
        let file = (b'a' + self.col) as char;
        let rank = 8 - self.row;
        format!("{}{}", file, rank)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

/// Shorthand for building a known-good square in tests and tables.
#[macro_export]
macro_rules! sq {
    ($coord:expr) => {
        $crate::board::square::Square::from_algebraic($coord).unwrap()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algebraic_round_trip() {
        for index in 0..64 {
            let square = Square::from_index(index).unwrap();
            let algebraic = square.to_algebraic();
            assert_eq!(square, Square::from_algebraic(&algebraic).unwrap());
        }
    }

    #[test]
    fn test_row_numbering() {
        // e2 is a white pawn's home square, one row up from white's back rank.
        let e2 = Square::from_algebraic("e2").unwrap();
        assert_eq!((e2.row(), e2.col()), (6, 4));

        let a8 = Square::from_algebraic("a8").unwrap();
        assert_eq!((a8.row(), a8.col()), (0, 0));
        assert_eq!(a8.index(), 0);

        let h1 = Square::from_algebraic("H1").unwrap();
        assert_eq!((h1.row(), h1.col()), (7, 7));
        assert_eq!(h1.index(), 63);
    }

    #[test]
    fn test_out_of_range() {
        assert!(Square::new(8, 0).is_err());
        assert!(Square::from_index(64).is_err());
        assert!(Square::from_algebraic("i9").is_err());
        assert!(Square::from_algebraic("e0").is_err());
    }

    #[test]
    fn test_offset_edge_guard() {
        let a8 = Square::from_algebraic("a8").unwrap();
        assert!(a8.offset(-1, 0).is_none());
        assert!(a8.offset(0, -1).is_none());
        assert_eq!(a8.offset(1, 1), Some(Square::from_algebraic("b7").unwrap()));
    }
}
