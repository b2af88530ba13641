use std::fmt;

use super::square::Square;
use super::Board;

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8u8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8u8 {
                let square = Square::new(row, col).expect("display coordinates in range");
                let c = match self.piece_at(square) {
                    Some(piece) => piece.kind.to_fen(piece.color),
                    None => '.',
                };
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

/// Builds a `Board` from an 8×8 character diagram written from white's
/// perspective (first row is black's back rank). Pawns off their home rank
/// and kings/rooks off their home squares get a nonzero move count, so
/// double-step and castling eligibility behave naturally in fixtures.
#[macro_export]
macro_rules! position {
    ($($piece:tt)*) => {{
        let cells: Vec<char> = stringify!($($piece)*)
            .chars()
            .filter(|&c| !c.is_whitespace())
            .collect();
        $crate::board::Board::from_fixture(&cells)
    }};
}
