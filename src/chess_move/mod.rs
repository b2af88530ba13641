pub mod apply;

use std::fmt;

use crate::board::color::Color;
use crate::board::square::Square;
use crate::board::Board;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// King destination column for the castle-bonus check in evaluation.
    pub fn king_destination_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    pub fn rook_home_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    pub fn rook_destination_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }
}

/// A single move. Promotion is its own variant so root-move descriptions and
/// move ordering can distinguish it; the promoted piece is always a queen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChessMove {
    Standard { from: Square, to: Square },
    Promotion { from: Square, to: Square },
    Castle { color: Color, side: CastleSide },
}

impl ChessMove {
    pub fn home_row(color: Color) -> u8 {
        match color {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn castle_squares(color: Color, side: CastleSide) -> (Square, Square, Square, Square) {
        let row = Self::home_row(color);
        let king_from = Square::new(row, 4).expect("king home square in range");
        let king_to = Square::new(row, side.king_destination_col()).expect("in range");
        let rook_from = Square::new(row, side.rook_home_col()).expect("in range");
        let rook_to = Square::new(row, side.rook_destination_col()).expect("in range");
        (king_from, king_to, rook_from, rook_to)
    }

    /// Human-readable description, built against the pre-move board so that
    /// captures render with an `x`.
    pub fn describe(&self, board: &Board) -> String {
        match self {
            ChessMove::Castle {
                side: CastleSide::Kingside,
                ..
            } => "O-O".to_string(),
            ChessMove::Castle {
                side: CastleSide::Queenside,
                ..
            } => "O-O-O".to_string(),
            ChessMove::Standard { from, to } | ChessMove::Promotion { from, to } => {
                let letter = board
                    .piece_at(*from)
                    .and_then(|piece| piece.kind.letter())
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                let separator = if board.is_occupied(*to) { 'x' } else { '-' };
                let suffix = match self {
                    ChessMove::Promotion { .. } => "=Q",
                    _ => "",
                };
                format!("{}{}{}{}{}", letter, from, separator, to, suffix)
            }
        }
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChessMove::Standard { from, to } => write!(f, "{}-{}", from, to),
            ChessMove::Promotion { from, to } => write!(f, "{}-{}=Q", from, to),
            ChessMove::Castle {
                side: CastleSide::Kingside,
                ..
            } => write!(f, "O-O"),
            ChessMove::Castle {
                side: CastleSide::Queenside,
                ..
            } => write!(f, "O-O-O"),
        }
    }
}

/// Shorthand for a standard move between two algebraic squares.
#[macro_export]
macro_rules! std_move {
    ($from:expr, $to:expr) => {
        $crate::chess_move::ChessMove::Standard {
            from: $crate::sq!($from),
            to: $crate::sq!($to),
        }
    };
}
