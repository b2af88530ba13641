//! Piece-square tables, indexed by `row * 8 + col` with row 0 at black's
//! back rank. The white tables are written out; the black tables are the
//! white tables vertically mirrored, derived once at startup.

use once_cell::sync::Lazy;

use crate::board::color::Color;
use crate::board::piece::PieceKind;

pub type SquareTable = [i32; 64];

#[rustfmt::skip]
pub const WHITE_PAWN: SquareTable = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
pub const WHITE_KNIGHT: SquareTable = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
pub const WHITE_BISHOP: SquareTable = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
pub const WHITE_ROOK: SquareTable = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
pub const WHITE_QUEEN: SquareTable = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

/// Corner-favoring king table for the middlegame: stay castled, stay home.
#[rustfmt::skip]
pub const WHITE_KING_MIDGAME: SquareTable = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

/// Center-favoring king table for the endgame: the king becomes a fighter.
#[rustfmt::skip]
pub const WHITE_KING_ENDGAME: SquareTable = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

fn mirror(table: &SquareTable) -> SquareTable {
    let mut mirrored = [0; 64];
    for row in 0..8 {
        for col in 0..8 {
            mirrored[row * 8 + col] = table[(7 - row) * 8 + col];
        }
    }
    mirrored
}

struct BlackTables {
    pawn: SquareTable,
    knight: SquareTable,
    bishop: SquareTable,
    rook: SquareTable,
    queen: SquareTable,
    king_midgame: SquareTable,
    king_endgame: SquareTable,
}

static BLACK_TABLES: Lazy<BlackTables> = Lazy::new(|| BlackTables {
    pawn: mirror(&WHITE_PAWN),
    knight: mirror(&WHITE_KNIGHT),
    bishop: mirror(&WHITE_BISHOP),
    rook: mirror(&WHITE_ROOK),
    queen: mirror(&WHITE_QUEEN),
    king_midgame: mirror(&WHITE_KING_MIDGAME),
    king_endgame: mirror(&WHITE_KING_ENDGAME),
});

pub fn white_table(kind: PieceKind, endgame: bool) -> &'static SquareTable {
    match kind {
        PieceKind::Pawn => &WHITE_PAWN,
        PieceKind::Knight => &WHITE_KNIGHT,
        PieceKind::Bishop => &WHITE_BISHOP,
        PieceKind::Rook => &WHITE_ROOK,
        PieceKind::Queen => &WHITE_QUEEN,
        PieceKind::King if endgame => &WHITE_KING_ENDGAME,
        PieceKind::King => &WHITE_KING_MIDGAME,
    }
}

pub fn black_table(kind: PieceKind, endgame: bool) -> &'static SquareTable {
    match kind {
        PieceKind::Pawn => &BLACK_TABLES.pawn,
        PieceKind::Knight => &BLACK_TABLES.knight,
        PieceKind::Bishop => &BLACK_TABLES.bishop,
        PieceKind::Rook => &BLACK_TABLES.rook,
        PieceKind::Queen => &BLACK_TABLES.queen,
        PieceKind::King if endgame => &BLACK_TABLES.king_endgame,
        PieceKind::King => &BLACK_TABLES.king_midgame,
    }
}

pub fn table(kind: PieceKind, color: Color, endgame: bool) -> &'static SquareTable {
    match color {
        Color::White => white_table(kind, endgame),
        Color::Black => black_table(kind, endgame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::piece::ALL_KINDS;

    /// For every piece kind and both game phases: column `c` of the white
    /// table reversed equals column `c` of the black table, for all 8
    /// columns.
    #[test]
    fn test_black_tables_are_vertical_mirrors() {
        for &kind in &ALL_KINDS {
            for endgame in [false, true] {
                let white = white_table(kind, endgame);
                let black = black_table(kind, endgame);
                for col in 0..8 {
                    let white_column: Vec<i32> =
                        (0..8).map(|row| white[row * 8 + col]).collect();
                    let black_column: Vec<i32> =
                        (0..8).map(|row| black[row * 8 + col]).collect();
                    let mut reversed = white_column.clone();
                    reversed.reverse();
                    assert_eq!(
                        reversed, black_column,
                        "column {} of {:?} (endgame={}) is not mirrored",
                        col, kind, endgame
                    );
                }
            }
        }
    }

    #[test]
    fn test_white_pawn_table_rewards_advancement() {
        // row 1 (the promotion rank) outscores the home rank everywhere
        for col in 0..8 {
            assert!(WHITE_PAWN[8 + col] > WHITE_PAWN[48 + col]);
        }
    }
}
