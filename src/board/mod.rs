pub mod color;
pub mod error;
pub mod piece;
pub mod piece_list;
pub mod square;

mod display;

use color::Color;
use error::BoardError;
use piece::{Piece, PieceKind};
use piece_list::PieceList;
use square::Square;

/// One square of the 8×8 grid. The protection flags are a derived cache:
/// they are only meaningful after `recompute_protections` has run against the
/// current piece set, and every mutation invalidates them.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tile {
    pub occupant: Option<Piece>,
    pub protected_by_white: bool,
    pub protected_by_black: bool,
}

impl Tile {
    pub fn protected_by(&self, color: Color) -> bool {
        match color {
            Color::White => self.protected_by_white,
            Color::Black => self.protected_by_black,
        }
    }
}

/// The full position: the tile grid plus both sides' ordered piece lists and
/// the side to move. The grid is the source of truth for piece data; the
/// lists index into it and every mutation keeps the two in agreement before
/// any check-detection query runs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    tiles: [Tile; 64],
    white: PieceList,
    black: PieceList,
    turn: Color,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            tiles: [Tile::default(); 64],
            white: PieceList::new(),
            black: PieceList::new(),
            turn: Color::White,
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn starting_position() -> Self {
        crate::position! {
            rnbqkbnr
            pppppppp
            ........
            ........
            ........
            ........
            PPPPPPPP
            RNBQKBNR
        }
    }

    pub fn tile(&self, square: Square) -> &Tile {
        &self.tiles[square.index()]
    }

    pub fn tile_at(&self, row: u8, col: u8) -> Result<&Tile, BoardError> {
        let square = Square::new(row, col)?;
        Ok(self.tile(square))
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.tiles[square.index()].occupant
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.piece_at(square).is_some()
    }

    pub fn pieces(&self, color: Color) -> &PieceList {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn king_square(&self, color: Color) -> Result<Square, BoardError> {
        self.pieces(color)
            .king_square()
            .ok_or(BoardError::MissingKing { color })
    }

    pub fn put(&mut self, square: Square, piece: Piece) -> Result<(), BoardError> {
        if self.is_occupied(square) {
            return Err(BoardError::SquareOccupied);
        }
        self.tiles[square.index()].occupant = Some(piece);
        self.pieces_mut(piece.color).insert_sorted(square, piece.kind);
        Ok(())
    }

    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.tiles[square.index()].occupant.take()?;
        let list = self.pieces_mut(piece.color);
        if let Some(index) = list.index_of(square) {
            list.remove_at(index);
        }
        Some(piece)
    }

    pub fn clear(&mut self) {
        *self = Board {
            turn: self.turn,
            ..Default::default()
        };
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn set_turn(&mut self, turn: Color) -> Color {
        self.turn = turn;
        turn
    }

    pub fn toggle_turn(&mut self) -> Color {
        self.turn = self.turn.opposite();
        self.turn
    }

    /// True iff `color`'s king stands on a tile protected by the opponent.
    /// Only meaningful right after `recompute_protections`.
    pub fn in_check(&self, color: Color) -> Result<bool, BoardError> {
        let king_square = self.king_square(color)?;
        Ok(self.tile(king_square).protected_by(color.opposite()))
    }

    /// Recomputes every tile's protected-by flags by asking each piece for
    /// its protected tiles. O(pieces × reach). Must run after the most recent
    /// mutation before any protection flag is read.
    pub fn recompute_protections(&mut self) {
        for tile in self.tiles.iter_mut() {
            tile.protected_by_white = false;
            tile.protected_by_black = false;
        }
        for &color in &Color::ALL {
            let squares: smallvec::SmallVec<[Square; 16]> = self
                .pieces(color)
                .entries()
                .iter()
                .map(|e| e.square)
                .collect();
            for from in squares {
                crate::move_generation::mark_protected_tiles(self, from, color);
            }
        }
    }

    pub(crate) fn set_protected(&mut self, square: Square, color: Color) {
        match color {
            Color::White => self.tiles[square.index()].protected_by_white = true,
            Color::Black => self.tiles[square.index()].protected_by_black = true,
        }
    }

    /// Canonical position encoding used by the evaluation cache and the
    /// repetition table. Scanning the grid in tile order makes the encoding
    /// independent of piece-list order within a side, while keeping the two
    /// sides' sections ordered (white first).
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(6 * 32);
        for &color in &[Color::White, Color::Black] {
            for index in 0..64 {
                let square = Square::from_index(index).expect("tile scan index in range");
                if let Some(piece) = self.piece_at(square) {
                    if piece.color != color {
                        continue;
                    }
                    let moved_class = piece.move_count.min(2);
                    out.push(piece.kind.to_fen(piece.color));
                    out.push_str(&square.to_algebraic());
                    out.push(char::from(b'0' + moved_class as u8));
                }
            }
            out.push('/');
        }
        out
    }

    /// Checks that the grid and both lists agree exactly. A failure here is
    /// an unrecoverable internal error in move application.
    pub fn validate(&self) -> Result<(), BoardError> {
        for &color in &Color::ALL {
            let list = self.pieces(color);
            if !list.is_sorted() {
                if let Some(entry) = list.entries().first() {
                    return Err(BoardError::ListBoardMismatch {
                        square: entry.square,
                    });
                }
            }
            for entry in list.entries() {
                match self.piece_at(entry.square) {
                    Some(piece) if piece.color == color && piece.kind == entry.kind => {}
                    _ => {
                        return Err(BoardError::ListBoardMismatch {
                            square: entry.square,
                        })
                    }
                }
            }
        }
        for index in 0..64 {
            let square = Square::from_index(index)?;
            if let Some(piece) = self.piece_at(square) {
                if self.pieces(piece.color).index_of(square).is_none() {
                    return Err(BoardError::ListBoardMismatch { square });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn pieces_mut(&mut self, color: Color) -> &mut PieceList {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    pub(crate) fn tile_mut(&mut self, square: Square) -> &mut Tile {
        &mut self.tiles[square.index()]
    }

    /// Builds a board from 64 fixture characters ('.' for empty), row 0
    /// (black's back rank) first. Move counts are inferred: pawns off their
    /// home rank, and kings or rooks off their home squares, are marked as
    /// having moved so that double-step and castling eligibility come out
    /// right for test fixtures.
    pub fn from_fixture(cells: &[char]) -> Self {
        assert_eq!(
            cells.len(),
            64,
            "fixture must contain exactly 64 squares, got {}",
            cells.len()
        );
        let mut board = Board::new();
        for (index, &c) in cells.iter().enumerate() {
            if c == '.' {
                continue;
            }
            let (kind, color) = PieceKind::from_fen(c)
                .unwrap_or_else(|| panic!("invalid fixture character `{}`", c));
            let square = Square::from_index(index).unwrap();
            let move_count = if fixture_piece_is_on_home_square(kind, color, square) {
                0
            } else {
                1
            };
            board
                .put(square, Piece::with_move_count(kind, color, move_count))
                .expect("fixture squares are distinct");
        }
        board
    }

    pub fn set_move_count(&mut self, square: Square, move_count: u16) {
        if let Some(piece) = self.tiles[square.index()].occupant.as_mut() {
            piece.move_count = move_count;
        }
    }
}

fn fixture_piece_is_on_home_square(kind: PieceKind, color: Color, square: Square) -> bool {
    let home_row = match color {
        Color::White => 7,
        Color::Black => 0,
    };
    match kind {
        PieceKind::Pawn => {
            let pawn_row = match color {
                Color::White => 6,
                Color::Black => 1,
            };
            square.row() == pawn_row
        }
        PieceKind::King => square.row() == home_row && square.col() == 4,
        PieceKind::Rook => square.row() == home_row && (square.col() == 0 || square.col() == 7),
        _ => true,
    }
}
