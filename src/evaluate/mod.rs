//! Position evaluation: material, mobility, piece-square tables, king
//! safety, and game-phase detection, memoized per perspective.
//!
//! The white-perspective and black-perspective evaluators are two explicit
//! walks rather than one walk negated; larger is always better for the
//! requested perspective. Callers must have recomputed protections since the
//! last board mutation — the king-safety term reads the protection flags.

pub mod cache;
pub mod tables;

use crate::board::color::Color;
use crate::board::error::BoardError;
use crate::board::piece::PieceKind;
use crate::board::Board;
use crate::move_generation::protected_count;

use cache::EvalCache;

const CHECK_PENALTY: i32 = 150;
const UNCASTLED_CHECK_PENALTY: i32 = 100;
const CASTLE_BONUS: i32 = 60;
const LOST_CASTLE_PENALTY: i32 = 40;
const BISHOP_PAIR_BONUS: i32 = 30;

#[derive(Default, Debug)]
pub struct Evaluator {
    white_cache: EvalCache,
    black_cache: EvalCache,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores `board` for `perspective`, consulting the per-perspective
    /// cache first and storing on miss.
    pub fn score(&mut self, board: &Board, perspective: Color) -> Result<i32, BoardError> {
        let key = board.encode();
        if let Some(score) = self.cache_mut(perspective).probe(&key) {
            return Ok(score);
        }
        let score = match perspective {
            Color::White => white_perspective_score(board)?,
            Color::Black => black_perspective_score(board)?,
        };
        self.cache_mut(perspective).store(key, score);
        Ok(score)
    }

    /// Drops all memoized scores. Required between unrelated games.
    pub fn clear(&mut self) {
        self.white_cache.clear();
        self.black_cache.clear();
    }

    pub fn cache(&self, perspective: Color) -> &EvalCache {
        match perspective {
            Color::White => &self.white_cache,
            Color::Black => &self.black_cache,
        }
    }

    fn cache_mut(&mut self, perspective: Color) -> &mut EvalCache {
        match perspective {
            Color::White => &mut self.white_cache,
            Color::Black => &mut self.black_cache,
        }
    }
}

fn white_perspective_score(board: &Board) -> Result<i32, BoardError> {
    let endgame = is_endgame(board);
    let own = side_score(board, Color::White, endgame)?;
    let opponent = side_score(board, Color::Black, endgame)?;
    Ok(own - opponent)
}

fn black_perspective_score(board: &Board) -> Result<i32, BoardError> {
    let endgame = is_endgame(board);
    let own = side_score(board, Color::Black, endgame)?;
    let opponent = side_score(board, Color::White, endgame)?;
    Ok(own - opponent)
}

fn side_score(board: &Board, color: Color, endgame: bool) -> Result<i32, BoardError> {
    let mut score = 0i32;
    for entry in board.pieces(color).entries() {
        score += entry.kind.material_value();
        score += protected_count(board, entry.square) as i32;
        score += tables::table(entry.kind, color, endgame)[entry.square.index()];
    }
    score += king_safety(board, color)?;
    if !endgame && board.pieces(color).count_of(PieceKind::Bishop) >= 2 {
        score += BISHOP_PAIR_BONUS;
    }
    Ok(score)
}

fn king_safety(board: &Board, color: Color) -> Result<i32, BoardError> {
    let king_square = board.king_square(color)?;
    let king = board
        .piece_at(king_square)
        .ok_or(BoardError::MissingKing { color })?;

    let home_row = crate::chess_move::ChessMove::home_row(color);
    let castled = king.move_count == 1
        && king_square.row() == home_row
        && (king_square.col() == 2 || king_square.col() == 6);

    let mut score = 0i32;
    if board.in_check(color)? {
        score -= CHECK_PENALTY;
        if king.has_moved() && !castled {
            score -= UNCASTLED_CHECK_PENALTY;
        }
    }
    if castled {
        score += CASTLE_BONUS;
    } else if king.has_moved() {
        score -= LOST_CASTLE_PENALTY;
    }
    Ok(score)
}

/// Endgame when both sides are down to a bare major-piece inventory: no
/// queen and at most one rook, or a queen with no rook at all.
pub fn is_endgame(board: &Board) -> bool {
    Color::ALL.iter().all(|&color| {
        let queens = board.pieces(color).count_of(PieceKind::Queen);
        let rooks = board.pieces(color).count_of(PieceKind::Rook);
        (queens == 0 && rooks <= 1) || (queens == 1 && rooks == 0)
    })
}
