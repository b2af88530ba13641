//! In-place move application and its exact inverse.
//!
//! Apply/verify/unmake is the single legality mechanism shared by move
//! enumeration and search: a move is played provisionally, the mover's king
//! is tested for check against freshly recomputed protections, and illegal
//! moves are unwound before they are ever counted as candidates.

use crate::board::color::Color;
use crate::board::error::BoardError;
use crate::board::piece::{Piece, PieceKind};
use crate::board::piece_list::ListEntry;
use crate::board::square::Square;
use crate::board::Board;

use super::ChessMove;

/// Everything needed to restore the position exactly: the mover as it was
/// before the move (move count, double-step flag, pre-promotion kind), any
/// captured piece with its original list index for position-preserving
/// reinsertion, and the rook relocation for castles.
#[derive(Debug)]
pub struct Undo {
    kind: UndoKind,
}

#[derive(Debug)]
enum UndoKind {
    Standard {
        from: Square,
        to: Square,
        prior_piece: Piece,
        promoted_from_index: Option<usize>,
        captured: Option<CapturedPiece>,
    },
    Castle {
        color: Color,
        king_from: Square,
        king_to: Square,
        rook_from: Square,
        rook_to: Square,
        prior_king: Piece,
        prior_rook: Piece,
    },
}

#[derive(Debug)]
struct CapturedPiece {
    piece: Piece,
    square: Square,
    list_index: usize,
}

impl Undo {
    pub fn mover_color(&self) -> Color {
        match &self.kind {
            UndoKind::Standard { prior_piece, .. } => prior_piece.color,
            UndoKind::Castle { color, .. } => *color,
        }
    }
}

pub fn apply(board: &mut Board, chess_move: &ChessMove) -> Result<Undo, BoardError> {
    let undo = match chess_move {
        ChessMove::Standard { from, to } => apply_standard(board, *from, *to, false)?,
        ChessMove::Promotion { from, to } => apply_standard(board, *from, *to, true)?,
        ChessMove::Castle { color, side } => apply_castle(board, *color, *side)?,
    };
    board.recompute_protections();
    Ok(undo)
}

pub fn undo(board: &mut Board, undo: Undo) -> Result<(), BoardError> {
    match undo.kind {
        UndoKind::Standard {
            from,
            to,
            prior_piece,
            promoted_from_index,
            captured,
        } => {
            board.tile_mut(to).occupant = None;
            let mover = board.pieces_mut(prior_piece.color);
            match promoted_from_index {
                Some(pawn_index) => {
                    let queen_index = mover
                        .index_of(to)
                        .ok_or(BoardError::ListBoardMismatch { square: to })?;
                    mover.remove_at(queen_index);
                    mover.insert_at(
                        pawn_index,
                        ListEntry {
                            square: from,
                            kind: PieceKind::Pawn,
                        },
                    );
                }
                None => {
                    mover
                        .relocate(to, from)
                        .ok_or(BoardError::ListBoardMismatch { square: to })?;
                }
            }
            board.tile_mut(from).occupant = Some(prior_piece);

            if let Some(cap) = captured {
                board.tile_mut(cap.square).occupant = Some(cap.piece);
                board.pieces_mut(cap.piece.color).insert_at(
                    cap.list_index,
                    ListEntry {
                        square: cap.square,
                        kind: cap.piece.kind,
                    },
                );
            }
        }
        UndoKind::Castle {
            color,
            king_from,
            king_to,
            rook_from,
            rook_to,
            prior_king,
            prior_rook,
        } => {
            board.tile_mut(king_to).occupant = None;
            board.tile_mut(rook_to).occupant = None;
            board.tile_mut(king_from).occupant = Some(prior_king);
            board.tile_mut(rook_from).occupant = Some(prior_rook);
            let list = board.pieces_mut(color);
            list.relocate(king_to, king_from)
                .ok_or(BoardError::ListBoardMismatch { square: king_to })?;
            list.relocate(rook_to, rook_from)
                .ok_or(BoardError::ListBoardMismatch { square: rook_to })?;
        }
    }
    board.recompute_protections();
    Ok(())
}

/// Applies the move, then verifies the mover's king is not left in check.
/// Illegal moves are unwound immediately and reported as `None`.
pub fn apply_verified(board: &mut Board, chess_move: &ChessMove) -> Result<Option<Undo>, BoardError> {
    let applied = apply(board, chess_move)?;
    if board.in_check(applied.mover_color())? {
        undo(board, applied)?;
        return Ok(None);
    }
    Ok(Some(applied))
}

/// Runs `f` with the move provisionally applied, unwinding on every exit
/// path. `Ok(None)` means the move was illegal and was never visible to `f`.
pub fn with_applied<R>(
    board: &mut Board,
    chess_move: &ChessMove,
    f: impl FnOnce(&mut Board) -> R,
) -> Result<Option<R>, BoardError> {
    let applied = match apply_verified(board, chess_move)? {
        Some(applied) => applied,
        None => return Ok(None),
    };
    let result = f(board);
    undo(board, applied)?;
    Ok(Some(result))
}

fn apply_standard(
    board: &mut Board,
    from: Square,
    to: Square,
    promote: bool,
) -> Result<Undo, BoardError> {
    let prior_piece = board.piece_at(from).ok_or(BoardError::FromSquareIsEmpty)?;
    if promote && prior_piece.kind != PieceKind::Pawn {
        return Err(BoardError::PromotionNonPawn);
    }

    let captured = match board.piece_at(to) {
        Some(victim) => {
            let enemy = board.pieces_mut(victim.color);
            let list_index = enemy
                .index_of(to)
                .ok_or(BoardError::ListBoardMismatch { square: to })?;
            enemy.remove_at(list_index);
            board.tile_mut(to).occupant = None;
            Some(CapturedPiece {
                piece: victim,
                square: to,
                list_index,
            })
        }
        None => None,
    };

    let mut moved = prior_piece;
    moved.move_count += 1;
    moved.just_double_stepped = prior_piece.kind == PieceKind::Pawn
        && (from.row() as i8 - to.row() as i8).abs() == 2;
    if promote {
        moved.kind = PieceKind::Queen;
    }

    let mover = board.pieces_mut(prior_piece.color);
    let promoted_from_index = if promote {
        let pawn_index = mover
            .index_of(from)
            .ok_or(BoardError::ListBoardMismatch { square: from })?;
        mover.remove_at(pawn_index);
        mover.insert_sorted(to, PieceKind::Queen);
        Some(pawn_index)
    } else {
        mover
            .relocate(from, to)
            .ok_or(BoardError::ListBoardMismatch { square: from })?;
        None
    };

    board.tile_mut(from).occupant = None;
    board.tile_mut(to).occupant = Some(moved);

    Ok(Undo {
        kind: UndoKind::Standard {
            from,
            to,
            prior_piece,
            promoted_from_index,
            captured,
        },
    })
}

fn apply_castle(
    board: &mut Board,
    color: Color,
    side: super::CastleSide,
) -> Result<Undo, BoardError> {
    let (king_from, king_to, rook_from, rook_to) = ChessMove::castle_squares(color, side);

    let prior_king = board.piece_at(king_from).ok_or(BoardError::CastleNonKing)?;
    if prior_king.kind != PieceKind::King {
        return Err(BoardError::CastleNonKing);
    }
    let prior_rook = board
        .piece_at(rook_from)
        .ok_or(BoardError::CastleMissingRook)?;
    if prior_rook.kind != PieceKind::Rook {
        return Err(BoardError::CastleMissingRook);
    }

    let mut moved_king = prior_king;
    moved_king.move_count += 1;
    let mut moved_rook = prior_rook;
    moved_rook.move_count += 1;

    board.tile_mut(king_from).occupant = None;
    board.tile_mut(rook_from).occupant = None;
    board.tile_mut(king_to).occupant = Some(moved_king);
    board.tile_mut(rook_to).occupant = Some(moved_rook);

    let list = board.pieces_mut(color);
    list.relocate(king_from, king_to)
        .ok_or(BoardError::ListBoardMismatch { square: king_from })?;
    list.relocate(rook_from, rook_to)
        .ok_or(BoardError::ListBoardMismatch { square: rook_from })?;

    Ok(Undo {
        kind: UndoKind::Castle {
            color,
            king_from,
            king_to,
            rook_from,
            rook_to,
            prior_king,
            prior_rook,
        },
    })
}
