//! Per-piece move, attack, and protection enumeration, driven by direction
//! tables so sliders and steppers share one implementation.
//!
//! Targets are computed freshly on every call; nothing here is cached. The
//! protection flags written by `mark_protected_tiles` include one square
//! "through" a blocking enemy king, so the king can never legally step behind
//! a covered blocker.

use log::debug;
use smallvec::SmallVec;

use crate::board::color::Color;
use crate::board::piece::PieceKind;
use crate::board::square::Square;
use crate::board::Board;
use crate::chess_move::apply::with_applied;
use crate::chess_move::{CastleSide, ChessMove};

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROYAL_DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub type TargetList = SmallVec<[Square; 16]>;

fn pawn_forward(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}

/// The rank a pawn promotes on: row 1 for white and row 6 for black, one
/// square shy of the board edge. A pawn therefore never stands on the final
/// two rows of its direction of travel.
pub fn promotion_row(color: Color) -> u8 {
    match color {
        Color::White => 1,
        Color::Black => 6,
    }
}

fn slider_directions(kind: PieceKind) -> Option<&'static [(i8, i8)]> {
    match kind {
        PieceKind::Bishop => Some(&BISHOP_DIRECTIONS),
        PieceKind::Rook => Some(&ROOK_DIRECTIONS),
        PieceKind::Queen => Some(&ROYAL_DIRECTIONS),
        _ => None,
    }
}

fn stepper_offsets(kind: PieceKind) -> Option<&'static [(i8, i8)]> {
    match kind {
        PieceKind::Knight => Some(&KNIGHT_OFFSETS),
        PieceKind::King => Some(&ROYAL_DIRECTIONS),
        _ => None,
    }
}

/// Non-capturing destinations for the piece on `from`.
pub fn move_targets(board: &Board, from: Square) -> TargetList {
    let mut targets = TargetList::new();
    let piece = match board.piece_at(from) {
        Some(piece) => piece,
        None => return targets,
    };

    if piece.kind == PieceKind::Pawn {
        let dir = pawn_forward(piece.color);
        if let Some(one) = from.offset(dir, 0) {
            if !board.is_occupied(one) {
                targets.push(one);
                if piece.move_count == 0 {
                    if let Some(two) = from.offset(2 * dir, 0) {
                        if !board.is_occupied(two) {
                            targets.push(two);
                        }
                    }
                }
            }
        }
        return targets;
    }

    if let Some(offsets) = stepper_offsets(piece.kind) {
        for &(d_row, d_col) in offsets {
            if let Some(to) = from.offset(d_row, d_col) {
                if !board.is_occupied(to) {
                    targets.push(to);
                }
            }
        }
        return targets;
    }

    let directions = slider_directions(piece.kind).expect("every kind is a pawn, stepper, or slider");
    for &(d_row, d_col) in directions {
        let mut current = from;
        while let Some(to) = current.offset(d_row, d_col) {
            if board.is_occupied(to) {
                break;
            }
            targets.push(to);
            current = to;
        }
    }
    targets
}

/// Capturing destinations for the piece on `from`. The enemy king is never a
/// target: capturing the king is illegal and must never be enumerated.
pub fn attack_targets(board: &Board, from: Square) -> TargetList {
    let mut targets = TargetList::new();
    let piece = match board.piece_at(from) {
        Some(piece) => piece,
        None => return targets,
    };

    let mut push_if_capturable = |targets: &mut TargetList, to: Square| {
        if let Some(victim) = board.piece_at(to) {
            if victim.color != piece.color && victim.kind != PieceKind::King {
                targets.push(to);
            }
        }
    };

    if piece.kind == PieceKind::Pawn {
        let dir = pawn_forward(piece.color);
        for d_col in [-1, 1] {
            if let Some(to) = from.offset(dir, d_col) {
                push_if_capturable(&mut targets, to);
            }
        }
        return targets;
    }

    if let Some(offsets) = stepper_offsets(piece.kind) {
        for &(d_row, d_col) in offsets {
            if let Some(to) = from.offset(d_row, d_col) {
                push_if_capturable(&mut targets, to);
            }
        }
        return targets;
    }

    let directions = slider_directions(piece.kind).expect("every kind is a pawn, stepper, or slider");
    for &(d_row, d_col) in directions {
        let mut current = from;
        while let Some(to) = current.offset(d_row, d_col) {
            if board.is_occupied(to) {
                push_if_capturable(&mut targets, to);
                break;
            }
            current = to;
        }
    }
    targets
}

/// Marks every tile the piece on `from` defends. Sliders mark one square past
/// a blocking enemy king (the x-ray), pawns mark both forward diagonals
/// regardless of occupancy.
pub fn mark_protected_tiles(board: &mut Board, from: Square, color: Color) {
    let piece = match board.piece_at(from) {
        Some(piece) if piece.color == color => piece,
        _ => return,
    };

    if piece.kind == PieceKind::Pawn {
        let dir = pawn_forward(color);
        for d_col in [-1, 1] {
            if let Some(to) = from.offset(dir, d_col) {
                board.set_protected(to, color);
            }
        }
        return;
    }

    if let Some(offsets) = stepper_offsets(piece.kind) {
        for &(d_row, d_col) in offsets {
            if let Some(to) = from.offset(d_row, d_col) {
                board.set_protected(to, color);
            }
        }
        return;
    }

    let directions = slider_directions(piece.kind).expect("every kind is a pawn, stepper, or slider");
    for &(d_row, d_col) in directions {
        let mut current = from;
        while let Some(to) = current.offset(d_row, d_col) {
            board.set_protected(to, color);
            match board.piece_at(to) {
                Some(blocker) => {
                    if blocker.kind == PieceKind::King && blocker.color != color {
                        // x-ray: cover the square behind the enemy king so it
                        // cannot step away along the ray
                        if let Some(behind) = to.offset(d_row, d_col) {
                            board.set_protected(behind, color);
                        }
                    }
                    break;
                }
                None => current = to,
            }
        }
    }
}

/// Counts the piece's protected tiles without allocating a list. Used as the
/// mobility term in evaluation.
pub fn protected_count(board: &Board, from: Square) -> u8 {
    let piece = match board.piece_at(from) {
        Some(piece) => piece,
        None => return 0,
    };
    let mut count = 0u8;

    if piece.kind == PieceKind::Pawn {
        let dir = pawn_forward(piece.color);
        for d_col in [-1, 1] {
            if from.offset(dir, d_col).is_some() {
                count += 1;
            }
        }
        return count;
    }

    if let Some(offsets) = stepper_offsets(piece.kind) {
        for &(d_row, d_col) in offsets {
            if from.offset(d_row, d_col).is_some() {
                count += 1;
            }
        }
        return count;
    }

    let directions = slider_directions(piece.kind).expect("every kind is a pawn, stepper, or slider");
    for &(d_row, d_col) in directions {
        let mut current = from;
        while let Some(to) = current.offset(d_row, d_col) {
            count += 1;
            match board.piece_at(to) {
                Some(blocker) => {
                    if blocker.kind == PieceKind::King && blocker.color != piece.color {
                        if to.offset(d_row, d_col).is_some() {
                            count += 1;
                        }
                    }
                    break;
                }
                None => current = to,
            }
        }
    }
    count
}

/// Castle moves available to `color`'s king: both king and rook unmoved, the
/// path empty, and none of the king's current, transit, or destination
/// squares enemy-protected. Relies on fresh protection flags.
pub fn castle_moves(board: &Board, color: Color) -> SmallVec<[ChessMove; 2]> {
    let mut moves = SmallVec::new();
    let enemy = color.opposite();

    for side in [CastleSide::Kingside, CastleSide::Queenside] {
        let (king_from, king_to, rook_from, rook_to) = ChessMove::castle_squares(color, side);

        let king = match board.piece_at(king_from) {
            Some(piece) if piece.kind == PieceKind::King && piece.color == color => piece,
            _ => continue,
        };
        let rook = match board.piece_at(rook_from) {
            Some(piece) if piece.kind == PieceKind::Rook && piece.color == color => piece,
            _ => continue,
        };
        if king.move_count != 0 || rook.move_count != 0 {
            continue;
        }

        let row = king_from.row();
        let between: &[u8] = match side {
            CastleSide::Kingside => &[5, 6],
            CastleSide::Queenside => &[1, 2, 3],
        };
        let path_clear = between.iter().all(|&col| {
            let square = Square::new(row, col).expect("castle path squares in range");
            !board.is_occupied(square)
        });
        if !path_clear {
            continue;
        }

        // the king may not castle out of, through, or into check
        let king_path = [king_from, rook_to, king_to];
        let path_safe = king_path
            .iter()
            .all(|&square| !board.tile(square).protected_by(enemy));
        if !path_safe {
            continue;
        }

        moves.push(ChessMove::Castle { color, side });
    }
    moves
}

/// All pseudo-legal moves for `color`, in search order: castling first, then
/// captures, then quiet moves, each iterated in the side's sorted-piece
/// order. Legality (not leaving the own king in check) is established by the
/// caller through apply/verify/unmake.
pub fn pseudo_moves(board: &Board, color: Color) -> Vec<ChessMove> {
    let mut moves: Vec<ChessMove> = Vec::with_capacity(48);
    moves.extend(castle_moves(board, color));

    let squares: SmallVec<[Square; 16]> = board
        .pieces(color)
        .entries()
        .iter()
        .map(|e| e.square)
        .collect();

    for &from in &squares {
        for to in attack_targets(board, from) {
            moves.push(classify(board, from, to));
        }
    }
    for &from in &squares {
        for to in move_targets(board, from) {
            moves.push(classify(board, from, to));
        }
    }
    moves
}

fn classify(board: &Board, from: Square, to: Square) -> ChessMove {
    let is_pawn = board
        .piece_at(from)
        .map(|piece| piece.kind == PieceKind::Pawn)
        .unwrap_or(false);
    if is_pawn {
        let color = board.piece_at(from).unwrap().color;
        if to.row() == promotion_row(color) {
            return ChessMove::Promotion { from, to };
        }
    }
    ChessMove::Standard { from, to }
}

/// Fully verified legal moves. The engine's root enumeration and the perft
/// reference both go through this.
pub fn legal_moves(board: &mut Board, color: Color) -> Vec<ChessMove> {
    let mut legal = Vec::with_capacity(48);
    for chess_move in pseudo_moves(board, color) {
        let verified = with_applied(board, &chess_move, |_| ())
            .expect("pseudo-legal move application cannot fail");
        if verified.is_some() {
            legal.push(chess_move);
        }
    }
    debug!("{} legal moves for {}", legal.len(), color);
    legal
}

/// Counts leaf positions reachable in `depth` plies. The golden values from
/// the standard starting position validate move generation end to end.
pub fn perft(board: &mut Board, color: Color, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0u64;
    for chess_move in pseudo_moves(board, color) {
        let subtree = with_applied(board, &chess_move, |inner| {
            perft(inner, color.opposite(), depth - 1)
        })
        .expect("pseudo-legal move application cannot fail");
        if let Some(count) = subtree {
            nodes += count;
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position;
    use crate::sq;

    #[test]
    fn test_perft_from_starting_position() {
        let mut board = Board::starting_position();
        board.recompute_protections();
        assert_eq!(perft(&mut board, Color::White, 1), 20);
        assert_eq!(perft(&mut board, Color::White, 2), 400);
        assert_eq!(perft(&mut board, Color::White, 3), 8902);
    }

    #[test]
    fn test_root_branching_matches_perft_depth_one() {
        let mut board = Board::starting_position();
        board.recompute_protections();
        let legal = legal_moves(&mut board, Color::White);
        assert_eq!(legal.len() as u64, perft(&mut board, Color::White, 1));
    }

    #[test]
    fn test_knight_moves_from_corner() {
        let board = position! {
            ....k...
            ........
            ........
            ........
            ........
            ........
            ........
            N...K...
        };
        let targets = move_targets(&board, sq!("a1"));
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&sq!("b3")));
        assert!(targets.contains(&sq!("c2")));
    }

    #[test]
    fn test_slider_stops_at_first_blocker() {
        let board = position! {
            ....k...
            ........
            ........
            ...p....
            ........
            ........
            ........
            R..PK...
        };
        // rook on a1: up the a-file is open, right stops before d1
        let targets = move_targets(&board, sq!("a1"));
        assert!(targets.contains(&sq!("a8")));
        assert!(targets.contains(&sq!("c1")));
        assert!(!targets.contains(&sq!("d1")));

        let attacks = attack_targets(&board, sq!("a1"));
        assert!(attacks.is_empty());
    }

    #[test]
    fn test_attack_targets_exclude_enemy_king() {
        let board = position! {
            ........
            ........
            ........
            ........
            ........
            ........
            ....r...
            R...K...
        };
        let attacks = attack_targets(&board, sq!("a1"));
        assert!(!attacks.contains(&sq!("e1")));

        let black_attacks = attack_targets(&board, sq!("e2"));
        assert!(!black_attacks.contains(&sq!("e1")));
    }

    #[test]
    fn test_pawn_double_step_only_from_unmoved_rank() {
        let mut board = Board::starting_position();
        let targets = move_targets(&board, sq!("e2"));
        assert!(targets.contains(&sq!("e3")));
        assert!(targets.contains(&sq!("e4")));

        board.set_move_count(sq!("e2"), 1);
        let targets = move_targets(&board, sq!("e2"));
        assert!(targets.contains(&sq!("e3")));
        assert!(!targets.contains(&sq!("e4")));
    }

    #[test]
    fn test_pawn_captures_are_diagonal_only() {
        let board = position! {
            ....k...
            ........
            ........
            ...ppp..
            ....P...
            ........
            ........
            ....K...
        };
        let attacks = attack_targets(&board, sq!("e4"));
        assert_eq!(attacks.len(), 2);
        assert!(attacks.contains(&sq!("d5")));
        assert!(attacks.contains(&sq!("f5")));

        let moves = move_targets(&board, sq!("e4"));
        assert!(moves.is_empty());
    }

    #[test]
    fn test_protection_xray_through_enemy_king() {
        let mut board = position! {
            ....k...
            ........
            ........
            ........
            ........
            ........
            ........
            ....R..K
        };
        board.recompute_protections();
        // rook e1 covers e8 through to the king, and x-rays one square past
        // it is none (e8 is the edge); the king cannot step along the file
        assert!(board.tile(sq!("e8")).protected_by(Color::White));
        assert!(board.tile(sq!("e7")).protected_by(Color::White));

        let mut board = position! {
            ........
            ....k...
            ........
            ........
            ........
            ........
            ........
            ....R..K
        };
        board.recompute_protections();
        // king on e7: the square behind it on the ray (e8) is x-rayed
        assert!(board.tile(sq!("e8")).protected_by(Color::White));
    }

    #[test]
    fn test_protected_count_matches_reach() {
        let board = position! {
            ....k...
            ........
            ........
            ........
            ...Q....
            ........
            ........
            ....K...
        };
        // queen on d4 covers all four rays until the edge or a blocker
        let count = protected_count(&board, sq!("d4"));
        assert_eq!(count, 27);
    }

    #[test]
    fn test_castling_blocked_by_protection() {
        let mut board = position! {
            ....k...
            ........
            ........
            ........
            ........
            .....r..
            ........
            R...K..R
        };
        board.recompute_protections();
        // f1 is covered by the black rook on f3, so kingside is out;
        // queenside path (e1, d1, c1) is clean
        let castles = castle_moves(&board, Color::White);
        assert_eq!(castles.len(), 1);
        assert!(matches!(
            castles[0],
            ChessMove::Castle {
                side: CastleSide::Queenside,
                ..
            }
        ));
    }

    #[test]
    fn test_castling_requires_unmoved_pieces() {
        let mut board = position! {
            ....k...
            ........
            ........
            ........
            ........
            ........
            ........
            R...K..R
        };
        board.recompute_protections();
        assert_eq!(castle_moves(&board, Color::White).len(), 2);

        board.set_move_count(sq!("h1"), 1);
        assert_eq!(castle_moves(&board, Color::White).len(), 1);

        board.set_move_count(sq!("e1"), 1);
        assert!(castle_moves(&board, Color::White).is_empty());
    }

    #[test]
    fn test_move_order_castles_then_captures_then_quiet() {
        let mut board = position! {
            ....k...
            ........
            ........
            ...p....
            ........
            ....N...
            ........
            R...K...
        };
        board.recompute_protections();
        let moves = pseudo_moves(&board, Color::White);
        let first_quiet = moves
            .iter()
            .position(|m| matches!(m, ChessMove::Standard { to, .. } if !board.is_occupied(*to)))
            .unwrap();
        let capture_index = moves
            .iter()
            .position(|m| matches!(m, ChessMove::Standard { to, .. } if board.is_occupied(*to)))
            .unwrap();
        let castle_index = moves
            .iter()
            .position(|m| matches!(m, ChessMove::Castle { .. }))
            .unwrap();
        assert!(castle_index < capture_index);
        assert!(capture_index < first_quiet);
    }

    #[test]
    fn test_promotion_generated_at_far_rank() {
        let mut board = position! {
            ....k...
            ........
            .P......
            ........
            ........
            ........
            ........
            ....K...
        };
        board.recompute_protections();
        let moves = pseudo_moves(&board, Color::White);
        assert!(moves
            .iter()
            .any(|m| matches!(m, ChessMove::Promotion { .. })));
    }
}
