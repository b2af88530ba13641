//! Fail-hard alpha-beta search.
//!
//! `max_value` and `min_value` are mutually recursive and always evaluate
//! from the ROOT side's perspective: the perspective side moves in `max`
//! nodes, the opponent in `min` nodes. The deadline is checked at the top of
//! every call; exceeding it is cooperative termination, never an error —
//! the call unwinds normally with the best value found so far.

pub mod deepening;
pub mod parallel;
pub mod repetition;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::board::color::Color;
use crate::board::error::BoardError;
use crate::board::Board;
use crate::chess_move::apply::{apply_verified, undo};
use crate::evaluate::Evaluator;
use crate::move_generation::pseudo_moves;

/// Well above any evaluation score; mate scores add the remaining depth so
/// a shallower mate always outranks a deeper one.
pub const CHECKMATE: i32 = 1_000_000;

pub const ALPHA_MIN: i32 = i32::MIN / 2;
pub const BETA_MAX: i32 = i32::MAX / 2;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("board error during search: {0}")]
    Board(#[from] BoardError),
    #[error("could not build the search worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Everything a search needs that used to be ambient: the shared deadline,
/// the shared scanned-position counter, and this search's evaluation caches.
/// Parallel workers each own a context; only the deadline and counter are
/// shared between them.
pub struct SearchContext {
    deadline: Instant,
    scanned: Arc<AtomicUsize>,
    evaluator: Evaluator,
}

impl SearchContext {
    pub fn new(deadline: Instant) -> Self {
        Self::with_counter(deadline, Arc::new(AtomicUsize::new(0)))
    }

    pub fn with_counter(deadline: Instant, scanned: Arc<AtomicUsize>) -> Self {
        Self {
            deadline,
            scanned,
            evaluator: Evaluator::new(),
        }
    }

    pub fn deadline_elapsed(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn scanned_count(&self) -> usize {
        self.scanned.load(Ordering::Relaxed)
    }

    pub fn scanned_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.scanned)
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    fn record_node(&self) {
        self.scanned.fetch_add(1, Ordering::Relaxed);
    }
}

/// Maximizing node: `perspective` is the side to move.
pub fn max_value(
    context: &mut SearchContext,
    board: &mut Board,
    perspective: Color,
    depth: u8,
    mut alpha: i32,
    beta: i32,
) -> Result<i32, SearchError> {
    context.record_node();
    if depth == 0 || context.deadline_elapsed() {
        return Ok(context.evaluator.score(board, perspective)?);
    }

    let mut any_legal = false;
    for chess_move in pseudo_moves(board, perspective) {
        let applied = match apply_verified(board, &chess_move)? {
            Some(applied) => applied,
            None => continue,
        };
        any_legal = true;
        let score = min_value(context, board, perspective, depth - 1, alpha, beta);
        undo(board, applied)?;
        let score = score?;

        if score >= beta {
            // fail-hard: return the window edge, not the unclamped value
            return Ok(beta);
        }
        if score > alpha {
            alpha = score;
        }
    }

    if !any_legal {
        return Ok(terminal_score(board, perspective, depth, true)?);
    }
    Ok(alpha)
}

/// Minimizing node: the opponent of `perspective` is the side to move.
pub fn min_value(
    context: &mut SearchContext,
    board: &mut Board,
    perspective: Color,
    depth: u8,
    alpha: i32,
    mut beta: i32,
) -> Result<i32, SearchError> {
    context.record_node();
    if depth == 0 || context.deadline_elapsed() {
        return Ok(context.evaluator.score(board, perspective)?);
    }

    let side = perspective.opposite();
    let mut any_legal = false;
    for chess_move in pseudo_moves(board, side) {
        let applied = match apply_verified(board, &chess_move)? {
            Some(applied) => applied,
            None => continue,
        };
        any_legal = true;
        let score = max_value(context, board, perspective, depth - 1, alpha, beta);
        undo(board, applied)?;
        let score = score?;

        if score <= alpha {
            return Ok(alpha);
        }
        if score < beta {
            beta = score;
        }
    }

    if !any_legal {
        return Ok(terminal_score(board, side, depth, false)?);
    }
    Ok(beta)
}

/// No legal move for `stuck_side`: checkmate if its king is in check (scored
/// higher for mates nearer the root), stalemate otherwise.
fn terminal_score(
    board: &Board,
    stuck_side: Color,
    depth: u8,
    maximizing: bool,
) -> Result<i32, BoardError> {
    if board.in_check(stuck_side)? {
        let mate = CHECKMATE + depth as i32;
        Ok(if maximizing { -mate } else { mate })
    } else {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_move::apply::with_applied;
    use crate::move_generation::legal_moves;
    use crate::position;

    fn test_context() -> SearchContext {
        SearchContext::new(Instant::now() + Duration::from_secs(60))
    }

    /// Full-width reference minimax used only to cross-check alpha-beta.
    fn reference_minimax(
        context: &mut SearchContext,
        board: &mut Board,
        perspective: Color,
        depth: u8,
        maximizing: bool,
    ) -> i32 {
        if depth == 0 {
            return context.evaluator_mut().score(board, perspective).unwrap();
        }
        let side = if maximizing {
            perspective
        } else {
            perspective.opposite()
        };
        let moves = pseudo_moves(board, side);
        let mut best: Option<i32> = None;
        for chess_move in moves {
            let score = with_applied(board, &chess_move, |inner| {
                reference_minimax(context, inner, perspective, depth - 1, !maximizing)
            })
            .unwrap();
            if let Some(score) = score {
                best = Some(match best {
                    None => score,
                    Some(prev) if maximizing => prev.max(score),
                    Some(prev) => prev.min(score),
                });
            }
        }
        match best {
            Some(score) => score,
            None => {
                if board.in_check(side).unwrap() {
                    let mate = CHECKMATE + depth as i32;
                    if maximizing {
                        -mate
                    } else {
                        mate
                    }
                } else {
                    0
                }
            }
        }
    }

    #[test]
    fn test_alpha_beta_agrees_with_reference_minimax() {
        let mut board = position! {
            r...k...
            .pp.....
            ........
            ....p...
            ...P....
            ........
            .PP.....
            R...K...
        };
        board.set_move_count(crate::sq!("a8"), 1);
        board.recompute_protections();

        for depth in 1..=2 {
            let mut context = test_context();
            let reference = reference_minimax(&mut context, &mut board, Color::White, depth, true);
            let mut context = test_context();
            let searched = max_value(
                &mut context,
                &mut board,
                Color::White,
                depth,
                ALPHA_MIN,
                BETA_MAX,
            )
            .unwrap();
            // fail-hard alpha-beta over the full window returns the true value
            assert_eq!(searched, reference, "disagreement at depth {}", depth);
        }
    }

    #[test]
    fn test_shallower_mate_scores_higher() {
        // black is mated where it stands: back-rank mate by the rook
        let mut board = position! {
            ...k...R
            ...ppp..
            ........
            ........
            ........
            ........
            ........
            ....K...
        };
        board.recompute_protections();

        let mut context = test_context();
        let shallow = min_value(
            &mut context,
            &mut board,
            Color::White,
            3,
            ALPHA_MIN,
            BETA_MAX,
        )
        .unwrap();
        let mut context = test_context();
        let deep = min_value(
            &mut context,
            &mut board,
            Color::White,
            6,
            ALPHA_MIN,
            BETA_MAX,
        )
        .unwrap();
        // more remaining depth at the mate node means the mate was found
        // nearer the root, and must outrank the same mate found deeper
        assert!(deep > shallow);
        assert!(shallow > CHECKMATE);
    }

    #[test]
    fn test_stalemate_scores_zero() {
        // black to move has no moves and is not in check
        let mut board = position! {
            .......k
            ........
            ......Q.
            ........
            ........
            ........
            ........
            K.......
        };
        board.set_move_count(crate::sq!("g6"), 1);
        board.recompute_protections();
        assert!(legal_moves(&mut board, Color::Black).is_empty());
        assert!(!board.in_check(Color::Black).unwrap());

        let mut context = test_context();
        let score = min_value(
            &mut context,
            &mut board,
            Color::White,
            2,
            ALPHA_MIN,
            BETA_MAX,
        )
        .unwrap();
        assert_eq!(score, 0);
    }

    #[test]
    fn test_deadline_returns_static_evaluation() {
        let mut board = Board::starting_position();
        board.recompute_protections();

        let mut expired = SearchContext::new(Instant::now() - Duration::from_millis(1));
        let score = max_value(
            &mut expired,
            &mut board,
            Color::White,
            6,
            ALPHA_MIN,
            BETA_MAX,
        )
        .unwrap();
        let static_eval = expired.evaluator_mut().score(&board, Color::White).unwrap();
        assert_eq!(score, static_eval);
        // exactly one node was touched before unwinding
        assert_eq!(expired.scanned_count(), 1);
    }

    #[test]
    fn test_search_leaves_board_unchanged() {
        let mut board = Board::starting_position();
        board.recompute_protections();
        let before = board.clone();

        let mut context = test_context();
        max_value(
            &mut context,
            &mut board,
            Color::White,
            3,
            ALPHA_MIN,
            BETA_MAX,
        )
        .unwrap();
        assert_eq!(board, before);
        board.validate().unwrap();
    }
}
