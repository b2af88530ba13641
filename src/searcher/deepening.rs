//! Root-move enumeration and sequential iterative deepening.
//!
//! Every candidate is a fully materialized sibling position (deep-cloned
//! board) so the two search modes can treat candidates identically. Scores
//! being compared for selection always come from the same completed depth
//! for every candidate; a depth interrupted by the deadline is rolled back
//! wholesale.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::board::color::Color;
use crate::board::Board;
use crate::chess_move::apply::{apply_verified, undo};
use crate::chess_move::ChessMove;
use crate::move_generation::pseudo_moves;

use super::{min_value, SearchContext, SearchError, ALPHA_MIN, BETA_MAX};

/// One legal root move: the move, its description, and the resulting
/// position, plus the per-depth score history the deepening loops maintain.
#[derive(Debug)]
pub struct RootCandidate {
    pub chess_move: ChessMove,
    pub description: String,
    pub position: Board,
    /// Score at the depth currently used for comparison.
    pub score: i32,
    /// `depth_scores[d - 1]` is the score from the fully completed depth `d`.
    pub depth_scores: Vec<i32>,
}

/// Enumerates every legal root move for `color` by the same make/verify/
/// unmake discipline as the tree search, materializing each resulting
/// position. An empty result means checkmate or stalemate — an end-of-game
/// signal, not an error.
pub fn enumerate_candidates(
    board: &mut Board,
    color: Color,
) -> Result<Vec<RootCandidate>, SearchError> {
    let mut candidates = Vec::with_capacity(48);
    for chess_move in pseudo_moves(board, color) {
        let description = chess_move.describe(board);
        let applied = match apply_verified(board, &chess_move)? {
            Some(applied) => applied,
            None => continue,
        };
        let position = board.clone();
        undo(board, applied)?;
        candidates.push(RootCandidate {
            chess_move,
            description,
            position,
            score: 0,
            depth_scores: Vec::new(),
        });
    }
    debug!("{} root candidates for {}", candidates.len(), color);
    Ok(candidates)
}

/// Sequential iterative deepening across all candidates. Returns the deepest
/// fully completed depth (0 if even depth 1 could not finish).
///
/// Before starting a depth, the loop checks whether the remaining time is
/// shorter than the previous depth took — a heuristic guard against starting
/// an iteration that cannot finish. A depth interrupted mid-way is discarded
/// entirely so all comparisons stay depth-consistent.
pub fn deepen_candidates(
    context: &mut SearchContext,
    candidates: &mut Vec<RootCandidate>,
    perspective: Color,
    max_depth: u8,
) -> Result<u8, SearchError> {
    let mut completed_depth = 0u8;
    let mut previous_iteration = Duration::ZERO;

    for depth in 1..=max_depth {
        if depth > 1 && context.remaining() < previous_iteration {
            debug!(
                "stopping before depth {}: {:?} remaining, previous depth took {:?}",
                depth,
                context.remaining(),
                previous_iteration
            );
            break;
        }

        let started = Instant::now();
        let mut staged: Vec<i32> = Vec::with_capacity(candidates.len());
        let mut interrupted = false;
        for candidate in candidates.iter_mut() {
            if context.deadline_elapsed() {
                interrupted = true;
                break;
            }
            // min_value restores the position on every path, so the stored
            // sibling can be searched in place
            let score = min_value(
                context,
                &mut candidate.position,
                perspective,
                depth - 1,
                ALPHA_MIN,
                BETA_MAX,
            )?;
            staged.push(score);
        }
        // a deadline hit inside min_value taints the last staged score too
        if interrupted || context.deadline_elapsed() {
            debug!("depth {} interrupted, rolling back to depth {}", depth, completed_depth);
            break;
        }

        for (candidate, score) in candidates.iter_mut().zip(staged) {
            candidate.score = score;
            candidate.depth_scores.push(score);
        }
        completed_depth = depth;
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        previous_iteration = started.elapsed();
        info!(
            "depth {} complete in {:?}, best {} ({})",
            depth,
            previous_iteration,
            candidates[0].description,
            candidates[0].score
        );
    }

    Ok(completed_depth)
}

/// Iterative deepening for a single candidate, used by the parallel workers.
/// Returns the per-depth scores for every fully completed depth.
pub fn deepen_single(
    context: &mut SearchContext,
    candidate_position: &mut Board,
    perspective: Color,
    max_depth: u8,
) -> Result<Vec<i32>, SearchError> {
    let mut depth_scores = Vec::with_capacity(max_depth as usize);
    let mut previous_iteration = Duration::ZERO;

    for depth in 1..=max_depth {
        if depth > 1 && context.remaining() < previous_iteration {
            break;
        }
        let started = Instant::now();
        let score = min_value(
            context,
            candidate_position,
            perspective,
            depth - 1,
            ALPHA_MIN,
            BETA_MAX,
        )?;
        if context.deadline_elapsed() {
            break;
        }
        depth_scores.push(score);
        previous_iteration = started.elapsed();
    }

    Ok(depth_scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position;

    fn long_context() -> SearchContext {
        SearchContext::new(Instant::now() + Duration::from_secs(60))
    }

    #[test]
    fn test_enumerate_candidates_from_start() {
        let mut board = Board::starting_position();
        board.recompute_protections();
        let candidates = enumerate_candidates(&mut board, Color::White).unwrap();
        assert_eq!(candidates.len(), 20);
        // descriptions are unique per candidate
        let mut descriptions: Vec<&str> =
            candidates.iter().map(|c| c.description.as_str()).collect();
        descriptions.sort_unstable();
        descriptions.dedup();
        assert_eq!(descriptions.len(), 20);
    }

    #[test]
    fn test_enumerate_candidates_empty_when_mated() {
        let mut board = position! {
            ...k...R
            ..ppp...
            ........
            ........
            ........
            ........
            ........
            ....K...
        };
        board.recompute_protections();
        let candidates = enumerate_candidates(&mut board, Color::Black).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_candidates_leave_root_board_unchanged() {
        let mut board = Board::starting_position();
        board.recompute_protections();
        let before = board.clone();
        enumerate_candidates(&mut board, Color::White).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_deepening_sorts_best_first_and_records_depths() {
        // white can win a rook with the queen
        let mut board = position! {
            ....k...
            ........
            ........
            ...r....
            ........
            ........
            ........
            ...QK...
        };
        board.recompute_protections();
        let mut candidates = enumerate_candidates(&mut board, Color::White).unwrap();
        let mut context = long_context();
        let completed =
            deepen_candidates(&mut context, &mut candidates, Color::White, 3).unwrap();

        assert_eq!(completed, 3);
        for candidate in &candidates {
            assert_eq!(candidate.depth_scores.len(), 3);
            assert_eq!(candidate.score, candidate.depth_scores[2]);
        }
        // best-first ordering
        for pair in candidates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(candidates[0].description, "Qd1xd5");
    }

    #[test]
    fn test_interrupted_depth_rolls_back_wholesale() {
        let mut board = Board::starting_position();
        board.recompute_protections();
        let mut candidates = enumerate_candidates(&mut board, Color::White).unwrap();

        // the deadline lands somewhere inside an iteration; wherever the
        // clock falls, every candidate must carry scores only from fully
        // completed depths
        let mut context = SearchContext::new(Instant::now() + Duration::from_millis(30));
        let completed =
            deepen_candidates(&mut context, &mut candidates, Color::White, 50).unwrap();

        assert!(completed < 50);
        for candidate in &candidates {
            assert_eq!(candidate.depth_scores.len(), completed as usize);
            if completed > 0 {
                assert_eq!(candidate.score, candidate.depth_scores[completed as usize - 1]);
            } else {
                assert_eq!(candidate.score, 0);
            }
        }
    }

    #[test]
    fn test_depth_four_opening_search_picks_central_development() {
        let mut board = Board::starting_position();
        board.recompute_protections();
        let mut candidates = enumerate_candidates(&mut board, Color::White).unwrap();

        // a deadline far beyond the search time, so depth 4 always completes
        let mut context = SearchContext::new(Instant::now() + Duration::from_secs(600));
        let completed =
            deepen_candidates(&mut context, &mut candidates, Color::White, 4).unwrap();
        assert_eq!(completed, 4);

        let openings = ["e2-e4", "d2-d4", "e2-e3", "d2-d3", "Ng1-f3", "Nb1-c3"];
        assert!(
            openings.contains(&candidates[0].description.as_str()),
            "unexpected opening {}",
            candidates[0].description
        );
    }

    #[test]
    fn test_expired_deadline_completes_no_depth() {
        let mut board = Board::starting_position();
        board.recompute_protections();
        let mut candidates = enumerate_candidates(&mut board, Color::White).unwrap();
        let mut context = SearchContext::new(Instant::now() - Duration::from_millis(1));
        let completed =
            deepen_candidates(&mut context, &mut candidates, Color::White, 4).unwrap();
        assert_eq!(completed, 0);
        for candidate in &candidates {
            assert!(candidate.depth_scores.is_empty());
        }
    }

    #[test]
    fn test_deepen_single_matches_sequential_scores() {
        let mut board = position! {
            ....k...
            ........
            ........
            ...r....
            ........
            ........
            ........
            ...QK...
        };
        board.recompute_protections();
        let mut candidates = enumerate_candidates(&mut board, Color::White).unwrap();
        let mut context = long_context();
        deepen_candidates(&mut context, &mut candidates, Color::White, 2).unwrap();

        for candidate in candidates.iter_mut() {
            let mut single_context = long_context();
            let scores =
                deepen_single(&mut single_context, &mut candidate.position, Color::White, 2)
                    .unwrap();
            assert_eq!(scores, candidate.depth_scores);
        }
    }
}
