//! Anti-repetition move selection.
//!
//! The table counts how many times the engine itself selected each resulting
//! position over the life of a game. Selection allows a position to be
//! chosen twice, and tries to substitute the next-best candidate before
//! choosing it a third time. This is a draw-avoidance heuristic, not
//! threefold-repetition rule enforcement. The collaborator persists the
//! table across sessions, so it serializes to JSON.

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::deepening::RootCandidate;

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct RepetitionTable {
    counts: FxHashMap<String, u32>,
}

impl RepetitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn times_selected(&self, key: &str) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn record_selection(&mut self, key: String) -> u32 {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Picks the candidate to play from a best-first sorted slice.
///
/// The top candidate is taken unless its resulting position has already been
/// selected twice or more; in that case the next-best candidate whose
/// position has been selected at most once is substituted. If every
/// candidate is exhausted the repeat is played anyway.
pub fn select_candidate(candidates: &[RootCandidate], table: &RepetitionTable) -> usize {
    debug_assert!(!candidates.is_empty());
    let top_count = table.times_selected(&candidates[0].position.encode());
    if top_count < 2 {
        return 0;
    }
    for (index, candidate) in candidates.iter().enumerate().skip(1) {
        if table.times_selected(&candidate.position.encode()) <= 1 {
            debug!(
                "substituting {} for {} to avoid a third repetition",
                candidate.description, candidates[0].description
            );
            return index;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::color::Color;
    use crate::board::Board;
    use crate::position;
    use crate::searcher::deepening::enumerate_candidates;

    fn candidates_for(board: &mut Board, color: Color) -> Vec<RootCandidate> {
        board.recompute_protections();
        enumerate_candidates(board, color).unwrap()
    }

    #[test]
    fn test_counts_round_trip_through_json() {
        let mut table = RepetitionTable::new();
        table.record_selection("first".to_string());
        table.record_selection("first".to_string());
        table.record_selection("second".to_string());

        let json = table.to_json().unwrap();
        let restored = RepetitionTable::from_json(&json).unwrap();
        assert_eq!(restored.times_selected("first"), 2);
        assert_eq!(restored.times_selected("second"), 1);
        assert_eq!(restored.times_selected("missing"), 0);
    }

    #[test]
    fn test_fresh_position_is_selected_and_single_repeat_allowed() {
        let mut board = Board::starting_position();
        let candidates = candidates_for(&mut board, Color::White);
        let mut table = RepetitionTable::new();

        assert_eq!(select_candidate(&candidates, &table), 0);
        table.record_selection(candidates[0].position.encode());
        // one prior selection still allows the repeat
        assert_eq!(select_candidate(&candidates, &table), 0);
    }

    #[test]
    fn test_third_repetition_substitutes_runner_up() {
        let mut board = Board::starting_position();
        let candidates = candidates_for(&mut board, Color::White);
        let mut table = RepetitionTable::new();
        table.record_selection(candidates[0].position.encode());
        table.record_selection(candidates[0].position.encode());

        assert_eq!(select_candidate(&candidates, &table), 1);
    }

    #[test]
    fn test_exhausted_candidates_fall_back_to_repeat() {
        // two kings shuffling: only a handful of candidates, all repeated out
        let mut board = position! {
            .......k
            ........
            ........
            ........
            ........
            ........
            ........
            K.......
        };
        let candidates = candidates_for(&mut board, Color::White);
        let mut table = RepetitionTable::new();
        for candidate in &candidates {
            table.record_selection(candidate.position.encode());
            table.record_selection(candidate.position.encode());
        }
        assert_eq!(select_candidate(&candidates, &table), 0);
    }
}
