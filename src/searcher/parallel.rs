//! Parallel per-root-move search.
//!
//! One independent task per candidate, each owning its cloned position and
//! its own evaluation caches; only the deadline and the scanned-position
//! counter are shared. The orchestrator blocks on every task, then compares
//! all candidates at the shallowest depth any task completed — scores taken
//! at different depths are never compared against each other.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::board::color::Color;

use super::deepening::{deepen_single, RootCandidate};
use super::{SearchContext, SearchError};

/// Runs every candidate's own iterative-deepening loop in a worker pool
/// sized to the candidate count, then commits scores from the common depth.
/// Returns that common depth (0 if some task completed no depth at all).
pub fn deepen_candidates_parallel(
    candidates: &mut Vec<RootCandidate>,
    perspective: Color,
    max_depth: u8,
    deadline: Instant,
    scanned: Arc<AtomicUsize>,
) -> Result<u8, SearchError> {
    if candidates.is_empty() {
        return Ok(0);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(candidates.len())
        .build()?;

    let results: Vec<Result<Vec<i32>, SearchError>> = pool.install(|| {
        candidates
            .par_iter_mut()
            .map(|candidate| {
                let mut context = SearchContext::with_counter(deadline, Arc::clone(&scanned));
                deepen_single(&mut context, &mut candidate.position, perspective, max_depth)
            })
            .collect()
    });

    let mut all_scores = Vec::with_capacity(candidates.len());
    for result in results {
        all_scores.push(result?);
    }

    let common_depth = all_scores
        .iter()
        .map(|scores| scores.len())
        .min()
        .unwrap_or(0) as u8;

    if common_depth == 0 {
        warn!("a parallel worker completed no depth before the deadline; scores unusable");
        return Ok(0);
    }

    for (candidate, scores) in candidates.iter_mut().zip(all_scores) {
        candidate.score = scores[common_depth as usize - 1];
        candidate.depth_scores = scores;
    }
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    debug!(
        "parallel search compared {} candidates at common depth {}",
        candidates.len(),
        common_depth
    );
    info!(
        "parallel best {} ({}) at depth {}",
        candidates[0].description, candidates[0].score, common_depth
    );

    Ok(common_depth)
}
