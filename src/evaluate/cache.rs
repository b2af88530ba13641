use rustc_hash::FxHashMap;

/// Memoized evaluation scores keyed by the canonical position encoding.
/// This is a pure memo, not a depth-aware transposition table: entries never
/// expire within an analysis, so it must be cleared between unrelated games
/// to avoid stale scores.
#[derive(Default, Debug)]
pub struct EvalCache {
    entries: FxHashMap<String, i32>,
    hits: usize,
    misses: usize,
}

impl EvalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&mut self, key: &str) -> Option<i32> {
        match self.entries.get(key) {
            Some(&score) => {
                self.hits += 1;
                Some(score)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn store(&mut self, key: String, score: i32) {
        self.entries.insert(key, score);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
