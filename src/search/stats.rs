//! Search statistics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters collected during one search, summed over all workers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Search nodes visited (complete orders for the exhaustive strategy).
    pub nodes: u64,
    /// Complete orders whose makespan was computed.
    pub evaluations: u64,
    /// Partial orders cut by the lower bound.
    pub pruned: u64,
    /// Times the incumbent was replaced (including the heuristic seed).
    pub improvements: u64,
    /// Worker threads used.
    pub threads: usize,
    /// Wall-clock time of the search.
    pub elapsed: Duration,
}

impl SearchStats {
    /// Adds another worker's counters into this one.
    pub(crate) fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.evaluations += other.evaluations;
        self.pruned += other.pruned;
        self.improvements += other.improvements;
    }
}

impl std::fmt::Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "nodes={} evaluations={} pruned={} improvements={} threads={} elapsed={:.3}s",
            self.nodes,
            self.evaluations,
            self.pruned,
            self.improvements,
            self.threads,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sums_counters() {
        let mut a = SearchStats {
            nodes: 3,
            evaluations: 2,
            pruned: 1,
            improvements: 1,
            threads: 2,
            elapsed: Duration::ZERO,
        };
        let b = SearchStats {
            nodes: 4,
            evaluations: 1,
            pruned: 5,
            improvements: 0,
            ..SearchStats::default()
        };
        a.merge(&b);
        assert_eq!((a.nodes, a.evaluations, a.pruned, a.improvements), (7, 3, 6, 1));
        assert_eq!(a.threads, 2);
        assert!(a.to_string().starts_with("nodes=7 evaluations=3"));
    }
}
