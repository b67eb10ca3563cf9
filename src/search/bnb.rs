//! Depth-first branch-and-bound over job orders.
//!
//! # Algorithm
//!
//! Orders are built one position at a time, trying unplaced jobs in rank
//! order. For a prefix with completion front `f` (end of the last placed job
//! on each stage) and unplaced set `U`, no completion can finish before
//!
//! ```text
//! LB = max_s  max(f[s], f[0] + min_{j in U} head(j, s))
//!           + sum_{j in U} d(j, s)
//!           + min_{j in U} tail(j, s)
//! ```
//!
//! where `head(j, s)` and `tail(j, s)` are the work of job `j` before and
//! after stage `s`. A prefix is cut when the incumbent beats every possible
//! completion (see [`SharedIncumbent::dominates`]); the search stays exact,
//! including the rank tie-break.
//!
//! # Reference
//! Ignall & Schrage (1965), "Application of the branch and bound technique
//! to some flow-shop scheduling problems"; Lageweg, Lenstra & Rinnooy Kan
//! (1978), machine-based bounds.

use log::trace;

use super::incumbent::SharedIncumbent;
use super::monitor::SearchMonitor;
use super::stats::SearchStats;
use crate::evaluation::advance_front;
use crate::models::{StageTimingTable, Time};

/// Per-table data shared read-only by all workers.
#[derive(Debug)]
pub(crate) struct BranchAndBound<'a> {
    table: &'a StageTimingTable,
    /// `heads[rank * k + s]`: work of `rank` on stages `< s`.
    heads: Vec<Time>,
    /// `tails[rank * k + s]`: work of `rank` on stages `> s`.
    tails: Vec<Time>,
}

/// Mutable DFS state owned by one worker.
struct Branch {
    prefix: Vec<usize>,
    placed: Vec<bool>,
    /// `fronts[depth * k + s]`; depth 0 is all zeros.
    fronts: Vec<Time>,
    /// Remaining work per stage over unplaced jobs.
    remaining: Vec<Time>,
}

impl<'a> BranchAndBound<'a> {
    pub(crate) fn new(table: &'a StageTimingTable) -> Self {
        let k = table.stage_count();
        let n = table.job_count();
        let mut heads = vec![0; n * k];
        let mut tails = vec![0; n * k];
        for rank in 0..n {
            let row = table.row(rank);
            let total: Time = row.iter().sum();
            let mut before = 0;
            for (s, &d) in row.iter().enumerate() {
                heads[rank * k + s] = before;
                tails[rank * k + s] = total - before - d;
                before += d;
            }
        }
        Self { table, heads, tails }
    }

    /// Explores every order that starts with `first`.
    ///
    /// Returns `false` if the monitor stopped the search.
    pub(crate) fn search_subtree(
        &self,
        first: usize,
        incumbent: &SharedIncumbent,
        monitor: &mut SearchMonitor<'_>,
        stats: &mut SearchStats,
    ) -> bool {
        let n = self.table.job_count();
        let k = self.table.stage_count();
        let mut remaining = vec![0; k];
        for rank in 0..n {
            for (s, slot) in remaining.iter_mut().enumerate() {
                *slot += self.table.duration(rank, s);
            }
        }
        let mut branch = Branch {
            prefix: Vec::with_capacity(n),
            placed: vec![false; n],
            fronts: vec![0; (n + 1) * k],
            remaining,
        };

        self.push(&mut branch, first);
        let completed = self.explore(&mut branch, incumbent, monitor, stats);
        self.pop(&mut branch);
        completed
    }

    fn explore(
        &self,
        branch: &mut Branch,
        incumbent: &SharedIncumbent,
        monitor: &mut SearchMonitor<'_>,
        stats: &mut SearchStats,
    ) -> bool {
        if monitor.should_stop() {
            return false;
        }
        stats.nodes += 1;

        let n = self.table.job_count();
        let k = self.table.stage_count();
        let depth = branch.prefix.len();

        if depth == n {
            stats.evaluations += 1;
            let makespan = branch.fronts[depth * k + k - 1];
            if incumbent.try_install(makespan, &branch.prefix) {
                stats.improvements += 1;
                trace!("bnb: new incumbent {makespan} {:?}", branch.prefix);
            }
            return true;
        }

        let bound = self.lower_bound(branch);
        if incumbent.dominates(bound, &branch.prefix) {
            stats.pruned += 1;
            return true;
        }

        for rank in 0..n {
            if branch.placed[rank] {
                continue;
            }
            self.push(branch, rank);
            let go_on = self.explore(branch, incumbent, monitor, stats);
            self.pop(branch);
            if !go_on {
                return false;
            }
        }
        true
    }

    fn push(&self, branch: &mut Branch, rank: usize) {
        let k = self.table.stage_count();
        let depth = branch.prefix.len();
        let (done, next) = branch.fronts.split_at_mut((depth + 1) * k);
        let front = &mut next[..k];
        front.copy_from_slice(&done[depth * k..]);
        advance_front(self.table, front, rank);

        for (s, slot) in branch.remaining.iter_mut().enumerate() {
            *slot -= self.table.duration(rank, s);
        }
        branch.placed[rank] = true;
        branch.prefix.push(rank);
    }

    fn pop(&self, branch: &mut Branch) {
        if let Some(rank) = branch.prefix.pop() {
            branch.placed[rank] = false;
            for (s, slot) in branch.remaining.iter_mut().enumerate() {
                *slot += self.table.duration(rank, s);
            }
        }
    }

    /// Machine-based lower bound of a non-complete prefix.
    fn lower_bound(&self, branch: &Branch) -> Time {
        let k = self.table.stage_count();
        let depth = branch.prefix.len();
        let front = &branch.fronts[depth * k..(depth + 1) * k];

        let mut bound = front[k - 1];
        for s in 0..k {
            let mut min_head = Time::MAX;
            let mut min_tail = Time::MAX;
            for (rank, &placed) in branch.placed.iter().enumerate() {
                if placed {
                    continue;
                }
                min_head = min_head.min(self.heads[rank * k + s]);
                min_tail = min_tail.min(self.tails[rank * k + s]);
            }
            if min_head == Time::MAX {
                // No unplaced jobs.
                return front[k - 1];
            }
            let ready = front[s].max(front[0] + min_head);
            bound = bound.max(ready + branch.remaining[s] + min_tail);
        }
        bound
    }
}
