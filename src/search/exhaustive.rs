//! Exhaustive enumeration of job orders.
//!
//! A work unit fixes the first job; the remaining jobs are enumerated in
//! lexicographic rank order with the classic next-permutation step, and
//! every complete order is evaluated from scratch.
//!
//! # Complexity
//! O((N-1)! * N * K) per work unit.

use log::trace;

use super::incumbent::SharedIncumbent;
use super::monitor::SearchMonitor;
use super::stats::SearchStats;
use crate::evaluation::makespan_of_ranks;
use crate::models::StageTimingTable;

/// Evaluates every order that starts with `first`.
///
/// Returns `false` if the monitor stopped the search.
pub(crate) fn search_subtree(
    table: &StageTimingTable,
    first: usize,
    incumbent: &SharedIncumbent,
    monitor: &mut SearchMonitor<'_>,
    stats: &mut SearchStats,
) -> bool {
    let n = table.job_count();
    let mut ranks: Vec<usize> = Vec::with_capacity(n);
    ranks.push(first);
    ranks.extend((0..n).filter(|&r| r != first));
    let mut front = vec![0; table.stage_count()];

    loop {
        if monitor.should_stop() {
            return false;
        }
        stats.nodes += 1;
        stats.evaluations += 1;

        let makespan = makespan_of_ranks(table, &ranks, &mut front);
        if incumbent.try_install(makespan, &ranks) {
            stats.improvements += 1;
            trace!("exhaustive: new incumbent {makespan} {ranks:?}");
        }

        if !next_permutation(&mut ranks[1..]) {
            return true;
        }
    }
}

/// Rearranges `items` into the next lexicographic permutation.
///
/// Returns `false` (leaving `items` sorted ascending) after the last one.
pub(crate) fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }
    // Longest non-increasing suffix starts at `pivot + 1`.
    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        items.reverse();
        return false;
    }
    let pivot = i - 1;
    let mut j = items.len() - 1;
    while items[j] <= items[pivot] {
        j -= 1;
    }
    items.swap(pivot, j);
    items[i..].reverse();
    true
}
