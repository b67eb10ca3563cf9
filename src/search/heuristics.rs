//! Constructive heuristics used to seed the incumbent.
//!
//! - **Johnson's rule** (K = 2): provably optimal for two stages. Jobs with
//!   `d0 < d1` go first in ascending `d0`, the rest last in descending `d1`.
//!   It does not extend to K > 2 and ignores the rank tie-break, so the exact
//!   search still runs after it.
//! - **NEH** (any K): jobs sorted by decreasing total work, each inserted at
//!   the position of the partial order with the smallest makespan.
//!
//! # References
//! - Johnson (1954), "Optimal two- and three-stage production schedules"
//! - Nawaz, Enscore & Ham (1983), "A heuristic algorithm for the m-machine,
//!   n-job flow-shop sequencing problem"

use std::cmp::Reverse;

use crate::evaluation::makespan_of_ranks;
use crate::models::StageTimingTable;

/// Johnson's order for a two-stage table, `None` for other stage counts.
///
/// # Example
/// ```
/// use u_flowshop::{build_table, johnson_order};
///
/// let table = build_table(vec![("A", vec![5, 2]), ("B", vec![1, 6]), ("C", vec![4, 4])]).unwrap();
/// assert_eq!(johnson_order(&table).unwrap(), vec!["B", "C", "A"]);
/// ```
pub fn johnson_order(table: &StageTimingTable) -> Option<Vec<String>> {
    johnson_ranks(table).map(|ranks| to_ids(table, &ranks))
}

/// NEH order for any table.
pub fn neh_order(table: &StageTimingTable) -> Vec<String> {
    to_ids(table, &neh_ranks(table))
}

pub(crate) fn johnson_ranks(table: &StageTimingTable) -> Option<Vec<usize>> {
    if table.stage_count() != 2 {
        return None;
    }
    let (mut head, mut tail): (Vec<usize>, Vec<usize>) = (0..table.job_count())
        .partition(|&r| table.duration(r, 0) < table.duration(r, 1));
    head.sort_by_key(|&r| (table.duration(r, 0), r));
    tail.sort_by_key(|&r| (Reverse(table.duration(r, 1)), r));
    head.extend(tail);
    Some(head)
}

pub(crate) fn neh_ranks(table: &StageTimingTable) -> Vec<usize> {
    let mut by_work: Vec<usize> = (0..table.job_count()).collect();
    by_work.sort_by_key(|&r| (Reverse(table.total_work(r)), r));

    let mut front = vec![0; table.stage_count()];
    let mut sequence: Vec<usize> = Vec::with_capacity(by_work.len());
    let mut candidate: Vec<usize> = Vec::with_capacity(by_work.len());

    for rank in by_work {
        let mut best_pos = 0;
        let mut best_makespan = None;
        for pos in 0..=sequence.len() {
            candidate.clear();
            candidate.extend_from_slice(&sequence[..pos]);
            candidate.push(rank);
            candidate.extend_from_slice(&sequence[pos..]);
            let makespan = makespan_of_ranks(table, &candidate, &mut front);
            if best_makespan.map_or(true, |best| makespan < best) {
                best_makespan = Some(makespan);
                best_pos = pos;
            }
        }
        sequence.insert(best_pos, rank);
    }
    sequence
}

/// Seed order for the exact search: Johnson for two stages, NEH otherwise.
pub(crate) fn initial_ranks(table: &StageTimingTable) -> Vec<usize> {
    johnson_ranks(table).unwrap_or_else(|| neh_ranks(table))
}

fn to_ids(table: &StageTimingTable, ranks: &[usize]) -> Vec<String> {
    ranks.iter().map(|&r| table.job(r).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::evaluate_ranks;
    use crate::generate::InstanceGenerator;
    use crate::models::{build_table, TableBuilder};
    use crate::search::exhaustive::next_permutation;

    fn brute_force_optimum(table: &StageTimingTable) -> i64 {
        let mut ranks: Vec<usize> = (0..table.job_count()).collect();
        let mut best = i64::MAX;
        loop {
            best = best.min(evaluate_ranks(table, &ranks).makespan);
            if !next_permutation(&mut ranks) {
                return best;
            }
        }
    }

    #[test]
    fn test_johnson_only_for_two_stages() {
        let t = build_table(vec![("A", vec![1, 2, 3])]).unwrap();
        assert!(johnson_order(&t).is_none());
    }

    #[test]
    fn test_johnson_is_optimal_for_two_stages() {
        for seed in 0..20 {
            let t = InstanceGenerator::new(6, 2).with_seed(seed).generate().unwrap();
            let ranks = johnson_ranks(&t).unwrap();
            assert_eq!(evaluate_ranks(&t, &ranks).makespan, brute_force_optimum(&t));
        }
    }

    #[test]
    fn test_johnson_tie_handling() {
        // Equal d0/d1 goes to the tail group.
        let t = build_table(vec![("A", vec![3, 3]), ("B", vec![2, 5]), ("C", vec![2, 4])]).unwrap();
        assert_eq!(johnson_order(&t).unwrap(), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_neh_is_a_permutation_and_not_below_optimum() {
        for seed in 0..10 {
            let t = InstanceGenerator::new(6, 4).with_seed(seed).generate().unwrap();
            let mut ranks = neh_ranks(&t);
            let makespan = evaluate_ranks(&t, &ranks).makespan;
            assert!(makespan >= brute_force_optimum(&t));
            ranks.sort_unstable();
            assert_eq!(ranks, (0..6).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_neh_on_reference_problem() {
        let t = TableBuilder::new()
            .with_job("甲", [13, 15, 20])
            .with_job("乙", [10, 20, 18])
            .with_job("丙", [20, 16, 10])
            .with_job("丁", [8, 10, 15])
            .build()
            .unwrap();
        let order = neh_order(&t);
        assert_eq!(order.len(), 4);
        let makespan = crate::evaluation::makespan(&t, &order).unwrap();
        assert!(makespan >= 84);
    }
}
