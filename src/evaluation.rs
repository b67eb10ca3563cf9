//! Completion-time evaluation for a fixed job order.
//!
//! # Algorithm
//!
//! For order position `p` and stage `s`:
//!
//! ```text
//! end[p][s] = max(end[p][s-1], end[p-1][s]) + d(job_p, s)
//! ```
//!
//! with missing terms taken as 0. The first term is precedence (the job must
//! finish the previous stage), the second is the single-capacity stage (the
//! previous job must vacate it). Makespan is `end[N-1][K-1]`.
//!
//! # Complexity
//! O(N * K) time. The rank-based variant uses an O(K) rolling row.
//!
//! # Reference
//! Johnson (1954); Pinedo (2016), "Scheduling", Ch. 6.1

use std::collections::HashSet;

use crate::error::{FlowShopError, OrderError};
use crate::models::{ScheduleTrace, StageTimingTable, Time};

/// Result of evaluating one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// End of the last job on the last stage.
    pub makespan: Time,
    /// Start/end of every job on every stage.
    pub trace: ScheduleTrace,
}

/// Evaluates a job order against a table.
///
/// # Errors
/// [`FlowShopError::InvalidOrder`] if `order` is not a permutation of the
/// table's jobs. Validation happens before any computation.
///
/// # Example
/// ```
/// use u_flowshop::{build_table, evaluate};
///
/// let table = build_table(vec![("A", vec![2, 3]), ("B", vec![1, 1])]).unwrap();
/// assert_eq!(evaluate(&table, &["A", "B"]).unwrap().makespan, 6);
/// assert_eq!(evaluate(&table, &["B", "A"]).unwrap().makespan, 6);
/// ```
pub fn evaluate<S: AsRef<str>>(
    table: &StageTimingTable,
    order: &[S],
) -> Result<Evaluation, FlowShopError> {
    let ranks = resolve_order(table, order)?;
    Ok(evaluate_ranks(table, &ranks))
}

/// Makespan of a job order, without building a trace.
pub fn makespan<S: AsRef<str>>(
    table: &StageTimingTable,
    order: &[S],
) -> Result<Time, FlowShopError> {
    let ranks = resolve_order(table, order)?;
    let mut front = vec![0; table.stage_count()];
    Ok(makespan_of_ranks(table, &ranks, &mut front))
}

/// Maps job ids to ranks, checking the order is a permutation of the table.
pub fn resolve_order<S: AsRef<str>>(
    table: &StageTimingTable,
    order: &[S],
) -> Result<Vec<usize>, OrderError> {
    let mut seen = HashSet::with_capacity(order.len());
    let mut ranks = Vec::with_capacity(order.len());

    for (position, job) in order.iter().enumerate() {
        let job = job.as_ref();
        let rank = table.rank_of(job).ok_or_else(|| OrderError::UnknownJob {
            job: job.to_string(),
            position,
        })?;
        if !seen.insert(rank) {
            return Err(OrderError::DuplicateJob {
                job: job.to_string(),
                position,
            });
        }
        ranks.push(rank);
    }

    if ranks.len() != table.job_count() {
        return Err(OrderError::LengthMismatch {
            expected: table.job_count(),
            found: ranks.len(),
        });
    }
    Ok(ranks)
}

/// Full evaluation of an already validated rank sequence.
pub(crate) fn evaluate_ranks(table: &StageTimingTable, ranks: &[usize]) -> Evaluation {
    let k = table.stage_count();
    let mut starts = vec![0; ranks.len() * k];
    let mut ends = vec![0; ranks.len() * k];

    for (p, &rank) in ranks.iter().enumerate() {
        for s in 0..k {
            let own_ready = if s == 0 { 0 } else { ends[p * k + s - 1] };
            let stage_free = if p == 0 { 0 } else { ends[(p - 1) * k + s] };
            let start = own_ready.max(stage_free);
            starts[p * k + s] = start;
            ends[p * k + s] = start + table.duration(rank, s);
        }
    }

    let makespan = ends.last().copied().unwrap_or(0);
    let order = ranks.iter().map(|&r| table.job(r).to_string()).collect();
    Evaluation {
        makespan,
        trace: ScheduleTrace::new(order, k, starts, ends),
    }
}

/// Appends the job at `rank` to a completion front.
///
/// `front[s]` holds the end time of the last placed job on stage `s`
/// (all zeros before any job is placed). After the call it holds the
/// end times of the appended job.
#[inline]
pub(crate) fn advance_front(table: &StageTimingTable, front: &mut [Time], rank: usize) {
    let mut own_ready: Time = 0;
    for (s, slot) in front.iter_mut().enumerate() {
        let end = (*slot).max(own_ready) + table.duration(rank, s);
        *slot = end;
        own_ready = end;
    }
}

/// Makespan of a rank sequence using `front` as scratch (length K).
pub(crate) fn makespan_of_ranks(
    table: &StageTimingTable,
    ranks: &[usize],
    front: &mut [Time],
) -> Time {
    front.iter_mut().for_each(|t| *t = 0);
    for &rank in ranks {
        advance_front(table, front, rank);
    }
    front.last().copied().unwrap_or(0)
}
