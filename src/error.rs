//! Error types.
//!
//! Two families of recoverable errors exist:
//! - [`InputError`]: a malformed timing table, always detected at construction.
//! - [`OrderError`]: a candidate order that is not a permutation of the
//!   table's job set, detected before any evaluation work is done.
//!
//! Searching an empty job set is not an error; see
//! [`TerminationReason::EmptyJobSet`](crate::search::TerminationReason::EmptyJobSet).

use thiserror::Error;

/// Top-level error returned by table construction and evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowShopError {
    /// The timing table could not be built.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    /// The order is not a permutation of the table's jobs.
    #[error("invalid order: {0}")]
    InvalidOrder(#[from] OrderError),
}

/// Reasons a timing table is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("the job set is empty")]
    EmptyJobSet,
    #[error("job '{job}' has no stage durations")]
    NoStages { job: String },
    #[error("job '{job}' has {found} stage durations, expected {expected}")]
    RaggedRow {
        job: String,
        expected: usize,
        found: usize,
    },
    #[error("job '{job}' has negative duration {value} at stage {stage}")]
    NegativeDuration { job: String, stage: usize, value: i64 },
    #[error("job '{job}' appears more than once")]
    DuplicateJob { job: String },
    #[error("{found} stage names given for {expected} stages")]
    StageNameCount { expected: usize, found: usize },
    #[error("total processing time overflows at job '{job}'")]
    DurationOverflow { job: String },
    #[error("no cell at rank {rank}, stage {stage} in a {jobs}x{stages} table")]
    CellOutOfRange {
        rank: usize,
        stage: usize,
        jobs: usize,
        stages: usize,
    },
    #[error("trace of {jobs} jobs on {stages} stages has {starts} starts and {ends} ends")]
    TraceShape {
        jobs: usize,
        stages: usize,
        starts: usize,
        ends: usize,
    },
}

/// Reasons an order is rejected by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order has {found} jobs, table has {expected}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("unknown job '{job}' at position {position}")]
    UnknownJob { job: String, position: usize },
    #[error("job '{job}' repeated at position {position}")]
    DuplicateJob { job: String, position: usize },
}
