//! Schedule verification.
//!
//! Independently checks that a [`ScheduleReport`] is a feasible permutation
//! flow-shop schedule for a table. Detects:
//! - Unknown jobs or stages, duplicate and missing operations
//! - Operation lengths that differ from the table
//! - Precedence violations (stage `s` starting before stage `s-1` ends)
//! - Capacity violations (two jobs overlapping on one stage)
//! - Passing (a job overtaking another between stages)
//! - A declared order that is not a permutation of the table's jobs, or that
//!   differs from the sequence actually run on the first stage
//!
//! All problems are collected; nothing stops at the first one.

use crate::models::{Assignment, ScheduleReport, StageTimingTable};
use std::collections::HashMap;

/// Verification result.
pub type ValidationResult = Result<(), Vec<Violation>>;

/// A constraint violation found in a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related job id (or stage name for stage-wide problems).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationType {
    /// Job id not in the table.
    UnknownJob,
    /// Stage index out of range.
    UnknownStage,
    /// A (job, stage) pair is scheduled twice.
    DuplicateOperation,
    /// A (job, stage) pair is not scheduled.
    MissingOperation,
    /// Operation length differs from the table, or starts before 0.
    DurationMismatch,
    /// Stage started before the job finished the previous stage.
    PrecedenceViolation,
    /// Two operations overlap on a single-capacity stage.
    CapacityExceeded,
    /// Job order on a stage differs from the first stage.
    PassingViolation,
    /// Declared order is not the table's jobs, or not the sequence run.
    OrderMismatch,
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Verifies a report against its table.
///
/// # Returns
/// `Ok(())` if the schedule is feasible, `Err(violations)` with all issues.
pub fn verify_report(table: &StageTimingTable, report: &ScheduleReport) -> ValidationResult {
    let mut violations = Vec::new();
    let k = table.stage_count();
    let mut ops: HashMap<(usize, usize), &Assignment> = HashMap::new();

    for a in &report.assignments {
        let Some(rank) = table.rank_of(&a.job_id) else {
            violations.push(Violation::new(
                ViolationType::UnknownJob,
                &a.job_id,
                format!("Job '{}' is not in the table", a.job_id),
                90,
            ));
            continue;
        };
        if a.stage_index >= k {
            violations.push(Violation::new(
                ViolationType::UnknownStage,
                &a.job_id,
                format!("Job '{}' scheduled on stage {} of {}", a.job_id, a.stage_index, k),
                90,
            ));
            continue;
        }
        if ops.insert((rank, a.stage_index), a).is_some() {
            violations.push(Violation::new(
                ViolationType::DuplicateOperation,
                &a.job_id,
                format!("Job '{}' scheduled twice on stage {}", a.job_id, a.stage_index),
                90,
            ));
        }
        let expected = table.duration(rank, a.stage_index);
        if a.duration() != expected || a.start < 0 {
            violations.push(Violation::new(
                ViolationType::DurationMismatch,
                &a.job_id,
                format!(
                    "Job '{}' on stage {} runs [{}, {}), expected length {}",
                    a.job_id, a.stage_index, a.start, a.end, expected
                ),
                80,
            ));
        }
    }

    for rank in 0..table.job_count() {
        for stage in 0..k {
            if !ops.contains_key(&(rank, stage)) {
                violations.push(Violation::new(
                    ViolationType::MissingOperation,
                    table.job(rank),
                    format!("Job '{}' is not scheduled on stage {}", table.job(rank), stage),
                    100,
                ));
            }
        }
    }

    // Precedence within each job.
    for rank in 0..table.job_count() {
        for stage in 1..k {
            let prev = ops.get(&(rank, stage - 1));
            if let (Some(prev), Some(cur)) = (prev, ops.get(&(rank, stage))) {
                if cur.start < prev.end {
                    violations.push(Violation::new(
                        ViolationType::PrecedenceViolation,
                        &cur.job_id,
                        format!(
                            "Job '{}' starts stage {} at {} before finishing stage {} at {}",
                            cur.job_id,
                            stage,
                            cur.start,
                            stage - 1,
                            prev.end
                        ),
                        95,
                    ));
                }
            }
        }
    }

    check_declared_order(table, report, &mut violations);

    // Capacity and passing per stage.
    let position: HashMap<&str, usize> = report
        .order
        .iter()
        .enumerate()
        .map(|(p, id)| (id.as_str(), p))
        .collect();
    let mut first_sequence: Option<Vec<usize>> = None;

    for stage in 0..k {
        let mut on_stage: Vec<(usize, &Assignment)> = ops
            .iter()
            .filter(|((_, s), _)| *s == stage)
            .map(|(&(rank, _), &a)| (rank, a))
            .collect();
        on_stage.sort_by_key(|(rank, a)| {
            (
                a.start,
                a.end,
                position.get(a.job_id.as_str()).copied().unwrap_or(usize::MAX),
                *rank,
            )
        });

        for pair in on_stage.windows(2) {
            let (prev, next) = (pair[0].1, pair[1].1);
            if next.start < prev.end {
                violations.push(Violation::new(
                    ViolationType::CapacityExceeded,
                    &next.job_id,
                    format!(
                        "Jobs '{}' and '{}' overlap on stage {}",
                        prev.job_id, next.job_id, stage
                    ),
                    90,
                ));
            }
        }

        let sequence: Vec<usize> = on_stage.iter().map(|(rank, _)| *rank).collect();
        if stage == 0 && sequence.len() == table.job_count() {
            let declared: Vec<Option<usize>> =
                report.order.iter().map(|id| table.rank_of(id)).collect();
            let run: Vec<Option<usize>> = sequence.iter().copied().map(Some).collect();
            if declared != run {
                violations.push(Violation::new(
                    ViolationType::OrderMismatch,
                    report.stages.first().cloned().unwrap_or_else(|| "0".to_string()),
                    format!(
                        "Declared order [{}] differs from the sequence run on stage 0 [{}]",
                        report.order.join(", "),
                        sequence
                            .iter()
                            .map(|&r| table.job(r))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                    85,
                ));
            }
        }
        match &first_sequence {
            None => first_sequence = Some(sequence),
            Some(first) if first.len() == sequence.len() && *first != sequence => {
                violations.push(Violation::new(
                    ViolationType::PassingViolation,
                    report.stages.get(stage).cloned().unwrap_or_else(|| stage.to_string()),
                    format!("Job order on stage {stage} differs from stage 0"),
                    85,
                ));
            }
            Some(_) => {}
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Checks that `report.order` lists every table job exactly once.
fn check_declared_order(
    table: &StageTimingTable,
    report: &ScheduleReport,
    violations: &mut Vec<Violation>,
) {
    let mut seen = vec![false; table.job_count()];
    for id in &report.order {
        match table.rank_of(id) {
            None => violations.push(Violation::new(
                ViolationType::OrderMismatch,
                id,
                format!("Declared order names job '{id}', which is not in the table"),
                90,
            )),
            Some(rank) if seen[rank] => violations.push(Violation::new(
                ViolationType::OrderMismatch,
                id,
                format!("Declared order lists job '{id}' more than once"),
                90,
            )),
            Some(rank) => seen[rank] = true,
        }
    }
    for rank in (0..table.job_count()).filter(|&r| !seen[r]) {
        violations.push(Violation::new(
            ViolationType::OrderMismatch,
            table.job(rank),
            format!("Declared order omits job '{}'", table.job(rank)),
            90,
        ));
    }
}
