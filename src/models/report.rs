//! Schedule report model.
//!
//! A queryable view of a solved flow shop: one assignment per
//! (job, stage) pair with its start and end time. Rendering is left to the
//! caller; this module only exposes data.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 6

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ScheduleTrace, StageTimingTable, Time};

/// A complete flow-shop schedule: the job order and every stage assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// Processing order, identical on every stage.
    pub order: Vec<String>,
    /// Stage names in processing order.
    pub stages: Vec<String>,
    /// Assignments, position-major then stage.
    pub assignments: Vec<Assignment>,
}

/// A job-stage-time assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Job processed.
    pub job_id: String,
    /// Stage index (0-based).
    pub stage_index: usize,
    /// Stage name (denormalized for query convenience).
    pub stage_name: String,
    /// Start time.
    pub start: Time,
    /// End time.
    pub end: Time,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(
        job_id: impl Into<String>,
        stage_index: usize,
        stage_name: impl Into<String>,
        start: Time,
        end: Time,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            stage_index,
            stage_name: stage_name.into(),
            start,
            end,
        }
    }

    /// Processing duration (end - start).
    #[inline]
    pub fn duration(&self) -> Time {
        self.end - self.start
    }
}

impl ScheduleReport {
    /// Builds a report from an evaluated trace.
    pub fn from_trace(table: &StageTimingTable, trace: &ScheduleTrace) -> Self {
        let stages = table.stage_names().to_vec();
        let assignments = trace
            .entries()
            .into_iter()
            .map(|e| {
                let name = stages.get(e.stage).cloned().unwrap_or_default();
                Assignment::new(e.job, e.stage, name, e.start, e.end)
            })
            .collect();
        Self {
            order: trace.order().to_vec(),
            stages,
            assignments,
        }
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Makespan: latest end time across all assignments.
    pub fn makespan(&self) -> Time {
        self.assignments.iter().map(|a| a.end).max().unwrap_or(0)
    }

    /// Finds the assignment of `job_id` on `stage`.
    pub fn assignment_for(&self, job_id: &str, stage: usize) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.job_id == job_id && a.stage_index == stage)
    }

    /// All assignments of a job, in stage order.
    pub fn assignments_for_job(&self, job_id: &str) -> Vec<&Assignment> {
        let mut found: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.job_id == job_id)
            .collect();
        found.sort_by_key(|a| a.stage_index);
        found
    }

    /// All assignments on a stage, in start-time order.
    pub fn assignments_for_stage(&self, stage: usize) -> Vec<&Assignment> {
        let mut found: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.stage_index == stage)
            .collect();
        found.sort_by_key(|a| (a.start, a.end));
        found
    }

    /// Completion time of a job (latest end of its assignments).
    pub fn job_completion_time(&self, job_id: &str) -> Option<Time> {
        self.assignments
            .iter()
            .filter(|a| a.job_id == job_id)
            .map(|a| a.end)
            .max()
    }

    /// Busy time of a stage.
    pub fn stage_busy_time(&self, stage: usize) -> Time {
        self.assignments
            .iter()
            .filter(|a| a.stage_index == stage)
            .map(Assignment::duration)
            .sum()
    }

    /// Idle time of a stage within `[0, makespan)`.
    pub fn stage_idle_time(&self, stage: usize) -> Time {
        self.makespan() - self.stage_busy_time(stage)
    }

    /// Stage utilization: busy_time / horizon.
    ///
    /// Returns `None` if `horizon` is not positive.
    pub fn stage_utilization(&self, stage: usize, horizon: Time) -> Option<f64> {
        if horizon <= 0 {
            return None;
        }
        Some(self.stage_busy_time(stage) as f64 / horizon as f64)
    }

    /// Utilization of every stage keyed by stage name, over the makespan.
    pub fn all_utilizations(&self) -> HashMap<String, f64> {
        let horizon = self.makespan();
        if horizon <= 0 {
            return HashMap::new();
        }
        self.stages
            .iter()
            .enumerate()
            .map(|(s, name)| (name.clone(), self.stage_busy_time(s) as f64 / horizon as f64))
            .collect()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}
