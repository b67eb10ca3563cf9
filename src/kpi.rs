//! Schedule quality metrics (KPIs).
//!
//! Computes standard flow-shop performance indicators from a report.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Total Flow Time | Sum of job completion times |
//! | Avg Utilization | Mean stage busyness over the makespan |
//! | Idle Time | Makespan minus busy time, per stage |
//! | Waiting Time | Time jobs spend between stages |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{ScheduleReport, Time};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Latest completion time.
    pub makespan: Time,
    /// Sum of job completion times (all jobs released at 0).
    pub total_flow_time: Time,
    /// Mean job completion time.
    pub avg_flow_time: f64,
    /// Average stage utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Per-stage utilization keyed by stage name.
    pub utilization_by_stage: HashMap<String, f64>,
    /// Sum of idle time over all stages within `[0, makespan)`.
    pub total_idle_time: Time,
    /// Sum over jobs of the gaps between consecutive stages.
    pub total_waiting_time: Time,
}

impl ScheduleKpi {
    /// Computes KPIs from a report.
    pub fn calculate(report: &ScheduleReport) -> Self {
        let makespan = report.makespan();

        let mut total_flow_time: Time = 0;
        let mut total_waiting_time: Time = 0;
        for job in &report.order {
            let ops = report.assignments_for_job(job);
            if let Some(last) = ops.last() {
                total_flow_time += last.end;
            }
            for pair in ops.windows(2) {
                total_waiting_time += (pair[1].start - pair[0].end).max(0);
            }
        }

        let total_idle_time = (0..report.stages.len())
            .map(|s| report.stage_idle_time(s))
            .sum();

        let utilization_by_stage = report.all_utilizations();
        let avg_utilization = if utilization_by_stage.is_empty() {
            0.0
        } else {
            utilization_by_stage.values().sum::<f64>() / utilization_by_stage.len() as f64
        };

        let avg_flow_time = if report.order.is_empty() {
            0.0
        } else {
            total_flow_time as f64 / report.order.len() as f64
        };

        Self {
            makespan,
            total_flow_time,
            avg_flow_time,
            avg_utilization,
            utilization_by_stage,
            total_idle_time,
            total_waiting_time,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_makespan: Time, min_utilization: f64) -> bool {
        self.makespan <= max_makespan && self.avg_utilization >= min_utilization
    }
}
