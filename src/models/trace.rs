//! Schedule trace: start and end of every job on every stage for one order.

use serde::{Deserialize, Serialize};

use super::Time;
use crate::error::InputError;

/// Per-position, per-stage start and end times produced by the evaluator.
///
/// Derived from a table and an order; it is never edited independently.
/// Deserialization checks that `starts` and `ends` hold exactly one entry
/// per (position, stage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TraceDef", into = "TraceDef")]
pub struct ScheduleTrace {
    order: Vec<String>,
    stage_count: usize,
    /// Row-major by position: `starts[position * stage_count + stage]`.
    starts: Vec<Time>,
    ends: Vec<Time>,
}

/// One (job, stage, start, end) tuple of a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub job: String,
    pub stage: usize,
    pub start: Time,
    pub end: Time,
}

impl ScheduleTrace {
    pub(crate) fn new(
        order: Vec<String>,
        stage_count: usize,
        starts: Vec<Time>,
        ends: Vec<Time>,
    ) -> Self {
        debug_assert_eq!(starts.len(), order.len() * stage_count);
        debug_assert_eq!(ends.len(), starts.len());
        Self {
            order,
            stage_count,
            starts,
            ends,
        }
    }

    /// The job order this trace was computed for.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Number of jobs in the order.
    pub fn job_count(&self) -> usize {
        self.order.len()
    }

    /// Number of stages every job passes through.
    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    /// Start time of the job at `position` on `stage`.
    #[inline]
    pub fn start(&self, position: usize, stage: usize) -> Time {
        self.starts[position * self.stage_count + stage]
    }

    /// End time of the job at `position` on `stage`.
    #[inline]
    pub fn end(&self, position: usize, stage: usize) -> Time {
        self.ends[position * self.stage_count + stage]
    }

    /// End of the last job on the last stage; 0 for an empty trace.
    pub fn makespan(&self) -> Time {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Completion time (last-stage end) of a job, `None` if absent.
    pub fn completion_time(&self, job: &str) -> Option<Time> {
        let position = self.order.iter().position(|j| j == job)?;
        let last = self.stage_count.checked_sub(1)?;
        Some(self.end(position, last))
    }

    /// Jobs in the order they finish `stage` (ties keep order position).
    pub fn finish_sequence(&self, stage: usize) -> Vec<&str> {
        let mut positions: Vec<usize> = (0..self.order.len()).collect();
        positions.sort_by_key(|&p| (self.end(p, stage), p));
        positions.into_iter().map(|p| self.order[p].as_str()).collect()
    }

    /// All tuples, position-major then stage.
    pub fn entries(&self) -> Vec<TraceEntry> {
        let mut out = Vec::with_capacity(self.starts.len());
        for (position, job) in self.order.iter().enumerate() {
            for stage in 0..self.stage_count {
                out.push(TraceEntry {
                    job: job.clone(),
                    stage,
                    start: self.start(position, stage),
                    end: self.end(position, stage),
                });
            }
        }
        out
    }
}

/// Serialized shape of a trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TraceDef {
    order: Vec<String>,
    stage_count: usize,
    starts: Vec<Time>,
    ends: Vec<Time>,
}

impl TryFrom<TraceDef> for ScheduleTrace {
    type Error = InputError;

    fn try_from(def: TraceDef) -> Result<Self, Self::Error> {
        let cells = def.order.len().checked_mul(def.stage_count);
        let shaped = cells == Some(def.starts.len())
            && def.ends.len() == def.starts.len()
            && (def.order.is_empty() || def.stage_count > 0);
        if !shaped {
            return Err(InputError::TraceShape {
                jobs: def.order.len(),
                stages: def.stage_count,
                starts: def.starts.len(),
                ends: def.ends.len(),
            });
        }
        Ok(Self::new(def.order, def.stage_count, def.starts, def.ends))
    }
}

impl From<ScheduleTrace> for TraceDef {
    fn from(trace: ScheduleTrace) -> Self {
        Self {
            order: trace.order,
            stage_count: trace.stage_count,
            starts: trace.starts,
            ends: trace.ends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScheduleTrace {
        // A: [0,2) [2,5); B: [2,3) [5,6)
        ScheduleTrace::new(
            vec!["A".into(), "B".into()],
            2,
            vec![0, 2, 2, 5],
            vec![2, 5, 3, 6],
        )
    }

    #[test]
    fn test_accessors() {
        let t = sample();
        assert_eq!(t.makespan(), 6);
        assert_eq!(t.start(1, 1), 5);
        assert_eq!(t.end(0, 1), 5);
        assert_eq!(t.completion_time("A"), Some(5));
        assert_eq!(t.completion_time("Z"), None);
        assert_eq!(t.finish_sequence(1), vec!["A", "B"]);
    }

    #[test]
    fn test_entries_shape() {
        let entries = sample().entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries[3],
            TraceEntry {
                job: "B".into(),
                stage: 1,
                start: 5,
                end: 6
            }
        );
    }

    #[test]
    fn test_empty_trace() {
        let t = ScheduleTrace::new(Vec::new(), 0, Vec::new(), Vec::new());
        assert_eq!(t.makespan(), 0);
        assert!(t.entries().is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let t = sample();
        let json = serde_json::to_string(&t).unwrap();
        let back: ScheduleTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_deserialize_rejects_bad_shape() {
        let no_stages = r#"{"order":["A"],"stage_count":0,"starts":[],"ends":[]}"#;
        assert!(serde_json::from_str::<ScheduleTrace>(no_stages).is_err());

        let short_ends = r#"{"order":["A"],"stage_count":2,"starts":[0,2],"ends":[2]}"#;
        assert!(serde_json::from_str::<ScheduleTrace>(short_ends).is_err());

        let too_many = r#"{"order":["A"],"stage_count":1,"starts":[0,1],"ends":[1,2]}"#;
        assert!(serde_json::from_str::<ScheduleTrace>(too_many).is_err());

        let empty = r#"{"order":[],"stage_count":0,"starts":[],"ends":[]}"#;
        let t: ScheduleTrace = serde_json::from_str(empty).unwrap();
        assert_eq!(t.completion_time("A"), None);
    }

    #[test]
    fn test_completion_time_without_stages() {
        let t = ScheduleTrace::new(vec!["A".into()], 0, Vec::new(), Vec::new());
        assert_eq!(t.completion_time("A"), None);
    }
}
