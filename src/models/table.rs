//! Stage timing table.
//!
//! The immutable input of a permutation flow shop: one row of stage
//! durations per job, every row of the same length. Jobs keep the order in
//! which they were added; a job's position in that list is its *rank*, which
//! is the deterministic tie-break key used by the order search.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 6.1

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{FlowShopError, InputError};

/// Time unit for durations and instants (e.g. days, minutes, ms).
pub type Time = i64;

/// Per-job, per-stage processing durations.
///
/// Built once via [`build_table`] or [`TableBuilder`], never mutated.
/// Lookups by rank and stage are O(1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDef", into = "TableDef")]
pub struct StageTimingTable {
    jobs: Vec<String>,
    stages: Vec<String>,
    /// Row-major: `durations[rank * stage_count + stage]`.
    durations: Vec<Time>,
    index: HashMap<String, usize>,
}

/// Builds a timing table from `(job id, durations)` pairs.
///
/// The iteration order of `jobs` becomes the table's stable job list, so pass
/// an ordered collection (a `Vec` of pairs or a `BTreeMap`), not a `HashMap`.
///
/// # Errors
/// [`FlowShopError::InvalidInput`] if the job set is empty, rows differ in
/// length, a duration is negative, or a job id repeats.
///
/// # Example
/// ```
/// use u_flowshop::build_table;
///
/// let table = build_table(vec![("A", vec![3, 2]), ("B", vec![1, 4])]).unwrap();
/// assert_eq!(table.job_count(), 2);
/// assert_eq!(table.stage_count(), 2);
/// ```
pub fn build_table<I, K, D>(jobs: I) -> Result<StageTimingTable, FlowShopError>
where
    I: IntoIterator<Item = (K, D)>,
    K: Into<String>,
    D: IntoIterator<Item = Time>,
{
    let builder = jobs
        .into_iter()
        .fold(TableBuilder::new(), |b, (id, durations)| {
            b.with_job(id, durations)
        });
    Ok(builder.build()?)
}

/// Incremental constructor for [`StageTimingTable`].
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    stage_names: Option<Vec<String>>,
    rows: Vec<(String, Vec<Time>)>,
}

impl TableBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the stages (e.g. "design", "manufacture", "inspect").
    ///
    /// Defaults to `S1..SK` when not set.
    pub fn with_stage_names<N, S>(mut self, names: N) -> Self
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stage_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Appends a job with its stage durations.
    pub fn with_job<D>(mut self, id: impl Into<String>, durations: D) -> Self
    where
        D: IntoIterator<Item = Time>,
    {
        self.rows.push((id.into(), durations.into_iter().collect()));
        self
    }

    /// Validates the rows and builds the table.
    pub fn build(self) -> Result<StageTimingTable, InputError> {
        let (first_id, first_row) = self.rows.first().ok_or(InputError::EmptyJobSet)?;
        let stage_count = first_row.len();
        if stage_count == 0 {
            return Err(InputError::NoStages {
                job: first_id.clone(),
            });
        }

        let stages = match self.stage_names {
            Some(names) if names.len() != stage_count => {
                return Err(InputError::StageNameCount {
                    expected: stage_count,
                    found: names.len(),
                });
            }
            Some(names) => names,
            None => (1..=stage_count).map(|s| format!("S{s}")).collect(),
        };

        let mut jobs = Vec::with_capacity(self.rows.len());
        let mut index = HashMap::with_capacity(self.rows.len());
        let mut durations = Vec::with_capacity(self.rows.len() * stage_count);
        let mut total: Time = 0;

        for (id, row) in self.rows {
            if row.len() != stage_count {
                return Err(InputError::RaggedRow {
                    job: id,
                    expected: stage_count,
                    found: row.len(),
                });
            }
            for (stage, &value) in row.iter().enumerate() {
                if value < 0 {
                    return Err(InputError::NegativeDuration {
                        job: id,
                        stage,
                        value,
                    });
                }
                total = match total.checked_add(value) {
                    Some(t) => t,
                    None => return Err(InputError::DurationOverflow { job: id }),
                };
            }
            if index.contains_key(&id) {
                return Err(InputError::DuplicateJob { job: id });
            }
            index.insert(id.clone(), jobs.len());
            jobs.push(id);
            durations.extend_from_slice(&row);
        }

        Ok(StageTimingTable {
            jobs,
            stages,
            durations,
            index,
        })
    }
}

impl StageTimingTable {
    /// A table with no jobs and no stages.
    ///
    /// [`build_table`] rejects an empty job set; this is the explicit way to
    /// ask the search for its degenerate empty result.
    pub fn empty() -> Self {
        Self {
            jobs: Vec::new(),
            stages: Vec::new(),
            durations: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Number of jobs (N).
    #[inline]
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Number of stages (K).
    #[inline]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Whether the table has no jobs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Job ids in stable (insertion) order.
    pub fn jobs(&self) -> &[String] {
        &self.jobs
    }

    /// Stage names in processing order.
    pub fn stage_names(&self) -> &[String] {
        &self.stages
    }

    /// Job id at `rank`.
    ///
    /// # Panics
    /// If `rank >= job_count()`.
    #[inline]
    pub fn job(&self, rank: usize) -> &str {
        &self.jobs[rank]
    }

    /// Rank of a job id in the stable job list.
    #[inline]
    pub fn rank_of(&self, job: &str) -> Option<usize> {
        self.index.get(job).copied()
    }

    /// Duration of the job at `rank` on `stage`.
    ///
    /// # Panics
    /// If `rank` or `stage` is out of range.
    #[inline]
    pub fn duration(&self, rank: usize, stage: usize) -> Time {
        debug_assert!(stage < self.stage_count());
        self.durations[rank * self.stage_count() + stage]
    }

    /// Duration of a job by id, `None` for unknown ids or stages.
    pub fn duration_of(&self, job: &str, stage: usize) -> Option<Time> {
        if stage >= self.stage_count() {
            return None;
        }
        self.rank_of(job).map(|rank| self.duration(rank, stage))
    }

    /// All stage durations of the job at `rank`.
    #[inline]
    pub fn row(&self, rank: usize) -> &[Time] {
        let k = self.stage_count();
        &self.durations[rank * k..(rank + 1) * k]
    }

    /// Total processing time of the job at `rank` over all stages.
    pub fn total_work(&self, rank: usize) -> Time {
        self.row(rank).iter().sum()
    }

    /// `(job id, durations)` pairs in stable order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Time])> + '_ {
        self.jobs
            .iter()
            .enumerate()
            .map(move |(rank, id)| (id.as_str(), self.row(rank)))
    }

    /// Returns a copy with one duration replaced, re-validated.
    ///
    /// Useful for sensitivity analysis; the original table is untouched.
    ///
    /// # Errors
    /// [`InputError::CellOutOfRange`] if `rank` or `stage` is not in the
    /// table, or any construction error caused by `value`.
    pub fn with_duration(
        &self,
        rank: usize,
        stage: usize,
        value: Time,
    ) -> Result<Self, InputError> {
        if rank >= self.job_count() || stage >= self.stage_count() {
            return Err(InputError::CellOutOfRange {
                rank,
                stage,
                jobs: self.job_count(),
                stages: self.stage_count(),
            });
        }
        let mut builder = TableBuilder::new().with_stage_names(self.stages.iter().cloned());
        for (r, (id, row)) in self.rows().enumerate() {
            let mut row = row.to_vec();
            if r == rank {
                row[stage] = value;
            }
            builder = builder.with_job(id, row);
        }
        builder.build()
    }
}

/// Serialized shape of a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableDef {
    stages: Vec<String>,
    jobs: Vec<JobDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JobDef {
    id: String,
    durations: Vec<Time>,
}

impl TryFrom<TableDef> for StageTimingTable {
    type Error = InputError;

    fn try_from(def: TableDef) -> Result<Self, Self::Error> {
        let mut builder = TableBuilder::new();
        if !def.stages.is_empty() {
            builder = builder.with_stage_names(def.stages);
        }
        def.jobs
            .into_iter()
            .fold(builder, |b, job| b.with_job(job.id, job.durations))
            .build()
    }
}

impl From<StageTimingTable> for TableDef {
    fn from(table: StageTimingTable) -> Self {
        let jobs = table
            .rows()
            .map(|(id, row)| JobDef {
                id: id.to_string(),
                durations: row.to_vec(),
            })
            .collect();
        Self {
            stages: table.stages,
            jobs,
        }
    }
}
