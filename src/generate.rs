//! Random flow-shop instances.
//!
//! Durations are drawn uniformly from `[min, max]` (Taillard's benchmark
//! convention is `[1, 99]`), from a seeded `StdRng` so every instance can be
//! regenerated from its parameters.
//!
//! # Reference
//! Taillard (1993), "Benchmarks for basic scheduling problems"

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::models::{StageTimingTable, TableBuilder, Time};

/// Parameters of a random instance. Job ids are `J1..JN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceGenerator {
    pub jobs: usize,
    pub stages: usize,
    pub min_duration: Time,
    pub max_duration: Time,
    pub seed: u64,
}

impl InstanceGenerator {
    /// Creates a generator with Taillard's `[1, 99]` range and seed 0.
    pub fn new(jobs: usize, stages: usize) -> Self {
        Self {
            jobs,
            stages,
            min_duration: 1,
            max_duration: 99,
            seed: 0,
        }
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the inclusive duration range. Bounds are swapped if reversed.
    pub fn with_duration_range(mut self, min: Time, max: Time) -> Self {
        self.min_duration = min.min(max);
        self.max_duration = min.max(max);
        self
    }

    /// Draws the table.
    ///
    /// # Errors
    /// Whatever [`TableBuilder::build`] rejects: zero jobs or stages, or a
    /// negative minimum duration.
    pub fn generate(&self) -> Result<StageTimingTable, InputError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let (lo, hi) = (
            self.min_duration.min(self.max_duration),
            self.min_duration.max(self.max_duration),
        );

        let mut builder = TableBuilder::new();
        for j in 1..=self.jobs {
            let row: Vec<Time> = (0..self.stages).map(|_| rng.random_range(lo..=hi)).collect();
            builder = builder.with_job(format!("J{j}"), row);
        }
        builder.build()
    }
}
