//! Optimal job-order search.
//!
//! Two interchangeable exact strategies share one driver:
//!
//! - [`SearchStrategy::Exhaustive`]: evaluates all N! orders.
//! - [`SearchStrategy::Bounded`]: depth-first branch-and-bound with a
//!   machine-based lower bound.
//!
//! # Parallelism
//!
//! The driver runs a fixed pool of scoped worker threads. Work units are the
//! first job of the order, claimed from an atomic cursor. Workers share the
//! immutable table by reference and one incumbent that only ever accepts
//! strictly better `(makespan, ranks)` pairs, so a completed parallel search
//! returns exactly the serial result.
//!
//! # Seeding
//!
//! Before the exact search starts, the incumbent is seeded with Johnson's
//! rule (two stages) or NEH (otherwise). A search cut short by its time
//! budget or stop flag therefore still returns a complete order.
//!
//! # Usage
//!
//! ```
//! use u_flowshop::{build_table, find_optimal_order, SearchStrategy};
//!
//! let table = build_table(vec![
//!     ("甲", vec![13, 15, 20]),
//!     ("乙", vec![10, 20, 18]),
//!     ("丙", vec![20, 16, 10]),
//!     ("丁", vec![8, 10, 15]),
//! ])
//! .unwrap();
//!
//! let result = find_optimal_order(&table, SearchStrategy::Bounded, None);
//! assert_eq!(result.order, vec!["丁", "甲", "乙", "丙"]);
//! assert_eq!(result.makespan, 84);
//! ```

mod bnb;
mod exhaustive;
mod heuristics;
mod incumbent;
mod monitor;
mod stats;

pub use heuristics::{johnson_order, neh_order};
pub use stats::SearchStats;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::evaluation::{evaluate_ranks, makespan_of_ranks};
use crate::models::{ScheduleReport, ScheduleTrace, StageTimingTable, Time};
use bnb::BranchAndBound;
use incumbent::{Candidate, SharedIncumbent};
use monitor::{SearchMonitor, StopSignal};

/// Search strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Enumerate every order.
    Exhaustive,
    /// Branch-and-bound (exact).
    #[default]
    Bounded,
}

/// Why a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The whole space was covered; the order is optimal.
    OptimalityProven,
    /// The time budget ran out; the order is the best found.
    TimeLimitReached,
    /// The caller's stop flag was raised; the order is the best found.
    Interrupted,
    /// The table has no jobs: empty order, makespan 0.
    EmptyJobSet,
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Exhaustive or branch-and-bound.
    pub strategy: SearchStrategy,
    /// Wall-clock cap on the search. `None` = run to completion.
    pub time_budget: Option<Duration>,
    /// Worker threads (clamped to `1..=job_count`).
    pub threads: usize,
    /// Whether the result carries the winning order's trace.
    pub include_trace: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::default(),
            time_budget: None,
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            include_trace: true,
        }
    }
}

impl SearchConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Sets the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets whether the trace is included in the result.
    pub fn with_trace(mut self, include_trace: bool) -> Self {
        self.include_trace = include_trace;
        self
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Best order found (job ids).
    pub order: Vec<String>,
    /// Makespan of `order`.
    pub makespan: Time,
    /// Start/end times of `order`, if requested.
    pub trace: Option<ScheduleTrace>,
    /// Why the search ended.
    pub termination: TerminationReason,
    /// Search counters.
    pub stats: SearchStats,
}

impl SearchResult {
    fn empty(include_trace: bool) -> Self {
        Self {
            order: Vec::new(),
            makespan: 0,
            trace: include_trace.then(|| ScheduleTrace::new(Vec::new(), 0, Vec::new(), Vec::new())),
            termination: TerminationReason::EmptyJobSet,
            stats: SearchStats::default(),
        }
    }

    /// Whether `order` is proven optimal.
    pub fn is_optimal(&self) -> bool {
        matches!(
            self.termination,
            TerminationReason::OptimalityProven | TerminationReason::EmptyJobSet
        )
    }

    /// Report view of the trace, if one was recorded.
    pub fn report(&self, table: &StageTimingTable) -> Option<ScheduleReport> {
        self.trace
            .as_ref()
            .map(|trace| ScheduleReport::from_trace(table, trace))
    }
}

/// Finds the order minimizing makespan.
///
/// Ties are broken toward the lexicographically smallest order of job ranks
/// (positions in the table's job list). Uses all available cores and records
/// the trace; see [`OrderSearch`] for finer control.
pub fn find_optimal_order(
    table: &StageTimingTable,
    strategy: SearchStrategy,
    time_budget: Option<Duration>,
) -> SearchResult {
    let mut config = SearchConfig::new().with_strategy(strategy);
    config.time_budget = time_budget;
    OrderSearch::new(config).run(table)
}

/// Configurable search runner.
#[derive(Debug, Clone, Default)]
pub struct OrderSearch<'a> {
    config: SearchConfig,
    stop_flag: Option<&'a AtomicBool>,
}

impl<'a> OrderSearch<'a> {
    /// Creates a runner with the given configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            stop_flag: None,
        }
    }

    /// Stops the search cooperatively once `flag` becomes `true`.
    pub fn with_stop_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    /// The configuration this runner was built with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs the search.
    pub fn run(&self, table: &StageTimingTable) -> SearchResult {
        let started = Instant::now();
        if table.is_empty() {
            debug!("search over an empty job set");
            return SearchResult::empty(self.config.include_trace);
        }

        let n = table.job_count();
        let threads = self.config.threads.clamp(1, n);
        debug!(
            "{:?} search: {} jobs x {} stages, {} thread(s), budget {:?}",
            self.config.strategy,
            n,
            table.stage_count(),
            threads,
            self.config.time_budget
        );

        let incumbent = SharedIncumbent::new();
        let seed = heuristics::initial_ranks(table);
        let mut front = vec![0; table.stage_count()];
        let seed_makespan = makespan_of_ranks(table, &seed, &mut front);
        incumbent.try_install(seed_makespan, &seed);
        trace!("seeded incumbent {seed_makespan} {seed:?}");

        let deadline = self
            .config
            .time_budget
            .and_then(|budget| started.checked_add(budget));
        let signal = StopSignal::new();
        let cursor = AtomicUsize::new(0);
        let bnb = BranchAndBound::new(table);

        let worker = || {
            let mut monitor = SearchMonitor::new(&signal, self.stop_flag, deadline);
            let mut stats = SearchStats::default();
            loop {
                let first = cursor.fetch_add(1, Ordering::Relaxed);
                if first >= n {
                    break;
                }
                let completed = match self.config.strategy {
                    SearchStrategy::Exhaustive => exhaustive::search_subtree(
                        table,
                        first,
                        &incumbent,
                        &mut monitor,
                        &mut stats,
                    ),
                    SearchStrategy::Bounded => {
                        bnb.search_subtree(first, &incumbent, &mut monitor, &mut stats)
                    }
                };
                if !completed {
                    break;
                }
            }
            stats
        };

        let mut stats = SearchStats {
            improvements: 1,
            threads,
            ..SearchStats::default()
        };
        if threads == 1 {
            stats.merge(&worker());
        } else {
            std::thread::scope(|scope| {
                let handles: Vec<_> = (0..threads).map(|_| scope.spawn(&worker)).collect();
                for handle in handles {
                    match handle.join() {
                        Ok(worker_stats) => stats.merge(&worker_stats),
                        Err(panic) => std::panic::resume_unwind(panic),
                    }
                }
            });
        }
        stats.elapsed = started.elapsed();

        let termination = signal
            .reason()
            .unwrap_or(TerminationReason::OptimalityProven);
        if termination != TerminationReason::OptimalityProven {
            info!("search stopped early ({termination:?}); returning best order found");
        }

        let best = incumbent.into_best().unwrap_or(Candidate {
            makespan: seed_makespan,
            ranks: seed,
        });
        debug!("search finished: makespan {} ({})", best.makespan, stats);

        let trace = self
            .config
            .include_trace
            .then(|| evaluate_ranks(table, &best.ranks).trace);
        SearchResult {
            order: best.ranks.iter().map(|&r| table.job(r).to_string()).collect(),
            makespan: best.makespan,
            trace,
            termination,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::evaluate;
    use crate::generate::InstanceGenerator;
    use crate::models::{build_table, TableBuilder};

    fn reference_table() -> StageTimingTable {
        TableBuilder::new()
            .with_stage_names(["design", "manufacture", "inspect"])
            .with_job("甲", [13, 15, 20])
            .with_job("乙", [10, 20, 18])
            .with_job("丙", [20, 16, 10])
            .with_job("丁", [8, 10, 15])
            .build()
            .unwrap()
    }

    fn serial(strategy: SearchStrategy) -> OrderSearch<'static> {
        OrderSearch::new(
            SearchConfig::new()
                .with_strategy(strategy)
                .with_threads(1),
        )
    }

    #[test]
    fn test_reference_problem_both_strategies() {
        let table = reference_table();
        for strategy in [SearchStrategy::Exhaustive, SearchStrategy::Bounded] {
            let result = find_optimal_order(&table, strategy, None);
            assert_eq!(result.order, vec!["丁", "甲", "乙", "丙"]);
            assert_eq!(result.makespan, 84);
            assert_eq!(result.termination, TerminationReason::OptimalityProven);
            assert!(result.is_optimal());
            let trace = result.trace.as_ref().unwrap();
            assert_eq!(trace.makespan(), 84);
        }
        let dominated = evaluate(&table, &["丁", "乙", "甲", "丙"]).unwrap();
        assert!(dominated.makespan > 84);
    }

    #[test]
    fn test_exhaustive_counts_all_orders() {
        let table = reference_table();
        let result = serial(SearchStrategy::Exhaustive).run(&table);
        assert_eq!(result.stats.evaluations, 24);
        assert_eq!(result.stats.threads, 1);
    }

    #[test]
    fn test_empty_job_set() {
        let result = find_optimal_order(&StageTimingTable::empty(), SearchStrategy::Bounded, None);
        assert!(result.order.is_empty());
        assert_eq!(result.makespan, 0);
        assert_eq!(result.termination, TerminationReason::EmptyJobSet);
        assert!(result.is_optimal());
    }

    #[test]
    fn test_single_job() {
        let table = build_table(vec![("only", vec![4, 5, 6])]).unwrap();
        let result = find_optimal_order(&table, SearchStrategy::Bounded, None);
        assert_eq!(result.order, vec!["only"]);
        assert_eq!(result.makespan, 15);
    }

    #[test]
    fn test_exhaustive_equals_bounded() {
        for seed in 0..12 {
            let table = InstanceGenerator::new(6, 3 + (seed as usize % 3))
                .with_seed(seed)
                .generate()
                .unwrap();
            let ex = serial(SearchStrategy::Exhaustive).run(&table);
            let bb = serial(SearchStrategy::Bounded).run(&table);
            assert_eq!(ex.makespan, bb.makespan, "seed {seed}");
            assert_eq!(ex.order, bb.order, "seed {seed}");
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        for seed in 0..6 {
            let table = InstanceGenerator::new(7, 4).with_seed(seed).generate().unwrap();
            for strategy in [SearchStrategy::Exhaustive, SearchStrategy::Bounded] {
                let one = serial(strategy).run(&table);
                let many = OrderSearch::new(
                    SearchConfig::new().with_strategy(strategy).with_threads(4),
                )
                .run(&table);
                assert_eq!(one.order, many.order);
                assert_eq!(one.makespan, many.makespan);
                assert_eq!(many.stats.threads, 4);
            }
        }
    }

    #[test]
    fn test_ties_break_to_first_ranks() {
        // Identical jobs: every order ties, the stable job order wins.
        let table = build_table(vec![
            ("C", vec![2, 2, 2]),
            ("A", vec![2, 2, 2]),
            ("B", vec![2, 2, 2]),
        ])
        .unwrap();
        for strategy in [SearchStrategy::Exhaustive, SearchStrategy::Bounded] {
            let result = OrderSearch::new(
                SearchConfig::new().with_strategy(strategy).with_threads(3),
            )
            .run(&table);
            assert_eq!(result.order, vec!["C", "A", "B"]);
            assert_eq!(result.makespan, 10);
        }
    }

    #[test]
    fn test_two_stage_uses_exact_tie_break() {
        // Johnson would put B first; both B,A and A,B give makespan 4.
        let table = build_table(vec![("A", vec![1, 1]), ("B", vec![1, 2])]).unwrap();
        let result = serial(SearchStrategy::Bounded).run(&table);
        let ab = evaluate(&table, &["A", "B"]).unwrap().makespan;
        let ba = evaluate(&table, &["B", "A"]).unwrap().makespan;
        assert_eq!(result.makespan, ab.min(ba));
        if ab == ba {
            assert_eq!(result.order, vec!["A", "B"]);
        }
    }

    #[test]
    fn test_two_job_closed_form() {
        for seed in 0..10 {
            let table = InstanceGenerator::new(2, 5).with_seed(seed).generate().unwrap();
            let result = find_optimal_order(&table, SearchStrategy::Bounded, None);
            let a = evaluate(&table, &["J1", "J2"]).unwrap().makespan;
            let b = evaluate(&table, &["J2", "J1"]).unwrap().makespan;
            assert_eq!(result.makespan, a.min(b));
        }
    }

    #[test]
    fn test_stop_flag_returns_seed() {
        let table = InstanceGenerator::new(9, 5).with_seed(1).generate().unwrap();
        let flag = AtomicBool::new(true);
        let result = OrderSearch::new(SearchConfig::new().with_threads(2))
            .with_stop_flag(&flag)
            .run(&table);
        assert_eq!(result.termination, TerminationReason::Interrupted);
        assert!(!result.is_optimal());
        assert_eq!(result.order.len(), 9);
        let check = evaluate(&table, &result.order).unwrap();
        assert_eq!(check.makespan, result.makespan);
    }

    #[test]
    fn test_zero_time_budget() {
        let table = InstanceGenerator::new(9, 5).with_seed(2).generate().unwrap();
        let result = find_optimal_order(&table, SearchStrategy::Exhaustive, Some(Duration::ZERO));
        assert_eq!(result.termination, TerminationReason::TimeLimitReached);
        assert_eq!(result.order.len(), 9);
    }

    #[test]
    fn test_without_trace_and_report() {
        let table = reference_table();
        let result = OrderSearch::new(SearchConfig::new().with_trace(false)).run(&table);
        assert!(result.trace.is_none());
        assert!(result.report(&table).is_none());

        let with = find_optimal_order(&table, SearchStrategy::Bounded, None);
        let report = with.report(&table).unwrap();
        assert_eq!(report.makespan(), 84);
        assert_eq!(report.assignment_for("丙", 2).unwrap().stage_name, "inspect");
    }

    #[test]
    fn test_config_serde() {
        let config = SearchConfig::new()
            .with_strategy(SearchStrategy::Exhaustive)
            .with_time_budget(Duration::from_millis(250))
            .with_threads(2);
        let json = serde_json::to_string(&config).unwrap();
        let back: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
