//! Permutation flow-shop scheduling for the U-Engine ecosystem.
//!
//! Every job visits the same stages in the same sequence, each stage handles
//! one job at a time, and no job overtakes another between stages. A schedule
//! is therefore a single job order; this crate evaluates orders and searches
//! for the one with minimum makespan.
//!
//! # Modules
//!
//! - **`models`**: `StageTimingTable`, `ScheduleTrace`, `ScheduleReport`
//! - **`evaluation`**: order → makespan and per-stage start/end times
//! - **`search`**: exhaustive and branch-and-bound search, parallel and
//!   cancellable, plus Johnson/NEH heuristics
//! - **`validation`**: feasibility checks for reports
//! - **`kpi`**: flow time, utilization, idle and waiting time
//! - **`generate`**: seeded random instances
//!
//! # Example
//!
//! ```
//! use u_flowshop::{build_table, evaluate, find_optimal_order, SearchStrategy};
//!
//! let table = build_table(vec![
//!     ("甲", vec![13, 15, 20]),
//!     ("乙", vec![10, 20, 18]),
//!     ("丙", vec![20, 16, 10]),
//!     ("丁", vec![8, 10, 15]),
//! ])
//! .unwrap();
//!
//! assert_eq!(evaluate(&table, &["丁", "乙", "甲", "丙"]).unwrap().makespan, 86);
//!
//! let best = find_optimal_order(&table, SearchStrategy::Exhaustive, None);
//! assert_eq!(best.order, vec!["丁", "甲", "乙", "丙"]);
//! assert_eq!(best.makespan, 84);
//! ```
//!
//! # References
//!
//! - Johnson (1954), "Optimal two- and three-stage production schedules"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 6
//! - Nawaz, Enscore & Ham (1983), NEH heuristic

pub mod error;
pub mod evaluation;
pub mod generate;
pub mod kpi;
pub mod models;
pub mod search;
pub mod validation;

pub use error::{FlowShopError, InputError, OrderError};
pub use evaluation::{evaluate, Evaluation};
pub use models::{build_table, ScheduleReport, ScheduleTrace, StageTimingTable, Time};
pub use search::{
    find_optimal_order, johnson_order, neh_order, OrderSearch, SearchConfig, SearchResult,
    SearchStrategy, TerminationReason,
};
