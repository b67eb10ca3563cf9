//! Flow-shop domain models.
//!
//! Provides the input table, the evaluated trace, and the report handed to
//! presentation code.
//!
//! # Domain Mappings
//!
//! | u-flowshop | Manufacturing | Software delivery | Print shop |
//! |------------|---------------|-------------------|------------|
//! | Job | Product | Project | Print order |
//! | Stage | Workstation | Design/Build/QA team | Print/Cut/Bind |
//! | Order | Production sequence | Release train | Job queue |
//! | Report | Production plan | Delivery plan | Shop schedule |

mod report;
mod table;
mod trace;

pub use report::{Assignment, ScheduleReport};
pub use table::{build_table, StageTimingTable, TableBuilder, Time};
pub use trace::{ScheduleTrace, TraceEntry};
