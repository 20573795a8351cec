//! Last-run lookups for one project or the whole registry.

pub mod aggregator;
pub mod last_run;
pub mod relative_time;

pub use aggregator::{StatusAggregator, StatusReport, STATUS_MAX_CONCURRENCY};
pub use last_run::{
    find_last_run, last_run_for_target, project_status, LastRun, ProjectStatus,
    ProjectStatusReport,
};
pub use relative_time::format_relative_time;
