//! Trellis import engine — reconciles a plan document against a remote
//! issue tracker.
//!
//! One call drives a full run: [`run`] resolves the plan's references to
//! remote ids, snapshots the team's existing issues, then walks the desired
//! tree depth-first and creates, updates or skips each node. The outcome is
//! an [`ImportReport`]; the first remote failure aborts the run.

pub mod error;
pub mod executor;
pub mod report;
pub mod resolver;
pub mod snapshot;

pub use error::ImportError;
pub use executor::{run, ImportOptions};
pub use report::{ImportReport, ReportEntry};
