//! Trellis core library — domain types, plan documents, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`error`] — [`PlanError`]
//! - [`plan`] — plan document loading and validation

pub mod error;
pub mod plan;
pub mod types;

pub use error::PlanError;
pub use plan::{Plan, PlanNode};
pub use types::{
    Issue, IssueId, Label, LabelId, Project, ProjectId, StateId, Team, TeamId, User, UserId,
    WorkflowState,
};
