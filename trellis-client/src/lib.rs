//! Trellis client — the remote issue-tracker boundary.
//!
//! [`IssueApi`] is the narrow trait the import engine drives; everything the
//! engine knows about the remote goes through it. [`LinearClient`] is the
//! production implementation speaking Linear's GraphQL API over blocking
//! HTTP; tests substitute an in-memory fake.

pub mod api;
pub mod error;
pub mod http;

pub use api::{CreateIssueInput, IssueApi, UpdateIssueInput};
pub use error::ApiError;
pub use http::LinearClient;
