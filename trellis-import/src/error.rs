//! Error types for trellis-import.

use thiserror::Error;

use trellis_client::ApiError;
use trellis_core::PlanError;

/// All errors that can abort a reconciliation run.
///
/// The engine fails fast: the first error stops the walk, and anything
/// already committed to the remote stands. Re-running is safe because
/// matching is idempotent.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The plan failed structural validation.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// A remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The plan's team reference matched no remote team by name or key.
    #[error("team '{name}' not found (known teams: {})", .known.join(", "))]
    TeamNotFound { name: String, known: Vec<String> },

    /// An effective status name matched no workflow state in the team.
    #[error("status '{name}' not found in team '{team}' (valid states: {})", .valid.join(", "))]
    StatusNotFound {
        name: String,
        team: String,
        valid: Vec<String>,
    },
}
