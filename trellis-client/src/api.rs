//! The remote issue API trait and its mutation input types.

use serde::Serialize;
use trellis_core::types::{
    Issue, IssueId, Label, LabelId, Project, ProjectId, StateId, Team, TeamId, User, UserId,
    WorkflowState,
};

use crate::error::ApiError;

/// Everything the import engine needs from a remote tracker.
///
/// Methods take `&mut self`: a run owns its collaborator exclusively, and
/// implementations are free to keep per-connection state. Reads return owned
/// vectors; the engine builds its own indexes and never holds borrows into
/// the client.
pub trait IssueApi {
    /// All teams in the workspace.
    fn teams(&mut self) -> Result<Vec<Team>, ApiError>;

    /// Projects visible to a team.
    fn projects(&mut self, team: &TeamId) -> Result<Vec<Project>, ApiError>;

    /// Labels usable by a team (team-scoped and workspace-wide).
    fn labels(&mut self, team: &TeamId) -> Result<Vec<Label>, ApiError>;

    /// Create a team-scoped label.
    fn create_label(&mut self, team: &TeamId, name: &str) -> Result<Label, ApiError>;

    /// A team's workflow states, e.g. Backlog / Todo / Done.
    fn workflow_states(&mut self, team: &TeamId) -> Result<Vec<WorkflowState>, ApiError>;

    /// Members of a team.
    fn members(&mut self, team: &TeamId) -> Result<Vec<User>, ApiError>;

    /// A bounded snapshot of a team's issues.
    fn issues(&mut self, team: &TeamId) -> Result<Vec<Issue>, ApiError>;

    /// Create an issue; returns it as the remote now sees it.
    fn create_issue(&mut self, input: &CreateIssueInput) -> Result<Issue, ApiError>;

    /// Apply a partial patch to an existing issue.
    fn update_issue(&mut self, id: &IssueId, patch: &UpdateIssueInput)
        -> Result<Issue, ApiError>;
}

/// Full input for issue creation. Serializes to the remote's camelCase
/// field names; unset optionals are omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueInput {
    pub title: String,
    pub team_id: TeamId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub label_ids: Vec<LabelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<StateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<IssueId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
}

/// Partial patch for issue update. An unset field is omitted from the wire
/// and leaves the remote value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_ids: Option<Vec<LabelId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<StateId>,
    /// Three-state: `None` leaves the parent untouched, `Some(None)`
    /// serializes as an explicit null and detaches the issue to the root,
    /// `Some(Some(id))` moves it under `id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<IssueId>>,
}

impl UpdateIssueInput {
    /// True when every field is unset and the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.label_ids.is_none()
            && self.state_id.is_none()
            && self.parent_id.is_none()
    }
}
