//! Blocking GraphQL client for Linear's API.
//!
//! Every [`IssueApi`] call is one POST to the GraphQL endpoint. Wire shapes
//! live here as private structs and are mapped into the domain types at the
//! boundary; nothing GraphQL-flavored leaks past this module.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use trellis_core::types::{
    Issue, IssueId, Label, LabelId, Project, ProjectId, StateId, Team, TeamId, User, UserId,
    WorkflowState,
};

use crate::api::{CreateIssueInput, IssueApi, UpdateIssueInput};
use crate::error::ApiError;

/// Production endpoint. Override with [`LinearClient::with_url`] for tests
/// or proxies.
pub const DEFAULT_URL: &str = "https://api.linear.app/graphql";

const TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the issue snapshot; pagination past it is out of scope.
const ISSUE_PAGE: u32 = 250;

// ---------------------------------------------------------------------------
// Query documents
// ---------------------------------------------------------------------------

const TEAMS: &str = "query { teams { nodes { id name key } } }";

const TEAM_PROJECTS: &str = "query($teamId: String!) {
  team(id: $teamId) { projects { nodes { id name } } }
}";

const TEAM_LABELS: &str = "query($teamId: String!) {
  team(id: $teamId) { labels { nodes { id name } } }
}";

const TEAM_STATES: &str = "query($teamId: String!) {
  team(id: $teamId) { states { nodes { id name } } }
}";

const TEAM_MEMBERS: &str = "query($teamId: String!) {
  team(id: $teamId) { members { nodes { id name displayName email } } }
}";

const ISSUE_FIELDS: &str =
    "id identifier title url createdAt state { name } parent { id } team { id }";

fn team_issues_query() -> String {
    format!(
        "query($teamId: String!) {{
  team(id: $teamId) {{ issues(first: {ISSUE_PAGE}) {{ nodes {{ {ISSUE_FIELDS} }} }} }}
}}"
    )
}

const LABEL_CREATE: &str = "mutation($input: IssueLabelCreateInput!) {
  issueLabelCreate(input: $input) { issueLabel { id name } }
}";

fn issue_create_mutation() -> String {
    format!(
        "mutation($input: IssueCreateInput!) {{
  issueCreate(input: $input) {{ issue {{ {ISSUE_FIELDS} }} }}
}}"
    )
}

fn issue_update_mutation() -> String {
    format!(
        "mutation($id: String!, $input: IssueUpdateInput!) {{
  issueUpdate(id: $id, input: $input) {{ issue {{ {ISSUE_FIELDS} }} }}
}}"
    )
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking Linear API client. One instance per run.
pub struct LinearClient {
    agent: ureq::Agent,
    url: String,
    api_key: String,
}

impl LinearClient {
    /// Client against the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_url(api_key, DEFAULT_URL)
    }

    /// Client against an arbitrary endpoint.
    pub fn with_url(api_key: impl Into<String>, url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(TIMEOUT).build();
        Self {
            agent,
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// POST one GraphQL document and unwrap the response envelope.
    fn post<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .agent
            .post(&self.url)
            .set("Authorization", &self.api_key)
            .send_json(json!({ "query": query, "variables": variables }))
            .map_err(classify)?;
        let envelope: Envelope<T> = response.into_json()?;
        unwrap_envelope(envelope)
    }
}

fn classify(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, response) => ApiError::Http {
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, ApiError> {
    if !envelope.errors.is_empty() {
        let joined = envelope
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ApiError::Remote(joined));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Remote("response had no data".to_owned()))
}

impl IssueApi for LinearClient {
    fn teams(&mut self) -> Result<Vec<Team>, ApiError> {
        let data: TeamsData = self.post(TEAMS, json!({}))?;
        Ok(data.teams.nodes.into_iter().map(TeamNode::into_team).collect())
    }

    fn projects(&mut self, team: &TeamId) -> Result<Vec<Project>, ApiError> {
        let data: TeamQuery<TeamProjects> =
            self.post(TEAM_PROJECTS, json!({ "teamId": team.0 }))?;
        Ok(data
            .team
            .projects
            .nodes
            .into_iter()
            .map(|n| Project {
                id: ProjectId(n.id),
                name: n.name,
            })
            .collect())
    }

    fn labels(&mut self, team: &TeamId) -> Result<Vec<Label>, ApiError> {
        let data: TeamQuery<TeamLabels> = self.post(TEAM_LABELS, json!({ "teamId": team.0 }))?;
        Ok(data
            .team
            .labels
            .nodes
            .into_iter()
            .map(LabelNode::into_label)
            .collect())
    }

    fn create_label(&mut self, team: &TeamId, name: &str) -> Result<Label, ApiError> {
        let data: LabelCreateData = self.post(
            LABEL_CREATE,
            json!({ "input": { "teamId": team.0, "name": name } }),
        )?;
        Ok(data.payload.issue_label.into_label())
    }

    fn workflow_states(&mut self, team: &TeamId) -> Result<Vec<WorkflowState>, ApiError> {
        let data: TeamQuery<TeamStates> = self.post(TEAM_STATES, json!({ "teamId": team.0 }))?;
        Ok(data
            .team
            .states
            .nodes
            .into_iter()
            .map(|n| WorkflowState {
                id: StateId(n.id),
                name: n.name,
            })
            .collect())
    }

    fn members(&mut self, team: &TeamId) -> Result<Vec<User>, ApiError> {
        let data: TeamQuery<TeamMembers> = self.post(TEAM_MEMBERS, json!({ "teamId": team.0 }))?;
        Ok(data
            .team
            .members
            .nodes
            .into_iter()
            .map(UserNode::into_user)
            .collect())
    }

    fn issues(&mut self, team: &TeamId) -> Result<Vec<Issue>, ApiError> {
        let data: TeamQuery<TeamIssues> =
            self.post(&team_issues_query(), json!({ "teamId": team.0 }))?;
        Ok(data
            .team
            .issues
            .nodes
            .into_iter()
            .map(IssueNode::into_issue)
            .collect())
    }

    fn create_issue(&mut self, input: &CreateIssueInput) -> Result<Issue, ApiError> {
        let data: IssueCreateData =
            self.post(&issue_create_mutation(), json!({ "input": input }))?;
        Ok(data.payload.issue.into_issue())
    }

    fn update_issue(
        &mut self,
        id: &IssueId,
        patch: &UpdateIssueInput,
    ) -> Result<Issue, ApiError> {
        let data: IssueUpdateData = self.post(
            &issue_update_mutation(),
            json!({ "id": id.0, "input": patch }),
        )?;
        Ok(data.payload.issue.into_issue())
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct Conn<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct TeamQuery<T> {
    team: T,
}

#[derive(Deserialize)]
struct TeamsData {
    teams: Conn<TeamNode>,
}

#[derive(Deserialize)]
struct TeamProjects {
    projects: Conn<ProjectNode>,
}

#[derive(Deserialize)]
struct TeamLabels {
    labels: Conn<LabelNode>,
}

#[derive(Deserialize)]
struct TeamStates {
    states: Conn<StateNode>,
}

#[derive(Deserialize)]
struct TeamMembers {
    members: Conn<UserNode>,
}

#[derive(Deserialize)]
struct TeamIssues {
    issues: Conn<IssueNode>,
}

#[derive(Deserialize)]
struct TeamNode {
    id: String,
    name: String,
    key: String,
}

impl TeamNode {
    fn into_team(self) -> Team {
        Team {
            id: TeamId(self.id),
            name: self.name,
            key: self.key,
        }
    }
}

#[derive(Deserialize)]
struct ProjectNode {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct LabelNode {
    id: String,
    name: String,
}

impl LabelNode {
    fn into_label(self) -> Label {
        Label {
            id: LabelId(self.id),
            name: self.name,
        }
    }
}

#[derive(Deserialize)]
struct StateNode {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserNode {
    id: String,
    name: String,
    display_name: Option<String>,
    email: Option<String>,
}

impl UserNode {
    fn into_user(self) -> User {
        User {
            id: UserId(self.id),
            name: self.name,
            display_name: self.display_name,
            email: self.email,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    id: String,
    identifier: String,
    title: String,
    url: Option<String>,
    state: Option<StateRef>,
    parent: Option<ParentRef>,
    team: TeamRef,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct StateRef {
    name: String,
}

#[derive(Deserialize)]
struct ParentRef {
    id: String,
}

#[derive(Deserialize)]
struct TeamRef {
    id: String,
}

impl IssueNode {
    fn into_issue(self) -> Issue {
        Issue {
            id: IssueId(self.id),
            identifier: self.identifier,
            title: self.title,
            url: self.url,
            state: self.state.map(|s| s.name),
            parent_id: self.parent.map(|p| IssueId(p.id)),
            team_id: TeamId(self.team.id),
            created_at: self.created_at,
        }
    }
}

#[derive(Deserialize)]
struct LabelCreateData {
    #[serde(rename = "issueLabelCreate")]
    payload: LabelCreatePayload,
}

#[derive(Deserialize)]
struct LabelCreatePayload {
    #[serde(rename = "issueLabel")]
    issue_label: LabelNode,
}

#[derive(Deserialize)]
struct IssueCreateData {
    #[serde(rename = "issueCreate")]
    payload: IssuePayload,
}

#[derive(Deserialize)]
struct IssueUpdateData {
    #[serde(rename = "issueUpdate")]
    payload: IssuePayload,
}

#[derive(Deserialize)]
struct IssuePayload {
    issue: IssueNode,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
