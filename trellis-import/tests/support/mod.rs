//! Deterministic in-memory `IssueApi` for engine tests.
//!
//! The fake stores full issue state, including fields the domain `Issue`
//! does not carry (description, labels, priority), so tests can assert on
//! everything a mutation sent. Calls are counted to let tests prove purity
//! and fail-fast behavior.

#![allow(dead_code)]

use chrono::Utc;
use trellis_client::{ApiError, CreateIssueInput, IssueApi, UpdateIssueInput};
use trellis_core::types::{
    Issue, IssueId, Label, LabelId, Project, ProjectId, StateId, Team, TeamId, User, UserId,
    WorkflowState,
};

/// One stored issue with its mutation-visible fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredIssue {
    pub issue: Issue,
    pub description: Option<String>,
    pub label_ids: Vec<LabelId>,
    pub state_id: Option<StateId>,
    pub project_id: Option<ProjectId>,
    pub priority: Option<u8>,
    pub estimate: Option<f64>,
    pub assignee_id: Option<UserId>,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    pub teams: Vec<Team>,
    pub projects: Vec<Project>,
    pub labels: Vec<Label>,
    pub states: Vec<WorkflowState>,
    pub members: Vec<User>,
    pub issues: Vec<StoredIssue>,
    pub update_patches: Vec<UpdateIssueInput>,
    pub read_calls: u32,
    pub create_issue_calls: u32,
    pub update_issue_calls: u32,
    pub create_label_calls: u32,
    /// When set, `create_issue` fails once this many creates have happened.
    pub fail_create_after: Option<u32>,
    next_issue: u32,
    next_label: u32,
}

impl FakeApi {
    pub fn with_team(key: &str, name: &str) -> Self {
        let mut api = Self::default();
        api.teams.push(Team {
            id: TeamId::from(format!("team_{}", key.to_lowercase())),
            name: name.to_owned(),
            key: key.to_owned(),
        });
        api
    }

    pub fn team_id(&self) -> TeamId {
        self.teams[0].id.clone()
    }

    pub fn add_team(&mut self, key: &str, name: &str) {
        self.teams.push(Team {
            id: TeamId::from(format!("team_{}", key.to_lowercase())),
            name: name.to_owned(),
            key: key.to_owned(),
        });
    }

    pub fn add_project(&mut self, name: &str) -> ProjectId {
        let id = ProjectId::from(format!("proj_{}", self.projects.len() + 1));
        self.projects.push(Project {
            id: id.clone(),
            name: name.to_owned(),
        });
        id
    }

    pub fn add_state(&mut self, name: &str) -> StateId {
        let id = StateId::from(format!("st_{}", self.states.len() + 1));
        self.states.push(WorkflowState {
            id: id.clone(),
            name: name.to_owned(),
        });
        id
    }

    pub fn add_label(&mut self, name: &str) -> LabelId {
        self.next_label += 1;
        let id = LabelId::from(format!("lbl_{}", self.next_label));
        self.labels.push(Label {
            id: id.clone(),
            name: name.to_owned(),
        });
        id
    }

    pub fn add_member(&mut self, name: &str, display: Option<&str>, email: Option<&str>) -> UserId {
        let id = UserId::from(format!("usr_{}", self.members.len() + 1));
        self.members.push(User {
            id: id.clone(),
            name: name.to_owned(),
            display_name: display.map(str::to_owned),
            email: email.map(str::to_owned),
        });
        id
    }

    /// Seed a pre-existing issue, as if created in an earlier run.
    pub fn seed_issue(&mut self, title: &str, parent: Option<&IssueId>) -> IssueId {
        self.next_issue += 1;
        let number = self.next_issue;
        let key = self.teams[0].key.clone();
        let id = IssueId::from(format!("iss_{number}"));
        let issue = Issue {
            id: id.clone(),
            identifier: format!("{key}-{number}"),
            title: title.to_owned(),
            url: Some(format!("https://tracker.test/issue/{key}-{number}")),
            state: None,
            parent_id: parent.cloned(),
            team_id: self.team_id(),
            created_at: Utc::now(),
        };
        self.issues.push(StoredIssue {
            issue,
            description: None,
            label_ids: Vec::new(),
            state_id: None,
            project_id: None,
            priority: None,
            estimate: None,
            assignee_id: None,
        });
        id
    }

    pub fn find(&self, identifier: &str) -> &StoredIssue {
        self.issues
            .iter()
            .find(|s| s.issue.identifier == identifier)
            .unwrap_or_else(|| panic!("no stored issue {identifier}"))
    }

    pub fn find_by_title(&self, title: &str) -> &StoredIssue {
        self.issues
            .iter()
            .find(|s| s.issue.title == title)
            .unwrap_or_else(|| panic!("no stored issue titled '{title}'"))
    }

    pub fn mutation_calls(&self) -> u32 {
        self.create_issue_calls + self.update_issue_calls + self.create_label_calls
    }

    fn state_name(&self, id: Option<&StateId>) -> Option<String> {
        id.and_then(|sid| self.states.iter().find(|s| &s.id == sid))
            .map(|s| s.name.clone())
    }
}

impl IssueApi for FakeApi {
    fn teams(&mut self) -> Result<Vec<Team>, ApiError> {
        self.read_calls += 1;
        Ok(self.teams.clone())
    }

    fn projects(&mut self, _team: &TeamId) -> Result<Vec<Project>, ApiError> {
        self.read_calls += 1;
        Ok(self.projects.clone())
    }

    fn labels(&mut self, _team: &TeamId) -> Result<Vec<Label>, ApiError> {
        self.read_calls += 1;
        Ok(self.labels.clone())
    }

    fn create_label(&mut self, _team: &TeamId, name: &str) -> Result<Label, ApiError> {
        self.create_label_calls += 1;
        self.next_label += 1;
        let label = Label {
            id: LabelId::from(format!("lbl_{}", self.next_label)),
            name: name.to_owned(),
        };
        self.labels.push(label.clone());
        Ok(label)
    }

    fn workflow_states(&mut self, _team: &TeamId) -> Result<Vec<WorkflowState>, ApiError> {
        self.read_calls += 1;
        Ok(self.states.clone())
    }

    fn members(&mut self, _team: &TeamId) -> Result<Vec<User>, ApiError> {
        self.read_calls += 1;
        Ok(self.members.clone())
    }

    fn issues(&mut self, team: &TeamId) -> Result<Vec<Issue>, ApiError> {
        self.read_calls += 1;
        Ok(self
            .issues
            .iter()
            .filter(|s| &s.issue.team_id == team)
            .map(|s| s.issue.clone())
            .collect())
    }

    fn create_issue(&mut self, input: &CreateIssueInput) -> Result<Issue, ApiError> {
        if let Some(limit) = self.fail_create_after {
            if self.create_issue_calls >= limit {
                return Err(ApiError::Remote("issue quota exhausted".to_owned()));
            }
        }
        self.create_issue_calls += 1;
        self.next_issue += 1;
        let number = self.next_issue;
        let key = self
            .teams
            .iter()
            .find(|t| t.id == input.team_id)
            .map(|t| t.key.clone())
            .unwrap_or_else(|| "UNK".to_owned());
        let issue = Issue {
            id: IssueId::from(format!("iss_{number}")),
            identifier: format!("{key}-{number}"),
            title: input.title.clone(),
            url: Some(format!("https://tracker.test/issue/{key}-{number}")),
            state: self.state_name(input.state_id.as_ref()),
            parent_id: input.parent_id.clone(),
            team_id: input.team_id.clone(),
            created_at: Utc::now(),
        };
        self.issues.push(StoredIssue {
            issue: issue.clone(),
            description: input.description.clone(),
            label_ids: input.label_ids.clone(),
            state_id: input.state_id.clone(),
            project_id: input.project_id.clone(),
            priority: input.priority,
            estimate: input.estimate,
            assignee_id: input.assignee_id.clone(),
        });
        Ok(issue)
    }

    fn update_issue(
        &mut self,
        id: &IssueId,
        patch: &UpdateIssueInput,
    ) -> Result<Issue, ApiError> {
        self.update_issue_calls += 1;
        self.update_patches.push(patch.clone());
        let state_name = self.state_name(patch.state_id.as_ref());
        let stored = self
            .issues
            .iter_mut()
            .find(|s| &s.issue.id == id)
            .ok_or_else(|| ApiError::Remote(format!("issue {id} not found")))?;
        if let Some(description) = &patch.description {
            stored.description = Some(description.clone());
        }
        if let Some(label_ids) = &patch.label_ids {
            stored.label_ids = label_ids.clone();
        }
        if let Some(state_id) = &patch.state_id {
            stored.state_id = Some(state_id.clone());
            stored.issue.state = state_name;
        }
        if let Some(parent) = &patch.parent_id {
            stored.issue.parent_id = parent.clone();
        }
        Ok(stored.issue.clone())
    }
}
