//! Reference resolution: plan-document names to remote ids.
//!
//! Teams, projects, workflow states and members resolve once per run;
//! labels resolve per node through a per-run cache that creates missing
//! labels on demand. Every match here is case-insensitive and exact.

use std::collections::HashMap;

use trellis_client::{ApiError, IssueApi};
use trellis_core::plan::{Plan, PlanNode};
use trellis_core::types::{Label, LabelId, Project, StateId, Team, TeamId, User, WorkflowState};

use crate::error::ImportError;

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// Fetch teams and resolve a name-or-key reference, e.g. "Engineering" or
/// "eng". No match is fatal and lists the known teams.
pub fn resolve_team<A: IssueApi + ?Sized>(api: &mut A, name: &str) -> Result<Team, ImportError> {
    let teams = api.teams()?;
    match match_team(&teams, name) {
        Some(team) => Ok(team.clone()),
        None => Err(ImportError::TeamNotFound {
            name: name.to_owned(),
            known: teams.into_iter().map(|t| t.name).collect(),
        }),
    }
}

pub(crate) fn match_team<'a>(teams: &'a [Team], wanted: &str) -> Option<&'a Team> {
    let wanted = wanted.to_lowercase();
    teams
        .iter()
        .find(|t| t.name.to_lowercase() == wanted || t.key.to_lowercase() == wanted)
}

// ---------------------------------------------------------------------------
// Project, state, member
// ---------------------------------------------------------------------------

pub(crate) fn match_project<'a>(projects: &'a [Project], wanted: &str) -> Option<&'a Project> {
    let wanted = wanted.to_lowercase();
    projects.iter().find(|p| p.name.to_lowercase() == wanted)
}

pub(crate) fn match_state<'a>(
    states: &'a [WorkflowState],
    wanted: &str,
) -> Option<&'a WorkflowState> {
    let wanted = wanted.to_lowercase();
    states.iter().find(|s| s.name.to_lowercase() == wanted)
}

/// A member reference matches on email, display name, or full name.
pub(crate) fn match_member<'a>(members: &'a [User], reference: &str) -> Option<&'a User> {
    let wanted = reference.to_lowercase();
    members.iter().find(|m| {
        m.email
            .as_deref()
            .map(|e| e.to_lowercase() == wanted)
            .unwrap_or(false)
            || m.display_name
                .as_deref()
                .map(|d| d.to_lowercase() == wanted)
                .unwrap_or(false)
            || m.name.to_lowercase() == wanted
    })
}

/// A node's effective status name: its own, else the plan default.
pub(crate) fn effective_status<'a>(node: &'a PlanNode, plan: &'a Plan) -> Option<&'a str> {
    node.status.as_deref().or(plan.default_status.as_deref())
}

/// Resolve an effective status name to a state id. Unresolvable names are
/// fatal in dry-run too: a plan that names an unknown status is wrong, not
/// pending.
pub(crate) fn resolve_status(
    states: &[WorkflowState],
    name: &str,
    team: &str,
) -> Result<StateId, ImportError> {
    match match_state(states, name) {
        Some(state) => Ok(state.id.clone()),
        None => Err(ImportError::StatusNotFound {
            name: name.to_owned(),
            team: team.to_owned(),
            valid: states.iter().map(|s| s.name.clone()).collect(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Label cache
// ---------------------------------------------------------------------------

/// Per-run label cache keyed by lowercased name.
///
/// Seeded from the initial fetch; a miss creates the label remotely and
/// caches the new id, so each distinct name costs at most one
/// `create_label` per run no matter how many nodes use it.
#[derive(Debug, Default)]
pub struct LabelCache {
    ids: HashMap<String, LabelId>,
}

impl LabelCache {
    pub fn seed(labels: Vec<Label>) -> Self {
        let mut ids = HashMap::new();
        for label in labels {
            ids.entry(label.name.to_lowercase()).or_insert(label.id);
        }
        Self { ids }
    }

    /// Resolve a node's label names to ids, creating missing labels unless
    /// `dry_run`. In dry-run a missing label yields no id and no call; the
    /// returned list may be shorter than `names`.
    pub fn resolve<A: IssueApi + ?Sized>(
        &mut self,
        api: &mut A,
        team: &TeamId,
        names: &[String],
        dry_run: bool,
    ) -> Result<Vec<LabelId>, ApiError> {
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let key = name.to_lowercase();
            if let Some(id) = self.ids.get(&key) {
                resolved.push(id.clone());
                continue;
            }
            if dry_run {
                tracing::warn!("[dry-run] would create label: {name}");
                continue;
            }
            let label = api.create_label(team, name)?;
            tracing::info!("created label '{}'", label.name);
            self.ids.insert(key, label.id.clone());
            resolved.push(label.id);
        }
        Ok(resolved)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
