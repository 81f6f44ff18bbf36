//! Reconciliation executor: the depth-first walk over the plan tree.
//!
//! ## One run, in order
//!
//! 1. Validate the plan (no network yet).
//! 2. Resolve the team; resolve the project (absence is a warning).
//! 3. Fetch workflow states, seed the label cache, fetch members if any
//!    node names an assignee, snapshot the team's issues.
//! 4. Walk the tree pre-order: match each node, then create, update or
//!    skip it; the node's resolved id is the effective parent for its
//!    sub-issues.
//! 5. Stamp the report and return it.
//!
//! Execution is strictly sequential; the first remote error aborts the walk
//! and whatever was already committed stands.

use chrono::Utc;

use trellis_client::{CreateIssueInput, IssueApi, UpdateIssueInput};
use trellis_core::plan::{Plan, PlanNode};
use trellis_core::types::{Issue, IssueId, ProjectId, Team, User, UserId, WorkflowState};

use crate::error::ImportError;
use crate::report::{ImportReport, ReportEntry};
use crate::resolver::{self, LabelCache};
use crate::snapshot::Snapshot;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Flags for one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Report what would happen without calling any mutation.
    pub dry_run: bool,
    /// Patch matched issues instead of skipping them.
    pub update: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Reconcile a plan against the remote tracker behind `api`.
pub fn run<A: IssueApi + ?Sized>(
    api: &mut A,
    plan: &Plan,
    options: ImportOptions,
) -> Result<ImportReport, ImportError> {
    plan.validate()?;

    let team = resolver::resolve_team(api, &plan.team)?;
    tracing::debug!("resolved team '{}' -> {}", plan.team, team.id);

    let mut report = ImportReport::new(options.dry_run);

    let project_id = match plan.project.as_deref() {
        Some(wanted) => {
            let projects = api.projects(&team.id)?;
            match resolver::match_project(&projects, wanted) {
                Some(project) => Some(project.id.clone()),
                None => {
                    let warning = format!(
                        "project '{wanted}' not found; issues will be created without a project"
                    );
                    tracing::warn!("{warning}");
                    report.warnings.push(warning);
                    None
                }
            }
        }
        None => None,
    };

    let states = api.workflow_states(&team.id)?;
    let labels = LabelCache::seed(api.labels(&team.id)?);
    let members = if uses_assignees(&plan.issues) {
        api.members(&team.id)?
    } else {
        Vec::new()
    };
    let snapshot = Snapshot::build(api.issues(&team.id)?);
    tracing::debug!("snapshot holds {} existing issues", snapshot.len());

    let mut run = Run {
        api,
        plan,
        options,
        team,
        project_id,
        states,
        labels,
        members,
        snapshot,
        report,
        placeholder_seq: 0,
    };
    for node in &plan.issues {
        run.reconcile(node, None)?;
    }

    let mut report = run.report;
    report.finished_at = Utc::now();
    Ok(report)
}

fn uses_assignees(nodes: &[PlanNode]) -> bool {
    nodes
        .iter()
        .any(|n| n.assignee.is_some() || uses_assignees(&n.sub_issues))
}

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

struct Run<'a, A: ?Sized> {
    api: &'a mut A,
    plan: &'a Plan,
    options: ImportOptions,
    team: Team,
    project_id: Option<ProjectId>,
    states: Vec<WorkflowState>,
    labels: LabelCache,
    members: Vec<User>,
    snapshot: Snapshot,
    report: ImportReport,
    placeholder_seq: u32,
}

impl<A: IssueApi + ?Sized> Run<'_, A> {
    /// Reconcile one node, then its sub-issues under the resolved id.
    fn reconcile(&mut self, node: &PlanNode, parent: Option<&IssueId>) -> Result<(), ImportError> {
        let matched = self.match_node(node, parent).cloned();
        let resolved_id = match matched {
            Some(existing) if self.options.update => {
                self.update_existing(node, &existing, parent)?
            }
            Some(existing) => {
                tracing::debug!("skip: '{}' matches {}", node.title, existing.identifier);
                let entry = ReportEntry::for_issue(&existing, self.parent_identifier(&existing));
                self.report.skipped.push(entry);
                existing.id
            }
            None => self.create_missing(node, parent)?,
        };
        for child in &node.sub_issues {
            self.reconcile(child, Some(&resolved_id))?;
        }
        Ok(())
    }

    /// Two-tier match. An identifier reference is authoritative: it matches
    /// across the whole team, and when unmatched the node falls through to
    /// create, never to title matching.
    fn match_node(&self, node: &PlanNode, parent: Option<&IssueId>) -> Option<&Issue> {
        if let Some(identifier) = node.identifier.as_deref() {
            return self.snapshot.find_by_identifier(identifier);
        }
        self.snapshot.find_by_title(parent, &node.title)
    }

    fn update_existing(
        &mut self,
        node: &PlanNode,
        existing: &Issue,
        parent: Option<&IssueId>,
    ) -> Result<IssueId, ImportError> {
        let mut patch = UpdateIssueInput::default();
        if node.description.is_some() {
            patch.description = node.description.clone();
        }
        if !node.labels.is_empty() {
            let ids = self.labels.resolve(
                self.api,
                &self.team.id,
                &node.labels,
                self.options.dry_run,
            )?;
            patch.label_ids = Some(ids);
        }
        if let Some(name) = resolver::effective_status(node, self.plan) {
            patch.state_id = Some(resolver::resolve_status(&self.states, name, &self.team.name)?);
        }
        // Only the parent is change-detected; a reparent-to-root becomes an
        // explicit null on the wire.
        if existing.parent_id.as_ref() != parent {
            patch.parent_id = Some(parent.cloned());
        }

        if self.options.dry_run {
            tracing::info!("[dry-run] would update: {}", existing.identifier);
            let mut simulated = existing.clone();
            if let Some(new_parent) = &patch.parent_id {
                simulated.parent_id = new_parent.clone();
            }
            let entry = ReportEntry::for_issue(&simulated, self.parent_identifier(&simulated));
            self.report.updated.push(entry);
            let id = simulated.id.clone();
            self.snapshot.record(simulated);
            return Ok(id);
        }

        let updated = self.api.update_issue(&existing.id, &patch)?;
        tracing::info!("updated: {} '{}'", updated.identifier, updated.title);
        let entry = ReportEntry::for_issue(&updated, self.parent_identifier(&updated));
        self.report.updated.push(entry);
        let id = updated.id.clone();
        self.snapshot.record(updated);
        Ok(id)
    }

    fn create_missing(
        &mut self,
        node: &PlanNode,
        parent: Option<&IssueId>,
    ) -> Result<IssueId, ImportError> {
        let label_ids = self.labels.resolve(
            self.api,
            &self.team.id,
            &node.labels,
            self.options.dry_run,
        )?;
        let state_id = match resolver::effective_status(node, self.plan) {
            Some(name) => Some(resolver::resolve_status(&self.states, name, &self.team.name)?),
            None => None,
        };
        let assignee_id = self.resolve_assignee(node);

        if self.options.dry_run {
            tracing::info!("[dry-run] would create: '{}'", node.title);
            let placeholder = self.placeholder(node, parent);
            let entry = ReportEntry::for_issue(&placeholder, self.parent_identifier(&placeholder));
            self.report.created.push(entry);
            let id = placeholder.id.clone();
            self.snapshot.record(placeholder);
            return Ok(id);
        }

        let input = CreateIssueInput {
            title: node.title.clone(),
            team_id: self.team.id.clone(),
            project_id: self.project_id.clone(),
            description: node.description.clone(),
            label_ids,
            state_id,
            parent_id: parent.cloned(),
            priority: node.priority,
            estimate: node.estimate,
            assignee_id,
        };
        let created = self.api.create_issue(&input)?;
        tracing::info!("created: {} '{}'", created.identifier, created.title);
        let entry = ReportEntry::for_issue(&created, self.parent_identifier(&created));
        self.report.created.push(entry);
        let id = created.id.clone();
        self.snapshot.record(created);
        Ok(id)
    }

    fn resolve_assignee(&mut self, node: &PlanNode) -> Option<UserId> {
        let reference = node.assignee.as_deref()?;
        match resolver::match_member(&self.members, reference) {
            Some(member) => Some(member.id.clone()),
            None => {
                let warning = format!(
                    "assignee '{reference}' not found; '{}' will be unassigned",
                    node.title
                );
                tracing::warn!("{warning}");
                self.report.warnings.push(warning);
                None
            }
        }
    }

    /// Synthetic stand-in for a dry-run create. Recorded into the snapshot
    /// so sub-issues recurse under it and in-document duplicates are caught
    /// exactly as in a real run.
    fn placeholder(&mut self, node: &PlanNode, parent: Option<&IssueId>) -> Issue {
        self.placeholder_seq += 1;
        let seq = self.placeholder_seq;
        Issue {
            id: IssueId(format!("dry-run-{seq}")),
            identifier: format!("{}-DRY{seq}", self.team.key),
            title: node.title.clone(),
            url: None,
            state: resolver::effective_status(node, self.plan).map(str::to_owned),
            parent_id: parent.cloned(),
            team_id: self.team.id.clone(),
            created_at: Utc::now(),
        }
    }

    fn parent_identifier(&self, issue: &Issue) -> Option<String> {
        issue
            .parent_id
            .as_ref()
            .and_then(|id| self.snapshot.get(id))
            .map(|p| p.identifier.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignee_scan_reaches_nested_nodes() {
        let plan: Plan = serde_json::from_str(
            r#"{ "team": "Eng", "issues": [
                { "title": "a", "subIssues": [
                    { "title": "b", "subIssues": [{ "title": "c", "assignee": "ada" }] }
                ] }
            ] }"#,
        )
        .expect("parse");
        assert!(uses_assignees(&plan.issues));
    }

    #[test]
    fn assignee_scan_is_false_without_any() {
        let plan: Plan = serde_json::from_str(
            r#"{ "team": "Eng", "issues": [{ "title": "a", "subIssues": [{ "title": "b" }] }] }"#,
        )
        .expect("parse");
        assert!(!uses_assignees(&plan.issues));
    }
}
