//! Plan documents: the declared tree of issues to reconcile against a team.
//!
//! A plan is a JSON or YAML file with a top-level team, an optional project
//! and default status, and a tree of issue nodes. Loading dispatches on the
//! file extension; validation walks the tree before any network traffic so
//! a malformed plan never costs an API call.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// Root of a plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Team name or key the whole plan targets. Required; validated non-empty.
    #[serde(default)]
    pub team: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Status applied to nodes that do not set their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_status: Option<String>,
    #[serde(default)]
    pub issues: Vec<PlanNode>,
}

/// One desired issue, possibly with nested sub-issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanNode {
    pub title: String,
    /// Existing issue identifier (e.g. `ENG-42`) to match and update in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Priority in the remote's 0..=4 scale (0 = none, 1 = urgent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_issues: Vec<PlanNode>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Plan {
    /// Load a plan document from disk, dispatching on the file extension.
    ///
    /// `.json` parses as JSON; `.yaml` / `.yml` parse as YAML (extension
    /// compared case-insensitively). Anything else is
    /// [`PlanError::UnsupportedFormat`].
    pub fn load(path: &Path) -> Result<Plan, PlanError> {
        let raw = fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => serde_json::from_str(&raw).map_err(|source| PlanError::Json {
                path: path.to_path_buf(),
                source,
            }),
            "yaml" | "yml" => serde_yaml::from_str(&raw).map_err(|source| PlanError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
            _ => Err(PlanError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    /// Check structural invariants. Runs before any resolution or network
    /// traffic, so errors here cost nothing remote.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.team.trim().is_empty() {
            return Err(PlanError::MissingTeam);
        }
        if self.issues.is_empty() {
            return Err(PlanError::NoIssues);
        }
        for (idx, node) in self.issues.iter().enumerate() {
            validate_node(node, &format!("issues[{idx}]"))?;
        }
        Ok(())
    }

    /// Total number of issue nodes, including all nested sub-issues.
    pub fn node_count(&self) -> usize {
        count_nodes(&self.issues)
    }
}

// ---------------------------------------------------------------------------
// Validation walk
// ---------------------------------------------------------------------------

/// Positions in error messages use the document's own field names, so an
/// error at `issues[1].subIssues[0]` points at the literal JSON/YAML path.
fn validate_node(node: &PlanNode, at: &str) -> Result<(), PlanError> {
    if node.title.trim().is_empty() {
        return Err(PlanError::EmptyTitle { at: at.to_owned() });
    }
    if let Some(value) = node.priority {
        if value > 4 {
            return Err(PlanError::PriorityOutOfRange {
                at: at.to_owned(),
                value,
            });
        }
    }
    for (idx, child) in node.sub_issues.iter().enumerate() {
        validate_node(child, &format!("{at}.subIssues[{idx}]"))?;
    }
    Ok(())
}

fn count_nodes(nodes: &[PlanNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.sub_issues)).sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn node(title: &str) -> PlanNode {
        PlanNode {
            title: title.to_owned(),
            identifier: None,
            description: None,
            status: None,
            priority: None,
            estimate: None,
            labels: vec![],
            assignee: None,
            sub_issues: vec![],
        }
    }

    fn plan_with(issues: Vec<PlanNode>) -> Plan {
        Plan {
            team: "Engineering".to_owned(),
            project: None,
            default_status: None,
            issues,
        }
    }

    #[test]
    fn parses_camel_case_fields() {
        let json = r#"{
            "team": "Engineering",
            "defaultStatus": "Backlog",
            "issues": [
                {
                    "title": "Parent",
                    "subIssues": [{ "title": "Child", "priority": 2 }]
                }
            ]
        }"#;
        let plan: Plan = serde_json::from_str(json).expect("parse");
        assert_eq!(plan.default_status.as_deref(), Some("Backlog"));
        assert_eq!(plan.issues[0].sub_issues[0].title, "Child");
        assert_eq!(plan.issues[0].sub_issues[0].priority, Some(2));
    }

    #[test]
    fn missing_team_field_validates_as_missing_team() {
        let json = r#"{ "issues": [{ "title": "A" }] }"#;
        let plan: Plan = serde_json::from_str(json).expect("parse");
        assert!(matches!(plan.validate(), Err(PlanError::MissingTeam)));
    }

    #[test]
    fn whitespace_team_is_missing_team() {
        let mut plan = plan_with(vec![node("A")]);
        plan.team = "   ".to_owned();
        assert!(matches!(plan.validate(), Err(PlanError::MissingTeam)));
    }

    #[test]
    fn empty_issues_rejected() {
        let plan = plan_with(vec![]);
        assert!(matches!(plan.validate(), Err(PlanError::NoIssues)));
    }

    #[test]
    fn empty_title_reports_position() {
        let mut parent = node("Parent");
        parent.sub_issues = vec![node("ok"), node("   ")];
        let plan = plan_with(vec![node("First"), parent]);
        match plan.validate() {
            Err(PlanError::EmptyTitle { at }) => assert_eq!(at, "issues[1].subIssues[1]"),
            other => panic!("expected EmptyTitle, got {other:?}"),
        }
    }

    #[test]
    fn priority_out_of_range_reports_position_and_value() {
        let mut child = node("Child");
        child.priority = Some(9);
        let mut parent = node("Parent");
        parent.sub_issues = vec![child];
        let plan = plan_with(vec![parent]);
        match plan.validate() {
            Err(PlanError::PriorityOutOfRange { at, value }) => {
                assert_eq!(at, "issues[0].subIssues[0]");
                assert_eq!(value, 9);
            }
            other => panic!("expected PriorityOutOfRange, got {other:?}"),
        }
    }

    #[rstest]
    #[case(0, true)]
    #[case(1, true)]
    #[case(4, true)]
    #[case(5, false)]
    #[case(255, false)]
    fn priority_range(#[case] value: u8, #[case] accepted: bool) {
        let mut n = node("n");
        n.priority = Some(value);
        let plan = plan_with(vec![n]);
        assert_eq!(plan.validate().is_ok(), accepted);
    }

    #[test]
    fn load_dispatches_on_yml_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("plan.yml");
        fs::write(&path, "team: Eng\nissues:\n  - title: A\n").expect("write");
        let plan = Plan::load(&path).expect("load");
        assert_eq!(plan.issues.len(), 1);
    }

    #[test]
    fn node_count_includes_descendants() {
        let mut parent = node("Parent");
        let mut mid = node("Mid");
        mid.sub_issues = vec![node("Leaf")];
        parent.sub_issues = vec![mid, node("Other")];
        let plan = plan_with(vec![parent, node("Second")]);
        assert_eq!(plan.node_count(), 5);
    }
}
