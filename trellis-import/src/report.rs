//! Run report: what a reconciliation run did, for humans and machines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trellis_core::types::Issue;

/// One created, updated or skipped issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub identifier: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Identifier of the effective parent, when the issue is nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl ReportEntry {
    pub(crate) fn for_issue(issue: &Issue, parent: Option<String>) -> Self {
        Self {
            identifier: issue.identifier.clone(),
            title: issue.title.clone(),
            url: issue.url.clone(),
            parent,
        }
    }
}

/// Aggregated outcome of one run. Serializes to JSON for `--json` output;
/// entry order follows the pre-order walk of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub created: Vec<ReportEntry>,
    pub updated: Vec<ReportEntry>,
    pub skipped: Vec<ReportEntry>,
    pub warnings: Vec<String>,
    pub dry_run: bool,
    pub finished_at: DateTime<Utc>,
}

impl ImportReport {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            created: Vec::new(),
            updated: Vec::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
            dry_run,
            finished_at: Utc::now(),
        }
    }

    /// Number of plan nodes the run processed.
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.skipped.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_all_entry_lists() {
        let mut report = ImportReport::new(false);
        report.created.push(ReportEntry {
            identifier: "ENG-1".to_owned(),
            title: "a".to_owned(),
            url: None,
            parent: None,
        });
        report.skipped.push(ReportEntry {
            identifier: "ENG-2".to_owned(),
            title: "b".to_owned(),
            url: None,
            parent: Some("ENG-1".to_owned()),
        });
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn json_omits_absent_url_and_parent() {
        let entry = ReportEntry {
            identifier: "ENG-1".to_owned(),
            title: "a".to_owned(),
            url: None,
            parent: None,
        };
        let json = serde_json::to_string(&entry).expect("serialize");
        assert!(!json.contains("url"));
        assert!(!json.contains("parent"));
    }

    #[test]
    fn report_roundtrips_through_json() {
        let mut report = ImportReport::new(true);
        report.warnings.push("project 'X' not found".to_owned());
        let json = serde_json::to_string(&report).expect("serialize");
        let back: ImportReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(report, back);
        assert!(back.dry_run);
    }
}
