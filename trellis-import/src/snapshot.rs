//! Owned index of a team's existing issues, kept current during a run.
//!
//! Matching is two-tier: an identifier reference matches case-insensitively
//! across the whole team regardless of nesting; a bare title matches
//! case-insensitively only under the same effective parent. After every
//! commitment the caller re-records the issue here, so later nodes in the
//! same run observe earlier creates, updates and dry-run placeholders alike.

use std::collections::HashMap;

use trellis_core::types::{Issue, IssueId};

/// Key for title matching: effective parent id plus lowercased title.
type TitleKey = (Option<IssueId>, String);

/// In-memory view of the team's issue tree.
#[derive(Debug, Default)]
pub struct Snapshot {
    issues: HashMap<IssueId, Issue>,
    by_identifier: HashMap<String, IssueId>,
    by_parent_title: HashMap<TitleKey, IssueId>,
}

impl Snapshot {
    /// Index a fetched issue list. Duplicate (parent, title) keys keep the
    /// first issue seen, so repeated runs pick the same match.
    pub fn build(fetched: Vec<Issue>) -> Self {
        let mut snapshot = Self::default();
        for issue in fetched {
            snapshot
                .by_identifier
                .entry(issue.identifier.to_lowercase())
                .or_insert_with(|| issue.id.clone());
            snapshot
                .by_parent_title
                .entry(title_key(&issue))
                .or_insert_with(|| issue.id.clone());
            snapshot.issues.insert(issue.id.clone(), issue);
        }
        snapshot
    }

    /// First-tier match: by identifier, case-insensitive, parent ignored.
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&Issue> {
        self.by_identifier
            .get(&identifier.to_lowercase())
            .and_then(|id| self.issues.get(id))
    }

    /// Second-tier match: by title under one effective parent. Root nodes
    /// (`parent` = `None`) match only parentless issues.
    pub fn find_by_title(&self, parent: Option<&IssueId>, title: &str) -> Option<&Issue> {
        let key = (parent.cloned(), title.to_lowercase());
        self.by_parent_title
            .get(&key)
            .and_then(|id| self.issues.get(id))
    }

    pub fn get(&self, id: &IssueId) -> Option<&Issue> {
        self.issues.get(id)
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Insert or replace an issue after a commitment.
    ///
    /// Stale index keys from the previous version are dropped first. A key is
    /// only removed while it still points at this issue: when two issues
    /// share a (parent, title) key the first holds it, and re-recording the
    /// other must not evict the holder.
    pub fn record(&mut self, issue: Issue) {
        if let Some(prev) = self.issues.get(&issue.id) {
            let key = title_key(prev);
            if self.by_parent_title.get(&key) == Some(&prev.id) {
                self.by_parent_title.remove(&key);
            }
            let ident = prev.identifier.to_lowercase();
            if self.by_identifier.get(&ident) == Some(&prev.id) {
                self.by_identifier.remove(&ident);
            }
        }
        self.by_identifier
            .entry(issue.identifier.to_lowercase())
            .or_insert_with(|| issue.id.clone());
        self.by_parent_title
            .entry(title_key(&issue))
            .or_insert_with(|| issue.id.clone());
        self.issues.insert(issue.id.clone(), issue);
    }
}

fn title_key(issue: &Issue) -> TitleKey {
    (issue.parent_id.clone(), issue.title.to_lowercase())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
