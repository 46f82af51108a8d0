//! Typed builder for the tracker-side issue filter.
//!
//! Models exactly the predicates the dispatcher uses — workflow-state
//! categories, assignee absence, the unset-priority exclusion, and the
//! project/team allow-lists — and serializes them to the GraphQL
//! `IssueFilter` input shape the tracker expects.

use std::collections::BTreeSet;

use serde_json::{Value, json};

#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    state_types: Vec<&'static str>,
    unassigned_only: bool,
    exclude_unset_priority: bool,
    project_ids: BTreeSet<String>,
    team_keys: BTreeSet<String>,
}

impl IssueFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to issues whose workflow state belongs to one of the
    /// given categories.
    pub fn state_types(mut self, types: &[&'static str]) -> Self {
        self.state_types = types.to_vec();
        self
    }

    /// Restrict to issues with no assignee.
    pub fn unassigned(mut self) -> Self {
        self.unassigned_only = true;
        self
    }

    /// Drop issues whose priority ordinal is 0 (unset) at the tracker,
    /// instead of fetching them and sorting them last.
    pub fn exclude_unset_priority(mut self) -> Self {
        self.exclude_unset_priority = true;
        self
    }

    /// Apply a project-ID allow-list. An empty set applies no filter.
    pub fn projects(mut self, ids: &BTreeSet<String>) -> Self {
        self.project_ids = ids.clone();
        self
    }

    /// Apply a team-key allow-list. An empty set applies no filter.
    pub fn teams(mut self, keys: &BTreeSet<String>) -> Self {
        self.team_keys = keys.clone();
        self
    }

    /// Serialize to the tracker's `IssueFilter` GraphQL variable form.
    pub fn to_variables(&self) -> Value {
        let mut filter = serde_json::Map::new();
        if !self.state_types.is_empty() {
            filter.insert(
                "state".to_string(),
                json!({ "type": { "in": self.state_types } }),
            );
        }
        if self.unassigned_only {
            filter.insert("assignee".to_string(), json!({ "null": true }));
        }
        if self.exclude_unset_priority {
            filter.insert("priority".to_string(), json!({ "neq": 0 }));
        }
        if !self.project_ids.is_empty() {
            filter.insert(
                "project".to_string(),
                json!({ "id": { "in": self.project_ids } }),
            );
        }
        if !self.team_keys.is_empty() {
            filter.insert(
                "team".to_string(),
                json!({ "key": { "in": self.team_keys } }),
            );
        }
        Value::Object(filter)
    }
}
