use serde::Deserialize;

/// A tracker issue (subset of fields we care about).
///
/// `priority` is the tracker's ordinal: 0 = unset, 1 = most urgent,
/// 4 = least urgent. Related project/team are not part of the candidate
/// batch; they resolve lazily for the selected issue only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: i32,
    pub url: String,
    #[serde(default)]
    pub branch_name: Option<String>,
}

impl Issue {
    /// Sort key for selection: explicit priorities ascending, unset (0)
    /// mapped past them so it always sorts last.
    pub fn priority_sort_key(&self) -> i32 {
        if self.priority == 0 { 5 } else { self.priority }
    }
}

/// Human label for a priority ordinal.
pub fn priority_label(priority: i32) -> &'static str {
    match priority {
        1 => "urgent",
        2 => "high",
        3 => "medium",
        4 => "low",
        _ => "no priority",
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: String,
    pub key: String,
    pub name: String,
}

/// Lazily-resolved relations for a selected issue. Either side may be
/// absent and every use site checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueRelations {
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(default)]
    pub team: Option<Team>,
}

/// A workflow state of a team. `state_type` is the tracker-defined
/// category ("backlog", "unstarted", "started", ...), distinct from the
/// team-chosen display name.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub state_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub body: String,
}
