//! Composes the chat notification for a selected issue.
//!
//! Pure formatting, no network access: the same issue and configuration
//! always produce a byte-identical message.

use crate::config::MessageStyle;
use crate::linear::models::{Issue, IssueRelations};

/// Description caps per style. The cap keeps every composed message well
/// under the chat service's message-size limit.
const URL_STYLE_DESCRIPTION_MAX: usize = 500;
const BRANCH_STYLE_DESCRIPTION_MAX: usize = 2000;

const TRUNCATION_MARKER: &str = "...";

/// Render the dispatch message: an at-mention of the assistant, the issue
/// headline with team/project qualifiers when present, the (bounded)
/// description, and a style-specific tail — the issue URL, or a branch
/// naming instruction. Never both.
pub fn compose(
    issue: &Issue,
    relations: &IssueRelations,
    assistant_id: &str,
    style: MessageStyle,
) -> String {
    let mut message = format!("<@{}>", assistant_id);
    if let Some(team) = &relations.team {
        message.push_str(&format!(" [{}]", team.key));
    }
    message.push_str(&format!(" work on: {} ({})", issue.title, issue.identifier));
    if let Some(project) = &relations.project {
        message.push_str(&format!(" in project \"{}\"", project.name));
    }

    let description_max = match style {
        MessageStyle::IssueUrl => URL_STYLE_DESCRIPTION_MAX,
        MessageStyle::BranchName => BRANCH_STYLE_DESCRIPTION_MAX,
    };
    if let Some(description) = &issue.description
        && !description.is_empty()
    {
        message.push_str("\n\n");
        message.push_str(&truncate(description, description_max));
    }

    match style {
        MessageStyle::IssueUrl => {
            message.push_str("\n\n");
            message.push_str(&issue.url);
        }
        MessageStyle::BranchName => {
            // No URL in this style; omit the tail entirely when the
            // tracker derived no branch name.
            if let Some(branch) = &issue.branch_name {
                message.push_str(&format!(
                    "\n\nName any git branch you create for this task exactly: {}",
                    branch
                ));
            }
        }
    }

    message
}

/// Bound `text` to `max` characters (not bytes), appending the ellipsis
/// marker exactly when something was cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
