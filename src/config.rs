use std::collections::BTreeSet;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Default endpoints for the external services. Overridable through the
/// environment so tests can point the clients at a local mock server.
pub const DEFAULT_LINEAR_API_URL: &str = "https://api.linear.app/graphql";
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

/// Which tail the composed message carries: the issue URL, or an
/// instruction naming the issue's derived git branch. Never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageStyle {
    #[default]
    IssueUrl,
    BranchName,
}

impl MessageStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IssueUrl => "url",
            Self::BranchName => "branch",
        }
    }
}

impl FromStr for MessageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(Self::IssueUrl),
            "branch" => Ok(Self::BranchName),
            _ => Err(format!("expected 'url' or 'branch', got '{}'", s)),
        }
    }
}

/// Runtime configuration for a dispatch run.
///
/// All values come from the environment (after dotenv loading). Validation
/// happens once, at construction; the rest of the program only ever sees
/// typed fields.
#[derive(Debug, Clone)]
pub struct Config {
    pub linear_api_key: String,
    pub slack_bot_token: String,
    pub slack_channel_id: String,
    pub assistant_slack_id: String,
    /// Project-ID allow-list; empty means no project filter.
    pub project_ids: BTreeSet<String>,
    /// Team-key allow-list; empty means no team filter.
    pub team_keys: BTreeSet<String>,
    /// Also consider backlog-category issues, not just unstarted/started.
    pub include_backlog: bool,
    /// Re-check each candidate's comment history and skip issues already
    /// carrying the dispatch marker.
    pub skip_dispatched: bool,
    pub message_style: MessageStyle,
    pub linear_api_url: String,
    pub slack_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup. Split out from
    /// `from_env` so tests don't have to mutate process environment.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| -> String {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => value.trim().to_string(),
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };

        let linear_api_key = required("LINEAR_API_KEY");
        let slack_bot_token = required("SLACK_BOT_TOKEN");
        let slack_channel_id = required("SLACK_CHANNEL_ID");
        let assistant_slack_id = required("ASSISTANT_SLACK_ID");

        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        let message_style = match lookup("HANDOFF_MESSAGE_STYLE") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "HANDOFF_MESSAGE_STYLE",
                    message,
                })?,
            _ => MessageStyle::default(),
        };

        Ok(Self {
            linear_api_key,
            slack_bot_token,
            slack_channel_id,
            assistant_slack_id,
            project_ids: parse_list(lookup("LINEAR_PROJECT_IDS")),
            team_keys: parse_list(lookup("LINEAR_TEAM_KEYS")),
            include_backlog: parse_flag(lookup("HANDOFF_INCLUDE_BACKLOG")),
            skip_dispatched: parse_flag(lookup("HANDOFF_SKIP_DISPATCHED")),
            message_style,
            linear_api_url: lookup("LINEAR_API_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LINEAR_API_URL.to_string()),
            slack_api_url: lookup("SLACK_API_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string()),
        })
    }
}

/// Parse a comma-delimited setting into a set of non-empty trimmed tokens.
/// Absent or empty input means "no filter".
fn parse_list(raw: Option<String>) -> BTreeSet<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_flag(raw: Option<String>) -> bool {
    matches!(
        raw.as_deref().map(str::trim).map(str::to_lowercase).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}
