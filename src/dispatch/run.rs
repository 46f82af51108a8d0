//! One dispatch run: select the top eligible issue, compose the
//! notification, deliver it to chat, then acknowledge in the tracker.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dispatch::{message, selector};
use crate::errors::TrackerError;
use crate::linear::LinearClient;
use crate::linear::models::{Issue, IssueRelations, WorkflowState};
use crate::linear::query::IssueFilter;
use crate::slack::SlackClient;

/// Marker written into the acknowledgment comment. Runs with the dedup
/// check enabled look for this exact substring.
pub const DISPATCH_MARKER: &str = "[handoff-dispatched]";

/// Workflow-state categories eligible for selection.
const ELIGIBLE_STATE_TYPES: &[&str] = &["unstarted", "started"];
const BACKLOG_STATE_TYPE: &str = "backlog";
const STARTED_STATE_TYPE: &str = "started";

/// Outcome of a single run.
#[derive(Debug)]
pub enum DispatchOutcome {
    Dispatched {
        identifier: String,
        title: String,
        priority: i32,
    },
    NoEligibleTask,
}

/// Wires the tracker and chat clients to the configuration and executes
/// the forward-only flow. One instance, one run.
pub struct Dispatcher {
    config: Config,
    tracker: LinearClient,
    chat: SlackClient,
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        let tracker = LinearClient::new(&config.linear_api_url, &config.linear_api_key);
        let chat = SlackClient::new(&config.slack_api_url, &config.slack_bot_token);
        Self {
            config,
            tracker,
            chat,
        }
    }

    fn filter(&self) -> IssueFilter {
        let state_types: Vec<&'static str> = if self.config.include_backlog {
            let mut types = vec![BACKLOG_STATE_TYPE];
            types.extend_from_slice(ELIGIBLE_STATE_TYPES);
            types
        } else {
            ELIGIBLE_STATE_TYPES.to_vec()
        };
        IssueFilter::new()
            .state_types(&state_types)
            .unassigned()
            .projects(&self.config.project_ids)
            .teams(&self.config.team_keys)
    }

    /// Query, optionally dedup-filter, sort, and pick the top issue, then
    /// resolve its project/team relations. Read-only.
    async fn select(&self) -> Result<Option<(Issue, IssueRelations)>> {
        let candidates = self
            .tracker
            .eligible_issues(&self.filter())
            .await
            .context("Failed to query eligible issues")?;
        debug!(count = candidates.len(), "fetched candidate issues");

        let candidates = if self.config.skip_dispatched {
            let before = candidates.len();
            let surviving =
                selector::without_dispatched(&self.tracker, candidates, DISPATCH_MARKER)
                    .await
                    .context("Failed to check candidate comment history")?;
            debug!(
                skipped = before - surviving.len(),
                "dropped already-dispatched candidates"
            );
            surviving
        } else {
            candidates
        };

        let Some(issue) = selector::select_top(candidates) else {
            return Ok(None);
        };
        let relations = self
            .tracker
            .issue_relations(&issue.id)
            .await
            .context("Failed to resolve issue relations")?;
        Ok(Some((issue, relations)))
    }

    /// Select and compose without posting or writing anything back.
    pub async fn preview(&self) -> Result<Option<String>> {
        let Some((issue, relations)) = self.select().await? else {
            return Ok(None);
        };
        Ok(Some(message::compose(
            &issue,
            &relations,
            &self.config.assistant_slack_id,
            self.config.message_style,
        )))
    }

    /// Execute one full run. Delivery must succeed before any tracker
    /// write happens.
    pub async fn run(&self) -> Result<DispatchOutcome> {
        let Some((issue, relations)) = self.select().await? else {
            info!("no eligible task");
            return Ok(DispatchOutcome::NoEligibleTask);
        };
        info!(
            identifier = %issue.identifier,
            priority = issue.priority,
            "selected issue"
        );

        let text = message::compose(
            &issue,
            &relations,
            &self.config.assistant_slack_id,
            self.config.message_style,
        );

        self.chat
            .post_message(&self.config.slack_channel_id, &text)
            .await
            .context("Failed to post dispatch message to chat")?;
        info!(channel = %self.config.slack_channel_id, "posted dispatch message");

        self.acknowledge(&issue, relations.team.as_ref().map(|team| team.id.as_str()))
            .await?;

        Ok(DispatchOutcome::Dispatched {
            identifier: issue.identifier,
            title: issue.title,
            priority: issue.priority,
        })
    }

    /// Mark the issue dispatched: best-effort state transition, then the
    /// marker comment. The comment is the durable don't-re-dispatch
    /// signal, so a failed transition never blocks it.
    async fn acknowledge(&self, issue: &Issue, team_id: Option<&str>) -> Result<()> {
        match team_id {
            Some(team_id) => match self.transition_to_started(issue, team_id).await {
                Ok(Some(state_name)) => {
                    info!(state = %state_name, "transitioned issue state")
                }
                Ok(None) => {
                    debug!("team has no started-category state; leaving state unchanged")
                }
                Err(error) => warn!(%error, "state transition failed; recording dispatch anyway"),
            },
            None => debug!("issue has no team; skipping state transition"),
        }

        let body = format!(
            "{} Sent to <@{}> in {} at {}",
            DISPATCH_MARKER,
            self.config.assistant_slack_id,
            self.config.slack_channel_id,
            Utc::now().to_rfc3339(),
        );
        self.tracker
            .create_comment(&issue.id, &body)
            .await
            .context("Failed to record dispatch comment")?;
        info!(identifier = %issue.identifier, "recorded dispatch comment");
        Ok(())
    }

    async fn transition_to_started(
        &self,
        issue: &Issue,
        team_id: &str,
    ) -> Result<Option<String>, TrackerError> {
        let states = self.tracker.team_states(team_id).await?;
        let Some(state) = pick_started_state(&states) else {
            return Ok(None);
        };
        self.tracker.update_issue_state(&issue.id, &state.id).await?;
        Ok(Some(state.name.clone()))
    }
}

/// Prefer a started-category state whose name mentions "progress", then
/// any started-category state.
fn pick_started_state(states: &[WorkflowState]) -> Option<&WorkflowState> {
    let started: Vec<&WorkflowState> = states
        .iter()
        .filter(|state| state.state_type == STARTED_STATE_TYPE)
        .collect();
    started
        .iter()
        .find(|state| state.name.to_lowercase().contains("progress"))
        .copied()
        .or_else(|| started.first().copied())
}
