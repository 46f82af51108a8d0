//! Tracker GraphQL client (subset of operations the dispatcher needs).

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::models::{Comment, Issue, IssueRelations, WorkflowState};
use super::query::IssueFilter;
use crate::errors::TrackerError;

/// Page size for the candidate query. The dispatcher reads one page only;
/// with more eligible issues than this, later pages are not considered.
pub const CANDIDATE_PAGE_SIZE: usize = 50;

const CANDIDATES_QUERY: &str = "\
query CandidateIssues($filter: IssueFilter, $first: Int) {
  issues(filter: $filter, first: $first) {
    nodes { id identifier title description priority url branchName }
  }
}";

const RELATIONS_QUERY: &str = "\
query IssueRelations($id: String!) {
  issue(id: $id) {
    project { name }
    team { id key name }
  }
}";

const COMMENTS_QUERY: &str = "\
query IssueComments($id: String!) {
  issue(id: $id) {
    comments { nodes { body } }
  }
}";

const TEAM_STATES_QUERY: &str = "\
query TeamWorkflowStates($id: String!) {
  team(id: $id) {
    states { nodes { id name type } }
  }
}";

const UPDATE_STATE_MUTATION: &str = "\
mutation IssueStateUpdate($id: String!, $stateId: String!) {
  issueUpdate(id: $id, input: { stateId: $stateId }) { success }
}";

const CREATE_COMMENT_MUTATION: &str = "\
mutation IssueCommentCreate($issueId: String!, $body: String!) {
  commentCreate(input: { issueId: $issueId, body: $body }) { success }
}";

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct IssuesData {
    issues: Nodes<Issue>,
}

#[derive(Debug, Deserialize)]
struct IssueData<T> {
    issue: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CommentsIssue {
    comments: Nodes<Comment>,
}

#[derive(Debug, Deserialize)]
struct TeamData {
    team: Option<TeamStates>,
}

#[derive(Debug, Deserialize)]
struct TeamStates {
    states: Nodes<WorkflowState>,
}

#[derive(Debug, Deserialize)]
struct IssueUpdateData {
    #[serde(rename = "issueUpdate")]
    issue_update: MutationResult,
}

#[derive(Debug, Deserialize)]
struct CommentCreateData {
    #[serde(rename = "commentCreate")]
    comment_create: MutationResult,
}

#[derive(Debug, Deserialize)]
struct MutationResult {
    success: bool,
}

#[derive(Clone)]
pub struct LinearClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl LinearClient {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, TrackerError> {
        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?
            .json::<GraphQlResponse<T>>()
            .await?;

        if !response.errors.is_empty() {
            let joined = response
                .errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(TrackerError::Api(joined));
        }
        response.data.ok_or(TrackerError::MissingData("data"))
    }

    /// Fetch the first page of issues matching the filter, in whatever
    /// order the tracker returns them.
    pub async fn eligible_issues(
        &self,
        filter: &IssueFilter,
    ) -> Result<Vec<Issue>, TrackerError> {
        let data: IssuesData = self
            .execute(
                CANDIDATES_QUERY,
                json!({ "filter": filter.to_variables(), "first": CANDIDATE_PAGE_SIZE }),
            )
            .await?;
        Ok(data.issues.nodes)
    }

    /// Resolve the project and team of one issue. Either relation may be
    /// absent in the result.
    pub async fn issue_relations(
        &self,
        issue_id: &str,
    ) -> Result<IssueRelations, TrackerError> {
        let data: IssueData<IssueRelations> = self
            .execute(RELATIONS_QUERY, json!({ "id": issue_id }))
            .await?;
        data.issue.ok_or(TrackerError::MissingData("issue"))
    }

    pub async fn issue_comments(
        &self,
        issue_id: &str,
    ) -> Result<Vec<Comment>, TrackerError> {
        let data: IssueData<CommentsIssue> = self
            .execute(COMMENTS_QUERY, json!({ "id": issue_id }))
            .await?;
        let issue = data.issue.ok_or(TrackerError::MissingData("issue"))?;
        Ok(issue.comments.nodes)
    }

    pub async fn team_states(
        &self,
        team_id: &str,
    ) -> Result<Vec<WorkflowState>, TrackerError> {
        let data: TeamData = self
            .execute(TEAM_STATES_QUERY, json!({ "id": team_id }))
            .await?;
        let team = data.team.ok_or(TrackerError::MissingData("team"))?;
        Ok(team.states.nodes)
    }

    pub async fn update_issue_state(
        &self,
        issue_id: &str,
        state_id: &str,
    ) -> Result<(), TrackerError> {
        let data: IssueUpdateData = self
            .execute(
                UPDATE_STATE_MUTATION,
                json!({ "id": issue_id, "stateId": state_id }),
            )
            .await?;
        if !data.issue_update.success {
            return Err(TrackerError::Api("issueUpdate reported failure".to_string()));
        }
        Ok(())
    }

    pub async fn create_comment(
        &self,
        issue_id: &str,
        body: &str,
    ) -> Result<(), TrackerError> {
        let data: CommentCreateData = self
            .execute(
                CREATE_COMMENT_MUTATION,
                json!({ "issueId": issue_id, "body": body }),
            )
            .await?;
        if !data.comment_create.success {
            return Err(TrackerError::Api("commentCreate reported failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> LinearClient {
        LinearClient::new(&server.url("/graphql"), "lin_api_test")
    }

    #[tokio::test]
    async fn eligible_issues_parses_nodes_and_sends_auth_header() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("Authorization", "lin_api_test")
                .body_includes("CandidateIssues");
            then.status(200).json_body(json!({
                "data": { "issues": { "nodes": [{
                    "id": "uuid-1",
                    "identifier": "ENG-1",
                    "title": "First",
                    "description": null,
                    "priority": 3,
                    "url": "https://linear.app/x/ENG-1"
                }] } }
            }));
        });

        let issues = client_for(&server)
            .eligible_issues(&IssueFilter::new().unassigned())
            .await
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].identifier, "ENG-1");
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn graphql_errors_surface_as_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({
                "errors": [
                    { "message": "rate limited" },
                    { "message": "try later" }
                ]
            }));
        });

        let err = client_for(&server)
            .eligible_issues(&IssueFilter::new())
            .await
            .unwrap_err();
        match err {
            TrackerError::Api(message) => {
                assert!(message.contains("rate limited"));
                assert!(message.contains("try later"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn issue_relations_tolerates_absent_project_and_team() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql").body_includes("IssueRelations");
            then.status(200).json_body(json!({
                "data": { "issue": { "project": null, "team": null } }
            }));
        });

        let relations = client_for(&server).issue_relations("uuid-1").await.unwrap();
        assert!(relations.project.is_none());
        assert!(relations.team.is_none());
    }

    #[tokio::test]
    async fn team_states_parses_state_categories() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql").body_includes("TeamWorkflowStates");
            then.status(200).json_body(json!({
                "data": { "team": { "states": { "nodes": [
                    { "id": "s1", "name": "Todo", "type": "unstarted" },
                    { "id": "s2", "name": "In Progress", "type": "started" }
                ] } } }
            }));
        });

        let states = client_for(&server).team_states("team-1").await.unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[1].state_type, "started");
    }

    #[tokio::test]
    async fn unsuccessful_mutation_is_an_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql").body_includes("IssueStateUpdate");
            then.status(200).json_body(json!({
                "data": { "issueUpdate": { "success": false } }
            }));
        });

        let err = client_for(&server)
            .update_issue_state("uuid-1", "s2")
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Api(_)));
    }

    #[tokio::test]
    async fn create_comment_sends_body_in_variables() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_includes("IssueCommentCreate")
                .body_includes("dispatched for review");
            then.status(200).json_body(json!({
                "data": { "commentCreate": { "success": true } }
            }));
        });

        client_for(&server)
            .create_comment("uuid-1", "dispatched for review")
            .await
            .unwrap();
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn http_error_status_maps_to_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(500);
        });

        let err = client_for(&server)
            .eligible_issues(&IssueFilter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Http(_)));
    }
}
