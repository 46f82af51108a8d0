//! Candidate ordering and selection.

use futures::future;

use crate::errors::TrackerError;
use crate::linear::LinearClient;
use crate::linear::models::Issue;

/// Stable-sort the batch by ascending priority (unset last) and take the
/// top issue. Ties keep whatever order the tracker returned them in —
/// that order is unspecified and deliberately not re-derived here.
pub fn select_top(mut candidates: Vec<Issue>) -> Option<Issue> {
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by_key(Issue::priority_sort_key);
    Some(candidates.remove(0))
}

/// Drop candidates whose comment history already carries `marker`.
///
/// The per-candidate lookups run concurrently; the surviving batch keeps
/// its original order.
pub async fn without_dispatched(
    client: &LinearClient,
    candidates: Vec<Issue>,
    marker: &str,
) -> Result<Vec<Issue>, TrackerError> {
    let lookups = candidates
        .iter()
        .map(|issue| client.issue_comments(&issue.id));
    let histories = future::try_join_all(lookups).await?;

    Ok(candidates
        .into_iter()
        .zip(histories)
        .filter(|(_, comments)| !comments.iter().any(|comment| comment.body.contains(marker)))
        .map(|(issue, _)| issue)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(identifier: &str, priority: i32) -> Issue {
        Issue {
            id: format!("uuid-{}", identifier),
            identifier: identifier.to_string(),
            title: format!("Task {}", identifier),
            description: None,
            priority,
            url: format!("https://linear.app/x/{}", identifier),
            branch_name: None,
        }
    }

    #[test]
    fn empty_batch_selects_nothing() {
        assert!(select_top(Vec::new()).is_none());
    }

    #[test]
    fn most_urgent_explicit_priority_wins() {
        let selected = select_top(vec![
            issue("A-1", 3),
            issue("A-2", 1),
            issue("A-3", 2),
            issue("A-4", 4),
        ])
        .unwrap();
        assert_eq!(selected.identifier, "A-2");
    }

    #[test]
    fn higher_priority_always_beats_lower_whatever_the_order() {
        for batch in [
            vec![issue("B-1", 2), issue("B-2", 4)],
            vec![issue("B-2", 4), issue("B-1", 2)],
        ] {
            assert_eq!(select_top(batch).unwrap().identifier, "B-1");
        }
    }

    #[test]
    fn unset_priority_sorts_after_every_explicit_priority() {
        let selected = select_top(vec![issue("C-1", 0), issue("C-2", 4)]).unwrap();
        assert_eq!(selected.identifier, "C-2");
    }

    #[test]
    fn unset_priority_is_selected_when_nothing_else_remains() {
        let selected = select_top(vec![issue("D-1", 0)]).unwrap();
        assert_eq!(selected.identifier, "D-1");
    }

    #[test]
    fn ties_keep_tracker_return_order() {
        let selected = select_top(vec![
            issue("E-1", 2),
            issue("E-2", 2),
            issue("E-3", 2),
        ])
        .unwrap();
        assert_eq!(selected.identifier, "E-1");
    }

    #[tokio::test]
    async fn without_dispatched_filters_on_the_marker() {
        use httpmock::prelude::*;
        use serde_json::json;

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql").body_includes("uuid-F-1");
            then.status(200).json_body(json!({
                "data": { "issue": { "comments": { "nodes": [
                    { "body": "[handoff-dispatched] earlier run" }
                ] } } }
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/graphql").body_includes("uuid-F-2");
            then.status(200).json_body(json!({
                "data": { "issue": { "comments": { "nodes": [
                    { "body": "unrelated discussion" }
                ] } } }
            }));
        });

        let client = LinearClient::new(&server.url("/graphql"), "key");
        let surviving = without_dispatched(
            &client,
            vec![issue("F-1", 1), issue("F-2", 2)],
            "[handoff-dispatched]",
        )
        .await
        .unwrap();
        assert_eq!(surviving.len(), 1);
        assert_eq!(surviving[0].identifier, "F-2");
    }
}
