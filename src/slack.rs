//! Chat-service (Slack Web API) client. One operation: post the dispatch
//! message to a channel, with link and media previews disabled.

use serde::Deserialize;
use serde_json::json;

use crate::errors::ChatError;

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Timestamp handle of a posted message.
#[derive(Debug, Clone)]
pub struct PostedMessage {
    pub ts: String,
}

#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_url: String,
    bot_token: String,
}

impl SlackClient {
    pub fn new(api_url: &str, bot_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
        }
    }

    /// Post `text` verbatim to `channel`. The service treats `ok: false`
    /// responses as HTTP 200, so the envelope flag is the real verdict.
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
    ) -> Result<PostedMessage, ChatError> {
        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.bot_token)
            .json(&json!({
                "channel": channel,
                "text": text,
                "unfurl_links": false,
                "unfurl_media": false,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<PostMessageResponse>()
            .await?;

        if !response.ok {
            return Err(ChatError::Api(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        response
            .ts
            .map(|ts| PostedMessage { ts })
            .ok_or(ChatError::MissingData("ts"))
    }
}
