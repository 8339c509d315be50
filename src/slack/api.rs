use std::future::Future;

use anyhow::Result;
use reqwest::{
    header::{CONTENT_TYPE, RETRY_AFTER},
    Client,
};
use serde_json::Value;

/// The Slack Web API endpoint for posting messages.
pub const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// The Slack Web API endpoint for finding a user by their email address.
pub const LOOKUP_BY_EMAIL_URL: &str = "https://slack.com/api/users.lookupByEmail";

/// The body of an outgoing request to Slack.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SlackRequestBody {
    /// A pre-serialized JSON document.
    Json(String),
    Form(Vec<(String, String)>),
}

/// An HTTP POST to Slack.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SlackHttpRequest {
    url: String,
    body: SlackRequestBody,
    bearer_token: Option<String>,
}

impl SlackHttpRequest {
    pub fn json(url: &str, payload: &str, bearer_token: Option<&str>) -> Self {
        Self {
            url: url.to_string(),
            body: SlackRequestBody::Json(payload.to_string()),
            bearer_token: bearer_token.map(|t| t.to_string()),
        }
    }

    pub fn form(url: &str, fields: &[(&str, &str)], bearer_token: Option<&str>) -> Self {
        Self {
            url: url.to_string(),
            body: SlackRequestBody::Form(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            bearer_token: bearer_token.map(|t| t.to_string()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &SlackRequestBody {
        &self.body
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }
}

/// The parts of an HTTP response that matter for classifying a Slack API call.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SlackHttpResponse {
    status: u16,
    retry_after_secs: Option<u64>,
    body: String,
}

impl SlackHttpResponse {
    pub fn new(status: u16, retry_after_secs: Option<u64>, body: &str) -> Self {
        Self {
            status,
            retry_after_secs,
            body: body.to_string(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after_secs
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A trait for performing HTTP POSTs against Slack.
pub trait SlackTransport {
    fn send_request(
        &self,
        request: &SlackHttpRequest,
    ) -> impl Future<Output = Result<SlackHttpResponse>> + Send;
}

impl SlackTransport for Client {
    async fn send_request(&self, request: &SlackHttpRequest) -> Result<SlackHttpResponse> {
        let mut builder = self.post(request.url());
        builder = match request.body() {
            SlackRequestBody::Json(payload) => builder
                .header(CONTENT_TYPE, "application/json;charset=utf-8")
                .body(payload.clone()),
            SlackRequestBody::Form(fields) => builder.form(fields),
        };
        if let Some(token) = request.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let retry_after_secs = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = resp.text().await?;
        Ok(SlackHttpResponse::new(status, retry_after_secs, &body))
    }
}

/// The classified outcome of a single call to Slack.
#[derive(Debug, PartialEq, Clone)]
pub enum SlackApiResult {
    /// The call succeeded with the parsed response body.
    ///
    /// Webhooks answer with a plain text `ok`, which is represented as `Value::Null`.
    Success(Value),
    /// Slack asked us to wait this many seconds before trying again.
    RateLimited(u64),
    HttpError { status: u16, body: String },
    /// Slack answered 200 with `ok: false` and this error code.
    ApplicationError { status: u16, error: String },
    /// The request never produced a response.
    Transport(String),
}

impl SlackApiResult {
    /// Classifies an HTTP response.
    ///
    /// Rate limiting is checked first, then the status code, then the `ok` flag of the body.
    pub fn from_response(response: &SlackHttpResponse) -> Self {
        let status = response.status();
        if let (429, Some(secs)) = (status, response.retry_after_secs()) {
            return Self::RateLimited(secs);
        }
        if status != 200 {
            return Self::HttpError {
                status,
                body: response.body().to_string(),
            };
        }
        match serde_json::from_str::<Value>(response.body()) {
            Ok(json) if json.get("ok").and_then(Value::as_bool) == Some(true) => {
                Self::Success(json)
            }
            Ok(json) => Self::ApplicationError {
                status,
                error: json
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown_error")
                    .to_string(),
            },
            Err(_) if response.body().trim() == "ok" => Self::Success(Value::Null),
            Err(_) => Self::ApplicationError {
                status,
                error: response.body().to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
