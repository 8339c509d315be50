use std::{cell::RefCell, collections::HashMap, sync::Arc, time::Duration};

use anyhow::{Error, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::utils::test_error::TestError;

use super::{
    api::{SlackHttpRequest, SlackHttpResponse, SlackRequestBody, SlackTransport},
    retry::Sleep,
};

/// A `SlackTransport` that records every request and answers from a script.
///
/// Responses are handed out in order, and the last one is repeated once the script runs out.
pub struct ScriptedTransport {
    responses: Arc<Mutex<Vec<SlackHttpResponse>>>,
    email_responses: HashMap<String, SlackHttpResponse>,
    requests: Arc<Mutex<Vec<SlackHttpRequest>>>,
    fails: bool,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<SlackHttpResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            email_responses: HashMap::new(),
            requests: Arc::new(Mutex::new(vec![])),
            fails: false,
        }
    }

    pub fn always(response: SlackHttpResponse) -> Self {
        Self::new(vec![response])
    }

    /// A transport where every request fails before reaching Slack.
    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Self::new(vec![])
        }
    }

    /// Answers user lookups for `email` with `response` instead of the script.
    pub fn respond_for_email(mut self, email: &str, response: SlackHttpResponse) -> Self {
        self.email_responses.insert(email.to_string(), response);
        self
    }

    pub async fn requests(&self) -> Vec<SlackHttpRequest> {
        self.requests.lock().await.clone()
    }
}

impl SlackTransport for ScriptedTransport {
    async fn send_request(&self, request: &SlackHttpRequest) -> Result<SlackHttpResponse> {
        self.requests.lock().await.push(request.clone());
        if self.fails {
            return Err(Error::new(TestError));
        }
        if let SlackRequestBody::Form(fields) = request.body() {
            let response = fields
                .iter()
                .find(|(key, _)| key == "email")
                .and_then(|(_, email)| self.email_responses.get(email));
            if let Some(response) = response {
                return Ok(response.clone());
            }
        }
        let mut responses = self.responses.lock().await;
        if responses.len() > 1 {
            Ok(responses.remove(0))
        } else {
            Ok(responses
                .first()
                .cloned()
                .unwrap_or_else(|| SlackHttpResponse::new(200, None, r#"{"ok": true}"#)))
        }
    }
}

/// A `Sleep` that returns immediately and remembers how long it was asked to sleep.
pub struct RecordingSleep {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleep {
    pub fn new() -> Self {
        Self {
            slept: Arc::new(Mutex::new(vec![])),
        }
    }

    pub async fn slept(&self) -> Vec<Duration> {
        self.slept.lock().await.clone()
    }
}

impl Sleep for RecordingSleep {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().await.push(duration)
    }
}

/// A `users.lookupByEmail` response for Egon Spengler.
pub fn lookup_by_email_response(enterprise_user_id: Option<&str>) -> Value {
    let mut response = json!({
        "ok": true,
        "user": {
            "id": "U0123ABCDEF",
            "team_id": "T0123ABCDEF",
            "name": "spengler",
            "deleted": false,
            "real_name": "Egon Spengler",
            "tz": "America/New_York",
            "profile": {
                "email": "spengler@ghostbusters.example.com",
                "display_name": "egon"
            },
            "is_admin": false,
            "is_bot": false
        }
    });
    if let Some(id) = enterprise_user_id {
        response["user"]["enterprise_user"] = json!({
            "id": id,
            "enterprise_id": "E0123ABCDEF",
            "enterprise_name": "Ghostbusters"
        });
    }
    response
}

thread_local! {
    static CAPTURED_LOGS: RefCell<Vec<(Level, String)>> = const { RefCell::new(vec![]) };
}

/// A logger that keeps every record on the thread that emitted it.
///
/// Tests run on their own threads (and `#[tokio::test]` runs its futures on the test thread), so
/// each test only sees its own lines.
struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED_LOGS.with(|logs| {
            logs.borrow_mut()
                .push((record.level(), record.args().to_string()))
        })
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;

static INSTALL_LOGGER: Lazy<()> = Lazy::new(|| {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace)
});

/// Starts capturing the log lines of the current test, dropping anything captured before.
pub fn capture_logs() {
    Lazy::force(&INSTALL_LOGGER);
    CAPTURED_LOGS.with(|logs| logs.borrow_mut().clear())
}

/// The log lines captured on this thread since `capture_logs`.
pub fn captured_logs() -> Vec<(Level, String)> {
    CAPTURED_LOGS.with(|logs| logs.borrow().clone())
}

/// How many times `message` was logged at `level`.
pub fn count_logged(level: Level, message: &str) -> usize {
    captured_logs()
        .iter()
        .filter(|(l, m)| *l == level && m == message)
        .count()
}

/// Asserts that `message` was logged at `level` at least once.
pub fn assert_logged(level: Level, message: &str) {
    assert!(
        count_logged(level, message) > 0,
        "Expected {} log {:?}, captured {:?}",
        level,
        message,
        captured_logs()
    )
}
