//! Request-envelope handling for a voice skill.
//!
//! A `SkillRuntime` is built from an application id and two tables: one
//! keyed by request type (launch, session start/end) and one keyed by intent
//! name. `handle_event` is the host entry point; it validates the envelope,
//! dispatches, and reports either a response envelope or a failure message.

mod envelope;
mod response;

use async_trait::async_trait;
use futures_util::FutureExt;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub use envelope::{Intent, Request, RequestEnvelope, ResponseEnvelope, Session};
pub use response::Reply;

/// The exact message the host receives for a foreign application id.
pub const INVALID_APPLICATION_ID: &str = "Invalid Application ID";

#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("Invalid applicationId")]
    InvalidApplicationId,
    #[error("Unsupported intent = {0}")]
    UnsupportedIntent(String),
    #[error("intent request without an intent")]
    MissingIntent,
    #[error("no handler for {0}")]
    Unhandled(&'static str),
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// What a handler gets to look at for one request.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub request_id: &'a str,
    pub session: &'a Session,
    pub intent: Option<&'a Intent>,
}

#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, call: &Call<'_>) -> Reply;
}

/// Session lifecycle callback: request id and session.
pub type Hook = Box<dyn Fn(&str, &Session) + Send + Sync>;

pub struct SkillRuntime {
    application_id: String,
    launch: Option<Arc<dyn Handler>>,
    session_started: Option<Hook>,
    session_ended: Option<Hook>,
    intents: HashMap<String, Arc<dyn Handler>>,
}

impl SkillRuntime {
    pub fn new(application_id: impl Into<String>) -> Self {
        SkillRuntime {
            application_id: application_id.into(),
            launch: None,
            session_started: None,
            session_ended: None,
            intents: HashMap::new(),
        }
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn on_launch(mut self, handler: Arc<dyn Handler>) -> Self {
        self.launch = Some(handler);
        self
    }

    pub fn on_session_started(mut self, hook: Hook) -> Self {
        self.session_started = Some(hook);
        self
    }

    pub fn on_session_ended(mut self, hook: Hook) -> Self {
        self.session_ended = Some(hook);
        self
    }

    pub fn intent(mut self, name: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.intents.insert(name.into(), handler);
        self
    }

    pub async fn execute(&self, env: &RequestEnvelope) -> Result<ResponseEnvelope, SkillError> {
        if env.session.application.application_id != self.application_id {
            return Err(SkillError::InvalidApplicationId);
        }

        let request_id = env.request.request_id();
        let session = &env.session;
        if session.new {
            if let Some(hook) = &self.session_started {
                hook(request_id, session);
            }
        }
        let attributes = session.attributes.clone().unwrap_or_default();

        let reply = match &env.request {
            Request::LaunchRequest(_) => {
                let handler = self
                    .launch
                    .as_ref()
                    .ok_or(SkillError::Unhandled("LaunchRequest"))?;
                let call = Call {
                    request_id,
                    session,
                    intent: None,
                };
                handler.handle(&call).await
            }
            Request::IntentRequest(req) => {
                let intent = req.intent.as_ref().ok_or(SkillError::MissingIntent)?;
                let handler = self
                    .intents
                    .get(&intent.name)
                    .ok_or_else(|| SkillError::UnsupportedIntent(intent.name.clone()))?;
                debug!(
                    request_id,
                    intent = %intent.name,
                    slots = ?intent.filled_slots(),
                    "dispatching intent"
                );
                let call = Call {
                    request_id,
                    session,
                    intent: Some(intent),
                };
                handler.handle(&call).await
            }
            Request::SessionEndedRequest(req) => {
                debug!(request_id, reason = ?req.reason, "session ended");
                if let Some(hook) = &self.session_ended {
                    hook(request_id, session);
                }
                Reply::Silent
            }
        };

        Ok(reply.into_envelope(attributes))
    }
}

/// Terminal result reported to the host for one event.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOutcome {
    Succeed(ResponseEnvelope),
    Fail(String),
}

impl HostOutcome {
    pub fn to_json(&self) -> Value {
        match self {
            HostOutcome::Succeed(resp) => {
                serde_json::to_value(resp).unwrap_or_else(|e| json!({ "errorMessage": e.to_string() }))
            }
            HostOutcome::Fail(msg) => json!({ "errorMessage": msg }),
        }
    }
}

pub async fn handle_event(runtime: &SkillRuntime, event: Value) -> HostOutcome {
    let presented = event
        .pointer("/session/application/applicationId")
        .and_then(Value::as_str);
    if let Some(id) = presented {
        if id != runtime.application_id() {
            warn!(application_id = id, "rejecting event for foreign application");
            return HostOutcome::Fail(INVALID_APPLICATION_ID.into());
        }
    }

    let envelope: RequestEnvelope = match serde_json::from_value(event) {
        Ok(env) => env,
        Err(err) => {
            let err = SkillError::from(err);
            error!("{}", err);
            return HostOutcome::Fail(format!("Exception: {}", err));
        }
    };
    info!(
        request_id = envelope.request.request_id(),
        session_id = %envelope.session.session_id,
        version = envelope.version.as_deref().unwrap_or("-"),
        timestamp = envelope.request.timestamp().unwrap_or("-"),
        "handling event"
    );

    match AssertUnwindSafe(runtime.execute(&envelope)).catch_unwind().await {
        Ok(Ok(resp)) => HostOutcome::Succeed(resp),
        Ok(Err(SkillError::InvalidApplicationId)) => HostOutcome::Fail(INVALID_APPLICATION_ID.into()),
        Ok(Err(err)) => {
            error!("{}", err);
            HostOutcome::Fail(format!("Exception: {}", err))
        }
        Err(_) => {
            error!("handler panicked");
            HostOutcome::Fail("Exception: handler panicked".into())
        }
    }
}
