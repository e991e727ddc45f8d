//! Remote gateway collaborator.
//!
//! Everything in this crate talks to the API through the [`Gateway`] trait:
//! four verb primitives taking a resource path and a flat, form-encoded
//! parameter list, returning either the raw response body or a decoded
//! [`RpnError`]. The production implementation is [`HttpGateway`];
//! [`MockGateway`] is provided for tests.

mod http;

pub use http::HttpGateway;

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{RpnError, RpnResult};

/// Form parameters for a mutating request.
pub type Form<'a> = &'a [(&'a str, String)];

/// Verb primitives against the remote API.
///
/// `path` is relative to the configured base URL. Implementations must map
/// non-success responses to a decoded [`RpnError`] rather than returning the
/// raw body.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch a resource.
    async fn get(&self, path: &str) -> RpnResult<String>;

    /// Create-like request.
    async fn post(&self, path: &str, form: Form<'_>) -> RpnResult<String>;

    /// Replace-like request. Only used by the server glue.
    async fn put(&self, path: &str, form: Form<'_>) -> RpnResult<String>;

    /// Patch-like request.
    async fn patch(&self, path: &str, form: Form<'_>) -> RpnResult<String>;

    /// Delete-like request.
    async fn delete(&self, path: &str, form: Form<'_>) -> RpnResult<String>;
}

/// Error envelope shape used by the API on non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    error_description: Option<String>,
    code: Option<i64>,
}

/// Decode an error body.
///
/// Decode attempts are ordered: the structured JSON envelope first, then a
/// generic unexpected-response error carrying the raw body.
#[must_use]
pub fn decode_error(body: &str) -> RpnError {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        // error_description is the more specific of the two message fields.
        let message = envelope.error_description.or(envelope.error);
        if let Some(message) = message {
            return RpnError::api(envelope.code.unwrap_or(0), message);
        }
    }

    RpnError::UnexpectedResponse(body.to_owned())
}

/// Decode the body of a mutation endpoint that acknowledges with a literal
/// boolean.
///
/// `true` is success, `false` is a rejection; anything else falls back to
/// [`decode_error`].
pub fn decode_ack(body: &str) -> RpnResult<()> {
    match body.trim() {
        "true" => Ok(()),
        "false" => Err(RpnError::Rejected),
        other => Err(decode_error(other)),
    }
}

/// One request observed by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// HTTP verb.
    pub method: String,
    /// Resource path.
    pub path: String,
    /// Form parameters, in submission order.
    pub form: Vec<(String, String)>,
}

#[derive(Debug)]
enum Scripted {
    Body(String),
    Api { code: i64, message: String },
}

impl Scripted {
    fn to_result(&self) -> RpnResult<String> {
        match self {
            Self::Body(body) => Ok(body.clone()),
            Self::Api { code, message } => Err(RpnError::api(*code, message.clone())),
        }
    }
}

/// Scripted gateway for testing.
///
/// Responses are keyed by `"METHOD path"`. One-shot responses queued with
/// [`enqueue`](Self::enqueue) are consumed in order before the repeatable
/// response set with [`respond`](Self::respond) is used. Every request is
/// recorded and can be inspected with [`calls`](Self::calls); requests with
/// no scripted response fail with [`RpnError::UnexpectedResponse`].
#[derive(Debug, Default)]
pub struct MockGateway {
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    repeatable: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(method: &str, path: &str) -> String {
        format!("{method} {path}")
    }

    /// Queue a one-shot response body.
    pub fn enqueue(&self, method: &str, path: &str, body: impl Into<String>) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(Self::key(method, path))
            .or_default()
            .push_back(Scripted::Body(body.into()));
    }

    /// Queue a one-shot API error.
    pub fn enqueue_api_error(&self, method: &str, path: &str, code: i64, message: &str) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(Self::key(method, path))
            .or_default()
            .push_back(Scripted::Api {
                code,
                message: message.to_owned(),
            });
    }

    /// Set the repeatable response body for a route.
    pub fn respond(&self, method: &str, path: &str, body: impl Into<String>) {
        self.repeatable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Self::key(method, path), Scripted::Body(body.into()));
    }

    /// Set the repeatable API error for a route.
    pub fn respond_api_error(&self, method: &str, path: &str, code: i64, message: &str) {
        self.repeatable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                Self::key(method, path),
                Scripted::Api {
                    code,
                    message: message.to_owned(),
                },
            );
    }

    /// Every request observed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests observed for a route.
    #[must_use]
    pub fn calls_to(&self, method: &str, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    fn dispatch(&self, method: &str, path: &str, form: Form<'_>) -> RpnResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                method: method.to_owned(),
                path: path.to_owned(),
                form: form
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), v.clone()))
                    .collect(),
            });

        let key = Self::key(method, path);

        if let Some(scripted) = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
        {
            return scripted.to_result();
        }

        if let Some(scripted) = self
            .repeatable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return scripted.to_result();
        }

        Err(RpnError::UnexpectedResponse(format!(
            "no scripted response for {key}"
        )))
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn get(&self, path: &str) -> RpnResult<String> {
        self.dispatch("GET", path, &[])
    }

    async fn post(&self, path: &str, form: Form<'_>) -> RpnResult<String> {
        self.dispatch("POST", path, form)
    }

    async fn put(&self, path: &str, form: Form<'_>) -> RpnResult<String> {
        self.dispatch("PUT", path, form)
    }

    async fn patch(&self, path: &str, form: Form<'_>) -> RpnResult<String> {
        self.dispatch("PATCH", path, form)
    }

    async fn delete(&self, path: &str, form: Form<'_>) -> RpnResult<String> {
        self.dispatch("DELETE", path, form)
    }
}
