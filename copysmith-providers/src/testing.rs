//! Scripted in-memory transport
//!
//! Replays queued replies in order and records every request it receives.
//! Used by tests across the workspace and by offline dry runs.

use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use copysmith_core::{CopysmithError, CopysmithResult, ErrorContext};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Response(HttpResponse),
    /// No response at all, surfaced as a transport error
    Failure(String),
}

type Responder = Box<dyn Fn(&HttpRequest) -> ScriptedReply + Send + Sync>;

/// [`HttpTransport`] that answers from a script
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request not covered by the queue with `responder`
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> ScriptedReply + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    pub fn push(&self, reply: ScriptedReply) -> &Self {
        lock(&self.replies).push_back(reply);
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(ScriptedReply::Response(HttpResponse::new(
            status,
            body.to_string(),
        )))
    }

    pub fn push_failure(&self, message: &str) -> &Self {
        self.push(ScriptedReply::Failure(message.to_string()))
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn remaining_replies(&self) -> usize {
        lock(&self.replies).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post(&self, request: &HttpRequest) -> CopysmithResult<HttpResponse> {
        lock(&self.requests).push(request.clone());

        let queued = lock(&self.replies).pop_front();
        let reply = match (queued, &self.responder) {
            (Some(reply), _) => reply,
            (None, Some(responder)) => responder(request),
            (None, None) => ScriptedReply::Failure(format!("no scripted reply for {}", request.url)),
        };

        match reply {
            ScriptedReply::Response(response) => Ok(response),
            ScriptedReply::Failure(message) => Err(CopysmithError::Transport {
                message,
                source: None,
                context: ErrorContext::new("scripted_transport").with_operation("post"),
            }),
        }
    }
}
