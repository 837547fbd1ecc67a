//! Result types shared by the provider clients

use copysmith_core::KeywordCandidate;
use serde::{Deserialize, Serialize};

/// Outcome of a connection probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub success: bool,
    pub message: String,
}

impl ConnectionStatus {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: "API connection successful".to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// An endpoint that could not produce keyword data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointFailure {
    /// Endpoint role, `primary` or `fallback`
    pub endpoint: String,
    pub message: String,
}

/// Related keywords for a topic together with any endpoint failures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordLookup {
    pub candidates: Vec<KeywordCandidate>,
    pub failures: Vec<EndpointFailure>,
    /// Which endpoint answered; `None` when every endpoint failed
    pub served_by: Option<String>,
}

impl KeywordLookup {
    pub fn all_endpoints_failed(&self) -> bool {
        self.served_by.is_none()
    }

    /// `role: message` lines, one per failed endpoint
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.endpoint, f.message))
            .collect()
    }
}

/// Search volume for a keyword list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeLookup {
    pub candidates: Vec<KeywordCandidate>,
    /// False when every attempt failed and `candidates` is empty for lack of data
    pub available: bool,
}

impl VolumeLookup {
    pub fn answered(candidates: Vec<KeywordCandidate>) -> Self {
        Self {
            candidates,
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }
}
