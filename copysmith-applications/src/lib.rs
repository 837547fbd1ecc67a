//! Copysmith Applications - request handling on top of the content engine
//!
//! This crate wires the research, analysis and content crates into one
//! explicitly constructed [`AppContext`] and exposes the host-facing
//! handlers. Every handler answers with a [`Response`] envelope whose
//! `status` is `success`, `limited` or `error`.
//!
//! - **Context** (`context`): configuration and shared collaborators
//! - **Handlers** (`handlers`): generate, analyze, detect, quality, connection and self tests
//! - **Drafts** (`drafts`): persistence of generated articles

pub mod context;
pub mod drafts;
pub mod envelope;
pub mod handlers;

pub use context::{default_drafts_dir, AppContext, AppContextBuilder};
pub use drafts::{DraftPost, DraftStatus, DraftStore, FileDraftStore, MemoryDraftStore};
pub use envelope::{
    ConnectionPayload, DetectionPayload, ErrorBody, GenerationPayload, Response, TemplatePayload,
};
pub use handlers::{
    CheckResult, ConnectionCredentials, SelfTestReport, Service, SELF_TEST_TEMPLATE,
    SELF_TEST_TOPIC,
};

use copysmith_core::CopysmithError;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Core(#[from] CopysmithError),

    #[error("Draft error: {message}")]
    Draft { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    /// Create a draft storage error
    pub fn draft<S: Into<String>>(message: S) -> Self {
        Self::Draft {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Short machine-readable category, shared with [`CopysmithError::kind`]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Core(e) => e.kind(),
            Self::Draft { .. } => "draft",
            Self::NotFound { .. } => "not_found",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Message shown to the caller
    ///
    /// Core errors are surfaced without their category prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Core(CopysmithError::Transport { message, .. })
            | Self::Core(CopysmithError::Provider { message, .. })
            | Self::Core(CopysmithError::Config { message, .. })
            | Self::Core(CopysmithError::Validation { message, .. })
            | Self::Core(CopysmithError::Internal { message, .. }) => message.clone(),
            Self::Draft { message } | Self::NotFound { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
