//! Unified error handling system
//!
//! Provides the error taxonomy shared by every crate: transport failures,
//! provider error payloads, configuration problems and malformed input, plus
//! the local IO/serialization failures that can occur around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type CopysmithResult<T> = Result<T, CopysmithError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the content pipeline
#[derive(Error, Debug)]
pub enum CopysmithError {
    /// A provider could not be reached (network failure, timeout, TLS...)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// A provider answered with an error payload
    #[error("Provider error: {message}")]
    Provider {
        message: String,
        provider: String,
        status: Option<u16>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl CopysmithError {
    /// Build a transport error for `component`
    pub fn transport<E>(message: impl Into<String>, component: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CopysmithError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
            context: ErrorContext::new(component)
                .with_suggestion("Check network connectivity and provider status"),
        }
    }

    /// Build a provider error for `provider`
    pub fn provider(message: impl Into<String>, provider: &str, status: Option<u16>) -> Self {
        CopysmithError::Provider {
            message: message.into(),
            provider: provider.to_string(),
            status,
            context: ErrorContext::new(provider)
                .with_suggestion("Check provider credentials and account limits"),
        }
    }

    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            CopysmithError::Transport { context, .. } => Some(context),
            CopysmithError::Provider { context, .. } => Some(context),
            CopysmithError::Config { context, .. } => Some(context),
            CopysmithError::Validation { context, .. } => Some(context),
            CopysmithError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Check if error is recoverable
    ///
    /// Only provider-side failures are worth retrying; configuration and
    /// validation problems are fatal to the current request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CopysmithError::Transport { .. } | CopysmithError::Provider { .. }
        )
    }

    /// Short machine-readable kind, used in response envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            CopysmithError::Transport { .. } => "transport",
            CopysmithError::Provider { .. } => "provider",
            CopysmithError::Config { .. } => "configuration",
            CopysmithError::Validation { .. } => "validation",
            CopysmithError::Io(_) => "io",
            CopysmithError::Serialization(_) => "serialization",
            CopysmithError::Internal { .. } => "internal",
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            CopysmithError::Config { .. } | CopysmithError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            CopysmithError::Transport { .. } | CopysmithError::Provider { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Provider call failed (may be recoverable)"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::CopysmithError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'copysmith config --init' to create a default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::CopysmithError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! provider_error {
    ($msg:expr, $provider:expr) => {
        $crate::CopysmithError::provider($msg, $provider, None)
    };
    ($msg:expr, $provider:expr, $status:expr) => {
        $crate::CopysmithError::provider($msg, $provider, Some($status))
    };
}
