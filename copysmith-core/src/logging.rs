//! Unified logging system
//!
//! Structured `tracing` output with a configurable format and filter, plus
//! lifecycle macros used by the request handlers.

use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to include thread information
    pub include_thread: bool,
    /// Append to this file instead of stderr
    pub log_file_path: Option<String>,
    /// Emit span close events with timings
    pub enable_performance_monitoring: bool,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            log_file_path: None,
            enable_performance_monitoring: false,
            filter_directives: vec![
                "copysmith_core=info".to_string(),
                "copysmith_providers=info".to_string(),
                "copysmith_seo=info".to_string(),
                "copysmith_content=info".to_string(),
                "copysmith_applications=info".to_string(),
            ],
        }
    }
}

/// Initialize the logging system
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    for directive in &config.filter_directives {
        filter = filter.add_directive(directive.parse()?);
    }

    let writer = match &config.log_file_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    let span_events = if config.enable_performance_monitoring {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread)
                .with_writer(writer);
            registry.with(layer).try_init()?;
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread)
                .with_writer(writer);
            registry.with(layer).try_init()?;
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread)
                .with_writer(writer);
            registry.with(layer).try_init()?;
        }
    }

    Ok(())
}

/// Performance monitoring utilities
pub mod performance {
    use std::time::Instant;
    use tracing::{info_span, Instrument};

    /// Measure and log execution time of an async operation
    pub async fn measure_async<F, T>(operation_name: &str, future: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        let span = info_span!("performance", operation = operation_name);
        let start = Instant::now();

        let result = future.instrument(span).await;

        tracing::debug!(
            target: "performance",
            operation = operation_name,
            duration_ms = start.elapsed().as_millis() as u64,
            "Operation completed"
        );

        result
    }
}

/// Logging macros for common patterns
#[macro_export]
macro_rules! log_operation_start {
    ($operation:expr) => {
        tracing::info!(
            operation = $operation,
            "Starting operation"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info!(
            operation = $operation,
            $($field)*,
            "Starting operation"
        );
    };
}

#[macro_export]
macro_rules! log_operation_success {
    ($operation:expr) => {
        tracing::info!(
            operation = $operation,
            "Operation completed successfully"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info!(
            operation = $operation,
            $($field)*,
            "Operation completed successfully"
        );
    };
}

#[macro_export]
macro_rules! log_operation_error {
    ($operation:expr, $error:expr) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            "Operation failed"
        );
    };
    ($operation:expr, $error:expr, $($field:tt)*) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            $($field)*,
            "Operation failed"
        );
    };
}
