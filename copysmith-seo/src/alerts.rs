//! Operator alerting for repeated provider failures
//!
//! Failures are always recorded; notifications are rate limited so a burst
//! of failing requests produces a single alert per interval.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use copysmith_core::{AlertConfig, CopysmithResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const ALERT_SUBJECT: &str = "SEO API Issues Detected - Action Required";

/// A message for the site operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorAlert {
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery channel for operator alerts
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &OperatorAlert) -> CopysmithResult<()>;
}

/// Writes alerts to the log at `warn`
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, alert: &OperatorAlert) -> CopysmithResult<()> {
        warn!(
            recipient = alert.recipient.as_deref().unwrap_or("operator"),
            subject = %alert.subject,
            "{}",
            alert.body
        );
        Ok(())
    }
}

/// Keeps every alert in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OperatorAlert>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OperatorAlert> {
        lock(&self.sent).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.sent).len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &OperatorAlert) -> CopysmithResult<()> {
        lock(&self.sent).push(alert.clone());
        Ok(())
    }
}

/// The most recent failure set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    pub time: DateTime<Utc>,
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
struct AlertState {
    last_error: Option<RecordedError>,
    last_notified: Option<Instant>,
}

/// Records provider failures and forwards them to a [`Notifier`]
pub struct OperatorAlerts {
    notifier: Arc<dyn Notifier>,
    recipient: Option<String>,
    site_label: String,
    min_interval: Duration,
    state: Mutex<AlertState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Whether a new alert may go out at `now`
///
/// The window is inclusive, so a zero interval never suppresses.
fn alert_due(last_notified: Option<Instant>, now: Instant, min_interval: Duration) -> bool {
    match last_notified {
        Some(at) => now.saturating_duration_since(at) >= min_interval,
        None => true,
    }
}

impl OperatorAlerts {
    pub fn new(notifier: Arc<dyn Notifier>, config: &AlertConfig) -> Self {
        Self {
            notifier,
            recipient: config.recipient.clone(),
            site_label: config.site_label.clone(),
            min_interval: Duration::from_secs(config.min_interval_secs),
            state: Mutex::new(AlertState::default()),
        }
    }

    pub fn last_error(&self) -> Option<RecordedError> {
        lock(&self.state).last_error.clone()
    }

    fn compose(&self, errors: &[String]) -> OperatorAlert {
        let mut body = format!("SEO API issues detected on {}\n\n", self.site_label);
        body.push_str("The following errors occurred:\n\n");
        for line in errors {
            body.push_str(line);
            body.push('\n');
        }
        body.push_str("\nPlease check your API configuration and service status.");

        OperatorAlert {
            recipient: self.recipient.clone(),
            subject: ALERT_SUBJECT.to_string(),
            body,
        }
    }

    /// Record `errors` and notify the operator unless an alert went out
    /// within the minimum interval
    ///
    /// Returns whether a notification was delivered.
    pub async fn record_failure(&self, errors: &[String]) -> bool {
        let due = {
            let mut state = lock(&self.state);
            state.last_error = Some(RecordedError {
                time: Utc::now(),
                errors: errors.to_vec(),
            });
            let due = alert_due(state.last_notified, Instant::now(), self.min_interval);
            if due {
                // Claimed before sending so concurrent failures do not double up
                state.last_notified = Some(Instant::now());
            }
            due
        };

        warn!(errors = ?errors, "Provider failure recorded");
        if !due {
            info!("Operator alert suppressed by rate limit");
            return false;
        }

        let alert = self.compose(errors);
        match self.notifier.notify(&alert).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to deliver operator alert");
                lock(&self.state).last_notified = None;
                false
            }
        }
    }
}
