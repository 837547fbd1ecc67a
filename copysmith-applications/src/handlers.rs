//! Host-facing request handlers
//!
//! Handlers never return `Err`: every failure is folded into the
//! [`Response`] envelope so the host can forward it as-is.

use crate::context::AppContext;
use crate::drafts::DraftPost;
use crate::envelope::{
    ConnectionPayload, DetectionPayload, ErrorBody, GenerationPayload, Response, TemplatePayload,
};
use crate::{ApplicationError, ApplicationResult};
use copysmith_content::{
    detect_content_type, template_options, validate_content, EnhancedQualityReport,
    GenerationRequest, QualityReport,
};
use copysmith_core::{
    config_error, log_operation_error, log_operation_start, log_operation_success, performance,
    validation_error, CopysmithError,
};
use copysmith_providers::ConnectionStatus;
use copysmith_seo::{AnalysisOutcome, OpportunityReport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

pub const SELF_TEST_TOPIC: &str = "test keyword";
pub const SELF_TEST_TEMPLATE: &str = "product_review";
const SELF_TEST_CACHE_KEY: &str = "copysmith_self_test";

/// Provider targeted by a connection test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Generation,
    Research,
}

impl Service {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "generation" => Some(Service::Generation),
            "research" => Some(Service::Research),
            _ => None,
        }
    }
}

/// Credentials to probe with; unset fields fall back to the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCredentials {
    pub api_key: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfTestReport {
    pub cache: CheckResult,
    pub analysis: CheckResult,
}

impl SelfTestReport {
    pub fn all_passed(&self) -> bool {
        self.cache.passed && self.analysis.passed
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn require_content(html: &str) -> ApplicationResult<()> {
    if html.trim().is_empty() {
        return Err(validation_error!("Content is required", "content", "quality").into());
    }
    Ok(())
}

impl AppContext {
    /// Generate an article and save it as a draft
    pub async fn generate(&self, request: &GenerationRequest) -> Response<GenerationPayload> {
        log_operation_start!("generate", topic = %request.topic);

        match performance::measure_async("generate", self.generate_draft(request)).await {
            Ok(payload) => {
                log_operation_success!("generate", word_count = payload.word_count);
                Response::Success(payload)
            }
            Err(e) => {
                log_operation_error!("generate", e);
                Response::error(&e)
            }
        }
    }

    async fn generate_draft(&self, request: &GenerationRequest) -> ApplicationResult<GenerationPayload> {
        let content = self.assembler.generate(request).await?;
        let draft = DraftPost::new(&request.topic, &content);
        self.drafts.save(&draft).await?;

        Ok(GenerationPayload {
            content: content.html().to_string(),
            word_count: content.word_count(),
            draft_id: Some(draft.id),
        })
    }

    /// Keyword opportunities for a topic; research outages answer `limited`
    pub async fn analyze(&self, topic: &str, template_type: &str) -> Response<OpportunityReport> {
        log_operation_start!("analyze", topic = %topic, template_type = %template_type);

        let analysis = self.analyzer.analyze_content_opportunities(topic, template_type);
        match performance::measure_async("analyze", analysis).await {
            Ok(outcome) => {
                log_operation_success!("analyze", status = outcome.status());
                Response::from(outcome)
            }
            Err(e) => {
                e.log();
                Response::error(&ApplicationError::from(e))
            }
        }
    }

    pub fn detect(&self, topic: &str) -> Response<DetectionPayload> {
        if topic.trim().is_empty() {
            return Response::error(&ApplicationError::from(validation_error!(
                "Topic is required",
                "topic",
                "detect"
            )));
        }

        let content_type = detect_content_type(topic);
        debug!(topic = topic, content_type = content_type.as_str(), "Content type detected");
        Response::Success(DetectionPayload {
            content_type: content_type.as_str().to_string(),
            display_name: content_type.display_name().to_string(),
        })
    }

    /// Feature toggles for `template_type`, plus a section check of `markdown`
    /// when one is given
    pub fn template(&self, template_type: &str, markdown: Option<&str>) -> Response<TemplatePayload> {
        let template_type = template_type.trim();
        if template_type.is_empty() {
            return Response::error(&ApplicationError::from(validation_error!(
                "Template type is required",
                "template_type",
                "template"
            )));
        }
        if let Some(markdown) = markdown {
            if let Err(e) = require_content(markdown) {
                return Response::error(&e);
            }
        }

        let validation = markdown.map(|md| validate_content(md, template_type));
        if let Some(v) = validation.as_ref().filter(|v| !v.is_valid) {
            debug!(template_type = template_type, missing = ?v.missing_sections, "Draft misses template sections");
        }

        Response::Success(TemplatePayload {
            template_type: template_type.to_string(),
            options: template_options(template_type)
                .into_iter()
                .map(|(name, enabled)| (name.to_string(), enabled))
                .collect(),
            validation,
        })
    }

    pub fn quality(&self, html: &str) -> Response<QualityReport> {
        match require_content(html) {
            Ok(()) => Response::Success(self.quality.score_html(html)),
            Err(e) => Response::error(&e),
        }
    }

    /// Quality report including the generation-provider analysis
    ///
    /// A failed analysis call still answers `success` with the error embedded.
    pub async fn enhanced_quality(&self, html: &str) -> Response<EnhancedQualityReport> {
        if let Err(e) = require_content(html) {
            return Response::error(&e);
        }

        let report = self.enhanced_quality.score_html(html).await;
        if let Some(error) = &report.ai_analysis.error {
            warn!(error = %error, "Quality report is partial");
        }
        Response::Success(report)
    }

    pub async fn test_connection(
        &self,
        service: Service,
        credentials: &ConnectionCredentials,
    ) -> Response<ConnectionPayload> {
        log_operation_start!("test_connection", service = ?service);

        let status = match self.probe(service, credentials).await {
            Ok(status) => status,
            Err(e) => return Response::error(&ApplicationError::from(e)),
        };

        if status.success {
            log_operation_success!("test_connection", service = ?service);
            Response::Success(ConnectionPayload {
                message: status.message,
            })
        } else {
            warn!(service = ?service, message = %status.message, "Connection test failed");
            Response::Error(ErrorBody {
                message: status.message,
                kind: "provider".to_string(),
            })
        }
    }

    async fn probe(
        &self,
        service: Service,
        credentials: &ConnectionCredentials,
    ) -> Result<ConnectionStatus, CopysmithError> {
        match service {
            Service::Generation => {
                let api_key = non_empty(credentials.api_key.as_deref())
                    .or_else(|| non_empty(self.config.generation.api_key.as_deref()))
                    .ok_or_else(|| config_error!("Generation API key is not configured", "test_connection"))?;
                Ok(self.generation.test_connection(&api_key).await)
            }
            Service::Research => {
                let login = non_empty(credentials.login.as_deref())
                    .or_else(|| non_empty(self.config.research.login.as_deref()));
                let password = non_empty(credentials.password.as_deref())
                    .or_else(|| non_empty(self.config.research.password.as_deref()));
                match (login, password) {
                    (Some(login), Some(password)) => {
                        Ok(self.research.test_connection(&login, &password).await)
                    }
                    _ => Err(config_error!(
                        "Research credentials are not configured",
                        "test_connection"
                    )),
                }
            }
        }
    }

    /// Cache round trip plus one opportunity analysis
    pub async fn self_test(&self) -> Response<SelfTestReport> {
        log_operation_start!("self_test");

        let report = SelfTestReport {
            cache: self.check_cache().await,
            analysis: self.check_analysis().await,
        };

        log_operation_success!("self_test", passed = report.all_passed());
        Response::Success(report)
    }

    async fn check_cache(&self) -> CheckResult {
        let probe = json!({"probe": uuid::Uuid::new_v4().to_string()});

        self.cache
            .set(SELF_TEST_CACHE_KEY, probe.clone(), Duration::from_secs(60))
            .await;
        let stored = self.cache.get(SELF_TEST_CACHE_KEY).await;
        self.cache.delete(SELF_TEST_CACHE_KEY).await;

        match stored {
            Some(value) if value == probe => CheckResult::pass("Cache round trip succeeded"),
            Some(_) => CheckResult::fail("Cache returned a different value"),
            None => CheckResult::fail("Cache did not return the stored value"),
        }
    }

    async fn check_analysis(&self) -> CheckResult {
        match self
            .analyzer
            .analyze_content_opportunities(SELF_TEST_TOPIC, SELF_TEST_TEMPLATE)
            .await
        {
            Ok(AnalysisOutcome::Success(report)) => CheckResult::pass(format!(
                "Analysis succeeded with {} keywords",
                report.opportunities.len()
            )),
            Ok(AnalysisOutcome::Limited(limited)) => CheckResult::fail(limited.message),
            Err(e) => CheckResult::fail(ApplicationError::from(e).user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_names() {
        assert_eq!(Service::from_name("Generation"), Some(Service::Generation));
        assert_eq!(Service::from_name(" research "), Some(Service::Research));
        assert_eq!(Service::from_name("email"), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  key ")), Some("key".to_string()));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
