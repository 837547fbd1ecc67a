//! Response envelopes returned to the host

use crate::ApplicationError;
use copysmith_content::TemplateValidation;
use copysmith_seo::{AnalysisOutcome, LimitedReport, OpportunityReport};
use serde::Serialize;
use std::collections::BTreeMap;

/// Handler result tagged with `status`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response<T> {
    Success(T),
    Limited(LimitedReport),
    Error(ErrorBody),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub kind: String,
}

impl<T> Response<T> {
    pub fn error(error: &ApplicationError) -> Self {
        Response::Error(ErrorBody {
            message: error.user_message(),
            kind: error.kind().to_string(),
        })
    }

    pub fn status(&self) -> &'static str {
        match self {
            Response::Success(_) => "success",
            Response::Limited(_) => "limited",
            Response::Error(_) => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Response::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error_body(&self) -> Option<&ErrorBody> {
        match self {
            Response::Error(body) => Some(body),
            _ => None,
        }
    }
}

impl From<AnalysisOutcome> for Response<OpportunityReport> {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Success(report) => Response::Success(report),
            AnalysisOutcome::Limited(limited) => Response::Limited(limited),
        }
    }
}

/// A generated article and the draft it was saved as
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationPayload {
    /// Rendered HTML
    pub content: String,
    pub word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionPayload {
    pub content_type: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionPayload {
    pub message: String,
}

/// Feature toggles of a template and, when a draft was given, its section check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplatePayload {
    pub template_type: String,
    pub options: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<TemplateValidation>,
}
