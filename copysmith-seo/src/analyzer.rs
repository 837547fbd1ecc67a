//! Opportunity analysis pipeline
//!
//! expand keywords -> search volume -> related keywords -> score -> outline

use crate::alerts::OperatorAlerts;
use crate::keywords::expand_keywords;
use crate::scoring::{partition, OpportunitySet};
use crate::structure::{build_structure, generate_suggestions, ContentStructure, Suggestion};
use copysmith_core::{
    cache_key, get_typed, set_typed, validation_error, CacheStore, CopysmithResult,
    KeywordCandidate, DEFAULT_TTL,
};
use copysmith_providers::ResearchClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const LIMITED_MESSAGE: &str = "Using basic keyword suggestions due to service unavailability";

/// Full analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityReport {
    pub opportunities: OpportunitySet,
    pub content_structure: ContentStructure,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackKeywords {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

/// Degraded result used when no research data could be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitedReport {
    pub message: String,
    pub keywords: FallbackKeywords,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Success(OpportunityReport),
    Limited(LimitedReport),
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            AnalysisOutcome::Success(_) => "success",
            AnalysisOutcome::Limited(_) => "limited",
        }
    }
}

/// Volume data for `term`: search-volume results first, then related results
fn find_volume_data(
    term: &str,
    volumes: &[KeywordCandidate],
    related: &[KeywordCandidate],
) -> KeywordCandidate {
    volumes
        .iter()
        .chain(related)
        .find(|candidate| candidate.term == term)
        .map(|found| KeywordCandidate {
            term: term.to_string(),
            ..found.clone()
        })
        .unwrap_or_else(|| KeywordCandidate::without_data(term))
}

/// Expanded keywords with their data, followed by related keywords not
/// already present
fn assemble_candidates(
    expanded: &[String],
    volumes: &[KeywordCandidate],
    related: &[KeywordCandidate],
) -> Vec<KeywordCandidate> {
    let mut candidates: Vec<KeywordCandidate> = expanded
        .iter()
        .map(|term| find_volume_data(term, volumes, related))
        .collect();

    for candidate in related {
        if !candidates.iter().any(|c| c.term == candidate.term) {
            candidates.push(candidate.clone());
        }
    }
    candidates
}

/// Scores keyword opportunities for a topic and template type
pub struct OpportunityAnalyzer {
    research: Arc<ResearchClient>,
    cache: Arc<dyn CacheStore>,
    alerts: Arc<OperatorAlerts>,
    cache_ttl: Duration,
}

impl OpportunityAnalyzer {
    pub fn new(
        research: Arc<ResearchClient>,
        cache: Arc<dyn CacheStore>,
        alerts: Arc<OperatorAlerts>,
    ) -> Self {
        Self {
            research,
            cache,
            alerts,
            cache_ttl: DEFAULT_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn alerts(&self) -> &OperatorAlerts {
        &self.alerts
    }

    /// Fallback shape naming the topic and its template keywords
    pub fn fallback_response(topic: &str, template_type: &str) -> LimitedReport {
        LimitedReport {
            message: LIMITED_MESSAGE.to_string(),
            keywords: FallbackKeywords {
                primary: vec![topic.trim().to_string()],
                secondary: expand_keywords(topic, template_type),
            },
        }
    }

    /// Analyze keyword opportunities for `topic`
    ///
    /// Research outages degrade to [`AnalysisOutcome::Limited`]; only
    /// invalid input and missing credentials are errors.
    pub async fn analyze_content_opportunities(
        &self,
        topic: &str,
        template_type: &str,
    ) -> CopysmithResult<AnalysisOutcome> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(validation_error!("Topic must not be empty", "topic", "opportunity_analyzer"));
        }

        let key = cache_key("opportunities", &[topic, template_type]);
        if let Some(report) = get_typed::<OpportunityReport>(self.cache.as_ref(), &key).await {
            debug!(topic = topic, template_type = template_type, "Opportunities served from cache");
            return Ok(AnalysisOutcome::Success(report));
        }

        let expanded = expand_keywords(topic, template_type);
        let volumes = self.research.fetch_search_volume(&expanded).await?;
        let lookup = self.research.fetch_keyword_data(topic).await?;

        if lookup.all_endpoints_failed() {
            warn!(topic = topic, "No research endpoint answered, using fallback keywords");
            self.alerts.record_failure(&lookup.failure_lines()).await;
            return Ok(AnalysisOutcome::Limited(Self::fallback_response(
                topic,
                template_type,
            )));
        }

        let candidates = assemble_candidates(&expanded, &volumes.candidates, &lookup.candidates);
        let opportunities = partition(candidates);
        let report = OpportunityReport {
            content_structure: build_structure(&opportunities),
            suggestions: generate_suggestions(&opportunities),
            opportunities,
        };

        info!(
            topic = topic,
            template_type = template_type,
            primary = report.opportunities.primary_keywords.len(),
            secondary = report.opportunities.secondary_keywords.len(),
            long_tail = report.opportunities.long_tail_keywords.len(),
            "Opportunity analysis complete"
        );

        if volumes.available {
            set_typed(self.cache.as_ref(), &key, &report, self.cache_ttl).await;
        } else {
            debug!(topic = topic, "Search volume missing, analysis not cached");
        }
        Ok(AnalysisOutcome::Success(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copysmith_core::Competition;

    #[test]
    fn test_volume_lookup_prefers_search_volume_results() {
        let volumes = vec![KeywordCandidate::new("desk", 900, Competition::Low, 0.0)];
        let related = vec![
            KeywordCandidate::new("desk", 5, Competition::High, 0.0),
            KeywordCandidate::new("desk lamp", 300, Competition::Medium, 0.4),
        ];

        assert_eq!(find_volume_data("desk", &volumes, &related).search_volume, 900);
        assert_eq!(find_volume_data("desk lamp", &volumes, &related).search_volume, 300);
        assert_eq!(
            find_volume_data("desk review", &volumes, &related),
            KeywordCandidate::without_data("desk review")
        );
    }

    #[test]
    fn test_related_keywords_are_appended_once() {
        let expanded = vec!["desk".to_string(), "desk review".to_string()];
        let related = vec![
            KeywordCandidate::new("desk review", 40, Competition::Low, 0.0),
            KeywordCandidate::new("desk lamp", 300, Competition::Medium, 0.4),
        ];

        let candidates = assemble_candidates(&expanded, &[], &related);
        let terms: Vec<_> = candidates.iter().map(|c| c.term.as_str()).collect();
        assert_eq!(terms, vec!["desk", "desk review", "desk lamp"]);
        assert_eq!(candidates[1].search_volume, 40);
    }

    #[test]
    fn test_fallback_response_shape() {
        let limited = OpportunityAnalyzer::fallback_response("desk", "product_review");
        let json = serde_json::to_value(AnalysisOutcome::Limited(limited)).unwrap();

        assert_eq!(json["status"], "limited");
        assert_eq!(json["keywords"]["primary"][0], "desk");
        assert_eq!(json["keywords"]["secondary"][1], "desk review");
        assert_eq!(json["message"], LIMITED_MESSAGE);
    }
}
