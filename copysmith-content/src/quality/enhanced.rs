//! Quality report extended with a model-written analysis and lexical signals

use super::{QualityReport, QualityScorer, ReadabilityReport};
use copysmith_core::text::{sentences, strip_tags, truncate_chars};
use copysmith_core::GeneratedContent;
use copysmith_providers::GenerationClient;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

const AI_PROMPT: &str = "Analyze this content for:\n1. Writing quality\n2. Persuasiveness\n3. Commercial intent\n4. User engagement\n\nContent: ";
const AI_EXCERPT_CHARS: usize = 1000;

const POSITIVE_WORDS: [&str; 5] = ["best", "great", "excellent", "amazing", "perfect"];
const NEGATIVE_WORDS: [&str; 5] = ["worst", "bad", "poor", "terrible", "avoid"];

const PURCHASE_MARKERS: [&str; 5] = ["buy", "price", "cost", "purchase", "order"];
const COMPARISON_MARKERS: [&str; 4] = ["vs", "versus", "compared to", "alternative"];
const RESEARCH_MARKERS: [&str; 4] = ["review", "guide", "how to", "tutorial"];

const READABILITY_FLOOR: f64 = 60.0;
const MIN_PURCHASE_SIGNALS: usize = 3;

/// Outcome of the model-written analysis; exactly one field is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    /// Polarity in -1.0..=1.0
    pub score: f64,
    pub positive_count: usize,
    pub negative_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerIntentReport {
    pub purchase_intent: usize,
    pub comparison_intent: usize,
    pub research_intent: usize,
    /// Strongest signal; ties go to the earlier intent, `None` when no marker occurs
    pub primary_intent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquenessReport {
    pub uniqueness_score: f64,
    pub duplicate_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementGroup {
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: ImprovementPriority,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedQualityReport {
    #[serde(flatten)]
    pub basic: QualityReport,
    pub ai_analysis: AiAnalysis,
    pub sentiment: SentimentReport,
    pub buyer_intent: BuyerIntentReport,
    pub uniqueness: UniquenessReport,
    pub improvements: Vec<ImprovementGroup>,
}

fn count_markers(lowered: &str, markers: &[&str]) -> usize {
    markers.iter().map(|m| lowered.matches(m).count()).sum()
}

/// Polarity from occurrences of fixed positive and negative words
pub fn analyze_sentiment(text: &str) -> SentimentReport {
    let lowered = text.to_lowercase();
    let positive_count = count_markers(&lowered, &POSITIVE_WORDS);
    let negative_count = count_markers(&lowered, &NEGATIVE_WORDS);
    let total = (positive_count + negative_count).max(1);

    SentimentReport {
        score: (positive_count as f64 - negative_count as f64) / total as f64,
        positive_count,
        negative_count,
    }
}

pub fn analyze_buyer_intent(text: &str) -> BuyerIntentReport {
    let lowered = text.to_lowercase();
    let purchase_intent = count_markers(&lowered, &PURCHASE_MARKERS);
    let comparison_intent = count_markers(&lowered, &COMPARISON_MARKERS);
    let research_intent = count_markers(&lowered, &RESEARCH_MARKERS);

    let mut primary: Option<(&str, usize)> = None;
    for (name, count) in [
        ("purchase_intent", purchase_intent),
        ("comparison_intent", comparison_intent),
        ("research_intent", research_intent),
    ] {
        let stronger = match primary {
            Some((_, best)) => count > best,
            None => count > 0,
        };
        if stronger {
            primary = Some((name, count));
        }
    }

    BuyerIntentReport {
        purchase_intent,
        comparison_intent,
        research_intent,
        primary_intent: primary.map(|(name, _)| name.to_string()),
    }
}

/// Share of distinct sentences; text without sentences counts as fully unique
pub fn analyze_uniqueness(text: &str) -> UniquenessReport {
    let all = sentences(text);
    if all.is_empty() {
        return UniquenessReport {
            uniqueness_score: 100.0,
            duplicate_count: 0,
        };
    }

    let distinct: HashSet<String> = all.iter().map(|s| s.to_lowercase()).collect();
    UniquenessReport {
        uniqueness_score: distinct.len() as f64 / all.len() as f64 * 100.0,
        duplicate_count: all.len() - distinct.len(),
    }
}

pub fn improvement_suggestions(
    readability: &ReadabilityReport,
    buyer_intent: &BuyerIntentReport,
    sentiment: &SentimentReport,
) -> Vec<ImprovementGroup> {
    let mut groups = Vec::new();

    if readability.score < READABILITY_FLOOR {
        let mut suggestions = Vec::new();
        if readability.stats.avg_sentence_length > 20.0 {
            suggestions.push("Break down sentences longer than 20 words".to_string());
        }
        if readability.stats.avg_word_length > 5.0 {
            suggestions.push("Use simpler words where possible".to_string());
        }
        groups.push(ImprovementGroup {
            kind: "readability".to_string(),
            priority: ImprovementPriority::High,
            suggestions,
        });
    }

    if buyer_intent.purchase_intent < MIN_PURCHASE_SIGNALS {
        groups.push(ImprovementGroup {
            kind: "buyer_intent".to_string(),
            priority: ImprovementPriority::Medium,
            suggestions: [
                "Add clear call-to-action phrases",
                "Include pricing information",
                "Add comparison tables",
                "Include purchase links",
            ]
            .map(String::from)
            .to_vec(),
        });
    }

    if sentiment.score < 0.0 {
        groups.push(ImprovementGroup {
            kind: "sentiment".to_string(),
            priority: ImprovementPriority::Low,
            suggestions: [
                "Add more positive product features",
                "Balance negative points with solutions",
                "Include success stories or testimonials",
                "Highlight value propositions",
            ]
            .map(String::from)
            .to_vec(),
        });
    }

    groups
}

/// Basic scoring plus a generation-provider analysis
///
/// A failed analysis call is reported in [`AiAnalysis::error`]; scoring itself
/// never fails.
pub struct EnhancedQualityScorer {
    basic: QualityScorer,
    generation: Arc<GenerationClient>,
}

impl EnhancedQualityScorer {
    pub fn new(basic: QualityScorer, generation: Arc<GenerationClient>) -> Self {
        Self { basic, generation }
    }

    pub async fn score(&self, content: &GeneratedContent) -> EnhancedQualityReport {
        self.score_html(content.html()).await
    }

    pub async fn score_html(&self, html: &str) -> EnhancedQualityReport {
        let basic = self.basic.score_html(html);
        let text = strip_tags(html);

        let ai_analysis = self.analyze_with_ai(&text).await;
        let sentiment = analyze_sentiment(&text);
        let buyer_intent = analyze_buyer_intent(&text);
        let uniqueness = analyze_uniqueness(&text);
        let improvements = improvement_suggestions(&basic.readability, &buyer_intent, &sentiment);

        EnhancedQualityReport {
            basic,
            ai_analysis,
            sentiment,
            buyer_intent,
            uniqueness,
            improvements,
        }
    }

    async fn analyze_with_ai(&self, text: &str) -> AiAnalysis {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let prompt = format!("{AI_PROMPT}{}", truncate_chars(&normalized, AI_EXCERPT_CHARS));

        match self.generation.generate_text(&prompt).await {
            Ok(analysis) => {
                debug!(chars = analysis.len(), "AI analysis received");
                AiAnalysis {
                    analysis: Some(analysis),
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "AI analysis failed, returning partial report");
                AiAnalysis {
                    analysis: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copysmith_core::GenerationConfig;
    use copysmith_providers::ScriptedTransport;
    use serde_json::json;

    fn scorer(transport: Arc<ScriptedTransport>) -> EnhancedQualityScorer {
        let config = GenerationConfig {
            api_key: Some("sk-test".to_string()),
            ..GenerationConfig::default()
        };
        EnhancedQualityScorer::new(
            QualityScorer::new("affiliate links"),
            Arc::new(GenerationClient::new(transport, config)),
        )
    }

    #[test]
    fn test_sentiment() {
        let positive = analyze_sentiment("The best and most amazing kettle. Great value.");
        assert_eq!(positive.positive_count, 3);
        assert_eq!(positive.negative_count, 0);
        assert_eq!(positive.score, 1.0);

        let mixed = analyze_sentiment("Great build, terrible battery, poor screen.");
        assert!((mixed.score - (-1.0 / 3.0)).abs() < 1e-9);

        assert_eq!(analyze_sentiment("neutral text").score, 0.0);
    }

    #[test]
    fn test_buyer_intent() {
        let report = analyze_buyer_intent("Buy now. Check the price. Read our review.");
        assert_eq!(report.purchase_intent, 2);
        assert_eq!(report.research_intent, 1);
        assert_eq!(report.primary_intent.as_deref(), Some("purchase_intent"));

        let tie = analyze_buyer_intent("A guide to the alternative");
        assert_eq!(tie.comparison_intent, 1);
        assert_eq!(tie.research_intent, 1);
        assert_eq!(tie.primary_intent.as_deref(), Some("comparison_intent"));

        assert_eq!(analyze_buyer_intent("nothing here").primary_intent, None);
    }

    #[test]
    fn test_uniqueness() {
        let report = analyze_uniqueness("It works. It works. Buy it.");
        assert_eq!(report.duplicate_count, 1);
        assert!((report.uniqueness_score - 200.0 / 3.0).abs() < 1e-9);

        assert_eq!(analyze_uniqueness("").uniqueness_score, 100.0);
    }

    #[test]
    fn test_improvement_groups() {
        let readable = QualityScorer::new("x").check_readability("<p>Short text. Very short.</p>");
        let intent = analyze_buyer_intent("buy buy buy");
        let sentiment = analyze_sentiment("great");
        assert!(improvement_suggestions(&readable, &intent, &sentiment).is_empty());

        let dense = format!("<p>{}.</p>", vec!["extraordinarily"; 200].join(" "));
        let hard = QualityScorer::new("x").check_readability(&dense);
        let groups = improvement_suggestions(
            &hard,
            &analyze_buyer_intent(""),
            &analyze_sentiment("bad"),
        );

        let kinds: Vec<_> = groups.iter().map(|g| g.kind.as_str()).collect();
        assert_eq!(kinds, vec!["readability", "buyer_intent", "sentiment"]);
        assert_eq!(groups[0].priority, ImprovementPriority::High);
        assert_eq!(groups[0].suggestions.len(), 2);
        assert_eq!(groups[2].priority, ImprovementPriority::Low);
    }

    #[tokio::test]
    async fn test_ai_failure_yields_partial_report() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_failure("connection reset");

        let report = scorer(transport).score_html("<h2>Intro</h2><p>The best kettle.</p>").await;

        assert!(report.ai_analysis.analysis.is_none());
        assert!(report.ai_analysis.error.is_some());
        assert_eq!(report.sentiment.positive_count, 1);

        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("overall_score").is_some());
        assert!(value["ai_analysis"].get("analysis").is_none());
    }

    #[tokio::test]
    async fn test_ai_prompt_uses_excerpt() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"content": [{"text": "Solid and persuasive."}]}));
        let long = format!("<p>{}</p>", "abcd ".repeat(500));

        let report = scorer(transport.clone()).score_html(&long).await;
        assert_eq!(report.ai_analysis.analysis.as_deref(), Some("Solid and persuasive."));

        let requests = transport.requests();
        let prompt = requests[0].body["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.starts_with("Analyze this content for:\n1. Writing quality"));
        assert_eq!(prompt.len(), AI_PROMPT.len() + AI_EXCERPT_CHARS);
    }
}
