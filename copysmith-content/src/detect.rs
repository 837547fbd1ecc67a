//! Content-type detection from a topic
//!
//! An ordered rule table evaluated top to bottom; the first matching rule
//! decides the type.

use copysmith_core::ContentType;
use regex::Regex;
use std::sync::LazyLock;

pub struct DetectionRule {
    pub pattern: Regex,
    pub content_type: ContentType,
}

fn rule(pattern: &str, content_type: ContentType) -> DetectionRule {
    DetectionRule {
        pattern: Regex::new(&format!("(?i){}", pattern)).expect("valid detection pattern"),
        content_type,
    }
}

/// Detection rules in priority order
pub static DETECTION_RULES: LazyLock<Vec<DetectionRule>> = LazyLock::new(|| {
    use ContentType::*;
    vec![
        rule(r"review", ProductReview),
        rule(r"worth it", ProductReview),
        rule(r"experience with", ProductReview),
        rule(r"hands[\s-]?on", ProductReview),
        rule(r"^best\s", ProductRoundup),
        rule(r"top\s*\d+", ProductRoundup),
        rule(r"best\s+\w+\s+for", ProductRoundup),
        rule(r"recommended\s", ProductRoundup),
        rule(r"\svs\.?\s", ProductComparison),
        rule(r"versus", ProductComparison),
        rule(r"compare", ProductComparison),
        rule(r"difference between", ProductComparison),
        // Must precede the generic "how to" rule
        rule(r"how\s+to\s+choose", BuyersGuide),
        rule(r"^how\s+to\s", HowtoGuide),
        rule(r"step[\s-]?by[\s-]?step", HowtoGuide),
        rule(r"guide\s+to\s", HowtoGuide),
        rule(r"tutorial", HowtoGuide),
        rule(r"buying\s+guide", BuyersGuide),
        rule(r"shopping\s+guide", BuyersGuide),
        rule(r"what\s+to\s+look\s+for", BuyersGuide),
        rule(r"what\s+is", ExplanationArticle),
        rule(r"why\s+do", ExplanationArticle),
        rule(r"explained", ExplanationArticle),
        rule(r"understanding", ExplanationArticle),
        rule(r"introduction\s+to", ExplanationArticle),
    ]
});

/// Content type for `topic`, `product_review` when nothing matches
pub fn detect_content_type(topic: &str) -> ContentType {
    let topic = topic.trim();
    DETECTION_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(topic))
        .map(|rule| rule.content_type)
        .unwrap_or_default()
}
