//! Topic to keyword expansion

use copysmith_core::ContentType;

/// Fixed modifier list for a template type
pub fn modifiers_for(content_type: ContentType) -> &'static [&'static str] {
    match content_type {
        ContentType::ProductReview => &["review", "vs", "worth it", "pros and cons", "alternatives"],
        ContentType::ProductRoundup => &["best", "top", "cheapest", "comparison", "for"],
        ContentType::ProductComparison => &[
            "vs",
            "versus",
            "comparison",
            "difference between",
            "which is better",
        ],
        ContentType::HowtoGuide => &["how to", "guide", "tutorial", "steps", "tips"],
        ContentType::BuyersGuide => &[
            "how to choose",
            "buying guide",
            "what to look for",
            "before buying",
            "features",
        ],
        ContentType::ExplanationArticle => &["what is", "explained", "definition", "meaning", "examples"],
    }
}

/// The bare topic followed by `topic modifier` and `modifier topic` for each
/// modifier of the template type, deduplicated in first-seen order
///
/// An unrecognised template type expands to the topic alone.
pub fn expand_keywords(topic: &str, template_type: &str) -> Vec<String> {
    let topic = topic.trim();
    let mut keywords = vec![topic.to_string()];

    if let Some(content_type) = ContentType::from_name(template_type) {
        for modifier in modifiers_for(content_type) {
            for candidate in [
                format!("{} {}", topic, modifier),
                format!("{} {}", modifier, topic),
            ] {
                let candidate = candidate.trim().to_string();
                if !keywords.contains(&candidate) {
                    keywords.push(candidate);
                }
            }
        }
    }

    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_review_expansion() {
        let keywords = expand_keywords("iphone 15", "product_review");

        assert_eq!(keywords.len(), 11);
        assert_eq!(keywords[0], "iphone 15");
        assert_eq!(keywords[1], "iphone 15 review");
        assert_eq!(keywords[2], "review iphone 15");
        assert!(keywords.contains(&"iphone 15 pros and cons".to_string()));
    }

    #[test]
    fn test_expansion_is_deduplicated() {
        let keywords = expand_keywords("review", "product_review");

        assert_eq!(keywords.iter().filter(|k| *k == "review review").count(), 1);
        let unique: std::collections::HashSet<_> = keywords.iter().collect();
        assert_eq!(unique.len(), keywords.len());
    }

    #[test]
    fn test_unknown_template_keeps_topic_only() {
        assert_eq!(expand_keywords("  laptops ", "podcast"), vec!["laptops"]);
    }

    #[test]
    fn test_every_type_has_five_modifiers() {
        for content_type in ContentType::ALL {
            assert_eq!(modifiers_for(content_type).len(), 5, "{}", content_type);
        }
    }
}
