//! Shared data model
//!
//! Keyword candidates as reported by the research provider, the closed set of
//! article archetypes, and the generated-content record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::text;

/// Feature flag that enables pipe-table rendering and table prompt instructions
pub const FEATURE_COMPARISON_TABLE: &str = "comparison_table";

/// Requested optional features for a generation request
pub type FeatureSet = BTreeSet<String>;

/// Provider-reported competition level for a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Competition {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl Competition {
    /// Parse a provider label; anything unrecognised is `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Competition::Low,
            "medium" => Competition::Medium,
            "high" => Competition::High,
            _ => Competition::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Competition::Low => "low",
            Competition::Medium => "medium",
            Competition::High => "high",
            Competition::Unknown => "unknown",
        }
    }
}

/// A topic-related search term plus its provider-reported demand metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCandidate {
    pub term: String,
    pub search_volume: u64,
    pub competition: Competition,
    pub cpc: f64,
}

impl KeywordCandidate {
    pub fn new(term: impl Into<String>, search_volume: u64, competition: Competition, cpc: f64) -> Self {
        Self {
            term: term.into(),
            search_volume,
            competition,
            // negative or NaN CPC values are reported as zero
            cpc: if cpc.is_finite() && cpc > 0.0 { cpc } else { 0.0 },
        }
    }

    /// Candidate for a term the provider returned no data for
    pub fn without_data(term: impl Into<String>) -> Self {
        Self::new(term, 0, Competition::Unknown, 0.0)
    }
}

/// Closed set of article archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    ProductReview,
    ProductRoundup,
    ProductComparison,
    HowtoGuide,
    BuyersGuide,
    ExplanationArticle,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        ContentType::ProductReview,
        ContentType::ProductRoundup,
        ContentType::ProductComparison,
        ContentType::HowtoGuide,
        ContentType::BuyersGuide,
        ContentType::ExplanationArticle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::ProductReview => "product_review",
            ContentType::ProductRoundup => "product_roundup",
            ContentType::ProductComparison => "product_comparison",
            ContentType::HowtoGuide => "howto_guide",
            ContentType::BuyersGuide => "buyers_guide",
            ContentType::ExplanationArticle => "explanation_article",
        }
    }

    /// Exact lookup by identifier
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Lookup that falls back to `product_review` for unknown names
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            ContentType::ProductReview => "Product Review",
            ContentType::ProductRoundup => "Product Roundup",
            ContentType::ProductComparison => "Product Comparison",
            ContentType::HowtoGuide => "How-To Guide",
            ContentType::BuyersGuide => "Buyer's Guide",
            ContentType::ExplanationArticle => "Explanation Article",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finished article produced from one model response
///
/// Fields are private so the word count can never drift from the markdown
/// it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    raw_markdown: String,
    html: String,
    word_count: usize,
}

impl GeneratedContent {
    pub fn new(raw_markdown: String, html: String) -> Self {
        let word_count = text::markdown_word_count(&raw_markdown);
        Self {
            raw_markdown,
            html,
            word_count,
        }
    }

    pub fn raw_markdown(&self) -> &str {
        &self.raw_markdown
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(
            ContentType::from_name("buyers_guide"),
            Some(ContentType::BuyersGuide)
        );
        assert_eq!(ContentType::from_name("listicle"), None);
        assert_eq!(
            ContentType::from_name_or_default("listicle"),
            ContentType::ProductReview
        );
        for t in ContentType::ALL {
            assert_eq!(ContentType::from_name(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_competition_labels() {
        assert_eq!(Competition::from_label("LOW"), Competition::Low);
        assert_eq!(Competition::from_label(" medium "), Competition::Medium);
        assert_eq!(Competition::from_label("High"), Competition::High);
        assert_eq!(Competition::from_label(""), Competition::Unknown);
    }

    #[test]
    fn test_candidate_normalises_cpc() {
        assert_eq!(KeywordCandidate::new("a", 1, Competition::Low, -3.0).cpc, 0.0);
        assert_eq!(KeywordCandidate::new("a", 1, Competition::Low, f64::NAN).cpc, 0.0);
        assert_eq!(KeywordCandidate::new("a", 1, Competition::Low, 2.5).cpc, 2.5);
    }

    #[test]
    fn test_generated_content_counts_words_from_markdown() {
        let content = GeneratedContent::new(
            "## Heading here\n\n- first item\n- second item\n\nClosing line.".to_string(),
            "<div></div>".to_string(),
        );
        assert_eq!(content.word_count(), 8);
    }
}
