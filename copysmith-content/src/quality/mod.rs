//! Heuristic quality scoring of finished articles
//!
//! All three category scores are on a 0..=100 scale; the overall score is
//! their unweighted mean.

pub mod enhanced;

use copysmith_core::text::{count_sentence_endings, count_words, escape_html, strip_tags, words};
use copysmith_core::{ContentConfig, GeneratedContent};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]\s*>").expect("heading pattern")
});
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h1[\s>]").expect("h1 pattern"));
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p[\s>]").expect("paragraph pattern"));
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<a[\s>]").expect("link pattern"));
static CTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a[^>]*class="[^"]*button[^"]*"[^>]*>"#).expect("cta pattern")
});

/// Minimum article length for the SEO length check
pub const MIN_SEO_WORDS: usize = 300;
/// Link count at which the affiliate link score saturates
pub const TARGET_LINKS: usize = 3;
const LONG_SENTENCE_WORDS: f64 = 20.0;
const MIN_PARAGRAPHS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStatistics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
}

impl TextStatistics {
    /// Statistics of an HTML document
    pub fn from_html(html: &str) -> Self {
        let text = strip_tags(html);
        let word_count = count_words(&text);
        let sentence_count = count_sentence_endings(&text);

        let tagged_paragraphs = PARAGRAPH_RE.find_iter(html).count();
        let paragraph_count = if tagged_paragraphs > 0 {
            tagged_paragraphs
        } else {
            text.split("\n\n").filter(|block| !block.trim().is_empty()).count()
        };

        let letters: usize = words(&text).map(|w| w.chars().count()).sum();
        let avg_word_length = if word_count == 0 {
            0.0
        } else {
            letters as f64 / word_count as f64
        };

        Self {
            word_count,
            sentence_count,
            paragraph_count,
            avg_sentence_length: word_count as f64 / sentence_count.max(1) as f64,
            avg_word_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityReport {
    pub score: f64,
    pub stats: TextStatistics,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoReport {
    pub score: f64,
    /// `h<level>: <text>` for every heading in document order
    pub heading_structure: Vec<String>,
    pub has_headings: bool,
    pub word_count: usize,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateReport {
    pub score: f64,
    pub link_count: usize,
    pub disclosure_present: bool,
    pub cta_count: usize,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub readability: ReadabilityReport,
    pub seo: SeoReport,
    pub affiliate_optimization: AffiliateReport,
    pub overall_score: f64,
}

/// Flesch-style reading ease from average sentence length, clamped to 0..=100
pub fn readability_score(stats: &TextStatistics) -> f64 {
    (206.835 - 1.015 * stats.avg_sentence_length).clamp(0.0, 100.0)
}

/// Scores readability, SEO and affiliate optimization of an article
#[derive(Debug, Clone)]
pub struct QualityScorer {
    disclosure: String,
}

impl QualityScorer {
    /// `disclosure` is the text whose presence the affiliate check looks for
    pub fn new(disclosure: impl Into<String>) -> Self {
        Self {
            disclosure: disclosure.into(),
        }
    }

    pub fn from_config(config: &ContentConfig) -> Self {
        Self::new(config.disclosure.clone())
    }

    pub fn score(&self, content: &GeneratedContent) -> QualityReport {
        self.score_html(content.html())
    }

    pub fn score_html(&self, html: &str) -> QualityReport {
        let readability = self.check_readability(html);
        let seo = self.check_seo(html);
        let affiliate_optimization = self.check_affiliate(html);
        let overall_score = (readability.score + seo.score + affiliate_optimization.score) / 3.0;

        QualityReport {
            readability,
            seo,
            affiliate_optimization,
            overall_score,
        }
    }

    pub fn check_readability(&self, html: &str) -> ReadabilityReport {
        let stats = TextStatistics::from_html(html);
        let mut suggestions = Vec::new();

        if stats.avg_sentence_length > LONG_SENTENCE_WORDS {
            suggestions
                .push("Consider breaking up longer sentences for better readability".to_string());
        }
        if stats.paragraph_count < MIN_PARAGRAPHS {
            suggestions.push("Add more paragraphs to improve content structure".to_string());
        }

        ReadabilityReport {
            score: readability_score(&stats),
            stats,
            suggestions,
        }
    }

    pub fn check_seo(&self, html: &str) -> SeoReport {
        let heading_structure: Vec<String> = HEADING_RE
            .captures_iter(html)
            .map(|caps| format!("h{}: {}", &caps[1], strip_tags(&caps[2]).trim()))
            .collect();
        let has_headings = !heading_structure.is_empty();
        let word_count = count_words(&strip_tags(html));

        let mut suggestions = Vec::new();
        if !H1_RE.is_match(html) {
            suggestions.push("Add a main heading (H1) to the content".to_string());
        }
        if word_count < MIN_SEO_WORDS {
            suggestions.push("Content length should be at least 300 words for better SEO".to_string());
        }

        let mut score = 0.0;
        if has_headings {
            score += 50.0;
        }
        if word_count >= MIN_SEO_WORDS {
            score += 50.0;
        }

        SeoReport {
            score,
            heading_structure,
            has_headings,
            word_count,
            suggestions,
        }
    }

    fn disclosure_present(&self, html: &str) -> bool {
        let disclosure = self.disclosure.trim();
        !disclosure.is_empty()
            && (html.contains(disclosure) || html.contains(&escape_html(disclosure)))
    }

    pub fn check_affiliate(&self, html: &str) -> AffiliateReport {
        let link_count = LINK_RE.find_iter(html).count();
        let cta_count = CTA_RE.find_iter(html).count();
        let disclosure_present = self.disclosure_present(html);

        let mut suggestions = Vec::new();
        if link_count < TARGET_LINKS {
            suggestions.push("Add more affiliate links to the content".to_string());
        }
        if !disclosure_present {
            suggestions.push("Add an affiliate disclosure to the content".to_string());
        }

        let mut score = (link_count.min(TARGET_LINKS) * 20) as f64;
        if disclosure_present {
            score += 40.0;
        }

        AffiliateReport {
            score,
            link_count,
            disclosure_present,
            cta_count,
            suggestions,
        }
    }
}
