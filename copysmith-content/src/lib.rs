//! Copysmith Content - article assembly and quality scoring
//!
//! Prompt construction, content-type detection, the markdown renderer and
//! the quality heuristics applied to finished articles.

pub mod assembler;
pub mod detect;
pub mod prompt;
pub mod quality;
pub mod render;
pub mod templates;

pub use assembler::{ContentAssembler, GenerationRequest};
pub use detect::{detect_content_type, DetectionRule, DETECTION_RULES};
pub use prompt::{build_prompt, build_prompt_with_length};
pub use quality::enhanced::{
    analyze_buyer_intent, analyze_sentiment, analyze_uniqueness, improvement_suggestions,
    AiAnalysis, BuyerIntentReport, EnhancedQualityReport, EnhancedQualityScorer,
    ImprovementGroup, ImprovementPriority, SentimentReport, UniquenessReport,
};
pub use quality::{
    AffiliateReport, QualityReport, QualityScorer, ReadabilityReport, SeoReport, TextStatistics,
};
pub use render::{render, DisclosureSettings};
pub use templates::{
    outline_skeleton, structured_template, template_options, validate_content, ContentTemplate,
    SectionTemplate, TemplateValidation,
};
