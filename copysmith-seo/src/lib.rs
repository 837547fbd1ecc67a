//! Copysmith SEO - keyword opportunity analysis
//!
//! Turns raw keyword, volume and competition data into a tiered opportunity
//! set, a recommended outline and a suggestion list.

pub mod alerts;
pub mod analyzer;
pub mod keywords;
pub mod scoring;
pub mod structure;

pub use alerts::{Notifier, OperatorAlert, OperatorAlerts, RecordedError, RecordingNotifier, TracingNotifier};
pub use analyzer::{AnalysisOutcome, FallbackKeywords, LimitedReport, OpportunityAnalyzer, OpportunityReport};
pub use keywords::{expand_keywords, modifiers_for};
pub use scoring::{partition, score, OpportunitySet, ScoredKeyword, Tier};
pub use structure::{
    build_structure, build_structure_for_year, generate_suggestions, recommended_length,
    ContentStructure, MainSection, Subsection, SuggestedContent, Suggestion, SuggestionPriority,
};
