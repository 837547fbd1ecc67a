//! Outline and suggestion synthesis from an opportunity set

use crate::scoring::{OpportunitySet, ScoredKeyword};
use chrono::Datelike;
use copysmith_core::text::title_case;
use serde::{Deserialize, Serialize};

const KEY_POINTS: [&str; 5] = [
    "Main features and benefits",
    "Comparison with alternatives",
    "Expert opinions and analysis",
    "Real user experiences",
    "Pricing and value assessment",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedContent {
    pub recommended_length: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainSection {
    pub heading: String,
    pub target_keyword: String,
    pub search_volume: u64,
    pub suggested_content: SuggestedContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    pub heading: String,
    pub target_keyword: String,
    pub search_volume: u64,
}

/// Recommended document outline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStructure {
    pub recommended_title: String,
    pub main_sections: Vec<MainSection>,
    pub subsections: Vec<Subsection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub priority: SuggestionPriority,
}

/// Section length bucket for a keyword volume
pub fn recommended_length(volume: u64) -> &'static str {
    if volume > 10_000 {
        "2000-2500"
    } else if volume > 5_000 {
        "1500-2000"
    } else {
        "1000-1500"
    }
}

fn main_section(keyword: &ScoredKeyword) -> MainSection {
    let term = &keyword.keyword.term;
    MainSection {
        heading: title_case(term),
        target_keyword: term.clone(),
        search_volume: keyword.keyword.search_volume,
        suggested_content: SuggestedContent {
            recommended_length: recommended_length(keyword.keyword.search_volume).to_string(),
            key_points: KEY_POINTS.iter().map(|p| p.to_string()).collect(),
        },
    }
}

fn subsection(keyword: &ScoredKeyword) -> Subsection {
    Subsection {
        heading: title_case(&keyword.keyword.term),
        target_keyword: keyword.keyword.term.clone(),
        search_volume: keyword.keyword.search_volume,
    }
}

/// Outline for the current calendar year
pub fn build_structure(set: &OpportunitySet) -> ContentStructure {
    build_structure_for_year(set, chrono::Local::now().year())
}

/// Outline with `year` in the recommended title
pub fn build_structure_for_year(set: &OpportunitySet, year: i32) -> ContentStructure {
    let recommended_title = set
        .primary_keywords
        .first()
        .map(|k| format!("{}: Complete Guide [{}]", title_case(&k.keyword.term), year))
        .unwrap_or_default();

    ContentStructure {
        recommended_title,
        main_sections: set.primary_keywords.iter().map(main_section).collect(),
        subsections: set.secondary_keywords.iter().map(subsection).collect(),
    }
}

/// One high-priority suggestion per primary keyword, then one medium-priority
/// suggestion per secondary keyword
pub fn generate_suggestions(set: &OpportunitySet) -> Vec<Suggestion> {
    let primary = set.primary_keywords.iter().map(|k| Suggestion {
        kind: "primary_focus".to_string(),
        message: format!(
            "Focus on '{}' as main topic ({} monthly searches)",
            k.keyword.term, k.keyword.search_volume
        ),
        priority: SuggestionPriority::High,
    });
    let secondary = set.secondary_keywords.iter().map(|k| Suggestion {
        kind: "secondary_focus".to_string(),
        message: format!(
            "Include '{}' as supporting topic ({} monthly searches)",
            k.keyword.term, k.keyword.search_volume
        ),
        priority: SuggestionPriority::Medium,
    });
    primary.chain(secondary).collect()
}
