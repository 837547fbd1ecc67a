//! Generation prompt construction

use crate::templates::outline_skeleton;
use copysmith_core::{ContentType, FeatureSet, FEATURE_COMPARISON_TABLE};

const AUTHORING_INSTRUCTIONS: &str = "\nAdditional requirements:\n\
- Use clear and engaging language\n\
- Include specific examples and evidence\n\
- Add natural affiliate opportunities where relevant\n\
- Use proper headings with ## for main sections\n";

const TABLE_INSTRUCTIONS: &str = "\nFor comparison tables, use this exact format:\n\
Feature | Option A | Option B\n\
---|---|---\n\
Feature 1 | Detail A1 | Detail B1\n";

/// Prompt for an article about `topic`
pub fn build_prompt(topic: &str, content_type: ContentType, features: &FeatureSet) -> String {
    build_prompt_with_length(topic, content_type, features, 0)
}

/// Prompt with a target length line when `word_count` is positive
pub fn build_prompt_with_length(
    topic: &str,
    content_type: ContentType,
    features: &FeatureSet,
    word_count: u32,
) -> String {
    let mut prompt = format!(
        "Write a detailed {} about {}.\n\n",
        content_type.display_name().to_lowercase(),
        topic.trim()
    );
    prompt.push_str("Use this structure:\n");
    prompt.push_str(outline_skeleton(content_type));
    prompt.push('\n');
    prompt.push_str(AUTHORING_INSTRUCTIONS);

    if word_count > 0 {
        prompt.push_str(&format!("- Aim for approximately {} words\n", word_count));
    }

    if features.contains(FEATURE_COMPARISON_TABLE) {
        prompt.push_str(TABLE_INSTRUCTIONS);
    }

    prompt
}
