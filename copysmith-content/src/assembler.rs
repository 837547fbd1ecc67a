//! End-to-end article assembly: detect, prompt, generate, render

use crate::detect::detect_content_type;
use crate::prompt::build_prompt_with_length;
use crate::render::{render, DisclosureSettings};
use copysmith_core::{
    validation_error, ContentConfig, ContentType, CopysmithResult, FeatureSet, GeneratedContent,
};
use copysmith_providers::GenerationClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters of one article generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    /// Content type name; detected from the topic when empty
    #[serde(default)]
    pub content_type: String,
    /// Target length; the configured default applies when zero
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub features: FeatureSet,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    pub fn with_word_count(mut self, word_count: u32) -> Self {
        self.word_count = word_count;
        self
    }

    /// Explicit content type, falling back to detection and then to the default type
    pub fn resolved_content_type(&self) -> ContentType {
        let name = self.content_type.trim();
        if name.is_empty() {
            detect_content_type(&self.topic)
        } else {
            ContentType::from_name_or_default(name)
        }
    }
}

pub struct ContentAssembler {
    generation: Arc<GenerationClient>,
    content: ContentConfig,
}

impl ContentAssembler {
    pub fn new(generation: Arc<GenerationClient>, content: ContentConfig) -> Self {
        Self { generation, content }
    }

    pub fn content_config(&self) -> &ContentConfig {
        &self.content
    }

    /// Generate and render one article; provider failures propagate unchanged
    #[instrument(skip(self, request), fields(topic = %request.topic))]
    pub async fn generate(&self, request: &GenerationRequest) -> CopysmithResult<GeneratedContent> {
        if request.topic.trim().is_empty() {
            return Err(validation_error!("Topic is required", "topic", "assembler"));
        }

        let content_type = request.resolved_content_type();
        let word_count = if request.word_count > 0 {
            request.word_count
        } else {
            self.content.default_word_count
        };
        let prompt =
            build_prompt_with_length(&request.topic, content_type, &request.features, word_count);

        let raw = self.generation.generate_text(&prompt).await?;
        let html = render(&raw, &request.features, &DisclosureSettings::from(&self.content));
        let content = GeneratedContent::new(raw, html);

        info!(
            content_type = content_type.as_str(),
            word_count = content.word_count(),
            "Article generated"
        );
        Ok(content)
    }
}
