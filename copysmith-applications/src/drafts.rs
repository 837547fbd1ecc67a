//! Draft persistence for generated articles

use crate::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use copysmith_core::text::strip_tags;
use copysmith_core::GeneratedContent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    #[default]
    Draft,
}

/// An unpublished article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPost {
    pub id: String,
    pub title: String,
    pub status: DraftStatus,
    pub html: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

impl DraftPost {
    /// Draft titled after `topic` with markup removed
    pub fn new(topic: &str, content: &GeneratedContent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: strip_tags(topic).split_whitespace().collect::<Vec<_>>().join(" "),
            status: DraftStatus::Draft,
            html: content.html().to_string(),
            word_count: content.word_count(),
            created_at: Utc::now(),
        }
    }
}

/// Draft storage interface
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save(&self, draft: &DraftPost) -> ApplicationResult<()>;

    async fn load(&self, id: &str) -> ApplicationResult<Option<DraftPost>>;

    /// All drafts, newest first
    async fn list(&self) -> ApplicationResult<Vec<DraftPost>>;
}

/// One JSON file per draft
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    storage_dir: PathBuf,
}

impl FileDraftStore {
    pub fn new<P: AsRef<Path>>(storage_dir: P) -> ApplicationResult<Self> {
        let storage_dir = storage_dir.as_ref().to_path_buf();

        if !storage_dir.exists() {
            std::fs::create_dir_all(&storage_dir).map_err(ApplicationError::Io)?;
            info!("Created draft directory: {}", storage_dir.display());
        }

        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn draft_path(&self, id: &str) -> ApplicationResult<PathBuf> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ApplicationError::draft(format!("Invalid draft id: {}", id)));
        }
        Ok(self.storage_dir.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn save(&self, draft: &DraftPost) -> ApplicationResult<()> {
        let path = self.draft_path(&draft.id)?;
        let content = serde_json::to_string_pretty(draft)?;

        tokio::fs::write(&path, content).await?;

        debug!("Saved draft {} to {}", draft.id, path.display());
        Ok(())
    }

    async fn load(&self, id: &str) -> ApplicationResult<Option<DraftPost>> {
        let path = self.draft_path(id)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn list(&self) -> ApplicationResult<Vec<DraftPost>> {
        let mut drafts = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.storage_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            drafts.push(serde_json::from_str::<DraftPost>(&content)?);
        }

        drafts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(drafts)
    }
}

/// Keeps drafts in memory
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: Mutex<HashMap<String, DraftPost>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn drafts(&self) -> std::sync::MutexGuard<'_, HashMap<String, DraftPost>> {
        self.drafts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn save(&self, draft: &DraftPost) -> ApplicationResult<()> {
        self.drafts().insert(draft.id.clone(), draft.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> ApplicationResult<Option<DraftPost>> {
        Ok(self.drafts().get(id).cloned())
    }

    async fn list(&self) -> ApplicationResult<Vec<DraftPost>> {
        let mut drafts: Vec<DraftPost> = self.drafts().values().cloned().collect();
        drafts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(drafts)
    }
}
