//! Application context: configuration plus every shared collaborator
//!
//! Built once per process by the host and passed by reference to the
//! handlers. Tests swap the transports, cache, notifier and draft store.

use crate::drafts::{DraftStore, FileDraftStore};
use crate::ApplicationResult;
use copysmith_content::{ContentAssembler, EnhancedQualityScorer, QualityScorer};
use copysmith_core::{build_cache, AppConfig, CacheStore};
use copysmith_providers::{GenerationClient, HttpTransport, ReqwestTransport, ResearchClient};
use copysmith_seo::{Notifier, OpportunityAnalyzer, OperatorAlerts, TracingNotifier};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default location of saved drafts
pub fn default_drafts_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("copysmith")
        .join("drafts")
}

pub struct AppContext {
    pub(crate) config: AppConfig,
    pub(crate) cache: Arc<dyn CacheStore>,
    pub(crate) research: Arc<ResearchClient>,
    pub(crate) generation: Arc<GenerationClient>,
    pub(crate) analyzer: OpportunityAnalyzer,
    pub(crate) assembler: ContentAssembler,
    pub(crate) quality: QualityScorer,
    pub(crate) enhanced_quality: EnhancedQualityScorer,
    pub(crate) alerts: Arc<OperatorAlerts>,
    pub(crate) drafts: Arc<dyn DraftStore>,
}

impl AppContext {
    pub fn builder(config: AppConfig) -> AppContextBuilder {
        AppContextBuilder::new(config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn alerts(&self) -> &OperatorAlerts {
        &self.alerts
    }

    pub fn drafts(&self) -> &Arc<dyn DraftStore> {
        &self.drafts
    }
}

pub struct AppContextBuilder {
    config: AppConfig,
    research_transport: Option<Arc<dyn HttpTransport>>,
    generation_transport: Option<Arc<dyn HttpTransport>>,
    cache: Option<Arc<dyn CacheStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    drafts: Option<Arc<dyn DraftStore>>,
}

impl AppContextBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            research_transport: None,
            generation_transport: None,
            cache: None,
            notifier: None,
            drafts: None,
        }
    }

    /// Use one transport for both providers
    pub fn transport(self, transport: Arc<dyn HttpTransport>) -> Self {
        self.research_transport(transport.clone())
            .generation_transport(transport)
    }

    pub fn research_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.research_transport = Some(transport);
        self
    }

    pub fn generation_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.generation_transport = Some(transport);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn drafts(mut self, drafts: Arc<dyn DraftStore>) -> Self {
        self.drafts = Some(drafts);
        self
    }

    /// Validate the configuration and assemble the context
    ///
    /// Missing collaborators get their production defaults.
    pub fn build(self) -> ApplicationResult<AppContext> {
        let config = self.config;
        config.validate()?;

        let research_transport: Arc<dyn HttpTransport> = match self.research_transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(config.research.timeout_secs)?),
        };
        let generation_transport: Arc<dyn HttpTransport> = match self.generation_transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(config.generation.timeout_secs)?),
        };
        let cache = self.cache.unwrap_or_else(|| build_cache(&config.cache));
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(TracingNotifier),
        };
        let drafts: Arc<dyn DraftStore> = match self.drafts {
            Some(drafts) => drafts,
            None => Arc::new(FileDraftStore::new(default_drafts_dir())?),
        };

        let ttl = Duration::from_secs(config.cache.ttl_secs);
        let research = Arc::new(
            ResearchClient::new(research_transport, cache.clone(), config.research.clone())
                .with_cache_ttl(ttl),
        );
        let generation = Arc::new(GenerationClient::new(
            generation_transport,
            config.generation.clone(),
        ));
        let alerts = Arc::new(OperatorAlerts::new(notifier, &config.alerts));
        let analyzer = OpportunityAnalyzer::new(research.clone(), cache.clone(), alerts.clone())
            .with_cache_ttl(ttl);
        let assembler = ContentAssembler::new(generation.clone(), config.content.clone());
        let quality = QualityScorer::from_config(&config.content);
        let enhanced_quality = EnhancedQualityScorer::new(quality.clone(), generation.clone());

        info!(
            cache_backend = ?config.cache.backend,
            model = %config.generation.model,
            "Application context ready"
        );

        Ok(AppContext {
            config,
            cache,
            research,
            generation,
            analyzer,
            assembler,
            quality,
            enhanced_quality,
            alerts,
            drafts,
        })
    }
}
