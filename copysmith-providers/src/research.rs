//! Keyword research provider client
//!
//! Related-keyword lookups try the primary endpoint and then the fallback;
//! search-volume lookups are retried with a fixed pause. Both are cached.

use crate::transport::{HttpRequest, HttpTransport};
use crate::types::{ConnectionStatus, EndpointFailure, KeywordLookup, VolumeLookup};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use copysmith_core::{
    cache_key, config_error, get_typed, retry_when, set_typed, CacheStore, Competition,
    CopysmithError, CopysmithResult, KeywordCandidate, ResearchConfig, RetryConfig, DEFAULT_TTL,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROVIDER: &str = "research";

/// Provider status code for a successful task
pub const SUCCESS_STATUS: u64 = 20000;

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    status_code: Option<u64>,
    status_message: Option<String>,
    #[serde(default)]
    tasks: Option<Vec<Task>>,
}

#[derive(Debug, Deserialize)]
struct Task {
    #[serde(default)]
    result: Option<Vec<Value>>,
}

/// A related-keyword result entry; SERP results nest theirs under `items`
#[derive(Debug, Deserialize)]
struct RelatedEntry {
    keyword_data: Option<KeywordData>,
    #[serde(default)]
    items: Option<Vec<RelatedEntry>>,
}

#[derive(Debug, Deserialize)]
struct KeywordData {
    keyword: String,
    search_volume: Option<u64>,
    // Either a plain count or a per-month breakdown
    monthly_searches: Option<Value>,
    cpc: Option<f64>,
    competition_level: Option<String>,
}

impl KeywordData {
    fn into_candidate(self) -> KeywordCandidate {
        let volume = self
            .search_volume
            .or_else(|| self.monthly_searches.as_ref().and_then(Value::as_u64))
            .unwrap_or(0);
        let competition = self
            .competition_level
            .as_deref()
            .map(Competition::from_label)
            .unwrap_or_default();
        KeywordCandidate::new(self.keyword, volume, competition, self.cpc.unwrap_or(0.0))
    }
}

#[derive(Debug, Deserialize)]
struct VolumeEntry {
    keyword: String,
    search_volume: Option<u64>,
    // A label in some API versions, a 0..1 index in others
    competition: Option<Value>,
    competition_level: Option<String>,
    cpc: Option<f64>,
}

impl VolumeEntry {
    fn into_candidate(self) -> KeywordCandidate {
        let label = self
            .competition_level
            .or_else(|| self.competition.as_ref().and_then(|v| v.as_str().map(str::to_string)));
        let competition = label
            .as_deref()
            .map(Competition::from_label)
            .unwrap_or_default();
        KeywordCandidate::new(
            self.keyword,
            self.search_volume.unwrap_or(0),
            competition,
            self.cpc.unwrap_or(0.0),
        )
    }
}

fn collect_related(entry: RelatedEntry, out: &mut Vec<KeywordCandidate>) {
    if let Some(data) = entry.keyword_data {
        out.push(data.into_candidate());
    }
    for item in entry.items.unwrap_or_default() {
        collect_related(item, out);
    }
}

fn parse_related(results: Vec<Value>) -> Vec<KeywordCandidate> {
    let mut candidates = Vec::new();
    for value in results {
        match serde_json::from_value::<RelatedEntry>(value) {
            Ok(entry) => collect_related(entry, &mut candidates),
            Err(e) => debug!(error = %e, "Skipping unrecognised related-keyword entry"),
        }
    }
    candidates
}

fn parse_volumes(results: Vec<Value>) -> Vec<KeywordCandidate> {
    results
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<VolumeEntry>(value) {
            Ok(entry) => Some(entry.into_candidate()),
            Err(e) => {
                debug!(error = %e, "Skipping unrecognised search-volume entry");
                None
            }
        })
        .collect()
}

fn basic_auth(login: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{}:{}", login, password)))
}

/// Client for the keyword research provider
pub struct ResearchClient {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<dyn CacheStore>,
    config: ResearchConfig,
    retry: RetryConfig,
    cache_ttl: Duration,
}

impl ResearchClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn CacheStore>,
        config: ResearchConfig,
    ) -> Self {
        let retry = RetryConfig::fixed(config.max_attempts, config.retry_delay_ms);
        Self {
            transport,
            cache,
            config,
            retry,
            cache_ttl: DEFAULT_TTL,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    fn authorization(&self) -> CopysmithResult<String> {
        match (self.config.login.as_deref(), self.config.password.as_deref()) {
            (Some(login), Some(password)) if !login.is_empty() && !password.is_empty() => {
                Ok(basic_auth(login, password))
            }
            _ => Err(config_error!(
                "Research provider credentials are not configured",
                PROVIDER
            )),
        }
    }

    fn task_body(&self, field: &str, value: Value) -> Value {
        json!([{
            field: value,
            "location_name": self.config.location_name,
            "language_name": self.config.language_name,
            "device": self.config.device,
        }])
    }

    /// POST one task and return the first task's result entries
    async fn post_task(&self, url: &str, body: Value, auth: &str) -> CopysmithResult<Vec<Value>> {
        let request = HttpRequest::json(url, body).header("Authorization", auth);
        let response = self.transport.post(&request).await?;

        let envelope: TaskEnvelope = response.json().map_err(|e| {
            CopysmithError::provider(
                format!("Malformed response (HTTP {}): {}", response.status, e),
                PROVIDER,
                Some(response.status),
            )
        })?;

        if envelope.status_code != Some(SUCCESS_STATUS) {
            return Err(CopysmithError::provider(
                envelope
                    .status_message
                    .unwrap_or_else(|| "Unknown error".to_string()),
                PROVIDER,
                Some(response.status),
            ));
        }

        Ok(envelope
            .tasks
            .and_then(|tasks| tasks.into_iter().next())
            .and_then(|task| task.result)
            .unwrap_or_default())
    }

    /// Related keywords for `topic`, primary endpoint first
    ///
    /// Endpoint failures are collected in the returned lookup rather than
    /// raised; only missing credentials are an error.
    pub async fn fetch_keyword_data(&self, topic: &str) -> CopysmithResult<KeywordLookup> {
        let key = cache_key("related_keywords", &[topic]);
        if let Some(candidates) = get_typed::<Vec<KeywordCandidate>>(self.cache.as_ref(), &key).await {
            debug!(topic = topic, "Related keywords served from cache");
            return Ok(KeywordLookup {
                candidates,
                failures: Vec::new(),
                served_by: Some("cache".to_string()),
            });
        }

        let auth = self.authorization()?;
        let endpoints = [
            ("primary", self.config.primary_endpoint.as_str()),
            ("fallback", self.config.fallback_endpoint.as_str()),
        ];

        let mut failures = Vec::new();
        for (role, url) in endpoints {
            let body = self.task_body("keyword", json!(topic));
            match self.post_task(url, body, &auth).await {
                Ok(results) => {
                    let candidates = parse_related(results);
                    info!(
                        topic = topic,
                        endpoint = role,
                        count = candidates.len(),
                        "Fetched related keywords"
                    );
                    set_typed(self.cache.as_ref(), &key, &candidates, self.cache_ttl).await;
                    return Ok(KeywordLookup {
                        candidates,
                        failures,
                        served_by: Some(role.to_string()),
                    });
                }
                Err(e) => {
                    warn!(topic = topic, endpoint = role, error = %e, "Related keyword endpoint failed");
                    failures.push(EndpointFailure {
                        endpoint: role.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(KeywordLookup {
            candidates: Vec::new(),
            failures,
            served_by: None,
        })
    }

    /// Search volume for each of `keywords`
    ///
    /// Retried on transport and provider errors; exhaustion yields an
    /// unavailable lookup, which callers treat as "no data".
    pub async fn fetch_search_volume(&self, keywords: &[String]) -> CopysmithResult<VolumeLookup> {
        if keywords.is_empty() {
            return Ok(VolumeLookup::answered(Vec::new()));
        }

        let parts: Vec<&str> = keywords.iter().map(String::as_str).collect();
        let key = cache_key("search_volume", &parts);
        if let Some(cached) = get_typed::<Vec<KeywordCandidate>>(self.cache.as_ref(), &key).await {
            debug!(count = cached.len(), "Search volume served from cache");
            return Ok(VolumeLookup::answered(cached));
        }

        let auth = self.authorization()?;
        let result = retry_when(
            || self.search_volume_once(keywords, &auth),
            &self.retry,
            "search_volume",
            CopysmithError::is_recoverable,
        )
        .await;

        match result {
            Ok(candidates) => {
                set_typed(self.cache.as_ref(), &key, &candidates, self.cache_ttl).await;
                Ok(VolumeLookup::answered(candidates))
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Search volume unavailable, continuing without volume data");
                Ok(VolumeLookup::unavailable())
            }
            Err(e) => Err(e),
        }
    }

    async fn search_volume_once(
        &self,
        keywords: &[String],
        auth: &str,
    ) -> CopysmithResult<Vec<KeywordCandidate>> {
        let body = self.task_body("keywords", json!(keywords));
        let results = self
            .post_task(&self.config.search_volume_endpoint, body, auth)
            .await?;
        Ok(parse_volumes(results))
    }

    /// Probe the provider with the given credentials
    pub async fn test_connection(&self, login: &str, password: &str) -> ConnectionStatus {
        let body = self.task_body("keyword", json!("test"));
        match self
            .post_task(&self.config.primary_endpoint, body, &basic_auth(login, password))
            .await
        {
            Ok(_) => ConnectionStatus::ok(),
            Err(CopysmithError::Provider { message, .. }) => ConnectionStatus::failed(message),
            Err(e) => ConnectionStatus::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use copysmith_core::MemoryCache;

    fn ok_envelope(result: Value) -> Value {
        json!({
            "status_code": 20000,
            "status_message": "Ok.",
            "tasks": [{"result": result}]
        })
    }

    fn client(transport: Arc<ScriptedTransport>) -> ResearchClient {
        let config = ResearchConfig {
            login: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..ResearchConfig::default()
        };
        ResearchClient::new(transport, Arc::new(MemoryCache::new()), config)
            .with_retry(RetryConfig::fixed(3, 0))
    }

    #[test]
    fn test_basic_auth_header() {
        assert_eq!(basic_auth("user", "pass"), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_parse_related_handles_nested_items() {
        let results = vec![
            json!({"keyword_data": {"keyword": "a", "monthly_searches": 1200, "cpc": 1.5, "competition_level": "LOW"}}),
            json!({"items": [{"keyword_data": {"keyword": "b", "search_volume": 90}}, {"type": "organic"}]}),
            json!("garbage"),
        ];
        let candidates = parse_related(results);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].search_volume, 1200);
        assert_eq!(candidates[0].competition, Competition::Low);
        assert_eq!(candidates[1].term, "b");
        assert_eq!(candidates[1].competition, Competition::Unknown);
    }

    #[test]
    fn test_parse_volumes_accepts_label_or_index() {
        let results = vec![
            json!({"keyword": "x", "search_volume": 5000, "competition": "HIGH", "cpc": 2.5}),
            json!({"keyword": "y", "search_volume": null, "competition": 0.4, "cpc": null}),
        ];
        let candidates = parse_volumes(results);

        assert_eq!(candidates[0].competition, Competition::High);
        assert_eq!(candidates[1].search_volume, 0);
        assert_eq!(candidates[1].competition, Competition::Unknown);
    }

    #[tokio::test]
    async fn test_fallback_endpoint_used_when_primary_fails() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_json(200, json!({"status_code": 40501, "status_message": "Invalid field"}))
            .push_json(
                200,
                ok_envelope(json!([{"keyword_data": {"keyword": "laptop deals", "monthly_searches": 800}}])),
            );

        let research = client(transport.clone());
        let lookup = research.fetch_keyword_data("laptop").await.unwrap();

        assert_eq!(lookup.served_by.as_deref(), Some("fallback"));
        assert_eq!(lookup.failures.len(), 1);
        assert!(lookup.failures[0].message.contains("Invalid field"));
        assert_eq!(lookup.candidates[0].term, "laptop deals");

        let requests = transport.requests();
        assert_eq!(requests[0].url, research.config().primary_endpoint);
        assert_eq!(requests[1].url, research.config().fallback_endpoint);
        assert_eq!(requests[0].body[0]["keyword"], "laptop");
        assert_eq!(requests[0].header_value("authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[tokio::test]
    async fn test_both_endpoints_failing_reports_both() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_failure("timeout").push_failure("dns");

        let lookup = client(transport).fetch_keyword_data("laptop").await.unwrap();

        assert!(lookup.all_endpoints_failed());
        assert!(lookup.candidates.is_empty());
        assert_eq!(lookup.failure_lines().len(), 2);
        assert!(lookup.failure_lines()[1].starts_with("fallback: "));
    }

    #[tokio::test]
    async fn test_related_keywords_are_cached() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, ok_envelope(json!([])));

        let research = client(transport.clone());
        research.fetch_keyword_data("laptop").await.unwrap();
        let second = research.fetch_keyword_data("laptop").await.unwrap();

        assert_eq!(second.served_by.as_deref(), Some("cache"));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_credentials_is_configuration_error() {
        let transport = Arc::new(ScriptedTransport::new());
        let research = ResearchClient::new(
            transport.clone(),
            Arc::new(MemoryCache::new()),
            ResearchConfig::default(),
        );

        let err = research.fetch_keyword_data("laptop").await.unwrap_err();
        assert_eq!(err.kind(), "configuration");
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_search_volume_retries_then_gives_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_failure("reset")
            .push_failure("reset")
            .push_failure("reset");

        let research = client(transport.clone());
        let volumes = research
            .fetch_search_volume(&["laptop".to_string()])
            .await
            .unwrap();

        assert!(volumes.candidates.is_empty());
        assert!(!volumes.available);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_search_volume_recovers_on_second_attempt() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_failure("reset").push_json(
            200,
            ok_envelope(json!([{"keyword": "laptop", "search_volume": 20000, "competition": "LOW", "cpc": 3.1}])),
        );

        let research = client(transport.clone());
        let keywords = vec!["laptop".to_string(), "laptop review".to_string()];
        let volumes = research.fetch_search_volume(&keywords).await.unwrap();

        assert!(volumes.available);
        assert_eq!(volumes.candidates.len(), 1);
        assert_eq!(volumes.candidates[0].search_volume, 20000);
        assert_eq!(transport.requests()[1].body[0]["keywords"][1], "laptop review");
    }

    #[tokio::test]
    async fn test_connection_probe() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_json(200, ok_envelope(json!([])))
            .push_json(401, json!({"status_code": 40100, "status_message": "You are not authorized"}));

        let research = client(transport.clone());
        assert!(research.test_connection("u", "p").await.success);

        let failed = research.test_connection("u", "wrong").await;
        assert!(!failed.success);
        assert_eq!(failed.message, "You are not authorized");
        assert_eq!(transport.requests()[0].body[0]["keyword"], "test");
    }
}
