//! End-to-end provider flows over a routed scripted transport

use copysmith_core::{GenerationConfig, MemoryCache, ResearchConfig, RetryConfig};
use copysmith_providers::{
    GenerationClient, HttpResponse, ResearchClient, ScriptedReply, ScriptedTransport,
};
use serde_json::json;
use std::sync::Arc;

fn routed_transport() -> Arc<ScriptedTransport> {
    Arc::new(ScriptedTransport::with_responder(|request| {
        let body = if request.url.contains("anthropic") {
            json!({"content": [{"text": "## Overview\n\nGenerated."}]})
        } else if request.url.contains("serp") {
            json!({"status_code": 50000, "status_message": "Internal error"})
        } else if request.body[0].get("keywords").is_some() {
            json!({
                "status_code": 20000,
                "tasks": [{"result": [
                    {"keyword": "espresso machine", "search_volume": 12000, "competition": "LOW", "cpc": 2.4}
                ]}]
            })
        } else {
            json!({
                "status_code": 20000,
                "tasks": [{"result": [
                    {"keyword_data": {"keyword": "espresso machine under 200", "monthly_searches": 700, "competition_level": "MEDIUM", "cpc": 1.2}}
                ]}]
            })
        };
        ScriptedReply::Response(HttpResponse::new(200, body.to_string()))
    }))
}

#[tokio::test]
async fn test_research_and_generation_share_a_transport() {
    let transport = routed_transport();
    let research = ResearchClient::new(
        transport.clone(),
        Arc::new(MemoryCache::new()),
        ResearchConfig {
            login: Some("login".to_string()),
            password: Some("secret".to_string()),
            ..ResearchConfig::default()
        },
    )
    .with_retry(RetryConfig::fixed(3, 0));

    let lookup = research.fetch_keyword_data("espresso machine").await.unwrap();
    assert_eq!(lookup.served_by.as_deref(), Some("fallback"));
    assert_eq!(lookup.failures[0].endpoint, "primary");
    assert_eq!(lookup.candidates[0].term, "espresso machine under 200");

    let volumes = research
        .fetch_search_volume(&["espresso machine".to_string()])
        .await
        .unwrap();
    assert_eq!(volumes.candidates[0].search_volume, 12000);

    let generation = GenerationClient::new(
        transport.clone(),
        GenerationConfig {
            api_key: Some("key".to_string()),
            ..GenerationConfig::default()
        },
    );
    let text = generation.generate_text("Write about espresso").await.unwrap();
    assert!(text.starts_with("## Overview"));

    assert_eq!(transport.request_count(), 4);
}
