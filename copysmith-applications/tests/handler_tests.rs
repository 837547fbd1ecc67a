//! Handlers driven end to end through scripted providers

use copysmith_applications::{
    AppContext, ConnectionCredentials, DraftStatus, DraftStore, FileDraftStore, MemoryDraftStore,
    Response, Service,
};
use copysmith_content::GenerationRequest;
use copysmith_core::{AppConfig, CacheStore, MemoryCache, FEATURE_COMPARISON_TABLE};
use copysmith_providers::{HttpResponse, ScriptedReply, ScriptedTransport};
use copysmith_seo::RecordingNotifier;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.generation.api_key = Some("sk-test".to_string());
    config.research.login = Some("login".to_string());
    config.research.password = Some("password".to_string());
    config.research.retry_delay_ms = 0;
    config
}

fn reply(body: Value) -> ScriptedReply {
    ScriptedReply::Response(HttpResponse::new(200, body.to_string()))
}

fn research_down() -> ScriptedTransport {
    ScriptedTransport::with_responder(|_| {
        reply(json!({"status_code": 40000, "status_message": "Service unavailable"}))
    })
}

fn research_up() -> ScriptedTransport {
    ScriptedTransport::with_responder(|request| {
        if request.body[0].get("keywords").is_some() {
            reply(json!({
                "status_code": 20000,
                "tasks": [{"result": [
                    {"keyword": "test keyword review", "search_volume": 12000, "competition": "LOW", "cpc": 1.5}
                ]}]
            }))
        } else {
            reply(json!({
                "status_code": 20000,
                "tasks": [{"result": [
                    {"keyword_data": {"keyword": "test keyword tips", "search_volume": 900, "competition_level": "HIGH", "cpc": 0.2}}
                ]}]
            }))
        }
    })
}

struct Harness {
    context: AppContext,
    generation: Arc<ScriptedTransport>,
    notifier: Arc<RecordingNotifier>,
    drafts: Arc<MemoryDraftStore>,
}

fn harness(config: AppConfig, research: ScriptedTransport) -> Harness {
    let generation = Arc::new(ScriptedTransport::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let drafts = Arc::new(MemoryDraftStore::new());
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());

    let context = AppContext::builder(config)
        .research_transport(Arc::new(research))
        .generation_transport(generation.clone())
        .cache(cache)
        .notifier(notifier.clone())
        .drafts(drafts.clone())
        .build()
        .unwrap();

    Harness {
        context,
        generation,
        notifier,
        drafts,
    }
}

#[tokio::test]
async fn test_generate_saves_draft_to_disk() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileDraftStore::new(temp_dir.path()).unwrap());
    let generation = Arc::new(ScriptedTransport::new());
    generation.push_json(
        200,
        json!({"content": [{"text": "## Overview\n\nTwo great e-readers.\n\nA | B\n---|---\n1 | 2"}]}),
    );

    let context = AppContext::builder(config())
        .transport(generation.clone())
        .cache(Arc::new(MemoryCache::new()))
        .drafts(store.clone())
        .build()
        .unwrap();

    let request = GenerationRequest::new("Kindle vs Kobo").with_feature(FEATURE_COMPARISON_TABLE);
    let response = context.generate(&request).await;

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["word_count"], 8);

    let payload = response.success().unwrap();
    assert!(payload.content.contains("<table class=\"comparison-table\">"));

    let draft = store
        .load(payload.draft_id.as_deref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draft.title, "Kindle vs Kobo");
    assert_eq!(draft.status, DraftStatus::Draft);
    assert_eq!(draft.html, payload.content);
}

#[tokio::test]
async fn test_generation_failure_is_error_envelope() {
    let h = harness(config(), research_up());
    h.generation
        .push_json(401, json!({"error": {"message": "invalid x-api-key"}}));

    let response = h.context.generate(&GenerationRequest::new("Kindle review")).await;

    let body = response.error_body().unwrap();
    assert_eq!(body.kind, "provider");
    assert!(body.message.contains("invalid x-api-key"));
    assert!(h.drafts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_degrades_to_limited() {
    let h = harness(config(), research_down());

    let response = h.context.analyze("air fryer", "product_review").await;
    assert_eq!(response.status(), "limited");

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["keywords"]["primary"], json!(["air fryer"]));
    assert_eq!(h.notifier.count(), 1);
    assert!(h.context.alerts().last_error().is_some());
}

#[tokio::test]
async fn test_analyze_without_credentials_is_configuration_error() {
    let mut config = config();
    config.research.login = None;
    let h = harness(config, research_up());

    let response = h.context.analyze("air fryer", "product_review").await;
    assert_eq!(response.error_body().unwrap().kind, "configuration");
}

#[tokio::test]
async fn test_detect_and_quality() {
    let h = harness(config(), research_up());

    let detected = h.context.detect("iPhone vs Samsung").success().unwrap();
    assert_eq!(detected.content_type, "product_comparison");
    assert_eq!(h.context.detect(" ").status(), "error");

    let empty = h.context.quality("   ");
    assert_eq!(empty.error_body().unwrap().kind, "validation");

    let report = h
        .context
        .quality("<h2>Intro</h2><p>Short.</p><div>This post may contain affiliate links.</div>")
        .success()
        .unwrap();
    assert!(report.affiliate_optimization.disclosure_present);
}

#[tokio::test]
async fn test_template_options_and_section_check() {
    let h = harness(config(), research_up());

    let options = h.context.template("product_review", None).success().unwrap();
    assert_eq!(options.options.get("user_reviews"), Some(&true));
    assert_eq!(options.options.get("faq_section"), Some(&false));
    assert!(options.validation.is_none());

    let draft = "## Introduction\nHello\n\n## Final Verdict\nBuy it";
    let checked = h.context.template("product_review", Some(draft)).success().unwrap();
    let validation = checked.validation.unwrap();
    assert!(!validation.is_valid);
    assert_eq!(validation.missing_sections.len(), 4);
    assert_eq!(validation.missing_sections[0], "Product Details");

    let compared = h
        .context
        .template("comparison", Some("## Overview\nTwo kettles"))
        .success()
        .unwrap();
    assert!(compared.validation.unwrap().is_valid);

    assert_eq!(h.context.template(" ", None).error_body().unwrap().kind, "validation");
    assert_eq!(h.context.template("product_review", Some("  ")).status(), "error");
}

#[tokio::test]
async fn test_enhanced_quality_survives_provider_failure() {
    let h = harness(config(), research_up());
    h.generation.push_failure("connection reset");

    let response = h.context.enhanced_quality("<p>The best kettle you can buy.</p>").await;

    let report = response.success().unwrap();
    assert!(report.ai_analysis.error.is_some());
    assert_eq!(report.buyer_intent.purchase_intent, 1);
}

#[tokio::test]
async fn test_connection_checks() {
    let mut config = config();
    config.research.login = None;
    config.research.password = None;
    let h = harness(config, research_up());
    h.generation.push_json(200, json!({"content": [{"text": "ok"}]}));

    let generation = h
        .context
        .test_connection(Service::Generation, &ConnectionCredentials::default())
        .await;
    assert_eq!(
        generation.success().unwrap().message,
        "API connection successful"
    );

    let research = h
        .context
        .test_connection(Service::Research, &ConnectionCredentials::default())
        .await;
    assert_eq!(research.error_body().unwrap().kind, "configuration");

    let supplied = ConnectionCredentials {
        login: Some("user".to_string()),
        password: Some("secret".to_string()),
        ..ConnectionCredentials::default()
    };
    let research = h.context.test_connection(Service::Research, &supplied).await;
    assert!(research.is_success());
}

#[tokio::test]
async fn test_self_test_reports_each_check() {
    let h = harness(config(), research_up());
    let report = h.context.self_test().await.success().unwrap();
    assert!(report.cache.passed);
    assert!(report.analysis.passed, "{}", report.analysis.message);
    assert!(report.all_passed());
    assert!(!h.context.cache().is_valid("copysmith_self_test").await);

    let degraded = harness(config(), research_down());
    let report = degraded.context.self_test().await.success().unwrap();
    assert!(report.cache.passed);
    assert!(!report.analysis.passed);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = config();
    config.generation.max_tokens = 0;

    let result = AppContext::builder(config)
        .transport(Arc::new(ScriptedTransport::new()))
        .drafts(Arc::new(MemoryDraftStore::new()))
        .build();

    match result {
        Err(e) => assert_eq!(e.kind(), "configuration"),
        Ok(_) => panic!("Expected configuration error"),
    }
}

#[test]
fn test_response_status_names() {
    let response: Response<()> = Response::Success(());
    assert_eq!(response.status(), "success");
}
