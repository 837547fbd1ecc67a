//! Integration tests for copysmith-core infrastructure

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use copysmith_core::{
    build_cache, cache_key, config_error, provider_error, retry_when, validation_error, AppConfig,
    CacheBackend, CacheConfig, CacheStore, CopysmithError, ErrorContext, RetryConfig,
    DEFAULT_TTL,
};

#[tokio::test]
async fn test_error_handling() {
    let error = provider_error!("quota exceeded", "research", 402);

    match &error {
        CopysmithError::Provider {
            message,
            provider,
            status,
            context,
        } => {
            assert_eq!(message, "quota exceeded");
            assert_eq!(provider, "research");
            assert_eq!(*status, Some(402));
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Provider error"),
    }

    // Should not panic
    error.log();
    assert!(error.is_recoverable());

    let transport = CopysmithError::Transport {
        message: "Connection refused".to_string(),
        source: None,
        context: ErrorContext::new("test"),
    };
    assert!(transport.is_recoverable());

    let config_err = config_error!("Missing API key", "test");
    assert!(!config_err.is_recoverable());
    assert_eq!(config_err.kind(), "configuration");
}

#[tokio::test]
async fn test_error_macros() {
    let validation_err = validation_error!("Topic is required", "topic", "validator");
    match validation_err {
        CopysmithError::Validation {
            message,
            field,
            context,
        } => {
            assert_eq!(message, "Topic is required");
            assert_eq!(field, Some("topic".to_string()));
            assert_eq!(context.component, "validator");
            assert!(!context.recovery_suggestions.is_empty());
        }
        _ => panic!("Expected Validation error"),
    }
}

#[tokio::test]
async fn test_retry_only_recoverable_errors() {
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<(), CopysmithError> = retry_when(
        || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(config_error!("no credentials", "research")) }
        },
        &RetryConfig::fixed(3, 0),
        "search_volume",
        CopysmithError::is_recoverable,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    attempts.store(0, Ordering::SeqCst);
    let result: Result<(), CopysmithError> = retry_when(
        || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(provider_error!("busy", "research")) }
        },
        &RetryConfig::fixed(3, 0),
        "search_volume",
        CopysmithError::is_recoverable,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_cache_built_from_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = CacheConfig {
        backend: CacheBackend::File,
        directory: Some(dir.path().to_path_buf()),
        ttl_secs: 60,
    };
    let cache: Arc<dyn CacheStore> = build_cache(&config);

    let key = cache_key("search_volume", &["laptop", "laptop review"]);
    cache.set(&key, json!([{"keyword": "laptop"}]), DEFAULT_TTL).await;
    assert!(cache.is_valid(&key).await);

    cache.set(&key, json!([]), Duration::ZERO).await;
    assert_eq!(cache.get(&key).await, None);
}

#[tokio::test]
async fn test_config_validation() {
    let mut config = AppConfig::default();
    assert!(config.validate().is_ok());

    config.generation.max_tokens = 0;
    let result = config.validate();

    match result.unwrap_err() {
        CopysmithError::Config { message, .. } => {
            assert!(message.contains("max_tokens"));
        }
        _ => panic!("Expected Config error"),
    }
}
