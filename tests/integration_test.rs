//! Integration tests for analytics-kit
//!
//! These tests drive the public service API against a local fake backend.

use analytics_kit::{
    AnalyticsCall, AnalyticsConfig, AnalyticsMethod, AnalyticsService, DataSourceMode,
    HealthState, PayloadSource, TtlPolicy,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Fake Backend
// ============================================================================

#[derive(Clone)]
struct Backend {
    hits: Arc<AtomicUsize>,
    health_status: &'static str,
}

async fn overview(State(backend): State<Backend>, Path(channel): Path<String>) -> Json<Value> {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "data": {
            "channel_id": channel,
            "subscribers": 1200,
            "total_views": 54000,
        }
    }))
}

async fn post_dynamics(
    State(backend): State<Backend>,
    Path(channel): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    // No `data` wrapper: the body is returned whole
    Json(json!({
        "channel_id": channel,
        "period": params.get("period"),
    }))
}

async fn health(State(backend): State<Backend>) -> Json<Value> {
    Json(json!({ "status": backend.health_status, "version": "test" }))
}

async fn spawn_backend(health_status: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = Backend {
        hits: hits.clone(),
        health_status,
    };

    let app = Router::new()
        .route("/analytics/historical/overview/{channel}", get(overview))
        .route(
            "/analytics/posts/dynamics/post-dynamics/{channel}",
            get(post_dynamics),
        )
        .route(
            "/analytics/posts/dynamics/top-posts/{channel}",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/analytics/predictive/best-times/{channel}",
            get(|| async { "<html>maintenance</html>" }),
        )
        .route(
            "/analytics/channels/{channel}/engagement",
            get(|| async { Json(json!({ "data": null })) }),
        )
        .route("/health", get(health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    (addr, hits)
}

fn api_service(addr: SocketAddr) -> AnalyticsService {
    let _ = env_logger::builder().is_test(true).try_init();
    AnalyticsService::new(
        AnalyticsConfig::default()
            .with_base_url(format!("http://{}", addr))
            .with_http_timeout(Duration::from_secs(5)),
    )
    .expect("Failed to build service")
}

fn mock_service() -> AnalyticsService {
    let _ = env_logger::builder().is_test(true).try_init();
    AnalyticsService::new(AnalyticsConfig::default().with_data_source(DataSourceMode::Mock))
        .expect("Failed to build service")
}

// ============================================================================
// Live Backend
// ============================================================================

#[tokio::test]
async fn test_live_response_is_cached() {
    let (addr, hits) = spawn_backend("ok").await;
    let service = api_service(addr);

    let first = service
        .get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");
    let second = service
        .get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");

    assert_eq!(first.source, PayloadSource::Api);
    assert_eq!(first.data["channel_id"], "demo");
    assert_eq!(first.data["subscribers"], 1200);
    assert_eq!(first, second);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let metrics = service.get_metrics();
    assert_eq!(metrics.requests, 2);
    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.fallbacks, 0);
}

#[tokio::test]
async fn test_default_period_is_sent_as_query() {
    let (addr, _) = spawn_backend("ok").await;
    let service = api_service(addr);

    let payload = service
        .get_post_dynamics("demo", None)
        .await
        .expect("Failed to fetch");

    assert_eq!(payload.source, PayloadSource::Api);
    assert_eq!(payload.data["period"], "24h");
}

#[tokio::test]
async fn test_server_error_serves_fallback() {
    let (addr, _) = spawn_backend("ok").await;
    let service = api_service(addr);

    let payload = service
        .get_top_posts("demo", None, Some("views"))
        .await
        .expect("Fallback must not fail");

    assert_eq!(payload.source, PayloadSource::Fallback);
    assert_eq!(payload.data.as_array().map(Vec::len), Some(10));

    let metrics = service.get_metrics();
    assert_eq!(metrics.fallbacks, 1);
    assert_eq!(metrics.errors, 0);
}

#[tokio::test]
async fn test_malformed_body_serves_fallback() {
    let (addr, _) = spawn_backend("ok").await;
    let service = api_service(addr);

    let payload = service
        .get_best_time("demo", None)
        .await
        .expect("Fallback must not fail");

    assert!(payload.is_fallback());
    assert_eq!(payload.data["channel_id"], "demo");
}

#[tokio::test]
async fn test_null_data_serves_fallback() {
    let (addr, _) = spawn_backend("ok").await;
    let service = api_service(addr);

    let payload = service
        .get_engagement_metrics("demo", None)
        .await
        .expect("Fallback must not fail");

    assert!(payload.is_fallback());
    assert_eq!(payload.data["channel_id"], "demo");
    assert_eq!(service.get_metrics().fallbacks, 1);
}

#[tokio::test]
async fn test_unknown_route_serves_fallback() {
    let (addr, _) = spawn_backend("ok").await;
    let service = api_service(addr);

    let payload = service
        .get_ai_recommendations("demo")
        .await
        .expect("Fallback must not fail");

    assert!(payload.is_fallback());
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_backend_status() {
    let (addr, _) = spawn_backend("ok").await;
    let service = api_service(addr);

    let health = service.health_check().await;

    assert_eq!(health.status, HealthState::Healthy);
    assert_eq!(health.data_source, DataSourceMode::Api);
    assert_eq!(
        health.adapter.details.as_ref().map(|d| d["version"].clone()),
        Some(json!("test"))
    );
}

#[tokio::test]
async fn test_health_degraded_when_backend_says_so() {
    let (addr, _) = spawn_backend("down").await;
    let service = api_service(addr);

    let health = service.health_check().await;

    assert_eq!(health.status, HealthState::Degraded);
    assert!(health.adapter.error.is_some());
}

#[tokio::test]
async fn test_health_serializes() {
    let service = mock_service();
    service
        .get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");

    let health = serde_json::to_value(service.health_check().await).expect("Failed to serialize");

    assert_eq!(health["status"], "healthy");
    assert_eq!(health["data_source"], "mock");
    assert_eq!(health["cache"]["size"], 1);
    assert_eq!(health["performance"]["error_rate"], "0.00%");
}

// ============================================================================
// Mock Mode And Switching
// ============================================================================

#[tokio::test]
async fn test_omitted_arguments_share_cache_with_defaults() {
    let service = mock_service();

    let first = service
        .get_top_posts("demo", Some("today"), Some("views"))
        .await
        .expect("Failed to fetch");
    let second = service
        .get_top_posts("demo", None, None)
        .await
        .expect("Failed to fetch");

    assert_eq!(first.source, PayloadSource::Mock);
    let views: Vec<u64> = first
        .data
        .as_array()
        .expect("Top posts is an array")
        .iter()
        .filter_map(|post| post["views"].as_u64())
        .collect();
    assert_eq!(views.len(), 10);
    assert!(views.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(first, second);
    assert_eq!(service.get_metrics().cache_hits, 1);
    assert_eq!(service.cache_stats().size, 1);
}

#[tokio::test]
async fn test_switch_changes_source_and_clears_cache() {
    let (addr, hits) = spawn_backend("ok").await;
    let service = api_service(addr);

    let live = service
        .get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");
    assert_eq!(live.source, PayloadSource::Api);

    service.switch_data_source(DataSourceMode::Mock).await;
    assert_eq!(service.cache_stats().size, 0);

    let mocked = service
        .get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");
    assert_eq!(mocked.source, PayloadSource::Mock);

    service.switch_data_source(DataSourceMode::Api).await;
    let live_again = service
        .get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");
    assert_eq!(live_again.source, PayloadSource::Api);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_method_ttl_expiry() {
    let _ = env_logger::builder().is_test(true).try_init();
    let service = AnalyticsService::new(
        AnalyticsConfig::default()
            .with_data_source(DataSourceMode::Mock)
            .with_ttl_policy(
                TtlPolicy::default().with_ttl(AnalyticsMethod::TopPosts, Duration::from_millis(100)),
            ),
    )
    .expect("Failed to build service");

    service
        .get_top_posts("demo", None, None)
        .await
        .expect("Failed to fetch");
    service
        .get_best_time("demo", None)
        .await
        .expect("Failed to fetch");
    tokio::time::sleep(Duration::from_millis(150)).await;

    let stats = service.cache_stats();
    assert_eq!(stats.size, 2);
    assert_eq!(stats.expired_entries, 1);

    service
        .get_top_posts("demo", None, None)
        .await
        .expect("Failed to fetch");
    service
        .get_best_time("demo", None)
        .await
        .expect("Failed to fetch");

    // Top posts expired, best time is still live
    assert_eq!(service.get_metrics().cache_hits, 1);
}

#[tokio::test]
async fn test_cache_stats_groups_by_method() {
    let service = mock_service();
    service
        .get_post_dynamics("a", Some("7d"))
        .await
        .expect("Failed to fetch");
    service
        .get_post_dynamics("b", None)
        .await
        .expect("Failed to fetch");
    service
        .get_engagement_metrics("a", None)
        .await
        .expect("Failed to fetch");

    let stats = service.cache_stats();

    assert_eq!(stats.size, 3);
    assert_eq!(stats.entries_by_method.get("getPostDynamics"), Some(&2));
    assert_eq!(stats.entries_by_method.get("getEngagementMetrics"), Some(&1));
    assert!(stats.keys.contains(&r#"getPostDynamics:["a","7d"]"#.to_string()));
}

#[tokio::test]
async fn test_performance_ratios() {
    let service = mock_service();
    assert_eq!(service.health_check().await.performance.cache_hit_rate, "0%");

    service
        .get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");
    service
        .get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");

    let performance = service.health_check().await.performance;
    assert_eq!(performance.cache_hit_rate, "50.00%");
    assert_eq!(performance.error_rate, "0.00%");
    assert!(performance.avg_response_time.ends_with("ms"));
}

#[tokio::test]
async fn test_refresh_single_call() {
    let service = mock_service();
    let call = AnalyticsCall::best_time("demo", None);
    service
        .execute(call.clone())
        .await
        .expect("Failed to fetch");

    let refreshed = service
        .refresh_cache(Some(call))
        .await
        .expect("Failed to refresh")
        .expect("Refresh of a call returns its payload");

    assert_eq!(refreshed.source, PayloadSource::Mock);
    assert_eq!(service.get_metrics().cache_hits, 0);
    assert_eq!(service.cache_stats().size, 1);
}

#[tokio::test]
async fn test_instances_share_nothing() {
    let a = mock_service();
    let b = mock_service();

    a.get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");
    b.switch_data_source(DataSourceMode::Api).await;

    assert_eq!(a.cache_stats().size, 1);
    assert_eq!(a.data_source().await, DataSourceMode::Mock);
    assert_eq!(b.get_metrics().requests, 0);
}

#[tokio::test]
async fn test_clones_share_state() {
    let service = mock_service();
    let clone = service.clone();

    clone
        .get_analytics_overview("demo")
        .await
        .expect("Failed to fetch");

    assert_eq!(service.cache_stats().size, 1);
    assert_eq!(service.get_metrics().requests, 1);
}
