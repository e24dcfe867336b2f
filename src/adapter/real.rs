//! Real adapter: backend REST calls with synthesized fallback on failure.

use super::{synth, AnalyticsAdapter};
use crate::call::AnalyticsCall;
use crate::error::{Error, Result};
use crate::payload::{AnalyticsPayload, HealthReport, PayloadSource};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Default timeout for backend requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend health statuses that count as healthy.
const HEALTHY_STATUSES: [&str; 4] = ["ok", "healthy", "up", "pass"];

/// Adapter backed by the analytics REST API.
///
/// Every analytics method succeeds: on a transport error, a non-success
/// status or a body that is not JSON, the failure is logged at `warn` and a
/// synthesized payload tagged [`PayloadSource::Fallback`] is returned instead.
/// [`health_check`](AnalyticsAdapter::health_check) reports such failures as
/// degraded health.
pub struct RealAdapter {
    client: Client,
    base_url: Url,
    fallback_rng: Mutex<StdRng>,
}

impl RealAdapter {
    /// Create an adapter for `base_url` with [`DEFAULT_HTTP_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create an adapter with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::ConfigError(format!("Invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigError(format!(
                "Base URL cannot carry a path: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(RealAdapter {
            client,
            base_url,
            fallback_rng: Mutex::new(StdRng::from_os_rng()),
        })
    }

    /// Seed the generator used for fallback payloads.
    pub fn with_fallback_seed(mut self, seed: u64) -> Self {
        self.fallback_rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::ConfigError(format!("Base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a route and unwrap the JSON body's `data` field.
    ///
    /// Bodies without a `data` field are returned whole. A null body or a
    /// null `data` field is a `MalformedResponse`.
    async fn fetch(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        debug!("» GET {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = response.json().await?;
        unwrap_data(body)
    }

    async fn fetch_or_fallback(&self, call: AnalyticsCall) -> Result<AnalyticsPayload> {
        let (segments, query) = route(&call);

        match self.fetch(&segments, &query).await {
            Ok(data) => Ok(AnalyticsPayload::live(data)),
            Err(e) => {
                warn!(
                    "⚠ {} failed for channel {}: {} - serving fallback data",
                    call.method(),
                    call.channel_id(),
                    e
                );
                let data = {
                    let mut rng = self
                        .fallback_rng
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    synth::synthesize(&mut *rng, &call)?
                };
                Ok(AnalyticsPayload::fallback(data))
            }
        }
    }
}

fn unwrap_data(body: Value) -> Result<Value> {
    let data = match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    };
    if data.is_null() {
        return Err(Error::MalformedResponse(
            "Response carries no data".to_string(),
        ));
    }
    Ok(data)
}

/// Backend route (path segments and query) for a call.
fn route(call: &AnalyticsCall) -> (Vec<&str>, Vec<(&'static str, &str)>) {
    match call {
        AnalyticsCall::AnalyticsOverview { channel_id } => (
            vec!["analytics", "historical", "overview", channel_id.as_str()],
            vec![],
        ),
        AnalyticsCall::PostDynamics { channel_id, period } => (
            vec!["analytics", "posts", "dynamics", "post-dynamics", channel_id.as_str()],
            vec![("period", period.as_str())],
        ),
        AnalyticsCall::TopPosts {
            channel_id,
            period,
            sort_by,
        } => (
            vec!["analytics", "posts", "dynamics", "top-posts", channel_id.as_str()],
            vec![("period", period.as_str()), ("sortBy", sort_by.as_str())],
        ),
        AnalyticsCall::EngagementMetrics { channel_id, period } => (
            vec!["analytics", "channels", channel_id.as_str(), "engagement"],
            vec![("period", period.as_str())],
        ),
        AnalyticsCall::BestTime {
            channel_id,
            timeframe,
        } => (
            vec!["analytics", "predictive", "best-times", channel_id.as_str()],
            vec![("timeframe", timeframe.as_str())],
        ),
        AnalyticsCall::AiRecommendations { channel_id } => {
            (vec!["ai", "recommendations", channel_id.as_str()], vec![])
        }
    }
}

#[async_trait]
impl AnalyticsAdapter for RealAdapter {
    fn name(&self) -> &'static str {
        "real"
    }

    async fn get_analytics_overview(&self, channel_id: &str) -> Result<AnalyticsPayload> {
        self.fetch_or_fallback(AnalyticsCall::overview(channel_id))
            .await
    }

    async fn get_post_dynamics(
        &self,
        channel_id: &str,
        period: &str,
    ) -> Result<AnalyticsPayload> {
        self.fetch_or_fallback(AnalyticsCall::post_dynamics(channel_id, Some(period)))
            .await
    }

    async fn get_top_posts(
        &self,
        channel_id: &str,
        period: &str,
        sort_by: &str,
    ) -> Result<AnalyticsPayload> {
        self.fetch_or_fallback(AnalyticsCall::top_posts(
            channel_id,
            Some(period),
            Some(sort_by),
        ))
        .await
    }

    async fn get_engagement_metrics(
        &self,
        channel_id: &str,
        period: &str,
    ) -> Result<AnalyticsPayload> {
        self.fetch_or_fallback(AnalyticsCall::engagement_metrics(channel_id, Some(period)))
            .await
    }

    async fn get_best_time(&self, channel_id: &str, timeframe: &str) -> Result<AnalyticsPayload> {
        self.fetch_or_fallback(AnalyticsCall::best_time(channel_id, Some(timeframe)))
            .await
    }

    async fn get_ai_recommendations(&self, channel_id: &str) -> Result<AnalyticsPayload> {
        self.fetch_or_fallback(AnalyticsCall::ai_recommendations(channel_id))
            .await
    }

    async fn health_check(&self) -> HealthReport {
        let body = match self.fetch(&["health"], &[]).await {
            Ok(body) => body,
            Err(e) => {
                warn!("⚠ Backend health check failed: {}", e);
                return HealthReport::degraded(PayloadSource::Api, e.to_string());
            }
        };

        // A reachable backend that reports itself unhealthy is still degraded
        let reported = body
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_ascii_lowercase);
        match reported {
            Some(status) if !HEALTHY_STATUSES.contains(&status.as_str()) => {
                warn!("⚠ Backend reports status {}", status);
                let mut report = HealthReport::degraded(
                    PayloadSource::Api,
                    format!("Backend reported status {}", status),
                );
                report.details = Some(body);
                report
            }
            _ => HealthReport::healthy(PayloadSource::Api, Some(body)),
        }
    }
}
