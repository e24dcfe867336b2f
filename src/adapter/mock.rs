//! Mock adapter: synthesizes every payload locally, no network I/O.

use super::{synth, AnalyticsAdapter};
use crate::call::AnalyticsCall;
use crate::error::Result;
use crate::payload::{AnalyticsPayload, HealthReport, PayloadSource};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Adapter that always returns synthesized data tagged [`PayloadSource::Mock`].
///
/// # Example
///
/// ```
/// use analytics_kit::adapter::{AnalyticsAdapter, MockAdapter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> analytics_kit::Result<()> {
/// let adapter = MockAdapter::with_seed(42);
/// let payload = adapter.get_top_posts("demo", "today", "views").await?;
/// assert!(payload.data.is_array());
/// # Ok(())
/// # }
/// ```
pub struct MockAdapter {
    rng: Mutex<StdRng>,
    latency: Duration,
}

impl MockAdapter {
    /// Create a mock adapter seeded from the OS.
    pub fn new() -> Self {
        MockAdapter {
            rng: Mutex::new(StdRng::from_os_rng()),
            latency: Duration::ZERO,
        }
    }

    /// Create a mock adapter with reproducible output.
    pub fn with_seed(seed: u64) -> Self {
        MockAdapter {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency: Duration::ZERO,
        }
    }

    /// Delay every response, to exercise loading states against mock data.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn respond(&self, call: AnalyticsCall) -> Result<AnalyticsPayload> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let data = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            synth::synthesize(&mut *rng, &call)?
        };
        debug!("✓ Mock {} for channel {}", call.method(), call.channel_id());
        Ok(AnalyticsPayload::mock(data))
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalyticsAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_analytics_overview(&self, channel_id: &str) -> Result<AnalyticsPayload> {
        self.respond(AnalyticsCall::overview(channel_id)).await
    }

    async fn get_post_dynamics(
        &self,
        channel_id: &str,
        period: &str,
    ) -> Result<AnalyticsPayload> {
        self.respond(AnalyticsCall::post_dynamics(channel_id, Some(period)))
            .await
    }

    async fn get_top_posts(
        &self,
        channel_id: &str,
        period: &str,
        sort_by: &str,
    ) -> Result<AnalyticsPayload> {
        self.respond(AnalyticsCall::top_posts(
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
        self.respond(AnalyticsCall::engagement_metrics(channel_id, Some(period)))
            .await
    }

    async fn get_best_time(&self, channel_id: &str, timeframe: &str) -> Result<AnalyticsPayload> {
        self.respond(AnalyticsCall::best_time(channel_id, Some(timeframe)))
            .await
    }

    async fn get_ai_recommendations(&self, channel_id: &str) -> Result<AnalyticsPayload> {
        self.respond(AnalyticsCall::ai_recommendations(channel_id))
            .await
    }

    async fn health_check(&self) -> HealthReport {
        HealthReport::healthy(
            PayloadSource::Mock,
            Some(json!({ "message": "mock data source, no backend contacted" })),
        )
    }
}
