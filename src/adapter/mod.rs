//! Analytics adapters.
//!
//! Two interchangeable implementations of the same capability set:
//! [`RealAdapter`] calls the backend over HTTP and substitutes synthesized
//! fallback data when the call fails; [`MockAdapter`] always synthesizes.
//! The service picks one per call according to its
//! [`DataSourceMode`](crate::source::DataSourceMode).

use crate::call::AnalyticsCall;
use crate::error::Result;
use crate::payload::{AnalyticsPayload, HealthReport};
use async_trait::async_trait;

pub mod mock;
pub mod real;
pub mod synth;

pub use mock::MockAdapter;
pub use real::RealAdapter;

/// Capability set shared by the real and mock adapters.
///
/// Optional parameters arrive already default-filled (see
/// [`AnalyticsCall`]). Implementations are expected to absorb backend
/// failures themselves; an `Err` reaching the service is treated as a
/// programming error and counted in the `errors` metric.
///
/// The trait is object safe so the service can hold adapters as
/// `Arc<dyn AnalyticsAdapter>` and swap in test doubles.
#[async_trait]
pub trait AnalyticsAdapter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn get_analytics_overview(&self, channel_id: &str) -> Result<AnalyticsPayload>;

    async fn get_post_dynamics(&self, channel_id: &str, period: &str)
        -> Result<AnalyticsPayload>;

    async fn get_top_posts(
        &self,
        channel_id: &str,
        period: &str,
        sort_by: &str,
    ) -> Result<AnalyticsPayload>;

    async fn get_engagement_metrics(
        &self,
        channel_id: &str,
        period: &str,
    ) -> Result<AnalyticsPayload>;

    async fn get_best_time(&self, channel_id: &str, timeframe: &str) -> Result<AnalyticsPayload>;

    async fn get_ai_recommendations(&self, channel_id: &str) -> Result<AnalyticsPayload>;

    /// Backend health. Never fails: problems are reported as
    /// [`HealthState::Degraded`](crate::payload::HealthState::Degraded).
    async fn health_check(&self) -> HealthReport;

    /// Dispatch a typed call to the matching capability method.
    async fn invoke(&self, call: &AnalyticsCall) -> Result<AnalyticsPayload> {
        match call {
            AnalyticsCall::AnalyticsOverview { channel_id } => {
                self.get_analytics_overview(channel_id).await
            }
            AnalyticsCall::PostDynamics { channel_id, period } => {
                self.get_post_dynamics(channel_id, period).await
            }
            AnalyticsCall::TopPosts {
                channel_id,
                period,
                sort_by,
            } => self.get_top_posts(channel_id, period, sort_by).await,
            AnalyticsCall::EngagementMetrics { channel_id, period } => {
                self.get_engagement_metrics(channel_id, period).await
            }
            AnalyticsCall::BestTime {
                channel_id,
                timeframe,
            } => self.get_best_time(channel_id, timeframe).await,
            AnalyticsCall::AiRecommendations { channel_id } => {
                self.get_ai_recommendations(channel_id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PayloadSource;

    #[tokio::test]
    async fn test_invoke_dispatches_to_matching_method() {
        let adapter = MockAdapter::with_seed(7);

        let payload = adapter
            .invoke(&AnalyticsCall::engagement_metrics("c1", Some("30d")))
            .await
            .expect("mock never fails");

        assert_eq!(payload.source, PayloadSource::Mock);
        assert_eq!(payload.data["channel_id"], "c1");
        assert_eq!(payload.data["period"], "30d");
    }

    #[tokio::test]
    async fn test_adapters_are_object_safe() {
        let adapters: Vec<Box<dyn AnalyticsAdapter>> = vec![
            Box::new(MockAdapter::new()),
            Box::new(RealAdapter::new("http://127.0.0.1:1").expect("valid url")),
        ];
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["mock", "real"]);
    }
}
