//! Payload envelope and the domain shapes synthesized by the mock adapter and
//! by the real adapter's fallback path.
//!
//! Backend responses are passed through as opaque JSON; only locally
//! synthesized data is built from the typed structs below.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where a payload came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadSource {
    /// Returned by the backend.
    Api,
    /// Synthesized by the mock adapter.
    Mock,
    /// Synthesized by the real adapter because the backend call failed.
    Fallback,
}

impl fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadSource::Api => write!(f, "api"),
            PayloadSource::Mock => write!(f, "mock"),
            PayloadSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Result of one analytics call: the opaque domain payload plus its origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsPayload {
    pub source: PayloadSource,
    pub data: Value,
}

impl AnalyticsPayload {
    /// Authoritative data from the backend.
    pub fn live(data: Value) -> Self {
        AnalyticsPayload {
            source: PayloadSource::Api,
            data,
        }
    }

    pub fn mock(data: Value) -> Self {
        AnalyticsPayload {
            source: PayloadSource::Mock,
            data,
        }
    }

    /// Locally synthesized stand-in for a failed backend call.
    pub fn fallback(data: Value) -> Self {
        AnalyticsPayload {
            source: PayloadSource::Fallback,
            data,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == PayloadSource::Fallback
    }
}

/// Backend health as seen by an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
}

/// Adapter-level health report. Degradation is data, never an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthState,
    pub source: PayloadSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Body returned by the backend health route, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl HealthReport {
    pub fn healthy(source: PayloadSource, details: Option<Value>) -> Self {
        HealthReport {
            status: HealthState::Healthy,
            source,
            error: None,
            details,
        }
    }

    pub fn degraded(source: PayloadSource, error: impl Into<String>) -> Self {
        HealthReport {
            status: HealthState::Degraded,
            source,
            error: Some(error.into()),
            details: None,
        }
    }
}

// ============================================================================
// Synthesized domain shapes
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelOverview {
    pub channel_id: String,
    pub subscribers: u64,
    pub subscriber_growth: i64,
    pub total_views: u64,
    pub posts_count: u64,
    pub avg_views_per_post: u64,
    /// Percent, 0-100.
    pub engagement_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicsPoint {
    /// Unix seconds.
    pub timestamp: u64,
    pub views: u64,
    pub reactions: u64,
    pub forwards: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostDynamics {
    pub channel_id: String,
    pub period: String,
    pub points: Vec<DynamicsPoint>,
    pub total_views: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopPost {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub views: u64,
    pub reactions: u64,
    pub forwards: u64,
    pub comments: u64,
    pub engagement_rate: f64,
    /// Unix seconds.
    pub published_at: u64,
}

impl TopPost {
    /// Value of a sort key. Unknown keys sort by views.
    pub fn metric(&self, sort_by: &str) -> u64 {
        match sort_by {
            "reactions" => self.reactions,
            "forwards" => self.forwards,
            "comments" => self.comments,
            _ => self.views,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub channel_id: String,
    pub period: String,
    /// Percent, 0-100.
    pub engagement_rate: f64,
    /// Percent of subscribers reached per post.
    pub reach_rate: f64,
    pub avg_reactions: f64,
    pub avg_comments: f64,
    pub avg_forwards: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: String,
    /// Hour of day, 0-23 UTC.
    pub hour: u8,
    /// 0.0-1.0.
    pub confidence: f64,
    pub avg_engagement: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestTime {
    pub channel_id: String,
    pub timeframe: String,
    pub timezone: String,
    pub best_times: Vec<TimeSlot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    /// 0.0-1.0.
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendations {
    pub channel_id: String,
    pub recommendations: Vec<Recommendation>,
}
