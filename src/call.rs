//! Typed descriptors for cacheable analytics calls.

use crate::error::Error;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Default `period` for post dynamics.
pub const DEFAULT_DYNAMICS_PERIOD: &str = "24h";
/// Default `period` for top posts.
pub const DEFAULT_TOP_POSTS_PERIOD: &str = "today";
/// Default sort key for top posts.
pub const DEFAULT_TOP_POSTS_SORT: &str = "views";
/// Default `period` for engagement metrics.
pub const DEFAULT_ENGAGEMENT_PERIOD: &str = "7d";
/// Default `timeframe` for best posting time.
pub const DEFAULT_BEST_TIME_TIMEFRAME: &str = "week";

/// The cacheable analytics methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalyticsMethod {
    AnalyticsOverview,
    PostDynamics,
    TopPosts,
    EngagementMetrics,
    BestTime,
    AiRecommendations,
}

impl AnalyticsMethod {
    pub const ALL: [AnalyticsMethod; 6] = [
        AnalyticsMethod::AnalyticsOverview,
        AnalyticsMethod::PostDynamics,
        AnalyticsMethod::TopPosts,
        AnalyticsMethod::EngagementMetrics,
        AnalyticsMethod::BestTime,
        AnalyticsMethod::AiRecommendations,
    ];

    /// Method name used in cache keys and TTL lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsMethod::AnalyticsOverview => "getAnalyticsOverview",
            AnalyticsMethod::PostDynamics => "getPostDynamics",
            AnalyticsMethod::TopPosts => "getTopPosts",
            AnalyticsMethod::EngagementMetrics => "getEngagementMetrics",
            AnalyticsMethod::BestTime => "getBestTime",
            AnalyticsMethod::AiRecommendations => "getAIRecommendations",
        }
    }
}

impl fmt::Display for AnalyticsMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyticsMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalyticsMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::Other(format!("Unknown analytics method: {}", s)))
    }
}

/// One analytics request with every optional parameter resolved.
///
/// Constructors take `Option<&str>` for optional parameters and substitute the
/// documented default for `None`, so the cache sees the same arguments whether
/// the caller omitted a parameter or passed its default explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnalyticsCall {
    AnalyticsOverview {
        channel_id: String,
    },
    PostDynamics {
        channel_id: String,
        period: String,
    },
    TopPosts {
        channel_id: String,
        period: String,
        sort_by: String,
    },
    EngagementMetrics {
        channel_id: String,
        period: String,
    },
    BestTime {
        channel_id: String,
        timeframe: String,
    },
    AiRecommendations {
        channel_id: String,
    },
}

impl AnalyticsCall {
    pub fn overview(channel_id: &str) -> Self {
        AnalyticsCall::AnalyticsOverview {
            channel_id: channel_id.to_string(),
        }
    }

    pub fn post_dynamics(channel_id: &str, period: Option<&str>) -> Self {
        AnalyticsCall::PostDynamics {
            channel_id: channel_id.to_string(),
            period: period.unwrap_or(DEFAULT_DYNAMICS_PERIOD).to_string(),
        }
    }

    pub fn top_posts(channel_id: &str, period: Option<&str>, sort_by: Option<&str>) -> Self {
        AnalyticsCall::TopPosts {
            channel_id: channel_id.to_string(),
            period: period.unwrap_or(DEFAULT_TOP_POSTS_PERIOD).to_string(),
            sort_by: sort_by.unwrap_or(DEFAULT_TOP_POSTS_SORT).to_string(),
        }
    }

    pub fn engagement_metrics(channel_id: &str, period: Option<&str>) -> Self {
        AnalyticsCall::EngagementMetrics {
            channel_id: channel_id.to_string(),
            period: period.unwrap_or(DEFAULT_ENGAGEMENT_PERIOD).to_string(),
        }
    }

    pub fn best_time(channel_id: &str, timeframe: Option<&str>) -> Self {
        AnalyticsCall::BestTime {
            channel_id: channel_id.to_string(),
            timeframe: timeframe.unwrap_or(DEFAULT_BEST_TIME_TIMEFRAME).to_string(),
        }
    }

    pub fn ai_recommendations(channel_id: &str) -> Self {
        AnalyticsCall::AiRecommendations {
            channel_id: channel_id.to_string(),
        }
    }

    pub fn method(&self) -> AnalyticsMethod {
        match self {
            AnalyticsCall::AnalyticsOverview { .. } => AnalyticsMethod::AnalyticsOverview,
            AnalyticsCall::PostDynamics { .. } => AnalyticsMethod::PostDynamics,
            AnalyticsCall::TopPosts { .. } => AnalyticsMethod::TopPosts,
            AnalyticsCall::EngagementMetrics { .. } => AnalyticsMethod::EngagementMetrics,
            AnalyticsCall::BestTime { .. } => AnalyticsMethod::BestTime,
            AnalyticsCall::AiRecommendations { .. } => AnalyticsMethod::AiRecommendations,
        }
    }

    pub fn channel_id(&self) -> &str {
        match self {
            AnalyticsCall::AnalyticsOverview { channel_id }
            | AnalyticsCall::PostDynamics { channel_id, .. }
            | AnalyticsCall::TopPosts { channel_id, .. }
            | AnalyticsCall::EngagementMetrics { channel_id, .. }
            | AnalyticsCall::BestTime { channel_id, .. }
            | AnalyticsCall::AiRecommendations { channel_id } => channel_id,
        }
    }

    /// Positional argument list, in the order the adapter methods take them.
    pub fn args(&self) -> Vec<Value> {
        match self {
            AnalyticsCall::AnalyticsOverview { channel_id }
            | AnalyticsCall::AiRecommendations { channel_id } => vec![json!(channel_id)],
            AnalyticsCall::PostDynamics { channel_id, period }
            | AnalyticsCall::EngagementMetrics { channel_id, period } => {
                vec![json!(channel_id), json!(period)]
            }
            AnalyticsCall::TopPosts {
                channel_id,
                period,
                sort_by,
            } => vec![json!(channel_id), json!(period), json!(sort_by)],
            AnalyticsCall::BestTime {
                channel_id,
                timeframe,
            } => vec![json!(channel_id), json!(timeframe)],
        }
    }
}
