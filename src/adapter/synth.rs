//! Local synthesis of analytics payloads.
//!
//! Shared by the mock adapter and by the real adapter's fallback path, so both
//! produce the same shapes. Values are pseudo-random but kept inside
//! plausible ranges.

use crate::call::AnalyticsCall;
use crate::error::Result;
use crate::payload::{
    AiRecommendations, BestTime, ChannelOverview, DynamicsPoint, EngagementMetrics, PostDynamics,
    Recommendation, TimeSlot, TopPost,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

/// Number of posts in a synthesized top-posts list.
pub const TOP_POSTS_LEN: usize = 10;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const RECOMMENDATION_POOL: [(&str, &str, &str); 6] = [
    (
        "timing",
        "Shift posts to peak hours",
        "Engagement is highest in the evening; schedule key posts between 18:00 and 21:00.",
    ),
    (
        "content",
        "Use more media posts",
        "Posts with images or video collect noticeably more reactions than text-only posts.",
    ),
    (
        "frequency",
        "Keep a steady posting rhythm",
        "Channels posting 2-4 times a day retain subscribers better than bursty schedules.",
    ),
    (
        "engagement",
        "Ask questions in posts",
        "Posts ending with a question receive more comments and forwards.",
    ),
    (
        "growth",
        "Cross-promote with similar channels",
        "Mutual mentions with channels of similar size are the cheapest growth source.",
    ),
    (
        "content",
        "Shorten long posts",
        "Posts under 1000 characters have higher read-through rates.",
    ),
];

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Number of points and spacing (seconds) of a dynamics series for a period.
pub fn series_shape(period: &str) -> (usize, u64) {
    match period {
        "7d" | "week" => (42, 4 * HOUR),
        "30d" | "month" => (30, DAY),
        "90d" | "quarter" => (90, DAY),
        _ => (24, HOUR),
    }
}

pub fn overview<R: Rng>(rng: &mut R, channel_id: &str) -> ChannelOverview {
    let subscribers = rng.random_range(1_000..250_000u64);
    let posts_count = rng.random_range(50..2_000u64);
    let avg_views_per_post = rng.random_range(500..50_000u64);

    ChannelOverview {
        channel_id: channel_id.to_string(),
        subscribers,
        subscriber_growth: rng.random_range(-200..1_500i64),
        total_views: posts_count * avg_views_per_post,
        posts_count,
        avg_views_per_post,
        engagement_rate: round2(rng.random_range(2.0..12.0)),
    }
}

pub fn post_dynamics<R: Rng>(rng: &mut R, channel_id: &str, period: &str) -> PostDynamics {
    let (len, step) = series_shape(period);
    let end = now_secs();
    let start = end.saturating_sub(step * len as u64);
    let base = rng.random_range(800.0..3_000.0);

    let points: Vec<DynamicsPoint> = (0..len)
        .map(|i| {
            let views = (base * rng.random_range(0.7..1.3)) as u64;
            DynamicsPoint {
                timestamp: start + step * (i as u64 + 1),
                views,
                reactions: (views as f64 * rng.random_range(0.01..0.08)) as u64,
                forwards: (views as f64 * rng.random_range(0.002..0.02)) as u64,
            }
        })
        .collect();

    PostDynamics {
        channel_id: channel_id.to_string(),
        period: period.to_string(),
        total_views: points.iter().map(|p| p.views).sum(),
        points,
    }
}

/// Top posts, sorted descending by `sort_by` (unknown keys sort by views).
pub fn top_posts<R: Rng>(
    rng: &mut R,
    channel_id: &str,
    period: &str,
    sort_by: &str,
) -> Vec<TopPost> {
    let (len, step) = series_shape(period);
    let now = now_secs();
    let window = step * len as u64;

    let mut posts: Vec<TopPost> = (0..TOP_POSTS_LEN)
        .map(|i| {
            let views = rng.random_range(500..50_000u64);
            let reactions = (views as f64 * rng.random_range(0.01..0.08)) as u64;
            let forwards = (views as f64 * rng.random_range(0.002..0.02)) as u64;
            let comments = (views as f64 * rng.random_range(0.001..0.01)) as u64;
            TopPost {
                id: format!("{}-{}", channel_id, i + 1),
                channel_id: channel_id.to_string(),
                title: format!("Post #{}", i + 1),
                views,
                reactions,
                forwards,
                comments,
                engagement_rate: round2(
                    (reactions + forwards + comments) as f64 / views as f64 * 100.0,
                ),
                published_at: now.saturating_sub(rng.random_range(0..window.max(1))),
            }
        })
        .collect();

    posts.sort_by(|a, b| b.metric(sort_by).cmp(&a.metric(sort_by)));
    posts
}

pub fn engagement<R: Rng>(rng: &mut R, channel_id: &str, period: &str) -> EngagementMetrics {
    EngagementMetrics {
        channel_id: channel_id.to_string(),
        period: period.to_string(),
        engagement_rate: round2(rng.random_range(2.0..12.0)),
        reach_rate: round2(rng.random_range(15.0..65.0)),
        avg_reactions: round2(rng.random_range(10.0..900.0)),
        avg_comments: round2(rng.random_range(1.0..120.0)),
        avg_forwards: round2(rng.random_range(2.0..300.0)),
    }
}

/// Three distinct slots, highest confidence first.
pub fn best_time<R: Rng>(rng: &mut R, channel_id: &str, timeframe: &str) -> BestTime {
    let mut days = WEEKDAYS;
    days.shuffle(rng);

    let mut best_times: Vec<TimeSlot> = days
        .iter()
        .take(3)
        .map(|day| TimeSlot {
            day: day.to_string(),
            hour: rng.random_range(0..24u8),
            confidence: round2(rng.random_range(0.5..0.95)),
            avg_engagement: round2(rng.random_range(2.0..12.0)),
        })
        .collect();
    best_times.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    BestTime {
        channel_id: channel_id.to_string(),
        timeframe: timeframe.to_string(),
        timezone: "UTC".to_string(),
        best_times,
    }
}

/// Three to five recommendations, highest priority first.
pub fn recommendations<R: Rng>(rng: &mut R, channel_id: &str) -> AiRecommendations {
    let mut pool = RECOMMENDATION_POOL;
    pool.shuffle(rng);
    let count = rng.random_range(3..=5usize);

    let recommendations = pool
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, (category, title, description))| Recommendation {
            category: category.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            priority: match i {
                0 => "high",
                1 | 2 => "medium",
                _ => "low",
            }
            .to_string(),
            confidence: round2(rng.random_range(0.6..0.95)),
        })
        .collect();

    AiRecommendations {
        channel_id: channel_id.to_string(),
        recommendations,
    }
}

/// Synthesize the payload for any call, as JSON.
pub fn synthesize<R: Rng>(rng: &mut R, call: &AnalyticsCall) -> Result<Value> {
    let value = match call {
        AnalyticsCall::AnalyticsOverview { channel_id } => {
            serde_json::to_value(overview(rng, channel_id))?
        }
        AnalyticsCall::PostDynamics { channel_id, period } => {
            serde_json::to_value(post_dynamics(rng, channel_id, period))?
        }
        AnalyticsCall::TopPosts {
            channel_id,
            period,
            sort_by,
        } => serde_json::to_value(top_posts(rng, channel_id, period, sort_by))?,
        AnalyticsCall::EngagementMetrics { channel_id, period } => {
            serde_json::to_value(engagement(rng, channel_id, period))?
        }
        AnalyticsCall::BestTime {
            channel_id,
            timeframe,
        } => serde_json::to_value(best_time(rng, channel_id, timeframe))?,
        AnalyticsCall::AiRecommendations { channel_id } => {
            serde_json::to_value(recommendations(rng, channel_id))?
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_overview_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let o = overview(&mut rng, "c1");
            assert!((2.0..=12.0).contains(&o.engagement_rate));
            assert_eq!(o.total_views, o.posts_count * o.avg_views_per_post);
        }
    }

    #[test]
    fn test_post_dynamics_series_is_ordered() {
        let mut rng = StdRng::seed_from_u64(2);
        let d = post_dynamics(&mut rng, "c1", "7d");
        assert_eq!(d.points.len(), 42);
        assert!(d.points.windows(2).all(|w| w[1].timestamp - w[0].timestamp == 4 * HOUR));
        assert_eq!(d.total_views, d.points.iter().map(|p| p.views).sum::<u64>());
    }

    #[test]
    fn test_series_shape_unknown_period() {
        assert_eq!(series_shape("24h"), (24, HOUR));
        assert_eq!(series_shape("whenever"), (24, HOUR));
        assert_eq!(series_shape("30d"), (30, DAY));
    }

    #[test]
    fn test_top_posts_sorted_by_requested_key() {
        let mut rng = StdRng::seed_from_u64(3);
        for key in ["views", "reactions", "forwards", "comments"] {
            let posts = top_posts(&mut rng, "demo", "today", key);
            assert_eq!(posts.len(), TOP_POSTS_LEN);
            assert!(posts
                .windows(2)
                .all(|w| w[0].metric(key) >= w[1].metric(key)));
        }
    }

    #[test]
    fn test_best_time_slots() {
        let mut rng = StdRng::seed_from_u64(4);
        let b = best_time(&mut rng, "c1", "week");
        assert_eq!(b.best_times.len(), 3);
        assert!(b.best_times.iter().all(|s| s.hour < 24));
        assert!(b
            .best_times
            .iter()
            .all(|s| (0.5..=0.95).contains(&s.confidence)));
        assert!(b
            .best_times
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_recommendation_count() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let r = recommendations(&mut rng, "c1");
            assert!((3..=5).contains(&r.recommendations.len()));
            assert_eq!(r.recommendations[0].priority, "high");
        }
    }

    #[test]
    fn test_same_seed_same_payload() {
        let call = AnalyticsCall::engagement_metrics("c1", None);
        let a = synthesize(&mut StdRng::seed_from_u64(9), &call).expect("synth");
        let b = synthesize(&mut StdRng::seed_from_u64(9), &call).expect("synth");
        assert_eq!(a, b);
    }
}
