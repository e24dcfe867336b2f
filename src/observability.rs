//! Request metrics and per-method TTL policy.
//!
//! # Metrics
//!
//! [`ServiceMetrics`] accumulates four counters for the lifetime of a service:
//! requests, cache hits, errors, and fallback responses, plus the total time
//! spent on cache misses. [`ServiceMetrics::performance`] derives the display
//! ratios used by the health endpoint:
//!
//! ```
//! use analytics_kit::observability::ServiceMetrics;
//! use std::time::Duration;
//!
//! let metrics = ServiceMetrics::new();
//! assert_eq!(metrics.performance().cache_hit_rate, "0%");
//!
//! metrics.record_request();
//! metrics.record_request();
//! metrics.record_hit();
//! metrics.record_response_time(Duration::from_millis(25));
//!
//! let report = metrics.performance();
//! assert_eq!(report.cache_hit_rate, "50.00%");
//! assert_eq!(report.avg_response_time, "12.50ms");
//! ```
//!
//! # TTL Policy
//!
//! [`TtlPolicy`] maps method names to cache lifetimes. Methods it does not know
//! fall back to the cache's default TTL:
//!
//! | Method | TTL |
//! |--------|-----|
//! | `getAnalyticsOverview` | 2 min |
//! | `getPostDynamics` | 5 min |
//! | `getEngagementMetrics` | 5 min |
//! | `getTopPosts` | 10 min |
//! | `getBestTime` | 30 min |
//! | `getAIRecommendations` | 60 min |

use crate::call::AnalyticsMethod;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free request counters.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    errors: AtomicU64,
    fallbacks: AtomicU64,
    response_time_us: AtomicU64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response_time(&self, elapsed: Duration) {
        self.response_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            total_response_time_ms: self.response_time_us.load(Ordering::Relaxed) as f64
                / 1000.0,
        }
    }

    /// Derived ratios over `requests`, formatted for display.
    pub fn performance(&self) -> PerformanceReport {
        self.snapshot().performance()
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.fallbacks.store(0, Ordering::Relaxed);
        self.response_time_us.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`ServiceMetrics`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub cache_hits: u64,
    pub errors: u64,
    pub fallbacks: u64,
    pub total_response_time_ms: f64,
}

impl MetricsSnapshot {
    pub fn performance(&self) -> PerformanceReport {
        if self.requests == 0 {
            return PerformanceReport {
                cache_hit_rate: "0%".to_string(),
                avg_response_time: "0ms".to_string(),
                error_rate: "0%".to_string(),
            };
        }

        let requests = self.requests as f64;
        PerformanceReport {
            cache_hit_rate: format!("{:.2}%", self.cache_hits as f64 / requests * 100.0),
            avg_response_time: format!("{:.2}ms", self.total_response_time_ms / requests),
            error_rate: format!("{:.2}%", self.errors as f64 / requests * 100.0),
        }
    }
}

/// Display-ready performance ratios.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub cache_hit_rate: String,
    pub avg_response_time: String,
    pub error_rate: String,
}

/// Per-method cache lifetimes.
#[derive(Clone, Debug, PartialEq)]
pub struct TtlPolicy {
    ttls: HashMap<String, Duration>,
}

impl TtlPolicy {
    /// Policy with no method-specific TTLs; every method uses the cache default.
    pub fn empty() -> Self {
        TtlPolicy {
            ttls: HashMap::new(),
        }
    }

    /// Register or replace the TTL for a method.
    pub fn with_ttl(mut self, method: AnalyticsMethod, ttl: Duration) -> Self {
        self.ttls.insert(method.as_str().to_string(), ttl);
        self
    }

    /// TTL registered for `method`, if any.
    pub fn get_ttl(&self, method: &str) -> Option<Duration> {
        self.ttls.get(method).copied()
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        const MINUTE: u64 = 60;
        TtlPolicy::empty()
            .with_ttl(
                AnalyticsMethod::AnalyticsOverview,
                Duration::from_secs(2 * MINUTE),
            )
            .with_ttl(AnalyticsMethod::PostDynamics, Duration::from_secs(5 * MINUTE))
            .with_ttl(
                AnalyticsMethod::EngagementMetrics,
                Duration::from_secs(5 * MINUTE),
            )
            .with_ttl(AnalyticsMethod::TopPosts, Duration::from_secs(10 * MINUTE))
            .with_ttl(AnalyticsMethod::BestTime, Duration::from_secs(30 * MINUTE))
            .with_ttl(
                AnalyticsMethod::AiRecommendations,
                Duration::from_secs(60 * MINUTE),
            )
    }
}
