//! # analytics-kit
//!
//! A cached, source-switchable data-access layer for channel analytics.
//!
//! ## Features
//!
//! - **Two Data Sources:** A real adapter for the analytics REST backend and a mock adapter that synthesizes data
//! - **Never Empty-Handed:** Backend failures are replaced with synthesized payloads tagged as fallback
//! - **TTL Cache:** Per-method lifetimes, lazy expiry, statistics for inspection
//! - **Runtime Switching:** Swap sources without restarting; the cache is cleared on every switch
//! - **Metrics:** Request, hit, error and fallback counters with derived performance ratios
//!
//! ## Quick Start
//!
//! ```no_run
//! use analytics_kit::{AnalyticsConfig, AnalyticsService, DataSourceMode};
//!
//! # async fn run() -> analytics_kit::Result<()> {
//! let service = AnalyticsService::new(AnalyticsConfig::from_env()?)?;
//!
//! // Served by the backend, or by fallback data if it is unreachable
//! let overview = service.get_analytics_overview("my_channel").await?;
//! println!("{} {}", overview.source, overview.data);
//!
//! // Same arguments within the TTL: served from cache
//! let again = service.get_analytics_overview("my_channel").await?;
//! assert_eq!(overview, again);
//!
//! // Demo mode
//! service.switch_data_source(DataSourceMode::Mock).await;
//! let posts = service.get_top_posts("my_channel", None, Some("reactions")).await?;
//!
//! let health = service.health_check().await;
//! println!("{}", health.performance.cache_hit_rate);
//! # Ok(())
//! # }
//! ```
//!
//! `AnalyticsService` is `Clone`; clones share one cache and one set of metrics.

#[macro_use]
extern crate log;

pub mod adapter;
pub mod cache;
pub mod call;
pub mod config;
pub mod error;
pub mod key;
pub mod observability;
pub mod payload;
pub mod service;
pub mod source;

// Re-exports for convenience
pub use adapter::{AnalyticsAdapter, MockAdapter, RealAdapter};
pub use cache::{CacheManager, CacheStats};
pub use call::{AnalyticsCall, AnalyticsMethod};
pub use config::AnalyticsConfig;
pub use error::{Error, Result};
pub use key::CacheKeyBuilder;
pub use observability::{MetricsSnapshot, PerformanceReport, ServiceMetrics, TtlPolicy};
pub use payload::{AnalyticsPayload, HealthReport, HealthState, PayloadSource};
pub use service::{AnalyticsService, AnalyticsServiceBuilder, ServiceHealth};
pub use source::DataSourceMode;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
