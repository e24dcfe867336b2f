//! Analytics service: cache lookup, adapter selection and metrics behind one API.

use crate::adapter::{AnalyticsAdapter, MockAdapter, RealAdapter};
use crate::cache::{CacheManager, CacheStats};
use crate::call::AnalyticsCall;
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::key::CacheKeyBuilder;
use crate::observability::{MetricsSnapshot, PerformanceReport, ServiceMetrics, TtlPolicy};
use crate::payload::{AnalyticsPayload, HealthReport, HealthState};
use crate::source::DataSourceMode;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

type SharedFetch = Shared<BoxFuture<'static, Result<AnalyticsPayload>>>;

/// Current mode plus a counter bumped on every switch.
///
/// A miss only writes its result to the cache if the generation it started
/// under is still current.
struct SourceState {
    mode: DataSourceMode,
    generation: u64,
}

struct InFlight {
    generation: u64,
    fetch: SharedFetch,
}

struct ServiceInner {
    real: Arc<dyn AnalyticsAdapter>,
    mock: Arc<dyn AnalyticsAdapter>,
    cache: CacheManager<AnalyticsPayload>,
    ttl_policy: TtlPolicy,
    metrics: ServiceMetrics,
    source: RwLock<SourceState>,
    coalesce: bool,
    in_flight: DashMap<String, InFlight>,
}

impl ServiceInner {
    fn adapter_for(&self, mode: DataSourceMode) -> Arc<dyn AnalyticsAdapter> {
        match mode {
            DataSourceMode::Api => Arc::clone(&self.real),
            DataSourceMode::Mock => Arc::clone(&self.mock),
        }
    }

    fn ttl_for(&self, call: &AnalyticsCall, ttl_override: Option<Duration>) -> Duration {
        ttl_override
            .or_else(|| self.ttl_policy.get_ttl(call.method().as_str()))
            .unwrap_or_else(|| self.cache.default_ttl())
    }

    /// Call the selected adapter and cache the result.
    async fn fetch(
        &self,
        call: &AnalyticsCall,
        key: &str,
        ttl_override: Option<Duration>,
    ) -> Result<AnalyticsPayload> {
        let (mode, generation) = {
            let source = self.source.read().await;
            (source.mode, source.generation)
        };
        let adapter = self.adapter_for(mode);
        debug!("Cache miss for {}, calling {} adapter", key, adapter.name());

        let payload = adapter.invoke(call).await?;
        if payload.is_fallback() {
            self.metrics.record_fallback();
        }

        let ttl = self.ttl_for(call, ttl_override);
        let source = self.source.read().await;
        if source.generation == generation {
            self.cache.set(key, payload.clone(), ttl);
        } else {
            debug!(
                "Data source switched while {} was in flight, result not cached",
                key
            );
        }
        drop(source);

        Ok(payload)
    }
}

/// Health of the service and its selected adapter.
#[derive(Clone, Debug, Serialize)]
pub struct ServiceHealth {
    pub status: HealthState,
    pub data_source: DataSourceMode,
    pub adapter: HealthReport,
    pub cache: CacheStats,
    pub metrics: MetricsSnapshot,
    pub performance: PerformanceReport,
}

/// Cached, source-switchable analytics API.
///
/// Cloning is cheap and every clone shares the same cache, metrics and mode.
/// Independent instances share nothing.
///
/// # Example
///
/// ```
/// use analytics_kit::{AnalyticsConfig, AnalyticsService, DataSourceMode};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> analytics_kit::Result<()> {
/// let service = AnalyticsService::new(
///     AnalyticsConfig::default().with_data_source(DataSourceMode::Mock),
/// )?;
///
/// let first = service.get_top_posts("demo", Some("today"), Some("views")).await?;
/// let second = service.get_top_posts("demo", None, None).await?;
///
/// assert_eq!(first, second);
/// assert_eq!(service.get_metrics().cache_hits, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AnalyticsService {
    inner: Arc<ServiceInner>,
}

impl AnalyticsService {
    /// Create a service with the default real and mock adapters.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the base URL is invalid.
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start a builder, for injecting custom adapters.
    pub fn builder(config: AnalyticsConfig) -> AnalyticsServiceBuilder {
        AnalyticsServiceBuilder {
            config,
            real: None,
            mock: None,
        }
    }

    pub async fn get_analytics_overview(&self, channel_id: &str) -> Result<AnalyticsPayload> {
        self.execute(AnalyticsCall::overview(channel_id)).await
    }

    /// `period` defaults to `"24h"`.
    pub async fn get_post_dynamics(
        &self,
        channel_id: &str,
        period: Option<&str>,
    ) -> Result<AnalyticsPayload> {
        self.execute(AnalyticsCall::post_dynamics(channel_id, period))
            .await
    }

    /// `period` defaults to `"today"`, `sort_by` to `"views"`.
    pub async fn get_top_posts(
        &self,
        channel_id: &str,
        period: Option<&str>,
        sort_by: Option<&str>,
    ) -> Result<AnalyticsPayload> {
        self.execute(AnalyticsCall::top_posts(channel_id, period, sort_by))
            .await
    }

    /// `period` defaults to `"7d"`.
    pub async fn get_engagement_metrics(
        &self,
        channel_id: &str,
        period: Option<&str>,
    ) -> Result<AnalyticsPayload> {
        self.execute(AnalyticsCall::engagement_metrics(channel_id, period))
            .await
    }

    /// `timeframe` defaults to `"week"`.
    pub async fn get_best_time(
        &self,
        channel_id: &str,
        timeframe: Option<&str>,
    ) -> Result<AnalyticsPayload> {
        self.execute(AnalyticsCall::best_time(channel_id, timeframe))
            .await
    }

    pub async fn get_ai_recommendations(&self, channel_id: &str) -> Result<AnalyticsPayload> {
        self.execute(AnalyticsCall::ai_recommendations(channel_id))
            .await
    }

    /// Run a call through the cache with the method's TTL.
    ///
    /// # Errors
    ///
    /// Returns whatever error the selected adapter returned, unchanged.
    pub async fn execute(&self, call: AnalyticsCall) -> Result<AnalyticsPayload> {
        self.execute_with_ttl(call, None).await
    }

    /// Run a call through the cache, overriding the TTL used on a miss.
    ///
    /// Flow:
    /// 1. Count the request
    /// 2. Live cache entry: count a hit and return it, the adapter is not called
    /// 3. Miss: call the adapter for the current mode and cache its result
    /// 4. Add the elapsed time to the response-time total
    /// 5. Adapter error: count it and return it unchanged
    ///
    /// # Errors
    ///
    /// Returns whatever error the selected adapter returned, unchanged.
    pub async fn execute_with_ttl(
        &self,
        call: AnalyticsCall,
        ttl_override: Option<Duration>,
    ) -> Result<AnalyticsPayload> {
        let inner = &self.inner;
        inner.metrics.record_request();

        let key = CacheKeyBuilder::build_for(&call);
        if let Some(payload) = inner.cache.get(&key) {
            inner.metrics.record_hit();
            return Ok(payload);
        }

        let timer = Instant::now();
        let result = if inner.coalesce {
            self.fetch_coalesced(call, key, ttl_override).await
        } else {
            inner.fetch(&call, &key, ttl_override).await
        };
        inner.metrics.record_response_time(timer.elapsed());

        if let Err(e) = &result {
            inner.metrics.record_error();
            warn!("⚠ Analytics request failed: {}", e);
        }
        result
    }

    /// Miss path when coalescing is on: join a matching in-flight fetch or start one.
    async fn fetch_coalesced(
        &self,
        call: AnalyticsCall,
        key: String,
        ttl_override: Option<Duration>,
    ) -> Result<AnalyticsPayload> {
        let generation = self.inner.source.read().await.generation;

        let fetch = match self.inner.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) if entry.get().generation == generation => {
                debug!("Joining in-flight request for {}", key);
                entry.get().fetch.clone()
            }
            entry => {
                let inner = Arc::clone(&self.inner);
                let fetch_key = key.clone();
                let fetch = async move { inner.fetch(&call, &fetch_key, ttl_override).await }
                    .boxed()
                    .shared();
                let in_flight = InFlight {
                    generation,
                    fetch: fetch.clone(),
                };
                match entry {
                    Entry::Occupied(mut stale) => {
                        stale.insert(in_flight);
                    }
                    Entry::Vacant(vacant) => {
                        vacant.insert(in_flight);
                    }
                }
                fetch
            }
        };

        let result = fetch.clone().await;
        self.inner
            .in_flight
            .remove_if(&key, |_, in_flight| in_flight.fetch.ptr_eq(&fetch));
        result
    }

    /// Switch adapters and drop every cached entry.
    ///
    /// Requests still in flight under the old mode complete, but their
    /// results are not cached.
    pub async fn switch_data_source(&self, mode: DataSourceMode) {
        let mut source = self.inner.source.write().await;
        let previous = source.mode;
        source.mode = mode;
        source.generation += 1;
        self.inner.cache.clear(None);
        self.inner.in_flight.clear();
        info!("Data source switched: {} -> {}", previous, mode);
    }

    pub async fn data_source(&self) -> DataSourceMode {
        self.inner.source.read().await.mode
    }

    /// Refresh one call or clear everything.
    ///
    /// `Some(call)` drops that call's entry and re-executes it to repopulate
    /// the cache. `None` clears the whole cache without repopulating.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error if re-executing the call fails.
    pub async fn refresh_cache(
        &self,
        call: Option<AnalyticsCall>,
    ) -> Result<Option<AnalyticsPayload>> {
        match call {
            Some(call) => {
                let key = CacheKeyBuilder::build_for(&call);
                info!("Refreshing {}", key);
                self.inner.cache.clear(Some(key.as_str()));
                // A fetch started before the refresh must not be joined
                self.inner.in_flight.remove(&key);
                self.execute(call).await.map(Some)
            }
            None => {
                self.inner.cache.clear(None);
                Ok(None)
            }
        }
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear(None);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn reset_metrics(&self) {
        self.inner.metrics.reset();
    }

    /// Selected adapter's health, plus cache statistics and performance ratios.
    pub async fn health_check(&self) -> ServiceHealth {
        let mode = self.data_source().await;
        let adapter = self.inner.adapter_for(mode).health_check().await;
        let metrics = self.inner.metrics.snapshot();

        ServiceHealth {
            status: adapter.status,
            data_source: mode,
            adapter,
            cache: self.inner.cache.stats(),
            performance: metrics.performance(),
            metrics,
        }
    }
}

/// Builder for [`AnalyticsService`].
pub struct AnalyticsServiceBuilder {
    config: AnalyticsConfig,
    real: Option<Arc<dyn AnalyticsAdapter>>,
    mock: Option<Arc<dyn AnalyticsAdapter>>,
}

impl AnalyticsServiceBuilder {
    /// Adapter used in [`DataSourceMode::Api`]. Defaults to a [`RealAdapter`]
    /// for the configured base URL.
    pub fn real_adapter<A: AnalyticsAdapter + 'static>(mut self, adapter: A) -> Self {
        self.real = Some(Arc::new(adapter));
        self
    }

    /// Adapter used in [`DataSourceMode::Mock`]. Defaults to [`MockAdapter::new`].
    pub fn mock_adapter<A: AnalyticsAdapter + 'static>(mut self, adapter: A) -> Self {
        self.mock = Some(Arc::new(adapter));
        self
    }

    /// # Errors
    ///
    /// Returns `Error::ConfigError` if no real adapter was supplied and the
    /// configured base URL is invalid.
    pub fn build(self) -> Result<AnalyticsService> {
        let config = self.config;

        let real = match self.real {
            Some(adapter) => adapter,
            None => Arc::new(RealAdapter::with_timeout(
                &config.base_url,
                config.http_timeout,
            )?),
        };
        let mock = self
            .mock
            .unwrap_or_else(|| Arc::new(MockAdapter::new()));

        info!(
            "Analytics service ready: source={} real={} mock={} coalescing={}",
            config.data_source,
            real.name(),
            mock.name(),
            config.coalesce_requests
        );

        Ok(AnalyticsService {
            inner: Arc::new(ServiceInner {
                real,
                mock,
                cache: CacheManager::with_default_ttl(config.default_ttl),
                ttl_policy: config.ttl_policy,
                metrics: ServiceMetrics::new(),
                source: RwLock::new(SourceState {
                    mode: config.data_source,
                    generation: 0,
                }),
                coalesce: config.coalesce_requests,
                in_flight: DashMap::new(),
            }),
        })
    }
}
