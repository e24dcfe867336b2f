//! Service configuration.

use crate::adapter::real::DEFAULT_HTTP_TIMEOUT;
use crate::cache::DEFAULT_TTL;
use crate::error::{Error, Result};
use crate::observability::TtlPolicy;
use crate::source::DataSourceMode;
use std::time::Duration;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const ENV_BASE_URL: &str = "ANALYTICS_API_BASE_URL";
pub const ENV_DATA_SOURCE: &str = "ANALYTICS_DATA_SOURCE";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ANALYTICS_HTTP_TIMEOUT_SECS";
pub const ENV_CACHE_TTL_SECS: &str = "ANALYTICS_CACHE_TTL_SECS";

/// Upper bound for durations read from the environment (one year).
pub const MAX_ENV_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration for [`AnalyticsService`](crate::service::AnalyticsService).
///
/// # Example
///
/// ```
/// use analytics_kit::config::AnalyticsConfig;
/// use analytics_kit::source::DataSourceMode;
/// use std::time::Duration;
///
/// let config = AnalyticsConfig::default()
///     .with_base_url("https://analytics.example.com/api")
///     .with_data_source(DataSourceMode::Mock)
///     .with_default_ttl(Duration::from_secs(60))
///     .with_request_coalescing(true);
///
/// assert_eq!(config.data_source, DataSourceMode::Mock);
/// ```
#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
    /// Backend base URL used by the real adapter.
    pub base_url: String,

    /// Mode the service starts in.
    pub data_source: DataSourceMode,

    /// Timeout applied to every backend request.
    pub http_timeout: Duration,

    /// TTL for methods the policy does not list.
    pub default_ttl: Duration,

    /// Method-specific TTLs.
    pub ttl_policy: TtlPolicy,

    /// Share one in-flight adapter call between concurrent misses for the same key.
    ///
    /// Off by default: concurrent misses then each call the adapter and the
    /// last write wins, which is harmless because analytics reads are idempotent.
    pub coalesce_requests: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_source: DataSourceMode::default(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            default_ttl: DEFAULT_TTL,
            ttl_policy: TtlPolicy::default(),
            coalesce_requests: false,
        }
    }
}

impl AnalyticsConfig {
    /// Read configuration from the environment, starting from defaults.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `ANALYTICS_API_BASE_URL` | `base_url` |
    /// | `ANALYTICS_DATA_SOURCE` | `data_source` (`api` or `mock`) |
    /// | `ANALYTICS_HTTP_TIMEOUT_SECS` | `http_timeout` |
    /// | `ANALYTICS_CACHE_TTL_SECS` | `default_ttl` |
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` when a variable is set to an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` when a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AnalyticsConfig::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(mode) = lookup(ENV_DATA_SOURCE) {
            config.data_source = mode.parse()?;
        }
        if let Some(secs) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            config.http_timeout = parse_secs(ENV_HTTP_TIMEOUT_SECS, &secs)?;
        }
        if let Some(secs) = lookup(ENV_CACHE_TTL_SECS) {
            config.default_ttl = parse_secs(ENV_CACHE_TTL_SECS, &secs)?;
        }

        debug!(
            "Analytics config: base_url={} data_source={} timeout={:?} default_ttl={:?}",
            config.base_url, config.data_source, config.http_timeout, config.default_ttl
        );
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_data_source(mut self, mode: DataSourceMode) -> Self {
        self.data_source = mode;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.ttl_policy = policy;
        self
    }

    pub fn with_request_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce_requests = enabled;
        self
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| Error::ConfigError(format!("{} must be whole seconds: {}", name, e)))?;
    if secs > MAX_ENV_SECS {
        return Err(Error::ConfigError(format!(
            "{} must be at most {} seconds, got {}",
            name, MAX_ENV_SECS, secs
        )));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.data_source, DataSourceMode::Api);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert!(!config.coalesce_requests);
    }

    #[test]
    fn test_from_lookup() {
        let config = AnalyticsConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://backend.example.com"),
            (ENV_DATA_SOURCE, "mock"),
            (ENV_HTTP_TIMEOUT_SECS, "3"),
            (ENV_CACHE_TTL_SECS, " 45 "),
        ]))
        .expect("valid config");

        assert_eq!(config.base_url, "https://backend.example.com");
        assert_eq!(config.data_source, DataSourceMode::Mock);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.default_ttl, Duration::from_secs(45));
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = AnalyticsConfig::from_lookup(|_| None).expect("valid config");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.ttl_policy, TtlPolicy::default());
    }

    #[test]
    fn test_from_lookup_rejects_invalid_values() {
        let result = AnalyticsConfig::from_lookup(lookup_from(&[(ENV_DATA_SOURCE, "offline")]));
        assert!(matches!(result, Err(Error::ConfigError(_))));

        let result =
            AnalyticsConfig::from_lookup(lookup_from(&[(ENV_HTTP_TIMEOUT_SECS, "ten")]));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_from_lookup_rejects_out_of_range_seconds() {
        let result = AnalyticsConfig::from_lookup(lookup_from(&[(
            ENV_CACHE_TTL_SECS,
            "18446744073709551615",
        )]));
        assert!(matches!(result, Err(Error::ConfigError(_))));

        let config = AnalyticsConfig::from_lookup(lookup_from(&[(ENV_CACHE_TTL_SECS, "31536000")]))
            .expect("one year is allowed");
        assert_eq!(config.default_ttl, Duration::from_secs(MAX_ENV_SECS));
    }
}
