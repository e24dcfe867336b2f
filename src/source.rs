//! Data-source selection.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which adapter serves requests.
///
/// Textual form is `api` / `mock`, matching the `ANALYTICS_DATA_SOURCE`
/// environment variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceMode {
    /// Backend over HTTP, with fallback data on failure.
    #[default]
    Api,
    /// Locally synthesized data.
    Mock,
}

impl fmt::Display for DataSourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceMode::Api => write!(f, "api"),
            DataSourceMode::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for DataSourceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" | "real" => Ok(DataSourceMode::Api),
            "mock" => Ok(DataSourceMode::Mock),
            other => Err(Error::ConfigError(format!(
                "Unknown data source '{}', expected 'api' or 'mock'",
                other
            ))),
        }
    }
}
