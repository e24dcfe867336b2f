//! Cache key management utilities.

use crate::call::AnalyticsCall;
use serde_json::Value;

/// Builder for cache keys.
///
/// Keys have the form `"{method}:{args}"` where `args` is the compact JSON
/// array of the call arguments. Method names are identifiers and never contain
/// `':'`, so the first separator always splits method from arguments and two
/// keys are equal exactly when method and arguments are equal.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Build a cache key from a method name and its argument list.
    pub fn build(method: &str, args: &[Value]) -> String {
        debug_assert!(!method.contains(':'), "method names must not contain ':'");
        // Value's Display is compact JSON and cannot fail.
        format!("{}:{}", method, Value::Array(args.to_vec()))
    }

    /// Build the cache key for a typed call.
    ///
    /// Optional parameters are already default-filled in [`AnalyticsCall`], so
    /// an omitted argument and its explicit default produce the same key.
    pub fn build_for(call: &AnalyticsCall) -> String {
        Self::build(call.method().as_str(), &call.args())
    }

    /// Method portion of a key built by [`CacheKeyBuilder::build`].
    pub fn method_of(key: &str) -> &str {
        key.split_once(':').map(|(method, _)| method).unwrap_or(key)
    }
}
