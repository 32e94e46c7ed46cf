//! Read-only settings with dotted-path lookup.
//!
//! # Design
//! `Config` wraps a `serde_json::Value` tree supplied at construction and
//! never changes afterwards. A key such as `"http.timeout"` walks one level
//! per segment; array levels are indexed by number. A missing segment is not
//! an error, callers supply the fallback.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::http::TransportOptions;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    items: Value,
}

impl Config {
    pub fn new(items: Value) -> Self {
        Self { items }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    /// Value at `key`, or `None` when any segment is missing or a scalar is
    /// reached before the path ends. An empty key returns the whole tree.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if key.is_empty() {
            return Some(&self.items);
        }
        if let Some(value) = self.items.as_object().and_then(|map| map.get(key)) {
            return Some(value);
        }
        key.split('.').try_fold(&self.items, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).cloned().unwrap_or_else(|| default.into())
    }

    /// Typed lookup; a value of the wrong shape is treated as absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

impl From<Value> for Config {
    fn from(items: Value) -> Self {
        Self::new(items)
    }
}

impl From<Map<String, Value>> for Config {
    fn from(items: Map<String, Value>) -> Self {
        Self::new(Value::Object(items))
    }
}

impl TransportOptions {
    /// Read `http.force_ipv4`, `http.timeout` (seconds) and
    /// `http.http_errors`, keeping the default for anything unset.
    pub fn from_config(config: &Config) -> Self {
        let defaults = TransportOptions::default();
        TransportOptions {
            force_ipv4: config
                .get_as("http.force_ipv4")
                .unwrap_or(defaults.force_ipv4),
            timeout: config
                .get("http.timeout")
                .and_then(Value::as_f64)
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .filter(|timeout| !timeout.is_zero())
                .or(defaults.timeout),
            http_errors: config
                .get_as("http.http_errors")
                .unwrap_or(defaults.http_errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_lookup() {
        let config = Config::new(json!({"a": {"b": 2}}));
        assert_eq!(config.get("a.b"), Some(&json!(2)));
        assert_eq!(config.get_or("a.b", 0), json!(2));
    }

    #[test]
    fn missing_key_falls_back_to_default() {
        let config = Config::new(json!({}));
        assert_eq!(config.get("a.b"), None);
        assert_eq!(config.get_or("a.b", 99), json!(99));
    }

    #[test]
    fn scalar_in_the_middle_of_path_is_absent() {
        let config = Config::new(json!({"a": 1}));
        assert_eq!(config.get_or("a.b.c", "fallback"), json!("fallback"));
    }

    #[test]
    fn literal_dotted_key_wins() {
        let config = Config::new(json!({"a.b": "flat", "a": {"b": "nested"}}));
        assert_eq!(config.get("a.b"), Some(&json!("flat")));
    }

    #[test]
    fn array_segments_are_indexed() {
        let config = Config::new(json!({"keys": ["x", "y"]}));
        assert_eq!(config.get("keys.1"), Some(&json!("y")));
        assert_eq!(config.get("keys.2"), None);
        assert_eq!(config.get("keys.first"), None);
    }

    #[test]
    fn empty_key_returns_everything() {
        let config = Config::new(json!({"a": 1}));
        assert_eq!(config.get(""), Some(&json!({"a": 1})));
    }

    #[test]
    fn typed_lookup() {
        let config = Config::new(json!({"app": {"name": "ocr", "retries": 3}}));
        assert_eq!(config.get_as::<String>("app.name").as_deref(), Some("ocr"));
        assert_eq!(config.get_as::<u32>("app.retries"), Some(3));
        assert_eq!(config.get_as::<u32>("app.name"), None);
    }

    #[test]
    fn from_json_str_rejects_garbage() {
        assert!(Config::from_json_str("{").is_err());
        let config = Config::from_json_str(r#"{"a":{"b":true}}"#).unwrap();
        assert_eq!(config.get_as::<bool>("a.b"), Some(true));
    }

    #[test]
    fn transport_options_from_config() {
        let config = Config::new(json!({"http": {"force_ipv4": false, "timeout": 2.5}}));
        let options = TransportOptions::from_config(&config);
        assert!(!options.force_ipv4);
        assert_eq!(options.timeout, Some(Duration::from_millis(2500)));
        assert!(options.http_errors);
    }

    #[test]
    fn out_of_range_timeouts_fall_back_to_default() {
        for timeout in [json!(1e30), json!(-5), json!(0), json!("10")] {
            let config = Config::new(json!({"http": {"timeout": timeout.clone()}}));
            let options = TransportOptions::from_config(&config);
            assert_eq!(options.timeout, None, "timeout {timeout}");
        }
    }

    #[test]
    fn transport_options_default_when_unset() {
        let options = TransportOptions::from_config(&Config::default());
        assert_eq!(options, TransportOptions::default());
    }
}
