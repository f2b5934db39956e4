//! Server configuration from environment variables.
//!
//! Every value has a default; unparseable or non-positive values fall back
//! to it rather than failing startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_CLASSIFIER_MODEL_PATH, DEFAULT_CORS_ORIGIN,
    DEFAULT_KEYPOINT_MODEL_PATH, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub keypoint_model_path: PathBuf,
    pub classifier_model_path: PathBuf,
    pub cors_origin: String,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; lets tests avoid touching the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            bind_addr: string("BIND_ADDR", DEFAULT_BIND_ADDR),
            port: positive(&lookup, "PORT", DEFAULT_PORT),
            keypoint_model_path: string("KEYPOINT_MODEL_PATH", DEFAULT_KEYPOINT_MODEL_PATH).into(),
            classifier_model_path: string("CLASSIFIER_MODEL_PATH", DEFAULT_CLASSIFIER_MODEL_PATH)
                .into(),
            cors_origin: string("CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
            max_body_bytes: positive(&lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + PartialOrd + Default,
{
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .filter(|v| *v > T::default())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.cors_origin, "http://localhost:3000");
        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("CORS_ORIGIN", "https://app.example.com"),
            ("KEYPOINT_MODEL_PATH", "/srv/movenet.onnx"),
            ("MAX_BODY_BYTES", "1024"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origin, "https://app.example.com");
        assert_eq!(config.keypoint_model_path, PathBuf::from("/srv/movenet.onnx"));
        assert_eq!(config.max_body_bytes, 1024);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[("PORT", "0"), ("MAX_BODY_BYTES", "lots"), ("BIND_ADDR", "  ")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }
}
