//! Client configuration.
//!
//! The process-wide default client reads its configuration from the
//! environment on first use:
//!
//! - `REST_MODEL_BASE_URL`: prefix for root endpoints that are not absolute
//!   URLs. Empty by default, in which case models must return absolute roots.
//! - `REST_MODEL_TIMEOUT_SECS`: overall per-request timeout. Unset means the
//!   HTTP client's own behaviour applies.

use std::time::Duration;

use tracing::warn;

pub const BASE_URL_ENV: &str = "REST_MODEL_BASE_URL";
pub const TIMEOUT_ENV: &str = "REST_MODEL_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(BASE_URL_ENV).unwrap_or_default();
        let timeout = lookup(TIMEOUT_ENV).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(0) => {
                warn!(value = %raw, "ignoring zero {TIMEOUT_ENV}");
                None
            }
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(err) => {
                warn!(value = %raw, error = %err, "ignoring invalid {TIMEOUT_ENV}");
                None
            }
        });
        Self { base_url, timeout }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn reads_base_url_and_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "http://localhost:3000"),
            (TIMEOUT_ENV, " 5 "),
        ]));
        assert_eq!(
            config,
            ClientConfig::new("http://localhost:3000").with_timeout(Duration::from_secs(5))
        );
    }

    #[test]
    fn invalid_timeout_is_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")]));
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn zero_timeout_is_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "0")]));
        assert_eq!(config.timeout, None);
    }
}
