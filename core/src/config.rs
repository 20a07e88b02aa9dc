//! Client-wide defaults.
//!
//! Every field has a default, so a partial JSON/TOML table deserializes into a
//! usable config. The timeout here is only the starting value for each
//! request; a `RequestOption::Timeout` replaces it for that call alone.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_USER_AGENT: &str = concat!("formreq/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout applied to requests that do not carry their own.
    #[serde(with = "millis")]
    pub timeout: Duration,
    pub user_agent: String,
    /// Headers sent on every request unless an option overrides them.
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }
}

/// Durations are written as whole milliseconds (`"timeout": 1500`).
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"timeout":1500}"#).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(config.default_headers.is_empty());
    }

    #[test]
    fn empty_config_is_default() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn builders_chain() {
        let config = ClientConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("agent/1")
            .with_header("Accept", "application/json");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "agent/1");
        assert_eq!(
            config.default_headers,
            vec![("Accept".to_string(), "application/json".to_string())]
        );
    }
}
