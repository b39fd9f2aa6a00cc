//! Connection settings for the management API.

use std::time::Duration;

use serde::Deserialize;

/// Settings for reaching a broker's management API.
///
/// Deserializable so binaries can layer it from files and the environment;
/// every field has a default matching a stock local RabbitMQ install.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Management API base URL.
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Restrict connection, channel and queue queries to one vhost.
    /// `None` queries the whole broker.
    pub vhost: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:15672";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// The request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            username: "guest".to_string(),
            password: "guest".to_string(),
            vhost: None,
            timeout_secs: Self::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}
