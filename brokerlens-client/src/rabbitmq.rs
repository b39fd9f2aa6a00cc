//! RabbitMQ client using the Management HTTP API.
//!
//! The Management API is typically available on port 15672. This client
//! performs the read-only queries snapshot lenses are built from.
//!
//! ## Example
//!
//! ```rust,no_run
//! use brokerlens_client::{BrokerApi, ManagementClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ManagementClient::builder()
//!         .endpoint("http://localhost:15672")
//!         .credentials("guest", "guest")
//!         .vhost("/")
//!         .build()?;
//!
//!     let overview = client.overview().await?;
//!     println!("Cluster: {:?}", overview.cluster_name);
//!
//!     for queue in client.queues().await? {
//!         println!("{}: {:?} ready", queue.name, queue.messages_ready);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::model::{ChannelInfo, ConnectionInfo, NodeInfo, Overview, QueueInfo};
use crate::{BrokerApi, ClientConfig, ClientError};

/// HTTP client for the RabbitMQ Management API.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
    vhost: Option<String>,
}

impl ManagementClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ManagementClientBuilder {
        ManagementClientBuilder::default()
    }

    /// Build a client from deserialized settings.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Self::builder()
            .endpoint(config.endpoint.clone())
            .credentials(config.username.clone(), config.password.clone())
            .timeout(config.timeout());
        if let Some(vhost) = &config.vhost {
            builder = builder.vhost(vhost.clone());
        }
        builder.build()
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch a single queue by name from the configured vhost (`/` if none).
    pub async fn queue(&self, name: &str) -> Result<QueueInfo, ClientError> {
        let vhost = self.vhost.as_deref().unwrap_or("/");
        let path = format!("/api/queues/{}/{}", urlencoded(vhost), urlencoded(name));
        self.get_json(&path).await
    }

    fn scoped(&self, resource: &str) -> String {
        match &self.vhost {
            Some(vhost) => format!("/api/vhosts/{}/{}", urlencoded(vhost), resource),
            None => format!("/api/{}", resource),
        }
    }

    fn queues_path(&self) -> String {
        match &self.vhost {
            Some(vhost) => format!("/api/queues/{}", urlencoded(vhost)),
            None => "/api/queues".to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(%url, "querying management API");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Auth("Invalid credentials".to_string()));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            return Err(ClientError::Http(format!("API returned status {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

#[async_trait]
impl BrokerApi for ManagementClient {
    async fn overview(&self) -> Result<Overview, ClientError> {
        self.get_json("/api/overview").await
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>, ClientError> {
        self.get_json("/api/nodes").await
    }

    async fn connections(&self) -> Result<Vec<ConnectionInfo>, ClientError> {
        self.get_json(&self.scoped("connections")).await
    }

    async fn channels(&self) -> Result<Vec<ChannelInfo>, ClientError> {
        self.get_json(&self.scoped("channels")).await
    }

    async fn queues(&self) -> Result<Vec<QueueInfo>, ClientError> {
        self.get_json(&self.queues_path()).await
    }
}

/// Builder for ManagementClient.
#[derive(Debug, Default)]
pub struct ManagementClientBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    vhost: Option<String>,
    timeout: Option<Duration>,
}

impl ManagementClientBuilder {
    /// Set the Management API endpoint (e.g., "http://localhost:15672").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the username and password for authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Restrict connection, channel and queue queries to one vhost.
    pub fn vhost(mut self, vhost: impl Into<String>) -> Self {
        self.vhost = Some(vhost.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ManagementClient, ClientError> {
        let timeout = self.timeout.unwrap_or(ClientConfig::DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| ClientConfig::DEFAULT_ENDPOINT.to_string());

        Ok(ManagementClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            username: self.username.unwrap_or_else(|| "guest".to_string()),
            password: self.password.unwrap_or_else(|| "guest".to_string()),
            vhost: self.vhost,
        })
    }
}

// Percent-encode a path segment (vhost and queue names may contain '/').
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
