//! # brokerlens-client
//!
//! Read-only access to the RabbitMQ Management HTTP API.
//!
//! This crate is the data-access layer underneath brokerlens snapshot lenses.
//! It exposes the [`BrokerApi`] trait (one async, fallible call per management
//! resource), the response payloads those calls return, and an HTTP
//! implementation, [`ManagementClient`].
//!
//! ## Features
//!
//! - `rabbitmq` (default): the reqwest-based [`ManagementClient`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brokerlens_client::{BrokerApi, ManagementClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ManagementClient::builder()
//!         .endpoint("http://localhost:15672")
//!         .credentials("guest", "guest")
//!         .build()?;
//!
//!     let nodes = client.nodes().await?;
//!     println!("Cluster has {} nodes", nodes.len());
//!     Ok(())
//! }
//! ```

mod api;
mod config;
pub mod error;
pub mod model;

#[cfg(feature = "rabbitmq")]
pub mod rabbitmq;

pub use api::BrokerApi;
pub use config::ClientConfig;
pub use error::ClientError;

#[cfg(feature = "rabbitmq")]
pub use rabbitmq::{ManagementClient, ManagementClientBuilder};
