//! # brokerlens-types
//!
//! Immutable snapshot types for RabbitMQ observability. Each snapshot kind is
//! a denormalized, point-in-time aggregate assembled from several management
//! API queries, so consumers can render dashboards or evaluate alerts without
//! joining raw API payloads themselves.
//!
//! ## Snapshot Kinds
//!
//! - [`ClusterSnapshot`]: cluster topology and per-node resource statistics
//! - [`BrokerConnectivitySnapshot`]: connections, their channels, and churn
//! - [`BrokerQueuesSnapshot`]: message churn and per-queue depth/rates
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for every snapshot type
//!
//! ## Example
//!
//! ```rust
//! use brokerlens_types::{BrokerQueuesSnapshot, QueueDepth, QueueSnapshot};
//!
//! let snapshot = BrokerQueuesSnapshot {
//!     cluster_name: "rabbit@prod".to_string(),
//!     queues: vec![QueueSnapshot {
//!         name: "orders".to_string(),
//!         depth: QueueDepth { ready: 12, unacknowledged: 3, total: 15 },
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//!
//! assert_eq!(snapshot.total_ready(), 12);
//! ```

mod cluster;
mod connectivity;
mod metric;
mod queues;

pub use cluster::*;
pub use connectivity::*;
pub use metric::*;
pub use queues::*;
