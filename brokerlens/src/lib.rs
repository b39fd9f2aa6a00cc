//! # brokerlens
//!
//! Point-in-time snapshots of a RabbitMQ broker, with history and observers.
//!
//! A [`Lens`] fetches several management API resources in sequence, combines
//! them into one immutable snapshot, stamps it with an id and capture time,
//! appends it to a bounded [`History`], and notifies registered observers.
//! If any fetch fails, the capture stops there: nothing is recorded and
//! observers receive a [`SnapshotFault`] naming the failed fetch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use brokerlens::types::BrokerConnectivitySnapshot;
//! use brokerlens::{observer_fn, BrokerConnectivityLens, CapturedSnapshot, ManagementClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ManagementClient::builder()
//!         .endpoint("http://localhost:15672")
//!         .credentials("guest", "guest")
//!         .build()?;
//!
//!     let lens = Arc::new(BrokerConnectivityLens::connectivity(Arc::new(client)));
//!     lens.register_observer(Arc::new(observer_fn(
//!         |captured: &Arc<CapturedSnapshot<BrokerConnectivitySnapshot>>| {
//!             println!("{} connections", captured.snapshot().connections.len());
//!         },
//!         |fault| eprintln!("{}", fault),
//!     )));
//!
//!     // Capture every five seconds until the handle is dropped
//!     let watch = lens.watch(Duration::from_secs(5));
//!     tokio::time::sleep(Duration::from_secs(30)).await;
//!     watch.shutdown().await;
//!
//!     println!("{} captures retained", lens.history().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Snapshot kinds
//!
//! - [`Cluster`]: overview + nodes
//! - [`BrokerConnectivity`]: overview + connections + channels
//! - [`BrokerQueues`]: overview + queues
//!
//! Implement [`SnapshotKind`] to add another.

pub mod assemble;
mod cancel;
mod captured;
mod config;
mod fault;
mod history;
mod kind;
mod lens;
mod observer;

#[cfg(test)]
mod testing;

pub use assemble::{BrokerConnectivity, BrokerQueues, Cluster};
pub use cancel::CancelToken;
pub use captured::{CapturedSnapshot, SnapshotId};
pub use config::LensConfig;
pub use fault::{AssemblyError, CaptureError, Resource, SnapshotFault};
pub use history::{History, DEFAULT_HISTORY_CAPACITY};
pub use kind::{FetchSession, SnapshotKind};
pub use lens::{BrokerConnectivityLens, BrokerQueuesLens, ClusterLens, Lens, WatchHandle};
pub use observer::{
    observer_fn, ChannelObserver, FnObserver, LensEvent, Observer, ObserverRegistry, Subscription,
};

// Re-export the layers below for convenience
pub use brokerlens_client as client;
pub use brokerlens_client::{BrokerApi, ClientConfig, ClientError};
pub use brokerlens_types as types;

#[cfg(feature = "rabbitmq")]
pub use brokerlens_client::ManagementClient;
