//! The data-access seam between snapshot lenses and the broker.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{ChannelInfo, ConnectionInfo, NodeInfo, Overview, QueueInfo};
use crate::ClientError;

/// Read operations against a broker's management API.
///
/// Every call is independent and fallible; callers only need to know whether
/// it faulted and, if not, the payload. [`ManagementClient`] is the HTTP
/// implementation; tests substitute scripted implementations.
///
/// [`ManagementClient`]: crate::rabbitmq::ManagementClient
#[async_trait]
pub trait BrokerApi: Send + Sync {
    /// Cluster-wide overview: names, versions, churn and message totals.
    async fn overview(&self) -> Result<Overview, ClientError>;

    /// Every node in the cluster.
    async fn nodes(&self) -> Result<Vec<NodeInfo>, ClientError>;

    /// Every open client connection.
    async fn connections(&self) -> Result<Vec<ConnectionInfo>, ClientError>;

    /// Every open channel.
    async fn channels(&self) -> Result<Vec<ChannelInfo>, ClientError>;

    /// Queues visible to the client.
    async fn queues(&self) -> Result<Vec<QueueInfo>, ClientError>;
}

#[async_trait]
impl<T: BrokerApi + ?Sized> BrokerApi for Arc<T> {
    async fn overview(&self) -> Result<Overview, ClientError> {
        (**self).overview().await
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>, ClientError> {
        (**self).nodes().await
    }

    async fn connections(&self) -> Result<Vec<ConnectionInfo>, ClientError> {
        (**self).connections().await
    }

    async fn channels(&self) -> Result<Vec<ChannelInfo>, ClientError> {
        (**self).channels().await
    }

    async fn queues(&self) -> Result<Vec<QueueInfo>, ClientError> {
        (**self).queues().await
    }
}
