//! Scripted broker API for exercising lenses without a network.

use std::collections::HashMap;
use async_trait::async_trait;
use brokerlens_client::model::{
    ChannelInfo, ConnectionDetails, ConnectionInfo, NodeInfo, Overview, QueueInfo,
};
use brokerlens_client::{BrokerApi, ClientError};
use parking_lot::Mutex;

use crate::Resource;

/// Answers each resource from a fixed payload unless told to fail or hang.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    pub overview: Overview,
    pub nodes: Vec<NodeInfo>,
    pub connections: Vec<ConnectionInfo>,
    pub channels: Vec<ChannelInfo>,
    pub queues: Vec<QueueInfo>,
    failures: Mutex<HashMap<Resource, ClientError>>,
    hang_on: Mutex<Option<Resource>>,
    calls: Mutex<Vec<Resource>>,
}

impl ScriptedApi {
    /// A healthy single-node cluster named "prod" with one connection,
    /// one channel and one queue.
    pub fn healthy() -> Self {
        Self {
            overview: Overview {
                cluster_name: Some("prod".to_string()),
                rabbitmq_version: Some("3.13.1".to_string()),
                erlang_version: Some("26.2.3".to_string()),
                ..Default::default()
            },
            nodes: vec![NodeInfo {
                name: "rabbit@a".to_string(),
                running: true,
                ..Default::default()
            }],
            connections: vec![ConnectionInfo {
                name: "10.0.0.1:5672 -> 10.0.0.2:5672".to_string(),
                node: "rabbit@a".to_string(),
                state: "running".to_string(),
                vhost: "/".to_string(),
                user: "guest".to_string(),
                ..Default::default()
            }],
            channels: vec![ChannelInfo {
                name: "10.0.0.1:5672 -> 10.0.0.2:5672 (1)".to_string(),
                number: 1,
                connection_details: Some(ConnectionDetails {
                    name: "10.0.0.1:5672 -> 10.0.0.2:5672".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            queues: vec![QueueInfo {
                name: "orders".to_string(),
                vhost: "/".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub fn fail(&self, resource: Resource, error: ClientError) {
        self.failures.lock().insert(resource, error);
    }

    pub fn heal(&self, resource: Resource) {
        self.failures.lock().remove(&resource);
    }

    /// Make calls for `resource` never complete.
    pub fn hang_on(&self, resource: Resource) {
        *self.hang_on.lock() = Some(resource);
    }

    pub fn calls(&self) -> Vec<Resource> {
        self.calls.lock().clone()
    }

    async fn answer<T: Clone>(&self, resource: Resource, payload: &T) -> Result<T, ClientError> {
        self.calls.lock().push(resource);

        let hang = *self.hang_on.lock() == Some(resource);
        if hang {
            std::future::pending::<()>().await;
        }

        let failure = self.failures.lock().get(&resource).cloned();
        match failure {
            Some(error) => Err(error),
            None => Ok(payload.clone()),
        }
    }
}

#[async_trait]
impl BrokerApi for ScriptedApi {
    async fn overview(&self) -> Result<Overview, ClientError> {
        self.answer(Resource::Overview, &self.overview).await
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>, ClientError> {
        self.answer(Resource::Nodes, &self.nodes).await
    }

    async fn connections(&self) -> Result<Vec<ConnectionInfo>, ClientError> {
        self.answer(Resource::Connections, &self.connections).await
    }

    async fn channels(&self) -> Result<Vec<ChannelInfo>, ClientError> {
        self.answer(Resource::Channels, &self.channels).await
    }

    async fn queues(&self) -> Result<Vec<QueueInfo>, ClientError> {
        self.answer(Resource::Queues, &self.queues).await
    }
}
