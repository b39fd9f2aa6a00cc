use std::collections::HashMap;

use async_trait::async_trait;
use brokerlens_client::model::{ChannelInfo, ChurnRates, ConnectionInfo, Overview};
use brokerlens_client::BrokerApi;
use brokerlens_types::{
    BrokerConnectivitySnapshot, ChannelSnapshot, ConnectionChurn, ConnectionSnapshot,
    NetworkTraffic,
};

use super::{cluster_name, metric};
use crate::kind::{FetchSession, SnapshotKind};
use crate::{AssemblyError, CaptureError, Resource};

/// Client connections, their channels, and connection churn.
///
/// Fetches the overview, then connections, then channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokerConnectivity;

/// Payloads a [`BrokerConnectivity`] capture collects.
#[derive(Debug, Clone, Default)]
pub struct BrokerConnectivityRaw {
    pub overview: Overview,
    pub connections: Vec<ConnectionInfo>,
    pub channels: Vec<ChannelInfo>,
}

#[async_trait]
impl SnapshotKind for BrokerConnectivity {
    type Snapshot = BrokerConnectivitySnapshot;
    type Raw = BrokerConnectivityRaw;

    fn name(&self) -> &'static str {
        "connectivity"
    }

    async fn fetch(
        &self,
        api: &dyn BrokerApi,
        session: &FetchSession<'_>,
    ) -> Result<BrokerConnectivityRaw, CaptureError> {
        let overview = session.run(Resource::Overview, api.overview()).await?;
        let connections = session
            .run(Resource::Connections, api.connections())
            .await?;
        let channels = session.run(Resource::Channels, api.channels()).await?;
        Ok(BrokerConnectivityRaw {
            overview,
            connections,
            channels,
        })
    }

    fn assemble(
        &self,
        raw: BrokerConnectivityRaw,
    ) -> Result<BrokerConnectivitySnapshot, AssemblyError> {
        assemble_connectivity(&raw.overview, &raw.connections, &raw.channels)
    }
}

/// Build a connectivity snapshot.
///
/// Each channel is nested under the connection named in its
/// `connection_details`, keeping the channel list's order. Channels whose
/// connection is not in `connections` (it closed between the two fetches)
/// are left out.
pub fn assemble_connectivity(
    overview: &Overview,
    connections: &[ConnectionInfo],
    channels: &[ChannelInfo],
) -> Result<BrokerConnectivitySnapshot, AssemblyError> {
    let cluster_name = cluster_name(overview)?;

    let mut index = HashMap::with_capacity(connections.len());
    let mut assembled = Vec::with_capacity(connections.len());
    for connection in connections {
        if connection.name.is_empty() {
            return Err(AssemblyError::InvalidRecord {
                resource: Resource::Connections,
                detail: "connection without a name".to_string(),
            });
        }
        if index
            .insert(connection.name.as_str(), assembled.len())
            .is_some()
        {
            return Err(AssemblyError::InvalidRecord {
                resource: Resource::Connections,
                detail: format!("connection {} listed more than once", connection.name),
            });
        }
        assembled.push(assemble_connection(connection));
    }

    for channel in channels {
        let owner = channel
            .connection_details
            .as_ref()
            .and_then(|details| index.get(details.name.as_str()));
        if let Some(&i) = owner {
            assembled[i].channels.push(assemble_channel(channel));
        }
    }

    let default_churn = ChurnRates::default();
    let churn = overview.churn_rates.as_ref().unwrap_or(&default_churn);

    Ok(BrokerConnectivitySnapshot {
        cluster_name,
        broker_version: overview.rabbitmq_version.clone().unwrap_or_default(),
        churn: ConnectionChurn {
            connections_created: metric(
                churn.connection_created,
                churn.connection_created_details.as_ref(),
            ),
            connections_closed: metric(
                churn.connection_closed,
                churn.connection_closed_details.as_ref(),
            ),
            channels_created: metric(
                churn.channel_created,
                churn.channel_created_details.as_ref(),
            ),
            channels_closed: metric(churn.channel_closed, churn.channel_closed_details.as_ref()),
        },
        connections: assembled,
    })
}

fn assemble_connection(connection: &ConnectionInfo) -> ConnectionSnapshot {
    ConnectionSnapshot {
        name: connection.name.clone(),
        node: connection.node.clone(),
        state: connection.state.clone(),
        vhost: connection.vhost.clone(),
        user: connection.user.clone(),
        channel_limit: connection.channel_max.unwrap_or(0),
        network: NetworkTraffic {
            sent: metric(connection.send_oct, connection.send_oct_details.as_ref()),
            received: metric(connection.recv_oct, connection.recv_oct_details.as_ref()),
        },
        channels: Vec::new(),
    }
}

fn assemble_channel(channel: &ChannelInfo) -> ChannelSnapshot {
    ChannelSnapshot {
        name: channel.name.clone(),
        number: channel.number,
        node: channel.node.clone(),
        consumers: channel.consumer_count.unwrap_or(0),
        prefetch_count: channel.prefetch_count.unwrap_or(0),
        unacknowledged: channel.messages_unacknowledged.unwrap_or(0),
        unconfirmed: channel.messages_unconfirmed.unwrap_or(0),
        uncommitted_messages: channel.messages_uncommitted.unwrap_or(0),
        uncommitted_acknowledgements: channel.acks_uncommitted.unwrap_or(0),
    }
}
