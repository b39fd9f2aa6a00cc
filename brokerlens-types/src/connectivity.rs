//! Broker connectivity snapshot - connections, their channels, and churn.

use crate::RateMetric;

/// A point-in-time view of client connectivity to a broker.
///
/// Each connection carries the channels opened on it, so a consumer can
/// render a connection → channel tree without joining anything itself.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrokerConnectivitySnapshot {
    /// Cluster name as reported by the overview endpoint.
    pub cluster_name: String,

    /// RabbitMQ version. Empty if the broker did not report it.
    pub broker_version: String,

    /// Connection and channel open/close churn.
    pub churn: ConnectionChurn,

    /// Open connections, in the order the broker listed them.
    pub connections: Vec<ConnectionSnapshot>,
}

impl BrokerConnectivitySnapshot {
    /// Look up a connection by name.
    pub fn connection(&self, name: &str) -> Option<&ConnectionSnapshot> {
        self.connections.iter().find(|c| c.name == name)
    }

    /// Total channels across all connections.
    pub fn total_channels(&self) -> usize {
        self.connections.iter().map(|c| c.channels.len()).sum()
    }

    /// Total consumers across all channels.
    pub fn total_consumers(&self) -> u64 {
        self.connections
            .iter()
            .flat_map(|c| c.channels.iter())
            .map(|ch| ch.consumers)
            .sum()
    }

    /// Bytes per second flowing in both directions across all connections.
    pub fn total_traffic_rate(&self) -> f64 {
        self.connections
            .iter()
            .map(|c| c.network.sent.rate + c.network.received.rate)
            .sum()
    }
}

/// Connection and channel churn reported by the broker overview.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionChurn {
    /// Connections opened.
    pub connections_created: RateMetric,

    /// Connections closed.
    pub connections_closed: RateMetric,

    /// Channels opened.
    pub channels_created: RateMetric,

    /// Channels closed.
    pub channels_closed: RateMetric,
}

/// A single client connection.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionSnapshot {
    /// Connection name, e.g. `10.0.0.5:51234 -> 10.0.0.1:5672`.
    pub name: String,

    /// Node the connection terminates on.
    pub node: String,

    /// Connection state (`running`, `blocked`, `flow`, ...).
    pub state: String,

    /// Virtual host the connection is bound to.
    pub vhost: String,

    /// Authenticated user.
    pub user: String,

    /// Negotiated maximum channel count (0 = unlimited).
    pub channel_limit: u64,

    /// Bytes sent and received.
    pub network: NetworkTraffic,

    /// Channels open on this connection.
    pub channels: Vec<ChannelSnapshot>,
}

impl ConnectionSnapshot {
    /// Returns true if the broker is throttling this connection.
    pub fn is_blocked(&self) -> bool {
        matches!(self.state.as_str(), "blocked" | "blocking" | "flow")
    }
}

/// Network traffic for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkTraffic {
    /// Bytes sent to the client.
    pub sent: RateMetric,

    /// Bytes received from the client.
    pub received: RateMetric,
}

/// A single channel on a connection.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelSnapshot {
    /// Channel name, `<connection name> (<number>)`.
    pub name: String,

    /// Channel number within its connection.
    pub number: u64,

    /// Node the channel lives on.
    pub node: String,

    /// Consumers attached through this channel.
    pub consumers: u64,

    /// Prefetch (QoS) limit. Zero means unlimited.
    pub prefetch_count: u64,

    /// Delivered but not yet acknowledged messages.
    pub unacknowledged: u64,

    /// Published but not yet confirmed messages.
    pub unconfirmed: u64,

    /// Messages in an open transaction.
    pub uncommitted_messages: u64,

    /// Acknowledgements in an open transaction.
    pub uncommitted_acknowledgements: u64,
}
