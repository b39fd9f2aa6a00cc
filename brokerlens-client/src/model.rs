//! Response payloads from the RabbitMQ Management HTTP API.
//!
//! Fields mirror the API's JSON names; this is a subset of each payload,
//! covering what the assemblers read plus a few identifying fields useful
//! when inspecting raw responses. Counters the
//! broker may omit (stats collection disabled, object too new to have been
//! sampled, older broker versions) are `Option`s so that decoding never
//! fails on a sparse payload; consumers decide what absence means.

use serde::Deserialize;

/// `GET /api/overview`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Overview {
    pub cluster_name: Option<String>,
    pub rabbitmq_version: Option<String>,
    pub erlang_version: Option<String>,
    pub management_version: Option<String>,
    /// Node that served the request.
    pub node: Option<String>,
    pub churn_rates: Option<ChurnRates>,
    pub message_stats: Option<MessageStats>,
    pub queue_totals: Option<QueueTotals>,
    pub object_totals: Option<ObjectTotals>,
}

/// Connection, channel and queue open/close counters.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChurnRates {
    pub connection_created: Option<u64>,
    pub connection_created_details: Option<RateDetails>,
    pub connection_closed: Option<u64>,
    pub connection_closed_details: Option<RateDetails>,
    pub channel_created: Option<u64>,
    pub channel_created_details: Option<RateDetails>,
    pub channel_closed: Option<u64>,
    pub channel_closed_details: Option<RateDetails>,
    pub queue_declared: Option<u64>,
    pub queue_declared_details: Option<RateDetails>,
    pub queue_created: Option<u64>,
    pub queue_created_details: Option<RateDetails>,
    pub queue_deleted: Option<u64>,
    pub queue_deleted_details: Option<RateDetails>,
}

/// Message counters, used both broker-wide and per queue.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MessageStats {
    pub publish: Option<u64>,
    pub publish_details: Option<RateDetails>,
    pub deliver_get: Option<u64>,
    pub deliver_get_details: Option<RateDetails>,
    pub redeliver: Option<u64>,
    pub redeliver_details: Option<RateDetails>,
    pub ack: Option<u64>,
    pub ack_details: Option<RateDetails>,
    pub confirm: Option<u64>,
    pub confirm_details: Option<RateDetails>,
    pub return_unroutable: Option<u64>,
    pub return_unroutable_details: Option<RateDetails>,
    pub drop_unroutable: Option<u64>,
    pub drop_unroutable_details: Option<RateDetails>,
}

/// The `*_details` object attached to a counter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct RateDetails {
    #[serde(default)]
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct QueueTotals {
    pub messages: Option<u64>,
    pub messages_ready: Option<u64>,
    pub messages_unacknowledged: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ObjectTotals {
    pub connections: Option<u64>,
    pub channels: Option<u64>,
    pub consumers: Option<u64>,
    pub exchanges: Option<u64>,
    pub queues: Option<u64>,
}

/// `GET /api/nodes` element.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub running: bool,
    pub uptime: Option<u64>,
    pub os_pid: Option<String>,
    pub fd_used: Option<u64>,
    pub fd_total: Option<u64>,
    pub sockets_used: Option<u64>,
    pub sockets_total: Option<u64>,
    pub proc_used: Option<u64>,
    pub proc_total: Option<u64>,
    pub run_queue: Option<u64>,
    pub processors: Option<u64>,
    pub mem_used: Option<u64>,
    pub mem_limit: Option<u64>,
    #[serde(default)]
    pub mem_alarm: bool,
    pub disk_free: Option<u64>,
    pub disk_free_limit: Option<u64>,
    #[serde(default)]
    pub disk_free_alarm: bool,
    pub io_read_count: Option<u64>,
    pub io_read_count_details: Option<RateDetails>,
    pub io_read_bytes: Option<u64>,
    pub io_read_bytes_details: Option<RateDetails>,
    pub io_write_count: Option<u64>,
    pub io_write_count_details: Option<RateDetails>,
    pub io_write_bytes: Option<u64>,
    pub io_write_bytes_details: Option<RateDetails>,
    pub io_seek_count: Option<u64>,
    pub io_seek_count_details: Option<RateDetails>,
    pub io_sync_count: Option<u64>,
    pub io_sync_count_details: Option<RateDetails>,
    pub context_switches: Option<u64>,
    pub context_switches_details: Option<RateDetails>,
    #[serde(default)]
    pub partitions: Vec<String>,
}

/// `GET /api/connections` element.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ConnectionInfo {
    pub name: String,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub vhost: String,
    #[serde(default)]
    pub user: String,
    pub protocol: Option<String>,
    pub peer_host: Option<String>,
    pub peer_port: Option<u16>,
    pub channel_max: Option<u64>,
    pub channels: Option<u64>,
    pub send_oct: Option<u64>,
    pub send_oct_details: Option<RateDetails>,
    pub recv_oct: Option<u64>,
    pub recv_oct_details: Option<RateDetails>,
}

/// `GET /api/channels` element.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChannelInfo {
    pub name: String,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub vhost: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub state: String,
    pub connection_details: Option<ConnectionDetails>,
    pub consumer_count: Option<u64>,
    pub prefetch_count: Option<u64>,
    pub messages_unacknowledged: Option<u64>,
    pub messages_unconfirmed: Option<u64>,
    pub messages_uncommitted: Option<u64>,
    pub acks_uncommitted: Option<u64>,
}

/// Back-reference from a channel to its owning connection.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ConnectionDetails {
    #[serde(default)]
    pub name: String,
    pub peer_host: Option<String>,
    pub peer_port: Option<u16>,
}

/// `GET /api/queues` element.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct QueueInfo {
    pub name: String,
    #[serde(default)]
    pub vhost: String,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub state: String,
    pub consumers: Option<u64>,
    pub consumer_utilisation: Option<f64>,
    pub memory: Option<u64>,
    pub messages: Option<u64>,
    pub messages_ready: Option<u64>,
    pub messages_unacknowledged: Option<u64>,
    pub message_stats: Option<MessageStats>,
}
