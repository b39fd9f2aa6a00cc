//! Broker queues snapshot - message churn plus per-queue depth and rates.

use crate::RateMetric;

/// A point-in-time view of message flow through a broker's queues.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrokerQueuesSnapshot {
    /// Cluster name as reported by the overview endpoint.
    pub cluster_name: String,

    /// Broker-wide message churn.
    pub churn: MessageChurn,

    /// Queues, in the order the broker listed them.
    pub queues: Vec<QueueSnapshot>,
}

impl BrokerQueuesSnapshot {
    /// Look up a queue by name.
    pub fn queue(&self, name: &str) -> Option<&QueueSnapshot> {
        self.queues.iter().find(|q| q.name == name)
    }

    /// Messages ready for delivery across all queues.
    pub fn total_ready(&self) -> u64 {
        self.queues.iter().map(|q| q.depth.ready).sum()
    }

    /// Messages delivered but unacknowledged across all queues.
    pub fn total_unacknowledged(&self) -> u64 {
        self.queues.iter().map(|q| q.depth.unacknowledged).sum()
    }

    /// Queues holding ready messages with nobody consuming them.
    pub fn unconsumed_queues(&self) -> impl Iterator<Item = &QueueSnapshot> {
        self.queues
            .iter()
            .filter(|q| q.consumers == 0 && q.depth.ready > 0)
    }
}

/// Broker-wide message counters from the overview endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageChurn {
    /// Messages published into the broker.
    pub incoming: RateMetric,

    /// Messages delivered to consumers or fetched with basic.get.
    pub delivered: RateMetric,

    /// Messages redelivered.
    pub redelivered: RateMetric,

    /// Messages acknowledged by consumers.
    pub acknowledged: RateMetric,

    /// Mandatory messages returned to publishers as unroutable.
    pub returned_unroutable: RateMetric,

    /// Non-mandatory messages dropped as unroutable.
    pub dropped_unroutable: RateMetric,
}

/// A single queue.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueSnapshot {
    /// Queue name.
    pub name: String,

    /// Virtual host the queue lives in.
    pub vhost: String,

    /// Node hosting the queue leader.
    pub node: String,

    /// Queue state (`running`, `idle`, ...).
    pub state: String,

    /// Attached consumers.
    pub consumers: u64,

    /// Fraction of time consumers could take new deliveries.
    pub consumer_utilization: f64,

    /// Bytes of memory used by the queue process.
    pub memory: u64,

    /// Message counts.
    pub depth: QueueDepth,

    /// Message rates through this queue.
    pub churn: QueueChurn,
}

/// Message counts for a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueDepth {
    /// Messages ready for delivery.
    pub ready: u64,

    /// Delivered but unacknowledged messages.
    pub unacknowledged: u64,

    /// Ready plus unacknowledged.
    pub total: u64,
}

/// Message rates through a single queue.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueChurn {
    /// Messages published into the queue.
    pub incoming: RateMetric,

    /// Messages delivered or fetched.
    pub delivered: RateMetric,

    /// Messages acknowledged.
    pub acknowledged: RateMetric,
}
