//! Cluster snapshot - topology plus per-node resource statistics.

use crate::{Capacity, RateMetric};

/// A point-in-time view of a RabbitMQ cluster and each of its nodes.
///
/// # Example
///
/// ```rust
/// use brokerlens_types::{ClusterSnapshot, NodeSnapshot};
///
/// let snapshot = ClusterSnapshot {
///     cluster_name: "rabbit@prod".to_string(),
///     broker_version: "3.13.2".to_string(),
///     runtime_version: "26.2".to_string(),
///     nodes: vec![NodeSnapshot {
///         name: "rabbit@node-1".to_string(),
///         is_running: true,
///         ..Default::default()
///     }],
/// };
///
/// assert_eq!(snapshot.running_nodes().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterSnapshot {
    /// Cluster name as reported by the overview endpoint.
    pub cluster_name: String,

    /// RabbitMQ version. Empty if the broker did not report it.
    pub broker_version: String,

    /// Erlang/OTP version. Empty if the broker did not report it.
    pub runtime_version: String,

    /// One entry per cluster member, in the order the broker listed them.
    pub nodes: Vec<NodeSnapshot>,
}

impl ClusterSnapshot {
    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Nodes the broker reports as running.
    pub fn running_nodes(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.nodes.iter().filter(|n| n.is_running)
    }

    /// Nodes with a memory or disk alarm in effect.
    pub fn alarmed_nodes(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.nodes.iter().filter(|n| n.has_alarm())
    }

    /// Returns true if any node observes a network partition.
    pub fn is_partitioned(&self) -> bool {
        self.nodes.iter().any(|n| !n.network_partitions.is_empty())
    }
}

/// Statistics for a single cluster node.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSnapshot {
    /// Node name, e.g. `rabbit@node-1`.
    pub name: String,

    /// Node type (`disc` or `ram`).
    pub node_type: String,

    /// Whether the node is up.
    pub is_running: bool,

    /// Milliseconds since the node started.
    pub uptime_ms: u64,

    /// Operating system process details.
    pub os: OsSnapshot,

    /// Erlang runtime details.
    pub runtime: RuntimeSnapshot,

    /// Memory usage and alarm state.
    pub memory: MemorySnapshot,

    /// Free disk space, alarm state and I/O counters.
    pub disk: DiskSnapshot,

    /// Erlang scheduler context switches.
    pub context_switches: RateMetric,

    /// Nodes this node cannot see.
    pub network_partitions: Vec<String>,
}

impl NodeSnapshot {
    /// Returns true if either the memory or the disk alarm is in effect.
    pub fn has_alarm(&self) -> bool {
        self.memory.alarm_in_effect || self.disk.alarm_in_effect
    }
}

/// OS-level process statistics for a node.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OsSnapshot {
    /// OS process identifier. Empty if unknown.
    pub process_id: String,

    /// Open file descriptors against the descriptor limit.
    pub file_descriptors: Capacity,

    /// Open sockets against the socket limit.
    pub sockets: Capacity,
}

/// Erlang runtime statistics for a node.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuntimeSnapshot {
    /// Erlang processes in use against the process limit.
    pub processes: Capacity,

    /// Average run queue length.
    pub run_queue: u64,

    /// Number of scheduler threads available.
    pub processors: u64,
}

/// Memory statistics for a node.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemorySnapshot {
    /// Bytes in use against the high watermark.
    pub usage: Capacity,

    /// Whether the memory alarm is raised.
    pub alarm_in_effect: bool,
}

/// Disk statistics for a node.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiskSnapshot {
    /// Free bytes on the data partition.
    pub free: u64,

    /// Free-space threshold below which the alarm triggers.
    pub free_limit: u64,

    /// Whether the disk alarm is raised.
    pub alarm_in_effect: bool,

    /// Disk I/O counters.
    pub io: DiskIoSnapshot,
}

/// Disk I/O counters for a node.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiskIoSnapshot {
    /// Read operations.
    pub reads: RateMetric,

    /// Bytes read.
    pub read_bytes: RateMetric,

    /// Write operations.
    pub writes: RateMetric,

    /// Bytes written.
    pub write_bytes: RateMetric,

    /// Seek operations.
    pub seeks: RateMetric,

    /// fsync operations.
    pub syncs: RateMetric,
}
