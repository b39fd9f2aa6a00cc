use std::collections::HashSet;

use async_trait::async_trait;
use brokerlens_client::model::{NodeInfo, Overview};
use brokerlens_client::BrokerApi;
use brokerlens_types::{
    Capacity, ClusterSnapshot, DiskIoSnapshot, DiskSnapshot, MemorySnapshot, NodeSnapshot,
    OsSnapshot, RuntimeSnapshot,
};

use super::{cluster_name, metric};
use crate::kind::{FetchSession, SnapshotKind};
use crate::{AssemblyError, CaptureError, Resource};

/// Cluster topology and per-node resource usage.
///
/// Fetches the overview, then the node list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cluster;

/// Payloads a [`Cluster`] capture collects.
#[derive(Debug, Clone, Default)]
pub struct ClusterRaw {
    pub overview: Overview,
    pub nodes: Vec<NodeInfo>,
}

#[async_trait]
impl SnapshotKind for Cluster {
    type Snapshot = ClusterSnapshot;
    type Raw = ClusterRaw;

    fn name(&self) -> &'static str {
        "cluster"
    }

    async fn fetch(
        &self,
        api: &dyn BrokerApi,
        session: &FetchSession<'_>,
    ) -> Result<ClusterRaw, CaptureError> {
        let overview = session.run(Resource::Overview, api.overview()).await?;
        let nodes = session.run(Resource::Nodes, api.nodes()).await?;
        Ok(ClusterRaw { overview, nodes })
    }

    fn assemble(&self, raw: ClusterRaw) -> Result<ClusterSnapshot, AssemblyError> {
        assemble_cluster(&raw.overview, &raw.nodes)
    }
}

/// Build a cluster snapshot from an overview and the node list.
///
/// Nodes keep the order the API returned them in. Fails if the overview has
/// no cluster name or a node is unnamed or listed twice.
pub fn assemble_cluster(
    overview: &Overview,
    nodes: &[NodeInfo],
) -> Result<ClusterSnapshot, AssemblyError> {
    let cluster_name = cluster_name(overview)?;

    let mut seen = HashSet::with_capacity(nodes.len());
    let mut assembled = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.name.is_empty() {
            return Err(AssemblyError::InvalidRecord {
                resource: Resource::Nodes,
                detail: "node without a name".to_string(),
            });
        }
        if !seen.insert(node.name.as_str()) {
            return Err(AssemblyError::InvalidRecord {
                resource: Resource::Nodes,
                detail: format!("node {} listed more than once", node.name),
            });
        }
        assembled.push(assemble_node(node));
    }

    Ok(ClusterSnapshot {
        cluster_name,
        broker_version: overview.rabbitmq_version.clone().unwrap_or_default(),
        runtime_version: overview.erlang_version.clone().unwrap_or_default(),
        nodes: assembled,
    })
}

fn assemble_node(node: &NodeInfo) -> NodeSnapshot {
    NodeSnapshot {
        name: node.name.clone(),
        node_type: node.node_type.clone().unwrap_or_default(),
        is_running: node.running,
        uptime_ms: node.uptime.unwrap_or(0),
        os: OsSnapshot {
            process_id: node.os_pid.clone().unwrap_or_default(),
            file_descriptors: capacity(node.fd_used, node.fd_total),
            sockets: capacity(node.sockets_used, node.sockets_total),
        },
        runtime: RuntimeSnapshot {
            processes: capacity(node.proc_used, node.proc_total),
            run_queue: node.run_queue.unwrap_or(0),
            processors: node.processors.unwrap_or(0),
        },
        memory: MemorySnapshot {
            usage: capacity(node.mem_used, node.mem_limit),
            alarm_in_effect: node.mem_alarm,
        },
        disk: DiskSnapshot {
            free: node.disk_free.unwrap_or(0),
            free_limit: node.disk_free_limit.unwrap_or(0),
            alarm_in_effect: node.disk_free_alarm,
            io: DiskIoSnapshot {
                reads: metric(node.io_read_count, node.io_read_count_details.as_ref()),
                read_bytes: metric(node.io_read_bytes, node.io_read_bytes_details.as_ref()),
                writes: metric(node.io_write_count, node.io_write_count_details.as_ref()),
                write_bytes: metric(node.io_write_bytes, node.io_write_bytes_details.as_ref()),
                seeks: metric(node.io_seek_count, node.io_seek_count_details.as_ref()),
                syncs: metric(node.io_sync_count, node.io_sync_count_details.as_ref()),
            },
        },
        context_switches: metric(
            node.context_switches,
            node.context_switches_details.as_ref(),
        ),
        network_partitions: node.partitions.clone(),
    }
}

fn capacity(used: Option<u64>, limit: Option<u64>) -> Capacity {
    Capacity::new(used.unwrap_or(0), limit.unwrap_or(0))
}
