use std::collections::HashSet;

use async_trait::async_trait;
use brokerlens_client::model::{MessageStats, Overview, QueueInfo};
use brokerlens_client::BrokerApi;
use brokerlens_types::{BrokerQueuesSnapshot, MessageChurn, QueueChurn, QueueDepth, QueueSnapshot};

use super::{cluster_name, metric};
use crate::kind::{FetchSession, SnapshotKind};
use crate::{AssemblyError, CaptureError, Resource};

/// Queue depths, consumers and message flow.
///
/// Fetches the overview, then the queue list.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokerQueues;

/// Payloads a [`BrokerQueues`] capture collects.
#[derive(Debug, Clone, Default)]
pub struct BrokerQueuesRaw {
    pub overview: Overview,
    pub queues: Vec<QueueInfo>,
}

#[async_trait]
impl SnapshotKind for BrokerQueues {
    type Snapshot = BrokerQueuesSnapshot;
    type Raw = BrokerQueuesRaw;

    fn name(&self) -> &'static str {
        "queues"
    }

    async fn fetch(
        &self,
        api: &dyn BrokerApi,
        session: &FetchSession<'_>,
    ) -> Result<BrokerQueuesRaw, CaptureError> {
        let overview = session.run(Resource::Overview, api.overview()).await?;
        let queues = session.run(Resource::Queues, api.queues()).await?;
        Ok(BrokerQueuesRaw { overview, queues })
    }

    fn assemble(&self, raw: BrokerQueuesRaw) -> Result<BrokerQueuesSnapshot, AssemblyError> {
        assemble_queues(&raw.overview, &raw.queues)
    }
}

/// Build a queues snapshot.
///
/// A queue is identified by its vhost and name; the same pair appearing twice
/// is rejected.
pub fn assemble_queues(
    overview: &Overview,
    queues: &[QueueInfo],
) -> Result<BrokerQueuesSnapshot, AssemblyError> {
    let cluster_name = cluster_name(overview)?;

    let mut seen = HashSet::with_capacity(queues.len());
    let mut assembled = Vec::with_capacity(queues.len());
    for queue in queues {
        if queue.name.is_empty() {
            return Err(AssemblyError::InvalidRecord {
                resource: Resource::Queues,
                detail: "queue without a name".to_string(),
            });
        }
        if !seen.insert((queue.vhost.as_str(), queue.name.as_str())) {
            return Err(AssemblyError::InvalidRecord {
                resource: Resource::Queues,
                detail: format!(
                    "queue {} in vhost {} listed more than once",
                    queue.name, queue.vhost
                ),
            });
        }
        assembled.push(assemble_queue(queue));
    }

    let default_stats = MessageStats::default();
    let stats = overview.message_stats.as_ref().unwrap_or(&default_stats);

    Ok(BrokerQueuesSnapshot {
        cluster_name,
        churn: MessageChurn {
            incoming: metric(stats.publish, stats.publish_details.as_ref()),
            delivered: metric(stats.deliver_get, stats.deliver_get_details.as_ref()),
            redelivered: metric(stats.redeliver, stats.redeliver_details.as_ref()),
            acknowledged: metric(stats.ack, stats.ack_details.as_ref()),
            returned_unroutable: metric(
                stats.return_unroutable,
                stats.return_unroutable_details.as_ref(),
            ),
            dropped_unroutable: metric(
                stats.drop_unroutable,
                stats.drop_unroutable_details.as_ref(),
            ),
        },
        queues: assembled,
    })
}

fn assemble_queue(queue: &QueueInfo) -> QueueSnapshot {
    let default_stats = MessageStats::default();
    let stats = queue.message_stats.as_ref().unwrap_or(&default_stats);

    QueueSnapshot {
        name: queue.name.clone(),
        vhost: queue.vhost.clone(),
        node: queue.node.clone(),
        state: queue.state.clone(),
        consumers: queue.consumers.unwrap_or(0),
        consumer_utilization: queue.consumer_utilisation.unwrap_or(0.0),
        memory: queue.memory.unwrap_or(0),
        depth: QueueDepth {
            ready: queue.messages_ready.unwrap_or(0),
            unacknowledged: queue.messages_unacknowledged.unwrap_or(0),
            total: queue.messages.unwrap_or(0),
        },
        churn: QueueChurn {
            incoming: metric(stats.publish, stats.publish_details.as_ref()),
            delivered: metric(stats.deliver_get, stats.deliver_get_details.as_ref()),
            acknowledged: metric(stats.ack, stats.ack_details.as_ref()),
        },
    }
}
