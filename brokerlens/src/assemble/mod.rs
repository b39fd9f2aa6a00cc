//! Pure assembly of raw management API payloads into snapshots.
//!
//! Every assembler is a plain function of its inputs: no I/O, no clock, no
//! randomness. Absent optional counters and rates become zero; only the
//! fields a snapshot cannot exist without produce an [`AssemblyError`].

mod cluster;
mod connectivity;
mod queues;

pub use cluster::{assemble_cluster, Cluster, ClusterRaw};
pub use connectivity::{assemble_connectivity, BrokerConnectivity, BrokerConnectivityRaw};
pub use queues::{assemble_queues, BrokerQueues, BrokerQueuesRaw};

use brokerlens_client::model::{Overview, RateDetails};
use brokerlens_types::RateMetric;

use crate::{AssemblyError, Resource};

/// Pair a counter with its rate, zeroing whichever half is absent.
pub(crate) fn metric(total: Option<u64>, details: Option<&RateDetails>) -> RateMetric {
    RateMetric::new(
        total.unwrap_or(0),
        details.map(|d| d.rate).unwrap_or(0.0),
    )
}

pub(crate) fn cluster_name(overview: &Overview) -> Result<String, AssemblyError> {
    match overview.cluster_name.as_deref() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(AssemblyError::MissingField {
            resource: Resource::Overview,
            field: "cluster_name",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_defaults_missing_halves_to_zero() {
        assert_eq!(metric(None, None), RateMetric::ZERO);
        assert_eq!(metric(Some(5), None), RateMetric::new(5, 0.0));
        assert_eq!(
            metric(None, Some(&RateDetails { rate: 1.5 })),
            RateMetric::new(0, 1.5)
        );
    }

    #[test]
    fn cluster_name_is_required() {
        let mut overview = Overview::default();
        assert!(cluster_name(&overview).is_err());

        overview.cluster_name = Some(String::new());
        assert!(cluster_name(&overview).is_err());

        overview.cluster_name = Some("prod".to_string());
        assert_eq!(cluster_name(&overview).unwrap(), "prod");
    }

    #[test]
    fn assembly_is_deterministic() {
        use brokerlens_client::model::{
            ChannelInfo, ConnectionDetails, ConnectionInfo, NodeInfo, QueueInfo,
        };

        // Sparse payloads: most optional sections are null
        let overview: Overview = serde_json::from_str(
            r#"{"cluster_name": "prod", "churn_rates": null, "message_stats": null}"#,
        )
        .unwrap();
        let nodes = vec![NodeInfo {
            name: "rabbit@a".to_string(),
            ..Default::default()
        }];
        let connections = vec![ConnectionInfo {
            name: "c1".to_string(),
            ..Default::default()
        }];
        let channels = vec![ChannelInfo {
            name: "c1 (1)".to_string(),
            number: 1,
            connection_details: Some(ConnectionDetails {
                name: "c1".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }];
        let queues = vec![QueueInfo {
            name: "q".to_string(),
            vhost: "/".to_string(),
            ..Default::default()
        }];

        let bytes = || {
            (
                serde_json::to_vec(&assemble_cluster(&overview, &nodes).unwrap()).unwrap(),
                serde_json::to_vec(
                    &assemble_connectivity(&overview, &connections, &channels).unwrap(),
                )
                .unwrap(),
                serde_json::to_vec(&assemble_queues(&overview, &queues).unwrap()).unwrap(),
            )
        };

        assert_eq!(bytes(), bytes());
    }
}
