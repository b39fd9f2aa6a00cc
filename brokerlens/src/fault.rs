//! Capture failures: fetch faults, assembly faults, and cancellation.

use std::fmt;

use brokerlens_client::ClientError;
use thiserror::Error;

/// A management API resource a lens fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Overview,
    Nodes,
    Connections,
    Channels,
    Queues,
}

impl Resource {
    /// The human-readable reason reported when fetching this resource fails.
    pub fn failure_reason(&self) -> &'static str {
        match self {
            Resource::Overview => "Unable to retrieve cluster information.",
            Resource::Nodes => "Unable to retrieve node information.",
            Resource::Connections => "Unable to retrieve connection information.",
            Resource::Channels => "Unable to retrieve channel information.",
            Resource::Queues => "Unable to retrieve queue information.",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Overview => "overview",
            Resource::Nodes => "nodes",
            Resource::Connections => "connections",
            Resource::Channels => "channels",
            Resource::Queues => "queues",
        };
        f.write_str(name)
    }
}

/// Raw payloads that could not be turned into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// A field every snapshot needs was absent or empty.
    #[error("{resource} payload is missing `{field}`")]
    MissingField {
        resource: Resource,
        field: &'static str,
    },

    /// A record could not be placed in the snapshot.
    #[error("invalid {resource} record: {detail}")]
    InvalidRecord { resource: Resource, detail: String },
}

/// Why a capture produced no snapshot. Delivered to observers.
#[derive(Debug, Clone, Error)]
pub enum SnapshotFault {
    /// A constituent fetch failed; later fetches were not attempted.
    #[error("{}", failure_reason(.resource))]
    Fetch {
        resource: Resource,
        #[source]
        error: ClientError,
    },

    /// Every fetch succeeded but the payloads could not be assembled.
    #[error("Unable to assemble snapshot: {0}")]
    Assembly(#[from] AssemblyError),
}

fn failure_reason(resource: &Resource) -> &'static str {
    resource.failure_reason()
}

impl SnapshotFault {
    /// The fetch that failed, or `None` for assembly faults.
    pub fn resource(&self) -> Option<Resource> {
        match self {
            SnapshotFault::Fetch { resource, .. } => Some(*resource),
            SnapshotFault::Assembly(_) => None,
        }
    }

    /// Human-readable reason, suitable for dashboards and alerts.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// The underlying client error text for fetch faults, or the assembly
    /// problem for assembly faults.
    pub fn detail(&self) -> String {
        match self {
            SnapshotFault::Fetch { error, .. } => error.to_string(),
            SnapshotFault::Assembly(err) => err.to_string(),
        }
    }
}

/// The failure branch of [`Lens::take_snapshot`](crate::Lens::take_snapshot).
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// A fetch or assembly fault. Observers have already been notified.
    #[error(transparent)]
    Fault(#[from] SnapshotFault),

    /// The caller cancelled the capture. Observers were not notified.
    #[error("snapshot capture cancelled")]
    Cancelled,
}

impl CaptureError {
    /// Returns true if the capture was abandoned at the caller's request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CaptureError::Cancelled)
    }

    /// The fault, if the capture failed rather than being cancelled.
    pub fn fault(&self) -> Option<&SnapshotFault> {
        match self {
            CaptureError::Fault(fault) => Some(fault),
            CaptureError::Cancelled => None,
        }
    }
}
