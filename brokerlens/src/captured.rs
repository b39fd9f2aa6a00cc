//! The unit a lens stores in history and hands to observers.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

/// Opaque, process-unique identifier of one successful capture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A snapshot together with when it was captured and its identifier.
///
/// Only ever constructed by a lens after every constituent fetch and the
/// assembly step succeeded, so there is no partial or empty variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedSnapshot<T> {
    id: SnapshotId,
    timestamp_ms: u64,
    snapshot: T,
}

impl<T> CapturedSnapshot<T> {
    /// Wrap a freshly assembled snapshot with a new id and the current time.
    pub(crate) fn new(snapshot: T) -> Self {
        Self::with_timestamp(snapshot, current_timestamp_ms())
    }

    pub(crate) fn with_timestamp(snapshot: T, timestamp_ms: u64) -> Self {
        Self {
            id: SnapshotId::generate(),
            timestamp_ms,
            snapshot,
        }
    }

    /// The capture's identifier.
    pub fn id(&self) -> &SnapshotId {
        &self.id
    }

    /// Wall-clock capture time in milliseconds since the Unix epoch.
    ///
    /// Not guaranteed to be monotonic across captures.
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Wall-clock capture time.
    pub fn timestamp(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.timestamp_ms)
    }

    /// The captured snapshot.
    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
