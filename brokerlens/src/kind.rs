//! The per-kind seam a lens is generic over.

use std::future::Future;

use async_trait::async_trait;
use brokerlens_client::{BrokerApi, ClientError};
use tracing::debug;

use crate::{AssemblyError, CancelToken, CaptureError, Resource, SnapshotFault};

/// One kind of snapshot: which resources to fetch and how to combine them.
///
/// `fetch` performs the kind's fetches in order through a [`FetchSession`],
/// returning at the first failure. `assemble` is pure and synchronous: the
/// same raw payloads always produce the same snapshot.
#[async_trait]
pub trait SnapshotKind: Send + Sync + 'static {
    /// The assembled, immutable view.
    type Snapshot: Clone + Send + Sync + 'static;

    /// Every payload the fetch sequence collected.
    type Raw: Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch every resource this kind needs.
    async fn fetch(
        &self,
        api: &dyn BrokerApi,
        session: &FetchSession<'_>,
    ) -> Result<Self::Raw, CaptureError>;

    /// Combine the fetched payloads.
    fn assemble(&self, raw: Self::Raw) -> Result<Self::Snapshot, AssemblyError>;
}

/// Runs the individual fetches of one capture.
///
/// Checks cancellation before each fetch starts and abandons a fetch that is
/// in flight when cancellation arrives. A failed fetch becomes a
/// [`SnapshotFault::Fetch`] naming the resource.
#[derive(Debug)]
pub struct FetchSession<'a> {
    cancel: &'a CancelToken,
    lens: &'static str,
}

impl<'a> FetchSession<'a> {
    pub(crate) fn new(cancel: &'a CancelToken, lens: &'static str) -> Self {
        Self { cancel, lens }
    }

    /// Await one fetch.
    pub async fn run<T, F>(&self, resource: Resource, fetch: F) -> Result<T, CaptureError>
    where
        T: Send,
        F: Future<Output = Result<T, ClientError>> + Send,
    {
        if self.cancel.is_cancelled() {
            debug!(lens = self.lens, %resource, "Cancelled before fetch");
            return Err(CaptureError::Cancelled);
        }

        debug!(lens = self.lens, %resource, "Fetching");

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(lens = self.lens, %resource, "Cancelled during fetch");
                Err(CaptureError::Cancelled)
            }
            outcome = fetch => outcome.map_err(|error| {
                CaptureError::Fault(SnapshotFault::Fetch { resource, error })
            }),
        }
    }
}
