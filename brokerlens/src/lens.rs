//! The snapshot lens: capture, record, notify.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use brokerlens_client::BrokerApi;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::assemble::{BrokerConnectivity, BrokerQueues, Cluster};
use crate::history::History;
use crate::kind::{FetchSession, SnapshotKind};
use crate::observer::{ChannelObserver, LensEvent, Observer, ObserverRegistry, Subscription};
use crate::{CancelToken, CaptureError, CapturedSnapshot, LensConfig, SnapshotFault};

/// Lens over cluster topology and node statistics.
pub type ClusterLens = Lens<Cluster>;

/// Lens over connections and their channels.
pub type BrokerConnectivityLens = Lens<BrokerConnectivity>;

/// Lens over queues.
pub type BrokerQueuesLens = Lens<BrokerQueues>;

type Captured<K> = Arc<CapturedSnapshot<<K as SnapshotKind>::Snapshot>>;

/// Captures point-in-time snapshots of one kind, keeps a bounded history of
/// them, and notifies observers of every outcome.
///
/// A capture either fetches every resource the kind needs and assembles a
/// snapshot, or stops at the first fault. Faulted and cancelled captures
/// leave history untouched. Observers hear about successes and faults, never
/// about cancellations.
///
/// A lens is `Send + Sync`; captures may run concurrently on a shared lens.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use brokerlens::{CancelToken, ClusterLens, ManagementClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = ManagementClient::builder()
///         .endpoint("http://localhost:15672")
///         .build()?;
///     let lens = ClusterLens::cluster(Arc::new(client));
///
///     match lens.take_snapshot(&CancelToken::none()).await {
///         Ok(captured) => println!("{} nodes", captured.snapshot().nodes.len()),
///         Err(err) => eprintln!("{}", err),
///     }
///     Ok(())
/// }
/// ```
pub struct Lens<K: SnapshotKind> {
    kind: K,
    api: Arc<dyn BrokerApi>,
    history: RwLock<History<K::Snapshot>>,
    observers: ObserverRegistry<K::Snapshot>,
}

impl Lens<Cluster> {
    /// Create a cluster lens with default settings.
    pub fn cluster(api: Arc<dyn BrokerApi>) -> Self {
        Self::new(Cluster, api)
    }
}

impl Lens<BrokerConnectivity> {
    /// Create a connectivity lens with default settings.
    pub fn connectivity(api: Arc<dyn BrokerApi>) -> Self {
        Self::new(BrokerConnectivity, api)
    }
}

impl Lens<BrokerQueues> {
    /// Create a queues lens with default settings.
    pub fn queues(api: Arc<dyn BrokerApi>) -> Self {
        Self::new(BrokerQueues, api)
    }
}

impl<K: SnapshotKind> Lens<K> {
    /// Create a lens with default settings.
    pub fn new(kind: K, api: Arc<dyn BrokerApi>) -> Self {
        Self::with_config(kind, api, &LensConfig::default())
    }

    /// Create a lens with the given settings.
    pub fn with_config(kind: K, api: Arc<dyn BrokerApi>, config: &LensConfig) -> Self {
        Self {
            kind,
            api,
            history: RwLock::new(History::with_capacity(config.history_capacity)),
            observers: ObserverRegistry::new(),
        }
    }

    /// The snapshot kind this lens captures.
    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Capture one snapshot.
    ///
    /// Fetches run in order; `cancel` is checked before each starts and
    /// abandons one in flight. On success the capture is appended to history,
    /// observers are notified, and it is returned. On a fetch or assembly
    /// fault, observers are notified of the fault and it is returned as
    /// [`CaptureError::Fault`]. On cancellation nothing is recorded or
    /// notified and [`CaptureError::Cancelled`] is returned.
    pub async fn take_snapshot(&self, cancel: &CancelToken) -> Result<Captured<K>, CaptureError> {
        let lens = self.kind.name();
        let session = FetchSession::new(cancel, lens);

        let raw = match self.kind.fetch(self.api.as_ref(), &session).await {
            Ok(raw) => raw,
            Err(CaptureError::Cancelled) => {
                debug!(lens, "Capture cancelled");
                return Err(CaptureError::Cancelled);
            }
            Err(CaptureError::Fault(fault)) => return Err(self.fault(fault)),
        };

        let snapshot = match self.kind.assemble(raw) {
            Ok(snapshot) => snapshot,
            Err(err) => return Err(self.fault(err.into())),
        };

        let captured = Arc::new(CapturedSnapshot::new(snapshot));
        let evicted = self.history.write().push(Arc::clone(&captured));
        if let Some(old) = evicted {
            debug!(lens, evicted = %old.id(), "History full, evicted oldest capture");
        }

        info!(lens, id = %captured.id(), "Captured snapshot");
        self.observers.notify_snapshot(&captured);
        Ok(captured)
    }

    fn fault(&self, fault: SnapshotFault) -> CaptureError {
        warn!(
            lens = self.kind.name(),
            resource = ?fault.resource(),
            detail = %fault.detail(),
            "{}",
            fault
        );
        self.observers.notify_fault(&fault);
        CaptureError::Fault(fault)
    }

    /// Register an observer for every later capture. Returns the lens for
    /// chaining.
    ///
    /// Registering the same `Arc` twice has no effect. The registration lasts
    /// as long as the lens; use [`subscribe`](Self::subscribe) for one that
    /// can be removed.
    pub fn register_observer(&self, observer: Arc<dyn Observer<K::Snapshot>>) -> &Self {
        self.observers.register(observer);
        self
    }

    /// Register several observers, in order. An empty collection is a no-op.
    pub fn register_observers<I>(&self, observers: I) -> &Self
    where
        I: IntoIterator<Item = Arc<dyn Observer<K::Snapshot>>>,
    {
        for observer in observers {
            self.observers.register(observer);
        }
        self
    }

    /// Register an observer and get a handle that removes it when dropped.
    ///
    /// Dropping the handle never removes a registration made with
    /// [`register_observer`](Self::register_observer), nor one still held by
    /// another handle for the same `Arc`.
    pub fn subscribe(&self, observer: Arc<dyn Observer<K::Snapshot>>) -> Subscription {
        self.observers.subscribe(observer)
    }

    /// Receive capture outcomes on a channel holding up to `buffer` events.
    ///
    /// Events that arrive while the channel is full are dropped. Dropping the
    /// returned subscription stops delivery.
    pub fn events(&self, buffer: usize) -> (Subscription, mpsc::Receiver<LensEvent<K::Snapshot>>) {
        let (observer, rx) = ChannelObserver::channel(buffer);
        (self.subscribe(Arc::new(observer)), rx)
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// The history as of this call.
    ///
    /// The returned value is a copy: later captures do not change it.
    pub fn history(&self) -> History<K::Snapshot> {
        self.history.read().clone()
    }

    /// The most recent successful capture.
    pub fn latest(&self) -> Option<Captured<K>> {
        self.history.read().latest().cloned()
    }

    /// Capture on a fixed interval in a background task until stopped.
    ///
    /// The first capture runs immediately. Faults are reported to observers
    /// as usual and do not stop the loop. Requires a tokio runtime.
    pub fn watch(self: &Arc<Self>, interval: Duration) -> WatchHandle {
        let cancel = CancelToken::new();
        let lens = Arc::clone(self);
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        if let Err(CaptureError::Cancelled) = lens.take_snapshot(&token).await {
                            break;
                        }
                    }
                    _ = token.cancelled() => break,
                }
            }
            debug!(lens = lens.kind.name(), "Watch stopped");
        });

        info!(lens = self.kind.name(), ?interval, "Watching");
        WatchHandle {
            cancel,
            task: Some(task),
        }
    }
}

impl<K: SnapshotKind> fmt::Debug for Lens<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens")
            .field("kind", &self.kind.name())
            .field("history", &self.history.read().len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Handle for a background watch started with [`Lens::watch`].
///
/// Dropping the handle stops the watch.
#[derive(Debug)]
pub struct WatchHandle {
    cancel: CancelToken,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Signal the watch to stop without waiting for it.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop the watch and wait for an in-flight capture to wind down.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Returns true once the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
