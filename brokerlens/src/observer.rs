//! Observer registration and dispatch.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::{CapturedSnapshot, SnapshotFault};

/// Receives the outcome of every capture on a lens.
///
/// Callbacks run synchronously on the capturing task, after the history
/// append, so they should return quickly. Hand slow work off to a channel
/// (see [`ChannelObserver`]).
pub trait Observer<T>: Send + Sync {
    /// A capture succeeded.
    fn on_snapshot(&self, captured: &Arc<CapturedSnapshot<T>>);

    /// A capture faulted. Not called for cancelled captures.
    fn on_fault(&self, fault: &SnapshotFault);
}

/// An owned capture outcome, as delivered through channels.
#[derive(Debug, Clone)]
pub enum LensEvent<T> {
    Captured(Arc<CapturedSnapshot<T>>),
    Faulted(SnapshotFault),
}

impl<T> LensEvent<T> {
    /// The capture, if this event reports one.
    pub fn captured(&self) -> Option<&Arc<CapturedSnapshot<T>>> {
        match self {
            LensEvent::Captured(c) => Some(c),
            LensEvent::Faulted(_) => None,
        }
    }

    /// The fault, if this event reports one.
    pub fn fault(&self) -> Option<&SnapshotFault> {
        match self {
            LensEvent::Captured(_) => None,
            LensEvent::Faulted(f) => Some(f),
        }
    }
}

/// Forwards capture outcomes into a tokio channel.
///
/// Sends are best effort: if the channel is full or closed the event is
/// dropped rather than blocking the capture.
#[derive(Debug)]
pub struct ChannelObserver<T> {
    tx: mpsc::Sender<LensEvent<T>>,
}

impl<T> ChannelObserver<T> {
    /// Create an observer and the receiver its events arrive on.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<LensEvent<T>>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }
}

impl<T: Send + Sync> Observer<T> for ChannelObserver<T> {
    fn on_snapshot(&self, captured: &Arc<CapturedSnapshot<T>>) {
        let _ = self.tx.try_send(LensEvent::Captured(Arc::clone(captured)));
    }

    fn on_fault(&self, fault: &SnapshotFault) {
        let _ = self.tx.try_send(LensEvent::Faulted(fault.clone()));
    }
}

/// Observer built from a pair of closures. See [`observer_fn`].
pub struct FnObserver<S, F> {
    on_snapshot: S,
    on_fault: F,
}

/// Build an observer from closures.
///
/// # Example
///
/// ```rust
/// use brokerlens::observer_fn;
/// use brokerlens::types::ClusterSnapshot;
///
/// let observer = observer_fn(
///     |captured: &std::sync::Arc<brokerlens::CapturedSnapshot<ClusterSnapshot>>| {
///         println!("{} nodes", captured.snapshot().nodes.len());
///     },
///     |fault| eprintln!("{}", fault),
/// );
/// # let _ = observer;
/// ```
pub fn observer_fn<T, S, F>(on_snapshot: S, on_fault: F) -> FnObserver<S, F>
where
    S: Fn(&Arc<CapturedSnapshot<T>>) + Send + Sync,
    F: Fn(&SnapshotFault) + Send + Sync,
{
    FnObserver {
        on_snapshot,
        on_fault,
    }
}

impl<T, S, F> Observer<T> for FnObserver<S, F>
where
    S: Fn(&Arc<CapturedSnapshot<T>>) + Send + Sync,
    F: Fn(&SnapshotFault) + Send + Sync,
{
    fn on_snapshot(&self, captured: &Arc<CapturedSnapshot<T>>) {
        (self.on_snapshot)(captured)
    }

    fn on_fault(&self, fault: &SnapshotFault) {
        (self.on_fault)(fault)
    }
}

impl<S, F> fmt::Debug for FnObserver<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnObserver").finish_non_exhaustive()
    }
}

struct Entry<T> {
    id: u64,
    observer: Arc<dyn Observer<T>>,
    // Registered without a handle; never removed.
    permanent: bool,
    // Live subscriptions holding this entry.
    holds: usize,
}

struct RegistryInner<T> {
    next_id: AtomicU64,
    entries: RwLock<Vec<Entry<T>>>,
}

impl<T> RegistryInner<T> {
    fn insert(&self, observer: Arc<dyn Observer<T>>, permanent: bool) -> u64 {
        let mut entries = self.entries.write();
        if let Some(existing) = entries
            .iter_mut()
            .find(|e| same_observer(&e.observer, &observer))
        {
            if permanent {
                existing.permanent = true;
            } else {
                existing.holds += 1;
            }
            return existing.id;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        entries.push(Entry {
            id,
            observer,
            permanent,
            holds: usize::from(!permanent),
        });
        id
    }
}

/// Type-erased release so subscriptions need not be generic.
trait Release: Send + Sync {
    /// Drop one hold on `id`, making the entry permanent if `keep` is set.
    /// Returns true if the entry was removed.
    fn release(&self, id: u64, keep: bool) -> bool;
}

impl<T> Release for RegistryInner<T> {
    fn release(&self, id: u64, keep: bool) -> bool {
        let mut entries = self.entries.write();
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return false;
        };

        let entry = &mut entries[index];
        entry.holds = entry.holds.saturating_sub(1);
        entry.permanent |= keep;
        if entry.holds == 0 && !entry.permanent {
            entries.remove(index);
            return true;
        }
        false
    }
}

/// Thread-safe set of observers, notified in registration order.
///
/// Each observer (by `Arc` identity) appears at most once. It stays
/// registered while it was ever added with [`register`](Self::register) or
/// while any [`Subscription`] for it is alive.
pub struct ObserverRegistry<T> {
    inner: Arc<RegistryInner<T>>,
}

impl<T: 'static> ObserverRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                next_id: AtomicU64::new(1),
                entries: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Add an observer for the registry's lifetime, returning its id.
    ///
    /// Registering the same observer (same allocation) again is a no-op and
    /// returns the existing id.
    pub fn register(&self, observer: Arc<dyn Observer<T>>) -> u64 {
        self.inner.insert(observer, true)
    }

    /// Add an observer and return a handle that releases it when dropped.
    ///
    /// The observer is removed once every handle for it is gone, unless it
    /// was also added with [`register`](Self::register).
    pub fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        let id = self.inner.insert(observer, false);
        let inner: Arc<dyn Release> = self.inner.clone();
        Subscription {
            registry: Arc::downgrade(&inner),
            id,
            active: true,
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Returns true if no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Notify every observer of a successful capture.
    pub fn notify_snapshot(&self, captured: &Arc<CapturedSnapshot<T>>) {
        for observer in self.observers() {
            observer.on_snapshot(captured);
        }
    }

    /// Notify every observer of a fault.
    pub fn notify_fault(&self, fault: &SnapshotFault) {
        for observer in self.observers() {
            observer.on_fault(fault);
        }
    }

    // Copy the set out so callbacks run without the lock held; an observer
    // may register or unsubscribe from inside its callback.
    fn observers(&self) -> Vec<Arc<dyn Observer<T>>> {
        self.inner
            .entries
            .read()
            .iter()
            .map(|e| Arc::clone(&e.observer))
            .collect()
    }
}

impl<T: 'static> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObserverRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.inner.entries.read().len())
            .finish()
    }
}

fn same_observer<T>(a: &Arc<dyn Observer<T>>, b: &Arc<dyn Observer<T>>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Disposal handle for an observer registration.
///
/// Dropping the handle (or calling [`unsubscribe`](Self::unsubscribe))
/// releases the observer; it is removed when no other handle or permanent
/// registration holds it. The handle does not keep the lens alive; once the
/// lens is gone, disposal is a no-op.
pub struct Subscription {
    registry: Weak<dyn Release>,
    id: u64,
    active: bool,
}

impl Subscription {
    /// The registration id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Release the observer now. Returns true if this removed it, false if
    /// it is still held elsewhere or was already gone.
    pub fn unsubscribe(mut self) -> bool {
        self.dispose(false)
    }

    /// Keep the observer registered for the rest of the lens's lifetime.
    pub fn detach(mut self) {
        self.dispose(true);
    }

    fn dispose(&mut self, keep: bool) -> bool {
        if !std::mem::replace(&mut self.active, false) {
            return false;
        }
        self.registry
            .upgrade()
            .map(|registry| registry.release(self.id, keep))
            .unwrap_or(false)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose(false);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Resource;
    use brokerlens_client::ClientError;
    use parking_lot::Mutex;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Observer<u32> for Recorder {
        fn on_snapshot(&self, captured: &Arc<CapturedSnapshot<u32>>) {
            self.log
                .lock()
                .push(format!("{}:{}", self.label, captured.snapshot()));
        }

        fn on_fault(&self, fault: &SnapshotFault) {
            self.log.lock().push(format!("{}:{}", self.label, fault));
        }
    }

    fn recorder(label: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Observer<u32>> {
        Arc::new(Recorder {
            label,
            log: Arc::clone(log),
        })
    }

    fn fault() -> SnapshotFault {
        SnapshotFault::Fetch {
            resource: Resource::Queues,
            error: ClientError::Timeout,
        }
    }

    #[test]
    fn notifies_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        registry.register(recorder("a", &log));
        registry.register(recorder("b", &log));

        registry.notify_snapshot(&Arc::new(CapturedSnapshot::new(7)));
        registry.notify_fault(&fault());

        assert_eq!(
            *log.lock(),
            vec![
                "a:7",
                "b:7",
                "a:Unable to retrieve queue information.",
                "b:Unable to retrieve queue information.",
            ]
        );
    }

    #[test]
    fn registering_same_observer_twice_is_idempotent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        let observer = recorder("a", &log);

        let first = registry.register(Arc::clone(&observer));
        let second = registry.register(observer);

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        let sub = registry.subscribe(recorder("a", &log));
        assert_eq!(registry.len(), 1);

        drop(sub);
        assert!(registry.is_empty());

        registry.notify_snapshot(&Arc::new(CapturedSnapshot::new(1)));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn unsubscribe_reports_removal() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        let sub = registry.subscribe(recorder("a", &log));
        assert!(sub.unsubscribe());
        assert!(registry.is_empty());
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        registry.subscribe(recorder("a", &log)).detach();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn subscription_never_removes_a_permanent_registration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        let observer = recorder("a", &log);

        let id = registry.register(Arc::clone(&observer));
        let sub = registry.subscribe(Arc::clone(&observer));
        assert_eq!(sub.id(), id);
        assert!(!sub.unsubscribe());

        registry.notify_snapshot(&Arc::new(CapturedSnapshot::new(1)));
        assert_eq!(registry.len(), 1);
        assert_eq!(*log.lock(), vec!["a:1"]);
    }

    #[test]
    fn register_after_subscribe_outlives_the_handle() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        let observer = recorder("a", &log);

        let sub = registry.subscribe(Arc::clone(&observer));
        registry.register(observer);
        drop(sub);

        registry.notify_snapshot(&Arc::new(CapturedSnapshot::new(2)));
        assert_eq!(*log.lock(), vec!["a:2"]);
    }

    #[test]
    fn observer_stays_while_any_subscription_lives() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        let observer = recorder("a", &log);

        let keep = registry.subscribe(Arc::clone(&observer));
        drop(registry.subscribe(Arc::clone(&observer)));

        registry.notify_snapshot(&Arc::new(CapturedSnapshot::new(3)));
        assert_eq!(registry.len(), 1);
        assert_eq!(*log.lock(), vec!["a:3"]);

        assert!(keep.unsubscribe());
        assert!(registry.is_empty());
    }

    #[test]
    fn detached_handle_pins_a_shared_observer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        let observer = recorder("a", &log);

        let other = registry.subscribe(Arc::clone(&observer));
        registry.subscribe(observer).detach();
        drop(other);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        let sub = registry.subscribe(recorder("a", &log));
        drop(registry);
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn observer_may_register_from_its_callback() {
        struct Registering {
            registry: Arc<ObserverRegistry<u32>>,
            log: Arc<Mutex<Vec<String>>>,
        }

        impl Observer<u32> for Registering {
            fn on_snapshot(&self, _: &Arc<CapturedSnapshot<u32>>) {
                self.registry.register(recorder("late", &self.log));
            }

            fn on_fault(&self, _: &SnapshotFault) {}
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(ObserverRegistry::new());
        registry.register(Arc::new(Registering {
            registry: Arc::clone(&registry),
            log: Arc::clone(&log),
        }));

        registry.notify_snapshot(&Arc::new(CapturedSnapshot::new(1)));

        // The late registrant was not part of the copied set for this capture.
        assert!(log.lock().is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn channel_observer_forwards_events() {
        let (observer, mut rx) = ChannelObserver::channel(4);
        observer.on_snapshot(&Arc::new(CapturedSnapshot::new(3u32)));
        observer.on_fault(&fault());

        let first = rx.recv().await.unwrap();
        assert_eq!(first.captured().map(|c| *c.snapshot()), Some(3));

        let second = rx.recv().await.unwrap();
        assert_eq!(
            second.fault().and_then(|f| f.resource()),
            Some(Resource::Queues)
        );
    }

    #[test]
    fn channel_observer_drops_when_full() {
        let (observer, mut rx) = ChannelObserver::channel(1);
        observer.on_snapshot(&Arc::new(CapturedSnapshot::new(1u32)));
        observer.on_snapshot(&Arc::new(CapturedSnapshot::new(2u32)));

        let only = rx.try_recv().unwrap();
        assert_eq!(only.captured().map(|c| *c.snapshot()), Some(1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn fn_observer_invokes_closures() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let snapshots = Arc::clone(&seen);
        let faults = Arc::clone(&seen);
        let observer = observer_fn(
            move |c: &Arc<CapturedSnapshot<u32>>| snapshots.lock().push(c.snapshot().to_string()),
            move |f: &SnapshotFault| faults.lock().push(f.to_string()),
        );

        Observer::<u32>::on_snapshot(&observer, &Arc::new(CapturedSnapshot::new(9)));
        Observer::<u32>::on_fault(&observer, &fault());

        assert_eq!(
            *seen.lock(),
            vec!["9", "Unable to retrieve queue information."]
        );
    }
}
