//! Pending request registry
//!
//! One map, one lock. Creation, resolution and timeout eviction all take the
//! same mutex, so every request leaves the map exactly once: whichever of
//! resolution and timeout gets the lock first removes it, and the other finds
//! nothing.
//!
//! Each request arms a one-shot timer task. Resolution aborts it; a timer
//! that already woke up finds its entry gone (or replaced by a newer request
//! from the same requester) and does nothing.
//!
//! Timers run on the runtime that was current when the registry was built.
//! Without one the registry starts a single-worker runtime of its own, so
//! every operation can be called from a plain thread.

use parking_lot::Mutex;
use quicktravel_types::{ActorId, PendingRequest, RequestId, TravelConfig, TravelResult};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::AbortHandle;
use tracing::{debug, info};

/// Invoked once when a request expires unanswered
pub type TimeoutCallback = Box<dyn FnOnce(PendingRequest) + Send + 'static>;

struct PendingEntry {
    request: PendingRequest,
    timer: AbortHandle,
}

type Entries = Mutex<HashMap<ActorId, PendingEntry>>;

/// Store of pending relocation requests, keyed by requester.
pub struct RequestRegistry {
    entries: Arc<Entries>,
    timeout: Duration,
    timers: Handle,
    owned_runtime: Option<Runtime>,
}

impl RequestRegistry {
    /// Create a registry whose requests expire after `timeout`.
    ///
    /// Timers share the current Tokio runtime when there is one; otherwise a
    /// dedicated timer runtime is started, which can fail.
    pub fn new(timeout: Duration) -> TravelResult<Self> {
        match Handle::try_current() {
            Ok(handle) => Ok(Self::with_handle(timeout, handle)),
            Err(_) => {
                let runtime = Builder::new_multi_thread()
                    .worker_threads(1)
                    .thread_name("quicktravel-timers")
                    .enable_time()
                    .build()?;
                debug!("Started dedicated timer runtime");
                let mut registry = Self::with_handle(timeout, runtime.handle().clone());
                registry.owned_runtime = Some(runtime);
                Ok(registry)
            }
        }
    }

    /// Create a registry whose timers run on `handle`
    pub fn with_handle(timeout: Duration, handle: Handle) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            timeout,
            timers: handle,
            owned_runtime: None,
        }
    }

    /// Create a registry using the configured timeout
    pub fn from_config(config: &TravelConfig) -> TravelResult<Self> {
        Self::new(config.request_timeout())
    }

    /// How long a request waits for an answer
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Register `request` and arm its timeout.
    ///
    /// Returns `false` without touching the registry if the requester already
    /// has a pending request, whatever its target. Callable from any thread.
    pub fn create<F>(&self, request: PendingRequest, on_timeout: F) -> bool
    where
        F: FnOnce(PendingRequest) + Send + 'static,
    {
        let mut entries = self.entries.lock();
        if entries.contains_key(&request.requester) {
            debug!(requester = %request.requester, "Request already pending");
            return false;
        }

        let timer = self.arm_timeout(request.requester, request.id, Box::new(on_timeout));
        info!(
            request = %request.id,
            requester = %request.requester,
            recipient = %request.target,
            "Relocation request created"
        );
        entries.insert(request.requester, PendingEntry { request, timer });
        true
    }

    fn arm_timeout(
        &self,
        requester: ActorId,
        id: RequestId,
        on_timeout: TimeoutCallback,
    ) -> AbortHandle {
        let entries: Weak<Entries> = Arc::downgrade(&self.entries);
        let timeout = self.timeout;

        self.timers.spawn(async move {
            tokio::time::sleep(timeout).await;

            let Some(entries) = entries.upgrade() else {
                return;
            };
            let expired = {
                let mut entries = entries.lock();
                match entries.get(&requester) {
                    Some(entry) if entry.request.id == id => {
                        entries.remove(&requester).map(|entry| entry.request)
                    }
                    _ => None,
                }
            };

            if let Some(request) = expired {
                debug!(request = %request.id, requester = %request.requester, "Relocation request timed out");
                on_timeout(request);
            }
        })
        .abort_handle()
    }

    /// Remove and return every request to `target`, limited to one requester
    /// when `requester` is given.
    ///
    /// Every returned request is already gone from the registry and its timer
    /// disarmed. An empty result is normal.
    pub fn resolve(&self, requester: Option<&ActorId>, target: &ActorId) -> Vec<PendingRequest> {
        let removed: Vec<PendingEntry> = {
            let mut entries = self.entries.lock();
            let keys: Vec<ActorId> = entries
                .values()
                .filter(|entry| entry.request.matches(requester, target))
                .map(|entry| entry.request.requester)
                .collect();
            keys.iter().filter_map(|key| entries.remove(key)).collect()
        };

        let mut resolved: Vec<PendingRequest> = removed
            .into_iter()
            .map(|entry| {
                entry.timer.abort();
                entry.request
            })
            .collect();
        resolved.sort_by_key(|request| request.created_at);

        if !resolved.is_empty() {
            info!(recipient = %target, count = resolved.len(), "Relocation requests resolved");
        }
        resolved
    }

    /// Names of actors currently waiting on `target`
    pub fn suggest_requesters(&self, target: &ActorId) -> Vec<String> {
        let entries = self.entries.lock();
        let mut waiting: Vec<&PendingRequest> = entries
            .values()
            .map(|entry| &entry.request)
            .filter(|request| &request.target == target)
            .collect();
        waiting.sort_by_key(|request| request.created_at);
        waiting
            .into_iter()
            .map(|request| request.requester_name.clone())
            .collect()
    }

    /// The pending request of `requester`, if any
    pub fn pending_for(&self, requester: &ActorId) -> Option<PendingRequest> {
        self.entries
            .lock()
            .get(requester)
            .map(|entry| entry.request.clone())
    }

    /// Number of pending requests
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no request is pending
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Drop for RequestRegistry {
    fn drop(&mut self) {
        for entry in self.entries.lock().values() {
            entry.timer.abort();
        }
        if let Some(runtime) = self.owned_runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicktravel_types::{ActorSnapshot, Coordinate};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TIMEOUT: Duration = Duration::from_secs(120);

    fn actor(name: &str) -> ActorSnapshot {
        ActorSnapshot::new(ActorId::generate(), name, Coordinate::ORIGIN)
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce(PendingRequest) + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = fired.clone();
        (fired, move |_| {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn second_request_from_same_requester_is_rejected() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (x, y, z) = (actor("X"), actor("Y"), actor("Z"));

        let first = PendingRequest::new(&x, &y);
        assert!(registry.create(first.clone(), |_| {}));
        assert!(!registry.create(PendingRequest::new(&x, &z), |_| {}));
        assert!(!registry.create(PendingRequest::new(&x, &y), |_| {}));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.pending_for(&x.id), Some(first));
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_removes_exactly_the_matching_target() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (a, b, c, target, other) = (actor("A"), actor("B"), actor("C"), actor("T"), actor("O"));

        registry.create(PendingRequest::new(&a, &target), |_| {});
        registry.create(PendingRequest::new(&b, &target), |_| {});
        registry.create(PendingRequest::new(&c, &other), |_| {});

        let resolved = registry.resolve(None, &target.id);
        let mut requesters: Vec<ActorId> = resolved.iter().map(|r| r.requester).collect();
        requesters.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(requesters, expected);

        assert!(registry.resolve(None, &target.id).is_empty());
        assert_eq!(registry.len(), 1);
        assert!(registry.pending_for(&c.id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_with_filter_leaves_other_requesters() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (x, z, y) = (actor("X"), actor("Z"), actor("Y"));

        registry.create(PendingRequest::new(&x, &y), |_| {});
        registry.create(PendingRequest::new(&z, &y), |_| {});

        let resolved = registry.resolve(Some(&x.id), &y.id);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].requester, x.id);
        assert_eq!(registry.suggest_requesters(&y.id), vec!["Z".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_with_filter_for_wrong_target_is_empty() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (x, y, z) = (actor("X"), actor("Y"), actor("Z"));
        registry.create(PendingRequest::new(&x, &y), |_| {});

        assert!(registry.resolve(Some(&x.id), &z.id).is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_request_times_out_once() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (x, y) = (actor("X"), actor("Y"));
        let (fired, on_timeout) = counter();

        registry.create(PendingRequest::new(&x, &y), on_timeout);

        tokio::time::sleep(TIMEOUT - Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(registry.len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
        assert!(registry.resolve(None, &y.id).is_empty());

        tokio::time::sleep(TIMEOUT * 2).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resolved_request_never_times_out() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (x, y) = (actor("X"), actor("Y"));
        let (fired, on_timeout) = counter();

        registry.create(PendingRequest::new(&x, &y), on_timeout);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(registry.resolve(None, &y.id).len(), 1);

        tokio::time::sleep(TIMEOUT * 2).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_evict_newer_request() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (x, y) = (actor("X"), actor("Y"));
        let (first_fired, first_timeout) = counter();
        let (second_fired, second_timeout) = counter();

        registry.create(PendingRequest::new(&x, &y), first_timeout);
        tokio::time::sleep(Duration::from_secs(100)).await;
        registry.resolve(None, &y.id);

        let second = PendingRequest::new(&x, &y);
        assert!(registry.create(second.clone(), second_timeout));

        // Past the first request's deadline, before the second's.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(first_fired.load(Ordering::SeqCst), 0);
        assert_eq!(registry.pending_for(&x.id), Some(second));

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(second_fired.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_frees_requester_for_a_new_request() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (x, y) = (actor("X"), actor("Y"));

        registry.create(PendingRequest::new(&x, &y), |_| {});
        tokio::time::sleep(TIMEOUT + Duration::from_secs(1)).await;

        assert!(registry.create(PendingRequest::new(&x, &y), |_| {}));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_callback_receives_the_request() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (x, y) = (actor("X"), actor("Y"));
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();

        let request = PendingRequest::new(&x, &y);
        registry.create(request.clone(), move |expired| {
            *sink.lock() = Some(expired);
        });
        tokio::time::sleep(TIMEOUT + Duration::from_secs(1)).await;

        assert_eq!(*seen.lock(), Some(request));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_registry_fires_nothing() {
        let (fired, on_timeout) = counter();
        {
            let registry = RequestRegistry::new(TIMEOUT).unwrap();
            registry.create(PendingRequest::new(&actor("X"), &actor("Y")), on_timeout);
        }
        tokio::time::sleep(TIMEOUT * 2).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn suggestions_list_waiting_requesters() {
        let registry = RequestRegistry::new(TIMEOUT).unwrap();
        let (alex, sam, target) = (actor("Alex"), actor("Sam"), actor("T"));

        assert!(registry.suggest_requesters(&target.id).is_empty());

        registry.create(PendingRequest::new(&alex, &target), |_| {});
        registry.create(PendingRequest::new(&sam, &target), |_| {});

        let mut names = registry.suggest_requesters(&target.id);
        names.sort();
        assert_eq!(names, vec!["Alex".to_string(), "Sam".to_string()]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn plain_thread_request_times_out() {
        let registry = RequestRegistry::new(Duration::from_millis(50)).unwrap();
        let (x, y) = (actor("X"), actor("Y"));
        let (tx, rx) = std::sync::mpsc::channel();

        let request = PendingRequest::new(&x, &y);
        assert!(registry.create(request.clone(), move |expired| {
            let _ = tx.send(expired);
        }));

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), request);
        assert!(registry.is_empty());
    }

    #[test]
    fn plain_thread_resolve_disarms_timer() {
        let registry = RequestRegistry::new(Duration::from_millis(50)).unwrap();
        let (x, y) = (actor("X"), actor("Y"));
        let (tx, rx) = std::sync::mpsc::channel::<PendingRequest>();

        registry.create(PendingRequest::new(&x, &y), move |expired| {
            let _ = tx.send(expired);
        });
        assert_eq!(registry.resolve(None, &y.id).len(), 1);

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolvers_never_share_a_request() {
        let registry = Arc::new(RequestRegistry::new(TIMEOUT).unwrap());
        let target = actor("T");
        for i in 0..64 {
            registry.create(PendingRequest::new(&actor(&format!("R{}", i)), &target), |_| {});
        }

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            let target = target.id;
            handles.push(tokio::spawn(async move { registry.resolve(None, &target) }));
        }

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap().len();
        }
        assert_eq!(total, 64);
        assert!(registry.is_empty());
    }
}
