//! TTL cache with single-flight get-or-compute.
//!
//! Each key owns a slot holding a `tokio::sync::OnceCell` with the outcome of
//! one compute, success or failure. Concurrent callers for the same key await
//! that one compute and share its outcome, so at most one compute is in flight
//! per key. A failed slot is evicted once its outcome has been handed out,
//! which means errors are never served to a later lookup. A slot older than
//! the TTL is swapped for a fresh one on the next lookup or purge.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time::Instant;

type Outcome<V, E> = Result<(Instant, V), E>;

#[derive(Debug)]
struct Slot<V, E> {
    cell: OnceCell<Outcome<V, E>>,
}

impl<V, E> Slot<V, E> {
    fn empty() -> Arc<Self> {
        Arc::new(Self {
            cell: OnceCell::new(),
        })
    }
}

#[derive(Debug)]
pub struct TtlCache<K, V, E> {
    ttl: Duration,
    slots: Mutex<HashMap<K, Arc<Slot<V, E>>>>,
}

impl<K, V, E> TtlCache<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, or run `compute` once to fill it.
    /// Callers arriving while a compute is running get that compute's result.
    pub async fn get_or_try_compute<F, Fut>(&self, key: &K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot_for(key);
        let outcome = slot
            .cell
            .get_or_init(|| async move { compute().await.map(|v| (Instant::now(), v)) })
            .await;
        match outcome {
            Ok((_, value)) => Ok(value.clone()),
            Err(e) => {
                let e = e.clone();
                self.evict(key, &slot);
                Err(e)
            }
        }
    }

    /// Number of keys currently holding a slot (fresh, stale or in flight).
    pub fn len(&self) -> usize {
        self.slots.lock().expect("ttl cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop stale and failed slots, and empty slots nobody is computing.
    pub fn purge_expired(&self) {
        let mut slots = self.slots.lock().expect("ttl cache mutex poisoned");
        slots.retain(|_, s| self.is_live(s));
    }

    fn is_live(&self, slot: &Arc<Slot<V, E>>) -> bool {
        match slot.cell.get() {
            Some(Ok((at, _))) => at.elapsed() < self.ttl,
            Some(Err(_)) => false,
            // only the map holds it: the compute was dropped before finishing
            None => Arc::strong_count(slot) > 1,
        }
    }

    fn slot_for(&self, key: &K) -> Arc<Slot<V, E>> {
        let mut slots = self.slots.lock().expect("ttl cache mutex poisoned");
        if let Some(s) = slots.get(key).filter(|s| self.is_live(s)) {
            return Arc::clone(s);
        }
        let s = Slot::empty();
        slots.insert(key.clone(), Arc::clone(&s));
        s
    }

    fn evict(&self, key: &K, slot: &Arc<Slot<V, E>>) {
        let mut slots = self.slots.lock().expect("ttl cache mutex poisoned");
        if slots.get(key).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            slots.remove(key);
        }
    }
}
