//! In-flight computation deduplication.
//!
//! Not a memo cache: an entry lives only while its computation runs. The
//! first caller for a key becomes the leader and runs the thunk; callers
//! arriving meanwhile become followers and block until the leader
//! finishes, then receive a clone of its result. Once the leader is done
//! the entry is dropped, so a later call with the same key runs again.
//!
//! Collapsing concurrent identical collections is a correctness
//! requirement for the provider, not an optimization: the underlying
//! machine execution can take minutes, and rival challenge edges routinely
//! request the same hash range at the same time.
//!
//! There is no internal timeout or cancellation. A caller that wants to
//! give up early must build that into the thunk; a follower only wakes
//! when the leader's thunk returns.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Condvar, Mutex, PoisonError},
};

struct Flight<V, E> {
    slot: Mutex<Option<Result<V, E>>>,
    done: Condvar,
}

impl<V, E> Flight<V, E> {
    fn new() -> Self {
        Flight {
            slot: Mutex::new(None),
            done: Condvar::new(),
        }
    }
}

/// Collapses concurrent computations of the same key into one run.
pub struct ComputationCache<K, V, E> {
    in_flight: Mutex<HashMap<K, Arc<Flight<V, E>>>>,
}

impl<K, V, E> Default for ComputationCache<K, V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E> ComputationCache<K, V, E> {
    /// An empty cache with nothing in flight.
    pub fn new() -> Self {
        ComputationCache {
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V, E> ComputationCache<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    /// Run `thunk` for `key`, or wait for the run already in flight.
    ///
    /// The in-flight check and follower registration happen under one lock
    /// acquisition, so a follower can never miss the leader's wake-up.
    /// Followers receive a clone of the leader's result, errors included.
    pub fn compute<F>(&self, key: K, thunk: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let (flight, is_leader) = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(&key) {
                Some(flight) => (Arc::clone(flight), false),
                None => {
                    let flight = Arc::new(Flight::new());
                    in_flight.insert(key.clone(), Arc::clone(&flight));
                    (flight, true)
                }
            }
        };

        if is_leader {
            let result = thunk();
            {
                let mut slot = flight.slot.lock().unwrap_or_else(PoisonError::into_inner);
                *slot = Some(result.clone());
            }
            self.in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&key);
            flight.done.notify_all();
            result
        } else {
            let mut slot = flight.slot.lock().unwrap_or_else(PoisonError::into_inner);
            loop {
                if let Some(result) = slot.as_ref() {
                    return result.clone();
                }
                slot = flight
                    .done
                    .wait(slot)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }
    }
}
