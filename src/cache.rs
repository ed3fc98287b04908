// Single-flight catalog cache.
//
// Concurrent callers asking for the same source share one in-flight fetch.
// A completed catalog is kept until `reload`; a failed fetch is dropped so
// the next explicit call fetches again. Every reload bumps a generation
// counter, and results handed out under an older generation can be told
// apart from current ones via `Ticket`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, info};

use crate::api::CardSource;
use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};

type Slot<V> = Arc<OnceLock<std::result::Result<V, CatalogError>>>;

/// Keyed map from request identity to an in-progress or finished fetch.
pub struct SingleFlight<K, V> {
    inner: Mutex<Flights<K, V>>,
}

struct Flights<K, V> {
    generation: u64,
    slots: HashMap<K, Slot<V>>,
}

/// Validity token handed out with every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> SingleFlight<K, V> {
    pub fn new() -> Self {
        SingleFlight {
            inner: Mutex::new(Flights {
                generation: 0,
                slots: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Flights<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value for `key`, running `fetch` if nobody has
    /// yet. Callers arriving while a fetch is running block on it and
    /// receive the same outcome.
    pub fn get_or_fetch<F>(&self, key: &K, fetch: F) -> Result<(Ticket, V)>
    where
        F: FnOnce() -> Result<V>,
    {
        let (ticket, slot) = {
            let mut flights = self.lock();
            let ticket = Ticket {
                generation: flights.generation,
            };
            let slot = flights.slots.entry(key.clone()).or_default().clone();
            (ticket, slot)
        };

        let mut ran_fetch = false;
        let outcome = slot.get_or_init(|| {
            ran_fetch = true;
            fetch()
        });
        if !ran_fetch {
            debug!("single-flight hit (generation {})", ticket.generation);
        }

        match outcome {
            Ok(value) => Ok((ticket, value.clone())),
            Err(e) => {
                let mut flights = self.lock();
                if flights
                    .slots
                    .get(key)
                    .is_some_and(|current| Arc::ptr_eq(current, &slot))
                {
                    flights.slots.remove(key);
                }
                Err(e.duplicate())
            }
        }
    }

    /// Forgets every cached and in-flight entry. Fetches already running
    /// still finish, but only their original waiters see the result.
    pub fn reset(&self) -> Ticket {
        let mut flights = self.lock();
        flights.generation += 1;
        flights.slots.clear();
        Ticket {
            generation: flights.generation,
        }
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.lock().generation,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.lock().generation == ticket.generation
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-lifetime catalog cache over one card source.
pub struct CatalogCache<S> {
    source: S,
    flights: SingleFlight<String, Arc<Catalog>>,
}

impl<S: CardSource> CatalogCache<S> {
    pub fn new(source: S) -> Self {
        CatalogCache {
            source,
            flights: SingleFlight::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Loads the catalog, fetching only if no load has succeeded since the
    /// last reload.
    pub fn load(&self) -> Result<(Ticket, Arc<Catalog>)> {
        let key = self.source.identity();
        self.flights.get_or_fetch(&key, || {
            info!("Catalog cache miss for {key}, fetching");
            Catalog::load(&self.source).map(Arc::new)
        })
    }

    /// Drops the cached catalog. The next `load` fetches again and any
    /// ticket issued earlier stops being current.
    pub fn reload(&self) -> Ticket {
        info!("Catalog cache reset");
        self.flights.reset()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.flights.is_current(ticket)
    }

    /// Passes `value` through only if `ticket` is still current. Consumers
    /// use this to drop results of requests made before a reload.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!("discarding stale result from generation {}", ticket.generation);
            None
        }
    }
}
