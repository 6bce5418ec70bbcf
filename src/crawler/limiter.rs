//! Global concurrency limiting for network access
//!
//! A thin wrapper over a tokio `Semaphore` that also counts how many permits
//! are out right now and the most that were ever out at once. Callers beyond
//! capacity wait for a permit rather than failing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// Shared admission gate for network operations
///
/// Clones share the same semaphore and counters.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    counters: Arc<Counters>,
}

/// Held for the duration of one network operation
///
/// Dropping the permit (including on cancellation) frees the slot.
#[derive(Debug)]
pub struct LimiterPermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<Counters>,
}

impl Drop for LimiterPermit {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyLimiter {
    /// Creates a limiter with `capacity` slots (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Waits for a free slot
    ///
    /// Returns `None` once the limiter has been closed.
    pub async fn acquire(&self) -> Option<LimiterPermit> {
        let permit = self.semaphore.clone().acquire_owned().await.ok()?;

        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now, Ordering::SeqCst);
        tracing::trace!("Limiter slot acquired ({}/{})", now, self.capacity);

        Some(LimiterPermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        })
    }

    /// Refuses all future acquisitions; outstanding permits stay valid
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Operations currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously held slots observed
    pub fn peak(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }
}
