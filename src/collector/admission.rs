//! Admission pool bounding concurrent fetch-and-forward pipelines.
//!
//! A single pool is shared by every source loop. A loop must hold an
//! [`AdmissionPermit`] for the whole fetch+send cycle; dropping the permit
//! returns the slot, so release happens on every exit path (success, failure,
//! cancellation, task abort).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Fixed-capacity counting pool shared by all sources.
#[derive(Debug)]
pub struct AdmissionPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    /// Permits currently held.
    in_flight: Arc<AtomicUsize>,
    /// Highest `in_flight` value observed since creation.
    peak_in_flight: AtomicUsize,
}

impl AdmissionPool {
    /// Create a pool with `capacity` slots.
    ///
    /// A zero capacity is raised to one so that the pool can always make
    /// progress.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Wait for a free slot.
    ///
    /// Returns `None` if `shutdown` fires first; in that case nothing was
    /// acquired and there is nothing to release.
    pub async fn acquire(&self, shutdown: &CancellationToken) -> Option<AdmissionPermit> {
        let permit = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return None,
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok()?,
        };
        Some(self.admit(permit))
    }

    /// Take a free slot without waiting.
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        let permit = Arc::clone(&self.semaphore).try_acquire_owned().ok()?;
        Some(self.admit(permit))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Highest number of simultaneously held slots seen so far.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }

    fn admit(&self, permit: OwnedSemaphorePermit) -> AdmissionPermit {
        let current = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::AcqRel);
        AdmissionPermit {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

/// A held admission slot. The slot is returned when this is dropped.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        // Runs before the semaphore permit field is dropped, so the counter
        // never reads above capacity.
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
