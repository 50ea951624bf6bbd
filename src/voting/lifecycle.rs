use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit};

// Submissions are exclusive: while one holds the gate a second one is
// turned away. Fetches are numbered and only the newest may publish.
#[derive(Debug)]
pub struct RequestLifecycle {
    submit_gate: Semaphore,
    fetch_generation: AtomicU64,
    in_flight: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

impl Default for RequestLifecycle {
    fn default() -> Self {
        Self {
            submit_gate: Semaphore::new(1),
            fetch_generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another submission still holds its permit.
    pub fn try_begin_submit(&self) -> Option<SemaphorePermit<'_>> {
        self.submit_gate.try_acquire().ok()
    }

    pub fn begin_fetch(&self) -> FetchToken {
        FetchToken(self.fetch_generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        self.fetch_generation.load(Ordering::Acquire) == token.0
    }

    // Both return the count after the change.
    pub fn enter(&self) -> usize {
        self.in_flight.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn leave(&self) -> usize {
        self.in_flight.fetch_sub(1, Ordering::AcqRel) - 1
    }
}
