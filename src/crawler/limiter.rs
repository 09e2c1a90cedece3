//! Host rate limiting
//!
//! Guarantees a minimum elapsed gap between request *starts* across all
//! concurrent crawl tasks. The only shared state is the next-slot instant.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Serializes request starts with a fixed minimum gap.
pub struct RateGate {
    delay: Duration,
    next_slot: Mutex<Instant>,
}

impl RateGate {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Wait until this task's request is allowed to start.
    ///
    /// Each caller claims the earliest free slot and pushes the next slot
    /// out by the configured delay, so starts are spaced even when many
    /// tasks arrive at once.
    pub async fn wait_turn(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = if *next > now { *next } else { now };
            *next = slot + self.delay;
            slot
        };
        sleep_until(slot).await;
    }
}
