use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;
use std::time::Duration;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as DirectRateLimiter,
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::{ErrorKind, Result};

/// Admits at most `max_rate` operations per second and, optionally, at
/// most `max_concurrent` operations in flight.
///
/// The timing gate is shared across the whole limiter instance: admissions
/// are serialized with respect to timing even when the concurrency cap
/// would allow parallel execution. This intentionally caps the peak
/// request rate regardless of how many tasks are active.
///
/// One limiter is created per strategy instance and lives as long as it
/// does. Waiting on [`acquire`](Self::acquire) suspends only the calling
/// task, never unrelated tasks.
#[derive(Debug)]
pub struct RateLimiter {
    /// Token bucket with burst size 1, which makes consecutive admissions
    /// at least `1/max_rate` seconds apart
    interval: DirectRateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Concurrency slots; `None` means only the timing gate applies
    slots: Option<Arc<Semaphore>>,
}

/// One grant of permission to proceed with a request attempt.
///
/// When a concurrency cap is configured, dropping the admission releases
/// the slot. This happens on every exit path, including failure.
#[derive(Debug)]
pub struct Admission {
    _permit: Option<OwnedSemaphorePermit>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_rate` operations per second, with
    /// an optional cap on concurrently admitted operations.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InvalidRateLimit` if `max_rate` is not a
    /// positive finite number, or is so large that the admission interval
    /// rounds down to zero.
    pub fn new(max_rate: f64, max_concurrent: Option<NonZeroUsize>) -> Result<Self> {
        if !max_rate.is_finite() || max_rate <= 0.0 {
            return Err(ErrorKind::InvalidRateLimit(max_rate));
        }
        let period = Duration::from_secs_f64(1.0 / max_rate);
        let quota = Quota::with_period(period)
            .ok_or(ErrorKind::InvalidRateLimit(max_rate))?
            .allow_burst(NonZeroU32::MIN);

        Ok(Self {
            interval: DirectRateLimiter::direct(quota),
            slots: max_concurrent.map(|c| Arc::new(Semaphore::new(c.get()))),
        })
    }

    /// Wait until both a concurrency slot (if configured) and the minimum
    /// interval since the last admission are available.
    ///
    /// The slot is taken first so that a task waiting on the timing gate
    /// already counts against the concurrency cap, mirroring the order of
    /// the two gates in a scoped acquisition.
    pub async fn acquire(&self) -> Admission {
        let permit = match &self.slots {
            Some(slots) => Some(
                Arc::clone(slots)
                    .acquire_owned()
                    .await
                    // This cannot fail as the semaphore is never closed
                    .expect("Semaphore was closed unexpectedly"),
            ),
            None => None,
        };

        self.interval.until_ready().await;

        Admission { _permit: permit }
    }

    /// Number of free concurrency slots, or `None` when no cap is set.
    #[must_use]
    pub fn available_slots(&self) -> Option<usize> {
        self.slots.as_ref().map(|s| s.available_permits())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use futures::future::join_all;

    use super::*;

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(matches!(
            RateLimiter::new(0.0, None),
            Err(ErrorKind::InvalidRateLimit(_))
        ));
        assert!(matches!(
            RateLimiter::new(-1.5, None),
            Err(ErrorKind::InvalidRateLimit(_))
        ));
        assert!(matches!(
            RateLimiter::new(f64::NAN, None),
            Err(ErrorKind::InvalidRateLimit(_))
        ));
        assert!(RateLimiter::new(0.5, None).is_ok());
    }

    #[tokio::test]
    async fn test_admissions_are_spaced_by_min_interval() {
        // 20 admissions per second, so 50ms apart
        let limiter = RateLimiter::new(20.0, None).unwrap();
        let start = Instant::now();
        for _ in 0..5 {
            let _admission = limiter.acquire().await;
        }
        // First admission is immediate, the remaining four are gated
        assert!(start.elapsed() >= Duration::from_millis(4 * 50 - 10));
    }

    #[tokio::test]
    async fn test_concurrency_cap_is_never_exceeded() {
        let limiter = Arc::new(RateLimiter::new(1000.0, NonZeroUsize::new(2)).unwrap());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|_| {
            let limiter = Arc::clone(&limiter);
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                let admission = limiter.acquire().await;
                let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(current, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                drop(admission);
            })
        });
        join_all(tasks).await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(limiter.available_slots(), Some(2));
    }

    #[tokio::test]
    async fn test_slot_released_on_drop() {
        let limiter = RateLimiter::new(1000.0, NonZeroUsize::new(1)).unwrap();
        {
            let _admission = limiter.acquire().await;
            assert_eq!(limiter.available_slots(), Some(0));
        }
        assert_eq!(limiter.available_slots(), Some(1));
        // A second acquisition must not dead-lock now
        let _admission = limiter.acquire().await;
    }

    #[tokio::test]
    async fn test_no_cap_means_timing_gate_only() {
        let limiter = RateLimiter::new(1000.0, None).unwrap();
        assert_eq!(limiter.available_slots(), None);
        let _first = limiter.acquire().await;
        let _second = limiter.acquire().await;
    }
}
