//! Fixed-Window Rate Limiter
//!
//! Per-client request counter. A client may make `rate` requests; the counter
//! resets on the first request after the client has been quiet for longer than
//! `window`. A background task purges clients idle for longer than `window`.
//!
//! This is a fixed-window scheme: a burst straddling a window boundary can be
//! admitted up to `2 * rate` times in quick succession.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::tasks::{spawn_sweep_task, Sweep, SweepHandle};

/// Default time between purges of idle clients.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

// == Visitor ==
/// Per-client state.
#[derive(Debug, Clone, Copy)]
struct Visitor {
    /// Last admitted request
    last_seen: Instant,
    /// Requests admitted in the current window
    count: u32,
}

impl Visitor {
    fn new(now: Instant) -> Self {
        Self {
            last_seen: now,
            count: 1,
        }
    }
}

struct LimiterShared {
    visitors: Mutex<HashMap<String, Visitor>>,
    /// Written only while `visitors` is locked
    closed: AtomicBool,
    rate: u32,
    window: Duration,
}

impl LimiterShared {
    fn allow(&self, client_id: &str) -> bool {
        let mut visitors = self.visitors.lock();
        if self.closed.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();

        let Some(visitor) = visitors.get_mut(client_id) else {
            visitors.insert(client_id.to_owned(), Visitor::new(now));
            return true;
        };

        // Previous window has elapsed
        if now.saturating_duration_since(visitor.last_seen) > self.window {
            *visitor = Visitor::new(now);
            return true;
        }

        // Quota spent. `last_seen` stays put so a client that only gets
        // rejected still becomes eligible for purging.
        if visitor.count >= self.rate {
            return false;
        }

        visitor.count += 1;
        visitor.last_seen = now;
        true
    }
}

impl Sweep for LimiterShared {
    fn label(&self) -> &'static str {
        "rate_limiter"
    }

    fn sweep(&self) -> usize {
        let mut visitors = self.visitors.lock();
        let now = Instant::now();
        let before = visitors.len();

        visitors.retain(|_, visitor| now.saturating_duration_since(visitor.last_seen) <= self.window);

        before - visitors.len()
    }
}

// == Rate Limiter ==
/// Thread-safe fixed-window rate limiter keyed by client identifier.
pub struct RateLimiter {
    shared: Arc<LimiterShared>,
    purger: Mutex<Option<SweepHandle>>,
}

impl RateLimiter {
    // == Constructors ==
    /// Creates a limiter admitting `rate` requests per `window` per client,
    /// purging idle clients every [`DEFAULT_PURGE_INTERVAL`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(rate: u32, window: Duration) -> Self {
        Self::with_purge_interval(rate, window, DEFAULT_PURGE_INTERVAL)
    }

    /// Creates a limiter with an explicit purge cadence.
    ///
    /// # Arguments
    /// * `rate` - Requests admitted per window; values below 1 are raised to 1
    /// * `window` - Quiet period after which a client's counter resets
    /// * `purge_interval` - Time between purges of idle clients
    pub fn with_purge_interval(rate: u32, window: Duration, purge_interval: Duration) -> Self {
        let shared = Arc::new(LimiterShared {
            visitors: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            rate: rate.max(1),
            window,
        });

        let purger = spawn_sweep_task(Arc::downgrade(&shared), purge_interval);

        Self {
            shared,
            purger: Mutex::new(Some(purger)),
        }
    }

    // == Allow ==
    /// Records a request from `client_id` and returns whether it is admitted.
    ///
    /// A closed limiter admits nothing and records nothing.
    pub fn allow(&self, client_id: &str) -> bool {
        self.shared.allow(client_id)
    }

    // == Purge Now ==
    /// Drops every client idle for longer than the window and returns how many
    /// were removed.
    pub fn purge_now(&self) -> usize {
        self.shared.sweep()
    }

    // == Close ==
    /// Stops the purge task and forgets every client. Closing twice is a no-op.
    ///
    /// Every later `allow` is rejected without being recorded, so the client
    /// map cannot grow once nothing purges it.
    pub async fn close(&self) {
        let purger = self.purger.lock().take();
        let Some(purger) = purger else {
            return;
        };

        purger.stop().await;

        let forgotten = {
            let mut visitors = self.shared.visitors.lock();
            self.shared.closed.store(true, Ordering::Relaxed);
            let count = visitors.len();
            visitors.clear();
            count
        };
        debug!("Rate limiter closed, {} clients forgotten", forgotten);
    }

    /// Number of clients currently tracked.
    pub fn len(&self) -> usize {
        self.shared.visitors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.visitors.lock().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Relaxed)
    }

    pub fn rate(&self) -> u32 {
        self.shared.rate
    }

    pub fn window(&self) -> Duration {
        self.shared.window
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.shared.rate)
            .field("window", &self.shared.window)
            .field("clients", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_admits_exactly_rate_requests() {
        let limiter = RateLimiter::new(3, MINUTE);

        let results: Vec<bool> = (0..4).map(|_| limiter.allow("203.0.113.7")).collect();

        assert_eq!(results, vec![true, true, true, false]);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = RateLimiter::new(1, MINUTE);

        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.2"));
        assert_eq!(limiter.len(), 2);
    }

    #[tokio::test]
    async fn test_resets_after_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));

        assert!(limiter.allow("ip"));
        assert!(!limiter.allow("ip"));

        tokio::time::sleep(Duration::from_millis(15)).await;

        assert!(limiter.allow("ip"));
    }

    #[tokio::test]
    async fn test_rejection_does_not_refresh_last_seen() {
        let limiter = RateLimiter::new(1, MINUTE);

        assert!(limiter.allow("ip"));
        let first_seen = limiter.shared.visitors.lock()["ip"].last_seen;

        std::thread::sleep(Duration::from_millis(2));
        assert!(!limiter.allow("ip"));

        let visitor = limiter.shared.visitors.lock()["ip"];
        assert_eq!(visitor.last_seen, first_seen);
        assert_eq!(visitor.count, 1);
    }

    #[tokio::test]
    async fn test_zero_rate_is_raised_to_one() {
        let limiter = RateLimiter::new(0, MINUTE);

        assert_eq!(limiter.rate(), 1);
        assert!(limiter.allow("ip"));
        assert!(!limiter.allow("ip"));
    }

    #[tokio::test]
    async fn test_purge_now_removes_idle_clients() {
        let limiter = RateLimiter::new(5, Duration::from_millis(20));

        limiter.allow("idle");
        tokio::time::sleep(Duration::from_millis(40)).await;
        limiter.allow("active");

        assert_eq!(limiter.purge_now(), 1);
        assert_eq!(limiter.len(), 1);
    }

    #[tokio::test]
    async fn test_background_purge() {
        let limiter =
            RateLimiter::with_purge_interval(5, Duration::from_millis(5), Duration::from_millis(5));

        limiter.allow("a");
        limiter.allow("b");
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(limiter.is_empty());
    }

    #[tokio::test]
    async fn test_close_forgets_clients() {
        let limiter = RateLimiter::new(1, MINUTE);

        limiter.allow("ip");
        limiter.close().await;
        limiter.close().await;

        assert!(limiter.is_empty());
        assert!(limiter.is_closed());
    }

    #[tokio::test]
    async fn test_allow_after_close_rejects_without_recording() {
        let limiter = RateLimiter::new(5, MINUTE);
        limiter.close().await;

        for i in 0..10 {
            assert!(!limiter.allow(&format!("10.0.0.{}", i)));
        }

        assert!(limiter.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allow_never_exceeds_rate() {
        let limiter = Arc::new(RateLimiter::new(50, MINUTE));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { (0..25).filter(|_| limiter.allow("shared")).count() })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            admitted += handle.await.unwrap();
        }

        assert_eq!(admitted, 50);
    }
}
