//! Cooperative cancellation and the deadline watchdog.
//!
//! The search core is single-threaded; time-boxing comes from outside.
//! A [`Watchdog`] thread armed with a deadline sets a shared
//! [`CancellationToken`] when it fires, and is disarmed the moment the
//! search returns normally. The token is checked at iteration boundaries
//! of the driver and the DFS refiner; nothing else is shared between the
//! watchdog and the search loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A shared flag requesting that a running search stop at the next
/// iteration boundary. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Safe to call from another thread.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A deadline trigger running on its own thread.
///
/// Fires the token once the limit elapses unless disarmed first.
/// Dropping the watchdog disarms it.
#[derive(Debug)]
pub struct Watchdog {
    disarmed: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// Arms a watchdog that cancels `token` after `limit`.
    pub fn arm(limit: Duration, token: CancellationToken) -> Self {
        let disarmed = Arc::new((Mutex::new(false), Condvar::new()));
        let shared = Arc::clone(&disarmed);
        let handle = thread::spawn(move || {
            let (lock, condvar) = &*shared;
            let deadline = Instant::now() + limit;
            let mut disarmed = lock.lock().unwrap_or_else(|e| e.into_inner());
            while !*disarmed {
                let now = Instant::now();
                if now >= deadline {
                    tracing::info!("time limit reached, cancelling search");
                    token.cancel();
                    return;
                }
                let (guard, _) = condvar
                    .wait_timeout(disarmed, deadline - now)
                    .unwrap_or_else(|e| e.into_inner());
                disarmed = guard;
            }
        });
        Self {
            disarmed,
            handle: Some(handle),
        }
    }

    /// Disarms the watchdog and waits for its thread to exit.
    pub fn disarm(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let (lock, condvar) = &*self.disarmed;
        *lock.lock().unwrap_or_else(|e| e.into_inner()) = true;
        condvar.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.release();
    }
}
