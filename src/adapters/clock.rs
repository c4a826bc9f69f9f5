//! Host clock adapter.
//!
//! Sleeps in short slices so that a Ctrl-C (which sets the shared flag)
//! ends a long hold promptly with [`Interrupted`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::app::ports::TimePort;
use crate::error::Interrupted;

const SLICE: Duration = Duration::from_millis(100);

pub struct SystemClock {
    stop: Arc<AtomicBool>,
}

impl SystemClock {
    /// `stop` is shared with the signal handler.
    pub fn new(stop: Arc<AtomicBool>) -> Self {
        Self { stop }
    }
}

impl TimePort for SystemClock {
    fn sleep(&mut self, duration: Duration) -> Result<(), Interrupted> {
        // `None`: too far out to represent, so only an interrupt ends it.
        let deadline = Instant::now().checked_add(duration);
        loop {
            if self.interrupted() {
                return Err(Interrupted);
            }
            let now = Instant::now();
            let remaining = match deadline {
                Some(d) if now >= d => return Ok(()),
                Some(d) => d - now,
                None => SLICE,
            };
            thread::sleep(remaining.min(SLICE));
        }
    }

    fn interrupted(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}
