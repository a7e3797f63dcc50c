//! Elapsed-Time Counter
//!
//! A background task adding 100 ms to a `watch` value every 100 ms while
//! a game is running. Display only; the authoritative elapsed time in
//! `game-finished` comes from timestamps.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Counter tick.
pub const TIMER_TICK: Duration = Duration::from_millis(100);

/// Owned ticking counter. The task is aborted on stop and on drop.
#[derive(Debug)]
pub struct ElapsedTimer {
    tx: watch::Sender<u64>,
    task: Option<JoinHandle<()>>,
}

impl ElapsedTimer {
    /// Create a stopped timer at zero.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx, task: None }
    }

    /// (Re)start counting from `initial_ms`. Must be called inside a runtime.
    pub fn start(&mut self, initial_ms: u64) {
        self.stop();
        self.tx.send_replace(initial_ms);

        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TIMER_TICK, TIMER_TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tx.send_modify(|ms| *ms += TIMER_TICK.as_millis() as u64);
            }
        }));
    }

    /// Stop counting. The value is kept.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Stop counting and pin the value, e.g. to the final elapsed time.
    pub fn stop_at(&mut self, ms: u64) {
        self.stop();
        self.tx.send_replace(ms);
    }

    /// Is the counter running?
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Current value in milliseconds.
    pub fn value(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Watch the value.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for ElapsedTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ElapsedTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Format milliseconds as `m:ss`.
pub fn format_elapsed(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
