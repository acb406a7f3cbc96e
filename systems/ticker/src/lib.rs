#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-interval tick scheduling for the simulation.
//!
//! [`Ticker`] converts variable frame deltas into whole simulation steps and
//! [`IntervalTimer`] drives headless sessions from a background thread.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use grid_snake_core::{Command, GameState};
use tracing::{debug, trace};

/// Interval between simulation steps when nothing else is configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(150);

/// Upper bound on steps emitted for a single frame.
pub const MAX_CATCH_UP_STEPS: u32 = 5;

/// Pure system that emits one tick command per elapsed interval while running.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    accumulator: Duration,
}

impl Ticker {
    /// Creates a ticker that fires every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Interval between emitted ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulates frame time and emits the ticks that became due.
    ///
    /// Time spent outside [`GameState::Running`] is discarded so no steps are
    /// replayed after a pause. Frames that owe more than
    /// [`MAX_CATCH_UP_STEPS`] drop the surplus.
    pub fn handle(&mut self, frame_dt: Duration, state: GameState, out: &mut Vec<Command>) {
        if state != GameState::Running || self.interval.is_zero() {
            self.accumulator = Duration::ZERO;
            return;
        }

        self.accumulator = self.accumulator.saturating_add(frame_dt);

        let mut steps = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            if steps == MAX_CATCH_UP_STEPS {
                trace!(dropped = ?self.accumulator, "tick backlog discarded");
                self.accumulator = Duration::ZERO;
                break;
            }
            steps += 1;
            out.push(Command::Tick { dt: self.interval });
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

/// Background thread that signals once per interval until stopped.
///
/// Dropping the timer stops the thread and waits for it to exit.
#[derive(Debug)]
pub struct IntervalTimer {
    interval: Duration,
    stop: Arc<AtomicBool>,
    receiver: Receiver<Instant>,
    handle: Option<JoinHandle<()>>,
}

impl IntervalTimer {
    /// Spawns the timer thread.
    #[must_use]
    pub fn start(interval: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || loop {
            thread::sleep(interval);
            if flag.load(Ordering::Acquire) {
                break;
            }
            if sender.send(Instant::now()).is_err() {
                break;
            }
        });
        debug!(?interval, "interval timer started");

        Self {
            interval,
            stop,
            receiver,
            handle: Some(handle),
        }
    }

    /// Interval between signals.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until the next signal, returning `None` once the timer stopped.
    pub fn wait(&self) -> Option<Instant> {
        if self.stop.load(Ordering::Acquire) {
            return None;
        }
        self.receiver.recv().ok()
    }

    /// Reports whether [`IntervalTimer::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Stops the thread and waits for it to exit. Calling it twice is a no-op.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("interval timer thread panicked");
            } else {
                debug!("interval timer stopped");
            }
        }
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_never_fires() {
        let mut ticker = Ticker::new(Duration::ZERO);
        let mut out = Vec::new();
        ticker.handle(Duration::from_secs(5), GameState::Running, &mut out);
        assert!(out.is_empty());
        assert_eq!(ticker.accumulator, Duration::ZERO);
    }

    #[test]
    fn backlog_is_capped() {
        let mut ticker = Ticker::new(Duration::from_millis(10));
        let mut out = Vec::new();
        ticker.handle(Duration::from_secs(1), GameState::Running, &mut out);
        assert_eq!(out.len(), MAX_CATCH_UP_STEPS as usize);
        assert_eq!(ticker.accumulator, Duration::ZERO);
    }
}
