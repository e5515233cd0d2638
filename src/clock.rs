//! Time sources and cancellation.

use std::{
    cell::Cell,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use embedded_hal::blocking::delay::DelayMs;

/// Monotonic time plus a way to wait.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Block for `duration`.
    fn pause(&mut self, duration: Duration);
}

/// Wall time from [`Instant`], waiting through an `embedded-hal` delay.
pub struct SystemClock<D> {
    origin: Instant,
    delay: D,
}

impl<D> SystemClock<D>
where
    D: DelayMs<u32>,
{
    /// Creates a clock whose origin is now.
    pub fn new(delay: D) -> Self {
        Self {
            origin: Instant::now(),
            delay,
        }
    }
}

impl<D> Clock for SystemClock<D>
where
    D: DelayMs<u32>,
{
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn pause(&mut self, duration: Duration) {
        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        if ms > 0 {
            self.delay.delay_ms(ms);
        }
    }
}

/// `DelayMs` backed by [`thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayMs<u32> for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

impl DelayMs<u16> for StdDelay {
    fn delay_ms(&mut self, ms: u16) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a scripted source can hold one to model read
/// latency while the sampler holds another.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// A clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn pause(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

/// Shared flag used to stop a run from outside, e.g. from a signal handler.
#[derive(Debug, Default, Clone)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// An untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let mut clock = ManualClock::new();
        let handle = clock.clone();

        clock.pause(Duration::from_millis(1_500));
        handle.advance(Duration::from_millis(500));

        assert_eq!(clock.now(), Duration::from_secs(2));
        assert_eq!(handle.now(), Duration::from_secs(2));
    }

    #[test]
    fn system_clock_waits_through_delay() {
        let mut clock = SystemClock::new(StdDelay);
        let before = clock.now();
        clock.pause(Duration::from_millis(20));
        assert!(clock.now() - before >= Duration::from_millis(20));
    }

    #[test]
    fn stop_signal_is_shared() {
        let stop = StopSignal::new();
        let remote = stop.clone();
        assert!(!stop.is_triggered());
        remote.trigger();
        assert!(stop.is_triggered());
    }
}
