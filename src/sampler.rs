//! The sampling loop.
//!
//! One reader, one device: the loop blocks on the driver and on its own pauses.
//! Failed reads are retried after a short backoff and never produce a row; the
//! run ends once the session duration has elapsed or a stop is requested.

use std::{
    io::{self, Write},
    time::Duration,
};

use log::{debug, info, warn};

use crate::{
    clock::{Clock, StopSignal},
    error::Error,
    output::OutputLog,
    sample::Sample,
    session::Session,
    source::SampleSource,
};

/// Pause after a failed read.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Longest uninterrupted wait; the stop signal is checked between slices.
const PAUSE_SLICE: Duration = Duration::from_millis(100);

/// Lifecycle of a [`Sampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Not started.
    Idle,
    /// Creating the output log.
    Opening,
    /// Reading and logging samples.
    Sampling,
    /// Backing off after a failed read.
    Retrying,
    /// Releasing the sensor and closing the log.
    Closing,
    /// Finished; the sensor has been released.
    Done,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Rows written to the output log.
    pub rows: u64,
    /// Failed reads that were retried.
    pub retries: u64,
    /// Whether the run was cut short by a stop request.
    pub interrupted: bool,
}

/// Periodic sampler driving one [`SampleSource`].
///
/// The sampler owns the source and releases it when the run ends, on every exit
/// path. If the sampler is dropped without finishing a run the source is released
/// then.
pub struct Sampler<'a, S, C>
where
    S: SampleSource,
    C: Clock,
{
    source: S,
    clock: C,
    stop: StopSignal,
    backoff: Duration,
    console: Box<dyn Write + 'a>,
    state: State,
    released: bool,
}

impl<'a, S, C> Sampler<'a, S, C>
where
    S: SampleSource,
    C: Clock,
{
    /// Creates a sampler printing its summaries to stdout.
    pub fn new(source: S, clock: C) -> Self {
        Self {
            source,
            clock,
            stop: StopSignal::new(),
            backoff: RETRY_BACKOFF,
            console: Box::new(io::stdout()),
            state: State::Idle,
            released: false,
        }
    }

    /// Use `stop` to end the run early.
    #[must_use]
    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Pause this long after a failed read instead of [`RETRY_BACKOFF`].
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Print per-sample summaries to `console` instead of stdout.
    #[must_use]
    pub fn with_console(mut self, console: impl Write + 'a) -> Self {
        self.console = Box::new(console);
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// The source being sampled.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Sample until the session's duration elapses or a stop is requested.
    ///
    /// The sensor is released before this returns, whatever the outcome, so a
    /// sampler runs at most once.
    /// # Errors
    /// will return `Err` if the output log cannot be created or written, or if the
    /// sampler has already run. Sensor read failures are retried and never returned.
    pub fn run(&mut self, session: &Session) -> Result<RunSummary, Error> {
        if self.state != State::Idle {
            return Err(Error::InvalidSession("sampler has already run".to_string()));
        }
        let start = self.clock.now();
        let deadline = start + session.duration();

        self.transition(State::Opening);
        let mut log = match OutputLog::create(session, self.source.channels()) {
            Ok(log) => log,
            Err(e) => {
                self.close();
                return Err(e);
            }
        };
        info!(
            "logging {} to {} for {:?} every {:?}",
            session.source_id(),
            log.path().display(),
            session.duration(),
            session.interval(),
        );

        self.transition(State::Sampling);
        let result = self.sample(&mut log, start, deadline, session.interval());

        self.close();
        let finished = log.finish();
        let mut summary = result?;
        summary.rows = finished?;
        info!(
            "done: {} rows, {} retries{}",
            summary.rows,
            summary.retries,
            if summary.interrupted { " (interrupted)" } else { "" }
        );
        Ok(summary)
    }

    fn sample(
        &mut self,
        log: &mut OutputLog,
        start: Duration,
        deadline: Duration,
        interval: Duration,
    ) -> Result<RunSummary, Error> {
        let mut summary = RunSummary::default();

        loop {
            if self.stop.is_triggered() {
                info!("stop requested");
                summary.interrupted = true;
                break;
            }
            if self.clock.now() >= deadline {
                break;
            }

            match self.source.read() {
                Ok(reading) => {
                    let elapsed = self.clock.now().saturating_sub(start);
                    let sample = Sample::new(elapsed, reading);
                    if let Err(e) = write!(self.console, "{sample}") {
                        warn!("could not print sample: {e}");
                    }
                    log.append(&sample)?;
                    self.pause_until(deadline, interval);
                }
                Err(e) => {
                    self.transition(State::Retrying);
                    warn!("unable to read from sensor (retrying): {e}");
                    summary.retries += 1;
                    self.pause_until(deadline, self.backoff);
                    self.transition(State::Sampling);
                }
            }
        }

        Ok(summary)
    }

    /// Wait for `wanted`, but never past `deadline`, returning early on a stop.
    fn pause_until(&mut self, deadline: Duration, wanted: Duration) {
        let remaining = deadline.saturating_sub(self.clock.now());
        let mut left = wanted.min(remaining);
        while !left.is_zero() && !self.stop.is_triggered() {
            let slice = left.min(PAUSE_SLICE);
            self.clock.pause(slice);
            left -= slice;
        }
    }

    fn close(&mut self) {
        self.transition(State::Closing);
        self.release();
        self.transition(State::Done);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.source.close() {
            warn!("failed to release {}: {e}", self.source.id());
        }
    }

    fn transition(&mut self, to: State) {
        if self.state != to {
            debug!("sampler {:?} -> {:?}", self.state, to);
            self.state = to;
        }
    }
}

impl<S, C> Drop for Sampler<'_, S, C>
where
    S: SampleSource,
    C: Clock,
{
    fn drop(&mut self) {
        self.release();
    }
}
