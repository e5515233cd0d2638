//! The seam between the sampling loop and a sensor driver.

use crate::{
    channel::ChannelSet,
    error::{Error, SensorReadError},
    sample::Reading,
};

/// A sensor driver as seen by the sampling loop.
///
/// The wire protocol lives entirely behind [`SampleSource::read`].
pub trait SampleSource {
    /// Port, bus or other identifier recorded in the log's meta line.
    fn id(&self) -> String;

    /// Channels this source populates; these become the log's columns.
    fn channels(&self) -> ChannelSet;

    /// Take one reading.
    /// # Errors
    /// will return `Err` on a transient failure; the caller may retry
    fn read(&mut self) -> Result<Reading, SensorReadError>;

    /// Release the underlying device.
    /// # Errors
    /// will return `Err` if the device could not be released cleanly
    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn id(&self) -> String {
        (**self).id()
    }

    fn channels(&self) -> ChannelSet {
        (**self).channels()
    }

    fn read(&mut self) -> Result<Reading, SensorReadError> {
        (**self).read()
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }
}

/// Two sources logged side by side into one row.
///
/// A read succeeds only when both sources succeed.
pub struct Combined<A, B> {
    first: A,
    second: B,
}

impl<A, B> Combined<A, B>
where
    A: SampleSource,
    B: SampleSource,
{
    /// Join two sources.
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Split back into the two sources.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A, B> SampleSource for Combined<A, B>
where
    A: SampleSource,
    B: SampleSource,
{
    fn id(&self) -> String {
        format!("{}+{}", self.first.id(), self.second.id())
    }

    fn channels(&self) -> ChannelSet {
        self.first.channels() | self.second.channels()
    }

    fn read(&mut self) -> Result<Reading, SensorReadError> {
        let first = self.first.read()?;
        let second = self.second.read()?;
        Ok(first.merge(&second))
    }

    fn close(&mut self) -> Result<(), Error> {
        // Both must be released even if the first one fails.
        let first = self.first.close();
        let second = self.second.close();
        first.and(second)
    }
}
