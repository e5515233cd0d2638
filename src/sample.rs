//! Readings and timestamped samples.

use core::fmt;
use std::time::Duration;

use crate::channel::{Channel, ChannelSet};

/// Channel values returned by one driver read.
///
/// Channels the driver does not report stay empty and are logged as empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    values: [Option<f64>; Channel::COUNT],
}

impl Reading {
    /// A reading with no channels populated.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: [None; Channel::COUNT],
        }
    }

    /// Builder-style [`Reading::set`].
    #[must_use]
    pub fn with(mut self, channel: Channel, value: f64) -> Self {
        self.set(channel, value);
        self
    }

    /// Store a value. Non-finite values are treated as missing.
    pub fn set(&mut self, channel: Channel, value: f64) {
        self.values[channel.index()] = value.is_finite().then_some(value);
    }

    /// Value of `channel`, if the driver reported it.
    #[must_use]
    pub const fn get(&self, channel: Channel) -> Option<f64> {
        self.values[channel.index()]
    }

    /// Channels that carry a value.
    #[must_use]
    pub fn populated(&self) -> ChannelSet {
        Channel::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_some())
            .collect()
    }

    /// Overlay `other` on top of `self`; values present in `other` win.
    #[must_use]
    pub fn merge(mut self, other: &Self) -> Self {
        for (mine, theirs) in self.values.iter_mut().zip(other.values) {
            if theirs.is_some() {
                *mine = theirs;
            }
        }
        self
    }
}

/// One successful read, stamped with the time since the run started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    elapsed: Duration,
    reading: Reading,
}

impl Sample {
    /// Stamp `reading` with `elapsed`.
    #[must_use]
    pub const fn new(elapsed: Duration, reading: Reading) -> Self {
        Self { elapsed, reading }
    }

    /// Time since the start of the run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Time since the start of the run, as rendered in the `t_s` column.
    #[must_use]
    pub fn t_s(&self) -> String {
        format!("{:.3}", self.elapsed.as_secs_f64())
    }

    /// The channel values.
    #[must_use]
    pub const fn reading(&self) -> &Reading {
        &self.reading
    }

    /// Cells for `channels`, in column order. Missing values are empty strings.
    pub fn cells(&self, channels: ChannelSet) -> impl Iterator<Item = String> + '_ {
        channels.channels().map(|channel| {
            self.reading
                .get(channel)
                .map(|v| channel.format(v))
                .unwrap_or_default()
        })
    }
}

/// Console summary, one line per populated channel.
impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "t={}s", self.t_s())?;
        writeln!(f, "---------------------------------------")?;
        for channel in self.reading.populated().channels() {
            let value = self.reading.get(channel).map(|v| channel.format(v));
            let label = format!("{}:", channel.label());
            match (value, channel.unit()) {
                (Some(v), "") => writeln!(f, "{label:<30}{v}")?,
                (Some(v), unit) => writeln!(f, "{label:<30}{v} {unit}")?,
                (None, _) => {}
            }
        }
        Ok(())
    }
}
