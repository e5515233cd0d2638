//! Periodic sampling of environmental sensors into CSV logs.
//!
//! A [`Sampler`] polls a [`SampleSource`] every `interval` for `duration`, prints a
//! summary of each reading and appends it to an [`OutputLog`]. Failed reads are
//! retried after a short backoff; they never end a run and never produce a row.
//!
//! Hardware sources for the PMSA003 particulate sensor (UART) and the BME680
//! environmental sensor (I2C) are available with the `linux` feature and are built
//! on [`linux-embedded-hal`].
//!
//! ```
//! use airsample::{
//!     Channel, ChannelSet, ManualClock, Reading, SampleSource, Sampler, SensorReadError,
//!     Session,
//! };
//!
//! struct Fixed;
//!
//! impl SampleSource for Fixed {
//!     fn id(&self) -> String {
//!         "fixed".into()
//!     }
//!     fn channels(&self) -> ChannelSet {
//!         ChannelSet::PM25_STANDARD
//!     }
//!     fn read(&mut self) -> Result<Reading, SensorReadError> {
//!         Ok(Reading::new().with(Channel::Pm25Standard, 5.0))
//!     }
//! }
//!
//! let dir = std::env::temp_dir().join("airsample-doc");
//! std::fs::create_dir_all(&dir).unwrap();
//! let session = Session::new(10.0, 2.0, dir.join("run.csv"), "fixed").unwrap();
//! let summary = Sampler::new(Fixed, ManualClock::new())
//!     .with_console(std::io::sink())
//!     .run(&session)
//!     .unwrap();
//! assert_eq!(summary.rows, 5);
//! ```
//!
//! [`linux-embedded-hal`]: https://docs.rs/linux-embedded-hal/~0.3

#![deny(missing_docs)]

pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod output;
pub mod sample;
pub mod sampler;
pub mod sensors;
pub mod session;
pub mod source;

pub use {
    channel::{Channel, ChannelSet},
    clock::{Clock, ManualClock, StdDelay, StopSignal, SystemClock},
    error::{Error, SensorReadError},
    output::{read_log, LoggedRun, OutputLog},
    sample::{Reading, Sample},
    sampler::{RunSummary, Sampler, State},
    session::Session,
    source::{Combined, SampleSource},
};
