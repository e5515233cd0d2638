//! Error types.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Transient failure of a single sensor read.
///
/// A sampling run recovers from these locally: it backs off and tries again until
/// the session duration has elapsed.
#[derive(Debug, Error)]
pub enum SensorReadError {
    /// The frame checksum did not match its payload.
    #[error("checksum mismatch")]
    Checksum,
    /// The driver received bytes it could not frame.
    #[error("malformed frame: {0}")]
    Framing(String),
    /// No response within the driver's own timeout.
    #[error("sensor did not respond")]
    Timeout,
    /// Any other error reported by the underlying driver.
    #[error("driver error: {0}")]
    Driver(String),
}

/// Fatal error. Aborts a run, or prevents it from starting.
#[derive(Debug, Error)]
pub enum Error {
    /// The sensor device could not be opened or initialised.
    #[error("failed to open sensor device `{path}`: {reason}")]
    Device {
        /// Device path or bus the driver was pointed at.
        path: String,
        /// Driver-reported cause.
        reason: String,
    },
    /// The output log could not be created.
    #[error("failed to create output log `{}`: {source}", path.display())]
    OutputOpen {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A row or header could not be written to the output log.
    #[error("failed to write output log `{}`: {source}", path.display())]
    OutputWrite {
        /// Output path.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// Raw I/O on the output log failed (meta line, flush or sync).
    #[error("I/O error on output log `{}`: {source}", path.display())]
    OutputIo {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// An existing log does not have the expected layout.
    #[error("malformed output log `{}`: {reason}", path.display())]
    Malformed {
        /// Log path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },
    /// Session parameters were rejected.
    #[error("invalid session: {0}")]
    InvalidSession(String),
}

impl Error {
    pub(crate) fn device(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Device {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is a device or output-path failure rather than bad input.
    #[must_use]
    pub const fn is_resource(&self) -> bool {
        !matches!(self, Self::InvalidSession(_) | Self::Malformed { .. })
    }
}
