//! Run-level parameters.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Local};

use crate::error::Error;

/// Fixed parameters of one logging run.
///
/// Built once before the run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Session {
    created: DateTime<Local>,
    duration: Duration,
    interval: Duration,
    output_path: PathBuf,
    source_id: String,
}

impl Session {
    /// Create a session from durations in seconds.
    /// # Errors
    /// will return `Err` if either duration is negative or not finite, or if
    /// `source_id` contains a character that would break the meta line
    pub fn new(
        duration_s: f64,
        interval_s: f64,
        output_path: impl Into<PathBuf>,
        source_id: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            created: Local::now(),
            duration: seconds("duration", duration_s)?,
            interval: seconds("interval", interval_s)?,
            output_path: output_path.into(),
            source_id: checked_source_id(source_id.into())?,
        })
    }

    /// Override the creation timestamp.
    #[must_use]
    pub fn with_created(mut self, created: DateTime<Local>) -> Self {
        self.created = created;
        self
    }

    /// Wall-clock time the session was created.
    #[must_use]
    pub fn created(&self) -> DateTime<Local> {
        self.created
    }

    /// How long to sample for.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Minimum spacing between successful samples.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Where the log is written.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Port or bus the readings come from.
    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// The `# meta` line that opens the output log.
    #[must_use]
    pub fn meta_line(&self) -> String {
        format!(
            "# meta,created={},duration_s={},interval_s={},source={}",
            self.created.format(TIMESTAMP_FORMAT),
            self.duration.as_secs_f64(),
            self.interval.as_secs_f64(),
            self.source_id,
        )
    }
}

/// Layout of wall-clock timestamps in the meta line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn seconds(name: &str, value: f64) -> Result<Duration, Error> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidSession(format!(
            "{name} must be a non-negative number of seconds, got {value}"
        )));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|e| Error::InvalidSession(format!("{name} out of range: {e}")))
}

// The meta line is a flat list of `key=value` pairs split on `,`.
fn checked_source_id(id: String) -> Result<String, Error> {
    if id.contains([',', '=', '\n', '\r']) {
        return Err(Error::InvalidSession(format!(
            "source id `{}` may not contain `,`, `=` or line breaks",
            id.escape_debug()
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_negative_and_non_finite_durations() {
        for (d, i) in [(-1.0, 2.0), (10.0, -0.5), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            let err = Session::new(d, i, "out.csv", "/dev/serial0").unwrap_err();
            assert!(matches!(err, Error::InvalidSession(_)));
            assert!(!err.is_resource());
        }
    }

    #[test]
    fn zero_is_a_valid_duration_and_interval() {
        let session = Session::new(0.0, 0.0, "out.csv", "/dev/serial0").unwrap();
        assert_eq!(session.duration(), Duration::ZERO);
        assert_eq!(session.interval(), Duration::ZERO);
    }

    #[test]
    fn meta_line_echoes_parameters() {
        let created = Local.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        let session = Session::new(10.0, 0.5, "out.csv", "/dev/serial0")
            .unwrap()
            .with_created(created);

        assert_eq!(
            session.meta_line(),
            "# meta,created=2026-10-16 09:30:00,duration_s=10,interval_s=0.5,source=/dev/serial0"
        );
    }

    #[test]
    fn source_ids_that_would_split_the_meta_line_are_rejected() {
        for id in ["/dev/tty,1", "bus=1", "a\nb"] {
            let err = Session::new(1.0, 1.0, "out.csv", id).unwrap_err();
            assert!(matches!(err, Error::InvalidSession(_)), "{id}");
        }
        assert!(Session::new(1.0, 1.0, "out.csv", "/dev/serial0+/dev/i2c-1").is_ok());
    }
}
