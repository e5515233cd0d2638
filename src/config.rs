//! Command-line configuration.

use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Local};
use clap::{Parser, ValueEnum};

use crate::{error::Error, sensors::SEA_LEVEL_HPA, session::Session};

/// Serial port used when neither `--port` nor `PM25_SERIAL_PORT` is given.
pub const DEFAULT_SERIAL_PORT: &str = "/dev/serial0";

/// I2C bus used when neither `--i2c-bus` nor `AIRSAMPLE_I2C_BUS` is given.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Which sensor(s) to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SensorKind {
    /// PMSA003 particulate sensor over UART.
    Pm25,
    /// BME680 environmental sensor over I2C.
    Bme680,
    /// Both sensors, one row per pair of readings.
    Both,
}

impl SensorKind {
    /// Prefix of the default output file name.
    #[must_use]
    pub const fn log_prefix(self) -> &'static str {
        match self {
            Self::Pm25 => "pm25",
            Self::Bme680 => "bme680",
            Self::Both => "air_weather",
        }
    }
}

/// Poll an environmental sensor and log its readings to CSV.
#[derive(Debug, Parser)]
#[command(name = "airsample", version, about)]
pub struct Cli {
    /// How long to log for, in seconds.
    #[arg(long, default_value_t = 60.0, allow_negative_numbers = true)]
    pub duration: f64,

    /// Delay between successful reads, in seconds.
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    pub interval: f64,

    /// Output CSV path [default: <sensor>_log_<YYYYmmdd_HHMMSS>.csv].
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Serial device of the PM2.5 sensor.
    #[arg(long, env = "PM25_SERIAL_PORT", default_value = DEFAULT_SERIAL_PORT)]
    pub port: String,

    /// I2C bus of the BME680.
    #[arg(long, env = "AIRSAMPLE_I2C_BUS", default_value = DEFAULT_I2C_BUS)]
    pub i2c_bus: String,

    /// Sensor(s) to log.
    #[arg(long, value_enum, default_value_t = SensorKind::Pm25)]
    pub sensor: SensorKind,

    /// Local sea-level pressure in hPa, used to derive altitude.
    #[arg(long, default_value_t = SEA_LEVEL_HPA)]
    pub sea_level_pressure: f64,

    /// Pause after a failed read, in seconds.
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub retry_backoff: f64,

    /// Do not print a summary of every sample.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Session parameters. The source id is the device path(s).
    pub session: Session,
    /// Sensor(s) to open.
    pub sensor: SensorKind,
    /// Serial device of the PM2.5 sensor.
    pub port: String,
    /// I2C bus of the BME680.
    pub i2c_bus: String,
    /// Local sea-level pressure, hPa.
    pub sea_level_hpa: f64,
    /// Pause after a failed read.
    pub retry_backoff: Duration,
    /// Print per-sample summaries.
    pub echo: bool,
}

impl Cli {
    /// Validate the arguments. `now` names the default output file.
    /// # Errors
    /// will return `Err` for negative or non-finite durations, or a non-positive
    /// sea-level pressure
    pub fn settings(&self, now: DateTime<Local>) -> Result<Settings, Error> {
        let retry_backoff = Duration::try_from_secs_f64(self.retry_backoff).map_err(|_| {
            Error::InvalidSession(format!(
                "retry backoff must be a non-negative number of seconds, got {}",
                self.retry_backoff
            ))
        })?;
        if !self.sea_level_pressure.is_finite() || self.sea_level_pressure <= 0.0 {
            return Err(Error::InvalidSession(format!(
                "sea-level pressure must be positive, got {}",
                self.sea_level_pressure
            )));
        }

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(self.sensor, now));
        let session = Session::new(self.duration, self.interval, output, self.source_id())?
            .with_created(now);

        Ok(Settings {
            session,
            sensor: self.sensor,
            port: self.port.clone(),
            i2c_bus: self.i2c_bus.clone(),
            sea_level_hpa: self.sea_level_pressure,
            retry_backoff,
            echo: !self.quiet,
        })
    }

    fn source_id(&self) -> String {
        match self.sensor {
            SensorKind::Pm25 => self.port.clone(),
            SensorKind::Bme680 => self.i2c_bus.clone(),
            SensorKind::Both => format!("{}+{}", self.port, self.i2c_bus),
        }
    }
}

/// Timestamped file name, so separate runs never overwrite each other.
#[must_use]
pub fn default_output_path(sensor: SensorKind, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "{}_log_{}.csv",
        sensor.log_prefix(),
        now.format("%Y%m%d_%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 14, 5, 9).unwrap()
    }

    #[test]
    fn defaults_match_the_lab_setup() {
        let cli = Cli::try_parse_from(["airsample", "--port", "/dev/ttyS0"]).unwrap();
        let settings = cli.settings(now()).unwrap();

        assert_eq!(settings.sensor, SensorKind::Pm25);
        assert_eq!(settings.session.duration(), Duration::from_secs(60));
        assert_eq!(settings.session.interval(), Duration::from_secs(2));
        assert_eq!(settings.session.source_id(), "/dev/ttyS0");
        assert_eq!(
            settings.session.output_path(),
            PathBuf::from("pm25_log_20261016_140509.csv")
        );
        assert_eq!(settings.retry_backoff, Duration::from_millis(500));
        assert!(settings.echo);
    }

    #[test]
    fn both_sensors_share_one_source_id() {
        let cli = Cli::try_parse_from([
            "airsample",
            "--sensor",
            "both",
            "--port",
            "/dev/serial0",
            "--i2c-bus",
            "/dev/i2c-3",
            "--duration",
            "30",
            "--interval",
            "1",
            "--output",
            "run.csv",
            "--quiet",
        ])
        .unwrap();
        let settings = cli.settings(now()).unwrap();

        assert_eq!(settings.session.source_id(), "/dev/serial0+/dev/i2c-3");
        assert_eq!(settings.session.output_path(), PathBuf::from("run.csv"));
        assert_eq!(settings.i2c_bus, "/dev/i2c-3");
        assert!(!settings.echo);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let cli = Cli::try_parse_from(["airsample", "--duration", "-5"]).unwrap();
        assert!(matches!(
            cli.settings(now()),
            Err(Error::InvalidSession(_))
        ));
    }

    #[test]
    fn unknown_sensor_is_a_parse_error() {
        assert!(Cli::try_parse_from(["airsample", "--sensor", "sds011"]).is_err());
    }

    #[test]
    fn default_names_differ_per_sensor() {
        assert_eq!(
            default_output_path(SensorKind::Both, now()),
            PathBuf::from("air_weather_log_20261016_140509.csv")
        );
        assert_eq!(
            default_output_path(SensorKind::Bme680, now()),
            PathBuf::from("bme680_log_20261016_140509.csv")
        );
    }
}
