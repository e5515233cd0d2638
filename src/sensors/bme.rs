use std::time::Duration;

use bme680::{
    Bme680, I2CAddress, IIRFilterSize, OversamplingSetting, PowerMode, SettingsBuilder,
};
use linux_embedded_hal::{Delay, I2cdev};
use log::debug;

use super::altitude_m;
use crate::{
    channel::{Channel, ChannelSet},
    error::{Error, SensorReadError},
    sample::Reading,
    source::SampleSource,
};

/// BME680 temperature / humidity / pressure / gas sensor on an I2C bus.
///
/// Expects the breakout at the secondary address (0x77). Every read triggers one
/// forced-mode measurement.
pub struct Bme680Source {
    dev: Bme680<I2cdev, Delay>,
    delay: Delay,
    bus: String,
    sea_level_hpa: f64,
}

impl Bme680Source {
    /// Initialise the sensor on `bus`. `sea_level_hpa` is used to derive altitude.
    /// # Errors
    /// will return `Err` if the bus cannot be opened or the sensor does not respond
    pub fn open(bus: &str, sea_level_hpa: f64) -> Result<Self, Error> {
        let i2c = I2cdev::new(bus).map_err(|e| Error::device(bus, e))?;
        let mut delay = Delay;
        let mut dev = Bme680::init(i2c, &mut delay, I2CAddress::Secondary)
            .map_err(|e| Error::device(bus, format!("{e:?}")))?;

        let settings = SettingsBuilder::new()
            .with_humidity_oversampling(OversamplingSetting::OS2x)
            .with_pressure_oversampling(OversamplingSetting::OS4x)
            .with_temperature_oversampling(OversamplingSetting::OS8x)
            .with_temperature_filter(IIRFilterSize::Size3)
            .with_gas_measurement(Duration::from_millis(150), 320, 25)
            .with_run_gas(true)
            .build();
        dev.set_sensor_settings(&mut delay, settings)
            .map_err(|e| Error::device(bus, format!("{e:?}")))?;
        debug!("initialised BME680 on {bus}");

        Ok(Self {
            dev,
            delay,
            bus: bus.to_string(),
            sea_level_hpa,
        })
    }
}

impl SampleSource for Bme680Source {
    fn id(&self) -> String {
        self.bus.clone()
    }

    fn channels(&self) -> ChannelSet {
        ChannelSet::ENVIRONMENT
    }

    fn read(&mut self) -> Result<Reading, SensorReadError> {
        self.dev
            .set_sensor_mode(&mut self.delay, PowerMode::ForcedMode)
            .map_err(driver_error)?;
        let (data, _condition) = self
            .dev
            .get_sensor_data(&mut self.delay)
            .map_err(driver_error)?;

        let pressure = f64::from(data.pressure_hpa());
        Ok(Reading::new()
            .with(Channel::Temperature, f64::from(data.temperature_celsius()))
            .with(Channel::Humidity, f64::from(data.humidity_percent()))
            .with(Channel::Pressure, pressure)
            .with(Channel::Gas, f64::from(data.gas_resistance_ohm()))
            .with(Channel::Altitude, altitude_m(pressure, self.sea_level_hpa)))
    }

    fn close(&mut self) -> Result<(), Error> {
        self.dev
            .set_sensor_mode(&mut self.delay, PowerMode::SleepMode)
            .map_err(|e| Error::device(self.bus.clone(), format!("{e:?}")))
    }
}

fn driver_error(e: impl core::fmt::Debug) -> SensorReadError {
    SensorReadError::Driver(format!("{e:?}"))
}
