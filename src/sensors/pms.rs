use std::{path::Path, time::Duration};

use linux_embedded_hal::{
    serial_core::{self, prelude::*},
    Serial,
};
use log::debug;
use pms_7003::{OutputFrame, Pms7003Sensor};

use crate::{
    channel::{Channel, ChannelSet},
    error::{Error, SensorReadError},
    sample::Reading,
    source::SampleSource,
};

const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// PMSA003 / PMS7003 particulate sensor on a UART.
///
/// The port is reconfigured to 9600 8N1 with a one second timeout on open,
/// whatever speed the tty was left at. Only the sensor's TX line needs wiring for
/// active-mode reads.
pub struct Pm25Uart {
    sensor: Option<Pms7003Sensor<Serial>>,
    port: String,
}

impl Pm25Uart {
    /// Open the sensor on `port`.
    /// # Errors
    /// will return `Err` if the serial device cannot be opened or configured
    pub fn open(port: &str) -> Result<Self, Error> {
        let mut serial = Serial::open(Path::new(port)).map_err(|e| Error::device(port, e))?;
        serial
            .0
            .reconfigure(&|settings| {
                settings.set_baud_rate(serial_core::Baud9600)?;
                settings.set_char_size(serial_core::Bits8);
                settings.set_parity(serial_core::ParityNone);
                settings.set_stop_bits(serial_core::Stop1);
                settings.set_flow_control(serial_core::FlowNone);
                Ok(())
            })
            .map_err(|e| Error::device(port, e))?;
        serial
            .0
            .set_timeout(READ_TIMEOUT)
            .map_err(|e| Error::device(port, e))?;
        debug!("opened PM2.5 sensor on {port} at 9600 baud");

        Ok(Self {
            sensor: Some(Pms7003Sensor::new(serial)),
            port: port.to_string(),
        })
    }
}

impl SampleSource for Pm25Uart {
    fn id(&self) -> String {
        self.port.clone()
    }

    fn channels(&self) -> ChannelSet {
        ChannelSet::PARTICULATE
    }

    fn read(&mut self) -> Result<Reading, SensorReadError> {
        let sensor = self
            .sensor
            .as_mut()
            .ok_or_else(|| SensorReadError::Driver("port closed".to_string()))?;
        let frame = sensor.read().map_err(read_error)?;
        Ok(frame_reading(&frame))
    }

    fn close(&mut self) -> Result<(), Error> {
        // Dropping the driver closes the serial port.
        if self.sensor.take().is_some() {
            debug!("closed {}", self.port);
        }
        Ok(())
    }
}

fn read_error(e: pms_7003::Error) -> SensorReadError {
    use pms_7003::Error as Pms;

    match e {
        Pms::ChecksumError => SensorReadError::Checksum,
        Pms::ReadFailed => SensorReadError::Framing("no frame start in stream".to_string()),
        Pms::IncorrectResponse => {
            SensorReadError::Framing("unexpected command response".to_string())
        }
        Pms::NoResponse => SensorReadError::Timeout,
        Pms::SendFailed => SensorReadError::Driver("command write failed".to_string()),
    }
}

fn frame_reading(frame: &OutputFrame) -> Reading {
    [
        (Channel::Pm10Standard, frame.pm1_0),
        (Channel::Pm25Standard, frame.pm2_5),
        (Channel::Pm100Standard, frame.pm10),
        (Channel::Pm10Env, frame.pm1_0_atm),
        (Channel::Pm25Env, frame.pm2_5_atm),
        (Channel::Pm100Env, frame.pm10_atm),
        (Channel::Particles03um, frame.beyond_0_3),
        (Channel::Particles05um, frame.beyond_0_5),
        (Channel::Particles10um, frame.beyond_1_0),
        (Channel::Particles25um, frame.beyond_2_5),
        (Channel::Particles50um, frame.beyond_5_0),
        (Channel::Particles100um, frame.beyond_10_0),
    ]
    .into_iter()
    .fold(Reading::new(), |reading, (channel, value)| {
        reading.with(channel, f64::from(value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_map_to_read_errors() {
        assert!(matches!(
            read_error(pms_7003::Error::ChecksumError),
            SensorReadError::Checksum
        ));
        assert!(matches!(
            read_error(pms_7003::Error::ReadFailed),
            SensorReadError::Framing(_)
        ));
        assert!(matches!(
            read_error(pms_7003::Error::IncorrectResponse),
            SensorReadError::Framing(_)
        ));
        assert!(matches!(
            read_error(pms_7003::Error::NoResponse),
            SensorReadError::Timeout
        ));
        assert!(matches!(
            read_error(pms_7003::Error::SendFailed),
            SensorReadError::Driver(_)
        ));
    }

    #[test]
    fn frame_fills_every_particulate_channel() {
        let frame = OutputFrame {
            start1: 0x42,
            start2: 0x4d,
            frame_length: 28,
            pm1_0: 1,
            pm2_5: 2,
            pm10: 3,
            pm1_0_atm: 4,
            pm2_5_atm: 5,
            pm10_atm: 6,
            beyond_0_3: 300,
            beyond_0_5: 50,
            beyond_1_0: 10,
            beyond_2_5: 2,
            beyond_5_0: 1,
            beyond_10_0: 0,
            reserved: 0,
            check: 0,
        };
        let reading = frame_reading(&frame);
        assert_eq!(reading.populated(), ChannelSet::PARTICULATE);
        assert_eq!(reading.get(Channel::Pm25Env), Some(5.0));
        assert_eq!(reading.get(Channel::Particles03um), Some(300.0));
    }
}
