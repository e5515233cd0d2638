//! Canonical channel schema: column names, console labels, units and precision.

use bitflags::bitflags;

/// A single named measurement a sensor can produce.
///
/// Declaration order is column order in the output log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// PM1.0 concentration, standard particle (CF=1), µg/m³.
    Pm10Standard,
    /// PM2.5 concentration, standard particle (CF=1), µg/m³.
    Pm25Standard,
    /// PM10 concentration, standard particle (CF=1), µg/m³.
    Pm100Standard,
    /// PM1.0 concentration, atmospheric environment, µg/m³.
    Pm10Env,
    /// PM2.5 concentration, atmospheric environment, µg/m³.
    Pm25Env,
    /// PM10 concentration, atmospheric environment, µg/m³.
    Pm100Env,
    /// Particles larger than 0.3 µm per 0.1 L of air.
    Particles03um,
    /// Particles larger than 0.5 µm per 0.1 L of air.
    Particles05um,
    /// Particles larger than 1.0 µm per 0.1 L of air.
    Particles10um,
    /// Particles larger than 2.5 µm per 0.1 L of air.
    Particles25um,
    /// Particles larger than 5.0 µm per 0.1 L of air.
    Particles50um,
    /// Particles larger than 10 µm per 0.1 L of air.
    Particles100um,
    /// Temperature, °C.
    Temperature,
    /// Relative humidity, %.
    Humidity,
    /// Barometric pressure, hPa.
    Pressure,
    /// Gas resistance, Ω.
    Gas,
    /// Altitude derived from pressure, m.
    Altitude,
}

impl Channel {
    /// Number of channels in the schema.
    pub const COUNT: usize = 17;

    /// Every channel, in column order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Pm10Standard,
        Self::Pm25Standard,
        Self::Pm100Standard,
        Self::Pm10Env,
        Self::Pm25Env,
        Self::Pm100Env,
        Self::Particles03um,
        Self::Particles05um,
        Self::Particles10um,
        Self::Particles25um,
        Self::Particles50um,
        Self::Particles100um,
        Self::Temperature,
        Self::Humidity,
        Self::Pressure,
        Self::Gas,
        Self::Altitude,
    ];

    /// Column name in the output log.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pm10Standard => "pm10_standard",
            Self::Pm25Standard => "pm25_standard",
            Self::Pm100Standard => "pm100_standard",
            Self::Pm10Env => "pm10_env",
            Self::Pm25Env => "pm25_env",
            Self::Pm100Env => "pm100_env",
            Self::Particles03um => "particles_03um",
            Self::Particles05um => "particles_05um",
            Self::Particles10um => "particles_10um",
            Self::Particles25um => "particles_25um",
            Self::Particles50um => "particles_50um",
            Self::Particles100um => "particles_100um",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Gas => "gas",
            Self::Altitude => "altitude",
        }
    }

    /// Human-readable label used in the console summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pm10Standard => "PM1.0 (standard)",
            Self::Pm25Standard => "PM2.5 (standard)",
            Self::Pm100Standard => "PM10  (standard)",
            Self::Pm10Env => "PM1.0 (env)",
            Self::Pm25Env => "PM2.5 (env)",
            Self::Pm100Env => "PM10  (env)",
            Self::Particles03um => "Particles > 0.3um / 0.1L air",
            Self::Particles05um => "Particles > 0.5um / 0.1L air",
            Self::Particles10um => "Particles > 1.0um / 0.1L air",
            Self::Particles25um => "Particles > 2.5um / 0.1L air",
            Self::Particles50um => "Particles > 5.0um / 0.1L air",
            Self::Particles100um => "Particles > 10 um / 0.1L air",
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Pressure => "Pressure",
            Self::Gas => "Gas",
            Self::Altitude => "Altitude",
        }
    }

    /// Unit suffix for the console summary. Empty for counts.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Pm10Standard
            | Self::Pm25Standard
            | Self::Pm100Standard
            | Self::Pm10Env
            | Self::Pm25Env
            | Self::Pm100Env => "ug/m3",
            Self::Particles03um
            | Self::Particles05um
            | Self::Particles10um
            | Self::Particles25um
            | Self::Particles50um
            | Self::Particles100um => "",
            Self::Temperature => "C",
            Self::Humidity => "%",
            Self::Pressure => "hPa",
            Self::Gas => "ohm",
            Self::Altitude => "m",
        }
    }

    /// Decimal places used when the value is rendered.
    #[must_use]
    pub const fn precision(self) -> usize {
        match self {
            Self::Temperature | Self::Humidity => 1,
            Self::Pressure => 3,
            Self::Altitude => 2,
            _ => 0,
        }
    }

    /// Render `value` with this channel's fixed precision.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        format!("{:.*}", self.precision(), value)
    }

    /// Position of this channel in [`Channel::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The single-channel set for this channel.
    #[must_use]
    pub const fn flag(self) -> ChannelSet {
        ChannelSet::from_bits_retain(1 << self as u32)
    }

    /// Look a channel up by column name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

bitflags! {
    /// Set of channels a source populates.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelSet: u32 {
        /// See [`Channel::Pm10Standard`].
        const PM10_STANDARD = 1 << 0;
        /// See [`Channel::Pm25Standard`].
        const PM25_STANDARD = 1 << 1;
        /// See [`Channel::Pm100Standard`].
        const PM100_STANDARD = 1 << 2;
        /// See [`Channel::Pm10Env`].
        const PM10_ENV = 1 << 3;
        /// See [`Channel::Pm25Env`].
        const PM25_ENV = 1 << 4;
        /// See [`Channel::Pm100Env`].
        const PM100_ENV = 1 << 5;
        /// See [`Channel::Particles03um`].
        const PARTICLES_03UM = 1 << 6;
        /// See [`Channel::Particles05um`].
        const PARTICLES_05UM = 1 << 7;
        /// See [`Channel::Particles10um`].
        const PARTICLES_10UM = 1 << 8;
        /// See [`Channel::Particles25um`].
        const PARTICLES_25UM = 1 << 9;
        /// See [`Channel::Particles50um`].
        const PARTICLES_50UM = 1 << 10;
        /// See [`Channel::Particles100um`].
        const PARTICLES_100UM = 1 << 11;
        /// See [`Channel::Temperature`].
        const TEMPERATURE = 1 << 12;
        /// See [`Channel::Humidity`].
        const HUMIDITY = 1 << 13;
        /// See [`Channel::Pressure`].
        const PRESSURE = 1 << 14;
        /// See [`Channel::Gas`].
        const GAS = 1 << 15;
        /// See [`Channel::Altitude`].
        const ALTITUDE = 1 << 16;

        /// Everything a PMSA003/PMS7003 frame carries.
        const PARTICULATE = Self::PM10_STANDARD.bits()
            | Self::PM25_STANDARD.bits()
            | Self::PM100_STANDARD.bits()
            | Self::PM10_ENV.bits()
            | Self::PM25_ENV.bits()
            | Self::PM100_ENV.bits()
            | Self::PARTICLES_03UM.bits()
            | Self::PARTICLES_05UM.bits()
            | Self::PARTICLES_10UM.bits()
            | Self::PARTICLES_25UM.bits()
            | Self::PARTICLES_50UM.bits()
            | Self::PARTICLES_100UM.bits();

        /// Everything a BME680 reading carries.
        const ENVIRONMENT = Self::TEMPERATURE.bits()
            | Self::HUMIDITY.bits()
            | Self::PRESSURE.bits()
            | Self::GAS.bits()
            | Self::ALTITUDE.bits();
    }
}

impl ChannelSet {
    /// Channels in this set, in column order.
    pub fn channels(self) -> impl Iterator<Item = Channel> {
        Channel::ALL
            .into_iter()
            .filter(move |c| self.contains(c.flag()))
    }
}

impl FromIterator<Channel> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, channel| set | channel.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_line_up_with_declaration_order() {
        for (i, channel) in Channel::ALL.into_iter().enumerate() {
            assert_eq!(channel.index(), i);
            assert_eq!(channel.flag().bits(), 1 << i);
        }
        assert_eq!(ChannelSet::all().channels().count(), Channel::COUNT);
    }

    #[test]
    fn source_sets_are_disjoint() {
        assert!(ChannelSet::PARTICULATE.intersection(ChannelSet::ENVIRONMENT).is_empty());
        assert_eq!(
            ChannelSet::PARTICULATE | ChannelSet::ENVIRONMENT,
            ChannelSet::all()
        );
    }

    #[test]
    fn channels_iterate_in_column_order() {
        let set: ChannelSet = [Channel::Gas, Channel::Pm25Standard, Channel::Temperature]
            .into_iter()
            .collect();
        let names: Vec<_> = set.channels().map(Channel::name).collect();
        assert_eq!(names, ["pm25_standard", "temperature", "gas"]);
    }

    #[test]
    fn values_render_with_fixed_precision() {
        assert_eq!(Channel::Temperature.format(21.46), "21.5");
        assert_eq!(Channel::Pressure.format(1013.25), "1013.250");
        assert_eq!(Channel::Altitude.format(12.346), "12.35");
        assert_eq!(Channel::Pm25Standard.format(5.0), "5");
        assert_eq!(Channel::Gas.format(50_123.4), "50123");
    }

    #[test]
    fn names_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_name(channel.name()), Some(channel));
        }
        assert_eq!(Channel::from_name("t_s"), None);
    }
}
