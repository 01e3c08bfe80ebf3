use embedded_hal::digital::OutputPin;

use crate::clock::Clock;
use crate::conversion::Coefficients;
use crate::error::Sht1xError;
use crate::pins::{DataLine, InputMode};
use crate::protocol::{Command, CommandAck, Protocol, State};

/// Supply voltage assumed when none is configured, in volts.
pub const DEFAULT_VOLTAGE: f32 = 5.0;

/// Maximum time to wait (in milliseconds) for a measurement to finish.
///
/// A 14-bit temperature measurement takes up to 320 ms.
pub const TIMEOUT_MILLIS: u32 = 1000;

/// What a full read does when the sensor never signals a finished
/// measurement.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Return `Sht1xError::Timeout`.
    #[default]
    Fail,
    /// Clock in whatever is on the data line anyway. The result is
    /// meaningless but looks like a normal reading.
    ReadAnyway,
}

/// Construction-time driver configuration.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Sensor supply voltage, selects the temperature offsets.
    pub supply_voltage: f32,
    /// Mode of the data line while the sensor drives it.
    pub input_mode: InputMode,
    /// Upper bound on the wait for a finished measurement.
    pub ready_timeout_ms: u32,
    pub on_timeout: TimeoutPolicy,
}

impl Config {
    /// Configuration for a sensor powered at `supply_voltage`, optionally
    /// using the MCU's internal pull-up on the data line.
    pub fn new(supply_voltage: f32, internal_pullup: bool) -> Self {
        Config {
            supply_voltage,
            input_mode: if internal_pullup {
                InputMode::PullUp
            } else {
                InputMode::Floating
            },
            ..Config::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            supply_voltage: DEFAULT_VOLTAGE,
            input_mode: InputMode::Floating,
            ready_timeout_ms: TIMEOUT_MILLIS,
            on_timeout: TimeoutPolicy::Fail,
        }
    }
}

/// Reading returned by [`Sht1x::read`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Temperature compensated relative humidity in percent.
    pub relative_humidity: f32,
}

/// Driver for the SHT1x temperature and humidity sensors.
pub struct Sht1x<DATA, CLK, CLOCK> {
    protocol: Protocol<DATA, CLK, CLOCK>,
    coefficients: Coefficients,
    ready_timeout_ms: u32,
    on_timeout: TimeoutPolicy,
    last_temperature_raw: Option<u16>,
    last_ack: Option<CommandAck>,
}

impl<DATA, CLK, CLOCK, E> Sht1x<DATA, CLK, CLOCK>
where
    DATA: DataLine<Error = E>,
    CLK: OutputPin<Error = E>,
    CLOCK: Clock,
{
    /// Creates a new instance of the SHT1x driver for a 5 V sensor.
    ///
    /// # Arguments
    ///
    /// * `data` - The GPIO connected to the sensor's DATA line. Must be able to switch direction.
    /// * `clk` - The GPIO connected to the sensor's SCK line.
    /// * `clock` - A millisecond clock used to time out the measurement wait.
    pub fn new(data: DATA, clk: CLK, clock: CLOCK) -> Self {
        Self::with_config(data, clk, clock, Config::default())
    }

    /// Creates a new instance of the SHT1x driver with an explicit [`Config`].
    ///
    /// Conversion coefficients are derived here once and kept for the
    /// lifetime of the driver.
    pub fn with_config(data: DATA, clk: CLK, clock: CLOCK, config: Config) -> Self {
        Sht1x {
            protocol: Protocol::new(data, clk, clock, config.input_mode),
            coefficients: Coefficients::for_voltage(config.supply_voltage),
            ready_timeout_ms: config.ready_timeout_ms,
            on_timeout: config.on_timeout,
            last_temperature_raw: None,
            last_ack: None,
        }
    }

    /// Measures temperature, then humidity compensated with that temperature.
    ///
    /// These are two separate transactions on the bus.
    pub fn read(&mut self) -> Result<Reading, Sht1xError<E>> {
        let temperature = self.read_temperature_c()?;
        let relative_humidity = self.read_humidity()?;

        Ok(Reading {
            temperature,
            relative_humidity,
        })
    }

    /// Measures the temperature in degrees Celsius.
    pub fn read_temperature_c(&mut self) -> Result<f32, Sht1xError<E>> {
        self.request_temperature()?;
        let raw = self.read_in_temperature()?;
        Ok(self.parse_temperature_c(raw))
    }

    /// Measures the temperature in degrees Fahrenheit.
    pub fn read_temperature_f(&mut self) -> Result<f32, Sht1xError<E>> {
        self.request_temperature()?;
        let raw = self.read_in_temperature()?;
        Ok(self.parse_temperature_f(raw))
    }

    /// Measures the relative humidity in percent.
    ///
    /// Compensation uses the most recent temperature code read by this
    /// driver. If none was read yet, a temperature measurement runs first.
    pub fn read_humidity(&mut self) -> Result<f32, Sht1xError<E>> {
        if self.last_temperature_raw.is_none() {
            self.request_temperature()?;
            self.read_in_temperature()?;
        }

        self.request_humidity()?;
        let raw = self.read_in_humidity()?;
        Ok(self.parse_humidity(raw))
    }

    /// Starts a temperature measurement.
    pub fn request_temperature(&mut self) -> Result<CommandAck, Sht1xError<E>> {
        self.request(Command::MeasureTemperature)
    }

    /// Starts a humidity measurement.
    pub fn request_humidity(&mut self) -> Result<CommandAck, Sht1xError<E>> {
        self.request(Command::MeasureHumidity)
    }

    /// Waits for and reads the raw temperature code, and remembers it for
    /// humidity compensation.
    pub fn read_in_temperature(&mut self) -> Result<u16, Sht1xError<E>> {
        let raw = self.read_in()?;
        self.last_temperature_raw = Some(raw);
        Ok(raw)
    }

    /// Waits for and reads the raw humidity code.
    pub fn read_in_humidity(&mut self) -> Result<u16, Sht1xError<E>> {
        self.read_in()
    }

    /// Converts a raw temperature code to degrees Celsius.
    pub fn parse_temperature_c(&self, raw: u16) -> f32 {
        self.coefficients.temperature_c(raw)
    }

    /// Converts a raw temperature code to degrees Fahrenheit.
    pub fn parse_temperature_f(&self, raw: u16) -> f32 {
        self.coefficients.temperature_f(raw)
    }

    /// Converts a raw humidity code using the last recorded temperature code.
    ///
    /// Falls back to a temperature code of 0 when no temperature was read.
    /// Use [`Coefficients::humidity`] to pass the temperature code explicitly.
    pub fn parse_humidity(&self, raw: u16) -> f32 {
        self.coefficients
            .humidity(raw, self.last_temperature_raw.unwrap_or(0))
    }

    /// Coefficients derived from the configured supply voltage.
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// The temperature code from the latest temperature measurement.
    pub fn last_temperature_raw(&self) -> Option<u16> {
        self.last_temperature_raw
    }

    /// Acknowledgement levels sampled during the latest command.
    pub fn last_ack(&self) -> Option<CommandAck> {
        self.last_ack
    }

    /// Current position in the bus transaction.
    pub fn state(&self) -> State {
        self.protocol.state()
    }

    /// Destroys the driver and gives back the lines and the clock.
    pub fn release(self) -> (DATA, CLK, CLOCK) {
        self.protocol.release()
    }

    fn request(&mut self, command: Command) -> Result<CommandAck, Sht1xError<E>> {
        let ack = self.protocol.send_command(command)?;

        if !ack.is_ok() {
            #[cfg(feature = "defmt")]
            defmt::trace!("sht1x: {} not acknowledged: {}", command, ack);
        }

        self.last_ack = Some(ack);
        Ok(ack)
    }

    fn read_in(&mut self) -> Result<u16, Sht1xError<E>> {
        match self.protocol.wait_for_ready(self.ready_timeout_ms) {
            Ok(()) => {}
            Err(Sht1xError::Timeout) if self.on_timeout == TimeoutPolicy::ReadAnyway => {}
            Err(e) => return Err(e),
        }

        let raw = self.protocol.read_result16()?;
        self.protocol.end_transaction_skip_crc()?;
        Ok(raw)
    }
}
