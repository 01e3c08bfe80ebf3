use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::{Clock, elapsed_ms};
use crate::error::Sht1xError;
use crate::pins::{DataLine, InputMode};

/// Measurement commands understood by the sensor.
///
/// The upper 3 bits are the address and must be `000`, the lower 5 bits
/// select the command.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    MeasureTemperature = 0b0000_0011,
    MeasureHumidity = 0b0000_0101,
}

/// Position of the bus in a measurement transaction.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    CommandSent,
    AwaitingResult,
    DataRead,
    Closed,
}

/// Data line levels sampled around the 9th clock pulse of a command.
///
/// The sensor pulls the line low while the clock is high and releases it
/// after the falling edge. The driver never fails on these values.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandAck {
    /// Line was low while the clock was high.
    pub acknowledged: bool,
    /// Line was high again after the falling edge.
    pub released: bool,
}

impl CommandAck {
    /// Whether the sensor answered with a well formed acknowledgement.
    pub fn is_ok(&self) -> bool {
        self.acknowledged && self.released
    }
}

/// Bit-banged two-wire transport to an SHT1x.
///
/// Owns both lines for the lifetime of the driver; one transaction is
/// `send_command`, `wait_for_ready`, `read_result16` then
/// `end_transaction_skip_crc`, and transactions must not interleave.
pub struct Protocol<DATA, CLK, CLOCK> {
    data: DATA,
    clk: CLK,
    clock: CLOCK,
    input_mode: InputMode,
    state: State,
}

impl<DATA, CLK, CLOCK, E> Protocol<DATA, CLK, CLOCK>
where
    DATA: DataLine<Error = E>,
    CLK: OutputPin<Error = E>,
    CLOCK: Clock,
{
    /// Creates the transport.
    ///
    /// # Arguments
    ///
    /// * `data` - The data line, switched between output and input.
    /// * `clk` - The clock line, always driven by the MCU.
    /// * `clock` - Millisecond clock bounding the ready wait.
    /// * `input_mode` - Mode applied whenever the data line is released.
    pub fn new(data: DATA, clk: CLK, clock: CLOCK, input_mode: InputMode) -> Self {
        Protocol {
            data,
            clk,
            clock,
            input_mode,
            state: State::Idle,
        }
    }

    /// Current position in the transaction.
    pub fn state(&self) -> State {
        self.state
    }

    /// Gives back the lines and the clock.
    pub fn release(self) -> (DATA, CLK, CLOCK) {
        (self.data, self.clk, self.clock)
    }

    /// Sends the start condition followed by `command`, MSB first.
    ///
    /// After the 8 data bits the data line is released and the sensor's
    /// acknowledgement is sampled around the 9th clock pulse. The sampled
    /// levels are returned as diagnostics only.
    pub fn send_command(&mut self, command: Command) -> Result<CommandAck, Sht1xError<E>> {
        self.start()?;
        self.shift_out(command as u8)?;

        self.clk.set_high()?;
        self.data.set_input(self.input_mode)?;
        let acknowledged = self.data.is_low()?;
        self.clk.set_low()?;
        let released = self.data.is_high()?;

        self.state = State::CommandSent;
        Ok(CommandAck {
            acknowledged,
            released,
        })
    }

    /// Busy-polls until the sensor pulls the data line low.
    ///
    /// # Errors
    ///
    /// Returns `Sht1xError::Timeout` once `timeout_ms` has elapsed without
    /// the ready signal.
    pub fn wait_for_ready(&mut self, timeout_ms: u32) -> Result<(), Sht1xError<E>> {
        self.data.set_input(self.input_mode)?;
        self.state = State::AwaitingResult;

        let start = self.clock.now_ms();
        loop {
            if self.data.is_low()? {
                return Ok(());
            }
            if elapsed_ms(start, self.clock.now_ms()) >= timeout_ms {
                #[cfg(feature = "defmt")]
                defmt::warn!("sht1x: no result after {} ms", timeout_ms);
                return Err(Sht1xError::Timeout);
            }
        }
    }

    /// Clocks in the 16-bit result, acknowledging the first byte.
    pub fn read_result16(&mut self) -> Result<u16, Sht1xError<E>> {
        self.data.set_input(self.input_mode)?;
        let msb = self.shift_in()?;

        // Ack the high byte so the sensor sends the low byte
        self.data.set_output()?;
        self.data.set_high()?;
        self.data.set_low()?;
        self.pulse_clock()?;

        self.data.set_input(self.input_mode)?;
        let lsb = self.shift_in()?;

        self.state = State::DataRead;
        Ok(u16::from_be_bytes([msb, lsb]))
    }

    /// Ends the transaction by not acknowledging, so no CRC byte follows.
    pub fn end_transaction_skip_crc(&mut self) -> Result<(), Sht1xError<E>> {
        self.data.set_output()?;
        self.data.set_high()?;
        self.pulse_clock()?;

        self.state = State::Closed;
        Ok(())
    }

    /// Transmission start: data falls while clock is high, then rises
    /// during a second clock-high phase.
    fn start(&mut self) -> Result<(), Sht1xError<E>> {
        self.data.set_output()?;
        self.data.set_high()?;
        self.clk.set_high()?;
        self.data.set_low()?;
        self.clk.set_low()?;
        self.clk.set_high()?;
        self.data.set_high()?;
        self.clk.set_low()?;
        Ok(())
    }

    fn shift_out(&mut self, byte: u8) -> Result<(), Sht1xError<E>> {
        for i in 0..8 {
            if byte & (1 << (7 - i)) != 0 {
                self.data.set_high()?;
            } else {
                self.data.set_low()?;
            }
            self.pulse_clock()?;
        }
        Ok(())
    }

    /// Reads one byte MSB first, sampling while the clock is high.
    fn shift_in(&mut self) -> Result<u8, Sht1xError<E>> {
        let mut byte: u8 = 0;

        for i in 0..8 {
            let bit_mask = 1 << (7 - i);
            self.clk.set_high()?;
            if self.data.is_high()? {
                byte |= bit_mask;
            }
            self.clk.set_low()?;
        }

        Ok(byte)
    }

    fn pulse_clock(&mut self) -> Result<(), Sht1xError<E>> {
        self.clk.set_high()?;
        self.clk.set_low()?;
        Ok(())
    }
}
