//! Software stand-in for an SHT1x, used by the driver tests.
//!
//! The simulated sensor watches clock and data edges the way the real chip
//! does: it decodes the start condition and command, acknowledges, signals
//! readiness after a number of polls and clocks out a 16-bit result.

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::clock::Clock;
use crate::pins::{DataLine, InputMode};

/// Clock that advances by `step` milliseconds every time it is read.
pub struct TickClock {
    pub now: u32,
    step: u32,
}

impl TickClock {
    pub fn new(step: u32) -> Self {
        TickClock { now: 0, step }
    }
}

impl Clock for TickClock {
    fn now_ms(&mut self) -> u32 {
        let now = self.now;
        self.now = self.now.wrapping_add(self.step);
        now
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Peer {
    Idle,
    /// Data fell while the clock was high.
    StartLow,
    Receiving { bits: u8, command: u8 },
    AwaitAck { command: u8 },
    Acking { command: u8 },
    Measuring { value: u16, polls: u32 },
    Ready { value: u16 },
    /// `edge` counts rising clock edges since the result became ready.
    Sending { value: u16, edge: u8 },
}

/// Shared bus state between the simulated pins and the sensor model.
pub struct Bus {
    clk: bool,
    data_driven: bool,
    data_is_output: bool,
    peer: Peer,

    pub temperature: u16,
    pub humidity: u16,
    /// Number of polls before the result is ready, `None` never finishes.
    pub ready_after: Option<u32>,
    /// Whether the sensor pulls the line low on the 9th command pulse.
    pub acknowledge: bool,

    /// Data levels seen at each rising clock edge of a command.
    pub command_bits: Vec<bool>,
    pub commands: Vec<u8>,
    /// Transactions closed with data high, i.e. without requesting a CRC.
    pub crc_skipped: u32,
    pub input_modes: Vec<InputMode>,
}

impl Bus {
    fn line(&self) -> bool {
        if self.data_is_output {
            self.data_driven
        } else {
            !self.peer_pulls_low()
        }
    }

    fn peer_pulls_low(&self) -> bool {
        match self.peer {
            Peer::Acking { .. } => self.acknowledge,
            Peer::Ready { .. } => true,
            Peer::Sending { value, edge } => match edge {
                1..=8 => (value >> (16 - edge)) & 1 == 0,
                10..=17 => (value >> (17 - edge)) & 1 == 0,
                _ => false,
            },
            _ => false,
        }
    }

    fn read(&mut self) -> bool {
        if let Peer::Measuring { value, polls } = self.peer {
            self.peer = match self.ready_after {
                Some(limit) if polls >= limit => Peer::Ready { value },
                _ => Peer::Measuring {
                    value,
                    polls: polls + 1,
                },
            };
        }
        self.line()
    }

    fn drive_data(&mut self, level: bool) {
        let previous = self.data_driven;
        self.data_driven = level;
        if !self.data_is_output || !self.clk || previous == level {
            return;
        }

        self.peer = match (self.peer, level) {
            (Peer::Idle, false) => Peer::StartLow,
            (Peer::StartLow, true) => Peer::Receiving {
                bits: 0,
                command: 0,
            },
            (peer, _) => peer,
        };
    }

    fn drive_clock(&mut self, level: bool) {
        let previous = self.clk;
        self.clk = level;
        if previous == level {
            return;
        }

        if level {
            self.rising_edge();
        } else {
            self.falling_edge();
        }
    }

    fn rising_edge(&mut self) {
        let line = self.line();

        self.peer = match self.peer {
            Peer::Receiving { bits, command } => {
                let command = (command << 1) | line as u8;
                self.command_bits.push(line);
                if bits + 1 == 8 {
                    self.commands.push(command);
                    Peer::AwaitAck { command }
                } else {
                    Peer::Receiving {
                        bits: bits + 1,
                        command,
                    }
                }
            }
            Peer::AwaitAck { command } => Peer::Acking { command },
            Peer::Ready { value } => Peer::Sending { value, edge: 1 },
            Peer::Sending { value, edge } if edge < 17 => Peer::Sending {
                value,
                edge: edge + 1,
            },
            Peer::Sending { .. } => {
                if line {
                    self.crc_skipped += 1;
                }
                Peer::Idle
            }
            peer => peer,
        };
    }

    fn falling_edge(&mut self) {
        if let Peer::Acking { command } = self.peer {
            self.peer = match command {
                0b0000_0011 => Peer::Measuring {
                    value: self.temperature,
                    polls: 0,
                },
                0b0000_0101 => Peer::Measuring {
                    value: self.humidity,
                    polls: 0,
                },
                _ => Peer::Idle,
            };
        }
    }
}

/// A simulated sensor answering with fixed raw codes.
#[derive(Clone)]
pub struct SimulatedSensor {
    bus: Rc<RefCell<Bus>>,
}

impl SimulatedSensor {
    pub fn new(temperature: u16, humidity: u16) -> Self {
        SimulatedSensor {
            bus: Rc::new(RefCell::new(Bus {
                clk: false,
                data_driven: true,
                data_is_output: false,
                peer: Peer::Idle,
                temperature,
                humidity,
                ready_after: Some(3),
                acknowledge: true,
                command_bits: Vec::new(),
                commands: Vec::new(),
                crc_skipped: 0,
                input_modes: Vec::new(),
            })),
        }
    }

    /// Never signals a finished measurement.
    pub fn stalled(self) -> Self {
        self.bus.borrow_mut().ready_after = None;
        self
    }

    /// Ignores the 9th command pulse.
    pub fn silent(self) -> Self {
        self.bus.borrow_mut().acknowledge = false;
        self
    }

    pub fn data(&self) -> SimData {
        SimData {
            bus: self.bus.clone(),
        }
    }

    pub fn clk(&self) -> SimClk {
        SimClk {
            bus: self.bus.clone(),
        }
    }

    pub fn bus(&self) -> std::cell::Ref<'_, Bus> {
        self.bus.borrow()
    }
}

pub struct SimData {
    bus: Rc<RefCell<Bus>>,
}

impl ErrorType for SimData {
    type Error = Infallible;
}

impl InputPin for SimData {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bus.borrow_mut().read())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bus.borrow_mut().read())
    }
}

impl OutputPin for SimData {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().drive_data(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().drive_data(true);
        Ok(())
    }
}

impl DataLine for SimData {
    fn set_input(&mut self, mode: InputMode) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        bus.data_is_output = false;
        bus.input_modes.push(mode);
        Ok(())
    }

    fn set_output(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().data_is_output = true;
        Ok(())
    }
}

pub struct SimClk {
    bus: Rc<RefCell<Bus>>,
}

impl ErrorType for SimClk {
    type Error = Infallible;
}

impl OutputPin for SimClk {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().drive_clock(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().drive_clock(true);
        Ok(())
    }
}
