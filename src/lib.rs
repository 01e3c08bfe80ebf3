//! SHT1x Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the Sensirion SHT1x family
//! (SHT10, SHT11, SHT15) of temperature and humidity sensors, built on top of the
//! [`embedded-hal`] traits.
//!
//! The sensor talks a two-wire protocol that resembles I²C but is not
//! compatible with it, so the driver bit-bangs it over two GPIOs: a clock line
//! and a bidirectional data line.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments
//! - Supply voltage dependent temperature calibration
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following traits:
//! - [`OutputPin`] for the clock line
//! - [`DataLine`], an [`InputPin`] + [`OutputPin`] that can switch direction
//! - [`Clock`], a millisecond clock bounding the wait for a measurement
//!
//! # Limitations
//! The CRC byte the sensor can append is never requested, and a missing
//! acknowledgement is reported through [`Sht1x::last_ack`] rather than as an
//! error.
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs timeouts and clamped voltages
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod conversion;
pub mod error;
pub mod pins;
pub mod protocol;
pub mod sht1x;

#[cfg(test)]
mod sim;

pub use clock::Clock;
pub use conversion::Coefficients;
pub use error::Sht1xError;
pub use pins::{DataLine, InputMode};
pub use protocol::{Command, CommandAck, Protocol, State};
pub use sht1x::{Config, Reading, Sht1x, TimeoutPolicy, DEFAULT_VOLTAGE, TIMEOUT_MILLIS};
