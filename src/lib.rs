//! DHT11 Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the DHT11 temperature
//! and humidity sensor, built on top of the [`embedded-hal`] traits.
//!
//! # Features
//! - Blocking synchronous API, one sensor transaction per call
//! - Designed for `no_std` environments
//! - Interrupts masked during bit sampling and restored on every exit path
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following traits:
//! - [`DataPin`], an `embedded-hal` [`InputPin`] + [`OutputPin`] that can switch direction
//! - [`MicrosTimer`] for microsecond pulse timing
//! - [`InterruptControl`] to guard the timing-critical window
//! - [`DelayNs`] for the start signal
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` for logging support
//! - `critical-section`: Provides `CriticalSection`, an [`InterruptControl`]
//!   backed by the `critical-section` crate
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod convert;
pub mod dht11;
pub mod error;
pub mod hal;

#[cfg(test)]
mod sim;

pub use config::{Config, DEFAULT_TIMEOUT_US};
pub use convert::celsius_to_fahrenheit;
pub use dht11::{BIT_THRESHOLD_US, Dht11, Reading};
pub use error::{DhtError, Status, error_message};
#[cfg(feature = "critical-section")]
pub use hal::CriticalSection;
pub use hal::{
    DataPin, Direction, InterruptControl, InterruptGuard, MicrosTimer, NoInterruptControl,
};
