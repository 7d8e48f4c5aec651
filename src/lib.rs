//! Driver for the Sensirion SGP30 indoor air quality sensor.
//!
//! The driver is generic over a [`Bus`], an [`embedded_hal::i2c::I2c`] with
//! open/close hooks, and an [`embedded_hal::delay::DelayNs`] used for the
//! chip's execution times. HAL buses that need no lifecycle management can
//! be wrapped in [`Passthrough`]. Failures are reported through [`Error`] and
//! logged through the [`log`] facade.
#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
#[cfg(test)]
mod debug_utils;
pub mod humidity;
mod sensirion;
pub mod sgp30;

pub use bus::{Bus, Passthrough};
pub use sensirion::{Capability, Cmd, Error, MAX_FRAME_LEN, MAX_RESPONSE_WORDS, crc};
pub use sgp30::{Baseline, FeatureSet, INFO, Info, Measurement, RawSignals, SGP30, State};
