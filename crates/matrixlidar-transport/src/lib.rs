//! Byte-level bus abstraction for the matrix LiDAR driver.
//!
//! The protocol engine never touches hardware directly. It talks to a
//! [`Bus`], which provides:
//! - addressed single-byte and multi-byte reads
//! - addressed writes
//! - a monotonic millisecond clock and a blocking sleep
//!
//! This is the lowest layer of matrixlidar. Two implementations ship here:
//! [`I2cDev`] for Linux `/dev/i2c-N` character devices and [`ScriptedBus`]
//! for deterministic tests.

pub mod error;
pub mod scripted;
pub mod traits;

#[cfg(target_os = "linux")]
pub mod i2cdev;

pub use error::{Result, TransportError};
pub use scripted::ScriptedBus;
pub use traits::Bus;

#[cfg(target_os = "linux")]
pub use i2cdev::I2cDev;
