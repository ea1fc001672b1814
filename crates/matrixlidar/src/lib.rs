//! Driver for the matrix LiDAR distance sensor.
//!
//! The sensor speaks a small length-prefixed command/response protocol over
//! a shared two-wire bus. This crate bundles the layers:
//!
//! # Crate Structure
//!
//! - [`transport`] — Bus abstraction (Linux i2c-dev, scripted test bus)
//! - [`frame`] — Request/response framing and response polling
//! - [`device`] — Device session, typed accessors, simulated sensor

/// Re-export transport types.
pub mod transport {
    pub use matrixlidar_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use matrixlidar_frame::*;
}

/// Re-export device types.
pub mod device {
    pub use matrixlidar_device::*;
}

pub use matrixlidar_device::{DeviceSession, SessionConfig};
