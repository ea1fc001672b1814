use matrixlidar_frame::{Command, FrameError};

/// Errors that can occur in device session operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Framing, polling, or bus error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Requested matrix coordinate is outside the sensor grid.
    #[error("point ({x}, {y}) outside 0..={max}")]
    PointOutOfRange { x: u8, y: u8, max: u8 },

    /// Requested avoidance distance is outside the supported range.
    #[error("avoidance distance {cm} cm outside {min}..={max} cm")]
    DistanceOutOfRange { cm: u16, min: u16, max: u16 },

    /// The response payload is too short for the fields being read.
    #[error("{command} response carries {actual} payload bytes, need {expected}")]
    ShortPayload {
        command: Command,
        expected: usize,
        actual: usize,
    },

    /// Address outside the set the sensor can be strapped to.
    #[error("unsupported device address {0:#04x} (expected 0x30..=0x33)")]
    InvalidAddress(u8),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
