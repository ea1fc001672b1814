//! Device session for the matrix LiDAR distance sensor.
//!
//! This is the layer applications use. A [`DeviceSession`] owns a bus,
//! targets one configured address, runs one request/response exchange per
//! call, and caches the latest obstacle-avoidance report.

pub mod config;
pub mod error;
pub mod session;
pub mod sim;
pub mod types;

pub use config::SessionConfig;
pub use error::{DeviceError, Result};
pub use session::DeviceSession;
pub use sim::{SimBehavior, SimulatedSensor};
pub use types::{
    Address, MatrixMode, ObstacleReport, ObstacleSide, ZoneDistances, MAX_AVOID_DISTANCE_CM,
    MAX_POINT_COORD, MIN_AVOID_DISTANCE_CM,
};
