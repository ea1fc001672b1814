use matrixlidar_frame::FrameConfig;

use crate::types::{Address, MatrixMode};

/// Configuration for a device session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Target address on the bus. Default: 0x30.
    pub address: Address,
    /// Matrix resolution selected by [`DeviceSession::open`](crate::DeviceSession::open).
    /// Default: 8x8.
    pub matrix: MatrixMode,
    /// Exchange timing and capacity.
    pub frame: FrameConfig,
}
