use std::fmt;
use std::io;

use matrixlidar_device::DeviceError;
use matrixlidar_frame::FrameError;
use matrixlidar_transport::TransportError;

// Exit codes follow sysexits-style conventions.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DEVICE_FAILURE: i32 = 4;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        FrameError::DeviceFailure { .. } => {
            CliError::new(DEVICE_FAILURE, format!("{context}: {err}"))
        }
        FrameError::CommandMismatch { .. }
        | FrameError::FrameTooLong { .. }
        | FrameError::UnrecognizedStatus(_)
        | FrameError::Incomplete { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::PayloadTooLarge { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Frame(err) => frame_error(context, err),
        DeviceError::PointOutOfRange { .. }
        | DeviceError::DistanceOutOfRange { .. }
        | DeviceError::InvalidAddress(_) => CliError::new(USAGE, format!("{context}: {err}")),
        DeviceError::ShortPayload { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use matrixlidar_frame::Command;

    use super::*;

    #[test]
    fn timeout_maps_to_124() {
        let err = device_error(
            "read failed",
            DeviceError::Frame(FrameError::Timeout(Duration::from_secs(8))),
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("read failed: "));
    }

    #[test]
    fn range_errors_are_usage() {
        let err = device_error("point", DeviceError::PointOutOfRange { x: 9, y: 0, max: 7 });
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn protocol_errors_are_data_invalid() {
        let err = frame_error(
            "zones",
            FrameError::CommandMismatch {
                expected: Command::ObstacleDistance,
                actual: 3,
                status: matrixlidar_frame::Status::Success,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn missing_bus_node_is_failure() {
        let err = transport_error(
            "open",
            TransportError::Open {
                path: "/dev/i2c-9".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        );
        assert_eq!(err.code, FAILURE);
    }
}
