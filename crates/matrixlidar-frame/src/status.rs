//! Command codes, status bytes, and device error codes.

use std::fmt;

/// Status byte of a successful response.
pub const STATUS_SUCCESS: u8 = 0x53;

/// Status byte of a failed response.
pub const STATUS_FAILED: u8 = 0x63;

/// Byte read while the device has no response ready yet.
pub const STATUS_PENDING: u8 = 0xFF;

/// Operation codes understood by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    SetMode = 1,
    AllData = 2,
    FixedPoint = 3,
    Line = 4,
    List = 5,
    AvoidObstacle = 6,
    ConfigAvoid = 7,
    ObstacleDistance = 8,
}

impl Command {
    /// All commands in code order.
    pub const ALL: [Command; 8] = [
        Command::SetMode,
        Command::AllData,
        Command::FixedPoint,
        Command::Line,
        Command::List,
        Command::AvoidObstacle,
        Command::ConfigAvoid,
        Command::ObstacleDistance,
    ];

    /// Wire code of this command.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Command::SetMode => "SET_MODE",
            Command::AllData => "ALL_DATA",
            Command::FixedPoint => "FIXED_POINT",
            Command::Line => "LINE",
            Command::List => "LIST",
            Command::AvoidObstacle => "AVOID_OBSTACLE",
            Command::ConfigAvoid => "CONFIG_AVOID",
            Command::ObstacleDistance => "OBSTACLE_DISTANCE",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        Command::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.code() == code)
            .ok_or(code)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recognized response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failed,
}

impl Status {
    /// Classify a status byte. The pending sentinel and anything else
    /// unrecognized return `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            STATUS_SUCCESS => Some(Status::Success),
            STATUS_FAILED => Some(Status::Failed),
            _ => None,
        }
    }

    /// Wire byte for this status, as written by a responding device.
    pub fn as_byte(self) -> u8 {
        match self {
            Status::Success => STATUS_SUCCESS,
            Status::Failed => STATUS_FAILED,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => f.write_str("success"),
            Status::Failed => f.write_str("failed"),
        }
    }
}

/// Error codes the sensor firmware reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    None = 0x00,
    CmdInvalid = 0x01,
    ResPkt = 0x02,
    MasterNoSpace = 0x03,
    ResTimeout = 0x04,
    CmdPkt = 0x05,
    SlaveBreak = 0x06,
    Args = 0x07,
    Sku = 0x08,
    SlaveNoSpace = 0x09,
    I2cAddress = 0x0A,
}

impl ErrorCode {
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::None => "no error",
            ErrorCode::CmdInvalid => "invalid command",
            ErrorCode::ResPkt => "malformed response packet",
            ErrorCode::MasterNoSpace => "host buffer too small",
            ErrorCode::ResTimeout => "response timeout",
            ErrorCode::CmdPkt => "malformed command packet",
            ErrorCode::SlaveBreak => "device interrupted",
            ErrorCode::Args => "invalid arguments",
            ErrorCode::Sku => "unsupported by this sku",
            ErrorCode::SlaveNoSpace => "device buffer too small",
            ErrorCode::I2cAddress => "invalid i2c address",
        }
    }
}

impl TryFrom<u8> for ErrorCode {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        Ok(match code {
            0x00 => ErrorCode::None,
            0x01 => ErrorCode::CmdInvalid,
            0x02 => ErrorCode::ResPkt,
            0x03 => ErrorCode::MasterNoSpace,
            0x04 => ErrorCode::ResTimeout,
            0x05 => ErrorCode::CmdPkt,
            0x06 => ErrorCode::SlaveBreak,
            0x07 => ErrorCode::Args,
            0x08 => ErrorCode::Sku,
            0x09 => ErrorCode::SlaveNoSpace,
            0x0A => ErrorCode::I2cAddress,
            other => return Err(other),
        })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#04x})", self.description(), *self as u8)
    }
}
