//! Typed values exchanged with the sensor.

use std::fmt;
use std::str::FromStr;

use crate::error::DeviceError;

/// Smallest configurable avoidance distance, in centimetres.
pub const MIN_AVOID_DISTANCE_CM: u16 = 10;

/// Largest configurable avoidance distance, in centimetres.
pub const MAX_AVOID_DISTANCE_CM: u16 = 50;

/// Largest grid coordinate accepted by a fixed-point query.
pub const MAX_POINT_COORD: u8 = 7;

/// Bus addresses the sensor can be strapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Address {
    #[default]
    Addr1 = 0x30,
    Addr2 = 0x31,
    Addr3 = 0x32,
    Addr4 = 0x33,
}

impl Address {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Address {
    type Error = DeviceError;

    fn try_from(value: u8) -> Result<Self, DeviceError> {
        match value {
            0x30 => Ok(Address::Addr1),
            0x31 => Ok(Address::Addr2),
            0x32 => Ok(Address::Addr3),
            0x33 => Ok(Address::Addr4),
            other => Err(DeviceError::InvalidAddress(other)),
        }
    }
}

impl FromStr for Address {
    type Err = String;

    /// Accepts `0x30`-style hex or plain decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u8::from_str_radix(hex, 16),
            None => s.parse::<u8>(),
        }
        .map_err(|_| format!("invalid address: {s}"))?;
        Address::try_from(value).map_err(|err| err.to_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.as_u8())
    }
}

/// Ranging resolution of the sensor matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MatrixMode {
    X4 = 1,
    #[default]
    X8 = 2,
}

impl MatrixMode {
    /// Wire code sent with SetMode.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Cells per row (and per column).
    pub fn width(self) -> u8 {
        match self {
            MatrixMode::X4 => 4,
            MatrixMode::X8 => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(MatrixMode::X4),
            2 => Some(MatrixMode::X8),
            _ => None,
        }
    }
}

impl fmt::Display for MatrixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.width();
        write!(f, "{w}x{w}")
    }
}

/// One of the three regions reported in obstacle-avoidance mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleSide {
    Left,
    Front,
    Right,
}

impl ObstacleSide {
    pub const ALL: [ObstacleSide; 3] = [
        ObstacleSide::Left,
        ObstacleSide::Front,
        ObstacleSide::Right,
    ];

    /// Offset of this zone's little-endian distance within the payload.
    pub fn payload_offset(self) -> usize {
        match self {
            ObstacleSide::Left => 0,
            ObstacleSide::Front => 2,
            ObstacleSide::Right => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ObstacleSide::Left => "left",
            ObstacleSide::Front => "front",
            ObstacleSide::Right => "right",
        }
    }
}

impl fmt::Display for ObstacleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Steering suggestion and hazard flag from one obstacle-avoidance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObstacleReport {
    pub direction: u8,
    pub hazard: u8,
}

impl ObstacleReport {
    /// True when the sensor flags an imminent collision.
    pub fn is_hazard(&self) -> bool {
        self.hazard != 0
    }
}

/// Aggregated distance per zone, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneDistances {
    pub left: u16,
    pub front: u16,
    pub right: u16,
}

impl ZoneDistances {
    pub fn get(&self, side: ObstacleSide) -> u16 {
        match side {
            ObstacleSide::Left => self.left,
            ObstacleSide::Front => self.front,
            ObstacleSide::Right => self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parses_hex_and_decimal() {
        assert_eq!("0x31".parse::<Address>().unwrap(), Address::Addr2);
        assert_eq!("51".parse::<Address>().unwrap(), Address::Addr4);
        assert!("0x40".parse::<Address>().is_err());
        assert!("nope".parse::<Address>().is_err());
    }

    #[test]
    fn address_try_from_rejects_unstrapped_values() {
        assert_eq!(Address::try_from(0x32).unwrap(), Address::Addr3);
        assert!(matches!(
            Address::try_from(0x29),
            Err(DeviceError::InvalidAddress(0x29))
        ));
        assert_eq!(Address::default().to_string(), "0x30");
    }

    #[test]
    fn matrix_mode_codes() {
        assert_eq!(MatrixMode::X4.code(), 1);
        assert_eq!(MatrixMode::X8.code(), 2);
        assert_eq!(MatrixMode::from_code(2), Some(MatrixMode::X8));
        assert_eq!(MatrixMode::from_code(3), None);
        assert_eq!(MatrixMode::X4.to_string(), "4x4");
    }

    #[test]
    fn zone_offsets_follow_payload_layout() {
        let offsets: Vec<usize> = ObstacleSide::ALL.iter().map(|s| s.payload_offset()).collect();
        assert_eq!(offsets, vec![0, 2, 4]);
    }

    #[test]
    fn zone_distances_lookup() {
        let zones = ZoneDistances {
            left: 10,
            front: 20,
            right: 30,
        };
        assert_eq!(zones.get(ObstacleSide::Front), 20);
        assert_eq!(zones.get(ObstacleSide::Right), 30);
    }
}
