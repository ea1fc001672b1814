use std::time::Duration;

use matrixlidar_transport::TransportError;

use crate::status::{Command, ErrorCode, Status};

/// Errors that can occur while framing or polling an exchange.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No response frame arrived within the poll window.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The response echoed a different command than the one requested.
    #[error("response echoed command {actual:#04x}, expected {expected} ({status})")]
    CommandMismatch {
        expected: Command,
        actual: u8,
        status: Status,
    },

    /// The response declared more payload than the receive buffer holds.
    #[error("response declares {length} payload bytes (max {max})")]
    FrameTooLong { length: usize, max: usize },

    /// The device answered with the failure status.
    #[error("device reported failure for {command}{}", failure_detail(.code))]
    DeviceFailure {
        command: Command,
        code: Option<ErrorCode>,
    },

    /// The status byte was neither success, failure, nor the pending sentinel.
    #[error("unrecognized status byte {0:#04x}")]
    UnrecognizedStatus(u8),

    /// An outbound frame exceeds the largest single bus transfer.
    #[error("request too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A request frame did not start with the preamble.
    #[error("invalid request preamble {0:#04x} (expected 0x55)")]
    InvalidPreamble(u8),

    /// A request named a command code outside the command table.
    #[error("unknown command code {0:#04x}")]
    UnknownCommand(u8),

    /// Fewer payload bytes were supplied than the header declared.
    #[error("incomplete payload ({actual} of {expected} bytes)")]
    Incomplete { expected: usize, actual: usize },

    /// The underlying bus failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

fn failure_detail(code: &Option<ErrorCode>) -> String {
    match code {
        Some(code) => format!(": {code}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
