use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::status::{Command, Status};

/// First byte of every outbound request.
pub const PREAMBLE: u8 = 0x55;

/// Request header: preamble (1) + length (2 BE) + command (1).
pub const REQUEST_HEADER_SIZE: usize = 4;

/// Response header: status (1) + command echo (1) + length (2 LE).
pub const RESPONSE_HEADER_SIZE: usize = 4;

/// Receive buffer capacity for response payloads.
pub const MAX_PAYLOAD: usize = 32;

/// Largest single bus transfer the device accepts, header included.
pub const MAX_TRANSFER: usize = 32;

/// Default poll window for one response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Default pause between writing a request and polling for its response.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Decoded response header, still carrying raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub status: u8,
    pub command: u8,
    pub length: u16,
}

/// A complete, validated response to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub command: Command,
    pub payload: Bytes,
}

impl Response {
    /// Payload byte at `offset`, if present.
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.payload.get(offset).copied()
    }

    /// Little-endian `u16` starting at payload `offset`, if both bytes are present.
    pub fn u16_le_at(&self, offset: usize) -> Option<u16> {
        let bytes = self.payload.get(offset..offset + 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

/// Encode a request into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬─────────────────┬─────────┬─────────────────┐
/// │ Preamble │ Length (2B BE)  │ Command │ Payload          │
/// │ 0x55     │ payload len + 1 │ (1B)    │                  │
/// └──────────┴─────────────────┴─────────┴─────────────────┘
/// ```
///
/// Only the `u16` length field is bounds-checked here; keeping a frame within
/// one bus transfer is the writer's job.
pub fn encode_request(command: Command, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let length = wire_length(payload.len() + 1)?;
    dst.reserve(REQUEST_HEADER_SIZE + payload.len());
    dst.put_u8(PREAMBLE);
    dst.put_u16(length);
    dst.put_u8(command.code());
    dst.put_slice(payload);
    Ok(())
}

/// Decode a request frame, returning its command and payload.
///
/// The inverse of [`encode_request`]; the device side of the exchange.
pub fn decode_request(src: &[u8]) -> Result<(Command, Bytes)> {
    if src.len() < REQUEST_HEADER_SIZE {
        return Err(FrameError::Incomplete {
            expected: REQUEST_HEADER_SIZE,
            actual: src.len(),
        });
    }
    if src[0] != PREAMBLE {
        return Err(FrameError::InvalidPreamble(src[0]));
    }

    let declared = u16::from_be_bytes([src[1], src[2]]) as usize;
    let command = Command::try_from(src[3]).map_err(FrameError::UnknownCommand)?;
    let payload_len = declared.saturating_sub(1);
    let body = &src[REQUEST_HEADER_SIZE..];
    if declared == 0 || body.len() < payload_len {
        return Err(FrameError::Incomplete {
            expected: REQUEST_HEADER_SIZE + payload_len,
            actual: src.len(),
        });
    }

    Ok((command, Bytes::copy_from_slice(&body[..payload_len])))
}

/// Encode a response the way the device puts it on the wire.
///
/// ```text
/// ┌────────┬──────────────┬────────────────┬──────────┐
/// │ Status │ Command echo │ Length (2B LE) │ Payload  │
/// └────────┴──────────────┴────────────────┴──────────┘
/// ```
///
/// The host never sends this; it exists for scripted and simulated buses.
pub fn encode_response(status: u8, command: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let length = wire_length(payload.len())?;
    dst.reserve(RESPONSE_HEADER_SIZE + payload.len());
    dst.put_u8(status);
    dst.put_u8(command);
    dst.put_u16_le(length);
    dst.put_slice(payload);
    Ok(())
}

/// Combine the raw response header bytes.
///
/// The length arrives low byte first, the reverse of the request length.
pub fn decode_response_header(status: u8, command: u8, length: [u8; 2]) -> ResponseHeader {
    ResponseHeader {
        status,
        command,
        length: u16::from_le_bytes(length),
    }
}

/// Take exactly `length` payload bytes from `buf`.
pub fn decode_payload(buf: &[u8], length: usize) -> Result<Bytes> {
    if length > MAX_PAYLOAD {
        return Err(FrameError::FrameTooLong {
            length,
            max: MAX_PAYLOAD,
        });
    }
    if buf.len() < length {
        return Err(FrameError::Incomplete {
            expected: length,
            actual: buf.len(),
        });
    }
    Ok(Bytes::copy_from_slice(&buf[..length]))
}

fn wire_length(len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| FrameError::PayloadTooLarge {
        size: len,
        max: u16::MAX as usize,
    })
}

/// Timing and capacity settings for one request/response exchange.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Poll window for a response. Default: 8 s.
    pub timeout: Duration,
    /// Pause after writing a request before polling starts. Default: 10 ms.
    pub settle_delay: Duration,
    /// Pause between pending polls. Default: zero (tight loop).
    pub poll_interval: Duration,
    /// Largest response payload accepted. Default and upper bound:
    /// [`MAX_PAYLOAD`].
    pub max_payload: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            poll_interval: Duration::ZERO,
            max_payload: MAX_PAYLOAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::STATUS_SUCCESS;

    #[test]
    fn test_encode_empty_request() {
        let mut buf = BytesMut::new();
        encode_request(Command::AvoidObstacle, &[], &mut buf).unwrap();

        assert_eq!(buf.as_ref(), &[0x55, 0x00, 0x01, 0x06]);
    }

    #[test]
    fn test_encode_request_with_payload() {
        let mut buf = BytesMut::new();
        encode_request(Command::ConfigAvoid, &[0x00, 0xC8], &mut buf).unwrap();

        assert_eq!(buf.as_ref(), &[0x55, 0x00, 0x03, 0x07, 0x00, 0xC8]);
        assert_eq!(buf.len(), REQUEST_HEADER_SIZE + 2);
    }

    #[test]
    fn test_length_byte_order_asymmetry() {
        // Outbound: length 0x0102 is written high byte first.
        let payload = vec![0xAA; 0x0101];
        let mut out = BytesMut::new();
        encode_request(Command::List, &payload, &mut out).unwrap();
        assert_eq!(&out[1..3], &[0x01, 0x02]);

        // Inbound: the same value arrives low byte first.
        let header = decode_response_header(STATUS_SUCCESS, 5, [0x02, 0x01]);
        assert_eq!(header.length, 0x0102);

        let mut resp = BytesMut::new();
        encode_response(STATUS_SUCCESS, 5, &vec![0; 0x0102], &mut resp).unwrap();
        assert_eq!(&resp[2..4], &[0x02, 0x01]);
    }

    #[test]
    fn test_request_shaped_bytes_decode_as_response() {
        for command in Command::ALL {
            for len in [0usize, 1, 2, 6, 28] {
                let payload: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(7)).collect();
                let mut out = BytesMut::new();
                encode_request(command, &payload, &mut out).unwrap();

                // Re-shape into response order: status, command, LE length, payload.
                let declared = u16::from_be_bytes([out[1], out[2]]) - 1;
                let echoed = out[3];
                let body = &out[REQUEST_HEADER_SIZE..];
                let le = declared.to_le_bytes();

                let header = decode_response_header(STATUS_SUCCESS, echoed, le);
                let decoded = decode_payload(body, header.length as usize).unwrap();

                assert_eq!(Command::try_from(header.command), Ok(command));
                assert_eq!(decoded.as_ref(), payload.as_slice());
            }
        }
    }

    #[test]
    fn test_decode_request_recovers_command_and_payload() {
        let mut buf = BytesMut::new();
        encode_request(Command::FixedPoint, &[3, 5], &mut buf).unwrap();

        let (command, payload) = decode_request(&buf).unwrap();
        assert_eq!(command, Command::FixedPoint);
        assert_eq!(payload.as_ref(), &[3, 5]);
    }

    #[test]
    fn test_decode_request_rejects_bad_preamble() {
        let err = decode_request(&[0xAA, 0x00, 0x01, 0x06]).unwrap_err();
        assert!(matches!(err, FrameError::InvalidPreamble(0xAA)));
    }

    #[test]
    fn test_decode_request_rejects_unknown_command() {
        let err = decode_request(&[0x55, 0x00, 0x01, 0x09]).unwrap_err();
        assert!(matches!(err, FrameError::UnknownCommand(0x09)));
    }

    #[test]
    fn test_decode_request_truncated_payload() {
        let err = decode_request(&[0x55, 0x00, 0x03, 0x07, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Incomplete {
                expected: 6,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_decode_payload_rejects_oversized_length() {
        let buf = [0u8; 64];
        let err = decode_payload(&buf, 40).unwrap_err();
        assert!(matches!(
            err,
            FrameError::FrameTooLong {
                length: 40,
                max: MAX_PAYLOAD
            }
        ));
    }

    #[test]
    fn test_decode_payload_exact_capacity() {
        let buf: Vec<u8> = (0..MAX_PAYLOAD as u8).collect();
        let payload = decode_payload(&buf, MAX_PAYLOAD).unwrap();
        assert_eq!(payload.len(), MAX_PAYLOAD);
    }

    #[test]
    fn test_decode_payload_incomplete() {
        let err = decode_payload(&[1, 2], 4).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Incomplete {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_decode_payload_takes_only_declared_bytes() {
        let payload = decode_payload(&[9, 8, 7, 6], 2).unwrap();
        assert_eq!(payload.as_ref(), &[9, 8]);
    }

    #[test]
    fn test_response_field_accessors() {
        let response = Response {
            status: Status::Success,
            command: Command::ObstacleDistance,
            payload: Bytes::from_static(&[0x0A, 0x00, 0x14, 0x00, 0x1E]),
        };

        assert_eq!(response.u16_le_at(2), Some(20));
        assert_eq!(response.u16_le_at(4), None);
        assert_eq!(response.byte_at(4), Some(0x1E));
        assert_eq!(response.byte_at(5), None);
    }

    #[test]
    fn test_default_config() {
        let cfg = FrameConfig::default();
        assert_eq!(cfg.timeout, Duration::from_millis(8000));
        assert_eq!(cfg.settle_delay, Duration::from_millis(10));
        assert_eq!(cfg.poll_interval, Duration::ZERO);
        assert_eq!(cfg.max_payload, 32);
    }
}
