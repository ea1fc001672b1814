use bytes::BytesMut;
use matrixlidar_transport::Bus;
use tracing::{debug, trace, warn};

use std::time::Duration;

use crate::codec::{decode_payload, decode_response_header, FrameConfig, Response, MAX_PAYLOAD};
use crate::error::{FrameError, Result};
use crate::status::{Command, ErrorCode, Status, STATUS_PENDING};

/// Polls the bus for the response to one outstanding request.
///
/// One call is one attempt: the bus is read until a frame is assembled, the
/// frame is rejected, or the configured timeout elapses on the bus clock.
#[derive(Debug, Clone, Default)]
pub struct ResponsePoller {
    config: FrameConfig,
}

impl ResponsePoller {
    /// Create a poller with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a poller with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    /// Poll for the response to `expected` from the device at `address`.
    ///
    /// - `0xFF` status bytes mean "not ready" and are polled again.
    /// - A status other than success/failure ends polling with
    ///   [`FrameError::UnrecognizedStatus`].
    /// - A foreign command echo ends polling with
    ///   [`FrameError::CommandMismatch`] before any length or payload is read.
    /// - A declared length beyond [`capacity`](Self::capacity) is rejected
    ///   with [`FrameError::FrameTooLong`] without reading the payload.
    /// - A complete frame with failure status becomes [`FrameError::DeviceFailure`].
    pub fn poll<B: Bus + ?Sized>(
        &self,
        bus: &mut B,
        address: u8,
        expected: Command,
    ) -> Result<Response> {
        let start = bus.now_ms();
        let timeout_ms = self.config.timeout.as_millis() as u64;
        let capacity = self.capacity();

        while bus.now_ms().saturating_sub(start) < timeout_ms {
            let status_byte = bus.read_byte(address)?;
            if status_byte == STATUS_PENDING {
                let left = timeout_ms.saturating_sub(bus.now_ms().saturating_sub(start));
                let pause = self.config.poll_interval.min(Duration::from_millis(left));
                if !pause.is_zero() {
                    bus.sleep(pause);
                }
                continue;
            }

            let Some(status) = Status::from_byte(status_byte) else {
                warn!(status = status_byte, %expected, "unrecognized response status");
                return Err(FrameError::UnrecognizedStatus(status_byte));
            };

            let command = bus.read_byte(address)?;
            if command != expected.code() {
                warn!(%expected, actual = command, %status, "response echoed a different command");
                return Err(FrameError::CommandMismatch {
                    expected,
                    actual: command,
                    status,
                });
            }

            let mut length = [0u8; 2];
            bus.read_bytes(address, &mut length)?;
            let header = decode_response_header(status_byte, command, length);
            let length = header.length as usize;
            trace!(%expected, %status, length, "response header");

            if length > capacity {
                return Err(FrameError::FrameTooLong {
                    length,
                    max: capacity,
                });
            }

            let payload = if length == 0 {
                bytes::Bytes::new()
            } else {
                let mut buf = BytesMut::zeroed(length);
                bus.read_bytes(address, &mut buf)?;
                decode_payload(&buf, length)?
            };

            if status == Status::Failed {
                let code = payload
                    .first()
                    .and_then(|byte| ErrorCode::try_from(*byte).ok());
                return Err(FrameError::DeviceFailure {
                    command: expected,
                    code,
                });
            }

            debug!(%expected, length, "response received");
            return Ok(Response {
                status,
                command: expected,
                payload,
            });
        }

        debug!(%expected, timeout = ?self.config.timeout, "response timed out");
        Err(FrameError::Timeout(self.config.timeout))
    }

    /// Current poller configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Largest payload this poller accepts: `max_payload`, capped at the
    /// receive buffer size [`MAX_PAYLOAD`].
    pub fn capacity(&self) -> usize {
        self.config.max_payload.min(MAX_PAYLOAD)
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;
    use std::time::Duration;

    use matrixlidar_transport::{ScriptedBus, TransportError};

    use super::*;
    use crate::codec::encode_response;
    use crate::status::{STATUS_FAILED, STATUS_SUCCESS};

    fn response(status: u8, command: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_response(status, command, payload, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn assembles_matching_frame() {
        let mut bus = ScriptedBus::with_script(response(
            STATUS_SUCCESS,
            8,
            &[0x0A, 0x00, 0x14, 0x00, 0x1E, 0x00],
        ));

        let frame = ResponsePoller::new()
            .poll(&mut bus, 0x30, Command::ObstacleDistance)
            .unwrap();

        assert_eq!(frame.status, Status::Success);
        assert_eq!(frame.command, Command::ObstacleDistance);
        assert_eq!(frame.u16_le_at(2), Some(20));
        assert_eq!(bus.remaining(), 0);
    }

    #[test]
    fn skips_pending_bytes_before_status() {
        let mut script = vec![STATUS_PENDING; 5];
        script.extend(response(STATUS_SUCCESS, 6, &[2, 1]));
        let mut bus = ScriptedBus::with_script(script);

        let frame = ResponsePoller::new()
            .poll(&mut bus, 0x30, Command::AvoidObstacle)
            .unwrap();

        assert_eq!(frame.payload.as_ref(), &[2, 1]);
        assert_eq!(bus.byte_reads(), 7);
    }

    #[test]
    fn zero_length_success_has_empty_payload() {
        let mut bus = ScriptedBus::with_script(response(STATUS_SUCCESS, 1, &[]));

        let frame = ResponsePoller::new()
            .poll(&mut bus, 0x30, Command::SetMode)
            .unwrap();

        assert!(frame.payload.is_empty());
        assert_eq!(bus.block_reads(), 1);
    }

    #[test]
    fn times_out_when_device_stays_idle() {
        let mut bus = ScriptedBus::new();
        let poller = ResponsePoller::new();

        let err = poller
            .poll(&mut bus, 0x30, Command::AvoidObstacle)
            .unwrap_err();

        assert!(matches!(err, FrameError::Timeout(d) if d == Duration::from_millis(8000)));
        assert!(bus.now_ms() <= 8000);
        assert_eq!(bus.block_reads(), 0);
    }

    #[test]
    fn poll_interval_sleeps_without_extending_timeout() {
        let cfg = FrameConfig {
            timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(9),
            ..FrameConfig::default()
        };
        let mut bus = ScriptedBus::new();

        let err = ResponsePoller::with_config(cfg)
            .poll(&mut bus, 0x30, Command::AvoidObstacle)
            .unwrap_err();

        assert!(matches!(err, FrameError::Timeout(_)));
        // Each iteration costs 1 ms of read plus 9 ms of sleep.
        assert_eq!(bus.now_ms(), 100);
        assert_eq!(bus.sleeps().len(), 10);
    }

    #[test]
    fn poll_interval_is_clamped_to_the_deadline() {
        let cfg = FrameConfig {
            timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(30),
            ..FrameConfig::default()
        };
        let mut bus = ScriptedBus::new();

        let err = ResponsePoller::with_config(cfg)
            .poll(&mut bus, 0x30, Command::AvoidObstacle)
            .unwrap_err();

        assert!(matches!(err, FrameError::Timeout(_)));
        // Reads at 0, 31, 62 and 93 ms; the last pause is cut to 6 ms.
        assert_eq!(bus.now_ms(), 100);
        assert_eq!(bus.sleeps().last(), Some(&Duration::from_millis(6)));
    }

    #[test]
    fn mismatched_echo_short_circuits() {
        let mut bus = ScriptedBus::with_script(response(STATUS_SUCCESS, 7, &[1, 2]));

        let err = ResponsePoller::new()
            .poll(&mut bus, 0x30, Command::ObstacleDistance)
            .unwrap_err();

        match err {
            FrameError::CommandMismatch {
                expected,
                actual,
                status,
            } => {
                assert_eq!(expected, Command::ObstacleDistance);
                assert_eq!(actual, 7);
                assert_eq!(status, Status::Success);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Length and payload are left unread.
        assert_eq!(bus.block_reads(), 0);
        assert_eq!(bus.remaining(), 4);
    }

    #[test]
    fn unrecognized_status_terminates_polling() {
        let mut bus = ScriptedBus::with_script([0x00, 0x08, 0x00, 0x00]);

        let err = ResponsePoller::new()
            .poll(&mut bus, 0x30, Command::ObstacleDistance)
            .unwrap_err();

        assert!(matches!(err, FrameError::UnrecognizedStatus(0x00)));
        assert_eq!(bus.byte_reads(), 1);
    }

    #[test]
    fn oversized_length_rejected_not_truncated() {
        let mut script = vec![STATUS_SUCCESS, 2, 40, 0];
        script.extend([0xAB; 40]);
        let mut bus = ScriptedBus::with_script(script);

        let err = ResponsePoller::new()
            .poll(&mut bus, 0x30, Command::AllData)
            .unwrap_err();

        assert!(matches!(err, FrameError::FrameTooLong { length: 40, max: 32 }));
        assert_eq!(bus.remaining(), 40);
    }

    #[test]
    fn max_payload_above_buffer_size_is_capped() {
        let cfg = FrameConfig {
            max_payload: 64,
            ..FrameConfig::default()
        };
        let mut script = vec![STATUS_SUCCESS, 2, 40, 0];
        script.extend([0xAB; 40]);
        let mut bus = ScriptedBus::with_script(script);
        let poller = ResponsePoller::with_config(cfg);

        let err = poller.poll(&mut bus, 0x30, Command::AllData).unwrap_err();

        assert_eq!(poller.capacity(), MAX_PAYLOAD);
        assert!(matches!(err, FrameError::FrameTooLong { length: 40, max: 32 }));
        assert_eq!(bus.remaining(), 40);
    }

    #[test]
    fn smaller_max_payload_rejects_before_reading() {
        let cfg = FrameConfig {
            max_payload: 4,
            ..FrameConfig::default()
        };
        let mut bus = ScriptedBus::with_script(response(STATUS_SUCCESS, 8, &[0; 6]));

        let err = ResponsePoller::with_config(cfg)
            .poll(&mut bus, 0x30, Command::ObstacleDistance)
            .unwrap_err();

        assert!(matches!(err, FrameError::FrameTooLong { length: 6, max: 4 }));
        assert_eq!(bus.remaining(), 6);
        assert_eq!(bus.block_reads(), 1);
    }

    #[test]
    fn failure_status_reports_device_error_code() {
        let mut bus = ScriptedBus::with_script(response(STATUS_FAILED, 3, &[0x07]));

        let err = ResponsePoller::new()
            .poll(&mut bus, 0x30, Command::FixedPoint)
            .unwrap_err();

        assert!(matches!(
            err,
            FrameError::DeviceFailure {
                command: Command::FixedPoint,
                code: Some(ErrorCode::Args)
            }
        ));
    }

    #[test]
    fn failure_without_payload_has_no_code() {
        let mut bus = ScriptedBus::with_script(response(STATUS_FAILED, 7, &[]));

        let err = ResponsePoller::new()
            .poll(&mut bus, 0x30, Command::ConfigAvoid)
            .unwrap_err();

        assert!(matches!(
            err,
            FrameError::DeviceFailure { code: None, .. }
        ));
    }

    #[test]
    fn transport_failure_propagates() {
        let mut bus = ScriptedBus::new();
        bus.fail_reads(ErrorKind::TimedOut);

        let err = ResponsePoller::new()
            .poll(&mut bus, 0x30, Command::SetMode)
            .unwrap_err();

        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Io(e)) if e.kind() == ErrorKind::TimedOut
        ));
    }
}
