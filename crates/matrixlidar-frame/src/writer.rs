use bytes::BytesMut;
use matrixlidar_transport::Bus;
use tracing::debug;

use crate::codec::{encode_request, FrameConfig, MAX_TRANSFER, REQUEST_HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::status::Command;

/// Sends request frames: encode, write in one transfer, then wait out the
/// settle delay so the device can prepare its response.
#[derive(Debug)]
pub struct RequestWriter {
    buf: BytesMut,
    config: FrameConfig,
}

impl Default for RequestWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestWriter {
    /// Create a request writer with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a request writer with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(MAX_TRANSFER),
            config,
        }
    }

    /// Encode and send `command` with `payload` to the device at `address`.
    pub fn send<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u8,
        command: Command,
        payload: &[u8],
    ) -> Result<()> {
        let size = REQUEST_HEADER_SIZE + payload.len();
        if size > MAX_TRANSFER {
            return Err(FrameError::PayloadTooLarge {
                size,
                max: MAX_TRANSFER,
            });
        }

        self.buf.clear();
        encode_request(command, payload, &mut self.buf)?;
        bus.write_bytes(address, &self.buf)?;
        debug!(%command, address, size, "request sent");

        if !self.config.settle_delay.is_zero() {
            bus.sleep(self.config.settle_delay);
        }
        Ok(())
    }

    /// Current writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use matrixlidar_transport::ScriptedBus;

    use super::*;

    #[test]
    fn writes_frame_to_target_address() {
        let mut bus = ScriptedBus::new();
        let mut writer = RequestWriter::new();

        writer
            .send(&mut bus, 0x31, Command::FixedPoint, &[3, 3])
            .unwrap();

        assert_eq!(
            bus.writes(),
            &[(0x31, vec![0x55, 0x00, 0x03, 0x03, 0x03, 0x03])]
        );
    }

    #[test]
    fn sleeps_settle_delay_after_write() {
        let mut bus = ScriptedBus::new();
        let mut writer = RequestWriter::new();

        writer
            .send(&mut bus, 0x30, Command::AvoidObstacle, &[])
            .unwrap();

        assert_eq!(bus.sleeps(), &[Duration::from_millis(10)]);
    }

    #[test]
    fn zero_settle_delay_skips_sleep() {
        let cfg = FrameConfig {
            settle_delay: Duration::ZERO,
            ..FrameConfig::default()
        };
        let mut bus = ScriptedBus::new();
        let mut writer = RequestWriter::with_config(cfg);

        writer.send(&mut bus, 0x30, Command::SetMode, &[1]).unwrap();

        assert!(bus.sleeps().is_empty());
        assert_eq!(bus.writes().len(), 1);
    }

    #[test]
    fn rejects_frame_larger_than_one_transfer() {
        let mut bus = ScriptedBus::new();
        let mut writer = RequestWriter::new();

        writer
            .send(&mut bus, 0x30, Command::List, &[0u8; 28])
            .unwrap();
        let err = writer
            .send(&mut bus, 0x30, Command::List, &[0u8; 29])
            .unwrap_err();

        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size: 33, max: 32 }
        ));
        assert_eq!(bus.writes().len(), 1);
    }

    #[test]
    fn reuses_buffer_between_requests() {
        let mut bus = ScriptedBus::new();
        let mut writer = RequestWriter::new();

        writer
            .send(&mut bus, 0x30, Command::ConfigAvoid, &[0x01, 0xF4])
            .unwrap();
        writer
            .send(&mut bus, 0x30, Command::ObstacleDistance, &[])
            .unwrap();

        assert_eq!(bus.writes()[1].1, vec![0x55, 0x00, 0x01, 0x08]);
    }
}
