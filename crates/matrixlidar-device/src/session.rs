use matrixlidar_frame::{Command, RequestWriter, Response, ResponsePoller};
use matrixlidar_transport::Bus;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{DeviceError, Result};
use crate::types::{
    Address, MatrixMode, ObstacleReport, ObstacleSide, ZoneDistances, MAX_AVOID_DISTANCE_CM,
    MAX_POINT_COORD, MIN_AVOID_DISTANCE_CM,
};

/// A session with one sensor on one bus.
///
/// Each operation is a single blocking exchange: write the request, wait the
/// settle delay, poll for the response. Nothing runs in the background and
/// there is no internal locking; callers serialize access to the session.
///
/// Operations come in two forms. `try_*` methods return the structured
/// outcome. The plain forms log the failure and fall back to `0` (or leave
/// the cached report untouched), so a zero reading and a failed read look
/// the same to the caller.
pub struct DeviceSession<B> {
    bus: B,
    address: Address,
    writer: RequestWriter,
    poller: ResponsePoller,
    report: ObstacleReport,
}

impl<B: Bus> DeviceSession<B> {
    /// Create a session with default configuration. No bus traffic.
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, SessionConfig::default())
    }

    /// Create a session with explicit configuration. No bus traffic.
    pub fn with_config(bus: B, config: SessionConfig) -> Self {
        Self {
            bus,
            address: config.address,
            writer: RequestWriter::with_config(config.frame.clone()),
            poller: ResponsePoller::with_config(config.frame),
            report: ObstacleReport::default(),
        }
    }

    /// Create a session and initialize the sensor with the configured
    /// address and matrix mode.
    pub fn open(bus: B, config: SessionConfig) -> Result<Self> {
        let (address, matrix) = (config.address, config.matrix);
        let mut session = Self::with_config(bus, config);
        session.initialize(address, matrix)?;
        Ok(session)
    }

    /// Target `address` for all subsequent exchanges and switch the sensor
    /// to `matrix` resolution.
    ///
    /// The address is retained even when the sensor rejects the mode.
    pub fn initialize(&mut self, address: Address, matrix: MatrixMode) -> Result<()> {
        self.address = address;
        self.exchange(Command::SetMode, &[matrix.code()])?;
        info!(%address, %matrix, "sensor initialized");
        Ok(())
    }

    /// Request a fresh obstacle-avoidance report and cache it.
    pub fn try_request_obstacle_data(&mut self) -> Result<ObstacleReport> {
        let response = self.exchange(Command::AvoidObstacle, &[])?;
        let (Some(direction), Some(hazard)) = (response.byte_at(0), response.byte_at(1)) else {
            return Err(short_payload(&response, 2));
        };

        self.report = ObstacleReport { direction, hazard };
        debug!(direction, hazard, "obstacle report updated");
        Ok(self.report)
    }

    /// Request a fresh obstacle-avoidance report; on failure the cached
    /// report is left as it was.
    pub fn request_obstacle_data(&mut self) {
        if let Err(err) = self.try_request_obstacle_data() {
            warn!(error = %err, "obstacle data request failed");
        }
    }

    /// Set the distance at which the sensor starts suggesting avoidance,
    /// in the sensor's native unit (millimetres).
    pub fn set_obstacle_threshold(&mut self, distance: u16) -> Result<()> {
        self.exchange(Command::ConfigAvoid, &distance.to_be_bytes())?;
        debug!(distance, "avoidance threshold set");
        Ok(())
    }

    /// Set the avoidance distance in centimetres (10..=50).
    pub fn set_obstacle_distance_cm(&mut self, cm: u16) -> Result<()> {
        if !(MIN_AVOID_DISTANCE_CM..=MAX_AVOID_DISTANCE_CM).contains(&cm) {
            return Err(DeviceError::DistanceOutOfRange {
                cm,
                min: MIN_AVOID_DISTANCE_CM,
                max: MAX_AVOID_DISTANCE_CM,
            });
        }
        self.set_obstacle_threshold(cm * 10)
    }

    /// Hazard flag from the last successful obstacle request (0 before any).
    pub fn hazard_flag(&self) -> u8 {
        self.report.hazard
    }

    /// Direction suggestion from the last successful obstacle request (0 before any).
    pub fn direction_suggestion(&self) -> u8 {
        self.report.direction
    }

    /// Last successful obstacle report.
    pub fn obstacle_report(&self) -> ObstacleReport {
        self.report
    }

    /// Read all three zone distances in one exchange.
    pub fn try_zone_distances(&mut self) -> Result<ZoneDistances> {
        let response = self.exchange(Command::ObstacleDistance, &[])?;
        let zone = |side: ObstacleSide| {
            response
                .u16_le_at(side.payload_offset())
                .ok_or_else(|| short_payload(&response, side.payload_offset() + 2))
        };

        Ok(ZoneDistances {
            left: zone(ObstacleSide::Left)?,
            front: zone(ObstacleSide::Front)?,
            right: zone(ObstacleSide::Right)?,
        })
    }

    /// Read the aggregated distance for one zone.
    pub fn try_zone_distance(&mut self, side: ObstacleSide) -> Result<u16> {
        let response = self.exchange(Command::ObstacleDistance, &[])?;
        let offset = side.payload_offset();
        response
            .u16_le_at(offset)
            .ok_or_else(|| short_payload(&response, offset + 2))
    }

    /// Read the aggregated distance for one zone, or 0 on failure.
    pub fn zone_distance(&mut self, side: ObstacleSide) -> u16 {
        self.try_zone_distance(side).unwrap_or_else(|err| {
            warn!(%side, error = %err, "zone distance read failed");
            0
        })
    }

    /// Read the distance at matrix cell `(x, y)`, each in 0..=7.
    pub fn try_point_distance(&mut self, x: u8, y: u8) -> Result<u16> {
        if x > MAX_POINT_COORD || y > MAX_POINT_COORD {
            return Err(DeviceError::PointOutOfRange {
                x,
                y,
                max: MAX_POINT_COORD,
            });
        }

        let response = self.exchange(Command::FixedPoint, &[x, y])?;
        response.u16_le_at(0).ok_or_else(|| short_payload(&response, 2))
    }

    /// Read the distance at matrix cell `(x, y)`, or 0 on failure.
    pub fn point_distance(&mut self, x: u8, y: u8) -> u16 {
        self.try_point_distance(x, y).unwrap_or_else(|err| {
            warn!(x, y, error = %err, "point distance read failed");
            0
        })
    }

    /// Address this session currently targets.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Borrow the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the underlying bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the session and return the bus.
    pub fn into_bus(self) -> B {
        self.bus
    }

    fn exchange(&mut self, command: Command, payload: &[u8]) -> Result<Response> {
        let address = self.address.as_u8();
        self.writer.send(&mut self.bus, address, command, payload)?;
        Ok(self.poller.poll(&mut self.bus, address, command)?)
    }
}

fn short_payload(response: &Response, expected: usize) -> DeviceError {
    DeviceError::ShortPayload {
        command: response.command,
        expected,
        actual: response.payload.len(),
    }
}

impl<B> std::fmt::Debug for DeviceSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("address", &self.address)
            .field("report", &self.report)
            .finish()
    }
}
