//! A bus with a simulated sensor attached.
//!
//! [`SimulatedSensor`] decodes every request written to its address and
//! queues the response the hardware would give. Time is virtual, as with
//! [`ScriptedBus`](matrixlidar_transport::ScriptedBus), so a silent sensor
//! times out instantly in wall-clock terms.

use std::collections::VecDeque;
use std::time::Duration;

use bytes::BytesMut;
use matrixlidar_frame::{
    decode_request, encode_response, Command, ErrorCode, FrameError, Status, STATUS_PENDING,
};
use matrixlidar_transport::{Bus, Result};
use tracing::trace;

use crate::types::{Address, MatrixMode, ObstacleReport, ZoneDistances};

/// How the simulated sensor answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimBehavior {
    /// Answer every request as the hardware would.
    #[default]
    Normal,
    /// Never answer; every read returns the pending byte.
    Silent,
    /// Answer with a command echo that does not match the request.
    ForeignEcho,
}

/// A sensor model that speaks the wire protocol.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    address: Address,
    behavior: SimBehavior,
    matrix: MatrixMode,
    report: ObstacleReport,
    zones: ZoneDistances,
    grid: [[u16; 8]; 8],
    threshold: Option<u16>,
    outbox: VecDeque<u8>,
    requests: Vec<Command>,
    now_ms: u64,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new(Address::default())
    }
}

impl SimulatedSensor {
    /// A sensor strapped to `address` with a flat 1000 mm scene.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            behavior: SimBehavior::Normal,
            matrix: MatrixMode::X8,
            report: ObstacleReport::default(),
            zones: ZoneDistances {
                left: 1000,
                front: 1000,
                right: 1000,
            },
            grid: [[1000; 8]; 8],
            threshold: None,
            outbox: VecDeque::new(),
            requests: Vec::new(),
            now_ms: 0,
        }
    }

    pub fn with_behavior(mut self, behavior: SimBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_report(mut self, report: ObstacleReport) -> Self {
        self.report = report;
        self
    }

    pub fn with_zones(mut self, zones: ZoneDistances) -> Self {
        self.zones = zones;
        self
    }

    /// Set the distance reported for cell `(x, y)`.
    ///
    /// Cells outside the 8x8 grid do not exist on the sensor and are ignored.
    pub fn with_point(mut self, x: u8, y: u8, distance: u16) -> Self {
        if let Some(cell) = self
            .grid
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *cell = distance;
        }
        self
    }

    /// Matrix mode last set by the host.
    pub fn matrix(&self) -> MatrixMode {
        self.matrix
    }

    /// Avoidance threshold last configured by the host, in millimetres.
    pub fn threshold(&self) -> Option<u16> {
        self.threshold
    }

    /// Commands received so far, in order.
    pub fn requests(&self) -> &[Command] {
        &self.requests
    }

    fn respond(&mut self, request: &[u8]) {
        let (status, echo, payload) = match decode_request(request) {
            Ok((command, payload)) => {
                self.requests.push(command);
                let (status, payload) = self.handle(command, &payload);
                (status, command.code(), payload)
            }
            Err(FrameError::UnknownCommand(code)) => {
                (Status::Failed, code, vec![ErrorCode::CmdInvalid as u8])
            }
            Err(_) => (
                Status::Failed,
                request.get(3).copied().unwrap_or(0),
                vec![ErrorCode::CmdPkt as u8],
            ),
        };

        let echo = match self.behavior {
            SimBehavior::ForeignEcho => echo.wrapping_add(1),
            _ => echo,
        };

        let mut buf = BytesMut::new();
        if encode_response(status.as_byte(), echo, &payload, &mut buf).is_ok() {
            self.outbox.extend(buf.iter().copied());
        }
    }

    fn handle(&mut self, command: Command, payload: &[u8]) -> (Status, Vec<u8>) {
        let fail = |code: ErrorCode| (Status::Failed, vec![code as u8]);
        match command {
            Command::SetMode => match payload.first().copied().and_then(MatrixMode::from_code) {
                Some(matrix) => {
                    self.matrix = matrix;
                    (Status::Success, Vec::new())
                }
                None => fail(ErrorCode::Args),
            },
            Command::AvoidObstacle => (
                Status::Success,
                vec![self.report.direction, self.report.hazard],
            ),
            Command::ConfigAvoid => match payload {
                [hi, lo] => {
                    self.threshold = Some(u16::from_be_bytes([*hi, *lo]));
                    (Status::Success, Vec::new())
                }
                _ => fail(ErrorCode::Args),
            },
            Command::ObstacleDistance => {
                let mut out = Vec::with_capacity(6);
                out.extend(self.zones.left.to_le_bytes());
                out.extend(self.zones.front.to_le_bytes());
                out.extend(self.zones.right.to_le_bytes());
                (Status::Success, out)
            }
            Command::FixedPoint => match payload {
                [x, y] if *x < self.matrix.width() && *y < self.matrix.width() => (
                    Status::Success,
                    self.grid[*y as usize][*x as usize].to_le_bytes().to_vec(),
                ),
                _ => fail(ErrorCode::Args),
            },
            Command::AllData | Command::Line | Command::List => fail(ErrorCode::CmdInvalid),
        }
    }
}

impl Bus for SimulatedSensor {
    fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        if address != self.address.as_u8() || self.behavior == SimBehavior::Silent {
            trace!(address, "simulated sensor ignoring write");
            return Ok(());
        }
        self.respond(bytes);
        Ok(())
    }

    fn read_byte(&mut self, address: u8) -> Result<u8> {
        self.now_ms += 1;
        if address != self.address.as_u8() {
            return Ok(STATUS_PENDING);
        }
        Ok(self.outbox.pop_front().unwrap_or(STATUS_PENDING))
    }

    fn read_bytes(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        self.now_ms += 1;
        for slot in buf.iter_mut() {
            *slot = if address == self.address.as_u8() {
                self.outbox.pop_front().unwrap_or(STATUS_PENDING)
            } else {
                STATUS_PENDING
            };
        }
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn sleep(&mut self, duration: Duration) {
        self.now_ms += duration.as_millis() as u64;
    }
}
