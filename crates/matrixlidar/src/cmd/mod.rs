use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use matrixlidar_device::{
    Address, DeviceSession, MatrixMode, ObstacleReport, SessionConfig, SimulatedSensor,
    ZoneDistances,
};
use matrixlidar_frame::FrameConfig;
use matrixlidar_transport::Bus;
use tracing::debug;

use crate::exit::{device_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod init;
pub mod obstacle;
pub mod point;
pub mod threshold;
pub mod version;
pub mod zones;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the sensor (select matrix mode).
    Init,
    /// Request obstacle-avoidance data (direction suggestion, hazard flag).
    Obstacle,
    /// Read aggregated left/front/right distances.
    Zones(ZonesArgs),
    /// Read the distance at one matrix cell.
    Point(PointArgs),
    /// Set the obstacle-avoidance distance.
    Threshold(ThresholdArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Init => init::run(device, format),
        Command::Obstacle => obstacle::run(device, format),
        Command::Zones(args) => zones::run(args, device, format),
        Command::Point(args) => point::run(args, device, format),
        Command::Threshold(args) => threshold::run(args, device, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum MatrixArg {
    X4,
    X8,
}

impl From<MatrixArg> for MatrixMode {
    fn from(arg: MatrixArg) -> Self {
        match arg {
            MatrixArg::X4 => MatrixMode::X4,
            MatrixArg::X8 => MatrixMode::X8,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SideArg {
    Left,
    Front,
    Right,
}

/// Bus and sensor selection shared by every device command.
#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// I2C bus device node.
    #[arg(
        long,
        env = "MATRIXLIDAR_BUS",
        default_value = "/dev/i2c-1",
        global = true
    )]
    pub bus: PathBuf,
    /// Sensor address (0x30..0x33).
    #[arg(long, env = "MATRIXLIDAR_ADDRESS", default_value = "0x30", global = true)]
    pub address: Address,
    /// Matrix resolution to select on initialization.
    #[arg(long, value_enum, default_value = "x8", global = true)]
    pub matrix: MatrixArg,
    /// Response timeout (e.g. 8s, 500ms).
    #[arg(long, default_value = "8s", global = true)]
    pub timeout: String,
    /// Talk to a built-in simulated sensor instead of hardware.
    #[arg(long, global = true)]
    pub simulate: bool,
}

#[derive(Args, Debug)]
pub struct ZonesArgs {
    /// Report a single zone.
    #[arg(long, value_enum)]
    pub side: Option<SideArg>,
}

#[derive(Args, Debug)]
pub struct PointArgs {
    /// Column (0-7).
    #[arg(long, default_value = "3")]
    pub x: u8,
    /// Row (0-7).
    #[arg(long, default_value = "3")]
    pub y: u8,
}

#[derive(Args, Debug)]
pub struct ThresholdArgs {
    /// Avoidance distance in centimetres (10-50).
    #[arg(long)]
    pub cm: u16,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open the bus, create a session, and initialize the sensor.
pub fn open_session(device: &DeviceArgs) -> CliResult<DeviceSession<Box<dyn Bus>>> {
    let config = SessionConfig {
        address: device.address,
        matrix: device.matrix.into(),
        frame: FrameConfig {
            timeout: parse_duration(&device.timeout)?,
            ..FrameConfig::default()
        },
    };
    let bus = open_bus(device)?;
    DeviceSession::open(bus, config).map_err(|err| device_error("initialize failed", err))
}

fn open_bus(device: &DeviceArgs) -> CliResult<Box<dyn Bus>> {
    if device.simulate {
        debug!(address = %device.address, "using simulated sensor");
        return Ok(Box::new(simulated_sensor(device.address)));
    }

    #[cfg(target_os = "linux")]
    {
        let bus = matrixlidar_transport::I2cDev::open(&device.bus).map_err(|err| {
            crate::exit::transport_error(&format!("failed opening {}", device.bus.display()), err)
        })?;
        Ok(Box::new(bus))
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err(crate::exit::transport_error(
            &format!("failed opening {}", device.bus.display()),
            matrixlidar_transport::TransportError::Unsupported("i2c-dev requires Linux"),
        ))
    }
}

/// Fixed scene served by `--simulate`: a corridor narrowing on the right.
fn simulated_sensor(address: Address) -> SimulatedSensor {
    let mut sensor = SimulatedSensor::new(address)
        .with_report(ObstacleReport {
            direction: 1,
            hazard: 0,
        })
        .with_zones(ZoneDistances {
            left: 820,
            front: 1250,
            right: 310,
        });
    for y in 0..8u8 {
        for x in 0..8u8 {
            sensor = sensor.with_point(x, y, 300 + 100 * u16::from(x) + 10 * u16::from(y));
        }
    }
    sensor
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
