use serde::Serialize;

use crate::cmd::{open_session, DeviceArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_reading, OutputFormat, Reading};

#[derive(Serialize)]
struct ObstacleOutput {
    direction: u8,
    hazard: u8,
}

pub fn run(device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = open_session(device)?;
    let report = session
        .try_request_obstacle_data()
        .map_err(|err| device_error("obstacle request failed", err))?;

    let body = ObstacleOutput {
        direction: report.direction,
        hazard: report.hazard,
    };
    print_reading(
        &Reading {
            kind: "obstacle",
            address: session.address().to_string(),
            body: &body,
            fields: vec![
                ("direction", body.direction.to_string()),
                ("hazard", body.hazard.to_string()),
            ],
        },
        format,
    );
    Ok(SUCCESS)
}
