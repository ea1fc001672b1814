use serde::Serialize;

use crate::cmd::{open_session, DeviceArgs, ThresholdArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_reading, OutputFormat, Reading};

#[derive(Serialize)]
struct ThresholdOutput {
    distance_cm: u16,
    distance_mm: u16,
}

pub fn run(args: ThresholdArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = open_session(device)?;
    session
        .set_obstacle_distance_cm(args.cm)
        .map_err(|err| device_error("threshold update failed", err))?;

    let body = ThresholdOutput {
        distance_cm: args.cm,
        distance_mm: args.cm * 10,
    };
    print_reading(
        &Reading {
            kind: "threshold",
            address: session.address().to_string(),
            body: &body,
            fields: vec![("distance_cm", args.cm.to_string())],
        },
        format,
    );
    Ok(SUCCESS)
}
