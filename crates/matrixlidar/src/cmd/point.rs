use serde::Serialize;

use crate::cmd::{open_session, DeviceArgs, PointArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_reading, OutputFormat, Reading};

#[derive(Serialize)]
struct PointOutput {
    x: u8,
    y: u8,
    distance_mm: u16,
}

pub fn run(args: PointArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = open_session(device)?;
    let distance = session
        .try_point_distance(args.x, args.y)
        .map_err(|err| device_error("point read failed", err))?;

    let body = PointOutput {
        x: args.x,
        y: args.y,
        distance_mm: distance,
    };
    print_reading(
        &Reading {
            kind: "point",
            address: session.address().to_string(),
            body: &body,
            fields: vec![("distance_mm", distance.to_string())],
        },
        format,
    );
    Ok(SUCCESS)
}
