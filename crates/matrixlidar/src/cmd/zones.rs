use matrixlidar_device::ObstacleSide;
use serde::Serialize;

use crate::cmd::{open_session, DeviceArgs, SideArg, ZonesArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_reading, OutputFormat, Reading};

#[derive(Serialize)]
struct ZonesOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    left_mm: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    front_mm: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right_mm: Option<u16>,
}

pub fn run(args: ZonesArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = open_session(device)?;

    let body = match args.side.map(side) {
        Some(side) => {
            let distance = session
                .try_zone_distance(side)
                .map_err(|err| device_error("zone read failed", err))?;
            let mut body = ZonesOutput {
                left_mm: None,
                front_mm: None,
                right_mm: None,
            };
            *slot(&mut body, side) = Some(distance);
            body
        }
        None => {
            let zones = session
                .try_zone_distances()
                .map_err(|err| device_error("zone read failed", err))?;
            ZonesOutput {
                left_mm: Some(zones.left),
                front_mm: Some(zones.front),
                right_mm: Some(zones.right),
            }
        }
    };

    let fields = ObstacleSide::ALL
        .iter()
        .filter_map(|side| {
            let value = match side {
                ObstacleSide::Left => body.left_mm,
                ObstacleSide::Front => body.front_mm,
                ObstacleSide::Right => body.right_mm,
            }?;
            Some((side.name(), value.to_string()))
        })
        .collect();

    print_reading(
        &Reading {
            kind: "zones",
            address: session.address().to_string(),
            body: &body,
            fields,
        },
        format,
    );
    Ok(SUCCESS)
}

fn side(arg: SideArg) -> ObstacleSide {
    match arg {
        SideArg::Left => ObstacleSide::Left,
        SideArg::Front => ObstacleSide::Front,
        SideArg::Right => ObstacleSide::Right,
    }
}

fn slot(body: &mut ZonesOutput, side: ObstacleSide) -> &mut Option<u16> {
    match side {
        ObstacleSide::Left => &mut body.left_mm,
        ObstacleSide::Front => &mut body.front_mm,
        ObstacleSide::Right => &mut body.right_mm,
    }
}
