use serde::Serialize;

use crate::cmd::{open_session, DeviceArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_reading, OutputFormat, Reading};

#[derive(Serialize)]
struct InitOutput {
    matrix: String,
    initialized: bool,
}

pub fn run(device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let session = open_session(device)?;
    let matrix = matrixlidar_device::MatrixMode::from(device.matrix);

    let body = InitOutput {
        matrix: matrix.to_string(),
        initialized: true,
    };
    print_reading(
        &Reading {
            kind: "init",
            address: session.address().to_string(),
            body: &body,
            fields: vec![("matrix", body.matrix.clone())],
        },
        format,
    );
    Ok(SUCCESS)
}
