use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("matrixlidar {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: matrixlidar");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("MATRIXLIDAR_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("i2c_dev: {}", cfg!(target_os = "linux"));
    println!(
        "protocol: timeout={}ms settle={}ms max_payload={}",
        matrixlidar_frame::DEFAULT_TIMEOUT.as_millis(),
        matrixlidar_frame::DEFAULT_SETTLE_DELAY.as_millis(),
        matrixlidar_frame::MAX_PAYLOAD
    );

    Ok(SUCCESS)
}
