mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, DeviceArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "matrixlidar", version, about = "Matrix LiDAR distance sensor CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). MATRIXLIDAR_LOG overrides this.
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(flatten)]
    device: DeviceArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.device, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrixlidar_device::Address;

    #[test]
    fn parses_zones_with_side() {
        let cli = Cli::try_parse_from(["matrixlidar", "zones", "--side", "front"])
            .expect("zones args should parse");

        assert!(matches!(cli.command, Command::Zones(ref args) if args.side.is_some()));
    }

    #[test]
    fn global_device_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "matrixlidar",
            "point",
            "--x",
            "1",
            "--y",
            "2",
            "--address",
            "0x32",
            "--simulate",
        ])
        .expect("point args should parse");

        assert_eq!(cli.device.address, Address::Addr3);
        assert!(cli.device.simulate);
        assert!(matches!(cli.command, Command::Point(ref p) if p.x == 1 && p.y == 2));
    }

    #[test]
    fn rejects_unsupported_address() {
        let err = Cli::try_parse_from(["matrixlidar", "--address", "0x40", "init"])
            .expect_err("address outside strap set should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn threshold_requires_cm() {
        let err = Cli::try_parse_from(["matrixlidar", "threshold"])
            .expect_err("missing --cm should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
