mod cli;
mod commands;
mod error;
mod logging;
mod metadata;
mod output;

use almanac_core::EnvelopeStatus;
use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::error::CliError;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    let envelope = commands::run(&cli)?;
    if cli.stream {
        output::render_stream(&envelope)?;
    } else {
        output::render(&envelope, cli.format, cli.pretty)?;
    }

    let status = envelope.status();
    if cli.strict && status != EnvelopeStatus::Ok {
        return Err(CliError::StrictModeViolation {
            warning_count: envelope.meta.warnings.len(),
            error_count: envelope.errors.len(),
        });
    }

    if status == EnvelopeStatus::Error {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}
