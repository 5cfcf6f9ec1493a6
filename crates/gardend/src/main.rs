//! Entry point for the `gardend` binary.

use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    match gardend::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(launch_error) => {
            report(&launch_error);
            ExitCode::FAILURE
        }
    }
}

fn report(launch_error: &gardend::LaunchError) {
    let chain = error_chain(launch_error);
    if gardend::telemetry_installed() {
        error!(
            target: concat!(env!("CARGO_PKG_NAME"), "::process"),
            error = %launch_error,
            causes = ?chain,
            "daemon exited with an error"
        );
        return;
    }

    // Telemetry never came up.
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "gardend: {launch_error}");
    for cause in &chain {
        let _ = writeln!(stderr, "  caused by: {cause}");
    }
}

fn error_chain(launch_error: &gardend::LaunchError) -> Vec<String> {
    let mut causes = Vec::new();
    let mut source = launch_error.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes
}
