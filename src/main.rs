//! budg - plugin-driven static site builder

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = budg::cli::run() {
        eprintln!("error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
