mod cmd;
mod core;
mod dns;
mod pipeline;
mod util;

use std::process::ExitCode;

use clap::error::ErrorKind;
use tracing::{Level, event};

use crate::cmd::cli::Cli;
use crate::core::konst::APP_NAME;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::init() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            // Usage errors exit with 1, not clap's default of 2.
            _ => {
                let _ = e.print();
                return ExitCode::from(1);
            }
        },
    };

    match cli.run().await {
        Ok(_) => ExitCode::from(0),
        Err(e) => {
            eprintln!("ERROR, {e:#}");
            event!(target: APP_NAME, Level::ERROR, "{e:#}");
            ExitCode::from(1)
        }
    }
}
