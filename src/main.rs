mod cli;
mod error;
mod export;
mod model;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::ExportError;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "export failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }

        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<ExportError>())
            .map(ExportError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    export::run(cli.export)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
