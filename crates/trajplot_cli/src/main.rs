mod cli;
mod commands;
mod settings;

use clap::Parser;
use cli::{Cli, Command};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use trajplot_core::PlotError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let result = match cli.command {
        Command::Irk(args) => commands::handle_irk(args),
        Command::IrkTable(args) => commands::handle_irk_table(args),
        Command::Rc(args) => commands::handle_rc(args),
    };

    match result {
        Ok(written) => {
            for path in written {
                println!("Saved: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            // Missing RC data is reported on stdout, like the rest of the run summary.
            if let Some(no_data @ PlotError::NoData { .. }) = err.downcast_ref::<PlotError>() {
                println!("{no_data}");
            } else {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
