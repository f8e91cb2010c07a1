mod cli;

use std::process::ExitCode;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use dart_devtools::Error;

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "dart_devtools=debug" } else { "dart_devtools=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();
    init_tracing(command_line_interface.verbose);
    match command_line_interface.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // validation problems are warnings; the command did nothing
            match error.downcast_ref::<Error>() {
                Some(inner) if inner.is_user_input() => {
                    eprintln!("{} {inner}", "warning:".yellow().bold());
                }
                _ => eprintln!("{} {error:#}", "error:".red().bold()),
            }
            ExitCode::FAILURE
        }
    }
}
