use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;

pub type CliResult<T> = squeeze_io::Result<T>;

fn main() -> ExitCode {
    env_logger::init();

    let args = cli::CliArgs::parse();
    match args.command.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("{:?}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
