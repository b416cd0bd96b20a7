use clap::{Parser, Subcommand};
use squeeze_io::{Identifier, MAX_CHUNKS};

use crate::commands::*;
use crate::CliResult;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Write(write::WriteArgs),
    Read(read::ReadArgs),
    List(list::ListArgs),
}

impl Commands {
    pub fn run(self) -> CliResult<()> {
        match self {
            Self::Write(args) => args.run(),
            Self::Read(args) => args.run(),
            Self::List(args) => args.run(),
        }
    }
}

/// Parse a 1-3 byte identifier; longer values are truncated with a warning
pub fn parse_identifier(value: &str) -> Result<Identifier, String> {
    if value.is_empty() {
        return Err("identifier must not be empty".into());
    }
    if value.len() > 3 {
        log::warn!(
            "identifier {:?} is longer than 3 bytes and will be truncated to {}",
            value,
            Identifier::from(value)
        );
    }
    Ok(Identifier::from(value))
}

/// Help text for the capacity of one identifier
pub fn capacity_note() -> String {
    format!(
        "up to {} chunks of {} bytes per segment and identifier",
        MAX_CHUNKS,
        squeeze_io::CHUNK_CAPACITY
    )
}
