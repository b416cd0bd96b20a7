use std::path::PathBuf;

use clap::Args;
use squeeze_io::{Identifier, Image};

use crate::cli::parse_identifier;
use crate::CliResult;

/// Recovers a payload from APPn segments of a JPEG image
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// JPEG image that contains the payload
    #[arg(value_name = "input image")]
    pub input_image: PathBuf,

    /// Recovered bytes will be stored as file
    #[arg(value_name = "output file")]
    pub output_file: PathBuf,

    /// APPn segment number (0-15)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub segment: u8,

    /// Tag the payload was written with
    #[arg(short, long, value_parser = parse_identifier)]
    pub identifier: Identifier,
}

impl ReadArgs {
    pub fn run(self) -> CliResult<()> {
        let image = Image::open(&self.input_image)?;
        let data = image.read(self.segment, self.identifier)?;
        std::fs::write(&self.output_file, &data)?;

        log::info!(
            "recovered {} bytes tagged {} from APP{} into {}",
            data.len(),
            self.identifier,
            self.segment,
            self.output_file.display()
        );
        Ok(())
    }
}
