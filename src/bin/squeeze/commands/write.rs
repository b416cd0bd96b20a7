use std::path::PathBuf;

use clap::Args;
use squeeze_io::{is_free_segment, Identifier, Image};

use crate::cli::parse_identifier;
use crate::CliResult;

/// Embeds a file in APPn segments of a JPEG image
#[derive(Args, Debug)]
#[command(after_help = crate::cli::capacity_note())]
pub struct WriteArgs {
    /// JPEG image to embed into, used readonly
    #[arg(value_name = "input image")]
    pub input_image: PathBuf,

    /// File whose bytes will be embedded
    #[arg(value_name = "data file")]
    pub data: PathBuf,

    /// Resulting image will be stored as file
    #[arg(value_name = "output file")]
    pub output_file: PathBuf,

    /// APPn segment number (0-15)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub segment: u8,

    /// Tag of up to 3 bytes separating payloads in the same segment
    #[arg(short, long, value_parser = parse_identifier)]
    pub identifier: Identifier,

    /// Replace a payload already stored under the same identifier
    #[arg(long)]
    pub replace: bool,

    /// Refuse segment numbers that are not conventionally free
    #[arg(long)]
    pub strict: bool,
}

impl WriteArgs {
    pub fn run(self) -> CliResult<()> {
        if !self.strict && !is_free_segment(self.segment) {
            log::warn!(
                "APP{} is not registered as a free segment, you may overwrite application data",
                self.segment
            );
        }

        let mut image = Image::builder()
            .replace_existing(self.replace)
            .require_free_segment(self.strict)
            .open(&self.input_image)?;
        let data = std::fs::read(&self.data)?;
        let chunks = image.write(self.segment, self.identifier, &data)?;
        image.save(&self.output_file)?;

        log::info!(
            "embedded {} bytes as {} in APP{} ({} chunks) into {}",
            data.len(),
            self.identifier,
            self.segment,
            chunks,
            self.output_file.display()
        );
        Ok(())
    }
}
