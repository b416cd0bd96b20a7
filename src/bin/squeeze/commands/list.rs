use std::path::PathBuf;

use clap::Args;
use squeeze_io::{marker::MAX_APP_NUMBER, Image};

use crate::CliResult;

/// Lists payloads stored in APPn segments of a JPEG image
#[derive(Args, Debug)]
pub struct ListArgs {
    /// JPEG image to inspect
    #[arg(value_name = "input image")]
    pub input_image: PathBuf,

    /// Only list this APPn segment number (0-15)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub segment: Option<u8>,
}

impl ListArgs {
    pub fn run(self) -> CliResult<()> {
        let image = Image::open(&self.input_image)?;
        let numbers = match self.segment {
            Some(number) => number..=number,
            None => 0..=MAX_APP_NUMBER,
        };

        for number in numbers {
            for set in image.payloads(number)? {
                let status = match &set.fault {
                    None => "ok".to_string(),
                    Some(fault) => format!("corrupt: {}", fault),
                };
                println!(
                    "APP{:<2} {:<8} {:>3}/{:<3} chunks {:>10} bytes  {}",
                    number,
                    set.identifier.to_string(),
                    set.present,
                    set.declared,
                    set.size,
                    status
                );
            }
        }
        Ok(())
    }
}
