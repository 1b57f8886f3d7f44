use anyhow::Result;
use clap::Parser;

use wave_codec::cli::{self, Cli};
use wave_codec::logging::{self, LogLevel};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(LogLevel::from_verbosity(cli.verbose));
    log::debug!("Arguments: {:?}", cli);

    cli::run(&cli)
}
