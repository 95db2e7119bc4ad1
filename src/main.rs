use std::process;

use anyhow::Result;
use clap::{Parser, error::ErrorKind};
use golfer::{CLIArguments, USAGE, golfer_main, init_logging};

fn main() -> Result<()> {
    let args = match CLIArguments::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            println!("{}", USAGE);
            process::exit(1);
        }
        Err(e) => e.exit(),
    };

    init_logging();
    golfer_main(args)
}
