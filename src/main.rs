//! # sessionpack Converter
//!
//! Command-line driver for converting acquisition-session containers into
//! flat snapshot + columnar artifacts.
//!
//! ## Usage
//!
//! ```bash
//! # Convert one container
//! sessionpack-convert convert session_001.json
//!
//! # Convert every container in a directory
//! sessionpack-convert batch recordings/
//!
//! # Inspect an artifact
//! sessionpack-convert info session_001/session_001.columnar
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::init_logging(args.verbosity());
    cli::dispatch(args)
}
