use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod batch;
mod config;
mod convert;
mod info;

/// sessionpack - Acquisition Session Container Converter
#[derive(Parser)]
#[command(name = "sessionpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one container file into snapshot + columnar artifacts
    Convert {
        /// Input container file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Destination directory (defaults to a subdirectory named after the
        /// source basename, next to the source file)
        #[arg(short, long, value_name = "DIR")]
        dest: Option<PathBuf>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Compression level for ZSTD (1-22, default: 9)
        #[arg(short = 'c', long)]
        compression_level: Option<i32>,

        /// Row group size (number of rows per row group)
        #[arg(short = 'r', long)]
        row_group_size: Option<usize>,
    },

    /// Convert every matching container file in a directory
    Batch {
        /// Directory holding source container files
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Compression level for ZSTD (1-22, default: 9)
        #[arg(short = 'c', long)]
        compression_level: Option<i32>,

        /// Row group size (number of rows per row group)
        #[arg(short = 'r', long)]
        row_group_size: Option<usize>,
    },

    /// Display information about a snapshot or columnar artifact
    Info {
        /// Artifact file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            input,
            dest,
            config,
            compression_level,
            row_group_size,
        } => convert::run(input, dest, config, compression_level, row_group_size),
        Commands::Batch {
            dir,
            config,
            compression_level,
            row_group_size,
        } => batch::run(dir, config, compression_level, row_group_size),
        Commands::Info { file } => info::run(file),
    }
}
