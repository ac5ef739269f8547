//! CLI argument parsing for the `cv` tool

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cv")]
#[command(author, version, about = "Inspect and read a chunk directory as a block volume", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Chunk directory (overrides `params.path` from the config file)
    #[arg(short, long, global = true)]
    pub path: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the logical volume size
    Size,

    /// List the chunk index
    Chunks,

    /// Read a byte range from the volume
    Read {
        /// Start offset (decimal or 0x-prefixed hex)
        #[arg(required = true, value_parser = parse_number)]
        offset: u64,

        /// Number of bytes to read (decimal or 0x-prefixed hex)
        #[arg(required = true, value_parser = parse_number)]
        length: u64,

        /// Print a hex dump instead of raw bytes
        #[arg(short = 'x', long)]
        hex: bool,

        /// Write the bytes to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse a decimal or `0x`-prefixed hex number
pub fn parse_number(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}
