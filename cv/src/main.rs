use std::fs;
use std::io::{self, Write};

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use chunkvol::cli::{Cli, Command};
use chunkvol::config::Config;
use chunkvol::{BlockSource, Device, Plugin, RequestFlags, SizeSource};

/// Largest single request handed to the device, as a host would bound it
const READ_BUFFER_SIZE: usize = 1024 * 1024;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        None => tracing::Level::INFO,
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
    };

    // Logs go to stderr; stdout carries volume bytes
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install log subscriber: {}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn open_device(cli: &Cli, config: &Config) -> Result<Device> {
    let mut plugin = Plugin::new();
    for (key, value) in &config.params {
        plugin
            .configure(key, value)
            .context(format!("Invalid parameter in config file: {}", key))?;
    }
    if let Some(path) = &cli.path {
        plugin.configure(chunkvol::PATH_PARAM, path).context("Invalid --path")?;
    }
    plugin
        .config_complete()
        .context("Incomplete configuration (use --path or params.path)")?;

    plugin.open(true).context("Failed to open chunk device")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let device = open_device(&cli, &config)?;
    info!(root = %device.root().display(), "cv ready");

    match cli.command {
        Command::Size => cmd_size(&device),
        Command::Chunks => cmd_chunks(&device),
        Command::Read {
            offset,
            length,
            hex,
            output,
        } => {
            let mut sink: Box<dyn Write> = match &output {
                Some(path) => Box::new(
                    fs::File::create(path).context(format!("Failed to create output file {}", path.display()))?,
                ),
                None => Box::new(io::stdout().lock()),
            };
            cmd_read(&device, offset, length, hex, &mut sink)
        }
    }
}

fn cmd_size(device: &Device) -> Result<()> {
    let source = match device.size_source() {
        SizeSource::Metadata => chunkvol::METADATA_FILENAME.green(),
        SizeSource::Default => "default".yellow(),
    };
    println!("{} bytes ({})", device.size(), source);
    Ok(())
}

fn cmd_chunks(device: &Device) -> Result<()> {
    let index = device.index();
    if index.is_empty() {
        println!("No chunks found in {}", device.root().display());
        return Ok(());
    }

    let mut present = 0u64;
    for (pos, chunk) in index.iter().enumerate() {
        let path = device.root().join(&chunk.filename);
        let len = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                println!(
                    "{:>18} {:<18} {}",
                    format!("{:#x}", chunk.start).cyan(),
                    chunk.filename,
                    format!("unreadable: {}", e).red()
                );
                continue;
            }
        };

        let status = match index.span_limit(pos) {
            Some(span) if len >= span => "complete".green(),
            Some(_) => "partial".yellow(),
            None => "tail".dimmed(),
        };
        present += index.span_limit(pos).map_or(len, |span| len.min(span));
        println!(
            "{:>18} {:<18} {:>12} {}",
            format!("{:#x}", chunk.start).cyan(),
            chunk.filename,
            len,
            status
        );
    }

    println!();
    println!("  Chunks: {}", index.len());
    println!("  Bytes present: {}", present);
    Ok(())
}

fn cmd_read(device: &Device, offset: u64, length: u64, hex: bool, sink: &mut dyn Write) -> Result<()> {
    let mut buf = vec![0u8; READ_BUFFER_SIZE.min(usize::try_from(length).unwrap_or(READ_BUFFER_SIZE))];
    let mut current = offset;
    let mut total = 0u64;

    while total < length {
        let want = buf.len().min(usize::try_from(length - total).unwrap_or(usize::MAX));
        let n = match device.read_at(&mut buf[..want], current, RequestFlags::default()) {
            Ok(n) => n,
            // Data was already returned; the hole just ends the range
            Err(e) if e.is_no_data() && total > 0 => break,
            Err(e) => return Err(e).context(format!("Failed to read at offset {:#x}", current)),
        };

        if hex {
            write_hex(sink, current, &buf[..n])?;
        } else {
            sink.write_all(&buf[..n]).context("Failed to write output")?;
        }

        total += n as u64;
        current = current.saturating_add(n as u64);
        if n < want {
            break;
        }
    }
    sink.flush().context("Failed to flush output")?;

    if total < length {
        eprintln!(
            "{} short read: {} of {} bytes, no data at {:#x}",
            "!".yellow(),
            total,
            length,
            offset.saturating_add(total)
        );
    }
    Ok(())
}

fn write_hex(sink: &mut dyn Write, base: u64, data: &[u8]) -> Result<()> {
    for (i, line) in data.chunks(16).enumerate() {
        let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        writeln!(sink, "{:016x}  {:<47}  |{}|", base.saturating_add((i as u64) * 16), hex.join(" "), ascii)
            .context("Failed to write output")?;
    }
    Ok(())
}
