//! Laneframe feed server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve a live console on a serial device node
//! laneframe-server --input /dev/ttyUSB0
//!
//! # Replay a capture file in a loop for development
//! laneframe-server --input meet-finals.bin --replay
//!
//! # Inspect a capture byte by byte
//! laneframe-server --input meet-finals.bin --dump
//! ```

use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use laneframe_proto::{ByteTrace, ConsoleParser};
use laneframe_server::{Feed, FeedConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Timing console feed server
#[derive(Parser, Debug)]
#[command(name = "laneframe-server")]
#[command(about = "Read a timing console and broadcast channel snapshots")]
#[command(version)]
struct Args {
    /// Address to bind the subscriber listener to
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    bind: String,

    /// Console device node or capture file to read
    #[arg(short, long)]
    input: PathBuf,

    /// Loop a capture file from the start on end-of-file
    #[arg(long)]
    replay: bool,

    /// Delay between input reads, in milliseconds
    #[arg(long, default_value = "1")]
    pace_ms: u64,

    /// Snapshot broadcast cadence, in milliseconds
    #[arg(long, default_value = "100")]
    interval_ms: u64,

    /// Print a decoded byte trace of the input and exit
    #[arg(long)]
    dump: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    if args.dump {
        return dump_input(&args.input);
    }

    tracing::info!("laneframe feed server starting");

    let config = FeedConfig {
        bind_address: args.bind,
        input: args.input,
        replay: args.replay,
        pace: Duration::from_millis(args.pace_ms),
        broadcast_interval: Duration::from_millis(args.interval_ms),
    };

    let feed = Feed::bind(config).await?;
    tracing::info!("listening on {}", feed.local_addr()?);

    feed.run().await?;

    Ok(())
}

/// Print one line per input byte: classification, channel, cell, decoded
/// character. Development aid for unfamiliar console captures.
fn dump_input(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let mut parser = ConsoleParser::new();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for byte in bytes {
        match parser.trace(byte) {
            ByteTrace::Control { channel, bank, blank } => {
                writeln!(out, "{byte:#04x} control channel={channel} bank={bank:?} blank={blank}")?;
            },
            ByteTrace::Segment { cell, nibble, decoded } => {
                writeln!(
                    out,
                    "{byte:#04x} segment cell={cell} nibble={nibble:#03x} char={:?}",
                    char::from(decoded)
                )?;
            },
        }
        parser.push(byte);
    }

    Ok(())
}
