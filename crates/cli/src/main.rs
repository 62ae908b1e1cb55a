//! btspp — stream pre-rendered printer bytes to a Bluetooth SPP peripheral.
//!
//! The tool does no receipt formatting of its own: the payload file is sent
//! verbatim, so anything that renders ESC/POS (or any other dialect) can
//! pipe its output here.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use btspp_link::{
    ChannelSink, DEFAULT_CHANNEL, DEFAULT_TEARDOWN_DELAY, LinkConfig, LinkManager, RfcommDialer,
};

#[derive(Parser, Debug)]
#[command(
    name = "btspp",
    version,
    about = "Send raw payload bytes to a Bluetooth SPP (RFCOMM) receipt printer"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Connect to the printer, stream a payload file, and disconnect.
    Send {
        /// Printer device address (AA:BB:CC:DD:EE:FF).
        device: String,

        /// Payload file with pre-rendered printer bytes, or "-" for stdin.
        file: PathBuf,

        /// RFCOMM channel the printer's serial service listens on.
        #[arg(long, default_value_t = DEFAULT_CHANNEL)]
        channel: u8,

        /// Pause in milliseconds between stream shutdown and socket close.
        ///
        /// Some printer firmware needs this grace period to commit the last
        /// transaction before the RF link drops.
        #[arg(long, default_value_t = DEFAULT_TEARDOWN_DELAY.as_millis() as u64)]
        teardown_delay_ms: u64,
    },

    /// Dial the printer and drop the link again, verifying reachability.
    Probe {
        /// Printer device address (AA:BB:CC:DD:EE:FF).
        device: String,

        /// RFCOMM channel the printer's serial service listens on.
        #[arg(long, default_value_t = DEFAULT_CHANNEL)]
        channel: u8,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match Cli::parse().cmd {
        Cmd::Send {
            device,
            file,
            channel,
            teardown_delay_ms,
        } => send(&device, &file, channel, teardown_delay_ms),
        Cmd::Probe { device, channel } => probe(&device, channel),
    }
}

fn send(device: &str, file: &Path, channel: u8, teardown_delay_ms: u64) -> Result<()> {
    let payload = read_payload(file)?;

    let config =
        LinkConfig::default().with_teardown_delay(Duration::from_millis(teardown_delay_ms));

    let (sink, events) = ChannelSink::new();
    let reporter = thread::spawn(move || {
        for event in events.iter() {
            debug!("{}", event.message());
        }
    });

    let manager =
        LinkManager::with_config(RfcommDialer::new(channel), config).with_event_sink(sink);

    manager
        .connect(device)
        .with_context(|| format!("connecting to {device} on channel {channel}"))?;

    let written = manager.write(&payload);
    // Always run the full teardown, even after a failed transfer.
    manager.disconnect();
    drop(manager);
    let _ = reporter.join();

    written.with_context(|| format!("sending {} bytes to {device}", payload.len()))?;
    info!("sent {} bytes to {device}", payload.len());
    Ok(())
}

fn probe(device: &str, channel: u8) -> Result<()> {
    let manager = LinkManager::new(RfcommDialer::new(channel));
    manager
        .connect(device)
        .with_context(|| format!("connecting to {device} on channel {channel}"))?;
    info!("{device} is reachable on channel {channel}");
    manager.disconnect();
    Ok(())
}

fn read_payload(file: &Path) -> Result<Vec<u8>> {
    if file == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("reading payload from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(file).with_context(|| format!("reading payload file {}", file.display()))
    }
}
