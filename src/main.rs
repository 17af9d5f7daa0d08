//! oledmon: wall-clock-synchronized OLED host monitor.
//!
//! Renders live host metrics onto an SSD1306-class 128x64 monochrome panel
//! over I2C. A fleet of machines running this shows the same page at the
//! same moment without exchanging a single byte: the active page is a pure
//! function of wall-clock time, so NTP is the only coordination mechanism.

mod compose;
mod config;
mod frame;
mod logging;
mod metrics;
mod page;
mod render_loop;
mod scroll;
mod sink;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use config::Config;
use render_loop::RenderLoop;
use sink::FrameSink;

/// OLED host monitor
#[derive(Parser, Debug)]
#[command(name = "oledmon", version, about = "Wall-clock-synchronized OLED host monitor")]
struct Args {
    /// Config file (default: ~/.config/oledmon/config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// I2C bus index (/dev/i2c-N), overrides the config file
    #[arg(long)]
    bus: Option<u8>,

    /// Panel I2C address (0x3C or 0x3D), overrides the config file
    #[arg(long, value_parser = parse_i2c_address)]
    address: Option<u8>,

    /// Page flip interval in seconds, overrides the config file
    #[arg(long)]
    flip_secs: Option<u64>,
}

fn parse_i2c_address(s: &str) -> Result<u8, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|_| format!("not an I2C address: {s}"))
}

fn main() -> Result<()> {
    let _log_guard = logging::init();
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bus) = args.bus {
        config.bus = bus;
    }
    if let Some(address) = args.address {
        config.display_address = address;
    }
    if let Some(flip) = args.flip_secs {
        config.page_flip_secs = flip;
    }
    config.validate()?;

    info!(
        "oledmon v{} starting: /dev/i2c-{} @ 0x{:02X}, flip every {}s",
        env!("CARGO_PKG_VERSION"),
        config.bus,
        config.display_address,
        config.page_flip_secs
    );

    let cancel = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, cancel.clone())
            .context("registering termination signal")?;
    }

    let mut sink = open_sink(&config)?;
    RenderLoop::new(config).run(sink.as_mut(), &cancel)
}

/// Opens the production sink. This validates the bus and address up front:
/// a panel that cannot init can never present, so failure here is fatal
/// before the loop starts.
#[cfg(target_os = "linux")]
fn open_sink(config: &Config) -> Result<Box<dyn FrameSink>> {
    let sink = sink::Ssd1306Sink::open(config.bus, config.display_address, config.contrast)?;
    Ok(Box::new(sink))
}

#[cfg(not(target_os = "linux"))]
fn open_sink(_config: &Config) -> Result<Box<dyn FrameSink>> {
    anyhow::bail!("the SSD1306 sink needs Linux I2C (/dev/i2c-*)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i2c_address_parses_hex_and_decimal() {
        assert_eq!(parse_i2c_address("0x3C"), Ok(0x3C));
        assert_eq!(parse_i2c_address("0x3d"), Ok(0x3D));
        assert_eq!(parse_i2c_address("61"), Ok(61));
        assert!(parse_i2c_address("panel").is_err());
    }
}
