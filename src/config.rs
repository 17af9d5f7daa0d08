//! Process configuration.
//!
//! Loaded once at startup — TOML file (default `~/.config/oledmon/config.toml`)
//! under CLI overrides — validated before the loop starts, and immutable from
//! then on. Every component receives the values it needs explicitly; nothing
//! reads configuration ambiently.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// The two addresses SSD1306 modules can strap to.
pub const I2C_ADDR_PRIMARY: u8 = 0x3C;
pub const I2C_ADDR_SECONDARY: u8 = 0x3D;

const APP_NAME: &str = "oledmon";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// I2C bus index, i.e. `/dev/i2c-<bus>`.
    pub bus: u8,
    /// Panel address; must be 0x3C or 0x3D.
    pub display_address: u8,
    /// Wall-clock period after which the active page toggles.
    pub page_flip_secs: u64,
    /// Target duration of one render-loop tick.
    pub frame_interval_secs: f64,
    /// Horizontal scroll advance per tick, px.
    pub scroll_speed_px: u32,
    /// Blank run between repetitions of a scrolling line, px.
    pub scroll_gap_px: u32,
    /// Cadence for the expensive metrics sub-readings.
    pub metrics_refresh_secs: u64,
    /// Mount point shown on the disk page.
    pub disk_mount: PathBuf,
    /// Panel contrast, 0-255.
    pub contrast: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: 1,
            display_address: I2C_ADDR_PRIMARY,
            page_flip_secs: 5,
            frame_interval_secs: 0.05,
            scroll_speed_px: 1,
            scroll_gap_px: 28,
            metrics_refresh_secs: 3,
            disk_mount: PathBuf::from("/"),
            contrast: 200,
        }
    }
}

impl Config {
    /// Loads configuration. An explicitly passed path must exist and parse;
    /// the default path is optional and silently skipped when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let Some(path) = path else {
            return Ok(Config::default());
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config =
            toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Startup validation. A config that cannot ever succeed fails fast here,
    /// before the loop starts.
    pub fn validate(&self) -> Result<()> {
        if self.display_address != I2C_ADDR_PRIMARY && self.display_address != I2C_ADDR_SECONDARY {
            bail!(
                "display_address must be 0x{I2C_ADDR_PRIMARY:02X} or 0x{I2C_ADDR_SECONDARY:02X}, got 0x{:02X}",
                self.display_address
            );
        }
        if self.page_flip_secs == 0 {
            bail!("page_flip_secs must be positive");
        }
        if !(self.frame_interval_secs > 0.0) {
            bail!("frame_interval_secs must be positive");
        }
        if self.scroll_speed_px == 0 {
            bail!("scroll_speed_px must be at least 1");
        }
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/oledmon/config.toml`, falling back to `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else {
        PathBuf::from(std::env::var("HOME").ok()?).join(".config")
    };
    Some(base.join(APP_NAME).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_deployed_fleet() {
        let c = Config::default();
        assert_eq!(c.display_address, 0x3C);
        assert_eq!(c.bus, 1);
        assert_eq!(c.page_flip_secs, 5);
        assert_eq!(c.frame_interval_secs, 0.05);
        assert_eq!(c.scroll_speed_px, 1);
        assert_eq!(c.scroll_gap_px, 28);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let c: Config = toml::from_str("display_address = 0x3D\npage_flip_secs = 10\n").unwrap();
        assert_eq!(c.display_address, 0x3D);
        assert_eq!(c.page_flip_secs, 10);
        assert_eq!(c.scroll_gap_px, 28);
    }

    #[test]
    fn unknown_address_is_rejected() {
        let c = Config {
            display_address: 0x42,
            ..Config::default()
        };
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("0x42"), "unexpected message: {err}");
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let zero_flip = Config {
            page_flip_secs: 0,
            ..Config::default()
        };
        assert!(zero_flip.validate().is_err());

        let zero_frame = Config {
            frame_interval_secs: 0.0,
            ..Config::default()
        };
        assert!(zero_frame.validate().is_err());

        let zero_speed = Config {
            scroll_speed_px: 0,
            ..Config::default()
        };
        assert!(zero_speed.validate().is_err());
    }
}
