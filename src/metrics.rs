//! Host metrics sampling.
//!
//! `MetricsSource::sample()` is called once per frame tick and must never
//! fail as a whole: every sub-reading has a fallback so a dead sensor
//! degrades one displayed field, not the process. The expensive sub-readings
//! (IP discovery, connectivity probe, disk and interface enumeration) are
//! re-polled on an internal cadence and served from the last-known values in
//! between; the wall-clock field is stamped on every call.

use std::net::{IpAddr, SocketAddr, TcpStream, UdpSocket};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use sysinfo::{Disks, Networks, System};
use tracing::debug;

const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Connected-UDP trick target; no packet is ever sent.
const IP_PROBE_TARGET: (&str, u16) = ("8.8.8.8", 80);

/// TCP connect probe target for the [UP]/[DOWN] badge.
const NET_PROBE_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(std::net::Ipv4Addr::new(8, 8, 8, 8)), 53);
const NET_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Everything one frame needs to know about the host.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub ip_address: String,
    pub hostname: String,
    pub memory_label: &'static str,
    pub cpu_percent: f32,
    pub temperature_c: Option<f32>,
    /// Joined short names of interfaces carrying an IPv4 address, or "None".
    pub net_label: String,
    pub net_up: bool,
    pub disk: Option<DiskStats>,
    pub time_hhmmss: String,
}

#[derive(Debug, Clone, Copy)]
pub struct DiskStats {
    pub used_gb: f64,
    pub total_gb: f64,
    pub used_percent: f64,
}

/// Last-known facts between slow refreshes.
#[derive(Debug, Clone)]
struct CachedFacts {
    ip_address: String,
    hostname: String,
    memory_label: &'static str,
    cpu_percent: f32,
    temperature_c: Option<f32>,
    net_label: String,
    net_up: bool,
    disk: Option<DiskStats>,
}

impl Default for CachedFacts {
    fn default() -> Self {
        Self {
            ip_address: "No IP".to_string(),
            hostname: "unknown".to_string(),
            memory_label: "2GB",
            cpu_percent: 0.0,
            temperature_c: None,
            net_label: "None".to_string(),
            net_up: false,
            disk: None,
        }
    }
}

pub struct MetricsSource {
    sys: System,
    disk_mount: PathBuf,
    refresh_every: Duration,
    last_refresh: Option<Instant>,
    cached: CachedFacts,
}

impl MetricsSource {
    pub fn new(disk_mount: PathBuf, refresh_every: Duration) -> Self {
        Self {
            sys: System::new(),
            disk_mount,
            refresh_every,
            last_refresh: None,
            cached: CachedFacts::default(),
        }
    }

    /// Current snapshot. Refreshes the slow facts when they are due and
    /// stamps the clock field unconditionally.
    pub fn sample(&mut self) -> MetricsSnapshot {
        let due = match self.last_refresh {
            None => true,
            Some(at) => at.elapsed() >= self.refresh_every,
        };
        if due {
            self.refresh();
            self.last_refresh = Some(Instant::now());
        }

        MetricsSnapshot {
            ip_address: self.cached.ip_address.clone(),
            hostname: self.cached.hostname.clone(),
            memory_label: self.cached.memory_label,
            cpu_percent: self.cached.cpu_percent,
            temperature_c: self.cached.temperature_c,
            net_label: self.cached.net_label.clone(),
            net_up: self.cached.net_up,
            disk: self.cached.disk,
            time_hhmmss: Local::now().format("%H:%M:%S").to_string(),
        }
    }

    /// Re-reads every slow fact. Each one falls back independently.
    fn refresh(&mut self) {
        self.sys.refresh_cpu_usage();
        self.cached.cpu_percent = self.sys.global_cpu_usage();

        self.sys.refresh_memory();
        self.cached.memory_label = memory_label(self.sys.total_memory());

        if let Some(name) = System::host_name() {
            self.cached.hostname = name;
        }

        self.cached.temperature_c = read_thermal_zone(Path::new(THERMAL_ZONE));
        if self.cached.temperature_c.is_none() {
            debug!("thermal zone unreadable, showing N/A");
        }

        match discover_ip() {
            Some(ip) => self.cached.ip_address = ip,
            None => {
                debug!("no route for IP discovery, showing No IP");
                self.cached.ip_address = "No IP".to_string();
            }
        }

        self.cached.net_label = active_interfaces_label();
        self.cached.net_up = probe_connectivity(NET_PROBE_TIMEOUT);

        self.cached.disk = read_disk_stats(&self.disk_mount);
        if self.cached.disk.is_none() {
            debug!("disk stats unavailable for {}", self.disk_mount.display());
        }
    }
}

// ---------------------------------------------------------------------------
// Individual readings
// ---------------------------------------------------------------------------

/// Marketing-size RAM label for the board (a Pi reports slightly under the
/// nominal capacity, hence the bucket thresholds).
fn memory_label(total_bytes: u64) -> &'static str {
    let gib = total_bytes as f64 / 1024f64.powi(3);
    if gib < 3.0 {
        "2GB"
    } else if gib < 6.0 {
        "4GB"
    } else {
        "8GB"
    }
}

/// Reads a sysfs thermal zone (millidegrees Celsius).
fn read_thermal_zone(path: &Path) -> Option<f32> {
    let raw = std::fs::read_to_string(path).ok()?;
    let millis: i64 = raw.trim().parse().ok()?;
    Some(millis as f32 / 1000.0)
}

/// Local address of a UDP socket "connected" to a public target. Nothing is
/// transmitted; this only asks the kernel which source address it would pick.
fn discover_ip() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(IP_PROBE_TARGET).ok()?;
    let addr = socket.local_addr().ok()?;
    Some(addr.ip().to_string())
}

fn probe_connectivity(timeout: Duration) -> bool {
    TcpStream::connect_timeout(&NET_PROBE_ADDR, timeout).is_ok()
}

/// "&"-joined short names of every non-loopback interface that currently
/// carries an IPv4 address, or "None".
fn active_interfaces_label() -> String {
    let networks = Networks::new_with_refreshed_list();
    let mut names: Vec<String> = networks
        .list()
        .iter()
        .filter(|(name, _)| name.as_str() != "lo")
        .filter(|(_, data)| {
            data.ip_networks().iter().any(|net| match net.addr {
                IpAddr::V4(v4) => !v4.is_loopback(),
                IpAddr::V6(_) => false,
            })
        })
        .map(|(name, _)| shorten_iface(name))
        .collect();
    names.sort();

    if names.is_empty() {
        "None".to_string()
    } else {
        names.join("&")
    }
}

/// Fits interface names into the narrow line: "ethernet0" -> "eth0", then
/// hard-truncated to 5 chars.
fn shorten_iface(name: &str) -> String {
    name.replace("ethernet", "eth").chars().take(5).collect()
}

fn read_disk_stats(mount: &Path) -> Option<DiskStats> {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks.list().iter().find(|d| d.mount_point() == mount)?;

    let total = disk.total_space();
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(disk.available_space());

    let gib = 1024f64.powi(3);
    Some(DiskStats {
        used_gb: used as f64 / gib,
        total_gb: total as f64 / gib,
        used_percent: used as f64 / total as f64 * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn memory_label_buckets_match_board_sizes() {
        assert_eq!(memory_label(2 * 1024u64.pow(3) - 1024), "2GB");
        assert_eq!(memory_label(4 * 1024u64.pow(3) - 1024), "4GB");
        assert_eq!(memory_label(8 * 1024u64.pow(3) - 1024), "8GB");
        assert_eq!(memory_label(16 * 1024u64.pow(3)), "8GB");
    }

    #[test]
    fn thermal_zone_parses_millidegrees() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "48500").unwrap();

        assert_eq!(read_thermal_zone(file.path()), Some(48.5));
    }

    #[test]
    fn thermal_zone_missing_file_is_none() {
        assert_eq!(read_thermal_zone(Path::new("/nonexistent/thermal")), None);
    }

    #[test]
    fn thermal_zone_garbage_is_none() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a number").unwrap();

        assert_eq!(read_thermal_zone(file.path()), None);
    }

    #[test]
    fn iface_names_are_shortened_and_truncated() {
        assert_eq!(shorten_iface("ethernet0"), "eth0");
        assert_eq!(shorten_iface("wlan0"), "wlan0");
        assert_eq!(shorten_iface("enx00e04c680001"), "enx00");
    }
}
