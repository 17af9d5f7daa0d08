//! Page derivation and display line text.
//!
//! The bottom two rows alternate between two content sets. Which one is
//! active is a pure function of wall-clock time, so every instance in a fleet
//! lands on the same page without exchanging a single byte — provided the
//! host clocks are NTP-disciplined, which is a deployment guarantee, not
//! something checked here.

use crate::metrics::MetricsSnapshot;

/// One of the two alternating content sets for the bottom rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// CPU load + temperature, network interfaces + link state.
    A,
    /// Disk usage, local time.
    B,
}

impl Page {
    /// Active page at `now` (seconds since the Unix epoch) for the given
    /// flip interval: `floor(now / interval) mod 2`. Takes time as a
    /// parameter so it never touches the system clock itself.
    pub fn at(now_epoch_secs: f64, flip_interval_secs: u64) -> Page {
        let index = (now_epoch_secs / flip_interval_secs as f64).floor() as u64 % 2;
        if index == 0 { Page::A } else { Page::B }
    }
}

/// Text for the two fixed rows above the separator.
pub fn fixed_lines(snap: &MetricsSnapshot) -> [String; 2] {
    [
        format!("IP:{}", snap.ip_address),
        format!("{}  {}", snap.hostname, snap.memory_label),
    ]
}

/// Text for the two paged rows below the separator.
pub fn paged_lines(page: Page, snap: &MetricsSnapshot) -> [String; 2] {
    match page {
        Page::A => [cpu_line(snap), net_line(snap)],
        Page::B => [disk_line(snap), format!("Time:{}", snap.time_hhmmss)],
    }
}

fn cpu_line(snap: &MetricsSnapshot) -> String {
    match snap.temperature_c {
        Some(t) => format!("CPU:{:.0}%  T:{:.1}C", snap.cpu_percent, t),
        None => format!("CPU:{:.0}%  T:N/A", snap.cpu_percent),
    }
}

fn net_line(snap: &MetricsSnapshot) -> String {
    let state = if snap.net_up { "UP" } else { "DOWN" };
    format!("Net:{} [{}]", snap.net_label, state)
}

fn disk_line(snap: &MetricsSnapshot) -> String {
    match snap.disk {
        Some(d) => format!("Disk:{:.1}/{:.0}GB {:.0}%", d.used_gb, d.total_gb, d.used_percent),
        None => "Disk:N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::DiskStats;

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            ip_address: "192.168.1.17".to_string(),
            hostname: "pi-lab-3".to_string(),
            memory_label: "4GB",
            cpu_percent: 23.4,
            temperature_c: Some(48.25),
            net_label: "eth0".to_string(),
            net_up: true,
            disk: Some(DiskStats {
                used_gb: 11.73,
                total_gb: 29.0,
                used_percent: 40.4,
            }),
            time_hhmmss: "13:37:00".to_string(),
        }
    }

    #[test]
    fn page_flips_every_interval() {
        // floor(12/5)=2 even -> A; floor(17/5)=3 odd -> B.
        assert_eq!(Page::at(12.0, 5), Page::A);
        assert_eq!(Page::at(17.0, 5), Page::B);
    }

    #[test]
    fn page_cycle_has_period_two() {
        for t in [0.0, 3.9, 5.0, 12.0, 1_700_000_000.4] {
            assert_eq!(Page::at(t, 5), Page::at(t + 10.0, 5));
            assert_ne!(Page::at(t, 5), Page::at(t + 5.0, 5));
        }
    }

    #[test]
    fn page_is_pure_in_its_inputs() {
        assert_eq!(Page::at(42.0, 7), Page::at(42.0, 7));
        assert_eq!(Page::at(0.0, 1), Page::A);
    }

    #[test]
    fn fixed_lines_show_ip_and_host() {
        let lines = fixed_lines(&snapshot());
        assert_eq!(lines[0], "IP:192.168.1.17");
        assert_eq!(lines[1], "pi-lab-3  4GB");
    }

    #[test]
    fn page_a_formats_cpu_and_network() {
        let lines = paged_lines(Page::A, &snapshot());
        assert_eq!(lines[0], "CPU:23%  T:48.2C");
        assert_eq!(lines[1], "Net:eth0 [UP]");
    }

    #[test]
    fn page_b_formats_disk_and_time() {
        let lines = paged_lines(Page::B, &snapshot());
        assert_eq!(lines[0], "Disk:11.7/29GB 40%");
        assert_eq!(lines[1], "Time:13:37:00");
    }

    #[test]
    fn failed_sensors_become_placeholders_not_errors() {
        let mut snap = snapshot();
        snap.temperature_c = None;
        snap.disk = None;
        snap.net_up = false;
        snap.net_label = "None".to_string();

        assert_eq!(paged_lines(Page::A, &snap)[0], "CPU:23%  T:N/A");
        assert_eq!(paged_lines(Page::A, &snap)[1], "Net:None [DOWN]");
        assert_eq!(paged_lines(Page::B, &snap)[0], "Disk:N/A");
    }
}
