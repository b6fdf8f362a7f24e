//! Host time zone detection.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::timezone::{TargetZone, UNKNOWN_ZONE};

/// Probes the operating system for its configured time zone.
///
/// Sources are tried in order: the `TZ` variable, the `/etc/localtime`
/// symlink target, `/etc/timezone`, `timedatectl`, and
/// `/etc/sysconfig/clock`. The first value that names a known zone wins;
/// when none does the result is `Etc/Unknown`.
#[derive(Debug, Clone)]
pub struct HostZoneProbe {
    root: PathBuf,
    tz_variable: Option<String>,
    use_timedatectl: bool,
}

impl Default for HostZoneProbe {
    fn default() -> Self {
        Self::system()
    }
}

impl HostZoneProbe {
    /// Probe the running system
    pub fn system() -> Self {
        HostZoneProbe {
            root: PathBuf::from("/"),
            tz_variable: std::env::var("TZ").ok(),
            use_timedatectl: true,
        }
    }

    /// Probe a file tree rooted at `root`, without the environment or
    /// external commands
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        HostZoneProbe {
            root: root.into(),
            tz_variable: None,
            use_timedatectl: false,
        }
    }

    pub fn tz_variable(mut self, value: Option<String>) -> Self {
        self.tz_variable = value;
        self
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn from_tz_variable(&self) -> Option<String> {
        let value = self.tz_variable.as_deref()?.trim();
        Some(value.strip_prefix(':').unwrap_or(value).to_string())
    }

    fn from_localtime_link(&self) -> Option<String> {
        let target = fs::read_link(self.path("etc/localtime")).ok()?;
        zone_from_zoneinfo_path(&target)
    }

    fn from_timezone_file(&self) -> Option<String> {
        let text = fs::read_to_string(self.path("etc/timezone")).ok()?;
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
    }

    fn from_timedatectl(&self) -> Option<String> {
        if !self.use_timedatectl {
            return None;
        }
        let output = Command::new("timedatectl")
            .args(["show", "--property=Timezone", "--value"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let text = String::from_utf8(output.stdout).ok()?;
        Some(text.trim().to_string())
    }

    fn from_sysconfig_clock(&self) -> Option<String> {
        let text = fs::read_to_string(self.path("etc/sysconfig/clock")).ok()?;
        text.lines().find_map(|line| {
            let (key, value) = line.trim().split_once('=')?;
            matches!(key.trim(), "ZONE" | "TIMEZONE")
                .then(|| value.trim().trim_matches('"').to_string())
        })
    }

    /// Run the probes and return the first known zone id
    pub fn detect(&self) -> String {
        let probes: [(&str, fn(&Self) -> Option<String>); 5] = [
            ("TZ", Self::from_tz_variable),
            ("/etc/localtime", Self::from_localtime_link),
            ("/etc/timezone", Self::from_timezone_file),
            ("timedatectl", Self::from_timedatectl),
            ("/etc/sysconfig/clock", Self::from_sysconfig_clock),
        ];
        for (source, probe) in probes {
            let Some(candidate) = probe(self).filter(|c| !c.is_empty()) else {
                continue;
            };
            match TargetZone::parse(&candidate) {
                Ok(zone) => {
                    debug!(source, zone = %candidate, "detected host time zone");
                    return zone.id();
                }
                Err(_) => debug!(source, zone = %candidate, "ignoring unknown host time zone"),
            }
        }
        debug!("host time zone unknown");
        UNKNOWN_ZONE.to_string()
    }
}

/// `…/zoneinfo/Europe/Paris` to `Europe/Paris`
fn zone_from_zoneinfo_path(path: &Path) -> Option<String> {
    let text = path.to_str()?;
    let (_, zone) = text.rsplit_once("zoneinfo/")?;
    let zone = zone.strip_prefix("posix/").unwrap_or(zone);
    Some(zone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoneinfo_paths() {
        assert_eq!(
            zone_from_zoneinfo_path(Path::new("/usr/share/zoneinfo/Europe/Paris")),
            Some("Europe/Paris".to_string())
        );
        assert_eq!(
            zone_from_zoneinfo_path(Path::new("../usr/share/zoneinfo/posix/Asia/Tokyo")),
            Some("Asia/Tokyo".to_string())
        );
        assert_eq!(zone_from_zoneinfo_path(Path::new("/etc/alt")), None);
    }

    #[test]
    fn tz_variable_wins() {
        let probe = HostZoneProbe::with_root("/nonexistent").tz_variable(Some(":Asia/Tokyo".into()));
        assert_eq!(probe.detect(), "Asia/Tokyo");
    }

    #[test]
    fn nothing_found_is_unknown() {
        assert_eq!(HostZoneProbe::with_root("/nonexistent").detect(), UNKNOWN_ZONE);
    }
}
