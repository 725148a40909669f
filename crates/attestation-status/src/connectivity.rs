//! Network connectivity probing
//!
//! The store asks a [`ConnectivityProbe`] whether a remote fetch is worth
//! attempting. The answer fails closed: anything that cannot be determined
//! is reported as "no usable network" and the local snapshot is used.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Capability query for an active, acceptable network path
pub trait ConnectivityProbe: Send + Sync {
    /// True iff an active interface uses Wi-Fi, cellular or Ethernet transport
    fn has_usable_network(&self) -> bool;
}

/// Transport type of a network interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
    /// Loopback, tunnels, bridges and anything else
    Other,
}

impl Transport {
    pub fn is_usable(self) -> bool {
        !matches!(self, Transport::Other)
    }
}

/// ARPHRD_ETHER from `linux/if_arp.h`
const ARPHRD_ETHER: u32 = 1;

/// Probe reading the kernel's network-interface tree (`/sys/class/net`)
///
/// On hosts without that tree the probe finds no interfaces and reports no
/// usable network.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    net_root: PathBuf,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self::with_root("/sys/class/net")
    }

    /// Probe a different interface tree (containers, tests)
    pub fn with_root<P: Into<PathBuf>>(net_root: P) -> Self {
        Self {
            net_root: net_root.into(),
        }
    }

    /// Classify one interface directory, `None` when it is not up
    ///
    /// Cellular modems in raw-IP mode report an `unknown` operstate while
    /// carrying traffic, so that state counts as up for them only.
    fn classify(iface: &Path) -> Option<Transport> {
        let operstate = read_trimmed(&iface.join("operstate"))?;
        if operstate != "up" && operstate != "unknown" {
            return None;
        }

        let transport = Self::transport(iface)?;
        match (operstate.as_str(), transport) {
            ("up", _) | ("unknown", Transport::Cellular) => Some(transport),
            _ => None,
        }
    }

    fn transport(iface: &Path) -> Option<Transport> {
        if iface.join("wireless").exists() || iface.join("phy80211").exists() {
            return Some(Transport::Wifi);
        }

        if let Some(uevent) = read_trimmed(&iface.join("uevent")) {
            if uevent.lines().any(|line| line.trim() == "DEVTYPE=wwan") {
                return Some(Transport::Cellular);
            }
        }

        let link_type = read_trimmed(&iface.join("type"))?.parse::<u32>().ok()?;
        // Bridges and virtual pairs also report ARPHRD_ETHER but have no device
        if link_type == ARPHRD_ETHER && iface.join("device").exists() {
            return Some(Transport::Ethernet);
        }

        Some(Transport::Other)
    }

    /// Transports of all interfaces that are currently up
    pub fn active_transports(&self) -> Vec<(String, Transport)> {
        let Ok(dir) = fs::read_dir(&self.net_root) else {
            debug!(root = %self.net_root.display(), "Network interface tree unavailable");
            return Vec::new();
        };

        dir.filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                Self::classify(&entry.path()).map(|transport| (name, transport))
            })
            .collect()
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityProbe for SystemProbe {
    fn has_usable_network(&self) -> bool {
        let active = self.active_transports();
        let usable = active.iter().find(|(_, transport)| transport.is_usable());

        match usable {
            Some((name, transport)) => {
                debug!(interface = %name, transport = ?transport, "Usable network found");
                true
            }
            None => {
                debug!(active = active.len(), "No usable network interface");
                false
            }
        }
    }
}

/// Probe with a fixed answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedProbe(pub bool);

impl FixedProbe {
    pub fn online() -> Self {
        Self(true)
    }

    pub fn offline() -> Self {
        Self(false)
    }
}

impl ConnectivityProbe for FixedProbe {
    fn has_usable_network(&self) -> bool {
        self.0
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}
