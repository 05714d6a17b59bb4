//! Backend Registry
//!
//! Which tool to run, with which arguments, and which parser reads its
//! output. Selection order per platform lives here too.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::WPA_CLI_SETTLE_SECS;
use crate::logic::parsers::{
    BackendParser, IwParser, IwlistParser, NetshParser, NmcliParser, WpaCliParser,
};

// ============================================================================
// PLATFORM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    MacOs,
    Unknown,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Unknown => "unknown",
        }
    }

    /// Prefix used in scanner names, e.g. "LinuxScanner (nmcli)"
    pub fn scanner_prefix(&self) -> &'static str {
        match self {
            Platform::Linux => "LinuxScanner",
            Platform::Windows => "WindowsScanner",
            Platform::MacOs => "MacScanner",
            Platform::Unknown => "Scanner",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// COMMAND SPEC
// ============================================================================

/// Program plus arguments for one tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new(program: &'static str, args: &[&str]) -> Self {
        Self {
            program,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

// ============================================================================
// BACKEND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Nmcli,
    Iw,
    Iwlist,
    WpaCli,
    Netsh,
}

impl Backend {
    pub const ALL: [Backend; 5] = [
        Backend::Nmcli,
        Backend::Iw,
        Backend::Iwlist,
        Backend::WpaCli,
        Backend::Netsh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Nmcli => "nmcli",
            Backend::Iw => "iw",
            Backend::Iwlist => "iwlist",
            Backend::WpaCli => "wpa_cli",
            Backend::Netsh => "netsh",
        }
    }

    pub fn parser(&self) -> &'static dyn BackendParser {
        match self {
            Backend::Nmcli => &NmcliParser,
            Backend::Iw => &IwParser,
            Backend::Iwlist => &IwlistParser,
            Backend::WpaCli => &WpaCliParser,
            Backend::Netsh => &NetshParser,
        }
    }

    /// Active scans through iw/iwlist need CAP_NET_ADMIN
    pub fn requires_privileges(&self) -> bool {
        matches!(self, Backend::Iw | Backend::Iwlist)
    }

    /// Command whose stdout is handed to the parser
    pub fn scan_command(&self, interface: &str) -> CommandSpec {
        match self {
            Backend::Nmcli => CommandSpec::new(
                "nmcli",
                &["-t", "-f", "SSID,BSSID,CHAN,FREQ,SIGNAL,SECURITY", "device", "wifi", "list"],
            ),
            Backend::Iw => CommandSpec::new("iw", &["dev", interface, "scan"]),
            Backend::Iwlist => CommandSpec::new("iwlist", &[interface, "scan"]),
            Backend::WpaCli => CommandSpec::new("wpa_cli", &["-i", interface, "scan_results"]),
            Backend::Netsh => CommandSpec::new("netsh", &["wlan", "show", "networks", "mode=bssid"]),
        }
    }

    /// Command that triggers a fresh scan before listing, if the tool needs one
    pub fn prepare_command(&self, interface: &str) -> Option<CommandSpec> {
        match self {
            Backend::Nmcli => Some(CommandSpec::new("nmcli", &["device", "wifi", "rescan"])),
            Backend::WpaCli => Some(CommandSpec::new("wpa_cli", &["-i", interface, "scan"])),
            _ => None,
        }
    }

    /// Wait between the prepare step and the listing
    pub fn settle_delay(&self) -> Duration {
        match self {
            Backend::WpaCli => Duration::from_secs(WPA_CLI_SETTLE_SECS),
            _ => Duration::ZERO,
        }
    }

    /// Cheap presence check; never triggers a scan
    pub fn probe_command(&self) -> CommandSpec {
        match self {
            Backend::Nmcli => CommandSpec::new("nmcli", &["--version"]),
            Backend::Iw => CommandSpec::new("iw", &["--version"]),
            Backend::Iwlist => CommandSpec::new("iwlist", &["--version"]),
            Backend::WpaCli => CommandSpec::new("wpa_cli", &["-v"]),
            Backend::Netsh => CommandSpec::new("netsh", &["wlan", "show", "interfaces"]),
        }
    }

    /// Auto-detection order: unprivileged tools first, last entry is the fallback
    pub fn priority(platform: Platform) -> &'static [Backend] {
        match platform {
            Platform::Linux => &[Backend::Nmcli, Backend::WpaCli, Backend::Iw, Backend::Iwlist],
            Platform::Windows => &[Backend::Netsh],
            Platform::MacOs | Platform::Unknown => &[],
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nmcli" => Ok(Backend::Nmcli),
            "iw" => Ok(Backend::Iw),
            "iwlist" => Ok(Backend::Iwlist),
            "wpa_cli" | "wpa-cli" | "wpacli" => Ok(Backend::WpaCli),
            "netsh" => Ok(Backend::Netsh),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}
