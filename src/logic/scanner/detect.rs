//! Backend & Interface Auto-Detection

use std::time::Duration;

use crate::constants::{DEFAULT_INTERFACE, PROBE_TIMEOUT_SECS};
use crate::logic::error::ScanError;

use super::backend::{Backend, Platform};
use super::runner::CommandRunner;

/// Interface label used on Windows, where netsh picks the adapter itself
const WINDOWS_INTERFACE: &str = "Wi-Fi";

fn probe_timeout() -> Duration {
    Duration::from_secs(PROBE_TIMEOUT_SECS)
}

/// Version/presence probe for one backend
pub fn probe(runner: &dyn CommandRunner, backend: Backend) -> bool {
    let cmd = backend.probe_command();
    let available = match runner.run(cmd.program, &cmd.args, probe_timeout()) {
        Ok(out) => out.success(),
        Err(_) => false,
    };
    log::debug!("Probe {}: {}", backend, if available { "ok" } else { "unavailable" });
    available
}

/// First confirmed backend in the platform's priority order.
///
/// When nothing confirms, the last entry is used as a best-effort fallback.
pub fn detect_backend(runner: &dyn CommandRunner, platform: Platform) -> Result<Backend, ScanError> {
    let order = Backend::priority(platform);
    let Some(&fallback) = order.last() else {
        return Err(ScanError::UnsupportedPlatform {
            platform: platform.to_string(),
        });
    };

    if let Some(&backend) = order.iter().find(|b| probe(runner, **b)) {
        log::info!("Selected scan backend: {}", backend);
        return Ok(backend);
    }

    log::warn!("No scan backend confirmed on {}, falling back to {}", platform, fallback);
    Ok(fallback)
}

/// Wireless interface name, e.g. "wlan0" or "wlp2s0"
pub fn detect_interface(runner: &dyn CommandRunner, platform: Platform) -> String {
    if platform == Platform::Windows {
        return WINDOWS_INTERFACE.to_string();
    }

    let from_iw = runner
        .run("iw", &["dev".to_string()], probe_timeout())
        .ok()
        .filter(|out| out.success())
        .and_then(|out| parse_iw_dev_interfaces(&out.stdout_lossy()).into_iter().next());
    if let Some(name) = from_iw {
        return name;
    }

    let from_iwconfig = runner
        .run("iwconfig", &[], probe_timeout())
        .ok()
        .and_then(|out| parse_iwconfig_interfaces(&out.stdout_lossy()).into_iter().next());
    if let Some(name) = from_iwconfig {
        return name;
    }

    log::debug!("No wireless interface found, using {}", DEFAULT_INTERFACE);
    DEFAULT_INTERFACE.to_string()
}

/// `Interface <name>` lines from `iw dev`
pub fn parse_iw_dev_interfaces(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Interface "))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Interfaces that `iwconfig` reports as `IEEE 802.11`
pub fn parse_iwconfig_interfaces(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains("IEEE 802.11"))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
