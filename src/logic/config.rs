//! Application Configuration
//!
//! Optional JSON file layered over compiled-in defaults, then over
//! `AIRGUARD_*` environment variables. Only the binary loads it; the core
//! types take plain values.
//!
//! ```json
//! {
//!   "scan": { "interval_seconds": 30, "backend": "nmcli" },
//!   "security": { "baseline_networks": ["AA:BB:CC:DD:EE:FF"], "hop_threshold": 3 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    self, DEFAULT_HOP_THRESHOLD, DEFAULT_MIN_SIGNAL_DBM, DEFAULT_SCAN_INTERVAL, DEFAULT_SCAN_TIMEOUT,
};
use crate::logic::error::ConfigError;
use crate::logic::network::normalize_bssid;
use crate::logic::scanner::Backend;

/// Fewer than two observations cannot show a hop
const MIN_HOP_THRESHOLD: usize = 2;

const RULE_NAMES: [&str; 5] = [
    "weak_encryption",
    "ssid_spoofing",
    "rogue_ap",
    "channel_anomaly",
    "hidden_network",
];

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
    /// `None` = auto-detect
    pub interface: Option<String>,
    /// `None` = auto-detect
    pub backend: Option<Backend>,
    /// Display filter only; the detector always sees every network
    pub min_signal_dbm: i32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_SCAN_INTERVAL,
            timeout_seconds: DEFAULT_SCAN_TIMEOUT,
            interface: None,
            backend: None,
            min_signal_dbm: DEFAULT_MIN_SIGNAL_DBM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Trusted BSSIDs
    pub baseline_networks: Vec<String>,
    pub rules_enabled: Vec<String>,
    pub hop_threshold: usize,
    /// `None` = unbounded
    pub max_history_per_bssid: Option<usize>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            baseline_networks: Vec::new(),
            rules_enabled: RULE_NAMES.iter().map(|s| s.to_string()).collect(),
            hop_threshold: DEFAULT_HOP_THRESHOLD,
            max_history_per_bssid: None,
        }
    }
}

impl SecurityConfig {
    /// Baseline BSSIDs in canonical form; unparseable entries are dropped
    pub fn trusted_bssids(&self) -> Vec<String> {
        self.baseline_networks
            .iter()
            .filter_map(|raw| {
                let bssid = normalize_bssid(raw);
                if bssid.is_none() {
                    log::warn!("Ignoring invalid baseline BSSID '{}'", raw);
                }
                bssid
            })
            .collect()
    }
}

// ============================================================================
// APP CONFIG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// `<config dir>/airguard/config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("airguard")
            .join("config.json")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        log::info!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Explicit path, else the default path if it exists, else defaults.
    /// Read or parse failures are logged, never fatal.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let default_path = Self::default_path();
        let path = match path {
            Some(p) => p,
            None if default_path.exists() => default_path.as_path(),
            None => return Self::default(),
        };

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{} - using defaults", e);
                Self::default()
            }
        }
    }

    /// Environment wins over file values
    pub fn apply_env_overrides(&mut self) {
        if std::env::var("AIRGUARD_SCAN_INTERVAL").is_ok() {
            self.scan.interval_seconds = constants::get_scan_interval();
        }
        if std::env::var("AIRGUARD_SCAN_TIMEOUT").is_ok() {
            self.scan.timeout_seconds = constants::get_scan_timeout();
        }
        if std::env::var("AIRGUARD_HOP_THRESHOLD").is_ok() {
            self.security.hop_threshold = constants::get_hop_threshold();
        }
        if let Some(interface) = constants::get_interface() {
            self.scan.interface = Some(interface);
        }
        if let Some(name) = constants::get_backend() {
            match name.parse::<Backend>() {
                Ok(backend) => self.scan.backend = Some(backend),
                Err(e) => log::warn!("AIRGUARD_BACKEND ignored: {}", e),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.timeout_seconds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.scan.interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.interval_seconds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.security.hop_threshold < MIN_HOP_THRESHOLD {
            return Err(ConfigError::InvalidValue {
                field: "security.hop_threshold".to_string(),
                reason: format!("must be at least {}", MIN_HOP_THRESHOLD),
            });
        }
        if let Some(unknown) = self
            .security
            .rules_enabled
            .iter()
            .find(|r| !RULE_NAMES.contains(&r.as_str()))
        {
            return Err(ConfigError::InvalidValue {
                field: "security.rules_enabled".to_string(),
                reason: format!("unknown rule '{}'", unknown),
            });
        }
        Ok(())
    }
}
