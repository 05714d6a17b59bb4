//! Threat Types
//!
//! Data structures only. Rules create threats, the detector owns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::network::Network;

/// Length of the short threat id
const THREAT_ID_LEN: usize = 8;

// ============================================================================
// SEVERITY
// ============================================================================

/// Ordered: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatSeverity {
    pub const ALL: [ThreatSeverity; 4] = [
        ThreatSeverity::Low,
        ThreatSeverity::Medium,
        ThreatSeverity::High,
        ThreatSeverity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatSeverity::Low => "low",
            ThreatSeverity::Medium => "medium",
            ThreatSeverity::High => "high",
            ThreatSeverity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ThreatSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    WeakEncryption,
    SsidSpoofing,
    RogueAp,
    ChannelAnomaly,
    HiddenNetwork,
    SignalAnomaly,
}

impl ThreatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::WeakEncryption => "weak_encryption",
            ThreatCategory::SsidSpoofing => "ssid_spoofing",
            ThreatCategory::RogueAp => "rogue_ap",
            ThreatCategory::ChannelAnomaly => "channel_anomaly",
            ThreatCategory::HiddenNetwork => "hidden_network",
            ThreatCategory::SignalAnomaly => "signal_anomaly",
        }
    }
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THREAT
// ============================================================================

/// A detected security condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    /// Short unique id; dedup and resolve key
    pub id: String,
    pub severity: ThreatSeverity,
    pub category: ThreatCategory,
    pub description: String,
    /// Copies of the triggering observations
    pub networks: Vec<Network>,
    pub detected_at: DateTime<Utc>,
    /// Only changed through the detector's resolve operation
    pub resolved: bool,
}

impl Threat {
    pub fn new(
        severity: ThreatSeverity,
        category: ThreatCategory,
        description: impl Into<String>,
        networks: Vec<Network>,
    ) -> Self {
        Self {
            id: new_threat_id(),
            severity,
            category,
            description: description.into(),
            networks,
            detected_at: Utc::now(),
            resolved: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.resolved
    }
}

/// First 8 hex characters of a random v4 UUID
pub fn new_threat_id() -> String {
    Uuid::new_v4().simple().to_string()[..THREAT_ID_LEN].to_string()
}
