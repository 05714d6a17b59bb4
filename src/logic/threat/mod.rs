//! Threat Module
//!
//! Stateful rule evaluation over a rolling window of scans.
//!
//! ## Structure
//! - `types`: Threat, ThreatSeverity, ThreatCategory
//! - `rules`: the five detection rules and the `Rule` trait
//! - `detector`: ThreatDetector (baseline, history, threat table)
//!
//! ## Usage
//! ```ignore
//! use airguard::logic::threat::ThreatDetector;
//!
//! let mut detector = ThreatDetector::new();
//! detector.set_baseline(trusted_networks);
//! for threat in detector.analyze(&scan_result) {
//!     println!("[{}] {}", threat.severity, threat.description);
//! }
//! ```

pub mod detector;
pub mod rules;
pub mod types;

#[cfg(test)]
mod tests;

pub use types::{new_threat_id, Threat, ThreatCategory, ThreatSeverity};

pub use rules::{
    default_rules,
    rules_with_hop_threshold,
    ChannelAnomalyRule,
    HiddenNetworkRule,
    RogueApRule,
    Rule,
    RuleContext,
    SsidSpoofingRule,
    WeakEncryptionRule,
};

pub use detector::{SharedDetector, ThreatDetector};
