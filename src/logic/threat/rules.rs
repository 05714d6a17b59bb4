//! Detection Rules
//!
//! Each rule is a pure function of (current networks, baseline, history).
//! Rules never fail: a network missing the data a rule needs simply does
//! not match.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::constants::{DEFAULT_HOP_THRESHOLD, UNKNOWN_VENDOR};
use crate::logic::network::{Band, Network, SecurityType};

use super::types::{Threat, ThreatCategory, ThreatSeverity};

/// Non-overlapping 2.4 GHz channels
pub const PREFERRED_24GHZ_CHANNELS: [u32; 3] = [1, 6, 11];

/// Same-vendor SSID groups smaller than this are treated as dual-band APs
pub const SAME_VENDOR_GROUP_MIN: usize = 3;

/// Inputs shared by every rule for one evaluation
pub struct RuleContext<'a> {
    pub networks: &'a [Network],
    pub baseline: &'a HashMap<String, Network>,
    pub history: &'a HashMap<String, Vec<Network>>,
}

pub trait Rule: Send + Sync {
    /// Stable identifier, e.g. "weak_encryption"
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Threat>;
}

/// The five rules in evaluation order
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    rules_with_hop_threshold(DEFAULT_HOP_THRESHOLD)
}

pub fn rules_with_hop_threshold(hop_threshold: usize) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(WeakEncryptionRule),
        Box::new(SsidSpoofingRule),
        Box::new(RogueApRule),
        Box::new(ChannelAnomalyRule::new(hop_threshold)),
        Box::new(HiddenNetworkRule),
    ]
}

// ============================================================================
// WEAK ENCRYPTION
// ============================================================================

/// Open, WEP and WPA networks
#[derive(Debug, Clone, Copy, Default)]
pub struct WeakEncryptionRule;

impl Rule for WeakEncryptionRule {
    fn name(&self) -> &'static str {
        "weak_encryption"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Threat> {
        ctx.networks
            .iter()
            .filter_map(|network| {
                let description = match network.security {
                    SecurityType::Open => format!("Open network '{}' has no encryption", network.ssid),
                    SecurityType::Wep => {
                        format!("Network '{}' uses deprecated WEP encryption", network.ssid)
                    }
                    SecurityType::Wpa => {
                        format!("Network '{}' uses outdated WPA (not WPA2/3)", network.ssid)
                    }
                    _ => return None,
                };
                Some(Threat::new(
                    ThreatSeverity::High,
                    ThreatCategory::WeakEncryption,
                    description,
                    vec![network.clone()],
                ))
            })
            .collect()
    }
}

// ============================================================================
// SSID SPOOFING
// ============================================================================

/// Several BSSIDs broadcasting the same SSID (evil twin)
#[derive(Debug, Clone, Copy, Default)]
pub struct SsidSpoofingRule;

impl Rule for SsidSpoofingRule {
    fn name(&self) -> &'static str {
        "ssid_spoofing"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Threat> {
        // Groups in first-seen order
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<&Network>)> = Vec::new();
        for network in ctx.networks.iter().filter(|n| !n.ssid.is_empty()) {
            match index.get(network.ssid.as_str()) {
                Some(&i) => groups[i].1.push(network),
                None => {
                    index.insert(network.ssid.as_str(), groups.len());
                    groups.push((network.ssid.as_str(), vec![network]));
                }
            }
        }

        let mut threats = Vec::new();
        for (ssid, group) in groups.into_iter().filter(|(_, g)| g.len() >= 2) {
            let vendors: HashSet<&str> = group
                .iter()
                .map(|n| n.vendor.as_str())
                .filter(|v| *v != UNKNOWN_VENDOR)
                .collect();
            let members: Vec<Network> = group.iter().map(|n| (*n).clone()).collect();

            if vendors.len() > 1 {
                threats.push(Threat::new(
                    ThreatSeverity::Critical,
                    ThreatCategory::SsidSpoofing,
                    format!(
                        "SSID '{}' broadcast by {} APs with different vendors - possible evil twin",
                        ssid,
                        group.len()
                    ),
                    members,
                ));
            } else if group.len() >= SAME_VENDOR_GROUP_MIN {
                threats.push(Threat::new(
                    ThreatSeverity::Low,
                    ThreatCategory::SsidSpoofing,
                    format!(
                        "SSID '{}' broadcast by {} APs - may be mesh network or spoofing",
                        ssid,
                        group.len()
                    ),
                    members,
                ));
            }
        }
        threats
    }
}

// ============================================================================
// ROGUE AP
// ============================================================================

/// Unknown BSSID broadcasting a trusted SSID
#[derive(Debug, Clone, Copy, Default)]
pub struct RogueApRule;

impl Rule for RogueApRule {
    fn name(&self) -> &'static str {
        "rogue_ap"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Threat> {
        if ctx.baseline.is_empty() {
            return Vec::new();
        }

        let trusted_ssids: HashSet<&str> = ctx
            .baseline
            .values()
            .filter(|n| !n.ssid.is_empty())
            .map(|n| n.ssid.as_str())
            .collect();

        ctx.networks
            .iter()
            .filter(|n| trusted_ssids.contains(n.ssid.as_str()))
            .filter(|n| !ctx.baseline.contains_key(&n.bssid))
            .map(|network| {
                Threat::new(
                    ThreatSeverity::Critical,
                    ThreatCategory::RogueAp,
                    format!(
                        "Unknown AP '{}' broadcasting trusted SSID '{}'",
                        network.bssid, network.ssid
                    ),
                    vec![network.clone()],
                )
            })
            .collect()
    }
}

// ============================================================================
// CHANNEL ANOMALY
// ============================================================================

/// Channel hopping across recent scans and non-standard 2.4 GHz channels
#[derive(Debug, Clone, Copy)]
pub struct ChannelAnomalyRule {
    hop_threshold: usize,
}

impl ChannelAnomalyRule {
    pub fn new(hop_threshold: usize) -> Self {
        Self { hop_threshold }
    }

    pub fn hop_threshold(&self) -> usize {
        self.hop_threshold
    }

    fn hopping_channels(&self, history: &[Network]) -> Option<BTreeSet<u32>> {
        if self.hop_threshold == 0 || history.len() < self.hop_threshold {
            return None;
        }
        let recent = &history[history.len() - self.hop_threshold..];
        let channels: BTreeSet<u32> = recent.iter().map(|n| n.channel).collect();
        (channels.len() >= self.hop_threshold).then_some(channels)
    }
}

impl Default for ChannelAnomalyRule {
    fn default() -> Self {
        Self::new(DEFAULT_HOP_THRESHOLD)
    }
}

impl Rule for ChannelAnomalyRule {
    fn name(&self) -> &'static str {
        "channel_anomaly"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Threat> {
        let mut threats = Vec::new();

        for network in ctx.networks {
            let hops = ctx
                .history
                .get(&network.bssid)
                .and_then(|h| self.hopping_channels(h));
            if let Some(channels) = hops {
                let list: Vec<String> = channels.iter().map(|c| c.to_string()).collect();
                threats.push(Threat::new(
                    ThreatSeverity::Medium,
                    ThreatCategory::ChannelAnomaly,
                    format!("Network '{}' hopping channels: [{}]", network.ssid, list.join(", ")),
                    vec![network.clone()],
                ));
            }

            if network.band() == Band::TwoPointFourGhz
                && network.channel > 0
                && !PREFERRED_24GHZ_CHANNELS.contains(&network.channel)
            {
                threats.push(Threat::new(
                    ThreatSeverity::Low,
                    ThreatCategory::ChannelAnomaly,
                    format!(
                        "Network '{}' on non-standard channel {}",
                        network.ssid, network.channel
                    ),
                    vec![network.clone()],
                ));
            }
        }
        threats
    }
}

// ============================================================================
// HIDDEN NETWORK
// ============================================================================

/// Hidden SSIDs that are not baselined
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenNetworkRule;

impl Rule for HiddenNetworkRule {
    fn name(&self) -> &'static str {
        "hidden_network"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Threat> {
        ctx.networks
            .iter()
            .filter(|n| n.is_hidden() && !ctx.baseline.contains_key(&n.bssid))
            .map(|network| {
                Threat::new(
                    ThreatSeverity::Low,
                    ThreatCategory::HiddenNetwork,
                    format!("Hidden network detected: {} ({})", network.bssid, network.vendor),
                    vec![network.clone()],
                )
            })
            .collect()
    }
}
