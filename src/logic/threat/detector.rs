//! Threat Detector
//!
//! Stateful engine: holds the operator baseline, per-BSSID observation
//! history and every threat produced so far. One instance per session;
//! nothing is persisted.
//!
//! Threat lifecycle: Open -> Resolved. A recurrence is a new threat with a
//! fresh id, never a reopened one.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::logic::config::SecurityConfig;
use crate::logic::network::{Network, ScanResult};

use super::rules::{self, Rule, RuleContext};
use super::types::{new_threat_id, Threat, ThreatSeverity};

struct RuleSlot {
    rule: Box<dyn Rule>,
    enabled: bool,
}

pub struct ThreatDetector {
    rules: Vec<RuleSlot>,
    baseline: HashMap<String, Network>,
    history: HashMap<String, Vec<Network>>,
    /// Insertion order
    threats: Vec<Threat>,
    /// id -> position in `threats`
    threat_index: HashMap<String, usize>,
    /// `None` = unbounded
    history_limit: Option<usize>,
}

impl Default for ThreatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatDetector {
    /// Detector with the five default rules, all enabled
    pub fn new() -> Self {
        Self::with_rules(rules::default_rules())
    }

    /// Rules run in the given order
    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| RuleSlot { rule, enabled: true })
                .collect(),
            baseline: HashMap::new(),
            history: HashMap::new(),
            threats: Vec::new(),
            threat_index: HashMap::new(),
            history_limit: None,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        let mut detector = Self::with_rules(rules::rules_with_hop_threshold(config.hop_threshold));
        for slot in &mut detector.rules {
            slot.enabled = config.rules_enabled.iter().any(|r| r == slot.rule.name());
        }
        detector.history_limit = config.max_history_per_bssid;
        detector
    }

    /// Cap history per BSSID, evicting the oldest observations
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    // ========================================================================
    // BASELINE
    // ========================================================================

    /// Replace the baseline wholesale, keyed by BSSID
    pub fn set_baseline(&mut self, networks: Vec<Network>) {
        self.baseline = networks.into_iter().map(|n| (n.bssid.clone(), n)).collect();
        log::info!("Baseline set: {} networks", self.baseline.len());
    }

    /// Insert or replace one baseline entry
    pub fn add_baseline_network(&mut self, network: Network) {
        log::debug!("Baseline add: {} ({})", network.bssid, network.ssid);
        self.baseline.insert(network.bssid.clone(), network);
    }

    pub fn baseline(&self) -> &HashMap<String, Network> {
        &self.baseline
    }

    pub fn is_baselined(&self, bssid: &str) -> bool {
        self.baseline.contains_key(bssid)
    }

    // ========================================================================
    // ANALYSIS
    // ========================================================================

    /// Record the scan in history, run every enabled rule in order and
    /// store the produced threats. Returns only this call's threats.
    pub fn analyze(&mut self, result: &ScanResult) -> Vec<Threat> {
        for network in &result.networks {
            let entries = self.history.entry(network.bssid.clone()).or_default();
            entries.push(network.clone());
            if let Some(limit) = self.history_limit {
                if entries.len() > limit {
                    let excess = entries.len() - limit;
                    entries.drain(..excess);
                }
            }
        }

        let ctx = RuleContext {
            networks: &result.networks,
            baseline: &self.baseline,
            history: &self.history,
        };

        let mut produced = Vec::new();
        for slot in self.rules.iter().filter(|s| s.enabled) {
            let found = slot.rule.evaluate(&ctx);
            log::debug!("Rule {}: {} threats", slot.rule.name(), found.len());
            produced.extend(found);
        }

        for threat in &mut produced {
            // Ids are short; make sure an insert never overwrites
            while self.threat_index.contains_key(&threat.id) {
                threat.id = new_threat_id();
            }
            self.threat_index.insert(threat.id.clone(), self.threats.len());
            self.threats.push(threat.clone());
        }

        produced
    }

    /// `analyze`, then store the threats on the scan result
    pub fn analyze_and_attach(&mut self, result: &mut ScanResult) -> usize {
        let threats = self.analyze(result);
        let count = threats.len();
        result.attach_threats(threats);
        count
    }

    // ========================================================================
    // THREAT TABLE
    // ========================================================================

    /// Unresolved threat counts; all four severities always present
    pub fn get_threat_summary(&self) -> BTreeMap<ThreatSeverity, usize> {
        let mut summary: BTreeMap<ThreatSeverity, usize> =
            ThreatSeverity::ALL.iter().map(|s| (*s, 0)).collect();
        for threat in self.threats.iter().filter(|t| t.is_active()) {
            *summary.entry(threat.severity).or_insert(0) += 1;
        }
        summary
    }

    /// Unresolved threats in detection order
    pub fn get_active_threats(&self) -> Vec<Threat> {
        self.threats.iter().filter(|t| t.is_active()).cloned().collect()
    }

    pub fn get_threat(&self, id: &str) -> Option<&Threat> {
        self.threat_index.get(id).and_then(|&i| self.threats.get(i))
    }

    /// Every threat since the last `clear_history`, resolved ones included
    pub fn all_threats(&self) -> &[Threat] {
        &self.threats
    }

    /// Mark a threat resolved. `false` if the id is unknown.
    pub fn resolve_threat(&mut self, id: &str) -> bool {
        let Some(&i) = self.threat_index.get(id) else {
            return false;
        };
        if let Some(threat) = self.threats.get_mut(i) {
            threat.resolved = true;
            log::info!("Threat {} resolved ({})", id, threat.category);
        }
        true
    }

    /// Drop history and threats; the baseline survives
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.threats.clear();
        self.threat_index.clear();
    }

    pub fn history_for(&self, bssid: &str) -> &[Network] {
        self.history.get(bssid).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tracked_bssids(&self) -> usize {
        self.history.len()
    }

    // ========================================================================
    // RULE MANAGEMENT
    // ========================================================================

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|s| s.rule.name()).collect()
    }

    pub fn is_rule_enabled(&self, name: &str) -> bool {
        self.rules
            .iter()
            .any(|s| s.enabled && s.rule.name() == name)
    }

    /// `false` if no rule has that name
    pub fn set_rule_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|s| s.rule.name() == name) {
            Some(slot) => {
                slot.enabled = enabled;
                log::info!("Rule {} {}", name, if enabled { "enabled" } else { "disabled" });
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// SHARED HANDLE
// ============================================================================

/// One detector shared across threads behind a single lock
#[derive(Clone, Default)]
pub struct SharedDetector {
    inner: Arc<Mutex<ThreatDetector>>,
}

impl SharedDetector {
    pub fn new(detector: ThreatDetector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(detector)),
        }
    }

    /// Direct access for multi-step operations under one lock
    pub fn lock(&self) -> MutexGuard<'_, ThreatDetector> {
        self.inner.lock()
    }

    pub fn analyze(&self, result: &ScanResult) -> Vec<Threat> {
        self.inner.lock().analyze(result)
    }

    pub fn analyze_and_attach(&self, result: &mut ScanResult) -> usize {
        self.inner.lock().analyze_and_attach(result)
    }

    pub fn resolve_threat(&self, id: &str) -> bool {
        self.inner.lock().resolve_threat(id)
    }

    pub fn clear_history(&self) {
        self.inner.lock().clear_history()
    }

    pub fn get_threat_summary(&self) -> BTreeMap<ThreatSeverity, usize> {
        self.inner.lock().get_threat_summary()
    }

    pub fn get_active_threats(&self) -> Vec<Threat> {
        self.inner.lock().get_active_threats()
    }
}
