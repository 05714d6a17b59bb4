use std::collections::{HashMap, HashSet};

use super::detector::{SharedDetector, ThreatDetector};
use super::rules::*;
use super::types::{ThreatCategory, ThreatSeverity};
use crate::logic::config::SecurityConfig;
use crate::logic::network::{Network, ScanResult, SecurityType};

fn net(ssid: &str, bssid: &str) -> Network {
    Network::new(ssid, bssid)
        .with_channel(6)
        .with_rssi(-50)
        .with_security(SecurityType::Wpa2)
}

fn scan(networks: Vec<Network>) -> ScanResult {
    ScanResult::new(networks, "test", "linux")
}

fn evaluate(rule: &dyn Rule, networks: &[Network]) -> Vec<super::Threat> {
    let baseline = HashMap::new();
    let history = HashMap::new();
    rule.evaluate(&RuleContext { networks, baseline: &baseline, history: &history })
}

// ============================================================================
// WEAK ENCRYPTION
// ============================================================================

#[test]
fn test_weak_encryption_open_only() {
    let open = net("Cafe", "00:00:00:00:00:01").with_security(SecurityType::Open);
    let secure = net("Home", "00:00:00:00:00:02");

    let threats = evaluate(&WeakEncryptionRule, &[open.clone(), secure]);
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].severity, ThreatSeverity::High);
    assert_eq!(threats[0].category, ThreatCategory::WeakEncryption);
    assert_eq!(threats[0].networks, vec![open]);
    assert!(threats[0].description.contains("Cafe"));
}

#[test]
fn test_weak_encryption_names_mechanism() {
    let networks = vec![
        net("A", "00:00:00:00:00:01").with_security(SecurityType::Wep),
        net("B", "00:00:00:00:00:02").with_security(SecurityType::Wpa),
        net("C", "00:00:00:00:00:03").with_security(SecurityType::Unknown),
        net("D", "00:00:00:00:00:04").with_security(SecurityType::Wpa3Enterprise),
    ];
    let threats = evaluate(&WeakEncryptionRule, &networks);
    assert_eq!(threats.len(), 2);
    assert!(threats[0].description.contains("WEP"));
    assert!(threats[1].description.contains("WPA"));
}

// ============================================================================
// SSID SPOOFING
// ============================================================================

#[test]
fn test_spoofing_different_vendors_critical() {
    let networks = vec![
        net("Cafe", "00:00:00:00:00:01").with_vendor("Cisco"),
        net("Cafe", "00:00:00:00:00:02").with_vendor("Netgear"),
    ];
    let threats = evaluate(&SsidSpoofingRule, &networks);
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].severity, ThreatSeverity::Critical);
    assert_eq!(threats[0].networks.len(), 2);
}

#[test]
fn test_spoofing_three_same_vendor_low() {
    let networks = vec![
        net("Cafe", "00:00:00:00:00:01").with_vendor("Netgear"),
        net("Cafe", "00:00:00:00:00:02").with_vendor("Netgear"),
        net("Cafe", "00:00:00:00:00:03").with_vendor("Netgear"),
    ];
    let threats = evaluate(&SsidSpoofingRule, &networks);
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].severity, ThreatSeverity::Low);
    assert_eq!(threats[0].networks.len(), 3);
}

#[test]
fn test_spoofing_two_same_vendor_benign() {
    let networks = vec![
        net("Cafe", "00:00:00:00:00:01").with_vendor("Netgear"),
        net("Cafe", "00:00:00:00:00:02").with_vendor("Netgear"),
    ];
    assert!(evaluate(&SsidSpoofingRule, &networks).is_empty());
}

#[test]
fn test_spoofing_unknown_vendor_not_counted() {
    let networks = vec![
        net("Cafe", "00:00:00:00:00:01").with_vendor("Netgear"),
        net("Cafe", "00:00:00:00:00:02"),
    ];
    assert!(evaluate(&SsidSpoofingRule, &networks).is_empty());
}

#[test]
fn test_spoofing_one_threat_per_group_and_empty_ssid_ignored() {
    let mut networks: Vec<Network> = (1..=5)
        .map(|i| net("Mall", &format!("00:00:00:00:00:0{}", i)).with_vendor(if i % 2 == 0 { "Cisco" } else { "Aruba" }))
        .collect();
    networks.push(net("", "00:00:00:00:01:01").with_vendor("Cisco"));
    networks.push(net("", "00:00:00:00:01:02").with_vendor("Aruba"));

    let threats = evaluate(&SsidSpoofingRule, &networks);
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].networks.len(), 5);
}

#[test]
fn test_spoofing_whitespace_ssid_is_grouped() {
    let networks = vec![
        net(" ", "00:00:00:00:00:01").with_vendor("Cisco"),
        net(" ", "00:00:00:00:00:02").with_vendor("Netgear"),
    ];
    let threats = evaluate(&SsidSpoofingRule, &networks);
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].severity, ThreatSeverity::Critical);
    assert_eq!(threats[0].networks.len(), 2);
}

// ============================================================================
// ROGUE AP
// ============================================================================

fn corp_baseline() -> HashMap<String, Network> {
    let trusted = net("Corp", "AA:AA:AA:AA:AA:AA");
    HashMap::from([(trusted.bssid.clone(), trusted)])
}

#[test]
fn test_rogue_ap_empty_baseline_noop() {
    let networks = vec![net("Corp", "BB:BB:BB:BB:BB:BB"), net("", "CC:CC:CC:CC:CC:CC")];
    assert!(evaluate(&RogueApRule, &networks).is_empty());
}

#[test]
fn test_rogue_ap_unknown_bssid_trusted_ssid() {
    let baseline = corp_baseline();
    let history = HashMap::new();
    let networks = vec![
        net("Corp", "BB:BB:BB:BB:BB:BB"),
        net("Corp", "AA:AA:AA:AA:AA:AA"),
        net("Other", "DD:DD:DD:DD:DD:DD"),
    ];

    let threats = RogueApRule.evaluate(&RuleContext {
        networks: &networks,
        baseline: &baseline,
        history: &history,
    });
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].severity, ThreatSeverity::Critical);
    assert_eq!(threats[0].category, ThreatCategory::RogueAp);
    assert_eq!(threats[0].networks[0].bssid, "BB:BB:BB:BB:BB:BB");
}

// ============================================================================
// CHANNEL ANOMALY
// ============================================================================

#[test]
fn test_channel_hopping_medium() {
    let bssid = "00:00:00:00:00:01";
    let observations = vec![
        net("Hop", bssid).with_channel(1),
        net("Hop", bssid).with_channel(6),
        net("Hop", bssid).with_channel(11),
    ];
    let history = HashMap::from([(bssid.to_string(), observations.clone())]);
    let baseline = HashMap::new();
    let current = vec![observations[2].clone()];

    let threats = ChannelAnomalyRule::new(3).evaluate(&RuleContext {
        networks: &current,
        baseline: &baseline,
        history: &history,
    });
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].severity, ThreatSeverity::Medium);
    assert!(threats[0].description.contains("[1, 6, 11]"));
}

#[test]
fn test_channel_non_standard_low_with_stable_history() {
    let bssid = "00:00:00:00:00:04";
    let stable = vec![net("Odd", bssid).with_channel(4); 5];
    let history = HashMap::from([(bssid.to_string(), stable.clone())]);
    let baseline = HashMap::new();

    let threats = ChannelAnomalyRule::default().evaluate(&RuleContext {
        networks: &stable[..1],
        baseline: &baseline,
        history: &history,
    });
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].severity, ThreatSeverity::Low);
    assert!(threats[0].description.contains("channel 4"));
}

#[test]
fn test_channel_both_checks_fire() {
    let bssid = "00:00:00:00:00:05";
    let observations = vec![
        net("Both", bssid).with_channel(1),
        net("Both", bssid).with_channel(6),
        net("Both", bssid).with_channel(3),
    ];
    let history = HashMap::from([(bssid.to_string(), observations.clone())]);
    let baseline = HashMap::new();
    let current = vec![observations[2].clone()];

    let threats = ChannelAnomalyRule::new(3).evaluate(&RuleContext {
        networks: &current,
        baseline: &baseline,
        history: &history,
    });
    let severities: Vec<ThreatSeverity> = threats.iter().map(|t| t.severity).collect();
    assert_eq!(severities, vec![ThreatSeverity::Medium, ThreatSeverity::Low]);
}

#[test]
fn test_channel_5ghz_and_unknown_ignored() {
    let networks = vec![
        net("Fast", "00:00:00:00:00:06").with_channel(36),
        Network::new("Unparsed", "00:00:00:00:00:07"),
    ];
    assert!(evaluate(&ChannelAnomalyRule::default(), &networks).is_empty());
}

#[test]
fn test_channel_short_history_no_hop() {
    let bssid = "00:00:00:00:00:08";
    let history = HashMap::from([(
        bssid.to_string(),
        vec![net("New", bssid).with_channel(1), net("New", bssid).with_channel(11)],
    )]);
    let baseline = HashMap::new();
    let current = vec![net("New", bssid).with_channel(11)];

    let threats = ChannelAnomalyRule::new(3).evaluate(&RuleContext {
        networks: &current,
        baseline: &baseline,
        history: &history,
    });
    assert!(threats.is_empty());
}

// ============================================================================
// HIDDEN NETWORK
// ============================================================================

#[test]
fn test_hidden_network_unless_baselined() {
    let hidden = net("", "AA:AA:AA:AA:AA:AA");
    let whitespace = net("  ", "BB:BB:BB:BB:BB:BB");
    let networks = vec![hidden.clone(), whitespace];

    let threats = evaluate(&HiddenNetworkRule, &networks);
    assert_eq!(threats.len(), 2);
    assert!(threats.iter().all(|t| t.severity == ThreatSeverity::Low));

    let baseline = HashMap::from([(hidden.bssid.clone(), hidden)]);
    let history = HashMap::new();
    let threats = HiddenNetworkRule.evaluate(&RuleContext {
        networks: &networks,
        baseline: &baseline,
        history: &history,
    });
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].networks[0].bssid, "BB:BB:BB:BB:BB:BB");
}

// ============================================================================
// DETECTOR
// ============================================================================

#[test]
fn test_analyze_rule_order() {
    let mut detector = ThreatDetector::new();
    detector.set_baseline(vec![net("Corp", "AA:AA:AA:AA:AA:AA")]);

    let result = scan(vec![
        net("", "00:00:00:00:00:09").with_channel(6),
        net("Corp", "BB:BB:BB:BB:BB:BB").with_channel(3),
        net("Open", "00:00:00:00:00:0A").with_security(SecurityType::Open),
    ]);

    let categories: Vec<ThreatCategory> = detector.analyze(&result).iter().map(|t| t.category).collect();
    assert_eq!(
        categories,
        vec![
            ThreatCategory::WeakEncryption,
            ThreatCategory::RogueAp,
            ThreatCategory::ChannelAnomaly,
            ThreatCategory::HiddenNetwork,
        ]
    );
}

#[test]
fn test_analyze_twice_fresh_ids() {
    let mut detector = ThreatDetector::new();
    let result = scan(vec![
        net("Cafe", "00:00:00:00:00:01").with_security(SecurityType::Open),
        net("", "00:00:00:00:00:02"),
    ]);

    let first = detector.analyze(&result);
    let second = detector.analyze(&result);

    assert_eq!(first.len(), second.len());
    let first_ids: HashSet<&str> = first.iter().map(|t| t.id.as_str()).collect();
    let second_ids: HashSet<&str> = second.iter().map(|t| t.id.as_str()).collect();
    assert!(first_ids.is_disjoint(&second_ids));

    let describe = |threats: &[super::Threat]| -> Vec<(ThreatSeverity, ThreatCategory, String)> {
        threats.iter().map(|t| (t.severity, t.category, t.description.clone())).collect()
    };
    assert_eq!(describe(&first), describe(&second));
    assert_eq!(detector.all_threats().len(), first.len() * 2);
}

#[test]
fn test_history_accumulates_and_detects_hopping() {
    let mut detector = ThreatDetector::new();
    let bssid = "00:00:00:00:00:01";

    for ch in [1, 6] {
        let threats = detector.analyze(&scan(vec![net("Hop", bssid).with_channel(ch)]));
        assert!(threats.iter().all(|t| t.category != ThreatCategory::ChannelAnomaly));
    }
    let threats = detector.analyze(&scan(vec![net("Hop", bssid).with_channel(11)]));
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0].severity, ThreatSeverity::Medium);
    assert_eq!(detector.history_for(bssid).len(), 3);
}

#[test]
fn test_history_limit_evicts_oldest() {
    let mut detector = ThreatDetector::new().with_history_limit(2);
    let bssid = "00:00:00:00:00:01";
    for ch in [1, 6, 11] {
        detector.analyze(&scan(vec![net("Hop", bssid).with_channel(ch)]));
    }
    let history = detector.history_for(bssid);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].channel, 6);
    assert_eq!(history[1].channel, 11);
}

#[test]
fn test_summary_all_keys_and_unresolved_only() {
    let mut detector = ThreatDetector::new();
    let empty = detector.get_threat_summary();
    assert_eq!(empty.len(), 4);
    assert!(empty.values().all(|&c| c == 0));

    let threats = detector.analyze(&scan(vec![
        net("Cafe", "00:00:00:00:00:01").with_security(SecurityType::Open),
        net("", "00:00:00:00:00:02"),
    ]));
    assert_eq!(threats.len(), 2);

    assert!(detector.resolve_threat(&threats[0].id));
    let summary = detector.get_threat_summary();
    assert_eq!(summary.len(), 4);
    assert_eq!(summary[&ThreatSeverity::High], 0);
    assert_eq!(summary[&ThreatSeverity::Low], 1);
    assert_eq!(summary.values().sum::<usize>(), detector.get_active_threats().len());
}

#[test]
fn test_resolve_lifecycle() {
    let mut detector = ThreatDetector::new();
    let threats = detector.analyze(&scan(vec![net("", "00:00:00:00:00:02")]));
    let id = threats[0].id.clone();

    assert!(!detector.resolve_threat("nope"));
    assert!(detector.resolve_threat(&id));
    assert!(detector.get_threat(&id).unwrap().resolved);
    assert!(detector.get_active_threats().is_empty());

    // Recurrence is a new threat, not a reopened one
    let again = detector.analyze(&scan(vec![net("", "00:00:00:00:00:02")]));
    assert_ne!(again[0].id, id);
    assert!(detector.get_threat(&id).unwrap().resolved);
    assert_eq!(detector.get_active_threats().len(), 1);
}

#[test]
fn test_active_threats_in_detection_order() {
    let mut detector = ThreatDetector::new();
    let a = detector.analyze(&scan(vec![net("", "00:00:00:00:00:01")]));
    let b = detector.analyze(&scan(vec![net("", "00:00:00:00:00:02")]));
    let active: Vec<String> = detector.get_active_threats().into_iter().map(|t| t.id).collect();
    assert_eq!(active, vec![a[0].id.clone(), b[0].id.clone()]);
}

#[test]
fn test_clear_history_keeps_baseline() {
    let mut detector = ThreatDetector::new();
    detector.set_baseline(vec![net("Corp", "AA:AA:AA:AA:AA:AA")]);
    detector.analyze(&scan(vec![net("Corp", "BB:BB:BB:BB:BB:BB")]));
    assert!(!detector.all_threats().is_empty());

    detector.clear_history();
    assert!(detector.all_threats().is_empty());
    assert_eq!(detector.tracked_bssids(), 0);
    assert!(detector.is_baselined("AA:AA:AA:AA:AA:AA"));

    let threats = detector.analyze(&scan(vec![net("Corp", "BB:BB:BB:BB:BB:BB")]));
    assert_eq!(threats[0].category, ThreatCategory::RogueAp);
}

#[test]
fn test_baseline_set_replaces_add_upserts() {
    let mut detector = ThreatDetector::new();
    detector.set_baseline(vec![net("A", "00:00:00:00:00:01"), net("B", "00:00:00:00:00:02")]);
    detector.set_baseline(vec![net("C", "00:00:00:00:00:03")]);
    assert_eq!(detector.baseline().len(), 1);

    detector.add_baseline_network(net("C2", "00:00:00:00:00:03"));
    detector.add_baseline_network(net("D", "00:00:00:00:00:04"));
    assert_eq!(detector.baseline().len(), 2);
    assert_eq!(detector.baseline()["00:00:00:00:00:03"].ssid, "C2");
}

#[test]
fn test_rule_toggle() {
    let mut detector = ThreatDetector::new();
    assert_eq!(
        detector.rule_names(),
        vec!["weak_encryption", "ssid_spoofing", "rogue_ap", "channel_anomaly", "hidden_network"]
    );

    assert!(detector.set_rule_enabled("hidden_network", false));
    assert!(!detector.set_rule_enabled("no_such_rule", false));
    assert!(!detector.is_rule_enabled("hidden_network"));

    let threats = detector.analyze(&scan(vec![net("", "00:00:00:00:00:02")]));
    assert!(threats.is_empty());
}

#[test]
fn test_from_config() {
    let config = SecurityConfig {
        rules_enabled: vec!["weak_encryption".to_string()],
        hop_threshold: 2,
        max_history_per_bssid: Some(4),
        ..Default::default()
    };
    let detector = ThreatDetector::from_config(&config);
    assert!(detector.is_rule_enabled("weak_encryption"));
    assert!(!detector.is_rule_enabled("rogue_ap"));
    assert_eq!(detector.rule_names().len(), 5);
}

#[test]
fn test_analyze_and_attach() {
    let mut detector = ThreatDetector::new();
    let mut result = scan(vec![net("Cafe", "00:00:00:00:00:01").with_security(SecurityType::Wep)]);
    let count = detector.analyze_and_attach(&mut result);
    assert_eq!(count, 1);
    assert_eq!(result.threat_count(), 1);
    assert_eq!(result.threats[0].category, ThreatCategory::WeakEncryption);
}

#[test]
fn test_shared_detector_across_threads() {
    let shared = SharedDetector::new(ThreatDetector::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let detector = shared.clone();
            std::thread::spawn(move || {
                let bssid = format!("00:00:00:00:01:0{}", i);
                detector.analyze(&scan(vec![net("", &bssid)])).len()
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 4);
    assert_eq!(shared.get_active_threats().len(), 4);
    assert_eq!(shared.lock().tracked_bssids(), 4);
}
