use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use airguard::constants::APP_NAME;
use airguard::logic::config::AppConfig;
use airguard::logic::network::{OuiDatabase, ScanResult};
use airguard::logic::scanner::{
    detect_backend, probe, run_continuous, Backend, CommandScanner, Platform, Scanner, SystemRunner,
};
use airguard::logic::threat::{Threat, ThreatDetector, ThreatSeverity};

#[derive(Parser)]
#[command(name = "airguard")]
#[command(author, version, about = "WiFi scanner with rogue AP and weak encryption detection")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one scan and one detection pass
    Scan {
        /// Force a backend (nmcli, iw, iwlist, wpa_cli, netsh)
        #[arg(short, long)]
        backend: Option<Backend>,

        /// Wireless interface
        #[arg(short, long)]
        interface: Option<String>,

        /// Scan timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Scan continuously, reporting new threats each round
    Watch {
        /// Seconds between scan starts
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop after this many scans
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Trust every network seen in the first scan
        #[arg(long)]
        trust_first_scan: bool,

        /// Output as JSON (one document per scan)
        #[arg(short, long)]
        json: bool,
    },

    /// Parse captured tool output from a file
    Parse {
        /// Dialect of the captured output
        #[arg(short, long)]
        backend: Backend,

        /// File holding the tool's stdout
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List scan backends for this platform
    Backends,
}

pub fn run_command(cli: Cli) -> Result<()> {
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::load_or_default(None),
    };
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Scan {
            backend,
            interface,
            timeout,
            json,
        } => cmd_scan(&config, backend, interface, timeout, json),
        Commands::Watch {
            interval,
            count,
            trust_first_scan,
            json,
        } => cmd_watch(&config, interval, count, trust_first_scan, json),
        Commands::Parse { backend, file, json } => cmd_parse(&config, backend, file, json),
        Commands::Backends => cmd_backends(),
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

fn cmd_scan(
    config: &AppConfig,
    backend: Option<Backend>,
    interface: Option<String>,
    timeout: Option<u64>,
    json: bool,
) -> Result<()> {
    let scanner = build_scanner(config, backend, interface)?;
    let timeout = Duration::from_secs(timeout.unwrap_or(config.scan.timeout_seconds));
    let trusted = config.security.trusted_bssids();

    let mut result = scanner.scan(timeout);
    let mut detector = ThreatDetector::from_config(&config.security);
    trust_configured(&mut detector, &trusted, &result);
    detector.analyze_and_attach(&mut result);

    report(&result, config.scan.min_signal_dbm, json)
}

fn cmd_watch(
    config: &AppConfig,
    interval: Option<u64>,
    count: Option<usize>,
    trust_first_scan: bool,
    json: bool,
) -> Result<()> {
    let scanner = build_scanner(config, None, None)?;
    let interval = Duration::from_secs(interval.unwrap_or(config.scan.interval_seconds));
    let timeout = Duration::from_secs(config.scan.timeout_seconds);
    let trusted = config.security.trusted_bssids();

    let mut detector = ThreatDetector::from_config(&config.security);
    let stop = AtomicBool::new(false);
    let mut iteration = 0usize;

    run_continuous(&scanner, interval, timeout, &stop, |mut result| {
        iteration += 1;
        if trust_first_scan && iteration == 1 {
            detector.set_baseline(result.networks.clone());
        }
        trust_configured(&mut detector, &trusted, &result);
        let new_threats = detector.analyze_and_attach(&mut result);

        if json {
            match result.to_json() {
                Ok(doc) => println!("{}", doc),
                Err(e) => log::error!("Failed to encode scan #{}: {}", iteration, e),
            }
        } else {
            println!(
                "--- Scan #{} at {}: {} networks, {} new threats",
                iteration,
                result.scan_time.format("%H:%M:%S"),
                result.network_count(),
                new_threats
            );
            for warning in &result.warnings {
                println!("  ! {}", warning);
            }
            print_threats(&result.threats);
            print_summary(&detector.get_threat_summary());
        }

        if count.is_some_and(|c| iteration >= c) {
            stop.store(true, Ordering::SeqCst);
        }
    });
    Ok(())
}

fn cmd_parse(config: &AppConfig, backend: Backend, file: PathBuf, json: bool) -> Result<()> {
    let raw = fs::read(&file).with_context(|| format!("Cannot read {}", file.display()))?;
    let vendors = OuiDatabase::new();
    let networks = backend.parser().parse_bytes(&raw, &vendors);
    log::info!("Parsed {} networks from {}", networks.len(), file.display());

    let mut result = ScanResult::new(
        networks,
        &format!("File ({})", backend),
        Platform::current().as_str(),
    );
    let mut detector = ThreatDetector::from_config(&config.security);
    trust_configured(&mut detector, &config.security.trusted_bssids(), &result);
    detector.analyze_and_attach(&mut result);

    report(&result, config.scan.min_signal_dbm, json)
}

fn cmd_backends() -> Result<()> {
    let platform = Platform::current();
    let runner = SystemRunner;
    let backends = Backend::priority(platform);
    println!("{} {} on {}", APP_NAME, airguard::constants::APP_VERSION, platform);

    if backends.is_empty() {
        println!("  (no scan backends for this platform)");
        return Ok(());
    }
    for backend in backends {
        let available = probe(&runner, *backend);
        println!(
            "  {:<8} {:<10} {}",
            backend.as_str(),
            if available { "available" } else { "missing" },
            if backend.requires_privileges() { "needs root" } else { "" }
        );
    }
    match detect_backend(&runner, platform) {
        Ok(backend) => println!("Auto-detect picks: {}", backend),
        Err(e) => println!("Auto-detect: {}", e),
    }
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn build_scanner(
    config: &AppConfig,
    backend: Option<Backend>,
    interface: Option<String>,
) -> Result<CommandScanner> {
    let backend = backend.or(config.scan.backend);
    let interface = interface.or_else(|| config.scan.interface.clone());
    CommandScanner::auto_detect(backend, interface, Arc::new(SystemRunner))
        .context("No usable WiFi scan backend")
}

/// Configured BSSIDs join the baseline the first time they are seen
fn trust_configured(detector: &mut ThreatDetector, trusted: &[String], result: &ScanResult) {
    for network in &result.networks {
        if trusted.contains(&network.bssid) && !detector.is_baselined(&network.bssid) {
            detector.add_baseline_network(network.clone());
        }
    }
}

fn report(result: &ScanResult, min_signal_dbm: i32, json: bool) -> Result<()> {
    if json {
        println!("{}", result.to_json()?);
    } else {
        print_networks(result, min_signal_dbm);
        print_threats(&result.threats);
    }
    Ok(())
}

fn print_networks(result: &ScanResult, min_signal_dbm: i32) {
    println!(
        "{} - {} networks via {} ({:.1}s)",
        APP_NAME,
        result.network_count(),
        result.scanner_type,
        result.duration_seconds
    );
    for warning in &result.warnings {
        println!("  ! {}", warning);
    }

    println!(
        "{:<32} {:<17} {:>4} {:>5} {:>5} {:<16} {}",
        "SSID", "BSSID", "CH", "MHz", "dBm", "SECURITY", "VENDOR"
    );
    for network in result
        .networks_by_signal(true)
        .into_iter()
        .filter(|n| n.rssi_dbm >= min_signal_dbm)
    {
        let ssid = if network.is_hidden() { "<hidden>" } else { network.ssid.as_str() };
        println!(
            "{:<32} {:<17} {:>4} {:>5} {:>5} {:<16} {}",
            ssid,
            network.bssid,
            network.channel,
            network.frequency_mhz,
            network.rssi_dbm,
            network.security.as_str(),
            network.vendor
        );
    }
}

fn print_threats(threats: &[Threat]) {
    if threats.is_empty() {
        println!("No threats detected");
        return;
    }
    for threat in threats {
        println!(
            "[{:<8}] {} {} ({})",
            threat.severity.as_str().to_uppercase(),
            threat.id,
            threat.description,
            threat.category
        );
    }
}

fn print_summary(summary: &BTreeMap<ThreatSeverity, usize>) {
    let parts: Vec<String> = summary
        .iter()
        .rev()
        .map(|(severity, count)| format!("{}={}", severity, count))
        .collect();
    println!("Active: {}", parts.join(" "));
}
