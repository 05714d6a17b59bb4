//! Command-Backed Scanner
//!
//! Runs one backend tool per scan and feeds its stdout to the matching
//! parser. Tool failures become warnings on the `ScanResult`, never errors.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::PROBE_TIMEOUT_SECS;
use crate::logic::error::ScanError;
use crate::logic::network::{OuiDatabase, ScanResult, VendorLookup};

use super::backend::{Backend, Platform};
use super::detect;
use super::runner::{CommandRunner, SystemRunner};
use super::Scanner;

pub struct CommandScanner {
    backend: Backend,
    interface: String,
    platform: Platform,
    runner: Arc<dyn CommandRunner>,
    vendors: Arc<dyn VendorLookup>,
}

impl CommandScanner {
    /// Scanner for a fixed backend and interface on the current platform
    pub fn new(backend: Backend, interface: &str) -> Self {
        Self {
            backend,
            interface: interface.to_string(),
            platform: Platform::current(),
            runner: Arc::new(SystemRunner),
            vendors: Arc::new(OuiDatabase::new()),
        }
    }

    /// Pick backend and interface for this machine; explicit values win
    pub fn auto_detect(
        backend: Option<Backend>,
        interface: Option<String>,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, ScanError> {
        let platform = Platform::current();
        Self::auto_detect_on(platform, backend, interface, runner)
    }

    pub fn auto_detect_on(
        platform: Platform,
        backend: Option<Backend>,
        interface: Option<String>,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, ScanError> {
        let backend = match backend {
            Some(b) => b,
            None => detect::detect_backend(runner.as_ref(), platform)?,
        };
        let interface = interface.unwrap_or_else(|| detect::detect_interface(runner.as_ref(), platform));
        log::info!("Scanner: {} on {} ({})", backend, interface, platform);

        Ok(Self {
            backend,
            interface,
            platform,
            runner,
            vendors: Arc::new(OuiDatabase::new()),
        })
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_vendors(mut self, vendors: Arc<dyn VendorLookup>) -> Self {
        self.vendors = vendors;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    fn prepare(&self, deadline: Instant) {
        let Some(cmd) = self.backend.prepare_command(&self.interface) else {
            return;
        };

        match self.runner.run(cmd.program, &cmd.args, remaining(deadline)) {
            Ok(out) if out.success() => {}
            Ok(out) => log::warn!("'{}' did not succeed: {}", cmd, out.stderr_lossy()),
            Err(e) => log::warn!("'{}' failed: {}", cmd, e),
        }

        let settle = self.backend.settle_delay().min(remaining(deadline));
        if !settle.is_zero() {
            thread::sleep(settle);
        }
    }
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

impl Scanner for CommandScanner {
    fn name(&self) -> String {
        format!("{} ({})", self.platform.scanner_prefix(), self.backend)
    }

    fn platform(&self) -> &str {
        self.platform.as_str()
    }

    fn scan(&self, timeout: Duration) -> ScanResult {
        let started = Instant::now();
        let deadline = started + timeout;
        let mut warnings = Vec::new();

        self.prepare(deadline);

        let cmd = self.backend.scan_command(&self.interface);
        let networks = match self.runner.run(cmd.program, &cmd.args, remaining(deadline)) {
            Ok(out) => {
                if out.timed_out {
                    warnings.push(
                        ScanError::Timeout {
                            program: cmd.program.to_string(),
                            timeout_secs: timeout.as_secs(),
                        }
                        .to_string(),
                    );
                } else if out.exit_code != Some(0) {
                    warnings.push(
                        ScanError::CommandFailed {
                            program: cmd.program.to_string(),
                            exit_code: out.exit_code.unwrap_or(-1),
                            stderr: out.stderr_lossy(),
                        }
                        .to_string(),
                    );
                }
                // Partial or failed output is still parsed
                self.backend.parser().parse_bytes(&out.stdout, self.vendors.as_ref())
            }
            Err(e) => {
                warnings.push(e.to_string());
                Vec::new()
            }
        };

        for warning in &warnings {
            log::warn!("{}: {}", self.name(), warning);
        }

        let mut result = ScanResult::new(networks, &self.name(), self.platform.as_str())
            .with_duration(started.elapsed().as_secs_f64());
        result.warnings = warnings;
        result
    }

    fn is_available(&self) -> bool {
        if self.interface.is_empty() {
            return false;
        }
        let cmd = self.backend.probe_command();
        self.runner
            .run(cmd.program, &cmd.args, Duration::from_secs(PROBE_TIMEOUT_SECS))
            .map(|out| out.success())
            .unwrap_or(false)
    }
}
