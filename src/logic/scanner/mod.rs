//! Scanner Module
//!
//! One scan cycle = run a backend tool, parse its output, wrap the records
//! in a timestamped `ScanResult`.
//!
//! ## Structure
//! - `backend`: Backend / Platform registry and tool command lines
//! - `runner`: process execution with a hard timeout
//! - `command`: `CommandScanner`, the tool-backed `Scanner`
//! - `detect`: backend + interface auto-detection
//! - `continuous`: fixed-interval scan loop
//!
//! ## Usage
//! ```ignore
//! use airguard::logic::scanner::{CommandScanner, Scanner, SystemRunner};
//!
//! let scanner = CommandScanner::auto_detect(None, None, Arc::new(SystemRunner))?;
//! let result = scanner.scan(Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::logic::network::ScanResult;

pub mod backend;
pub mod command;
pub mod continuous;
pub mod detect;
pub mod runner;

pub use backend::{Backend, CommandSpec, Platform};
pub use command::CommandScanner;
pub use continuous::{run_continuous, spawn_continuous, ContinuousHandle};
pub use detect::{detect_backend, detect_interface, probe};
pub use runner::{CommandRunner, ProcessOutput, SystemRunner};

/// A source of scan snapshots.
///
/// `scan` never fails: tool errors are reported as an empty network list
/// plus `ScanResult::warnings`. A single scanner must not be scanned
/// concurrently with itself.
pub trait Scanner: Send + Sync {
    fn name(&self) -> String;

    fn platform(&self) -> &str;

    fn scan(&self, timeout: Duration) -> ScanResult;

    /// Cheap presence probe, bounded by a few seconds. Not a scan.
    fn is_available(&self) -> bool;
}
