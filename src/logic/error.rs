//! Error Types
//!
//! Errors only exist at the edges of the core: running an external scan tool
//! and loading configuration. Parsers, rules and the detector degrade to
//! "no findings" instead of failing.

// ============================================================================
// SCAN ERRORS
// ============================================================================

/// Failure of a single backend tool invocation.
///
/// `Scanner::scan` never returns this to its caller; it is turned into a
/// warning on the `ScanResult` and an empty network list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The tool binary is not installed / not on PATH
    CommandNotFound { program: String },
    /// The tool did not finish within the allotted time
    Timeout { program: String, timeout_secs: u64 },
    /// The tool exited with a non-zero status
    CommandFailed { program: String, exit_code: i32, stderr: String },
    /// Spawning or reading from the process failed
    Io { program: String, message: String },
    /// No scanning support for this operating system
    UnsupportedPlatform { platform: String },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::CommandNotFound { program } => {
                write!(f, "Command '{}' not found", program)
            }
            ScanError::Timeout { program, timeout_secs } => {
                write!(f, "Command '{}' timed out after {}s", program, timeout_secs)
            }
            ScanError::CommandFailed { program, exit_code, stderr } => {
                write!(f, "Command '{}' failed ({}): {}", program, exit_code, stderr)
            }
            ScanError::Io { program, message } => {
                write!(f, "I/O error running '{}': {}", program, message)
            }
            ScanError::UnsupportedPlatform { platform } => {
                write!(f, "WiFi scanning is not supported on {}", platform)
            }
        }
    }
}

impl std::error::Error for ScanError {}

// ============================================================================
// CONFIG ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File could not be read
    Io { path: String, message: String },
    /// File content is not valid config JSON
    Parse { path: String, message: String },
    /// A value is out of its allowed range
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "Cannot read config {}: {}", path, message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Invalid config {}: {}", path, message)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
