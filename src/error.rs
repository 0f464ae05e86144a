//! Error handling for dc-firstboot.
//!
//! Centralized error types using thiserror. All library errors use these
//! types; the binary boundary wraps them in anyhow.

use thiserror::Error;

/// Main error type for first-boot orchestration
#[derive(Error, Debug)]
pub enum FirstbootError {
    /// IO errors (file operations, spawning commands)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, merging parameter sources)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (domain/realm/password/nameserver shape)
    #[error("Validation error: {0}")]
    Validation(String),

    /// External tool invocation failures (samba-tool, systemctl, kinit)
    #[error("Tool `{tool}` failed: {message}")]
    Tool { tool: String, message: String },

    /// Service manager failures (unit start/stop/restart)
    #[error("Service error: {0}")]
    Service(String),

    /// Readiness polling timed out before the unit became active
    #[error("Service `{unit}` not ready after {timeout_secs}s")]
    NotReady { unit: String, timeout_secs: u64 },

    /// Resolver head file rewrite failures
    #[error("Resolver error: {0}")]
    Resolver(String),

    /// Kerberos config / keytab handling failures
    #[error("Kerberos error: {0}")]
    Kerberos(String),

    /// Interactive dialog failures or user cancellation
    #[error("Dialog error: {0}")]
    Dialog(String),

    /// JSON serialization/deserialization errors (preseed file)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for first-boot operations
pub type Result<T> = std::result::Result<T, FirstbootError>;

// Convenient error constructors
impl FirstbootError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a tool invocation error
    pub fn tool(tool: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: msg.into(),
        }
    }

    /// Create a service error
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Create a resolver error
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::Resolver(msg.into())
    }

    /// Create a kerberos error
    pub fn kerberos(msg: impl Into<String>) -> Self {
        Self::Kerberos(msg.into())
    }

    /// Create a dialog error
    pub fn dialog(msg: impl Into<String>) -> Self {
        Self::Dialog(msg.into())
    }
}
