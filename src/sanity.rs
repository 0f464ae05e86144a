//! Pre-flight checks for the first-boot environment.
//!
//! Verifies that the external toolkit is installed and that we are running
//! as root before any dialog or orchestration starts. A clear remediation
//! message beats a samba-tool stack trace halfway through provisioning.

use std::process::Command;

use tracing::{debug, info, warn};

use crate::process_guard::CommandProcessGroup;
use crate::runner;

/// Result of environment verification.
#[derive(Debug)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
    pub is_root: bool,
}

impl SanityCheckResult {
    /// True if all checks passed.
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty() && self.is_root
    }
}

/// Binaries the orchestrator invokes.
const REQUIRED_BINARIES: &[&str] = &[
    "samba-tool", // provisioning, join, keytab export
    "samba",      // build diagnostic dump
    "systemctl",  // unit control
    "kinit",      // initial ticket acquisition
];

/// Binaries used by best-effort steps (warn if missing, don't fail).
const OPTIONAL_BINARIES: &[&str] = &[
    "resolvconf", // resolver cache refresh (join variant)
    "hostname",   // kernel hostname (join variant)
];

fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .in_new_process_group()
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Perform all sanity checks and return the result.
pub fn verify_environment() -> SanityCheckResult {
    let mut missing = Vec::new();

    for binary in REQUIRED_BINARIES {
        if !binary_exists(binary) {
            missing.push((*binary).to_string());
        }
    }

    for binary in OPTIONAL_BINARIES {
        if !binary_exists(binary) {
            debug!("Optional binary not found: {}", binary);
        }
    }

    SanityCheckResult {
        missing_binaries: missing,
        is_root: is_running_as_root(),
    }
}

/// Print a remediation message to stderr and exit non-zero.
pub fn print_error_and_exit(result: &SanityCheckResult) -> ! {
    eprintln!();
    eprintln!("dc-firstboot: pre-flight check failed");
    eprintln!();

    if !result.is_root {
        eprintln!("  Root privileges are required to provision the domain controller.");
        eprintln!("  Run as root (first boot runs this automatically).");
        eprintln!();
    }

    if !result.missing_binaries.is_empty() {
        eprintln!("  Missing required binaries:");
        for binary in &result.missing_binaries {
            eprintln!("    - {} (install: apt-get install {})", binary, package_for(binary));
        }
        eprintln!();
    }

    std::process::exit(1);
}

/// Map binary names to their Debian package names.
fn package_for(binary: &str) -> &'static str {
    match binary {
        "samba-tool" | "samba" => "samba",
        "systemctl" => "systemd",
        "kinit" => "krb5-user",
        "resolvconf" => "resolvconf",
        "hostname" => "hostname",
        _ => "unknown",
    }
}

/// Verify the environment, exiting on failure.
///
/// In dry-run mode missing binaries only warn — previewing the plan on a
/// workstation without samba installed is the whole point.
pub fn run_preflight_checks() {
    debug!("Running pre-flight checks");

    let result = verify_environment();

    if result.is_ok() {
        info!("Pre-flight checks passed");
        return;
    }

    // Nothing destructive runs in dry-run mode, so a workstation without
    // samba (or root) can still preview the plan
    if runner::is_dry_run() {
        if !result.is_root {
            warn!("Not running as root (ignored in dry-run)");
        }
        if !result.missing_binaries.is_empty() {
            warn!(
                "Missing binaries (ignored in dry-run): {}",
                result.missing_binaries.join(", ")
            );
        }
        return;
    }

    print_error_and_exit(&result);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_exists_for_common_tools() {
        // `sh` is everywhere; the probe itself must work
        assert!(binary_exists("sh"));
        assert!(!binary_exists("definitely-not-a-real-binary"));
    }

    #[test]
    fn test_package_mapping() {
        assert_eq!(package_for("samba-tool"), "samba");
        assert_eq!(package_for("kinit"), "krb5-user");
        assert_eq!(package_for("something-else"), "unknown");
    }

    #[test]
    fn test_result_is_ok() {
        let ok = SanityCheckResult {
            missing_binaries: vec![],
            is_root: true,
        };
        assert!(ok.is_ok());

        let missing = SanityCheckResult {
            missing_binaries: vec!["samba-tool".to_string()],
            is_root: true,
        };
        assert!(!missing.is_ok());

        let unprivileged = SanityCheckResult {
            missing_binaries: vec![],
            is_root: false,
        };
        assert!(!unprivileged.is_ok());
    }
}
