//! The directory-service capability seam.
//!
//! `DirectoryProvisioner` abstracts every operation the orchestrator needs
//! from the directory toolkit, so orchestration logic is testable against a
//! fake without touching real system services. `SambaProvisioner` is the
//! production implementation shelling out through the typed runner.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::FirstbootConfig;
use crate::error::Result;
use crate::runner::{run_tool, run_tool_with_stdin};
use crate::tools::auth::KinitArgs;
use crate::tools::domain::{
    BuildDiagArgs, DomainJoinArgs, DomainProvisionArgs, ExportKeytabArgs,
};
use crate::tools::user::SetExpiryArgs;

/// Build-dump keys naming the directories that hold directory database files.
const STATE_DIR_KEYS: &[&str] = &["LOCKDIR", "STATEDIR", "CACHEDIR", "PRIVATE_DIR"];

/// Operations the orchestrator needs from the directory toolkit.
pub trait DirectoryProvisioner {
    /// Create a brand-new domain with this host as first controller.
    fn provision(&self, config: &FirstbootConfig) -> Result<()>;

    /// Join an existing domain as an additional controller.
    fn join(&self, config: &FirstbootConfig) -> Result<()>;

    /// Disable password expiry for an account.
    fn set_admin_no_expiry(&self, account: &str) -> Result<()>;

    /// Export the host keytab to `path`.
    fn export_keytab(&self, path: &Path) -> Result<()>;

    /// Acquire an initial ticket for `principal`.
    fn acquire_ticket(&self, principal: &str, password: &str) -> Result<()>;

    /// Directories holding the toolkit's database files, per its own
    /// build diagnostic dump.
    fn state_directories(&self) -> Result<Vec<PathBuf>>;
}

/// Production implementation backed by samba-tool / samba / kinit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SambaProvisioner;

impl DirectoryProvisioner for SambaProvisioner {
    fn provision(&self, config: &FirstbootConfig) -> Result<()> {
        let args =
            DomainProvisionArgs::new(&config.realm, &config.domain, &config.admin_password);
        run_tool(&args)?.ensure_success("samba-tool", "domain provision")
    }

    fn join(&self, config: &FirstbootConfig) -> Result<()> {
        let args =
            DomainJoinArgs::new(&config.realm, &config.admin_user, &config.admin_password);
        run_tool(&args)?.ensure_success("samba-tool", "domain join")
    }

    fn set_admin_no_expiry(&self, account: &str) -> Result<()> {
        let args = SetExpiryArgs::never_expires(account);
        run_tool(&args)?.ensure_success("samba-tool", "user setexpiry")
    }

    fn export_keytab(&self, path: &Path) -> Result<()> {
        let args = ExportKeytabArgs {
            path: path.to_path_buf(),
        };
        run_tool(&args)?.ensure_success("samba-tool", "domain exportkeytab")
    }

    fn acquire_ticket(&self, principal: &str, password: &str) -> Result<()> {
        let args = KinitArgs {
            principal: principal.to_string(),
        };
        run_tool_with_stdin(&args, password)?.ensure_success("kinit", "ticket acquisition")
    }

    fn state_directories(&self) -> Result<Vec<PathBuf>> {
        let output = run_tool(&BuildDiagArgs)?;
        output.ensure_success("samba", "build diagnostic dump")?;
        let dirs = parse_build_directories(&output.stdout);
        debug!("Directory state paths: {:?}", dirs);
        Ok(dirs)
    }
}

/// Extract LOCKDIR/STATEDIR/CACHEDIR/PRIVATE_DIR paths from `samba -b`
/// output.
///
/// Lines look like `   LOCKDIR: /var/lock/samba`. Order is preserved and
/// duplicates are dropped (several keys may point at the same directory).
pub fn parse_build_directories(output: &str) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        for key in STATE_DIR_KEYS {
            if let Some(rest) = line.strip_prefix(key) {
                if let Some(path) = rest.strip_prefix(':') {
                    let path = PathBuf::from(path.trim());
                    if !path.as_os_str().is_empty() && !dirs.contains(&path) {
                        dirs.push(path);
                    }
                }
            }
        }
    }

    dirs
}
