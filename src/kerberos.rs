//! Kerberos config installation and keytab hardening.
//!
//! Provisioning generates a krb5.conf inside the directory service's private
//! dir. On a fresh provision the system config becomes a symlink to it (so
//! later regeneration is picked up automatically); on a join it is copied,
//! matching how the appliance has always done it.

use std::fs;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::Path;

use nix::unistd::{chown, Gid, Uid};
use tracing::{debug, warn};

use crate::error::{FirstbootError, Result};

/// Keytab files hold long-term keys: owner read/write only.
const KEYTAB_MODE: u32 = 0o600;

/// Replace the system krb5 config with a symlink to the generated one.
pub fn link_config(system: &Path, generated: &Path) -> Result<()> {
    remove_existing(system)?;
    symlink(generated, system).map_err(|e| {
        FirstbootError::kerberos(format!(
            "failed to symlink {:?} -> {:?}: {}",
            system, generated, e
        ))
    })?;
    debug!("Linked {:?} -> {:?}", system, generated);
    Ok(())
}

/// Replace the system krb5 config with a copy of the generated one.
pub fn copy_config(system: &Path, generated: &Path) -> Result<()> {
    remove_existing(system)?;
    fs::copy(generated, system).map_err(|e| {
        FirstbootError::kerberos(format!(
            "failed to copy {:?} to {:?}: {}",
            generated, system, e
        ))
    })?;
    debug!("Copied {:?} to {:?}", generated, system);
    Ok(())
}

fn remove_existing(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FirstbootError::kerberos(format!(
            "failed to remove {:?}: {}",
            path, e
        ))),
    }
}

/// Restrict a freshly exported keytab: mode 0600, owned by root.
///
/// The mode change must succeed; the ownership change is attempted and
/// logged on failure (it cannot succeed in unprivileged test runs).
pub fn secure_keytab(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)
        .map_err(|e| {
            FirstbootError::kerberos(format!("failed to stat keytab {:?}: {}", path, e))
        })?
        .permissions();
    perms.set_mode(KEYTAB_MODE);
    fs::set_permissions(path, perms).map_err(|e| {
        FirstbootError::kerberos(format!(
            "failed to set mode {:o} on {:?}: {}",
            KEYTAB_MODE, path, e
        ))
    })?;

    if let Err(e) = chown(path, Some(Uid::from_raw(0)), Some(Gid::from_raw(0))) {
        warn!("Could not set root ownership on {:?}: {}", path, e);
    }

    Ok(())
}
