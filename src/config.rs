//! Validated first-boot configuration.
//!
//! All parameter sources (flags, environment, preseed file, dialogs) are
//! merged into a single `FirstbootConfig` before orchestration starts. The
//! orchestrator only ever sees this struct; nothing reads the environment
//! mid-procedure.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{FirstbootError, Result};

/// Default NetBIOS domain offered by the dialogs.
pub const DEFAULT_DOMAIN: &str = "DOMAIN";

/// Default administrator account.
pub const DEFAULT_ADMIN_USER: &str = "administrator";

/// Fixed secondary hostname taken when joining an existing domain.
pub const DEFAULT_JOIN_HOSTNAME: &str = "dc2";

/// NetBIOS names are capped at 15 characters.
const MAX_DOMAIN_LEN: usize = 15;

/// Which terminal state first boot drives toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DeployMode {
    /// Create a brand-new directory database and become the first controller.
    #[strum(serialize = "provision")]
    Provision,
    /// Replicate an existing domain as an additional controller.
    #[strum(serialize = "join")]
    Join,
}

/// Fully-validated provisioning request.
#[derive(Debug, Clone)]
pub struct FirstbootConfig {
    /// NetBIOS domain name (e.g. `EXAMPLE`).
    pub domain: String,
    /// Kerberos realm / DNS domain (e.g. `example.lan`), case as given.
    pub realm: String,
    /// Administrator account name.
    pub admin_user: String,
    /// Administrator account password.
    pub admin_password: String,
    /// Nameserver of the domain being joined.
    pub join_nameserver: Option<IpAddr>,
    /// Hostname taken when joining as an additional controller.
    pub join_hostname: String,
    /// Provision or join.
    pub mode: DeployMode,
}

/// Derive the default realm from a domain name.
pub fn derive_realm(domain: &str) -> String {
    format!("{}.lan", domain)
}

/// Derive a NetBIOS domain from a realm: the first DNS label, uppercased.
pub fn derive_domain(realm: &str) -> String {
    realm
        .split('.')
        .next()
        .unwrap_or(realm)
        .to_uppercase()
}

impl FirstbootConfig {
    /// Kerberos principal used for initial ticket acquisition.
    ///
    /// Ticket acquisition wants the realm uppercased; the resolver rewrite
    /// keeps the realm case as given. Both use the same config field.
    pub fn admin_principal(&self) -> String {
        format!("{}@{}", self.admin_user, self.realm.to_uppercase())
    }

    /// Validate the assembled configuration.
    pub fn validate(&self) -> Result<()> {
        validate_domain(&self.domain)?;
        validate_realm(&self.realm)?;
        validate_admin_user(&self.admin_user)?;
        validate_password(&self.admin_password)?;

        if self.mode == DeployMode::Join && self.join_hostname.trim().is_empty() {
            return Err(FirstbootError::validation("Join hostname must be specified"));
        }

        Ok(())
    }
}

/// Validate a NetBIOS domain name.
pub fn validate_domain(domain: &str) -> Result<()> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(FirstbootError::validation("Domain must be specified"));
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(FirstbootError::validation(format!(
            "Domain must be at most {} characters long",
            MAX_DOMAIN_LEN
        )));
    }
    if let Some(first) = domain.chars().next() {
        if !first.is_ascii_alphabetic() {
            return Err(FirstbootError::validation("Domain must start with a letter"));
        }
    }
    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(FirstbootError::validation(
            "Domain can only contain letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

/// Validate a realm / DNS domain name.
pub fn validate_realm(realm: &str) -> Result<()> {
    let realm = realm.trim();
    if realm.is_empty() {
        return Err(FirstbootError::validation("Realm must be specified"));
    }
    if realm.starts_with('.') || realm.ends_with('.') {
        return Err(FirstbootError::validation(
            "Realm must not start or end with a dot",
        ));
    }
    if !realm
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(FirstbootError::validation(
            "Realm can only contain letters, numbers, hyphens, and dots",
        ));
    }
    Ok(())
}

/// Validate the administrator account name.
pub fn validate_admin_user(user: &str) -> Result<()> {
    let user = user.trim();
    if user.is_empty() {
        return Err(FirstbootError::validation(
            "Administrator username must be specified",
        ));
    }
    if let Some(first) = user.chars().next() {
        if !first.is_ascii_alphabetic() {
            return Err(FirstbootError::validation(
                "Administrator username must start with a letter",
            ));
        }
    }
    if !user
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(FirstbootError::validation(
            "Administrator username can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    Ok(())
}

/// Validate the administrator password for non-interactive use.
///
/// The full complexity policy only applies in the dialogs; preseeded and
/// flag-supplied passwords are accepted as long as they are well-formed.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(FirstbootError::validation(
            "Administrator password must be specified",
        ));
    }
    if password.contains(char::is_whitespace) {
        return Err(FirstbootError::validation(
            "Administrator password cannot contain whitespace",
        ));
    }
    Ok(())
}
