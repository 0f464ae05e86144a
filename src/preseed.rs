//! Parameter sources and merging.
//!
//! First-boot answers arrive from up to four places: CLI flags, `APP_*`
//! environment variables exported by the init hooks, a JSON preseed file,
//! and the interactive dialogs. A `FirstbootSeed` holds the partial answers
//! from any one source; seeds overlay each other in precedence order and the
//! complete result is turned into a validated [`FirstbootConfig`].

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{
    self, DeployMode, FirstbootConfig, DEFAULT_ADMIN_USER, DEFAULT_JOIN_HOSTNAME,
};
use crate::error::{FirstbootError, Result};

/// Environment variables exported by the init-hooks configuration file.
pub const ENV_DOMAIN: &str = "APP_DOMAIN";
pub const ENV_REALM: &str = "APP_REALM";
pub const ENV_PASS: &str = "APP_PASS";
pub const ENV_JOIN_NS: &str = "APP_JOIN_NS";
pub const ENV_ADMIN_USER: &str = "APP_ADMIN_USER";

/// Partial first-boot answers from a single source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstbootSeed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_nameserver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_hostname: Option<String>,
}

/// Treat empty and whitespace-only values as absent.
///
/// The init hooks export `APP_PASS=""` when unset, and the wrapper forwards
/// empty flag values verbatim.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_var(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

impl FirstbootSeed {
    /// Collect answers from the `APP_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            domain: env_var(ENV_DOMAIN),
            realm: env_var(ENV_REALM),
            admin_user: env_var(ENV_ADMIN_USER),
            admin_password: env_var(ENV_PASS),
            join_nameserver: env_var(ENV_JOIN_NS),
            join_hostname: None,
        }
    }

    /// Load answers from a JSON preseed file.
    ///
    /// Unknown fields are ignored for forward compatibility.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            FirstbootError::config(format!(
                "Failed to read preseed file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        let seed: Self = serde_json::from_str(&content)?;
        Ok(seed)
    }

    /// Save answers to a JSON preseed file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(|e| {
            FirstbootError::config(format!(
                "Failed to write preseed file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        Ok(())
    }

    /// Overlay this seed onto a lower-precedence fallback.
    ///
    /// Fields present here win; empty strings count as absent.
    pub fn overlaid_on(self, fallback: Self) -> Self {
        Self {
            domain: non_empty(self.domain).or(fallback.domain),
            realm: non_empty(self.realm).or(fallback.realm),
            admin_user: non_empty(self.admin_user).or(fallback.admin_user),
            admin_password: non_empty(self.admin_password).or(fallback.admin_password),
            join_nameserver: non_empty(self.join_nameserver).or(fallback.join_nameserver),
            join_hostname: non_empty(self.join_hostname).or(fallback.join_hostname),
        }
    }

    /// Whether the answers suffice for the non-interactive path.
    ///
    /// A password plus a domain (or a realm, from which the domain is
    /// derived) is enough; the realm itself defaults to `<domain>.lan`.
    pub fn is_complete(&self) -> bool {
        self.admin_password.is_some() && (self.domain.is_some() || self.realm.is_some())
    }

    /// Pick the deploy variant: an explicit subcommand wins, otherwise the
    /// presence of a join nameserver selects the join variant.
    pub fn mode(&self, forced: Option<DeployMode>) -> DeployMode {
        forced.unwrap_or(if self.join_nameserver.is_some() {
            DeployMode::Join
        } else {
            DeployMode::Provision
        })
    }

    /// Resolve defaults and derivations and produce a validated config.
    pub fn into_config(self, mode: DeployMode) -> Result<FirstbootConfig> {
        let (domain, realm) = match (non_empty(self.domain), non_empty(self.realm)) {
            (Some(domain), Some(realm)) => (domain, realm),
            (Some(domain), None) => {
                let realm = config::derive_realm(&domain);
                (domain, realm)
            }
            (None, Some(realm)) => {
                let domain = config::derive_domain(&realm);
                (domain, realm)
            }
            (None, None) => {
                return Err(FirstbootError::config(
                    "Either a domain or a realm must be specified",
                ));
            }
        };

        let admin_password = non_empty(self.admin_password).ok_or_else(|| {
            FirstbootError::config("Administrator password must be specified")
        })?;

        let join_nameserver = match non_empty(self.join_nameserver) {
            Some(raw) => Some(raw.parse::<IpAddr>().map_err(|_| {
                FirstbootError::validation(format!("`{}` is not a valid nameserver address", raw))
            })?),
            None => None,
        };

        let cfg = FirstbootConfig {
            domain,
            realm,
            admin_user: non_empty(self.admin_user)
                .unwrap_or_else(|| DEFAULT_ADMIN_USER.to_string()),
            admin_password,
            join_nameserver,
            join_hostname: non_empty(self.join_hostname)
                .unwrap_or_else(|| DEFAULT_JOIN_HOSTNAME.to_string()),
            mode,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
