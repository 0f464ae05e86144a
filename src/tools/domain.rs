//! Typed arguments for `samba-tool domain` operations.
//!
//! - `DomainProvisionArgs` for `samba-tool domain provision`
//! - `DomainJoinArgs` for `samba-tool domain join`
//! - `ExportKeytabArgs` for `samba-tool domain exportkeytab`
//! - `BuildDiagArgs` for `samba -b` (build-time directory dump)

use std::path::PathBuf;

use strum::{Display, EnumString};

use crate::tool_args::ToolArgs;

/// Upstream forwarder written into the provisioned DNS configuration.
pub const DEFAULT_DNS_FORWARDER: &str = "8.8.8.8";

/// DNS backend selection for provision/join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Display, EnumString)]
pub enum DnsBackend {
    /// Samba's built-in DNS server.
    #[default]
    #[strum(serialize = "SAMBA_INTERNAL")]
    SambaInternal,
    /// BIND9 with the DLZ plugin.
    #[strum(serialize = "BIND9_DLZ")]
    Bind9Dlz,
}

// ============================================================================
// Domain Provision
// ============================================================================

/// Type-safe arguments for `samba-tool domain provision`.
#[derive(Debug, Clone)]
pub struct DomainProvisionArgs {
    /// Kerberos realm / DNS domain.
    pub realm: String,
    /// NetBIOS domain name.
    pub domain: String,
    /// Administrator password.
    pub admin_password: String,
    /// DNS backend to provision with.
    pub dns_backend: DnsBackend,
    /// Upstream DNS forwarder written into the generated config.
    pub dns_forwarder: String,
}

impl DomainProvisionArgs {
    pub fn new(realm: &str, domain: &str, admin_password: &str) -> Self {
        Self {
            realm: realm.to_string(),
            domain: domain.to_string(),
            admin_password: admin_password.to_string(),
            dns_backend: DnsBackend::default(),
            dns_forwarder: DEFAULT_DNS_FORWARDER.to_string(),
        }
    }
}

impl ToolArgs for DomainProvisionArgs {
    fn program(&self) -> &'static str {
        "samba-tool"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "domain".to_string(),
            "provision".to_string(),
            "--server-role=dc".to_string(),
            // NIS/RFC 2307 schema extension for POSIX attributes
            "--use-rfc2307".to_string(),
            format!("--dns-backend={}", self.dns_backend),
            format!("--realm={}", self.realm),
            format!("--domain={}", self.domain),
            format!("--adminpass={}", self.admin_password),
            format!("--option=dns forwarder = {}", self.dns_forwarder),
        ]
    }

    fn redacted_cli_args(&self) -> Vec<String> {
        self.to_cli_args()
            .into_iter()
            .map(|arg| {
                if arg.starts_with("--adminpass=") {
                    "--adminpass=********".to_string()
                } else {
                    arg
                }
            })
            .collect()
    }
}

// ============================================================================
// Domain Join
// ============================================================================

/// Type-safe arguments for `samba-tool domain join <realm> DC`.
#[derive(Debug, Clone)]
pub struct DomainJoinArgs {
    /// Realm of the domain being joined.
    pub realm: String,
    /// Account authorized to join additional controllers.
    pub admin_user: String,
    /// Password for that account.
    pub admin_password: String,
    /// DNS backend on the new controller.
    pub dns_backend: DnsBackend,
}

impl DomainJoinArgs {
    pub fn new(realm: &str, admin_user: &str, admin_password: &str) -> Self {
        Self {
            realm: realm.to_string(),
            admin_user: admin_user.to_string(),
            admin_password: admin_password.to_string(),
            dns_backend: DnsBackend::default(),
        }
    }
}

impl ToolArgs for DomainJoinArgs {
    fn program(&self) -> &'static str {
        "samba-tool"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "domain".to_string(),
            "join".to_string(),
            self.realm.clone(),
            "DC".to_string(),
            format!("-U{}", self.admin_user),
            format!("--password={}", self.admin_password),
            format!("--dns-backend={}", self.dns_backend),
            "--option=idmap_ldb:use rfc2307 = yes".to_string(),
        ]
    }

    fn redacted_cli_args(&self) -> Vec<String> {
        self.to_cli_args()
            .into_iter()
            .map(|arg| {
                if arg.starts_with("--password=") {
                    "--password=********".to_string()
                } else {
                    arg
                }
            })
            .collect()
    }
}

// ============================================================================
// Keytab Export
// ============================================================================

/// Type-safe arguments for `samba-tool domain exportkeytab`.
#[derive(Debug, Clone)]
pub struct ExportKeytabArgs {
    /// Destination keytab path.
    pub path: PathBuf,
}

impl ToolArgs for ExportKeytabArgs {
    fn program(&self) -> &'static str {
        "samba-tool"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "domain".to_string(),
            "exportkeytab".to_string(),
            self.path.display().to_string(),
        ]
    }
}

// ============================================================================
// Build Diagnostic Dump
// ============================================================================

/// Type-safe arguments for `samba -b`.
///
/// Dumps build-time options, including the LOCKDIR/STATEDIR/CACHEDIR/
/// PRIVATE_DIR paths that hold the directory database files.
#[derive(Debug, Clone, Default)]
pub struct BuildDiagArgs;

impl ToolArgs for BuildDiagArgs {
    fn program(&self) -> &'static str {
        "samba"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["-b".to_string()]
    }

    /// Diagnostic dump is READ-ONLY.
    fn is_destructive(&self) -> bool {
        false
    }
}
