// Command-line surface.
//
// This file is intentionally self-contained (clap + std only) and free of
// inner doc comments: build.rs includes it verbatim to generate the man
// page and shell completions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// First-boot configuration for a Samba AD domain controller
///
/// Provisions a brand-new domain or joins an existing one as an additional
/// controller. Parameters may come from flags, `APP_*` environment variables,
/// a preseed file, or interactive dialogs when anything is missing.
#[derive(Parser)]
#[command(name = "dc-firstboot")]
#[command(about = "Provision or join a Samba Active Directory domain at first boot")]
#[command(version)]
pub struct Cli {
    /// Domain (NetBIOS) name, e.g. EXAMPLE
    #[arg(short = 'd', long, global = true)]
    pub domain: Option<String>,

    /// Kerberos realm / DNS domain, e.g. example.lan
    ///
    /// Defaults to `<domain>.lan` when a domain and password are supplied.
    #[arg(short = 'r', long, global = true)]
    pub realm: Option<String>,

    /// Administrator account password
    #[arg(short = 'p', long = "pass", global = true)]
    pub pass: Option<String>,

    /// Nameserver of the domain to join (selects the join variant)
    #[arg(short = 'n', long = "join_ns", alias = "join-ns", global = true)]
    pub join_ns: Option<String>,

    /// Administrator account name
    #[arg(short = 'u', long = "username", global = true)]
    pub username: Option<String>,

    /// JSON answers file with the same fields as the flags
    #[arg(long, global = true)]
    pub preseed: Option<PathBuf>,

    /// Dry-run mode: log destructive operations without executing them.
    ///
    /// Read-only operations (service status, build diagnostics) still run
    /// so the preview is realistic.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Verbose logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision a new domain (skip variant auto-detection)
    Provision,
    /// Join an existing domain as an additional controller
    Join,
    /// Validate a preseed answers file
    Validate {
        /// Path to the answers file to validate
        // Named `file` because the global --preseed flag already owns the
        // `preseed` argument id
        file: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
