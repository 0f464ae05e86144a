//! dc-firstboot library
//!
//! First-boot provisioning for a Samba Active Directory domain controller
//! appliance: parameter collection and validation, the provision/join
//! orchestration, and the typed execution layer for the external toolkit.

pub mod cli;
pub mod config;
pub mod error;
pub mod firstboot;
pub mod kerberos;
pub mod password;
pub mod preseed;
pub mod process_guard;
pub mod provisioner;
pub mod resolver;
pub mod runner;
pub mod sanity;
pub mod service;
pub mod theme;
pub mod tool_args;
pub mod tools;
pub mod ui;

// Re-export main types for convenience
pub use config::{DeployMode, FirstbootConfig};
pub use error::{FirstbootError, Result};
pub use firstboot::{purge_database_files, Orchestrator, Step, StepPolicy, SystemPaths};
pub use preseed::FirstbootSeed;
pub use process_guard::{ChildRegistry, CommandProcessGroup, ProcessGuard};
pub use provisioner::{parse_build_directories, DirectoryProvisioner, SambaProvisioner};
pub use runner::{
    disable_dry_run, enable_dry_run, is_dry_run, run_tool, run_tool_with_stdin, ToolOutput,
};
pub use service::{
    wait_until_active, ReadinessProbe, ServiceManager, SystemdManager, DIRECTORY_UNIT,
};
pub use tool_args::ToolArgs;
pub use tools::domain::{
    DnsBackend, DomainJoinArgs, DomainProvisionArgs, ExportKeytabArgs, DEFAULT_DNS_FORWARDER,
};
pub use tools::service::{ServiceAction, SystemctlArgs};
