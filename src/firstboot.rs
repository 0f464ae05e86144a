//! First-boot orchestration.
//!
//! Drives the host into one of two terminal states: a freshly provisioned
//! domain with this host as first controller, or membership in an existing
//! domain as an additional controller. Each step carries an explicit
//! required/best-effort policy: best-effort failures are logged and the run
//! continues (a stopped service that was never running, a chown in an
//! unprivileged environment); required failures abort immediately and no
//! later step runs.
//!
//! The orchestrator is generic over the [`DirectoryProvisioner`] and
//! [`ServiceManager`] seams, so the whole flow is testable against fakes.

use std::fs;
use std::path::{Path, PathBuf};

use strum::Display;
use tracing::{error, info, warn};

use crate::config::{DeployMode, FirstbootConfig};
use crate::error::{FirstbootError, Result};
use crate::kerberos;
use crate::provisioner::DirectoryProvisioner;
use crate::resolver;
use crate::runner;
use crate::service::{self, ReadinessProbe, ServiceManager, DIRECTORY_UNIT};

/// Locations of every file first boot mutates.
///
/// Injectable so tests run against a scratch directory; defaults are the
/// real appliance paths.
#[derive(Debug, Clone)]
pub struct SystemPaths {
    /// Resolver head file (domain/search/nameserver lines).
    pub resolv_head: PathBuf,
    /// Directory service configuration, removed before provision/join.
    pub service_config: PathBuf,
    /// System Kerberos configuration.
    pub krb5_config: PathBuf,
    /// Kerberos configuration generated by provisioning.
    pub generated_krb5_config: PathBuf,
    /// Host keytab export destination.
    pub keytab: PathBuf,
    /// Persistent hostname file.
    pub hostname_file: PathBuf,
}

impl Default for SystemPaths {
    fn default() -> Self {
        Self {
            resolv_head: PathBuf::from("/etc/resolvconf/resolv.conf.d/head"),
            service_config: PathBuf::from("/etc/samba/smb.conf"),
            krb5_config: PathBuf::from("/etc/krb5.conf"),
            generated_krb5_config: PathBuf::from("/var/lib/samba/private/krb5.conf"),
            keytab: PathBuf::from("/etc/krb5.keytab"),
            hostname_file: PathBuf::from("/etc/hostname"),
        }
    }
}

/// Failure policy of an orchestration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Failure aborts the run; no later step executes.
    Required,
    /// Failure is logged at warn level and the run continues.
    BestEffort,
}

/// Every orchestration step, in the order the variants run them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Step {
    SetNameserver,
    RefreshResolver,
    SetHostname,
    StopDirectory,
    RemoveServiceConfig,
    PurgeStaleDatabases,
    ProvisionDomain,
    JoinDomain,
    DisablePasswordExpiry,
    ExportKeytab,
    SecureKeytab,
    InstallKerberosConfig,
    RewriteResolver,
    StartDirectory,
    WaitDirectoryReady,
    AcquireTicket,
    RestartDirectory,
}

impl Step {
    /// The explicit per-step failure policy.
    ///
    /// Provision/join themselves, the file removals that precede them, and
    /// the bounded readiness gate are required; everything else is expected
    /// to sometimes fail on a fresh image and must not abort first boot.
    pub fn policy(self) -> StepPolicy {
        match self {
            Step::RemoveServiceConfig
            | Step::PurgeStaleDatabases
            | Step::ProvisionDomain
            | Step::JoinDomain
            | Step::WaitDirectoryReady => StepPolicy::Required,
            _ => StepPolicy::BestEffort,
        }
    }
}

/// The first-boot orchestrator.
pub struct Orchestrator<'a, P, S> {
    config: &'a FirstbootConfig,
    provisioner: &'a P,
    services: &'a S,
    paths: &'a SystemPaths,
    readiness: ReadinessProbe,
}

impl<'a, P, S> Orchestrator<'a, P, S>
where
    P: DirectoryProvisioner,
    S: ServiceManager,
{
    pub fn new(
        config: &'a FirstbootConfig,
        provisioner: &'a P,
        services: &'a S,
        paths: &'a SystemPaths,
    ) -> Self {
        Self {
            config,
            provisioner,
            services,
            paths,
            readiness: ReadinessProbe::default(),
        }
    }

    /// Override the readiness probe (tests use short timeouts).
    pub fn with_readiness(mut self, readiness: ReadinessProbe) -> Self {
        self.readiness = readiness;
        self
    }

    /// Run the variant selected in the configuration.
    pub fn run(&self) -> Result<()> {
        match self.config.mode {
            DeployMode::Provision => self.provision(),
            DeployMode::Join => self.join(),
        }
    }

    /// Provision a brand-new domain.
    pub fn provision(&self) -> Result<()> {
        info!(
            "Provisioning new domain {} (realm {})",
            self.config.domain, self.config.realm
        );

        self.step(Step::StopDirectory, || self.services.stop(DIRECTORY_UNIT))?;
        self.step(Step::RemoveServiceConfig, || self.remove_service_config())?;
        self.step(Step::ProvisionDomain, || {
            self.provisioner.provision(self.config)
        })?;
        self.step(Step::DisablePasswordExpiry, || {
            self.provisioner.set_admin_no_expiry(&self.config.admin_user)
        })?;
        self.export_and_secure_keytab()?;
        self.step(Step::InstallKerberosConfig, || self.install_krb5_config())?;
        self.step(Step::RewriteResolver, || self.rewrite_resolver())?;
        self.bring_up_and_authenticate()?;

        info!("Domain {} provisioned", self.config.domain);
        Ok(())
    }

    /// Join an existing domain as an additional controller.
    pub fn join(&self) -> Result<()> {
        info!(
            "Joining existing domain {} (realm {})",
            self.config.domain, self.config.realm
        );

        if let Some(nameserver) = self.config.join_nameserver {
            self.step(Step::SetNameserver, || {
                self.set_nameserver(nameserver)
            })?;
            self.step(Step::RefreshResolver, || self.services.refresh_resolver())?;
        }
        self.step(Step::SetHostname, || self.set_hostname())?;
        self.step(Step::StopDirectory, || self.services.stop(DIRECTORY_UNIT))?;
        self.step(Step::RemoveServiceConfig, || self.remove_service_config())?;
        self.step(Step::PurgeStaleDatabases, || self.purge_stale_databases())?;
        self.step(Step::JoinDomain, || self.provisioner.join(self.config))?;
        self.export_and_secure_keytab()?;
        self.step(Step::InstallKerberosConfig, || self.install_krb5_config())?;
        self.step(Step::RewriteResolver, || self.rewrite_resolver())?;
        self.bring_up_and_authenticate()?;

        info!("Joined domain {}", self.config.domain);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shared step sequences
    // ------------------------------------------------------------------

    fn export_and_secure_keytab(&self) -> Result<()> {
        self.step(Step::ExportKeytab, || {
            self.provisioner.export_keytab(&self.paths.keytab)
        })?;
        self.step(Step::SecureKeytab, || {
            if runner::is_dry_run() {
                info!("dry-run: would restrict {:?}", self.paths.keytab);
                return Ok(());
            }
            kerberos::secure_keytab(&self.paths.keytab)
        })
    }

    fn bring_up_and_authenticate(&self) -> Result<()> {
        self.step(Step::StartDirectory, || self.services.start(DIRECTORY_UNIT))?;
        self.step(Step::WaitDirectoryReady, || {
            if runner::is_dry_run() {
                info!("dry-run: would wait for {} to become active", DIRECTORY_UNIT);
                return Ok(());
            }
            service::wait_until_active(self.services, DIRECTORY_UNIT, &self.readiness)
        })?;
        self.step(Step::AcquireTicket, || {
            // The principal uppercases the realm; the resolver rewrite above
            // intentionally kept the case as given
            self.provisioner.acquire_ticket(
                &self.config.admin_principal(),
                &self.config.admin_password,
            )
        })?;
        self.step(Step::RestartDirectory, || {
            self.services.restart(DIRECTORY_UNIT)
        })
    }

    // ------------------------------------------------------------------
    // File-mutating steps (all honor dry-run)
    // ------------------------------------------------------------------

    fn remove_service_config(&self) -> Result<()> {
        if runner::is_dry_run() {
            info!("dry-run: would remove {:?}", self.paths.service_config);
            return Ok(());
        }
        match fs::remove_file(&self.paths.service_config) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FirstbootError::config(format!(
                "failed to remove {:?}: {}",
                self.paths.service_config, e
            ))),
        }
    }

    fn set_nameserver(&self, nameserver: std::net::IpAddr) -> Result<()> {
        if runner::is_dry_run() {
            info!(
                "dry-run: would point {:?} at nameserver {}",
                self.paths.resolv_head, nameserver
            );
            return Ok(());
        }
        resolver::write_nameserver(&self.paths.resolv_head, nameserver)
    }

    fn set_hostname(&self) -> Result<()> {
        if runner::is_dry_run() {
            info!("dry-run: would set hostname {}", self.config.join_hostname);
            return Ok(());
        }
        fs::write(
            &self.paths.hostname_file,
            format!("{}\n", self.config.join_hostname),
        )?;
        self.services.set_hostname(&self.config.join_hostname)
    }

    fn purge_stale_databases(&self) -> Result<()> {
        let dirs = self.provisioner.state_directories()?;
        if runner::is_dry_run() {
            info!("dry-run: would purge database files under {:?}", dirs);
            return Ok(());
        }
        let removed = purge_database_files(&dirs)?;
        if removed > 0 {
            info!("Purged {} stale database file(s)", removed);
        }
        Ok(())
    }

    fn install_krb5_config(&self) -> Result<()> {
        if runner::is_dry_run() {
            info!("dry-run: would install {:?}", self.paths.krb5_config);
            return Ok(());
        }
        match self.config.mode {
            DeployMode::Provision => {
                kerberos::link_config(&self.paths.krb5_config, &self.paths.generated_krb5_config)
            }
            DeployMode::Join => {
                kerberos::copy_config(&self.paths.krb5_config, &self.paths.generated_krb5_config)
            }
        }
    }

    fn rewrite_resolver(&self) -> Result<()> {
        if runner::is_dry_run() {
            info!(
                "dry-run: would point {:?} at realm {}",
                self.paths.resolv_head, self.config.realm
            );
            return Ok(());
        }
        resolver::write_search_domain(&self.paths.resolv_head, &self.config.realm)
    }

    // ------------------------------------------------------------------

    fn step(&self, step: Step, f: impl FnOnce() -> Result<()>) -> Result<()> {
        match f() {
            Ok(()) => {
                info!("step {}: done", step);
                Ok(())
            }
            Err(e) => match step.policy() {
                StepPolicy::Required => {
                    error!("step {}: failed: {}", step, e);
                    Err(e)
                }
                StepPolicy::BestEffort => {
                    warn!("step {}: failed, continuing: {}", step, e);
                    Ok(())
                }
            },
        }
    }
}

/// Remove every `*.tdb` and `*.ldb` file directly under `dirs`.
///
/// Missing directories are skipped; a removal failure propagates, because a
/// half-purged state would make the subsequent join fail in a much less
/// obvious way. Returns the number of files removed.
pub fn purge_database_files(dirs: &[PathBuf]) -> Result<usize> {
    let mut removed = 0;

    for dir in dirs {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(FirstbootError::config(format!(
                    "failed to list {:?}: {}",
                    dir, e
                )));
            }
        };

        for entry in entries {
            let entry = entry.map_err(|e| {
                FirstbootError::config(format!("failed to read entry in {:?}: {}", dir, e))
            })?;
            let path = entry.path();
            if is_database_file(&path) {
                fs::remove_file(&path).map_err(|e| {
                    FirstbootError::config(format!("failed to remove {:?}: {}", path, e))
                })?;
                removed += 1;
            }
        }
    }

    Ok(removed)
}

fn is_database_file(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("tdb") | Some("ldb")
        )
}
