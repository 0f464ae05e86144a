//! End-to-end orchestration tests against fake toolkit implementations.
//!
//! The orchestrator is generic over the provisioner and service-manager
//! seams, so these tests drive the real provision/join sequences with fakes
//! that record every call and mutate files under a scratch directory.

use std::cell::{Cell, RefCell};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use dc_firstboot::{
    DeployMode, DirectoryProvisioner, FirstbootConfig, FirstbootError, FirstbootSeed,
    Orchestrator, ReadinessProbe, Result, ServiceManager, SystemPaths,
};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeProvisioner {
    calls: RefCell<Vec<String>>,
    fail_provision: bool,
    fail_join: bool,
    fail_set_expiry: bool,
    state_dirs: Vec<PathBuf>,
}

impl FakeProvisioner {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn called(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }
}

impl DirectoryProvisioner for FakeProvisioner {
    fn provision(&self, config: &FirstbootConfig) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("provision {} {}", config.domain, config.realm));
        if self.fail_provision {
            return Err(FirstbootError::tool("samba-tool", "provision blew up"));
        }
        Ok(())
    }

    fn join(&self, config: &FirstbootConfig) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("join {} {}", config.domain, config.realm));
        if self.fail_join {
            return Err(FirstbootError::tool("samba-tool", "join blew up"));
        }
        Ok(())
    }

    fn set_admin_no_expiry(&self, account: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("setexpiry {}", account));
        if self.fail_set_expiry {
            return Err(FirstbootError::tool("samba-tool", "setexpiry blew up"));
        }
        Ok(())
    }

    fn export_keytab(&self, path: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("exportkeytab {}", path.display()));
        fs::write(path, "keytab").map_err(FirstbootError::from)
    }

    fn acquire_ticket(&self, principal: &str, _password: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("kinit {}", principal));
        Ok(())
    }

    fn state_directories(&self) -> Result<Vec<PathBuf>> {
        self.calls.borrow_mut().push("state-directories".to_string());
        Ok(self.state_dirs.clone())
    }
}

#[derive(Default)]
struct FakeServiceManager {
    calls: RefCell<Vec<String>>,
    active: Cell<bool>,
    fail_stop: bool,
    /// When set, `start` succeeds but the unit never reports active.
    never_ready: bool,
}

impl FakeServiceManager {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn called(&self, call: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == call)
    }
}

impl ServiceManager for FakeServiceManager {
    fn start(&self, unit: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("start {}", unit));
        if !self.never_ready {
            self.active.set(true);
        }
        Ok(())
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("stop {}", unit));
        if self.fail_stop {
            return Err(FirstbootError::service("unit not loaded"));
        }
        self.active.set(false);
        Ok(())
    }

    fn restart(&self, unit: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("restart {}", unit));
        self.active.set(!self.never_ready);
        Ok(())
    }

    fn is_active(&self, _unit: &str) -> bool {
        self.active.get()
    }

    fn set_hostname(&self, hostname: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("hostname {}", hostname));
        Ok(())
    }

    fn refresh_resolver(&self) -> Result<()> {
        self.calls.borrow_mut().push("resolvconf".to_string());
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn scratch_paths(dir: &TempDir) -> SystemPaths {
    let root = dir.path();
    fs::write(root.join("generated-krb5.conf"), "[libdefaults]\n").unwrap();
    SystemPaths {
        resolv_head: root.join("head"),
        service_config: root.join("smb.conf"),
        krb5_config: root.join("krb5.conf"),
        generated_krb5_config: root.join("generated-krb5.conf"),
        keytab: root.join("krb5.keytab"),
        hostname_file: root.join("hostname"),
    }
}

fn quick_probe() -> ReadinessProbe {
    ReadinessProbe {
        timeout: Duration::from_millis(50),
        interval: Duration::from_millis(1),
    }
}

fn provision_config() -> FirstbootConfig {
    FirstbootSeed {
        domain: Some("EXAMPLE".to_string()),
        admin_password: Some("Secret123".to_string()),
        ..Default::default()
    }
    .into_config(DeployMode::Provision)
    .unwrap()
}

fn join_config() -> FirstbootConfig {
    FirstbootSeed {
        domain: Some("EXAMPLE".to_string()),
        realm: Some("example.lan".to_string()),
        admin_password: Some("Secret123".to_string()),
        join_nameserver: Some("10.0.0.10".to_string()),
        ..Default::default()
    }
    .into_config(DeployMode::Join)
    .unwrap()
}

// ============================================================================
// Provision variant
// ============================================================================

#[test]
fn provision_happy_path_configures_the_host() {
    let dir = TempDir::new().unwrap();
    let paths = scratch_paths(&dir);
    let config = provision_config();
    let provisioner = FakeProvisioner::default();
    let services = FakeServiceManager::default();

    Orchestrator::new(&config, &provisioner, &services, &paths)
        .with_readiness(quick_probe())
        .run()
        .unwrap();

    // Derived realm flows into the provision invocation
    assert!(provisioner.called("provision EXAMPLE EXAMPLE.lan"));
    assert!(provisioner.called("setexpiry administrator"));
    assert!(provisioner.called("exportkeytab"));

    // Resolver lines use the realm case as given, not the uppercased form
    let head = fs::read_to_string(&paths.resolv_head).unwrap();
    assert!(head.contains("domain EXAMPLE.lan\n"));
    assert!(head.contains("search EXAMPLE.lan\n"));
    assert!(!head.contains("EXAMPLE.LAN"));

    // The ticket principal is the only place the realm is uppercased
    assert!(provisioner.called("kinit administrator@EXAMPLE.LAN"));

    // Keytab restricted to owner read/write
    let mode = fs::metadata(&paths.keytab).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);

    // Fresh provision symlinks the generated Kerberos config
    let meta = fs::symlink_metadata(&paths.krb5_config).unwrap();
    assert!(meta.file_type().is_symlink());

    // Service lifecycle: stop before provisioning, start, final restart
    let calls = services.calls();
    assert_eq!(calls.first().map(String::as_str), Some("stop samba-ad-dc"));
    assert!(services.called("start samba-ad-dc"));
    assert_eq!(calls.last().map(String::as_str), Some("restart samba-ad-dc"));
}

#[test]
fn provision_removes_preexisting_service_config() {
    let dir = TempDir::new().unwrap();
    let paths = scratch_paths(&dir);
    fs::write(&paths.service_config, "[global]\n").unwrap();
    let config = provision_config();
    let provisioner = FakeProvisioner::default();
    let services = FakeServiceManager::default();

    Orchestrator::new(&config, &provisioner, &services, &paths)
        .with_readiness(quick_probe())
        .run()
        .unwrap();

    assert!(!paths.service_config.exists());
}

#[test]
fn provision_failure_aborts_before_any_later_step() {
    let dir = TempDir::new().unwrap();
    let paths = scratch_paths(&dir);
    let config = provision_config();
    let provisioner = FakeProvisioner {
        fail_provision: true,
        ..Default::default()
    };
    let services = FakeServiceManager::default();

    let result = Orchestrator::new(&config, &provisioner, &services, &paths)
        .with_readiness(quick_probe())
        .run();

    assert!(result.is_err());

    // No ticket acquisition (or anything else) after a failed provision
    assert!(!provisioner.called("setexpiry"));
    assert!(!provisioner.called("exportkeytab"));
    assert!(!provisioner.called("kinit"));
    assert!(!services.called("start samba-ad-dc"));
    assert!(!paths.resolv_head.exists());
}

#[test]
fn provision_continues_past_best_effort_failures() {
    let dir = TempDir::new().unwrap();
    let paths = scratch_paths(&dir);
    let config = provision_config();
    let provisioner = FakeProvisioner {
        fail_set_expiry: true,
        ..Default::default()
    };
    let services = FakeServiceManager {
        fail_stop: true,
        ..Default::default()
    };

    Orchestrator::new(&config, &provisioner, &services, &paths)
        .with_readiness(quick_probe())
        .run()
        .unwrap();

    assert!(provisioner.called("provision"));
    assert!(provisioner.called("kinit"));
}

#[test]
fn provision_errors_when_service_never_becomes_ready() {
    let dir = TempDir::new().unwrap();
    let paths = scratch_paths(&dir);
    let config = provision_config();
    let provisioner = FakeProvisioner::default();
    let services = FakeServiceManager {
        never_ready: true,
        ..Default::default()
    };

    let result = Orchestrator::new(&config, &provisioner, &services, &paths)
        .with_readiness(quick_probe())
        .run();

    match result {
        Err(FirstbootError::NotReady { unit, .. }) => assert_eq!(unit, "samba-ad-dc"),
        other => panic!("expected NotReady, got {:?}", other.map(|_| ())),
    }

    // The readiness gate is required: no ticket acquisition afterwards
    assert!(!provisioner.called("kinit"));
}

// ============================================================================
// Join variant
// ============================================================================

#[test]
fn join_happy_path_configures_the_host() {
    let dir = TempDir::new().unwrap();
    let paths = scratch_paths(&dir);

    // Simulate a previously half-configured node
    let state_dir = dir.path().join("state");
    fs::create_dir(&state_dir).unwrap();
    fs::write(state_dir.join("sam.ldb"), "stale").unwrap();
    fs::write(state_dir.join("secrets.tdb"), "stale").unwrap();
    fs::write(state_dir.join("unrelated.conf"), "keep").unwrap();

    let config = join_config();
    let provisioner = FakeProvisioner {
        state_dirs: vec![state_dir.clone()],
        ..Default::default()
    };
    let services = FakeServiceManager::default();

    Orchestrator::new(&config, &provisioner, &services, &paths)
        .with_readiness(quick_probe())
        .run()
        .unwrap();

    assert!(provisioner.called("join EXAMPLE example.lan"));

    // Stale database files are purged, everything else is left alone
    assert!(!state_dir.join("sam.ldb").exists());
    assert!(!state_dir.join("secrets.tdb").exists());
    assert!(state_dir.join("unrelated.conf").exists());

    // Nameserver rewrite and resolver refresh happen before the join
    let head = fs::read_to_string(&paths.resolv_head).unwrap();
    assert!(head.contains("nameserver 10.0.0.10\n"));
    assert!(head.contains("domain example.lan\n"));
    assert!(services.called("resolvconf"));

    // Secondary hostname applied and persisted
    assert_eq!(fs::read_to_string(&paths.hostname_file).unwrap(), "dc2\n");
    assert!(services.called("hostname dc2"));

    // Join copies the generated Kerberos config instead of symlinking
    let meta = fs::symlink_metadata(&paths.krb5_config).unwrap();
    assert!(meta.file_type().is_file());
}

#[test]
fn join_purge_runs_before_the_join_invocation() {
    let dir = TempDir::new().unwrap();
    let paths = scratch_paths(&dir);
    let config = join_config();
    let provisioner = FakeProvisioner::default();
    let services = FakeServiceManager::default();

    Orchestrator::new(&config, &provisioner, &services, &paths)
        .with_readiness(quick_probe())
        .run()
        .unwrap();

    let calls = provisioner.calls();
    let purge_idx = calls.iter().position(|c| c == "state-directories").unwrap();
    let join_idx = calls.iter().position(|c| c.starts_with("join")).unwrap();
    assert!(purge_idx < join_idx);
}

#[test]
fn join_failure_aborts_before_any_later_step() {
    let dir = TempDir::new().unwrap();
    let paths = scratch_paths(&dir);
    let config = join_config();
    let provisioner = FakeProvisioner {
        fail_join: true,
        ..Default::default()
    };
    let services = FakeServiceManager::default();

    let result = Orchestrator::new(&config, &provisioner, &services, &paths)
        .with_readiness(quick_probe())
        .run();

    assert!(result.is_err());
    assert!(!provisioner.called("exportkeytab"));
    assert!(!provisioner.called("kinit"));
    assert!(!services.called("start samba-ad-dc"));
}

#[test]
fn join_without_nameserver_skips_resolver_prologue() {
    let dir = TempDir::new().unwrap();
    let paths = scratch_paths(&dir);
    let config = FirstbootSeed {
        domain: Some("EXAMPLE".to_string()),
        admin_password: Some("Secret123".to_string()),
        ..Default::default()
    }
    .into_config(DeployMode::Join)
    .unwrap();
    let provisioner = FakeProvisioner::default();
    let services = FakeServiceManager::default();

    Orchestrator::new(&config, &provisioner, &services, &paths)
        .with_readiness(quick_probe())
        .run()
        .unwrap();

    assert!(!services.called("resolvconf"));
    let head = fs::read_to_string(&paths.resolv_head).unwrap();
    assert!(!head.contains("nameserver"));
}
