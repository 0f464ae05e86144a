//! The service-manager capability seam.
//!
//! `ServiceManager` abstracts unit control, hostname application, and
//! resolver cache refresh; `SystemdManager` is the production implementation
//! going through the typed runner. Readiness after a start is a bounded
//! polling loop, not a blind sleep: slow first boots on small hardware were
//! the main source of flaky ticket acquisition.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{FirstbootError, Result};
use crate::runner::run_tool;
use crate::tools::host::{ResolvconfRefreshArgs, SetHostnameArgs};
use crate::tools::service::{ServiceAction, SystemctlArgs};

/// Unit name of the directory service.
pub const DIRECTORY_UNIT: &str = "samba-ad-dc";

/// Operations the orchestrator needs from the init system and host plumbing.
pub trait ServiceManager {
    fn start(&self, unit: &str) -> Result<()>;
    fn stop(&self, unit: &str) -> Result<()>;
    fn restart(&self, unit: &str) -> Result<()>;
    fn is_active(&self, unit: &str) -> bool;

    /// Apply a hostname to the running kernel.
    fn set_hostname(&self, hostname: &str) -> Result<()>;

    /// Regenerate the resolver configuration from its fragments.
    fn refresh_resolver(&self) -> Result<()>;
}

/// Production implementation backed by systemctl / hostname / resolvconf.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemdManager;

impl SystemdManager {
    fn unit_action(&self, action: ServiceAction, unit: &str) -> Result<()> {
        let args = SystemctlArgs::new(action, unit);
        run_tool(&args)?.ensure_success("systemctl", &format!("{} {}", action, unit))
    }
}

impl ServiceManager for SystemdManager {
    fn start(&self, unit: &str) -> Result<()> {
        self.unit_action(ServiceAction::Start, unit)
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.unit_action(ServiceAction::Stop, unit)
    }

    fn restart(&self, unit: &str) -> Result<()> {
        self.unit_action(ServiceAction::Restart, unit)
    }

    fn is_active(&self, unit: &str) -> bool {
        let args = SystemctlArgs::new(ServiceAction::IsActive, unit);
        match run_tool(&args) {
            Ok(output) => output.success,
            Err(_) => false,
        }
    }

    fn set_hostname(&self, hostname: &str) -> Result<()> {
        let args = SetHostnameArgs {
            hostname: hostname.to_string(),
        };
        run_tool(&args)?.ensure_success("hostname", "apply hostname")
    }

    fn refresh_resolver(&self) -> Result<()> {
        run_tool(&ResolvconfRefreshArgs)?.ensure_success("resolvconf", "refresh resolver")
    }
}

/// Bounded readiness polling parameters.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessProbe {
    /// Give up after this long.
    pub timeout: Duration,
    /// Poll interval.
    pub interval: Duration,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            interval: Duration::from_millis(500),
        }
    }
}

/// Poll `unit` until it reports active, bounded by the probe's timeout.
pub fn wait_until_active<S: ServiceManager>(
    services: &S,
    unit: &str,
    probe: &ReadinessProbe,
) -> Result<()> {
    let start = Instant::now();

    loop {
        if services.is_active(unit) {
            debug!("Unit {} active after {:?}", unit, start.elapsed());
            return Ok(());
        }
        if start.elapsed() >= probe.timeout {
            return Err(FirstbootError::NotReady {
                unit: unit.to_string(),
                timeout_secs: probe.timeout.as_secs(),
            });
        }
        std::thread::sleep(probe.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Becomes active after a fixed number of polls.
    struct CountdownManager {
        remaining: Cell<u32>,
    }

    impl ServiceManager for CountdownManager {
        fn start(&self, _unit: &str) -> Result<()> {
            Ok(())
        }
        fn stop(&self, _unit: &str) -> Result<()> {
            Ok(())
        }
        fn restart(&self, _unit: &str) -> Result<()> {
            Ok(())
        }
        fn is_active(&self, _unit: &str) -> bool {
            let left = self.remaining.get();
            if left == 0 {
                true
            } else {
                self.remaining.set(left - 1);
                false
            }
        }
        fn set_hostname(&self, _hostname: &str) -> Result<()> {
            Ok(())
        }
        fn refresh_resolver(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_wait_until_active_succeeds_after_polls() {
        let manager = CountdownManager {
            remaining: Cell::new(3),
        };
        let probe = ReadinessProbe {
            timeout: Duration::from_secs(5),
            interval: Duration::from_millis(1),
        };
        assert!(wait_until_active(&manager, DIRECTORY_UNIT, &probe).is_ok());
    }

    #[test]
    fn test_wait_until_active_times_out() {
        let manager = CountdownManager {
            remaining: Cell::new(u32::MAX),
        };
        let probe = ReadinessProbe {
            timeout: Duration::from_millis(20),
            interval: Duration::from_millis(5),
        };
        let err = wait_until_active(&manager, DIRECTORY_UNIT, &probe).unwrap_err();
        assert!(matches!(err, FirstbootError::NotReady { .. }));
    }

    #[test]
    fn test_wait_until_active_immediate() {
        let manager = CountdownManager {
            remaining: Cell::new(0),
        };
        let probe = ReadinessProbe::default();
        assert!(wait_until_active(&manager, DIRECTORY_UNIT, &probe).is_ok());
    }
}
