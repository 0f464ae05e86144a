//! Typed arguments for systemctl unit control.

use strum::{Display, EnumString};

use crate::tool_args::ToolArgs;

/// systemctl verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    IsActive,
}

/// Type-safe arguments for `systemctl <action> <unit>`.
#[derive(Debug, Clone)]
pub struct SystemctlArgs {
    /// Verb to run.
    pub action: ServiceAction,
    /// Unit name, e.g. `samba-ad-dc`.
    pub unit: String,
}

impl SystemctlArgs {
    pub fn new(action: ServiceAction, unit: &str) -> Self {
        Self {
            action,
            unit: unit.to_string(),
        }
    }
}

impl ToolArgs for SystemctlArgs {
    fn program(&self) -> &'static str {
        "systemctl"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![self.action.to_string(), self.unit.clone()]
    }

    /// Status queries are READ-ONLY; start/stop/restart mutate.
    fn is_destructive(&self) -> bool {
        !matches!(self.action, ServiceAction::IsActive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_spelling() {
        assert_eq!(ServiceAction::Start.to_string(), "start");
        assert_eq!(ServiceAction::IsActive.to_string(), "is-active");
    }

    #[test]
    fn test_systemctl_args() {
        let args = SystemctlArgs::new(ServiceAction::Restart, "samba-ad-dc");
        assert_eq!(args.program(), "systemctl");
        assert_eq!(args.to_cli_args(), ["restart", "samba-ad-dc"]);
        assert!(args.is_destructive());
    }

    #[test]
    fn test_is_active_is_read_only() {
        let args = SystemctlArgs::new(ServiceAction::IsActive, "samba-ad-dc");
        assert!(!args.is_destructive());
    }
}
