//! Typed arguments for hostname and resolver cache plumbing.

use crate::tool_args::ToolArgs;

/// Type-safe arguments for `hostname <name>`.
///
/// Applies the name to the running kernel; the persistent
/// `/etc/hostname` write happens separately in the orchestrator.
#[derive(Debug, Clone)]
pub struct SetHostnameArgs {
    pub hostname: String,
}

impl ToolArgs for SetHostnameArgs {
    fn program(&self) -> &'static str {
        "hostname"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![self.hostname.clone()]
    }
}

/// Type-safe arguments for `resolvconf -u`.
///
/// Regenerates `/etc/resolv.conf` from the head/base fragments after the
/// head file has been rewritten.
#[derive(Debug, Clone, Default)]
pub struct ResolvconfRefreshArgs;

impl ToolArgs for ResolvconfRefreshArgs {
    fn program(&self) -> &'static str {
        "resolvconf"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["-u".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_args() {
        let args = SetHostnameArgs {
            hostname: "dc2".to_string(),
        };
        assert_eq!(args.program(), "hostname");
        assert_eq!(args.to_cli_args(), ["dc2"]);
        assert!(args.is_destructive());
    }

    #[test]
    fn test_resolvconf_refresh_args() {
        let args = ResolvconfRefreshArgs;
        assert_eq!(args.program(), "resolvconf");
        assert_eq!(args.to_cli_args(), ["-u"]);
    }
}
