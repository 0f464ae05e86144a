//! Typed arguments for `samba-tool user` operations.

use crate::tool_args::ToolArgs;

/// Type-safe arguments for `samba-tool user setexpiry`.
///
/// First boot disables password expiry for the administrator account so the
/// appliance does not lock itself out before anyone logs in.
#[derive(Debug, Clone)]
pub struct SetExpiryArgs {
    /// Account to adjust.
    pub account: String,
    /// Disable expiry entirely.
    pub no_expiry: bool,
}

impl SetExpiryArgs {
    pub fn never_expires(account: &str) -> Self {
        Self {
            account: account.to_string(),
            no_expiry: true,
        }
    }
}

impl ToolArgs for SetExpiryArgs {
    fn program(&self) -> &'static str {
        "samba-tool"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            "user".to_string(),
            "setexpiry".to_string(),
            self.account.clone(),
        ];
        if self.no_expiry {
            args.push("--noexpiry".to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setexpiry_args() {
        let args = SetExpiryArgs::never_expires("administrator");
        assert_eq!(
            args.to_cli_args(),
            ["user", "setexpiry", "administrator", "--noexpiry"]
        );
        assert!(args.is_destructive());
    }
}
