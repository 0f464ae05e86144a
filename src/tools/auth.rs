//! Typed arguments for Kerberos ticket acquisition.

use crate::tool_args::ToolArgs;

/// Type-safe arguments for `kinit <principal>`.
///
/// The password is never placed on the command line; the runner writes it to
/// the child's stdin.
#[derive(Debug, Clone)]
pub struct KinitArgs {
    /// Principal to authenticate, e.g. `administrator@EXAMPLE.LAN`.
    pub principal: String,
}

impl ToolArgs for KinitArgs {
    fn program(&self) -> &'static str {
        "kinit"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![self.principal.clone()]
    }

    /// Writes the ticket cache.
    fn is_destructive(&self) -> bool {
        true
    }
}
