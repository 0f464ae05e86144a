//! Type-safe external tool contracts.
//!
//! Every external command the orchestrator runs (samba-tool, samba, kinit,
//! systemctl, hostname, resolvconf) is described by a struct implementing
//! `ToolArgs`. The struct definition is the contract: flag mismatches are
//! caught at compile time instead of at first boot on an appliance.

/// Trait for typed external tool invocations.
///
/// # Contract
///
/// - `program()`: the binary to execute, resolved via PATH.
/// - `to_cli_args()`: CLI arguments exactly as the tool expects them.
/// - `get_env_vars()`: environment variables required by the tool.
/// - `is_destructive()`: whether the invocation mutates system state;
///   destructive invocations are skipped in dry-run mode.
pub trait ToolArgs {
    /// The binary to execute (e.g. `samba-tool`).
    fn program(&self) -> &'static str;

    /// Convert struct fields to CLI arguments.
    ///
    /// Example: `["domain", "provision", "--realm=example.lan", ...]`
    fn to_cli_args(&self) -> Vec<String>;

    /// Get required environment variables.
    fn get_env_vars(&self) -> Vec<(String, String)> {
        vec![]
    }

    /// Whether this invocation mutates system state.
    ///
    /// Destructive invocations are logged and skipped in dry-run mode;
    /// read-only ones still execute so the preview stays realistic.
    fn is_destructive(&self) -> bool {
        true
    }

    /// CLI arguments safe to log.
    ///
    /// Tools that take a credential on the command line override this to
    /// mask it; the default assumes there is nothing to hide.
    fn redacted_cli_args(&self) -> Vec<String> {
        self.to_cli_args()
    }
}
