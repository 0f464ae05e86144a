//! Type-safe external tool execution.
//!
//! This module is the ONLY sanctioned way to execute external tools. All
//! invocations go through `run_tool`/`run_tool_with_stdin` to ensure:
//!
//! - Process group isolation and PID registration for cleanup
//! - Type-safe argument passing via the `ToolArgs` trait
//! - A single dry-run gate for destructive operations
//!
//! Raw `Command::new("samba-tool")` anywhere else violates the architecture.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::error::{FirstbootError, Result};
use crate::process_guard::{ChildRegistry, CommandProcessGroup};
use crate::tool_args::ToolArgs;

/// Global dry-run switch.
///
/// When set, destructive tool invocations (and the orchestrator's file
/// mutations, which consult the same switch) are logged and skipped.
static DRY_RUN: AtomicBool = AtomicBool::new(false);

/// Enable dry-run mode.
pub fn enable_dry_run() {
    DRY_RUN.store(true, Ordering::SeqCst);
}

/// Disable dry-run mode.
pub fn disable_dry_run() {
    DRY_RUN.store(false, Ordering::SeqCst);
}

/// Whether dry-run mode is active.
pub fn is_dry_run() -> bool {
    DRY_RUN.load(Ordering::SeqCst)
}

/// Output from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the tool exited with code 0.
    pub success: bool,
}

impl ToolOutput {
    fn skipped() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    /// Turn a non-zero exit into an error carrying the tool's stderr.
    pub fn ensure_success(&self, tool: &str, context: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(FirstbootError::tool(
                tool,
                format!(
                    "{} (exit code {}): {}",
                    context,
                    self.exit_code.unwrap_or(-1),
                    self.stderr.trim()
                ),
            ))
        }
    }
}

/// Execute an external tool with typed arguments.
pub fn run_tool<T: ToolArgs>(args: &T) -> Result<ToolOutput> {
    run(args, None)
}

/// Execute an external tool, writing `secret` to its stdin.
///
/// Used for tools that read credentials from stdin so secrets never appear
/// on a command line visible in the process table.
pub fn run_tool_with_stdin<T: ToolArgs>(args: &T, secret: &str) -> Result<ToolOutput> {
    run(args, Some(secret))
}

fn run<T: ToolArgs>(args: &T, stdin_data: Option<&str>) -> Result<ToolOutput> {
    let program = args.program();
    let cli_args = args.to_cli_args();
    let env_vars = args.get_env_vars();

    if args.is_destructive() && is_dry_run() {
        info!(
            "dry-run: skipping {} {}",
            program,
            args.redacted_cli_args().join(" ")
        );
        return Ok(ToolOutput::skipped());
    }

    debug!("run_tool: {} {}", program, args.redacted_cli_args().join(" "));

    let mut cmd = Command::new(program);
    cmd.args(&cli_args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .in_new_process_group();

    for (key, value) in &env_vars {
        cmd.env(key, value);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| FirstbootError::tool(program, format!("failed to spawn: {}", e)))?;
    let pid = child.id();

    {
        let registry = ChildRegistry::global();
        let mut guard = registry.lock().expect("ChildRegistry mutex poisoned");
        guard.register(pid);
    }

    if let Some(secret) = stdin_data {
        if let Some(mut stdin) = child.stdin.take() {
            // Ignore EPIPE: the tool may exit before reading everything
            let _ = stdin.write_all(secret.as_bytes());
            let _ = stdin.write_all(b"\n");
        }
    }

    let output = child.wait_with_output().map_err(|e| {
        let registry = ChildRegistry::global();
        if let Ok(mut guard) = registry.lock() {
            guard.unregister(pid);
        }
        FirstbootError::tool(program, format!("failed waiting for child: {}", e))
    })?;

    {
        let registry = ChildRegistry::global();
        let mut guard = registry.lock().expect("ChildRegistry mutex poisoned");
        guard.unregister(pid);
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code();
    let success = output.status.success();

    if success {
        debug!("{} executed successfully", program);
    } else {
        debug!(
            "{} failed with exit code {}",
            program,
            exit_code.unwrap_or(-1)
        );
    }

    Ok(ToolOutput {
        stdout,
        stderr,
        exit_code,
        success,
    })
}
