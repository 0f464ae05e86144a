//! Interactive first-boot dialogs.
//!
//! Used only when the non-interactive sources (flags, environment, preseed
//! file) leave the request incomplete. Asks for exactly the missing answers,
//! enforcing the same password policy the appliance has always enforced.

pub mod dialogs;

use std::io::{stdout, IsTerminal};

use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::debug;

use crate::config::{self, DeployMode, DEFAULT_ADMIN_USER, DEFAULT_DOMAIN};
use crate::error::{FirstbootError, Result};
use crate::password;
use crate::preseed::FirstbootSeed;
use dialogs::{DialogOutcome, Term};

const BACKTITLE: &str = "TurnKey Linux - First boot configuration";

/// RAII wrapper around terminal raw mode and the alternate screen.
///
/// Cleanup happens in Drop so the console is restored on every exit path,
/// including errors bubbling out of a dialog.
struct DialogSession {
    terminal: Term,
}

impl DialogSession {
    fn new() -> Result<Self> {
        enable_raw_mode()
            .map_err(|e| FirstbootError::dialog(format!("failed to enable raw mode: {}", e)))?;
        if let Err(e) = crossterm::execute!(stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(FirstbootError::dialog(format!(
                "failed to enter alternate screen: {}",
                e
            )));
        }

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)
            .map_err(|e| FirstbootError::dialog(format!("failed to create terminal: {}", e)))?;

        Ok(Self { terminal })
    }
}

impl Drop for DialogSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(stdout(), LeaveAlternateScreen);
    }
}

fn cancelled() -> FirstbootError {
    FirstbootError::dialog("cancelled by user")
}

/// Collect the missing answers interactively.
///
/// Returns the completed seed and the chosen deploy variant. Errors if
/// stdout is not a terminal (headless first boot with incomplete answers is
/// a configuration bug, not something to hang on).
pub fn collect_missing(
    seed: FirstbootSeed,
    forced_mode: Option<DeployMode>,
) -> Result<(FirstbootSeed, DeployMode)> {
    if !stdout().is_terminal() {
        return Err(FirstbootError::dialog(
            "parameters are incomplete and no terminal is attached for dialogs",
        ));
    }

    debug!("Entering interactive dialog flow");
    let mut session = DialogSession::new()?;
    let term = &mut session.terminal;

    let mode = match forced_mode {
        Some(mode) => mode,
        None if seed.join_nameserver.is_some() => DeployMode::Join,
        None => ask_mode(term)?,
    };

    let mut seed = seed;

    if seed.domain.is_none() && seed.realm.is_none() {
        seed.domain = Some(ask_domain(term)?);
    }

    if seed.realm.is_none() {
        let default_realm = seed
            .domain
            .as_deref()
            .map(config::derive_realm)
            .unwrap_or_default();
        seed.realm = Some(ask_realm(term, &default_realm)?);
    }

    if seed.admin_password.is_none() {
        let account = seed.admin_user.as_deref().unwrap_or(DEFAULT_ADMIN_USER);
        seed.admin_password = Some(ask_password(term, account)?);
    }

    if mode == DeployMode::Join && seed.join_nameserver.is_none() {
        seed.join_nameserver = Some(ask_nameserver(term)?);
    }

    Ok((seed, mode))
}

fn ask_mode(term: &mut Term) -> Result<DeployMode> {
    let choice = dialogs::menu(
        term,
        BACKTITLE,
        "This appliance can start a new domain or extend an existing one.",
        &[
            "Provision a new domain",
            "Join an existing domain as an additional controller",
        ],
    )?
    .ok_or_else(cancelled)?;

    Ok(match choice {
        0 => DeployMode::Provision,
        _ => DeployMode::Join,
    })
}

fn ask_domain(term: &mut Term) -> Result<String> {
    loop {
        let outcome = dialogs::input_box(
            term,
            "Samba Domain",
            "Enter the domain you would like to use.",
            DEFAULT_DOMAIN,
        )?;
        let value = match outcome {
            DialogOutcome::Submitted(value) => value,
            DialogOutcome::Cancelled => return Err(cancelled()),
        };

        // Preseeded answers use the literal DEFAULT to mean "keep the default"
        let value = if value == "DEFAULT" {
            DEFAULT_DOMAIN.to_string()
        } else {
            value
        };

        match config::validate_domain(&value) {
            Ok(()) => return Ok(value),
            Err(e) => dialogs::error_box(term, &e.to_string())?,
        }
    }
}

fn ask_realm(term: &mut Term, default_realm: &str) -> Result<String> {
    loop {
        let outcome = dialogs::input_box(
            term,
            "Kerberos Realm",
            "Enter the realm (DNS domain) for the new controller.",
            default_realm,
        )?;
        let value = match outcome {
            DialogOutcome::Submitted(value) => value,
            DialogOutcome::Cancelled => return Err(cancelled()),
        };

        match config::validate_realm(&value) {
            Ok(()) => return Ok(value),
            Err(e) => dialogs::error_box(term, &e.to_string())?,
        }
    }
}

fn ask_password(term: &mut Term, account: &str) -> Result<String> {
    let text = format!(
        "Enter new password for the samba '{}' account.\n\n\
         Password requirements:\n \
         - at least {} characters long\n \
         - no parentheses\n \
         - characters from at least {} of: uppercase, lowercase, numbers, symbols",
        account,
        password::MIN_LENGTH,
        password::MIN_COMPLEXITY,
    );

    loop {
        let first = match dialogs::password_box(term, "Samba Password", &text)? {
            DialogOutcome::Submitted(value) => value,
            DialogOutcome::Cancelled => return Err(cancelled()),
        };

        if let Err(violation) = password::check(&first) {
            dialogs::error_box(term, &violation.to_string())?;
            continue;
        }

        let second = match dialogs::password_box(term, "Samba Password", "Confirm password")? {
            DialogOutcome::Submitted(value) => value,
            DialogOutcome::Cancelled => return Err(cancelled()),
        };

        if first == second {
            return Ok(first);
        }
        dialogs::error_box(term, "Password mismatch, please try again.")?;
    }
}

fn ask_nameserver(term: &mut Term) -> Result<String> {
    loop {
        let outcome = dialogs::input_box(
            term,
            "Domain Nameserver",
            "Enter the IP address of a nameserver for the domain to join.",
            "",
        )?;
        let value = match outcome {
            DialogOutcome::Submitted(value) => value,
            DialogOutcome::Cancelled => return Err(cancelled()),
        };

        if value.parse::<std::net::IpAddr>().is_ok() {
            return Ok(value);
        }
        dialogs::error_box(
            term,
            &format!("`{}` is not a valid IP address.", value.trim()),
        )?;
    }
}
