//! dc-firstboot - Main entry point
//!
//! Assembles the provisioning request from its sources, falls back to the
//! interactive dialogs when answers are missing, and hands the validated
//! configuration to the orchestrator.

use std::path::Path;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use dc_firstboot::cli::{Cli, Commands};
use dc_firstboot::{
    process_guard, runner, sanity, ui, DeployMode, FirstbootSeed, Orchestrator, ProcessGuard,
    SambaProvisioner, SystemPaths, SystemdManager,
};

fn init_logging(debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "dc_firstboot=debug,info"
    } else {
        "dc_firstboot=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);
    info!("dc-firstboot starting up");

    if cli.dry_run {
        runner::enable_dry_run();
        info!("Dry-run mode: destructive operations will be logged, not executed");
    }

    // Ensure samba-tool children are terminated if we receive SIGINT/SIGTERM
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
        // Continue anyway - cleanup still happens via Drop
    }
    let _guard = ProcessGuard::new();

    if let Some(Commands::Validate { file }) = &cli.command {
        validate_preseed(file);
        return Ok(());
    }

    sanity::run_preflight_checks();

    let forced_mode = match cli.command {
        Some(Commands::Provision) => Some(DeployMode::Provision),
        Some(Commands::Join) => Some(DeployMode::Join),
        _ => None,
    };

    // Precedence: flags over environment over preseed file
    let flag_seed = FirstbootSeed {
        domain: cli.domain.clone(),
        realm: cli.realm.clone(),
        admin_user: cli.username.clone(),
        admin_password: cli.pass.clone(),
        join_nameserver: cli.join_ns.clone(),
        join_hostname: None,
    };
    let mut seed = flag_seed.overlaid_on(FirstbootSeed::from_env());
    if let Some(path) = &cli.preseed {
        seed = seed.overlaid_on(FirstbootSeed::load_from_file(path)?);
    }

    let (seed, mode) = if seed.is_complete() {
        debug!("Parameters complete, taking the non-interactive path");
        let mode = seed.mode(forced_mode);
        (seed, mode)
    } else {
        ui::collect_missing(seed, forced_mode)?
    };

    let config = seed.into_config(mode)?;
    info!(
        "Deploy variant: {} (domain {}, realm {})",
        config.mode, config.domain, config.realm
    );

    let provisioner = SambaProvisioner;
    let services = SystemdManager;
    let paths = SystemPaths::default();
    let orchestrator = Orchestrator::new(&config, &provisioner, &services, &paths);

    match orchestrator.run() {
        Ok(()) => {
            info!("First boot configuration complete");
            Ok(())
        }
        Err(e) => {
            error!("First boot configuration failed: {}", e);
            Err(e.into())
        }
    }
}

/// Validate a preseed answers file and report the result.
fn validate_preseed(path: &Path) {
    info!("Validating preseed file: {:?}", path);
    match FirstbootSeed::load_from_file(path) {
        Ok(seed) => {
            let mode = seed.mode(None);
            match seed.into_config(mode) {
                Ok(config) => {
                    println!(
                        "✓ Preseed file is valid: {} domain {} (realm {})",
                        config.mode, config.domain, config.realm
                    );
                }
                Err(e) => {
                    eprintln!("✗ Preseed validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("✗ Failed to load preseed file: {}", e);
            std::process::exit(1);
        }
    }
}
