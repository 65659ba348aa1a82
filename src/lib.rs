// src/lib.rs

pub mod cli;
pub mod config;
pub mod context;
pub mod detect;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod package;
pub mod redact;
pub mod terminal;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{Phase, Plan, default_plan_path, load_and_validate};
use crate::context::ExecContext;
use crate::engine::Engine;
use crate::errors::InstallError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::logging::{LeveledLogger, Transcript};
use crate::redact::Redactor;
use crate::terminal::LocalTerminal;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - plan loading and validation
/// - redactor, install log and optional transcript
/// - target resolution (CLI, plan, then host detection)
/// - the engine with a local terminal and a Ctrl-C cancellable context
///
/// Phases run in plan order and the first error stops the install. The
/// returned error has already been passed through the redactor.
pub async fn run(args: CliArgs) -> Result<()> {
    let redactor = Redactor::default();
    run_install(args, &redactor)
        .await
        .map_err(|err| anyhow!(redactor.redact(&format!("{err:#}"))))
}

async fn run_install(args: CliArgs, redactor: &Redactor) -> Result<()> {
    let fs = RealFileSystem;
    let plan_path = args.plan.clone().unwrap_or_else(default_plan_path);
    let plan = load_and_validate(&fs, &plan_path)
        .with_context(|| format!("loading install plan {}", plan_path.display()))?;

    let install = plan.install().clone();
    redactor.set_enabled(install.redact);
    redactor.add_secrets(plan.secrets().resolve());
    debug!(secrets = redactor.secret_count(), "registered plan secrets");

    let target_id = resolve_target(&args, &plan, &fs)?;
    info!(%target_id, "resolved install target");

    let phases = select_phases(plan.into_phases(), &args.phases)?;

    if args.dry_run {
        print_dry_run(&phases, &target_id, redactor);
        return Ok(());
    }

    let logger = LeveledLogger::open(&install.log_file, redactor.clone())
        .with_context(|| format!("opening install log {}", install.log_file.display()))?
        .with_trace(args.trace || install.trace)
        .with_quiet(args.quiet || install.quiet);

    // Ctrl-C cancels the command in flight; the engine then reports it.
    let (parent, cancel) = ExecContext::cancellable();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        cancel.cancel();
    });

    let mut engine =
        Engine::new(Arc::new(LocalTerminal::new()), logger.clone()).with_context(parent.clone());
    if let Some(path) = &install.transcript_file {
        engine = engine.with_transcript(open_transcript(path)?);
    }

    logger.info(format!(
        "starting install for target {target_id} ({} phase(s))",
        phases.len()
    ));

    for phase in phases {
        if let Some(reason) = parent.interrupted() {
            logger.error(format!("install interrupted before phase '{}'", phase.label()));
            return Err(reason.into_error())
                .with_context(|| format!("install stopped before phase '{}'", phase.label()));
        }
        run_phase(&engine, phase, &target_id).await?;
    }

    logger.info("install complete");
    logger.echo("Install complete");
    Ok(())
}

fn open_transcript(path: &Path) -> Result<Transcript> {
    Transcript::open(path)
        .with_context(|| format!("opening command transcript {}", path.display()))
}

/// Run one phase through the engine with the phase's strategy.
pub async fn run_phase(
    engine: &Engine,
    mut phase: Phase,
    target_id: &str,
) -> std::result::Result<(), InstallError> {
    let logger = engine.logger();
    let label = phase.label().to_string();

    logger.echo(format!("==> {label}"));
    logger.info(format!("phase '{label}' started ({})", phase.strategy));

    match engine.run(&mut phase.package, target_id, phase.strategy).await {
        Ok(output) => {
            if !output.is_empty() {
                logger.trace(format!(
                    "phase '{label}' output:\n{}",
                    String::from_utf8_lossy(&output)
                ));
            }
            logger.info(format!("phase '{label}' completed"));
            Ok(())
        }
        Err(err) => {
            logger.error(format!("phase '{label}' failed: {err}"));
            Err(err)
        }
    }
}

/// CLI flag first, then `[install].target`, then the host's os-release.
pub fn resolve_target(
    args: &CliArgs,
    plan: &Plan,
    fs: &dyn FileSystem,
) -> std::result::Result<String, InstallError> {
    let explicit = args
        .target
        .as_deref()
        .or(plan.install().target.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match explicit {
        Some(id) => Ok(id.to_string()),
        None => detect::detect_target(fs),
    }
}

/// Keep plan order; every requested label must exist.
pub fn select_phases(
    phases: Vec<Phase>,
    wanted: &[String],
) -> std::result::Result<Vec<Phase>, InstallError> {
    if wanted.is_empty() {
        return Ok(phases);
    }

    if let Some(missing) = wanted
        .iter()
        .find(|w| !phases.iter().any(|p| p.label() == w.as_str()))
    {
        return Err(InstallError::ConfigError(format!(
            "unknown phase '{missing}' requested"
        )));
    }

    Ok(phases
        .into_iter()
        .filter(|p| wanted.iter().any(|w| w == p.label()))
        .collect())
}

/// Boxed banner printed by `main` when the install stops.
pub fn error_banner(message: &str) -> String {
    let mut lines = vec!["INSTALL FAILED".to_string(), String::new()];
    lines.extend(message.lines().map(str::to_string));

    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let border = format!("+{}+", "-".repeat(width + 2));

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    for line in &lines {
        let pad = width - line.chars().count();
        out.push_str(&format!("| {}{} |\n", line, " ".repeat(pad)));
    }
    out.push_str(&border);
    out
}

/// Dry-run output: phases and redacted commands for the target.
fn print_dry_run(phases: &[Phase], target_id: &str, redactor: &Redactor) {
    println!("provisioner dry-run");
    println!("  target = {target_id}");
    println!();

    for phase in phases {
        println!("phase {} ({})", phase.label(), phase.strategy);
        match phase.package.find_target(target_id) {
            Ok(target) => {
                println!("  shell: {}", target.shell);
                for (idx, command) in target.commands.iter().enumerate() {
                    let timeout = command.timeout_duration();
                    println!(
                        "  {:>3}. {}{}{}",
                        idx + 1,
                        redactor.redact(command.text()),
                        if command.is_fatal() { "  [fatal]" } else { "" },
                        if timeout.is_zero() {
                            String::new()
                        } else {
                            format!("  [timeout {timeout:?}]")
                        }
                    );
                }
            }
            Err(_) => println!(
                "  (target {target_id} not registered; known: {})",
                phase.package.target_ids().collect::<Vec<_>>().join(", ")
            ),
        }
    }

    debug!("dry-run complete (no execution)");
}
