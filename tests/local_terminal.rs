// tests/local_terminal.rs

#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use provisioner::context::ExecContext;
use provisioner::engine::Strategy;
use provisioner::errors::InstallError;
use provisioner::terminal::{Capture, LocalTerminal, Terminal};
use provisioner_test_utils::builders::{CommandBuilder, PackageBuilder, TestEngine};
use provisioner_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const TARGET: &str = "ubuntu:22.04";

#[tokio::test]
async fn combined_mode_captures_both_streams() -> TestResult {
    init_tracing();

    let term = LocalTerminal::new();
    let ctx = ExecContext::background();
    let out = term
        .combined(&ctx, "echo out; echo err 1>&2", "bash")
        .await?;

    let text = String::from_utf8(out)?;
    assert!(text.contains("out"));
    assert!(text.contains("err"));
    Ok(())
}

#[tokio::test]
async fn single_stream_modes_capture_only_their_stream() -> TestResult {
    init_tracing();

    let term = LocalTerminal::new();
    let ctx = ExecContext::background();
    let script = "echo to-stdout; echo to-stderr 1>&2";

    let out = term.stdout_only(&ctx, script, "bash").await?;
    assert_eq!(String::from_utf8(out)?, "to-stdout\n");

    let err = term.stderr_only(&ctx, script, "bash").await?;
    assert_eq!(String::from_utf8(err)?, "to-stderr\n");
    Ok(())
}

#[tokio::test]
async fn large_output_does_not_deadlock() -> TestResult {
    init_tracing();

    let term = LocalTerminal::new();
    let ctx = ExecContext::background();

    // Well past a typical 64 KiB pipe buffer.
    let out = with_timeout(term.stdout_only(&ctx, "head -c 1000000 /dev/zero", "bash")).await?;
    assert_eq!(out.len(), 1_000_000);
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_is_an_exit_error() -> TestResult {
    init_tracing();

    let term = LocalTerminal::new();
    let ctx = ExecContext::background();

    match term.error_only(&ctx, "exit 3", "bash").await {
        Err(InstallError::Exit { code }) => assert_eq!(code, Some(3)),
        other => panic!("expected exit error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn missing_shell_is_a_start_error() -> TestResult {
    init_tracing();

    let term = LocalTerminal::new();
    let ctx = ExecContext::background();

    let err = term
        .error_only(&ctx, "true", "/nonexistent/shell-for-tests")
        .await
        .expect_err("shell does not exist");

    assert!(err.is_start(), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn fire_and_forget_swallows_failures() -> TestResult {
    init_tracing();

    let term = LocalTerminal::new();
    let ctx = ExecContext::background();

    term.fire_and_forget(&ctx, "exit 1", "bash").await;
    let execution = term.execute(&ctx, "echo hidden; exit 1", "bash", Capture::Silent).await;
    assert!(execution.is_success());
    assert!(execution.output.is_empty());
    Ok(())
}

#[tokio::test]
async fn deadline_kills_the_process() -> TestResult {
    init_tracing();

    let term = LocalTerminal::new();
    let ctx = ExecContext::background().with_timeout(Duration::from_millis(50));

    let started = Instant::now();
    let err = term
        .combined(&ctx, "sleep 5", "bash")
        .await
        .expect_err("deadline must fire");

    assert!(err.is_timeout(), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}

#[tokio::test]
async fn cancelling_the_parent_kills_the_process() -> TestResult {
    init_tracing();

    let term = LocalTerminal::new();
    let (parent, handle) = ExecContext::cancellable();
    let ctx = parent.with_timeout(Duration::ZERO);

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let started = Instant::now();
    let err = term
        .error_only(&ctx, "sleep 5", "bash")
        .await
        .expect_err("cancellation must fire");
    canceller.await?;

    assert!(matches!(err, InstallError::Cancelled), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}

#[tokio::test]
async fn already_cancelled_context_spawns_nothing() -> TestResult {
    init_tracing();

    let term = LocalTerminal::new();
    let (ctx, handle) = ExecContext::cancellable();
    handle.cancel();
    assert!(handle.is_cancelled());

    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("ran");
    let script = format!("touch {}", marker.display());

    let err = term.error_only(&ctx, &script, "bash").await.expect_err("cancelled");
    assert!(matches!(err, InstallError::Cancelled));
    assert!(!marker.exists());
    Ok(())
}

#[tokio::test]
async fn db_prep_scenario_stops_at_the_fatal_command() -> TestResult {
    init_tracing();

    let t = TestEngine::new(Arc::new(LocalTerminal::new()));
    let mut pkg = PackageBuilder::new("db-prep", TARGET)
        .command(CommandBuilder::new("echo ok").build())
        .command(
            CommandBuilder::with_error("false", "database preparation failed")
                .fatal()
                .build(),
        )
        .command(CommandBuilder::new("echo never").build())
        .build();

    let report = t
        .engine
        .run_report(&mut pkg, TARGET, Strategy::Combined)
        .await;

    let output = String::from_utf8(report.output)?;
    assert!(output.contains("ok"));
    assert!(!output.contains("never"));
    assert_eq!(report.executed, 2);

    let err = report.error.expect("fatal command fails the run");
    assert!(err.to_string().contains("database preparation failed"));
    assert!(err.is_exit());
    Ok(())
}

#[tokio::test]
async fn command_timeout_bounds_wall_time() -> TestResult {
    init_tracing();

    let t = TestEngine::new(Arc::new(LocalTerminal::new()));
    let mut pkg = PackageBuilder::new("db-prep", TARGET)
        .command(
            CommandBuilder::with_error("sleep 5", "database did not come up")
                .fatal()
                .timeout(Duration::from_millis(50))
                .build(),
        )
        .build();

    let started = Instant::now();
    let err = t
        .engine
        .run_error_only(&mut pkg, TARGET)
        .await
        .expect_err("timeout must fail the run");
    let elapsed = started.elapsed();

    assert!(err.is_timeout(), "got {err:?}");
    assert!(err.to_string().contains("database did not come up"));
    assert!(err.to_string().contains("deadline exceeded"));
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    Ok(())
}

#[tokio::test]
async fn non_fatal_timeout_lets_later_commands_run() -> TestResult {
    init_tracing();

    let t = TestEngine::new(Arc::new(LocalTerminal::new()));
    let mut pkg = PackageBuilder::new("cleanup", TARGET)
        .command(
            CommandBuilder::new("sleep 5")
                .timeout(Duration::from_millis(50))
                .build(),
        )
        .command(CommandBuilder::new("true").build())
        .build();

    let report = t
        .engine
        .run_report(&mut pkg, TARGET, Strategy::ErrorOnly)
        .await;

    assert!(report.error.is_none());
    assert_eq!(report.executed, 2);
    assert_eq!(report.failures, 1);
    Ok(())
}

#[tokio::test]
async fn cancelled_engine_context_aborts_every_strategy() -> TestResult {
    init_tracing();

    let (parent, handle) = ExecContext::cancellable();
    handle.cancel();

    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("ran");

    let t = TestEngine::new(Arc::new(LocalTerminal::new()));
    let engine = t.engine.clone().with_context(parent);
    let mut pkg = PackageBuilder::new("bootstrap", TARGET)
        .command(CommandBuilder::new(&format!("touch {}", marker.display())).build())
        .command(CommandBuilder::new("true").build())
        .build();

    for strategy in [
        Strategy::Combined,
        Strategy::ErrorOnly,
        Strategy::Silent,
        Strategy::Stdout,
        Strategy::Stderr,
    ] {
        let report = engine.run_report(&mut pkg, TARGET, strategy).await;
        assert!(
            matches!(report.error, Some(InstallError::Cancelled)),
            "{strategy}: {:?}",
            report.error
        );
        assert_eq!(report.executed, 0, "{strategy}");
    }

    assert!(engine.run_error_only(&mut pkg, TARGET).await.is_err());
    assert!(engine.run_silently(&mut pkg, TARGET).await.is_err());
    assert!(!marker.exists());
    Ok(())
}

#[tokio::test]
async fn cancel_during_a_silent_run_stops_the_remaining_commands() -> TestResult {
    init_tracing();

    let (parent, handle) = ExecContext::cancellable();
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("after-cancel");

    let t = TestEngine::new(Arc::new(LocalTerminal::new()));
    let engine = t.engine.clone().with_context(parent);
    let mut pkg = PackageBuilder::new("cleanup", TARGET)
        .command(CommandBuilder::new("sleep 5").build())
        .command(CommandBuilder::new(&format!("touch {}", marker.display())).build())
        .build();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let started = Instant::now();
    let report = with_timeout(engine.run_report(&mut pkg, TARGET, Strategy::Silent)).await;
    canceller.await?;

    let err = report.error.expect("cancellation aborts a silent run");
    assert!(matches!(
        err,
        InstallError::CommandFailed { ref source, .. } if matches!(**source, InstallError::Cancelled)
    ));
    assert_eq!(report.executed, 1);
    assert!(!marker.exists());
    assert!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}
