// src/terminal/local.rs

//! Real terminal backed by `tokio::process`.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::context::ExecContext;
use crate::errors::InstallError;

use super::{Capture, Execution, Terminal, TerminalFuture};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTerminal;

impl LocalTerminal {
    pub fn new() -> Self {
        Self
    }
}

impl Terminal for LocalTerminal {
    fn execute<'a>(
        &'a self,
        ctx: &'a ExecContext,
        command: &'a str,
        shell: &'a str,
        capture: Capture,
    ) -> TerminalFuture<'a> {
        Box::pin(async move {
            let execution = run_local(ctx, command, shell, capture).await;
            if capture == Capture::Silent {
                if let Some(err) = &execution.error {
                    debug!(shell, error = %err, "ignoring failure of fire-and-forget command");
                }
                return Execution::default();
            }
            execution
        })
    }
}

async fn run_local(ctx: &ExecContext, command: &str, shell: &str, capture: Capture) -> Execution {
    // Never start a process whose context has already fired.
    if let Some(reason) = ctx.interrupted() {
        return Execution::failure(Vec::new(), reason.into_error());
    }

    let (out, err) = match capture {
        Capture::Combined => (Stdio::piped(), Stdio::piped()),
        Capture::Stdout => (Stdio::piped(), Stdio::null()),
        Capture::Stderr => (Stdio::null(), Stdio::piped()),
        Capture::ErrorOnly | Capture::Silent => (Stdio::null(), Stdio::null()),
    };

    let mut cmd = Command::new(shell);
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(out)
        .stderr(err)
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(source) => {
            return Execution::failure(
                Vec::new(),
                InstallError::Start {
                    shell: shell.to_string(),
                    source,
                },
            );
        }
    };

    // Pipes are drained while waiting; reading them only after exit could
    // deadlock on a full pipe buffer.
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let outcome = tokio::select! {
        res = wait_draining(&mut child, stdout, stderr, tx) => Ok(res),
        reason = ctx.done() => Err(reason),
    };

    let mut output = Vec::new();
    while let Ok(chunk) = rx.try_recv() {
        output.extend_from_slice(&chunk);
    }

    match outcome {
        Ok(Ok(status)) if status.success() => Execution::success(output),
        Ok(Ok(status)) => Execution::failure(
            output,
            InstallError::Exit {
                code: status.code(),
            },
        ),
        Ok(Err(e)) => Execution::failure(output, InstallError::IoError(e)),
        Err(reason) => {
            debug!(shell, ?reason, "context fired; killing child process");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill child process");
            }
            Execution::failure(output, reason.into_error())
        }
    }
}

async fn wait_draining(
    child: &mut Child,
    stdout: Option<tokio::process::ChildStdout>,
    stderr: Option<tokio::process::ChildStderr>,
    tx: mpsc::UnboundedSender<Vec<u8>>,
) -> std::io::Result<ExitStatus> {
    let (status, out_res, err_res) = tokio::join!(
        child.wait(),
        pump(stdout, tx.clone()),
        pump(stderr, tx),
    );
    out_res?;
    err_res?;
    status
}

/// Forward chunks from one pipe in arrival order until EOF.
async fn pump<R>(reader: Option<R>, tx: mpsc::UnboundedSender<Vec<u8>>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(());
    };

    let mut buf = vec![0u8; 8 * 1024];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        // The receiver outlives the pumps, so this cannot fail in practice.
        let _ = tx.send(buf[..n].to_vec());
    }
}
