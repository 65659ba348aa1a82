// src/context.rs

//! Deadline and cancellation context handed to every terminal call.
//!
//! An [`ExecContext`] carries an optional deadline and an optional parent
//! cancellation signal. The engine derives one short-lived child per command
//! with [`ExecContext::with_timeout`]; the child (and the timer it creates
//! while being awaited) is dropped as soon as that command finishes.
//!
//! Firing a [`CancelHandle`] interrupts every context derived from the
//! cancellable root, which is how a caller aborts a whole install.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::errors::InstallError;

/// Why a context stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    DeadlineExceeded,
    Cancelled,
}

impl Interrupt {
    pub fn into_error(self) -> InstallError {
        match self {
            Interrupt::DeadlineExceeded => InstallError::Timeout,
            Interrupt::Cancelled => InstallError::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Sender side of a cancellable root context.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // send_replace never fails, even with no receivers left.
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl ExecContext {
    /// Unbounded context: no deadline, never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Root context that can be cancelled through the returned handle.
    pub fn cancellable() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            deadline: None,
            cancel: Some(rx),
        };
        (ctx, CancelHandle { tx })
    }

    /// Derive a child context.
    ///
    /// A zero `timeout` keeps the parent's deadline (unbounded if the parent
    /// has none), as does one too large to represent. Otherwise the child
    /// expires at the earlier of the parent's deadline and `now + timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let own = if timeout.is_zero() {
            None
        } else {
            Instant::now().checked_add(timeout)
        };
        let deadline = match (self.deadline, own) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, None) => parent,
            (None, own) => own,
        };

        Self {
            deadline,
            cancel: self.cancel.clone(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check, used before spawning anything.
    pub fn interrupted(&self) -> Option<Interrupt> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(Interrupt::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interrupt::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolve once the deadline passes or the parent is cancelled.
    ///
    /// Never resolves for a background context.
    pub async fn done(&self) -> Interrupt {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    // A dropped handle can no longer cancel us.
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancelled => Interrupt::Cancelled,
            _ = deadline => Interrupt::DeadlineExceeded,
        }
    }
}
