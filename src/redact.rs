// src/redact.rs

//! Secret redaction applied to everything that is logged or echoed.
//!
//! A [`Redactor`] is a clonable handle onto shared state: every clone
//! sees secrets registered through any other clone. Secrets are only ever
//! appended (they become known while the install plan is processed) and are
//! matched literally.
//!
//! Readers take a snapshot of the list (`Arc<[String]>`) so a concurrent
//! registration never blocks or tears an in-flight redaction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::trace;

/// Replacement token written in place of every registered secret.
pub const REDACTED_SENTINEL: &str = "[~REDACTED~]";

#[derive(Debug)]
struct Shared {
    enabled: AtomicBool,
    secrets: RwLock<Arc<[String]>>,
}

#[derive(Debug, Clone)]
pub struct Redactor {
    shared: Arc<Shared>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Redactor {
    pub fn new(enabled: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                enabled: AtomicBool::new(enabled),
                secrets: RwLock::new(Arc::from(Vec::new())),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Register a sensitive substring.
    ///
    /// Empty strings and duplicates are ignored, as are values that contain
    /// the sentinel itself.
    pub fn add_secret(&self, secret: impl Into<String>) {
        let secret = secret.into();
        if secret.is_empty() || secret.contains(REDACTED_SENTINEL) {
            return;
        }

        let mut guard = self
            .shared
            .secrets
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if guard.iter().any(|s| *s == secret) {
            return;
        }

        let mut next: Vec<String> = guard.iter().cloned().collect();
        next.push(secret);
        *guard = Arc::from(next);
        trace!(count = guard.len(), "registered sensitive value");
    }

    pub fn add_secrets<I, S>(&self, secrets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for secret in secrets {
            self.add_secret(secret);
        }
    }

    pub fn secret_count(&self) -> usize {
        self.snapshot().len()
    }

    fn snapshot(&self) -> Arc<[String]> {
        let guard = self
            .shared
            .secrets
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Replace every registered secret in `input` with [`REDACTED_SENTINEL`].
    ///
    /// Identity when the switch is off. Existing sentinels in the input are
    /// kept as-is and never scanned, so applying this twice gives the same
    /// result as applying it once.
    pub fn redact(&self, input: &str) -> String {
        if !self.is_enabled() {
            return input.to_string();
        }

        let secrets = self.snapshot();
        if secrets.is_empty() {
            return input.to_string();
        }

        // The text is kept as plain pieces that are implicitly separated by
        // sentinels. Each secret splits the pieces further; text produced by
        // one replacement is never offered to a later secret.
        let mut pieces: Vec<&str> = input.split(REDACTED_SENTINEL).collect();
        for secret in secrets.iter() {
            pieces = pieces
                .into_iter()
                .flat_map(|piece| piece.split(secret.as_str()))
                .collect();
        }

        pieces.join(REDACTED_SENTINEL)
    }
}
