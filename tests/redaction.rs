// tests/redaction.rs

use proptest::prelude::*;

use provisioner::logging::LeveledLogger;
use provisioner::redact::{REDACTED_SENTINEL, Redactor};
use provisioner_test_utils::buffer::SharedBuffer;

fn logger_with_buffers(redactor: &Redactor) -> (LeveledLogger, SharedBuffer, SharedBuffer) {
    let log = SharedBuffer::new();
    let console = SharedBuffer::new();
    let logger = LeveledLogger::new(log.clone(), redactor.clone()).with_console(console.clone());
    (logger, log, console)
}

#[test]
fn registered_secret_never_reaches_the_log() {
    let redactor = Redactor::default();
    redactor.add_secret("p@ss");
    let (logger, log, console) = logger_with_buffers(&redactor);

    logger.info("connecting with p@ss");
    logger.echo("connecting with p@ss");

    for text in [log.contents(), console.contents()] {
        assert!(!text.contains("p@ss"));
        assert!(text.contains(REDACTED_SENTINEL));
        assert!(text.contains("connecting with "));
    }
}

#[test]
fn every_occurrence_of_every_secret_is_replaced() {
    let redactor = Redactor::default();
    redactor.add_secrets(["alpha", "beta"]);

    let out = redactor.redact("alpha beta alpha-beta");

    assert_eq!(
        out,
        format!("{s} {s} {s}-{s}", s = REDACTED_SENTINEL)
    );
}

#[test]
fn disabled_redactor_is_identity() {
    let redactor = Redactor::new(false);
    redactor.add_secret("token");
    assert_eq!(redactor.redact("token=token"), "token=token");

    redactor.set_enabled(true);
    assert!(!redactor.redact("token=token").contains("token"));
}

#[test]
fn empty_secret_is_ignored() {
    let redactor = Redactor::default();
    redactor.add_secret("");
    redactor.add_secret("dup");
    redactor.add_secret("dup");

    assert_eq!(redactor.secret_count(), 1);
    assert_eq!(redactor.redact("unrelated text"), "unrelated text");
}

#[test]
fn clones_share_registered_secrets() {
    let redactor = Redactor::default();
    let clone = redactor.clone();
    clone.add_secret("late-secret");

    assert_eq!(redactor.redact("late-secret"), REDACTED_SENTINEL);
}

#[test]
fn secrets_overlapping_the_sentinel_do_not_corrupt_it() {
    let redactor = Redactor::default();
    redactor.add_secrets(["RED", "~"]);

    let once = redactor.redact("RED~");
    assert_eq!(once, format!("{s}{s}", s = REDACTED_SENTINEL));
    assert_eq!(redactor.redact(&once), once);
}

#[test]
fn trace_lines_are_gated() {
    let redactor = Redactor::default();
    let (logger, log, _) = logger_with_buffers(&redactor);

    logger.trace("hidden detail");
    assert!(log.is_empty());

    let logger = logger.with_trace(true);
    logger.trace("visible detail");
    assert!(log.contents().contains("[TRACE] visible detail"));
}

#[test]
fn levels_are_prefixed() {
    let redactor = Redactor::default();
    let (logger, log, _) = logger_with_buffers(&redactor);

    logger.info("one");
    logger.warning("two");
    logger.error("three");

    let lines = log.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("[INFO] one"));
    assert!(lines[1].ends_with("[WARNING] two"));
    assert!(lines[2].ends_with("[ERROR] three"));
}

#[test]
fn quiet_suppresses_echo_but_not_the_log() {
    let redactor = Redactor::default();
    let (logger, log, console) = logger_with_buffers(&redactor);
    let logger = logger.with_quiet(true);

    logger.echo("progress");
    logger.info("progress");

    assert!(console.is_empty());
    assert!(log.contents().contains("progress"));
}

proptest! {
    #[test]
    fn redaction_is_idempotent(
        input in ".{0,64}",
        secrets in proptest::collection::vec("[a-zA-Z0-9~\\[\\]]{1,6}", 0..5),
    ) {
        let redactor = Redactor::default();
        redactor.add_secrets(secrets);

        let once = redactor.redact(&input);
        prop_assert_eq!(redactor.redact(&once), once);
    }

    #[test]
    fn text_without_secrets_is_unchanged(input in "[a-z ]{0,64}") {
        let redactor = Redactor::default();
        redactor.add_secrets(["SECRET", "0xDEADBEEF"]);

        prop_assert_eq!(redactor.redact(&input), input);
    }

    #[test]
    fn redacted_text_contains_no_secret(
        prefix in "[a-z]{0,10}",
        suffix in "[a-z]{0,10}",
    ) {
        let redactor = Redactor::default();
        redactor.add_secret("P4ssw0rd!");

        let out = redactor.redact(&format!("{prefix}P4ssw0rd!{suffix}"));
        prop_assert!(!out.contains("P4ssw0rd!"));
        prop_assert!(out.contains(REDACTED_SENTINEL));
    }
}
