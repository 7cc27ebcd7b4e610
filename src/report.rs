// vim: tw=80
//! Verbosity control and the usage-error taxonomy.
//!
//! Dispatch failures panic with a self-contained message; the panic is the
//! failure report handed to the embedding test runner.  Non-failure notices
//! ("uninteresting call", "expected call") go through [`tracing`] and are
//! gated by the process-wide [`Verbosity`] level.

use std::sync::atomic::{AtomicU8, Ordering};

use thiserror::Error;

/// How chatty the dispatch engine should be about non-failure events.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Verbosity {
    /// Only failures are reported.
    ErrorsOnly = 0,
    /// Failures plus warnings such as uninteresting calls.  The default.
    Warnings = 1,
    /// Everything, including a notice for each successfully dispatched call.
    Info = 2,
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Warnings as u8);

/// Set the process-wide verbosity level.
pub fn set_verbosity(v: Verbosity) {
    VERBOSITY.store(v as u8, Ordering::Relaxed);
}

pub(crate) fn verbosity_at_least(v: Verbosity) -> bool {
    VERBOSITY.load(Ordering::Relaxed) >= v as u8
}

/// A misuse of the expectation builder grammar.
///
/// Each violation is a named, specific error; the `Display` rendering is the
/// panic payload, so `#[should_panic(expected = ...)]` can assert on it.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum UsageError {
    #[error("`.with()` must be the first clause on an expectation")]
    WithNotFirst,
    #[error("`.with()` may appear at most once per expectation")]
    DuplicateWith,
    #[error("a call count clause must precede `.in_sequence()`, \
             `.will_once()`, and `.will_repeatedly()`")]
    TimesTooLate,
    #[error("the call count may be specified at most once per expectation")]
    DuplicateTimes,
    #[error("`.in_sequence()` must precede `.will_once()` and \
             `.will_repeatedly()`")]
    SequenceTooLate,
    #[error("`.will_once()` clauses must all precede `.will_repeatedly()`")]
    WillOnceAfterRepeatedly,
    #[error("`.will_repeatedly()` may appear at most once per expectation")]
    DuplicateWillRepeatedly,
    #[error("`.retires_on_saturation()` must be the last clause on an \
             expectation and may appear at most once")]
    RetiresNotLast,
    #[error("`do_default()` cannot itself be a default handler's action")]
    CircularDoDefault,
    #[error("`do_default()` cannot be performed inside a composite action")]
    NestedDoDefault,
}

/// Report a builder-grammar violation.
pub(crate) fn usage_error(err: UsageError) -> ! {
    panic!("{err}");
}

#[cfg(test)]
mod t {
    use super::*;

    #[test]
    fn verbosity_order() {
        set_verbosity(Verbosity::ErrorsOnly);
        assert!(verbosity_at_least(Verbosity::ErrorsOnly));
        assert!(!verbosity_at_least(Verbosity::Warnings));
        set_verbosity(Verbosity::Info);
        assert!(verbosity_at_least(Verbosity::Warnings));
        set_verbosity(Verbosity::Warnings);
    }

    #[test]
    fn errors_name_the_clause() {
        let msg = UsageError::DuplicateWillRepeatedly.to_string();
        assert!(msg.contains("will_repeatedly"));
    }
}
