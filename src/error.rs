//! Error types for misuse of the engine and for unhandled rejections.
//!
//! Failures that belong to the data (an `Err` outcome, an absent presence, a
//! rejected task) never show up here: they stay inside their container and
//! flow through folds unchanged. The types in this module describe the other
//! kind of failure, the one where the caller wired the engine up wrongly
//! (a depth of zero, two different container kinds in one fold, a plain value
//! where a nested layer was promised) or ran a deferred computation without
//! anyone listening for its rejection.
//!
//! Both are fatal by contract. The engine raises them by panicking with the
//! formatted error, so a `#[should_panic(expected = ...)]` test can match on
//! the message.

use crate::container::Kind;
use crate::value::Value;

/// A programmer error detected while combining or lifting containers.
///
/// # Examples
///
/// ```
/// use liftfold::{Container, LiftError};
///
/// let err = Container::ok(1).try_ap(Container::just(2)).unwrap_err();
/// assert!(matches!(err, LiftError::KindMismatch { .. }));
/// assert_eq!(
///     err.to_string(),
///     "cannot combine an outcome container with a presence container"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiftError {
    /// A lift depth below one was requested.
    #[error("lift depth must be at least 1, got {0}")]
    InvalidDepth(usize),

    /// Two containers of different kinds met in a single combine.
    #[error("cannot combine {} container with {} container", with_article(.left), with_article(.right))]
    KindMismatch {
        /// Kind of the left (accumulator or function) operand.
        left: Kind,
        /// Kind of the right (item or value) operand.
        right: Kind,
    },

    /// A plain value turned up where a nested container layer was expected.
    #[error("expected a container {remaining} layer(s) above the plain value, found {found}")]
    NotAContainer {
        /// Number of layers that still had to be unwrapped.
        remaining: usize,
        /// Type name of the value that was found instead.
        found: &'static str,
    },

    /// A container handed to `ap` held something other than a function.
    #[error("expected a function inside the applied container, found {0}")]
    NotAFunction(&'static str),

    /// A result run configuration received a payload that is not an outcome.
    #[error("expected the resolved payload to be an outcome container, found {0}")]
    NotAnOutcome(&'static str),

    /// A list fold's accumulator stopped being a list, which happens when the
    /// constructor does not wrap its argument unchanged.
    #[error("expected the list accumulator to stay a list, found {0}")]
    NotAList(&'static str),
}

/// A deferred computation rejected and its run configuration had no
/// rejection handler of its own.
///
/// The default handler installed by [`RunConfig::new`](crate::RunConfig::new)
/// raises this instead of dropping the reason on the floor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unhandled rejection: {reason:?}")]
pub struct UnhandledRejection {
    /// The value the computation rejected with.
    pub reason: Value,
}

impl UnhandledRejection {
    /// Wrap a rejection reason.
    pub fn new(reason: Value) -> Self {
        Self { reason }
    }

    /// Extract the rejection reason.
    pub fn into_reason(self) -> Value {
        self.reason
    }
}

fn with_article(kind: &Kind) -> String {
    match kind {
        Kind::Outcome => format!("an {kind}"),
        _ => format!("a {kind}"),
    }
}

/// Abort with a programmer error.
#[track_caller]
pub(crate) fn raise(err: LiftError) -> ! {
    tracing::error!(error = %err, "liftfold misuse");
    panic!("{err}")
}
