//! Locator error types.

use thiserror::Error;

/// Reasons a test could not be located under the cursor.
///
/// None of these are fatal. [`super::locate_test_name`] collapses every
/// variant into `None`; the typed form exists for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    /// No `describe(` or `it(` starts at or before the cursor.
    #[error("no describe( or it( call before the cursor")]
    NoAnchorFound,

    /// An anchor exists but no zero-argument function body follows it.
    #[error("no function body header after the call at byte {anchor}")]
    NoFunctionHeaderFound { anchor: usize },

    /// The rewritten source is not syntactically valid.
    #[error("parse error: {0}")]
    Parse(String),

    /// The tree parsed but the sentinel was never reached.
    #[error("sentinel not reachable from the syntax tree root")]
    SentinelUnreachable,
}
