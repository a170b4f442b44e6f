//! Rewriter error types

use thiserror::Error;

/// Result type for rewrite operations
pub type RewriteResult<T> = std::result::Result<T, RewriteError>;

/// Errors the reference rewriter can raise
///
/// The rewriter itself is best-effort and never fails on formula text it
/// cannot tokenize; errors only signal contract violations in the arguments.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// A required text argument was null or empty (contract violation)
    #[error("Required argument must not be empty: {0}")]
    EmptyArgument(&'static str),
}
