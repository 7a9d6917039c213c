//! Error types for query translation and constant evaluation.
//!
//! Every variant here is raised synchronously while a query is being
//! compiled, before any network call is made. None of them are retryable:
//! they indicate a malformed query.

use thiserror::Error;

/// Errors produced while translating a query chain into the remote grammar.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("operator '{0}' is not supported")]
    UnsupportedOperator(String),

    #[error("member '{0}' is not supported")]
    UnsupportedMember(String),

    #[error("invalid arguments for '{method}': {reason}")]
    InvalidArgument { method: String, reason: String },

    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

/// Errors produced while reducing a closed-over sub-expression to a literal.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("unable to evaluate expression: {0}")]
    Unevaluable(String),

    #[error("format template expects {placeholders} arguments, got {arguments}")]
    FormatArity {
        placeholders: usize,
        arguments: usize,
    },

    #[error("timestamp could not be rendered: {0}")]
    Timestamp(String),
}

pub type Result<T> = std::result::Result<T, TranslateError>;
