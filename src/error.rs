//! Error taxonomy for the session runtime.
//!
//! Every variant is a local, synchronous rejection: the command that produced
//! it left the session untouched and control goes back to the operator.

use thiserror::Error;

/// Rejections produced by the ledger and the session state machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// A set number that does not extend the contiguous run for an exercise
    #[error("set {got} for `{exercise_id}` is out of sequence (expected set {expected})")]
    InvalidSequence {
        exercise_id: String,
        expected: u32,
        got: u32,
    },

    /// A command issued in a phase or condition that forbids it
    #[error("cannot {command}: {reason}")]
    InvalidOperation {
        command: &'static str,
        reason: String,
    },

    /// Navigation past either end of the plan
    #[error("no exercise at index {index} (plan has {len})")]
    OutOfRange { index: isize, len: usize },

    /// Plan rejected at construction
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

impl SessionError {
    pub(crate) fn invalid_op(command: &'static str, reason: impl Into<String>) -> Self {
        SessionError::InvalidOperation {
            command,
            reason: reason.into(),
        }
    }

    /// Operator and input errors are never worth retrying.
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SessionError::OutOfRange { .. } => ErrorSeverity::Warning,
            SessionError::InvalidSequence { .. } | SessionError::InvalidOperation { .. } => {
                ErrorSeverity::Error
            }
            SessionError::InvalidPlan(_) => ErrorSeverity::Critical,
        }
    }

    /// Short message suitable for the terminal prompt.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::OutOfRange { index, .. } if *index < 0 => {
                "already at the first exercise".to_string()
            }
            SessionError::OutOfRange { .. } => "already at the last exercise".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Session cannot be built at all
    Critical,
    /// Command rejected
    Error,
    /// Harmless no-op
    Warning,
}
