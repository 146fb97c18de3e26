use thiserror::Error;

/// Error taxonomy shared by the binary codec and the control-stream framer.
///
/// Grounded on the teacher's `DecodeError`/`MOQTMessageError` pattern (one small
/// `thiserror` enum per concern), generalised into the single closed vocabulary
/// the spec describes in §7.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Recoverable: the caller should supply more bytes and retry. Never
    /// surfaced past a codec boundary.
    #[error("not enough bytes")]
    NotEnoughBytes,

    /// A type tag did not have the expected parity, or did not match any
    /// known header/message type.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// A configured partial-message budget was exceeded.
    #[error("timed out waiting for more data")]
    Timeout,

    /// Fatal for the enclosing stream/session.
    #[error("{code:?}: {message}")]
    Termination {
        code: TerminationErrorCode,
        message: String,
    },
}

impl CoreError {
    pub fn invalid_type(msg: impl Into<String>) -> Self {
        CoreError::InvalidType(msg.into())
    }

    pub fn protocol_violation(msg: impl Into<String>) -> Self {
        CoreError::Termination {
            code: TerminationErrorCode::ProtocolViolation,
            message: msg.into(),
        }
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        CoreError::Termination {
            code: TerminationErrorCode::InternalError,
            message: msg.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationErrorCode {
    ProtocolViolation,
    InternalError,
}

pub type CoreResult<T> = Result<T, CoreError>;
