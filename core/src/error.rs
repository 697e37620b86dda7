//! Error types for the control-agent client and the configuration builder.
//!
//! # Design
//! `CtrlError` mirrors the failure points of one transaction in the order
//! they can occur: context construction, transport, HTTP status, response
//! shape, and finally the command's own result code. `Precondition` is the
//! only variant produced without touching the network. `ErrorKind` is the
//! flat, `Copy` classification handed across the C boundary.

use thiserror::Error;

/// Result alias used throughout the client.
pub type Result<T> = std::result::Result<T, CtrlError>;

/// Errors returned by `TransactionContext` and the typed command methods.
#[derive(Debug, Error)]
pub enum CtrlError {
    /// The context or its transport could not be initialized.
    #[error("initialization failed: {0}")]
    Init(String),

    /// The HTTP exchange itself failed (refused, DNS, TLS, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The agent answered with a status other than 200.
    #[error("HTTP request failed with code {status}")]
    HttpStatus { status: u16, body: String },

    /// The body was not a JSON array of result objects.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The service executed the command and reported a non-zero result.
    #[error("Kea API Error ({code}): {text}")]
    Command { code: i64, text: String },

    /// A required caller argument was missing or empty. No request was sent.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The request envelope could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Flat classification of a `CtrlError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum ErrorKind {
    None = 0,
    Init = 1,
    Transport = 2,
    HttpStatus = 3,
    MalformedResponse = 4,
    Command = 5,
    Precondition = 6,
    Serialization = 7,
}

impl CtrlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CtrlError::Init(_) => ErrorKind::Init,
            CtrlError::Transport(_) => ErrorKind::Transport,
            CtrlError::HttpStatus { .. } => ErrorKind::HttpStatus,
            CtrlError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            CtrlError::Command { .. } => ErrorKind::Command,
            CtrlError::Precondition(_) => ErrorKind::Precondition,
            CtrlError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Whether the failure may clear up on its own. Only transport failures
    /// qualify; retrying is left to the caller and is only safe for
    /// read-only commands.
    pub fn is_transient(&self) -> bool {
        matches!(self, CtrlError::Transport(_))
    }
}

/// Errors produced while assembling a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An option carried neither a name nor a positive code.
    #[error("option has neither a name nor a positive code")]
    OptionKey,

    /// A required scalar field was empty or zero.
    #[error("{record}: required field '{field}' is empty")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    /// A list that must not be empty was empty.
    #[error("{record}: '{field}' must contain at least one entry")]
    EmptyList {
        record: &'static str,
        field: &'static str,
    },

    /// The child could not be attached to its parent container.
    #[error("cannot attach {slot} to a non-container parent")]
    Attach { slot: String },
}
