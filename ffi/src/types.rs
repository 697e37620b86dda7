//! C-facing types for the FFI boundary.
//!
//! # Design
//! `KeaCtrlContext` is opaque to C: callers only ever hold a pointer to it.
//! It wraps a core `TransactionContext` and mirrors its last-error message
//! into a `CString`, so `kea_ctrl_get_last_error` can hand out a pointer
//! that stays valid until the next call on the same context.

use std::ffi::CString;
use std::os::raw::c_char;

use kea_ctrl_core::{CommandResponse, CtrlError, ErrorKind, TransactionContext, NO_ERROR};

/// Opaque handle to one control-agent connection.
pub struct KeaCtrlContext {
    pub(crate) inner: TransactionContext,
    last_error: CString,
    last_kind: KeaErrorKind,
}

/// Classification of the most recent failure on a context.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeaErrorKind {
    None = 0,
    Init = 1,
    Transport = 2,
    HttpStatus = 3,
    MalformedResponse = 4,
    Command = 5,
    Precondition = 6,
    Serialization = 7,
}

impl From<ErrorKind> for KeaErrorKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::None => KeaErrorKind::None,
            ErrorKind::Init => KeaErrorKind::Init,
            ErrorKind::Transport => KeaErrorKind::Transport,
            ErrorKind::HttpStatus => KeaErrorKind::HttpStatus,
            ErrorKind::MalformedResponse => KeaErrorKind::MalformedResponse,
            ErrorKind::Command => KeaErrorKind::Command,
            ErrorKind::Precondition => KeaErrorKind::Precondition,
            ErrorKind::Serialization => KeaErrorKind::Serialization,
        }
    }
}

/// `message` as a C string, with interior NULs dropped.
pub(crate) fn c_string(message: &str) -> CString {
    CString::new(message.replace('\0', "")).unwrap_or_default()
}

impl KeaCtrlContext {
    pub(crate) fn new(inner: TransactionContext) -> Self {
        Self {
            inner,
            last_error: c_string(NO_ERROR),
            last_kind: KeaErrorKind::None,
        }
    }

    pub(crate) fn last_error_ptr(&self) -> *const c_char {
        self.last_error.as_ptr()
    }

    pub(crate) fn last_kind(&self) -> KeaErrorKind {
        self.last_kind
    }

    /// Record a failure detected on this side of the boundary, before the
    /// core context was involved.
    pub(crate) fn reject(&mut self, err: CtrlError) -> *mut c_char {
        self.last_kind = err.kind().into();
        self.last_error = c_string(&err.to_string());
        std::ptr::null_mut()
    }

    /// Mirror the outcome of a core call and turn a success into an owned
    /// JSON string of the full response array.
    pub(crate) fn finish(&mut self, result: kea_ctrl_core::Result<CommandResponse>) -> *mut c_char {
        self.last_error = c_string(self.inner.last_error());
        match result {
            Ok(response) => {
                self.last_kind = KeaErrorKind::None;
                c_string(&response.to_json_string()).into_raw()
            }
            Err(err) => {
                self.last_kind = err.kind().into();
                std::ptr::null_mut()
            }
        }
    }
}
