//! Errors with two faces: the internal cause (SQL errors, IO errors, file paths) is logged, and
//! only a fixed `Cause: text` sentence reaches the client.

mod extensions;
pub mod externalerror;
mod integrations;

pub use extensions::*;
pub use externalerror::{Cause, ExternalError};
pub use integrations::BlockingResp;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Every fallible operation in the crate returns this, from the datastore up to the handlers.
#[derive(Debug)]
pub struct TfError {
    /// The underlying error, from some function. May contain sensitive information, so it should
    /// not be shown to users.
    pub internal: anyhow::Error,
    /// A user-friendly error that doesn't contain any sensitive information.
    pub external: ExternalError,
}

impl TfError {
    /// An error that has no underlying library error, only a reason to reject the request.
    pub fn rejection(cause: Cause, text: &'static str) -> Self {
        Self {
            internal: anyhow::anyhow!(text),
            external: ExternalError { cause, text },
        }
    }
}

/// Only the external part is displayed.
impl Display for TfError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        write!(f, "{}", self.external)
    }
}

/// Result alias used by every store, service and handler.
pub type Fallible<T> = Result<T, TfError>;
