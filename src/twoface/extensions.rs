//! Attaching user-facing descriptions to library errors and missing values.
use crate::twoface::{ExternalError, TfError};

pub trait Describe {
    /// Keep `self` as the private cause and show `external` to the client.
    fn describe(self, external: ExternalError) -> TfError;
}

impl<Internal: Into<anyhow::Error>> Describe for Internal {
    fn describe(self, external: ExternalError) -> TfError {
        TfError {
            internal: self.into(),
            external,
        }
    }
}

/// Undescribed library errors (diesel, r2d2, io...) surface as a generic server error, which is
/// what `?` gives you in a store or handler.
impl<Internal: Into<anyhow::Error>> From<Internal> for TfError {
    fn from(internal: Internal) -> TfError {
        internal.describe(Default::default())
    }
}

pub trait DescribeErr<T> {
    /// `result.describe_err(external)` is `result.map_err(|e| e.describe(external))`.
    fn describe_err(self, external: ExternalError) -> Result<T, TfError>;
}

impl<T, E> DescribeErr<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn describe_err(self, external: ExternalError) -> Result<T, TfError> {
        self.map_err(|e| e.describe(external))
    }
}

pub trait OrReject<T> {
    /// Turn `None` into a rejection. The external text doubles as the internal message.
    fn or_reject(self, external: ExternalError) -> Result<T, TfError>;
}

impl<T> OrReject<T> for Option<T> {
    fn or_reject(self, external: ExternalError) -> Result<T, TfError> {
        self.ok_or_else(|| TfError::rejection(external.cause, external.text))
    }
}
