use actix_web::http::StatusCode;
use std::fmt;

/// The part of an error a client is allowed to see: a category and a fixed sentence.
#[derive(Debug)]
pub struct ExternalError {
    pub cause: Cause,
    /// Shown verbatim after the cause, e.g. "NotFound: Media not found".
    pub text: &'static str,
}

/// Why a request failed, from the client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    ServerError,
    /// The request was well-formed but can't be carried out, e.g. an upload with no file in it.
    UserActionInvalid,
    /// Missing or unknown `api-key`.
    UserBadAuth,
    /// The request collides with existing data, e.g. a reused `api-key`.
    UserConflict,
    /// One field of the request was rejected, e.g. a disallowed file extension.
    UserInvalidField,
    NotFound,
}

impl Cause {
    /// Client mistakes are expected traffic. Only server errors deserve error-level logs.
    pub fn is_client_error(self) -> bool {
        self != Cause::ServerError
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        // Same as Debug: the variant name.
        write!(f, "{:?}", self)
    }
}

/// Only the HTTP layer cares about status codes. The datastore and services just pick a Cause.
impl From<Cause> for StatusCode {
    fn from(cause: Cause) -> Self {
        match cause {
            Cause::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Cause::UserActionInvalid | Cause::UserInvalidField => StatusCode::BAD_REQUEST,
            Cause::UserBadAuth => StatusCode::UNAUTHORIZED,
            Cause::UserConflict => StatusCode::CONFLICT,
            Cause::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl fmt::Display for ExternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}: {}", self.cause, self.text)
    }
}

/// Anything nobody bothered to describe is a vague server error.
impl Default for ExternalError {
    fn default() -> Self {
        Self {
            cause: Cause::ServerError,
            text: "Internal server error",
        }
    }
}
