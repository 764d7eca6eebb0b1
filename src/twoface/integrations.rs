//! Integrate twoface with other libraries, like Actix-web or Diesel.

use crate::twoface::{ExternalError, Fallible, TfError};
use actix_web::{
    error::BlockingError,
    http::{header, StatusCode},
    HttpResponse,
};
use anyhow::anyhow;
use serde::Serialize;
use tracing::{debug, error};

// Twoface errors can be used as Actix-web errors.
// If a handler returns a Twoface error, the external portion will be shown to the user.
// The internal portion will only be logged.
impl actix_web::ResponseError for TfError {
    fn status_code(&self) -> StatusCode {
        self.external.cause.into()
    }

    fn error_response(&self) -> HttpResponse {
        if self.external.cause.is_client_error() {
            debug!(cause = %self.external.cause, "rejected request: {}", self.internal);
        } else {
            error!("{:#}", self.internal);
        }
        let resp = serde_json::to_string(&ErrBody {
            error: self.to_string(),
        })
        .unwrap_or_else(|e| {
            error!("Serde error: {}", e.to_string());
            "{\"error\": \"ServerError: internal server error\"}".to_owned()
        });
        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(resp)
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

/// Convenience extension used to extract errors from `web::block`.
pub trait BlockingResp<T> {
    /// Convert the return from a web::block into a normal `Fallible<T>`.
    fn to_resp(self) -> Fallible<T>;
}

impl<T, I: Into<TfError>> BlockingResp<T> for Result<Result<T, I>, BlockingError> {
    fn to_resp(self) -> Fallible<T> {
        match self {
            Ok(Ok(t)) => Ok(t),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(TfError {
                internal: anyhow!("blocking operation cancelled"),
                external: ExternalError::default(),
            }),
        }
    }
}
