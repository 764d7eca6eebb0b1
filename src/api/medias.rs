//! Uploading attachments and serving them back.
use crate::api::{observe, State};
use crate::datastore::Datastore;
use crate::identity::Caller;
use crate::media;
use crate::twoface::{Cause, ExternalError, Fallible, OrReject, TfError};
use actix_multipart::{Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde::Serialize;

/// The form field carrying the uploaded file.
const FILE_FIELD: &str = "file";

pub fn configure<DS: Datastore>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/medias").route(web::post().to(upload_media::<DS>)));
}

/// Serves stored attachments. Mounted wherever `MediaConfig::base_url` points.
pub fn configure_uploads<DS: Datastore>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{filename}").route(web::get().to(get_media::<DS>)));
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub result: bool,
    pub media_id: i32,
}

// MultipartError can hold an actix_web::Error, which isn't Send, so it can't go through anyhow's
// blanket conversion.
fn bad_multipart(err: MultipartError) -> TfError {
    TfError {
        internal: anyhow::anyhow!("multipart error: {}", err),
        external: ExternalError {
            cause: Cause::UserActionInvalid,
            text: "Malformed multipart body",
        },
    }
}

async fn upload_media<DS: Datastore>(
    state: web::Data<State<DS>>,
    caller: Caller<DS>,
    payload: Multipart,
) -> Fallible<web::Json<UploadResponse>> {
    observe("upload_media", || async move {
        let mut payload = payload;
        let max_file_size = state.media.max_file_size;
        while let Some(field) = payload.next().await {
            let mut field = field.map_err(bad_multipart)?;
            if field.name() != Some(FILE_FIELD) {
                continue;
            }
            let Some(filename) = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_owned)
            else {
                return Err(TfError::rejection(
                    Cause::UserInvalidField,
                    "The file field has no filename",
                ));
            };

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(bad_multipart)?;
                if bytes.len() + chunk.len() > max_file_size {
                    return Err(TfError::rejection(
                        Cause::UserInvalidField,
                        "File is too large",
                    ));
                }
                bytes.extend_from_slice(&chunk);
            }

            let attachment =
                media::upload(&state.ds, &state.media, &caller.user, &filename, bytes).await?;
            return Ok(web::Json(UploadResponse {
                result: true,
                media_id: attachment.id,
            }));
        }
        Err(TfError::rejection(
            Cause::UserActionInvalid,
            "No file field in the upload",
        ))
    })
    .await
}

async fn get_media<DS: Datastore>(
    state: web::Data<State<DS>>,
    filename: web::Path<String>,
) -> Fallible<HttpResponse> {
    observe("get_media", || async move {
        let bytes = media::read(&state.media, &filename)
            .await?
            .or_reject(ExternalError {
                cause: Cause::NotFound,
                text: "Media not found",
            })?;
        Ok(HttpResponse::Ok()
            .content_type(media::content_type(&filename))
            .body(bytes))
    })
    .await
}
