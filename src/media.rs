//! Files on disk: attachment bytes and the static web client. Attachment bytes are written
//! before the metadata row is inserted and the two writes aren't atomic together: a failed insert
//! leaves an orphaned file behind.
use crate::config::MediaConfig;
use crate::datastore::{Attachment, AttachmentStore, NewAttachment, User};
use crate::twoface::{BlockingResp, Cause, Fallible, TfError};
use actix_web::web::block;
use chrono::{offset::Utc, DateTime};
use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Component, Path},
};
use tracing::info;

/// Strip any directory components a client smuggled into the filename.
fn base_name(filename: &str) -> Option<&str> {
    Path::new(filename).file_name().and_then(|name| name.to_str())
}

fn extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}

pub fn extension_allowed(filename: &str, allowed_extensions: &[String]) -> bool {
    match extension(filename) {
        Some(ext) => allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// `<uploader_id>_<YYYYmmdd_HHMMSS>_<original filename>`. A nonzero `attempt` is appended to the
/// timestamp as `-<attempt>`, for uploads of the same filename within one second.
pub fn unique_name(
    uploader_id: i32,
    now: DateTime<Utc>,
    attempt: u32,
    filename: &str,
) -> String {
    let stamp = now.format("%Y%m%d_%H%M%S");
    if attempt == 0 {
        format!("{}_{}_{}", uploader_id, stamp, filename)
    } else {
        format!("{}_{}-{}_{}", uploader_id, stamp, attempt, filename)
    }
}

/// Write `bytes` under the first free name `name_for(0)`, `name_for(1)`, ... Existing files are
/// never truncated. Returns the name used.
fn write_new_file(
    dir: &Path,
    name_for: impl Fn(u32) -> String,
    bytes: &[u8],
) -> io::Result<String> {
    let mut attempt = 0;
    loop {
        let name = name_for(attempt);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&name))
        {
            Ok(mut file) => {
                file.write_all(bytes)?;
                return Ok(name);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

pub fn content_type(filename: &str) -> &'static str {
    match extension(filename).map(str::to_ascii_lowercase).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Store the bytes under a generated name and record them as an unattached attachment owned by
/// `uploader`.
pub async fn upload<DS: AttachmentStore>(
    ds: &DS,
    media: &MediaConfig,
    uploader: &User,
    filename: &str,
    bytes: Vec<u8>,
) -> Fallible<Attachment> {
    let Some(filename) = base_name(filename)
        .filter(|name| extension_allowed(name, &media.allowed_extensions))
    else {
        return Err(TfError::rejection(
            Cause::UserInvalidField,
            "File extension is not allowed",
        ));
    };

    let now = Utc::now();
    let uploader_id = uploader.id;
    let original = filename.to_owned();
    let dir = media.upload_dir.clone();
    let size = bytes.len();
    let stored_name = block(move || {
        write_new_file(
            &dir,
            |attempt| unique_name(uploader_id, now, attempt, &original),
            &bytes,
        )
    })
    .await
    .to_resp()?;

    let attachment = ds
        .new_attachment(NewAttachment {
            path: stored_name,
            user_id: uploader.id,
        })
        .await?;
    info!(
        user_id = uploader.id,
        attachment_id = attachment.id,
        size,
        "uploaded attachment"
    );
    Ok(attachment)
}

/// The stored bytes for `filename`, or None if there's no such file.
pub async fn read(media: &MediaConfig, filename: &str) -> Fallible<Option<Vec<u8>>> {
    if base_name(filename) != Some(filename) {
        return Ok(None);
    }
    read_under(&media.upload_dir, filename).await
}

/// The bytes of the file at `relative` inside `dir`, or None if there's no file there. Only plain
/// path components are followed, so nothing outside `dir` is reachable.
pub async fn read_under(dir: &Path, relative: &str) -> Fallible<Option<Vec<u8>>> {
    let relative = Path::new(relative);
    let plain = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !plain || relative.as_os_str().is_empty() {
        return Ok(None);
    }
    let path = dir.join(relative);
    block(move || {
        if !path.is_file() {
            return Ok(None);
        }
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
    .to_resp()
}
