pub mod account;
pub mod auth;
pub mod permission;
pub mod problem;
pub mod problem_case;
pub mod problem_menu;
pub mod role;
pub mod submission;
pub mod user;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::header;
use axum::response::Response;
use common::storage::StoredObject;

use crate::error::AppError;

/// Body limit for avatar and icon uploads.
pub fn image_upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(8 * 1024 * 1024) // 8 MB
}

/// An uploaded file: client-side name and content.
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Read the `file` field of a multipart body. Other fields are ignored.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(AppError::Validation("Missing 'file' field".into()))
}

/// Serve a stored image with a long-lived cache header.
pub fn object_response(object: StoredObject) -> Result<Response, AppError> {
    Response::builder()
        .header(header::CONTENT_TYPE, object.content_type)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(object.bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}
