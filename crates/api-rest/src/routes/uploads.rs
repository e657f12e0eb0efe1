use api_shared::{ErrorRes, UploadRes};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use utoipa::ToSchema;

use super::RouterExt;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const UPLOAD_FIELD: &str = "file";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .collection("/uploads", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Multipart body of an upload.
#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/uploads/",
    tag = "uploads",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored file", body = UploadRes),
        (status = 400, description = "Missing or empty file", body = ErrorRes)
    )
)]
/// Stores the multipart `file` field and returns its public URL.
///
/// Identical content is stored once; every upload of it gets the same URL.
///
/// # Returns
/// * `Ok(Json<UploadRes>)` - URL under `/uploads/docs` and the client's filename
///
/// # Errors
/// Returns `400 Bad Request` if the `file` field is missing or empty.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadRes>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;

        let store = state.uploads.clone();
        let stored = tokio::task::spawn_blocking(move || store.store(&bytes, filename.as_deref()))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "upload task failed");
                ApiError::internal()
            })??;

        tracing::info!(
            hash = %stored.hash,
            size = stored.size_bytes,
            deduplicated = stored.deduplicated,
            "file uploaded"
        );
        return Ok(Json(UploadRes {
            url: stored.url,
            filename: stored.original_filename,
        }));
    }
    Err(ApiError::bad_request("Missing form field: file"))
}
