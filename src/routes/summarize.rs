use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::dispatch::{self, SizeLimits};
use crate::extract::resolve_mime;
use crate::models::{AppState, SummaryResponse};
use crate::storage::{TempFileGuard, UploadedFile};
use crate::types::{AppError, AppResult, SizeTier};

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const FILE_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "upload";

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.limits.max_upload_bytes as usize + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route(
            "/api/summarize",
            post(summarize).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn method_not_allowed() -> impl IntoResponse {
    ([(header::ALLOW, "POST, OPTIONS")], AppError::MethodNotAllowed)
}

pub async fn summarize(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<SummaryResponse>> {
    let missing = state.config.missing_credentials();
    if !missing.is_empty() {
        return Err(AppError::Configuration(missing.join(", ")));
    }

    let mut multipart = multipart.map_err(|rejection| AppError::InvalidUpload(rejection.body_text()))?;

    let limits = SizeLimits::new(state.config.limits);
    let content_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, &limits, content_length))?
        {
            Some(field) if field.name() == Some(FILE_FIELD) => break field,
            Some(_) => continue,
            None => return Err(AppError::MissingFile),
        }
    };

    let original_name = field
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string();
    let mime_type = resolve_mime(field.content_type(), &original_name);
    let path = state.store.allocate(&original_name).await?;
    let temp_file = TempFileGuard::new(state.store.clone(), path);

    info!(file = %original_name, mime = %mime_type, "Received upload");

    let outcome = AssertUnwindSafe(receive_and_summarize(
        &state,
        field,
        temp_file.path(),
        mime_type,
        original_name,
        &limits,
        content_length,
    ))
    .catch_unwind()
    .await;

    temp_file.release().await;

    match outcome {
        Ok(result) => result.map(|summary| Json(SummaryResponse { summary })),
        Err(panic) => {
            let detail = panic_detail(panic);
            error!(detail = %detail, "Summarization pipeline panicked");
            Err(AppError::Internal(detail))
        }
    }
}

async fn receive_and_summarize(
    state: &AppState,
    field: Field<'_>,
    path: &Path,
    mime_type: String,
    original_name: String,
    limits: &SizeLimits,
    content_length: Option<u64>,
) -> AppResult<String> {
    let size = persist_field(field, path, limits, content_length).await?;

    let upload = UploadedFile {
        path: path.to_path_buf(),
        mime_type,
        original_name,
        size,
    };

    dispatch::summarize_upload(state, &upload).await
}

/// Stream a multipart field to disk, enforcing the upload tier as bytes arrive.
async fn persist_field(
    mut field: Field<'_>,
    path: &Path,
    limits: &SizeLimits,
    content_length: Option<u64>,
) -> AppResult<u64> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await?;
    let mut written: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, limits, content_length))?
    {
        written += chunk.len() as u64;
        limits.check(SizeTier::Upload, written)?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(written)
}

/// The body limit layer surfaces as a multipart error with a 413 status;
/// everything else is a malformed upload.
fn multipart_error(err: MultipartError, limits: &SizeLimits, content_length: Option<u64>) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let limit = limits.limit_for(SizeTier::Upload);
        return AppError::PayloadTooLarge {
            tier: SizeTier::Upload,
            size: content_length.filter(|len| *len > limit).unwrap_or(limit + 1),
            limit,
        };
    }
    AppError::InvalidUpload(err.body_text())
}

fn panic_detail(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        return message.to_string();
    }
    if let Some(message) = panic.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_string()
}
