//! Request Dispatcher
//!
//! Routes a stored upload down one processing path chosen by its MIME
//! category:
//!
//! | Category       | Path                                              |
//! |----------------|---------------------------------------------------|
//! | `text/*`       | read as UTF-8, summarize as text                  |
//! | PDF, `image/*` | inline tier check, base64 inline                  |
//! | DOCX           | extract text, reject if empty                     |
//! | PPT/PPTX       | conversion tier check, convert to PDF, inline     |
//! | anything else  | rejected as unsupported                           |

pub mod limits;

pub use limits::SizeLimits;

use crate::convert::ConversionError;
use crate::extract::{self, MimeCategory, PDF_MIME};
use crate::models::AppState;
use crate::storage::UploadedFile;
use crate::types::{AppError, AppResult, ContentPayload, SizeTier};
use tracing::{debug, info};

/// Produce a summary for a stored upload.
pub async fn summarize_upload(state: &AppState, upload: &UploadedFile) -> AppResult<String> {
    let limits = SizeLimits::new(state.config.limits);
    let category = MimeCategory::classify(&upload.mime_type);

    info!(
        mime = %upload.mime_type,
        size = upload.size,
        category = category.as_str(),
        "Dispatching upload"
    );

    match category {
        MimeCategory::Text => {
            let text = extract::read_text(&upload.path).await?;
            state.summarizer.summarize(&ContentPayload::Text(text)).await
        }
        MimeCategory::Pdf | MimeCategory::Image => {
            limits.check(SizeTier::Inline, upload.size)?;
            let mime = extract::canonicalize_mime(&upload.mime_type);
            let payload = extract::inline_binary(&upload.path, &mime).await?;
            state.summarizer.summarize(&payload).await
        }
        MimeCategory::WordDocument => {
            let text = state.extractor.extract_text(&upload.path).await?;
            if text.trim().is_empty() {
                return Err(AppError::EmptyExtraction);
            }
            debug!(chars = text.chars().count(), "Extracted document text");
            state.summarizer.summarize(&ContentPayload::Text(text)).await
        }
        MimeCategory::Presentation => summarize_presentation(state, &limits, upload)
            .await
            .map_err(into_conversion_failure),
        MimeCategory::Unsupported => Err(AppError::UnsupportedType(upload.mime_type.clone())),
    }
}

async fn summarize_presentation(
    state: &AppState,
    limits: &SizeLimits,
    upload: &UploadedFile,
) -> AppResult<String> {
    limits.check(SizeTier::Conversion, upload.size)?;

    let pdf = state
        .converter
        .convert_to_pdf(&upload.path, &upload.original_name)
        .await
        .map_err(|e: ConversionError| AppError::ConversionFailed(e.to_string()))?;

    limits.check(SizeTier::ConvertedPdf, pdf.len() as u64)?;

    let payload = ContentPayload::inline(&pdf, PDF_MIME);
    state.summarizer.summarize(&payload).await
}

/// Every failure of the conversion group is reported as a conversion failure,
/// except size limits which keep their `413`.
fn into_conversion_failure(err: AppError) -> AppError {
    match err {
        AppError::PayloadTooLarge { .. } | AppError::ConversionFailed(_) => err,
        AppError::Upstream(detail) | AppError::Internal(detail) => AppError::ConversionFailed(detail),
        other => AppError::ConversionFailed(other.to_string()),
    }
}
