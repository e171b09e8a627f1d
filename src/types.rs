// Type definitions and enums

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;

/// Content handed to the summarization service for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    /// Plain text, either read directly or extracted from a document.
    Text(String),
    /// Binary file content, base64 encoded and tagged with its MIME type.
    InlineBinary { base64: String, mime_type: String },
}

impl ContentPayload {
    /// Encode raw bytes as an inline payload.
    pub fn inline(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        ContentPayload::InlineBinary {
            base64: BASE64.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            ContentPayload::Text(_) => None,
            ContentPayload::InlineBinary { mime_type, .. } => Some(mime_type),
        }
    }
}

/// The pipeline stage whose byte ceiling was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    /// Server-side ingestion ceiling for any upload.
    Upload,
    /// Ceiling for image/PDF content inlined into the model request.
    Inline,
    /// Ceiling for presentations sent to the conversion service.
    Conversion,
    /// Ceiling for the PDF produced by the conversion service.
    ConvertedPdf,
}

impl SizeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeTier::Upload => "upload",
            SizeTier::Inline => "inline",
            SizeTier::Conversion => "conversion",
            SizeTier::ConvertedPdf => "converted_pdf",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            SizeTier::Upload => "File too large for server processing",
            SizeTier::Inline => "Image/PDF file too large for AI processing",
            SizeTier::Conversion => "PPT/PPTX file too large for conversion",
            SizeTier::ConvertedPdf => "Converted PDF file is too large for AI processing",
        }
    }
}

impl std::fmt::Display for SizeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

fn megabytes(bytes: &u64) -> String {
    format!("{:.1} MB", *bytes as f64 / (1024.0 * 1024.0))
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("No file uploaded.")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Unsupported file type: {0}. Please upload a PDF, DOCX, PPT, PPTX, TXT, or common image format.")]
    UnsupportedType(String),

    #[error("Could not extract text from DOCX file. It might be empty or malformed.")]
    EmptyExtraction,

    #[error("Could not decode text file as UTF-8. Please re-save it with UTF-8 encoding.")]
    InvalidTextEncoding,

    #[error("Could not read document: {0}")]
    UnreadableDocument(String),

    #[error("{tier} ({} exceeds the {} limit).", megabytes(.size), megabytes(.limit))]
    PayloadTooLarge { tier: SizeTier, size: u64, limit: u64 },

    #[error("Server configuration error: {0} not set.")]
    Configuration(String),

    #[error("Failed to summarize document: {0}")]
    Upstream(String),

    #[error("Conversion or summarization failed: {0}")]
    ConversionFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MissingFile
            | AppError::InvalidUpload(_)
            | AppError::UnsupportedType(_)
            | AppError::EmptyExtraction
            | AppError::InvalidTextEncoding
            | AppError::UnreadableDocument(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Configuration(_)
            | AppError::Upstream(_)
            | AppError::ConversionFailed(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code returned alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MethodNotAllowed => "method_not_allowed",
            AppError::MissingFile => "missing_file",
            AppError::InvalidUpload(_) => "invalid_upload",
            AppError::UnsupportedType(_) => "unsupported_type",
            AppError::EmptyExtraction => "empty_extraction",
            AppError::InvalidTextEncoding => "invalid_text_encoding",
            AppError::UnreadableDocument(_) => "unreadable_document",
            AppError::PayloadTooLarge { .. } => "payload_too_large",
            AppError::Configuration(_) => "configuration",
            AppError::Upstream(_) => "upstream_failure",
            AppError::ConversionFailed(_) => "conversion_failed",
            AppError::Internal(_) => "internal",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<SizeTier>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let tier = match &self {
            AppError::PayloadTooLarge { tier, .. } => Some(*tier),
            _ => None,
        };

        let error = match &self {
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "Unexpected failure while summarizing");
                "Failed to summarize document due to an unexpected server error.".to_string()
            }
            other => {
                if status.is_server_error() {
                    tracing::error!(code = other.code(), "{}", other);
                } else {
                    tracing::warn!(code = other.code(), "{}", other);
                }
                other.to_string()
            }
        };

        let body = ErrorBody {
            error,
            code: self.code(),
            tier,
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(format!("I/O error: {}", e))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
