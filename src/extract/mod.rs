//! Content Extractor
//!
//! Turns a stored upload into something the summarization service can take:
//! raw text, extracted document text, or a base64 inline payload.

pub mod docx;

pub use docx::DocxExtractor;

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use crate::types::{AppError, AppResult, ContentPayload};

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PPT_MIME: &str = "application/vnd.ms-powerpoint";
pub const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const PDF_MIME: &str = "application/pdf";

const GENERIC_BINARY_MIME: &str = "application/octet-stream";

/// Processing path chosen for an upload, keyed by its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    Text,
    Pdf,
    Image,
    WordDocument,
    Presentation,
    Unsupported,
}

impl MimeCategory {
    pub fn classify(mime_type: &str) -> Self {
        let canonical = canonicalize_mime(mime_type);
        let Ok(parsed) = canonical.parse::<mime::Mime>() else {
            return MimeCategory::Unsupported;
        };

        if parsed.type_() == mime::TEXT {
            return MimeCategory::Text;
        }
        if parsed.type_() == mime::IMAGE {
            return MimeCategory::Image;
        }

        match parsed.essence_str() {
            PDF_MIME => MimeCategory::Pdf,
            DOCX_MIME => MimeCategory::WordDocument,
            PPT_MIME | PPTX_MIME => MimeCategory::Presentation,
            _ => MimeCategory::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MimeCategory::Text => "text",
            MimeCategory::Pdf => "pdf",
            MimeCategory::Image => "image",
            MimeCategory::WordDocument => "word_document",
            MimeCategory::Presentation => "presentation",
            MimeCategory::Unsupported => "unsupported",
        }
    }
}

/// Strip parameters, lowercase, and fold common aliases.
pub fn canonicalize_mime(mime_type: &str) -> String {
    let main = mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match main.as_str() {
        "image/jpg" => "image/jpeg".to_string(),
        other => other.to_string(),
    }
}

/// Decide the MIME type of an upload from the part's declared type,
/// falling back to the filename extension when the client sent nothing useful.
pub fn resolve_mime(declared: Option<&str>, original_name: &str) -> String {
    let declared = declared.map(canonicalize_mime).filter(|m| !m.is_empty());

    match declared {
        Some(m) if m != GENERIC_BINARY_MIME => m,
        other => mime_guess::from_path(original_name)
            .first()
            .map(|m| canonicalize_mime(m.essence_str()))
            .or(other)
            .unwrap_or_else(|| GENERIC_BINARY_MIME.to_string()),
    }
}

/// Read a stored upload as UTF-8 text.
pub async fn read_text(path: &Path) -> AppResult<String> {
    let bytes = fs::read(path).await?;
    String::from_utf8(bytes).map_err(|_| AppError::InvalidTextEncoding)
}

/// Read a stored upload fully and encode it for inlining.
pub async fn inline_binary(path: &Path, mime_type: &str) -> AppResult<ContentPayload> {
    let bytes = fs::read(path).await?;
    Ok(ContentPayload::inline(&bytes, mime_type))
}

/// Extracts raw text from a word-processing document.
#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    /// Returns the document's text, which may be empty for image-only or
    /// blank documents.
    async fn extract_text(&self, path: &Path) -> AppResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify_categories() {
        assert_eq!(MimeCategory::classify("text/plain"), MimeCategory::Text);
        assert_eq!(MimeCategory::classify("text/markdown; charset=utf-8"), MimeCategory::Text);
        assert_eq!(MimeCategory::classify("text/csv"), MimeCategory::Text);
        assert_eq!(MimeCategory::classify("application/pdf"), MimeCategory::Pdf);
        assert_eq!(MimeCategory::classify("image/png"), MimeCategory::Image);
        assert_eq!(MimeCategory::classify("IMAGE/JPG"), MimeCategory::Image);
        assert_eq!(MimeCategory::classify(DOCX_MIME), MimeCategory::WordDocument);
        assert_eq!(MimeCategory::classify(PPT_MIME), MimeCategory::Presentation);
        assert_eq!(MimeCategory::classify(PPTX_MIME), MimeCategory::Presentation);
    }

    #[test]
    fn test_classify_unsupported() {
        assert_eq!(MimeCategory::classify("application/zip"), MimeCategory::Unsupported);
        assert_eq!(MimeCategory::classify("application/msword"), MimeCategory::Unsupported);
        assert_eq!(MimeCategory::classify("video/mp4"), MimeCategory::Unsupported);
        assert_eq!(MimeCategory::classify(""), MimeCategory::Unsupported);
        assert_eq!(MimeCategory::classify("not a mime"), MimeCategory::Unsupported);
    }

    #[test]
    fn test_canonicalize_mime() {
        assert_eq!(canonicalize_mime("Image/JPG"), "image/jpeg");
        assert_eq!(canonicalize_mime("text/plain; charset=UTF-8"), "text/plain");
        assert_eq!(canonicalize_mime("  application/pdf "), "application/pdf");
    }

    #[test]
    fn test_resolve_mime_prefers_declared_type() {
        assert_eq!(resolve_mime(Some("text/plain"), "notes.pdf"), "text/plain");
        assert_eq!(resolve_mime(Some("application/octet-stream"), "deck.pptx"), PPTX_MIME);
        assert_eq!(resolve_mime(None, "scan.png"), "image/png");
        assert_eq!(resolve_mime(Some(""), "report.pdf"), "application/pdf");
        assert_eq!(resolve_mime(None, "mystery"), "application/octet-stream");
        assert_eq!(
            resolve_mime(Some("application/octet-stream"), "mystery"),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_read_text_rejects_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();

        let good = temp_dir.path().join("good.txt");
        tokio::fs::write(&good, "héllo").await.unwrap();
        assert_eq!(read_text(&good).await.unwrap(), "héllo");

        let bad = temp_dir.path().join("bad.txt");
        tokio::fs::write(&bad, [0xff, 0xfe, 0x00, 0x41]).await.unwrap();
        assert!(matches!(read_text(&bad).await, Err(AppError::InvalidTextEncoding)));
    }

    #[tokio::test]
    async fn test_inline_binary_tags_mime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.png");
        tokio::fs::write(&path, [1u8, 2, 3]).await.unwrap();

        let payload = inline_binary(&path, "image/png").await.unwrap();
        assert_eq!(payload, ContentPayload::inline(&[1, 2, 3], "image/png"));
    }
}
