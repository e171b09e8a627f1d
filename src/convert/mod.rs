//! Format Converter
//!
//! Presentations (PPT/PPTX) cannot be inlined into the model request, so they
//! are converted to PDF by an external conversion service first.

pub mod cloudconvert;

pub use cloudconvert::CloudConvertClient;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while converting a document
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to create conversion job: {0}")]
    JobCreation(String),

    #[error("conversion job has no '{0}' task")]
    MissingTask(&'static str),

    #[error("failed to upload source file: {0}")]
    Upload(String),

    #[error("conversion job failed: {0}")]
    JobFailed(String),

    #[error("conversion did not finish within {0:?}")]
    Timeout(Duration),

    #[error("failed to poll conversion job: {0}")]
    Status(String),

    #[error("conversion job finished without an export URL")]
    MissingExportUrl,

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait FormatConverter: Send + Sync {
    /// Convert the file at `source` to PDF and return the PDF bytes.
    async fn convert_to_pdf(
        &self,
        source: &Path,
        original_name: &str,
    ) -> Result<Vec<u8>, ConversionError>;
}
