//! Temporary File Store
//!
//! Every uploaded file is written to a request-owned temporary path and
//! removed before the response is sent. The store is a trait so the
//! dispatcher can be exercised against a double that counts removals.

pub mod guard;
pub mod temp;

pub use guard::TempFileGuard;
pub use temp::*;

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// A file received from the client, persisted for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub mime_type: String,
    pub original_name: String,
    pub size: u64,
}

#[async_trait]
pub trait TempStore: Send + Sync {
    /// Reserve a new, empty temporary file for an upload.
    async fn allocate(&self, original_name: &str) -> io::Result<PathBuf>;

    /// Remove a temporary file. Removing a file that is already gone succeeds.
    async fn remove(&self, path: &Path) -> io::Result<()>;
}
