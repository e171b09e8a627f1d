use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::convert::FormatConverter;
use crate::extract::DocumentTextExtractor;
use crate::llm::Summarizer;
use crate::storage::TempStore;

/// Shared, read-only handles built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub summarizer: Arc<dyn Summarizer>,
    pub converter: Arc<dyn FormatConverter>,
    pub extractor: Arc<dyn DocumentTextExtractor>,
    pub store: Arc<dyn TempStore>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub summarizer_configured: bool,
    pub converter_configured: bool,
}
