// Doc Summarizer - single-endpoint document summarization relay

pub mod config;
pub mod convert;
pub mod dispatch;
pub mod extract;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

use std::sync::Arc;

use convert::CloudConvertClient;
use extract::DocxExtractor;
use llm::GoogleAdapter;
use storage::DiskTempStore;

/// Wire the production collaborators for a loaded configuration.
pub fn build_state(config: Config) -> AppState {
    let summarizer = Arc::new(GoogleAdapter::new(&config.llm));
    let converter = Arc::new(CloudConvertClient::new(&config.conversion));
    let store = Arc::new(DiskTempStore::new(config.storage.upload_dir.clone()));

    AppState {
        config: Arc::new(config),
        summarizer,
        converter,
        extractor: Arc::new(DocxExtractor::new()),
        store,
    }
}

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
