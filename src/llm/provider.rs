use async_trait::async_trait;
use crate::types::{AppResult, ContentPayload};

/// A hosted model that turns a document payload into a plain-text summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Submit the payload with its fixed instruction prompt and return the
    /// generated text verbatim. One blocking call, no retries.
    async fn summarize(&self, payload: &ContentPayload) -> AppResult<String>;
}
