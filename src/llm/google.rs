// Google Gemini adapter implementation
// Uses the generateContent REST endpoint with inline data for binary payloads.
// API Reference: https://ai.google.dev/api/generate-content

use crate::config::LLMConfig;
use crate::llm::prompts::{
    PromptVariant, MAX_OUTPUT_TOKENS, RESPONSE_MIME_TYPE, SAFETY_CATEGORIES, SAFETY_THRESHOLD,
    TEMPERATURE, TOP_K, TOP_P,
};
use crate::llm::provider::Summarizer;
use crate::types::{AppError, AppResult, ContentPayload};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// Request types for the Gemini API
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiBlob,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: String,
}

#[derive(Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

// Response types for the Gemini API
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

pub struct GoogleAdapter {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GoogleAdapter {
    pub fn new(config: &LLMConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.google_api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Text goes out as one part with the prompt in front; binary content
    /// goes out as inline data followed by the prompt.
    fn build_request(payload: &ContentPayload) -> GenerateContentRequest {
        let prompt = PromptVariant::for_payload(payload).instructions();

        let parts = match payload {
            ContentPayload::Text(text) => vec![GeminiPart::Text {
                text: format!("{}\n\n{}", prompt, text),
            }],
            ContentPayload::InlineBinary { base64, mime_type } => vec![
                GeminiPart::InlineData {
                    inline_data: GeminiBlob {
                        mime_type: mime_type.clone(),
                        data: base64.clone(),
                    },
                },
                GeminiPart::Text {
                    text: prompt.to_string(),
                },
            ],
        };

        GenerateContentRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: category.to_string(),
                    threshold: SAFETY_THRESHOLD.to_string(),
                })
                .collect(),
        }
    }

    fn extract_text(response: GenerateContentResponse) -> AppResult<String> {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AppError::Upstream(format!(
                "the document was blocked by the model's safety filters ({})",
                reason
            )));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream("Gemini returned no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(AppError::Upstream(format!(
                "Gemini returned no text (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl Summarizer for GoogleAdapter {
    async fn summarize(&self, payload: &ContentPayload) -> AppResult<String> {
        let request = Self::build_request(payload);

        info!(
            model = %self.model,
            variant = ?PromptVariant::for_payload(payload),
            mime = payload.mime_type().unwrap_or("text/plain"),
            "Requesting summary from Gemini"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gemini request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, "Gemini returned an error status");

            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(AppError::Upstream(format!(
                    "Gemini API error ({}): {} (status: {})",
                    status,
                    error_response.error.message,
                    error_response.error.status.unwrap_or_default()
                )));
            }

            return Err(AppError::Upstream(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Gemini response: {}", e)))?;

        let summary = Self::extract_text(body)?;
        debug!(chars = summary.chars().count(), "Gemini summary received");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::{BINARY_SUMMARY_PROMPT, TEXT_SUMMARY_PROMPT};
    use mockito::Matcher;
    use serde_json::json;

    fn adapter_for(server: &mockito::Server) -> GoogleAdapter {
        GoogleAdapter::new(&LLMConfig {
            google_api_key: "test-key".to_string(),
            model: "gemini-test".to_string(),
            api_base: server.url(),
        })
    }

    #[test]
    fn test_text_request_shape() {
        let request = GoogleAdapter::build_request(&ContentPayload::Text("Q3 numbers".into()));
        let value = serde_json::to_value(&request).unwrap();

        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        let text = parts[0]["text"].as_str().unwrap();
        assert!(text.starts_with(TEXT_SUMMARY_PROMPT));
        assert!(text.ends_with("\n\nQ3 numbers"));

        assert_eq!(value["generationConfig"]["topK"], 64);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 800);
        assert_eq!(value["generationConfig"]["responseMimeType"], "text/plain");
        assert_eq!(value["safetySettings"].as_array().unwrap().len(), 4);
        for setting in value["safetySettings"].as_array().unwrap() {
            assert_eq!(setting["threshold"], "BLOCK_MEDIUM_AND_ABOVE");
        }
    }

    #[test]
    fn test_binary_request_shape() {
        let payload = ContentPayload::inline(b"%PDF-1.7", "application/pdf");
        let value = serde_json::to_value(GoogleAdapter::build_request(&payload)).unwrap();

        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[0]["inlineData"]["data"], "JVBERi0xLjc=");
        assert_eq!(parts[1]["text"], BINARY_SUMMARY_PROMPT);
    }

    #[tokio::test]
    async fn test_summarize_returns_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": { "temperature": 0.2, "topK": 64 }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": { "role": "model", "parts": [
                            { "text": "OVERVIEW: quarterly report.\n" },
                            { "text": "- REVENUE UP" }
                        ]},
                        "finishReason": "STOP"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let summary = adapter_for(&server)
            .summarize(&ContentPayload::Text("Revenue went up.".into()))
            .await
            .unwrap();

        assert_eq!(summary, "OVERVIEW: quarterly report.\n- REVENUE UP");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/gemini-test:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string())
            .create_async()
            .await;

        let result = adapter_for(&server)
            .summarize(&ContentPayload::Text("...".into()))
            .await;

        match result {
            Err(AppError::Upstream(message)) => assert!(message.contains("SAFETY")),
            other => panic!("expected upstream failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_wraps_upstream_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/gemini-test:generateContent")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = adapter_for(&server)
            .summarize(&ContentPayload::inline(b"img", "image/png"))
            .await;

        match result {
            Err(AppError::Upstream(message)) => {
                assert!(message.contains("API key not valid"));
                assert!(!message.contains("test-key"));
            }
            other => panic!("expected upstream failure, got {:?}", other),
        }
    }
}
