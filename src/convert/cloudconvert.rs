//! CloudConvert Client
//!
//! Converts presentations to PDF with a three-task CloudConvert job:
//!
//! 1. `import/upload`: the job hands back a signed form, the source file is
//!    posted to it
//! 2. `convert`: output format `pdf`
//! 3. `export/url`: once the job finishes, the PDF is fetched from a
//!    temporary URL
//!
//! The job is polled until it reaches a terminal state, bounded by the
//! configured wait timeout.

use super::{ConversionError, FormatConverter};
use crate::config::ConversionConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

const IMPORT_TASK: &str = "import-presentation";
const CONVERT_TASK: &str = "convert-to-pdf";
const EXPORT_TASK: &str = "export-pdf";

const IMPORT_OPERATION: &str = "import/upload";
const CONVERT_OPERATION: &str = "convert";
const EXPORT_OPERATION: &str = "export/url";

const STATUS_FINISHED: &str = "finished";
const STATUS_ERROR: &str = "error";

#[derive(Debug, Deserialize)]
struct JobEnvelope {
    data: Job,
}

/// A CloudConvert job and its tasks
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub form: Option<UploadForm>,
    #[serde(default)]
    pub files: Vec<ExportedFile>,
}

/// Signed form returned by an `import/upload` task
#[derive(Debug, Clone, Deserialize)]
pub struct UploadForm {
    pub url: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportedFile {
    pub filename: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Job {
    /// The task created under `name`. A task that reports a different
    /// operation than the one requested does not match.
    pub fn task(&self, name: &str, operation: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| {
            t.name == name && t.operation.as_deref().map_or(true, |op| op == operation)
        })
    }

    fn upload_form(&self) -> Result<&UploadForm, ConversionError> {
        self.task(IMPORT_TASK, IMPORT_OPERATION)
            .and_then(|t| t.result.as_ref())
            .and_then(|r| r.form.as_ref())
            .ok_or(ConversionError::MissingTask(IMPORT_TASK))
    }

    fn export_url(&self) -> Result<String, ConversionError> {
        self.task(EXPORT_TASK, EXPORT_OPERATION)
            .and_then(|t| t.result.as_ref())
            .and_then(|r| r.files.first())
            .and_then(|f| f.url.clone())
            .ok_or(ConversionError::MissingExportUrl)
    }

    /// Message of the first failed task, if the service gave one.
    fn failure_message(&self) -> String {
        self.tasks
            .iter()
            .find(|t| t.status == STATUS_ERROR)
            .map(|t| {
                format!(
                    "task '{}' failed: {}",
                    t.name,
                    t.message.as_deref().unwrap_or("no message")
                )
            })
            .unwrap_or_else(|| format!("job {} ended in error", self.id))
    }
}

/// CloudConvert API client
pub struct CloudConvertClient {
    client: Client,
    api_key: String,
    api_base: String,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl CloudConvertClient {
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.cloudconvert_api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            wait_timeout: config.wait_timeout,
            poll_interval: config.poll_interval,
        }
    }

    fn job_definition() -> Value {
        json!({
            "tasks": {
                IMPORT_TASK: { "operation": IMPORT_OPERATION },
                CONVERT_TASK: {
                    "operation": CONVERT_OPERATION,
                    "input": IMPORT_TASK,
                    "output_format": "pdf"
                },
                EXPORT_TASK: { "operation": EXPORT_OPERATION, "input": CONVERT_TASK }
            },
            "tag": "doc-summarizer"
        })
    }

    async fn create_job(&self) -> Result<Job, ConversionError> {
        let response = self
            .client
            .post(format!("{}/jobs", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&Self::job_definition())
            .send()
            .await
            .map_err(|e| ConversionError::JobCreation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConversionError::JobCreation(format!("{}: {}", status, body)));
        }

        let envelope: JobEnvelope = response
            .json()
            .await
            .map_err(|e| ConversionError::JobCreation(format!("unexpected response: {}", e)))?;

        Ok(envelope.data)
    }

    async fn upload(
        &self,
        form: &UploadForm,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<(), ConversionError> {
        // Signed form fields must precede the file part.
        let mut multipart = Form::new();
        for (key, value) in &form.parameters {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            multipart = multipart.text(key.clone(), value);
        }
        multipart = multipart.part("file", Part::bytes(bytes).file_name(file_name.to_string()));

        let response = self
            .client
            .post(&form.url)
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| ConversionError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConversionError::Upload(format!("{}: {}", status, body)));
        }

        Ok(())
    }

    async fn fetch_job(&self, job_id: &str) -> Result<Job, ConversionError> {
        let response = self
            .client
            .get(format!("{}/jobs/{}", self.api_base, job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ConversionError::Status(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConversionError::Status(format!("{}: {}", status, body)));
        }

        let envelope: JobEnvelope = response
            .json()
            .await
            .map_err(|e| ConversionError::Status(format!("unexpected response: {}", e)))?;

        Ok(envelope.data)
    }

    async fn wait_for_job(&self, job_id: &str) -> Result<Job, ConversionError> {
        let poll = async {
            loop {
                let job = self.fetch_job(job_id).await?;
                match job.status.as_str() {
                    STATUS_FINISHED => return Ok(job),
                    STATUS_ERROR => return Err(ConversionError::JobFailed(job.failure_message())),
                    other => {
                        debug!(job_id, status = other, "Conversion job still running");
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
            }
        };

        match tokio::time::timeout(self.wait_timeout, poll).await {
            Ok(result) => result,
            Err(_) => {
                warn!(job_id, timeout = ?self.wait_timeout, "Conversion job timed out");
                Err(ConversionError::Timeout(self.wait_timeout))
            }
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ConversionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ConversionError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConversionError::DownloadFailed(format!(
                "export URL returned {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConversionError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FormatConverter for CloudConvertClient {
    async fn convert_to_pdf(
        &self,
        source: &Path,
        original_name: &str,
    ) -> Result<Vec<u8>, ConversionError> {
        let bytes = fs::read(source).await?;
        let source_size = bytes.len();

        let job = self.create_job().await?;
        info!(job_id = %job.id, source_size, "Created conversion job");

        self.upload(job.upload_form()?, bytes, original_name).await?;
        debug!(job_id = %job.id, "Uploaded source file");

        let finished = self.wait_for_job(&job.id).await?;
        let url = finished.export_url()?;
        let pdf = self.download(&url).await?;

        info!(job_id = %job.id, pdf_size = pdf.len(), "Conversion finished");
        Ok(pdf)
    }
}
