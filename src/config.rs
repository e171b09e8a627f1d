use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CLOUDCONVERT_API_BASE: &str = "https://api.cloudconvert.com/v2";

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub conversion: ConversionConfig,
    pub limits: LimitsConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Clone)]
pub struct LLMConfig {
    pub google_api_key: String,
    pub model: String,
    pub api_base: String,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            google_api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: DEFAULT_GOOGLE_API_BASE.to_string(),
        }
    }
}

impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("google_api_key", &redact(&self.google_api_key))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Clone)]
pub struct ConversionConfig {
    pub cloudconvert_api_key: String,
    pub api_base: String,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            cloudconvert_api_key: String::new(),
            api_base: DEFAULT_CLOUDCONVERT_API_BASE.to_string(),
            wait_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(1000),
        }
    }
}

impl std::fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("cloudconvert_api_key", &redact(&self.cloudconvert_api_key))
            .field("api_base", &self.api_base)
            .field("wait_timeout", &self.wait_timeout)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Byte ceilings for each stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitsConfig {
    pub max_upload_bytes: u64,
    pub max_inline_bytes: u64,
    pub max_conversion_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 * MIB,
            max_inline_bytes: 20 * MIB,
            max_conversion_bytes: 25 * MIB,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: env::temp_dir().join("doc-summarizer"),
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            llm: LLMConfig {
                google_api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
                api_base: env::var("GOOGLE_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_GOOGLE_API_BASE.to_string()),
            },
            conversion: ConversionConfig {
                cloudconvert_api_key: env::var("CLOUDCONVERT_API_KEY").unwrap_or_default(),
                api_base: env::var("CLOUDCONVERT_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_CLOUDCONVERT_API_BASE.to_string()),
                wait_timeout: Duration::from_secs(
                    env::var("CONVERSION_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "120".to_string())
                        .parse()?,
                ),
                poll_interval: Duration::from_millis(
                    env::var("CONVERSION_POLL_INTERVAL_MS")
                        .unwrap_or_else(|_| "1000".to_string())
                        .parse()?,
                ),
            },
            limits: LimitsConfig {
                max_upload_bytes: parse_bytes("MAX_UPLOAD_BYTES", defaults.limits.max_upload_bytes)?,
                max_inline_bytes: parse_bytes("MAX_INLINE_BYTES", defaults.limits.max_inline_bytes)?,
                max_conversion_bytes: parse_bytes(
                    "MAX_CONVERSION_BYTES",
                    defaults.limits.max_conversion_bytes,
                )?,
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.upload_dir),
            },
        })
    }

    /// Names of the required credentials that are not configured.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.llm.google_api_key.trim().is_empty() {
            missing.push("GOOGLE_API_KEY");
        }
        if self.conversion.cloudconvert_api_key.trim().is_empty() {
            missing.push("CLOUDCONVERT_API_KEY");
        }
        missing
    }
}

fn parse_bytes(var: &str, default: u64) -> Result<u64> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a byte count: {}", var, e)),
        Err(_) => Ok(default),
    }
}
