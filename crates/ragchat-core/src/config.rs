use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Default user-visible text shown when an exchange fails.
pub const DEFAULT_ERROR_TEXT: &str = "응답을 받을 수 없습니다. 다시 시도해주세요.";

/// Top-level configuration for the ragchat application.
///
/// Loaded from `~/.ragchat/config.toml` by default. Every section falls back
/// to its defaults when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagchatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl RagchatConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RagchatConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Endpoint the LLM proxy backend posts to.
    ///
    /// Falls back to `/api/llm` on the configured server address; a wildcard
    /// bind address is reached through loopback.
    pub fn llm_proxy_url(&self) -> String {
        if let Some(ref url) = self.upstream.llm_proxy_url {
            return url.clone();
        }
        let host = match self.server.host.as_str() {
            "0.0.0.0" | "" => "127.0.0.1",
            "::" => "[::1]",
            other => other,
        };
        format!("http://{}:{}/api/llm", host, self.server.port)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// External services the proxies and the chat backend talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// LLM service the `/api/llm` proxy forwards to.
    pub llm_url: String,
    /// Search service the `/api/rag` proxy forwards to.
    pub rag_url: String,
    /// Answer service queried directly by the chat backend (`?req=`).
    pub backend_url: String,
    /// LLM proxy endpoint used when `chat.backend = "llm_proxy"`.
    /// Unset means this server's own `/api/llm`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_proxy_url: Option<String>,
    /// Request timeout for every upstream call.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            llm_url: "http://localhost:8001/llm".to_string(),
            rag_url: "http://localhost:8002/rag".to_string(),
            backend_url: "http://localhost:8000".to_string(),
            llm_proxy_url: None,
            timeout_secs: 30,
        }
    }
}

/// Which chat backend drives exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// `GET backend_url?req=...` returning answer, type, and documents.
    #[default]
    Direct,
    /// `POST llm_proxy_url` returning a plain answer.
    LlmProxy,
}

/// Chat transcript and view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub backend: BackendKind,
    /// Results shown per page under a bot message.
    pub page_size: usize,
    /// Maximum characters accepted per submission.
    pub max_message_length: usize,
    /// Text of the bot message that replaces a failed exchange.
    pub error_text: String,
    /// Base URL result links point at (`{base}/{id}/`).
    pub result_link_base: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Direct,
            page_size: 10,
            max_message_length: 2000,
            error_text: DEFAULT_ERROR_TEXT.to_string(),
            result_link_base: "http://a".to_string(),
        }
    }
}
