//! CLI argument definitions for the ragchat server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use ragchat_core::config::RagchatConfig;
use std::path::PathBuf;

/// ragchat - browser chat client with LLM and RAG proxies.
#[derive(Parser, Debug, Default)]
#[command(name = "ragchat", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Address to bind.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Upstream LLM service URL.
    #[arg(long = "llm-url")]
    pub llm_url: Option<String>,

    /// Upstream RAG search service URL.
    #[arg(long = "rag-url")]
    pub rag_url: Option<String>,

    /// Answer service queried by the direct chat backend.
    #[arg(long = "backend-url")]
    pub backend_url: Option<String>,

    /// LLM proxy endpoint for the llm_proxy chat backend (defaults to this server's /api/llm).
    #[arg(long = "llm-proxy-url")]
    pub llm_proxy_url: Option<String>,
}

/// First of flag, env value, config value.
fn pick(flag: Option<&String>, env: Option<String>, config: &str) -> String {
    flag.cloned()
        .or(env.filter(|v| !v.is_empty()))
        .unwrap_or_else(|| config.to_string())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RAGCHAT_CONFIG env var > ~/.ragchat/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env_var("RAGCHAT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --port flag > RAGCHAT_PORT env var > config file value > 3000.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        resolve_port_from(self.port, env_var("RAGCHAT_PORT"), config_port)
    }

    pub fn resolve_host(&self, config_host: &str) -> String {
        pick(self.host.as_ref(), None, config_host)
    }

    pub fn resolve_log_level(&self, config_level: &str) -> String {
        pick(self.log_level.as_ref(), None, config_level)
    }

    /// Overlay flags and environment onto a loaded config.
    ///
    /// An unset LLM proxy URL is left unset so it tracks the resolved
    /// server address.
    pub fn apply(&self, config: &mut RagchatConfig) {
        config.server.port = self.resolve_port(config.server.port);
        config.server.host = self.resolve_host(&config.server.host);
        config.general.log_level = self.resolve_log_level(&config.general.log_level);
        config.upstream.llm_url = pick(
            self.llm_url.as_ref(),
            env_var("RAGCHAT_LLM_URL"),
            &config.upstream.llm_url,
        );
        config.upstream.rag_url = pick(
            self.rag_url.as_ref(),
            env_var("RAGCHAT_RAG_URL"),
            &config.upstream.rag_url,
        );
        config.upstream.backend_url = pick(
            self.backend_url.as_ref(),
            env_var("RAGCHAT_BACKEND_URL"),
            &config.upstream.backend_url,
        );
        if let Some(url) = self
            .llm_proxy_url
            .clone()
            .or(env_var("RAGCHAT_LLM_PROXY_URL").filter(|v| !v.is_empty()))
        {
            config.upstream.llm_proxy_url = Some(url);
        }
    }
}

fn resolve_port_from(flag: Option<u16>, env: Option<String>, config_port: u16) -> u16 {
    if let Some(p) = flag {
        return p;
    }
    if let Some(p) = env.and_then(|v| v.parse::<u16>().ok()) {
        return p;
    }
    if config_port != 0 {
        return config_port;
    }
    3000
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Some(home) = env_var("USERPROFILE") {
        return PathBuf::from(home).join(".ragchat").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Some(home) = env_var("HOME") {
        return PathBuf::from(home).join(".ragchat").join("config.toml");
    }
    PathBuf::from("config.toml")
}
