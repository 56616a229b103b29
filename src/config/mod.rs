//! Configuration system (layered: defaults < config file < environment).

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AgentError, Result};

pub const DEFAULT_MODEL: &str = "gpt-5";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const CONFIG_FILE_NAME: &str = "apothecary.toml";
const API_KEY_FILE_NAME: &str = "api-key.txt";

/// Runtime configuration for the agent and its HTTP surface.
///
/// Resolution order for every field, later wins:
/// 1. Built-in defaults
/// 2. TOML config file (`APOTHECARY_CONFIG`, `./apothecary.toml`, or the
///    platform config directory)
/// 3. Environment variables (a `.env` file is loaded first if present)
///
/// The API key is special: when `OPENAI_API_KEY` is set at all it is
/// authoritative, even if empty. Only when it is unset do the config file
/// and then `api-key.txt` get consulted.
#[derive(Clone, Builder)]
pub struct AgentConfig {
    #[builder(into)]
    pub api_key: Option<String>,
    #[builder(into, default = DEFAULT_MODEL.to_string())]
    pub model: String,
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    /// Bound on establishing the upstream connection.
    #[builder(default = DEFAULT_CONNECT_TIMEOUT)]
    pub connect_timeout: Duration,
    #[builder(default = Duration::from_secs(120))]
    pub stream_idle_timeout: Duration,
    #[builder(default = default_bind())]
    pub bind_addr: SocketAddr,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("connect_timeout", &self.connect_timeout)
            .field("stream_idle_timeout", &self.stream_idle_timeout)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Optional settings read from the TOML config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub bind: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub stream_idle_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Parse a config file's contents.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| AgentError::Configuration(e.to_string()))
    }

    /// Read and parse the file at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Locate the config file, if any.
    ///
    /// An explicit `APOTHECARY_CONFIG` path must exist; the implicit
    /// locations are optional.
    pub fn discover(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        if let Some(explicit) = lookup("APOTHECARY_CONFIG") {
            return Self::read(Path::new(&explicit)).map(Some);
        }
        for candidate in implicit_config_paths() {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "loading config file");
                return Self::read(&candidate).map(Some);
            }
        }
        Ok(None)
    }
}

fn implicit_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dirs) = directories::ProjectDirs::from("", "", "apothecary") {
        paths.push(dirs.config_dir().join("config.toml"));
    }
    paths
}

impl AgentConfig {
    /// Load from `.env`, the config file, and the process environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let lookup = |key: &str| std::env::var(key).ok();
        let file = FileConfig::discover(lookup)?;
        Self::from_lookup(file.unwrap_or_default(), lookup, Path::new(API_KEY_FILE_NAME))
    }

    /// Resolve configuration from a parsed file and an environment lookup.
    pub fn from_lookup(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
        api_key_file: &Path,
    ) -> Result<Self> {
        let api_key = resolve_api_key(&lookup, file.api_key.as_deref(), api_key_file);

        let model = lookup("OPENAI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = lookup("OPENAI_BASE_URL")
            .filter(|u| !u.trim().is_empty())
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let bind = lookup("APOTHECARY_BIND")
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|_| AgentError::Configuration(format!("invalid bind address: {bind}")))?;

        let mut config = Self::builder()
            .maybe_api_key(api_key)
            .model(model)
            .base_url(base_url.trim_end_matches('/'))
            .bind_addr(bind_addr)
            .build();
        if let Some(secs) = file.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.stream_idle_timeout_secs {
            config.stream_idle_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// The API key, or a configuration error naming the missing variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AgentError::Configuration("Missing OPENAI_API_KEY (set env var).".into()))
    }
}

fn resolve_api_key(
    lookup: &impl Fn(&str) -> Option<String>,
    file_key: Option<&str>,
    api_key_file: &Path,
) -> Option<String> {
    if let Some(key) = lookup("OPENAI_API_KEY") {
        return non_empty(&key);
    }
    if let Some(key) = file_key.and_then(non_empty) {
        return Some(key);
    }
    std::fs::read_to_string(api_key_file)
        .ok()
        .and_then(|contents| non_empty(&contents))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}
