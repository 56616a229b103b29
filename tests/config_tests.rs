//! Tests for loading configuration from the process environment.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use apothecary::config::{AgentConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use apothecary::error::AgentError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 5] = [
    "OPENAI_API_KEY",
    "OPENAI_MODEL",
    "OPENAI_BASE_URL",
    "APOTHECARY_BIND",
    "APOTHECARY_CONFIG",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clean_env() -> EnvGuard {
    let guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    guard
}

#[test]
fn load_reads_openai_variables() {
    let _env_lock = env_lock_guard();
    let _env_guard = clean_env();

    std::env::set_var("OPENAI_API_KEY", "sk-env");
    std::env::set_var("OPENAI_MODEL", "gpt-5-mini");
    std::env::set_var("OPENAI_BASE_URL", "http://localhost:9999/v1/");
    std::env::set_var("APOTHECARY_BIND", "0.0.0.0:9000");

    let config = AgentConfig::load().unwrap();

    assert_eq!(config.api_key.as_deref(), Some("sk-env"));
    assert_eq!(config.model, "gpt-5-mini");
    assert_eq!(config.base_url, "http://localhost:9999/v1");
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:9000");
}

#[test]
fn explicit_config_file_fills_what_env_leaves_unset() {
    let _env_lock = env_lock_guard();
    let _env_guard = clean_env();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("apothecary.toml");
    std::fs::write(
        &path,
        "api_key = \"sk-file\"\nmodel = \"gpt-4o\"\nconnect_timeout_secs = 30\n",
    )
    .unwrap();
    std::env::set_var("APOTHECARY_CONFIG", &path);
    std::env::set_var("OPENAI_MODEL", "gpt-5");

    let config = AgentConfig::load().unwrap();

    assert_eq!(config.api_key.as_deref(), Some("sk-file"));
    assert_eq!(config.model, "gpt-5");
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.connect_timeout, Duration::from_secs(30));
}

#[test]
fn empty_env_key_overrides_config_file_key() {
    let _env_lock = env_lock_guard();
    let _env_guard = clean_env();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("apothecary.toml");
    std::fs::write(&path, "api_key = \"sk-file\"\n").unwrap();
    std::env::set_var("APOTHECARY_CONFIG", &path);
    std::env::set_var("OPENAI_API_KEY", "");

    let config = AgentConfig::load().unwrap();

    assert!(config.api_key.is_none());
    assert_eq!(config.model, DEFAULT_MODEL);
    match config.require_api_key().unwrap_err() {
        AgentError::Configuration(message) => {
            assert_eq!(message, "Missing OPENAI_API_KEY (set env var).")
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let _env_lock = env_lock_guard();
    let _env_guard = clean_env();

    let dir = TempDir::new().unwrap();
    std::env::set_var("APOTHECARY_CONFIG", dir.path().join("nope.toml"));

    assert!(AgentConfig::load().is_err());
}

#[test]
fn malformed_config_file_is_a_configuration_error() {
    let _env_lock = env_lock_guard();
    let _env_guard = clean_env();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("apothecary.toml");
    std::fs::write(&path, "model = [").unwrap();
    std::env::set_var("APOTHECARY_CONFIG", &path);

    let err = AgentConfig::load().unwrap_err();
    assert!(matches!(err, AgentError::Configuration(_)));
}
