use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::behavior::ClassifierThresholds;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub inference: InferenceConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub classifier: ClassifierThresholds,
    /// Cache TTL, minutes-scale so one page view never reorders itself.
    pub cache_ttl_ms: u64,
    /// Recomputation coalescing window.
    pub debounce_ms: u64,
    pub default_limit: usize,
    pub max_limit: usize,
}

#[derive(Clone, Debug)]
pub struct InferenceConfig {
    pub enabled: bool,
    /// Attempted in order; first success wins.
    pub providers: Vec<ProviderConfig>,
}

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Ollama,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                classifier: ClassifierThresholds::default(),
                cache_ttl_ms: 300_000,
                debounce_ms: 1_000,
                default_limit: 8,
                max_limit: 50,
            },
            inference: InferenceConfig { enabled: false, providers: Vec::new() },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported inference provider `{other}` (expected openai|anthropic|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    engine: Option<EnginePatch>,
    inference: Option<InferencePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    impulse_max_hover_ms: Option<f64>,
    researcher_min_page_visits: Option<u32>,
    researcher_min_hover_ms: Option<f64>,
    cache_ttl_ms: Option<u64>,
    debounce_ms: Option<u64>,
    default_limit: Option<usize>,
    max_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct InferencePatch {
    enabled: Option<bool>,
    #[serde(default)]
    providers: Vec<ProviderPatch>,
}

#[derive(Debug, Deserialize)]
struct ProviderPatch {
    kind: String,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<String>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("shoprank.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(engine) = patch.engine {
            if let Some(value) = engine.impulse_max_hover_ms {
                self.engine.classifier.impulse_max_hover_ms = value;
            }
            if let Some(value) = engine.researcher_min_page_visits {
                self.engine.classifier.researcher_min_page_visits = value;
            }
            if let Some(value) = engine.researcher_min_hover_ms {
                self.engine.classifier.researcher_min_hover_ms = value;
            }
            if let Some(value) = engine.cache_ttl_ms {
                self.engine.cache_ttl_ms = value;
            }
            if let Some(value) = engine.debounce_ms {
                self.engine.debounce_ms = value;
            }
            if let Some(value) = engine.default_limit {
                self.engine.default_limit = value;
            }
            if let Some(value) = engine.max_limit {
                self.engine.max_limit = value;
            }
        }

        if let Some(inference) = patch.inference {
            if let Some(enabled) = inference.enabled {
                self.inference.enabled = enabled;
            }
            for provider in inference.providers {
                let kind: ProviderKind = provider.kind.parse()?;
                self.inference.providers.push(ProviderConfig {
                    kind,
                    api_key: provider.api_key.map(secret_value),
                    base_url: provider.base_url,
                    model: provider.model.unwrap_or_else(|| default_model(kind).to_string()),
                    timeout_secs: provider.timeout_secs.unwrap_or(10),
                    max_tokens: provider.max_tokens.unwrap_or(400),
                });
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(value) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = value;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format.parse()?;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SHOPRANK_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SHOPRANK_SERVER_PORT") {
            self.server.port = parse_u16("SHOPRANK_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("SHOPRANK_ENGINE_CACHE_TTL_MS") {
            self.engine.cache_ttl_ms = parse_u64("SHOPRANK_ENGINE_CACHE_TTL_MS", &value)?;
        }
        if let Some(value) = read_env("SHOPRANK_ENGINE_DEBOUNCE_MS") {
            self.engine.debounce_ms = parse_u64("SHOPRANK_ENGINE_DEBOUNCE_MS", &value)?;
        }

        if let Some(value) = read_env("SHOPRANK_INFERENCE_ENABLED") {
            self.inference.enabled = parse_bool("SHOPRANK_INFERENCE_ENABLED", &value)?;
        }
        for provider in &mut self.inference.providers {
            let key_var = match provider.kind {
                ProviderKind::OpenAi => "SHOPRANK_OPENAI_API_KEY",
                ProviderKind::Anthropic => "SHOPRANK_ANTHROPIC_API_KEY",
                ProviderKind::Ollama => continue,
            };
            if let Some(value) = read_env(key_var) {
                provider.api_key = Some(secret_value(value));
            }
        }

        let log_level =
            read_env("SHOPRANK_LOGGING_LEVEL").or_else(|| read_env("SHOPRANK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SHOPRANK_LOGGING_FORMAT").or_else(|| read_env("SHOPRANK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.cache_ttl_ms == 0 {
            return Err(ConfigError::Validation(
                "engine.cache_ttl_ms must be greater than zero".to_string(),
            ));
        }
        if self.engine.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "engine.debounce_ms must be greater than zero".to_string(),
            ));
        }
        if self.engine.default_limit == 0 || self.engine.default_limit > self.engine.max_limit {
            return Err(ConfigError::Validation(
                "engine.default_limit must be in range 1..=engine.max_limit".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".to_string()));
        }

        for provider in &self.inference.providers {
            if provider.timeout_secs == 0 || provider.timeout_secs > 300 {
                return Err(ConfigError::Validation(
                    "inference provider timeout_secs must be in range 1..=300".to_string(),
                ));
            }
            match provider.kind {
                ProviderKind::OpenAi | ProviderKind::Anthropic => {
                    let missing = provider
                        .api_key
                        .as_ref()
                        .map(|value| value.expose_secret().trim().is_empty())
                        .unwrap_or(true);
                    if missing {
                        return Err(ConfigError::Validation(
                            "api_key is required for openai/anthropic providers".to_string(),
                        ));
                    }
                }
                ProviderKind::Ollama => {
                    let missing = provider
                        .base_url
                        .as_ref()
                        .map(|value| value.trim().is_empty())
                        .unwrap_or(true);
                    if missing {
                        return Err(ConfigError::Validation(
                            "base_url is required for ollama providers".to_string(),
                        ));
                    }
                }
            }
        }

        if self.inference.enabled && self.inference.providers.is_empty() {
            return Err(ConfigError::Validation(
                "inference.enabled requires at least one configured provider".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "gpt-4o-mini",
        ProviderKind::Anthropic => "claude-3-5-haiku-latest",
        ProviderKind::Ollama => "llama3.1",
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("shoprank.toml"), PathBuf::from("config/shoprank.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
