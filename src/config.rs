use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const API_TOKEN_ENV: &str = "HUGGINGFACE_API_TOKEN";
pub const SEGMENTATION_URL_ENV: &str = "PHOTOMONIX_SEGMENTATION_URL";
pub const GENERATION_URL_ENV: &str = "PHOTOMONIX_GENERATION_URL";

const DEFAULT_SEGMENTATION_URL: &str =
    "https://api-inference.huggingface.co/models/briaai/RMBG-1.4";
const DEFAULT_GENERATION_URL: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhanceConfig {
    pub api_token: String,
    pub segmentation_endpoint: Url,
    pub generation_endpoint: Url,
    pub request_timeout: Duration,
}

impl EnhanceConfig {
    pub fn with_token(api_token: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_token: api_token.into(),
            segmentation_endpoint: parse_endpoint(SEGMENTATION_URL_ENV, DEFAULT_SEGMENTATION_URL)?,
            generation_endpoint: parse_endpoint(GENERATION_URL_ENV, DEFAULT_GENERATION_URL)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }
}

pub trait ConfigSource: Send + Sync + 'static {
    fn load(&self) -> Result<EnhanceConfig, ConfigError>;
}

// Reads the credential at call time from the process environment, with a
// .env file next to the app root as fallback.
#[derive(Debug, Clone)]
pub struct EnvConfigSource {
    app_root: PathBuf,
}

impl EnvConfigSource {
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
        }
    }

    pub fn from_current_dir() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl ConfigSource for EnvConfigSource {
    fn load(&self) -> Result<EnhanceConfig, ConfigError> {
        let dotenv = load_dotenv_map(self.app_root.as_path()).unwrap_or_default();

        let api_token = lookup(API_TOKEN_ENV, &dotenv).ok_or(ConfigError::MissingApiToken)?;
        let segmentation_endpoint = resolve_endpoint(
            SEGMENTATION_URL_ENV,
            DEFAULT_SEGMENTATION_URL,
            &dotenv,
        )?;
        let generation_endpoint =
            resolve_endpoint(GENERATION_URL_ENV, DEFAULT_GENERATION_URL, &dotenv)?;

        Ok(EnhanceConfig {
            api_token,
            segmentation_endpoint,
            generation_endpoint,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }
}

fn lookup(name: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(name)
        .ok()
        .or_else(|| dotenv.get(name).cloned())
        .filter(|value| !value.trim().is_empty())
}

fn resolve_endpoint(
    name: &'static str,
    default: &str,
    dotenv: &HashMap<String, String>,
) -> Result<Url, ConfigError> {
    match lookup(name, dotenv) {
        Some(raw) => parse_endpoint(name, raw.as_str()),
        None => parse_endpoint(name, default),
    }
}

fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { name, source })
}

pub(crate) fn load_dotenv_map(app_root: &Path) -> Result<HashMap<String, String>, std::io::Error> {
    let path = app_root.join(".env");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let raw = fs::read_to_string(path)?;
    Ok(parse_dotenv_content(raw.as_str()))
}

pub(crate) fn parse_dotenv_content(raw: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in raw.lines() {
        let mut value = line.trim();
        if value.is_empty() || value.starts_with('#') {
            continue;
        }
        if let Some(rest) = value.strip_prefix("export ") {
            value = rest.trim_start();
        }
        let Some((key_raw, value_raw)) = value.split_once('=') else {
            continue;
        };
        let key = key_raw.trim();
        if key.is_empty() {
            continue;
        }
        let mut parsed = value_raw.trim().to_string();
        if (parsed.starts_with('"') && parsed.ends_with('"'))
            || (parsed.starts_with('\'') && parsed.ends_with('\''))
        {
            if parsed.len() >= 2 {
                parsed = parsed[1..parsed.len() - 1].to_string();
            }
        } else if let Some((before_comment, _)) = parsed.split_once(" #") {
            parsed = before_comment.trim_end().to_string();
        }
        out.insert(key.to_string(), parsed);
    }
    out
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing {API_TOKEN_ENV} in environment or .env")]
    MissingApiToken,
    #[error("invalid endpoint in {name}: {source}")]
    InvalidEndpoint {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}
