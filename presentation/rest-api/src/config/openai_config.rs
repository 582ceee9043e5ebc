use std::env;
use std::time::Duration;

use anyhow::{Context, bail};
use openai::client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};

/// Configuration for OpenAI API access.
///
/// Environment variables:
/// - OPENAI_CONNECTION_STRING: "Endpoint=https://...;Key=...;" (takes precedence)
/// - OPENAI_API_KEY / OPENAI_BASE_URL: used when no connection string is set
/// - OPENAI_MODEL: model or deployment name (default: "gpt-4o")
/// - OPENAI_TIMEOUT_SECS: request timeout (default: 30)
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, PartialEq)]
pub struct ConnectionString {
    pub endpoint: String,
    pub key: String,
}

impl OpenAIConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let (base_url, api_key) = match env::var("OPENAI_CONNECTION_STRING") {
            Ok(raw) => {
                let connection = parse_connection_string(&raw)?;
                (connection.endpoint, connection.key)
            }
            Err(_) => (
                env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                env::var("OPENAI_API_KEY")
                    .context("OPENAI_API_KEY or OPENAI_CONNECTION_STRING must be set")?,
            ),
        };

        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout = match env::var("OPENAI_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("OPENAI_TIMEOUT_SECS is not a number: {raw}"))?,
            ),
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout,
        })
    }
}

/// Parses "Endpoint=...;Key=...;" with case-insensitive keys.
pub fn parse_connection_string(raw: &str) -> anyhow::Result<ConnectionString> {
    let mut endpoint = None;
    let mut key = None;

    for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "endpoint" => endpoint = Some(value.trim().to_string()),
            "key" => key = Some(value.trim().to_string()),
            _ => {}
        }
    }

    match (endpoint, key) {
        (Some(endpoint), Some(key)) if !endpoint.is_empty() && !key.is_empty() => {
            Ok(ConnectionString { endpoint, key })
        }
        _ => bail!("Connection string must include both Endpoint and Key"),
    }
}
