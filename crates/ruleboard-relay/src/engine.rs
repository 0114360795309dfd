use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ChatMessage;

/// Checked in order against installed model names (substring match).
pub const PREFERRED_MODELS: [&str; 5] = ["llama3", "llama3:latest", "mistral", "gemma", "llama2"];

const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

pub const USER_AGENT: &str = concat!("ruleboard/", env!("CARGO_PKG_VERSION"));

/// Raw upstream body, passed through without re-framing.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Ollama service not available: {0}")]
    Unavailable(String),
    #[error("Ollama not reachable")]
    Unreachable,
    #[error("Could not fetch models")]
    TagsUnavailable,
    #[error("No models found")]
    NoModels,
    #[error("Connection failed")]
    Connection(#[source] reqwest::Error),
    #[error("reply stream broke off: {0}")]
    Stream(#[source] reqwest::Error),
    #[error("building the system prompt failed: {0}")]
    Framing(#[source] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatus {
    pub model: String,
}

#[derive(Deserialize)]
struct Tags {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}

/// First installed model matching a preference, else the first installed model.
pub fn select_model(installed: &[String]) -> Option<String> {
    PREFERRED_MODELS
        .iter()
        .find_map(|pref| installed.iter().find(|name| name.contains(pref)))
        .or_else(|| installed.first())
        .cloned()
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    default_model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, default_model: &str) -> Self {
        let http = match reqwest::Client::builder()
            .connect_timeout(STATUS_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
        {
            Ok(http) => http,
            Err(e) => {
                warn!(error = %e, "HTTP client setup failed, using reqwest defaults");
                reqwest::Client::new()
            }
        };
        OllamaClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: default_model.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Start a streaming chat. The returned body is the upstream NDJSON, untouched.
    pub async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
    ) -> Result<ByteStream, RelayError> {
        let model = model.filter(|m| !m.is_empty()).unwrap_or(&self.default_model);
        let url = format!("{}/api/chat", self.base_url);
        debug!(%url, model, messages = messages.len(), "opening chat stream");

        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "model": model,
                "messages": messages,
                "stream": true,
            }))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "ollama request failed");
                RelayError::Unavailable(e.to_string())
            })?;

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "ollama rejected chat request");
            return Err(RelayError::Unavailable(format!("HTTP {}", resp.status())));
        }
        Ok(Box::pin(resp.bytes_stream()))
    }

    /// Check the server is up, then pick a model from the installed tags.
    pub async fn status(&self) -> Result<ModelStatus, RelayError> {
        let root = self
            .http
            .get(format!("{}/", self.base_url))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
            .map_err(RelayError::Connection)?;
        if !root.status().is_success() {
            return Err(RelayError::Unreachable);
        }

        let tags = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
            .map_err(RelayError::Connection)?;
        if !tags.status().is_success() {
            return Err(RelayError::TagsUnavailable);
        }
        let tags: Tags = tags.json().await.map_err(RelayError::Connection)?;

        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        let model = select_model(&names).ok_or(RelayError::NoModels)?;
        debug!(%model, installed = names.len(), "ollama model selected");
        Ok(ModelStatus { model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn preference_order_wins_over_install_order() {
        let installed = names(&["qwen3-vl:8b", "gemma:2b", "mistral:7b"]);
        assert_eq!(select_model(&installed).as_deref(), Some("mistral:7b"));
    }

    #[test]
    fn llama3_matches_by_substring() {
        let installed = names(&["llama2:13b", "llama3.1:8b"]);
        assert_eq!(select_model(&installed).as_deref(), Some("llama3.1:8b"));
    }

    #[test]
    fn falls_back_to_first_installed() {
        let installed = names(&["qwen3-vl:8b", "phi3"]);
        assert_eq!(select_model(&installed).as_deref(), Some("qwen3-vl:8b"));
        assert_eq!(select_model(&[]), None);
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = OllamaClient::new("http://localhost:11434/", "qwen3-vl:8b");
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.default_model(), "qwen3-vl:8b");
    }
}
