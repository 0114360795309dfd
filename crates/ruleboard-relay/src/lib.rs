//! Chat relay between the dashboard and a locally running Ollama server.
//!
//! Each request is framed with a system prompt built from the selected rule, the
//! project's dependency list and the persisted root architecture. The model's NDJSON
//! reply is handed back as a raw byte stream.

pub mod engine;
pub mod parse;
pub mod prompt;

use std::path::PathBuf;

use futures_util::StreamExt;
use ruleboard_core::{FlatFileStore, Rule};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use engine::{select_model, ByteStream, ModelStatus, OllamaClient, RelayError, PREFERRED_MODELS, USER_AGENT};
pub use parse::{ChatChunk, ChunkDecoder};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage { role: Role::User, content: content.into() }
    }
}

/// Body of a chat call: the prior conversation plus the rule it is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub context: Rule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Relay {
    client: OllamaClient,
    store: FlatFileStore,
    manifest: PathBuf,
}

impl Relay {
    pub fn new(client: OllamaClient, store: FlatFileStore, manifest: impl Into<PathBuf>) -> Self {
        Relay {
            client,
            store,
            manifest: manifest.into(),
        }
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// Conversation as sent upstream: a fresh system prompt followed by the caller's
    /// messages. Manifest and architecture are read on every call.
    pub fn framed_messages(&self, request: &ChatRequest) -> Vec<ChatMessage> {
        let stack = prompt::tech_stack(&self.manifest);
        let architecture = prompt::architecture_summary(self.store.read_root_graph().as_ref());
        let system = prompt::system_prompt(&stack, &architecture, &request.context);

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend(request.messages.iter().cloned());
        messages
    }

    /// Frame `request` and open the upstream stream. Framing reads the manifest and the
    /// root view from disk, so it runs on the blocking pool.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ByteStream, RelayError> {
        let relay = self.clone();
        let framing = request.clone();
        let messages = tokio::task::spawn_blocking(move || relay.framed_messages(&framing))
            .await
            .map_err(RelayError::Framing)?;
        info!(
            rule = %request.context.id,
            turns = request.messages.len(),
            "relaying chat to ollama"
        );
        self.client
            .chat_stream(&messages, request.model.as_deref())
            .await
    }

    /// Run a chat to completion and return the assembled reply text.
    pub async fn ask(&self, request: &ChatRequest) -> Result<String, RelayError> {
        let mut stream = self.chat(request).await?;
        let mut decoder = ChunkDecoder::new();
        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(RelayError::Stream)?;
            for piece in decoder.push(&chunk) {
                reply.push_str(&piece.content);
            }
        }
        if let Some(piece) = decoder.finish() {
            reply.push_str(&piece.content);
        }
        Ok(reply)
    }

    pub async fn status(&self) -> Result<ModelStatus, RelayError> {
        self.client.status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_accepts_dashboard_payload() {
        let raw = r#"{
            "messages": [{"role": "user", "content": "How do we detect this?"}],
            "context": {"id": "TR-001", "title": "Over invoicing", "description": "d",
                        "indicators": ["x"], "section": "Trade", "type": "Hard Logic", "risk": "High"}
        }"#;
        let req: ChatRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.messages, vec![ChatMessage::user("How do we detect this?")]);
        assert_eq!(req.context.id, "TR-001");
        assert!(req.model.is_none());
    }

    #[test]
    fn roles_are_lowercase_on_the_wire() {
        let json = serde_json::to_value(ChatMessage::system("x")).unwrap();
        assert_eq!(json["role"], "system");
    }
}
