//! Translation between backend answer payloads and transcript messages.
//!
//! The backend speaks `{answer, citations, confidence}`. Intermediaries may
//! rewrap that into a generic multi-message envelope or re-encode it as a
//! JSON string, so decoding walks a fixed list of shapes and always ends in
//! plain text: a non-empty body is never dropped.

use super::{BackendError, ChatResponse};
use crate::models::{Message, Role};
use serde::{Deserialize, Serialize};

/// How many times a payload may be re-encoded as a JSON string before the
/// remaining text is shown literally.
const MAX_REENCODING_DEPTH: usize = 4;

/// Generic multi-message envelope used by chat UI libraries.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatEnvelope {
    pub messages: Vec<EnvelopeMessage>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EnvelopeMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatEnvelope {
    /// Wrap a native answer as a single assistant message. The envelope has
    /// no slot for citations or confidence, so they are dropped.
    pub fn wrap(response: &ChatResponse) -> Self {
        Self {
            messages: vec![EnvelopeMessage {
                id: Some(uuid::Uuid::new_v4().to_string()),
                role: Role::Assistant.as_str().to_string(),
                content: Some(response.answer.clone()),
            }],
        }
    }

    /// Render a transcript in envelope form.
    pub fn from_log(messages: &[Message]) -> Self {
        Self {
            messages: messages
                .iter()
                .map(|m| EnvelopeMessage {
                    id: Some(uuid::Uuid::new_v4().to_string()),
                    role: m.role.as_str().to_string(),
                    content: Some(m.content.clone()),
                })
                .collect(),
        }
    }

    fn assistant_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant.as_str())
            .find_map(|m| m.content.as_deref().filter(|c| !c.is_empty()))
    }
}

#[derive(Deserialize)]
struct ContentOnly {
    content: String,
}

#[derive(Deserialize)]
struct AnswerOnly {
    answer: String,
}

/// Shapes a payload may take, tried top to bottom.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Native(ChatResponse),
    Envelope(ChatEnvelope),
    Content(ContentOnly),
    Answer(AnswerOnly),
    Reencoded(String),
}

/// A decoded reply, tagged with the shape it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Native(ChatResponse),
    Envelope(String),
    Content(String),
    Answer(String),
    PlainText(String),
}

impl Reply {
    pub fn into_message(self) -> Message {
        match self {
            Reply::Native(response) => native_message(response),
            Reply::Envelope(text)
            | Reply::Content(text)
            | Reply::Answer(text)
            | Reply::PlainText(text) => Message::assistant(text),
        }
    }
}

/// Decode a raw success body. Fails only when there is nothing to display.
pub fn decode_reply(body: &str) -> Result<Reply, BackendError> {
    if body.trim().is_empty() {
        return Err(BackendError::Decode("empty response body".to_string()));
    }
    Ok(decode_at_depth(body, 0))
}

/// Decode a raw success body straight into an assistant message.
pub fn adapt(body: &str) -> Result<Message, BackendError> {
    decode_reply(body).map(Reply::into_message)
}

fn decode_at_depth(raw: &str, depth: usize) -> Reply {
    let plain = || Reply::PlainText(raw.to_string());

    if !raw.trim_start().starts_with(|c| c == '{' || c == '"') {
        return plain();
    }

    let payload = match serde_json::from_str::<Payload>(raw) {
        Ok(payload) => payload,
        Err(_) => return plain(),
    };

    match payload {
        Payload::Native(response) => Reply::Native(response),
        Payload::Envelope(envelope) => match envelope.assistant_content() {
            Some(content) => Reply::Envelope(content.to_string()),
            None => plain(),
        },
        Payload::Content(ContentOnly { content }) if !content.is_empty() => {
            Reply::Content(content)
        }
        // an empty `content` must not hide a usable `answer`
        Payload::Content(_) => match serde_json::from_str::<AnswerOnly>(raw) {
            Ok(AnswerOnly { answer }) if !answer.is_empty() => Reply::Answer(answer),
            _ => plain(),
        },
        Payload::Answer(AnswerOnly { answer }) if !answer.is_empty() => Reply::Answer(answer),
        Payload::Reencoded(inner) if depth < MAX_REENCODING_DEPTH && !inner.trim().is_empty() => {
            decode_at_depth(&inner, depth + 1)
        }
        _ => plain(),
    }
}

fn native_message(response: ChatResponse) -> Message {
    let citations: Vec<_> = response
        .citations
        .into_iter()
        .filter(|c| !c.reference.trim().is_empty())
        .collect();

    let confidence =
        Some(response.confidence).filter(|c| c.is_finite() && (0.0..=1.0).contains(c));
    if confidence.is_none() {
        tracing::debug!(
            confidence = response.confidence,
            "dropping out-of-range confidence"
        );
    }

    Message {
        role: Role::Assistant,
        content: response.answer,
        citations,
        confidence,
    }
}
