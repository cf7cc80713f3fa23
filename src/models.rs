use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Which body of text a citation points into.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CitationKind {
    /// Primary text, e.g. a Qur'an verse address like `2:255`.
    #[serde(rename = "quran")]
    Scripture,
    /// Secondary text, e.g. a hadith locator like `Bukhari 1/2`.
    #[serde(rename = "hadith")]
    Narration,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: CitationKind,
    #[serde(rename = "ref")]
    pub reference: String,
}

impl Citation {
    /// Display label. Scripture refs carry a `Q ` prefix, narration refs are shown bare.
    pub fn label(&self) -> String {
        match self.kind {
            CitationKind::Scripture => format!("Q {}", self.reference),
            CitationKind::Narration => self.reference.clone(),
        }
    }
}

/// A single transcript turn. Never mutated once appended to a log.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            citations: Vec::new(),
            confidence: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            citations: Vec::new(),
            confidence: None,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    pub fn confidence_percent(&self) -> Option<u8> {
        self.confidence.map(|c| (c * 100.0).round() as u8)
    }
}

/// Thumbs up/down feedback on an assistant answer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Up => "up",
            Rating::Down => "down",
        }
    }

    /// Only the literal strings `"up"` and `"down"` are recognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Rating::Up),
            "down" => Some(Rating::Down),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_labels_differ_by_kind() {
        let verse = Citation {
            kind: CitationKind::Scripture,
            reference: "2:255".into(),
        };
        let hadith = Citation {
            kind: CitationKind::Narration,
            reference: "Bukhari 1/2".into(),
        };
        assert_eq!(verse.label(), "Q 2:255");
        assert_eq!(hadith.label(), "Bukhari 1/2");
    }

    #[test]
    fn citation_uses_wire_names() {
        let c: Citation = serde_json::from_str(r#"{"type":"hadith","ref":"Muslim 8"}"#).unwrap();
        assert_eq!(c.kind, CitationKind::Narration);
        assert_eq!(c.reference, "Muslim 8");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "hadith");
        assert_eq!(json["ref"], "Muslim 8");
    }

    #[test]
    fn user_message_serializes_without_answer_metadata() {
        let json = serde_json::to_value(Message::user("salam")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "salam"}));
    }

    #[test]
    fn rating_parse_rejects_unknown_values() {
        assert_eq!(Rating::parse("up"), Some(Rating::Up));
        assert_eq!(Rating::parse("down"), Some(Rating::Down));
        assert_eq!(Rating::parse("Up"), None);
        assert_eq!(Rating::parse(""), None);
    }

    #[test]
    fn confidence_percent_rounds() {
        let mut m = Message::assistant("a");
        assert_eq!(m.confidence_percent(), None);
        m.confidence = Some(0.876);
        assert_eq!(m.confidence_percent(), Some(88));
    }
}
