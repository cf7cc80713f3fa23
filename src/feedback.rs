use crate::db::{KeyValueStore, StorageError};
use crate::models::{Message, Rating};

pub const STORAGE_KEY_PREFIX: &str = "yaseen-feedback-";

/// DJB2 (xor variant) over UTF-16 code units, as an unsigned 32-bit value.
///
/// Identical text always maps to the same key, so a rating belongs to the
/// content rather than to a particular message.
pub fn content_hash(content: &str) -> u32 {
    content
        .encode_utf16()
        .fold(5381u32, |h, unit| h.wrapping_mul(33) ^ u32::from(unit))
}

pub fn storage_key(content: &str) -> String {
    format!("{}{}", STORAGE_KEY_PREFIX, content_hash(content))
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Only assistant answers can be rated")]
    NotAssistant,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Up/down ratings keyed by a hash of the rated content. Last write wins.
pub struct FeedbackStore<S> {
    store: S,
}

impl<S: KeyValueStore> FeedbackStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn set_rating(&self, content: &str, rating: Rating) -> Result<(), StorageError> {
        let key = storage_key(content);
        tracing::debug!(%key, rating = rating.as_str(), "storing feedback");
        self.store.set(&key, rating.as_str())
    }

    pub fn get_rating(&self, content: &str) -> Result<Option<Rating>, StorageError> {
        let value = self.store.get(&storage_key(content))?;
        Ok(value.as_deref().and_then(Rating::parse))
    }

    pub fn rate_message(&self, message: &Message, rating: Rating) -> Result<(), FeedbackError> {
        if !message.is_assistant() {
            return Err(FeedbackError::NotAssistant);
        }
        self.set_rating(&message.content, rating)?;
        Ok(())
    }

    pub fn rating_for(&self, message: &Message) -> Result<Option<Rating>, StorageError> {
        if !message.is_assistant() {
            return Ok(None);
        }
        self.get_rating(&message.content)
    }
}
