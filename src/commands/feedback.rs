use crate::db::KeyValueStore;
use crate::feedback::FeedbackStore;
use crate::models::{Message, Rating};

/// Current selection for a message's feedback buttons, `None` when unrated.
pub fn get_feedback<S: KeyValueStore>(
    feedback: &FeedbackStore<S>,
    message: &Message,
) -> Result<Option<Rating>, String> {
    feedback.rating_for(message).map_err(|e| e.to_string())
}

pub fn set_feedback<S: KeyValueStore>(
    feedback: &FeedbackStore<S>,
    message: &Message,
    rating: Rating,
) -> Result<Rating, String> {
    feedback
        .rate_message(message, rating)
        .map_err(|e| e.to_string())?;
    Ok(rating)
}
