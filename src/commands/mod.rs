//! The surface the presentational layer talks to: a chat session exposing
//! `{messages, loading}` plus submit/stop/retry, and the feedback buttons.

pub mod chat;
pub mod feedback;

pub use chat::ChatSession;
