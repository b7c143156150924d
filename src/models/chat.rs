use serde::{ Serialize, Deserialize };

/// A stored chat turn. Message lists are append-only; ordering is insertion
/// order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    pub timestamp: i64,
}

/// Conversation list entry. The message list itself is stored under its own
/// key; `messages` tracks its length.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub date: String,
    pub messages: u64,
}
