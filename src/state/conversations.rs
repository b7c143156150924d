use chrono::Utc;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::chat::{ ChatMessage, Conversation };
use crate::state::{ messages_key, CONVERSATIONS_KEY };
use crate::storage::KvStore;

/// Conversation list mirrored to storage on every change and rehydrated at
/// startup. Message lists are read through storage per conversation, the way
/// the original loads them when a conversation is selected.
pub struct ConversationStore {
    kv: Arc<dyn KvStore>,
    conversations: RwLock<Vec<Conversation>>,
}

impl ConversationStore {
    pub async fn load(kv: Arc<dyn KvStore>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let conversations = match kv.get(CONVERSATIONS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        Ok(Self {
            kv,
            conversations: RwLock::new(conversations),
        })
    }

    pub async fn list(&self) -> Vec<Conversation> {
        self.conversations.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Conversation> {
        self.conversations.read().await
            .iter()
            .find(|conversation| conversation.id == id)
            .cloned()
    }

    /// Creates a conversation with a zero message count and prepends it, so
    /// the list stays newest-first.
    pub async fn create(&self, title: &str) -> Result<Conversation, Box<dyn Error + Send + Sync>> {
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            date: Utc::now().to_rfc3339(),
            messages: 0,
        };

        let mut conversations = self.conversations.write().await;
        conversations.insert(0, conversation.clone());
        self.persist(&conversations).await?;
        Ok(conversation)
    }

    pub async fn messages(
        &self,
        id: &str
    ) -> Result<Vec<ChatMessage>, Box<dyn Error + Send + Sync>> {
        match self.kv.get(&messages_key(id)).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Appends one message to the conversation's stored list and syncs the
    /// list entry's count field with the new length.
    pub async fn append_message(
        &self,
        id: &str,
        role: &str,
        content: &str
    ) -> Result<(ChatMessage, u64), Box<dyn Error + Send + Sync>> {
        let message = ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now().timestamp(),
        };

        let mut messages = self.messages(id).await?;
        messages.push(message.clone());
        let raw = serde_json::to_string(&messages)?;
        self.kv.set(&messages_key(id), &raw).await?;
        let count = messages.len() as u64;

        let mut conversations = self.conversations.write().await;
        if let Some(entry) = conversations.iter_mut().find(|c| c.id == id) {
            entry.messages = count;
        }
        self.persist(&conversations).await?;

        Ok((message, count))
    }

    /// Drops the in-memory mirror after the backing store has been cleared.
    /// Does not persist: the cleared store must stay empty of keys.
    pub async fn forget(&self) {
        self.conversations.write().await.clear();
    }

    async fn persist(
        &self,
        conversations: &[Conversation]
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let raw = serde_json::to_string(conversations)?;
        self.kv.set(CONVERSATIONS_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryKvStore;

    async fn new_store() -> ConversationStore {
        ConversationStore::load(Arc::new(MemoryKvStore::new())).await.unwrap()
    }

    #[tokio::test]
    async fn create_prepends_newest_first() {
        let store = new_store().await;
        store.create("first question").await.unwrap();
        let newest = store.create("second question").await.unwrap();

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newest.id);
        assert_eq!(listed[0].messages, 0);
    }

    #[tokio::test]
    async fn appending_n_messages_yields_count_n() {
        let store = new_store().await;
        let conversation = store.create("billing").await.unwrap();

        for i in 0..5 {
            store
                .append_message(&conversation.id, "user", &format!("message {}", i)).await
                .unwrap();
        }

        let messages = store.messages(&conversation.id).await.unwrap();
        assert_eq!(messages.len(), 5);
        let entry = store.get(&conversation.id).await.unwrap();
        assert_eq!(entry.messages, 5);
    }

    #[tokio::test]
    async fn messages_keep_insertion_order() {
        let store = new_store().await;
        let conversation = store.create("order").await.unwrap();
        store.append_message(&conversation.id, "user", "hello").await.unwrap();
        store.append_message(&conversation.id, "assistant", "hi, how can I help?").await.unwrap();

        let messages = store.messages(&conversation.id).await.unwrap();
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, "assistant");
    }

    #[tokio::test]
    async fn rehydrates_from_populated_backend() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        {
            let store = ConversationStore::load(kv.clone()).await.unwrap();
            let conversation = store.create("persisted").await.unwrap();
            store.append_message(&conversation.id, "user", "hello").await.unwrap();
        }

        let reloaded = ConversationStore::load(kv).await.unwrap();
        let listed = reloaded.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "persisted");
        assert_eq!(listed[0].messages, 1);
        let messages = reloaded.messages(&listed[0].id).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn unknown_conversation_has_no_messages() {
        let store = new_store().await;
        assert!(store.messages("nope").await.unwrap().is_empty());
        assert!(store.get("nope").await.is_none());
    }
}
