pub mod conversations;
pub mod tickets;

use chrono::Utc;
use serde::Serialize;

use crate::models::chat::Conversation;
use crate::models::ticket::Ticket;
use conversations::ConversationStore;
use tickets::TicketStore;

/// Storage keys, kept identical to the browser local-storage keys of the
/// original application.
pub const CONVERSATIONS_KEY: &str = "chat_conversations";
pub const TICKETS_KEY: &str = "crm_tickets";

pub fn messages_key(conversation_id: &str) -> String {
    format!("chat_{}", conversation_id)
}

/// Point-in-time dump of the conversations and tickets collections.
#[derive(Debug, Serialize)]
pub struct ExportSnapshot {
    pub conversations: Vec<Conversation>,
    pub tickets: Vec<Ticket>,
    pub export_date: String,
}

pub async fn export_snapshot(
    conversations: &ConversationStore,
    tickets: &TicketStore
) -> ExportSnapshot {
    ExportSnapshot {
        conversations: conversations.list().await,
        tickets: tickets.list().await,
        export_date: Utc::now().to_rfc3339(),
    }
}
