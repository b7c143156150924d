use serde::{ Serialize, Deserialize };
use std::fmt;

/// Lifecycle of a support ticket. Transitions only move forward through
/// [`TicketStatus::next`]; there is no path back from a later state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
}

impl TicketStatus {
    /// The next state in the open -> pending -> resolved chain, or `None`
    /// once the ticket is resolved.
    pub fn next(self) -> Option<TicketStatus> {
        match self {
            TicketStatus::Open => Some(TicketStatus::Pending),
            TicketStatus::Pending => Some(TicketStatus::Resolved),
            TicketStatus::Resolved => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Resolved => "resolved",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub customer: String,
    pub status: TicketStatus,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_advances_forward_only() {
        assert_eq!(TicketStatus::Open.next(), Some(TicketStatus::Pending));
        assert_eq!(TicketStatus::Pending.next(), Some(TicketStatus::Resolved));
        assert_eq!(TicketStatus::Resolved.next(), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&TicketStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let parsed: TicketStatus = serde_json::from_str("\"resolved\"").unwrap();
        assert_eq!(parsed, TicketStatus::Resolved);
    }
}
