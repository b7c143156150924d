use chrono::{ Duration, Utc };
use log::info;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::ticket::{ Ticket, TicketStatus };
use crate::state::TICKETS_KEY;
use crate::storage::KvStore;

/// Demo ticket set, seeded on first run and restored by reset.
static EXAMPLE_TICKETS: Lazy<Vec<Ticket>> = Lazy::new(|| {
    vec![
        Ticket {
            id: "ticket-001".to_string(),
            title: "Cannot sign in to account".to_string(),
            customer: "Marie Dupont".to_string(),
            status: TicketStatus::Open,
            created_at: (Utc::now() - Duration::hours(1)).to_rfc3339(),
        },
        Ticket {
            id: "ticket-002".to_string(),
            title: "Refund request".to_string(),
            customer: "Jean Martin".to_string(),
            status: TicketStatus::Open,
            created_at: (Utc::now() - Duration::hours(2)).to_rfc3339(),
        }
    ]
});

#[derive(Debug, Default, Serialize)]
pub struct TicketCounts {
    pub open: usize,
    pub pending: usize,
    pub resolved: usize,
}

#[derive(Debug)]
pub enum AdvanceOutcome {
    Advanced(Ticket),
    AlreadyResolved,
    NotFound,
}

/// Ticket list mirrored to storage on every change. A missing tickets key
/// means first run, which seeds the example set.
pub struct TicketStore {
    kv: Arc<dyn KvStore>,
    tickets: RwLock<Vec<Ticket>>,
}

impl TicketStore {
    pub async fn load(kv: Arc<dyn KvStore>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let tickets = match kv.get(TICKETS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => {
                let seed = EXAMPLE_TICKETS.clone();
                let raw = serde_json::to_string(&seed)?;
                kv.set(TICKETS_KEY, &raw).await?;
                info!("Seeded {} example tickets", seed.len());
                seed
            }
        };
        Ok(Self {
            kv,
            tickets: RwLock::new(tickets),
        })
    }

    pub async fn list(&self) -> Vec<Ticket> {
        self.tickets.read().await.clone()
    }

    pub async fn counts(&self) -> TicketCounts {
        let tickets = self.tickets.read().await;
        let mut counts = TicketCounts::default();
        for ticket in tickets.iter() {
            match ticket.status {
                TicketStatus::Open => {
                    counts.open += 1;
                }
                TicketStatus::Pending => {
                    counts.pending += 1;
                }
                TicketStatus::Resolved => {
                    counts.resolved += 1;
                }
            }
        }
        counts
    }

    pub async fn create(
        &self,
        title: &str,
        customer: &str
    ) -> Result<Ticket, Box<dyn Error + Send + Sync>> {
        let ticket = Ticket {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            customer: customer.to_string(),
            status: TicketStatus::Open,
            created_at: Utc::now().to_rfc3339(),
        };

        let mut tickets = self.tickets.write().await;
        tickets.insert(0, ticket.clone());
        self.persist(&tickets).await?;
        Ok(ticket)
    }

    /// Moves the ticket one step along open -> pending -> resolved.
    pub async fn advance(
        &self,
        id: &str
    ) -> Result<AdvanceOutcome, Box<dyn Error + Send + Sync>> {
        let mut tickets = self.tickets.write().await;
        let Some(ticket) = tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(AdvanceOutcome::NotFound);
        };

        match ticket.status.next() {
            Some(next) => {
                ticket.status = next;
                let updated = ticket.clone();
                self.persist(&tickets).await?;
                info!("Ticket {} advanced to {}", id, next);
                Ok(AdvanceOutcome::Advanced(updated))
            }
            None => Ok(AdvanceOutcome::AlreadyResolved),
        }
    }

    /// Restores the example ticket set, persisting it over whatever is there.
    pub async fn reseed(&self) -> Result<Vec<Ticket>, Box<dyn Error + Send + Sync>> {
        let seed = EXAMPLE_TICKETS.clone();
        let mut tickets = self.tickets.write().await;
        *tickets = seed.clone();
        self.persist(&tickets).await?;
        info!("Reseeded {} example tickets", seed.len());
        Ok(seed)
    }

    /// Drops the in-memory mirror after the backing store has been cleared.
    pub async fn forget(&self) {
        self.tickets.write().await.clear();
    }

    async fn persist(&self, tickets: &[Ticket]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let raw = serde_json::to_string(tickets)?;
        self.kv.set(TICKETS_KEY, &raw).await
    }
}
