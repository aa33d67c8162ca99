pub mod mem;
pub mod sqlite;

use async_trait::async_trait;
use rand::Rng;
use uuid::Uuid;

use crate::shared::models::{ChatMessage, NewChatMessage, NewTicket, Ticket, TicketUpdate};

pub use mem::MemStorage;
pub use sqlite::SqliteStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
    #[error("ticket number space exhausted")]
    TicketNumbers,
}

/// Persistence contract for tickets and chat transcripts. The triage
/// pipeline never distinguishes the in-memory and SQLite implementations.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persists a validated draft, assigning id, a unique `HD-####` ticket
    /// number, status "open" and both timestamps.
    async fn create_ticket(&self, new: NewTicket) -> Result<Ticket, StorageError>;

    /// Tickets newest-created first, optionally truncated.
    async fn get_tickets(&self, limit: Option<usize>) -> Result<Vec<Ticket>, StorageError>;

    async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, StorageError>;

    async fn get_ticket_by_number(
        &self,
        ticket_number: &str,
    ) -> Result<Option<Ticket>, StorageError>;

    /// Merges the supplied fields and refreshes `updated_at`. Unknown id
    /// yields `None`, never an error.
    async fn update_ticket(
        &self,
        id: Uuid,
        updates: TicketUpdate,
    ) -> Result<Option<Ticket>, StorageError>;

    async fn create_chat_message(
        &self,
        new: NewChatMessage,
    ) -> Result<ChatMessage, StorageError>;

    /// Session transcript ascending by creation time.
    async fn get_chat_messages_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, StorageError>;
}

// The 4-digit space holds 10 000 numbers; a bounded number of draws keeps
// collisions out without risking an unbounded loop near exhaustion.
pub(crate) const TICKET_NUMBER_ATTEMPTS: usize = 50;

pub(crate) fn random_ticket_number() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("HD-{n:04}")
}

#[cfg(test)]
mod tests {
    use super::random_ticket_number;

    #[test]
    fn ticket_numbers_are_zero_padded() {
        for _ in 0..200 {
            let number = random_ticket_number();
            assert_eq!(number.len(), 7);
            assert!(number.starts_with("HD-"));
            assert!(number[3..].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
