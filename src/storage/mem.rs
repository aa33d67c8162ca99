use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::shared::models::{
    ChatMessage, NewChatMessage, NewTicket, Ticket, TicketUpdate, STATUS_OPEN,
};

use super::{random_ticket_number, Storage, StorageError, TICKET_NUMBER_ATTEMPTS};

/// In-memory storage. Vectors keep insertion order so transcript replay is
/// stable even when two messages share a timestamp.
#[derive(Default)]
pub struct MemStorage {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tickets: Vec<Ticket>,
    messages: Vec<ChatMessage>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn create_ticket(&self, new: NewTicket) -> Result<Ticket, StorageError> {
        let mut inner = self.inner.lock().await;

        let mut ticket_number = None;
        for _ in 0..TICKET_NUMBER_ATTEMPTS {
            let candidate = random_ticket_number();
            if !inner.tickets.iter().any(|t| t.ticket_number == candidate) {
                ticket_number = Some(candidate);
                break;
            }
        }
        let ticket_number = ticket_number.ok_or(StorageError::TicketNumbers)?;

        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            subject: new.subject,
            description: new.description,
            category: new.category,
            priority: new.priority,
            status: STATUS_OPEN.to_string(),
            ticket_number,
            created_at: now,
            updated_at: now,
        };
        inner.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn get_tickets(&self, limit: Option<usize>) -> Result<Vec<Ticket>, StorageError> {
        let inner = self.inner.lock().await;
        // Reverse first so equal timestamps list latest-inserted first after
        // the stable sort.
        let mut tickets: Vec<Ticket> = inner.tickets.iter().rev().cloned().collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            tickets.truncate(limit);
        }
        Ok(tickets)
    }

    async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner.tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn get_ticket_by_number(
        &self,
        ticket_number: &str,
    ) -> Result<Option<Ticket>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .iter()
            .find(|t| t.ticket_number == ticket_number)
            .cloned())
    }

    async fn update_ticket(
        &self,
        id: Uuid,
        updates: TicketUpdate,
    ) -> Result<Option<Ticket>, StorageError> {
        let mut inner = self.inner.lock().await;
        let Some(ticket) = inner.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        apply_updates(ticket, updates);
        Ok(Some(ticket.clone()))
    }

    async fn create_chat_message(
        &self,
        new: NewChatMessage,
    ) -> Result<ChatMessage, StorageError> {
        let mut inner = self.inner.lock().await;
        let message = ChatMessage {
            id: Uuid::new_v4(),
            session_id: new.session_id,
            sender: new.sender,
            message: new.message,
            created_at: Utc::now(),
        };
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn get_chat_messages_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, StorageError> {
        let inner = self.inner.lock().await;
        let mut messages: Vec<ChatMessage> = inner
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }
}

pub(crate) fn apply_updates(ticket: &mut Ticket, updates: TicketUpdate) {
    if let Some(name) = updates.name {
        ticket.name = name;
    }
    if let Some(email) = updates.email {
        ticket.email = email;
    }
    if let Some(subject) = updates.subject {
        ticket.subject = subject;
    }
    if let Some(description) = updates.description {
        ticket.description = description;
    }
    if let Some(category) = updates.category {
        ticket.category = category;
    }
    if let Some(priority) = updates.priority {
        ticket.priority = priority;
    }
    if let Some(status) = updates.status {
        ticket.status = status;
    }
    ticket.updated_at = Utc::now();
}
