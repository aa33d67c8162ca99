use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::shared::models::{
    ChatMessage, NewChatMessage, NewTicket, Sender, Ticket, TicketUpdate, STATUS_OPEN,
};

use super::mem::apply_updates;
use super::{random_ticket_number, Storage, StorageError, TICKET_NUMBER_ATTEMPTS};

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tickets (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    subject TEXT NOT NULL,
    description TEXT NOT NULL,
    category TEXT NOT NULL,
    priority TEXT NOT NULL,
    status TEXT NOT NULL,
    ticket_number TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS chat_messages (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    sender TEXT NOT NULL,
    message TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_chat_messages_session
    ON chat_messages(session_id);
";

/// Embedded SQLite storage. One connection behind a mutex; the helpdesk is
/// a single-process service and every query here is short.
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(SCHEMA)?;
        info!("ticket database ready at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Private scratch database, handy in tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn row_to_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    let id: String = row.get("id")?;
    Ok(Ticket {
        id: Uuid::parse_str(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        name: row.get("name")?,
        email: row.get("email")?,
        subject: row.get("subject")?,
        description: row.get("description")?,
        category: row.get("category")?,
        priority: row.get("priority")?,
        status: row.get("status")?,
        ticket_number: row.get("ticket_number")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn row_to_chat_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    let id: String = row.get("id")?;
    let sender: String = row.get("sender")?;
    Ok(ChatMessage {
        id: Uuid::parse_str(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        session_id: row.get("session_id")?,
        sender: sender.parse::<Sender>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        message: row.get("message")?,
        created_at: row.get("created_at")?,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_ticket(&self, new: NewTicket) -> Result<Ticket, StorageError> {
        let conn = self.conn.lock().await;

        let mut ticket_number = None;
        for _ in 0..TICKET_NUMBER_ATTEMPTS {
            let candidate = random_ticket_number();
            let taken: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM tickets WHERE ticket_number = ?1)",
                params![candidate],
                |row| row.get(0),
            )?;
            if !taken {
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
        conn.execute(
            "INSERT INTO tickets (id, name, email, subject, description, category, priority, \
             status, ticket_number, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                ticket.id.to_string(),
                ticket.name,
                ticket.email,
                ticket.subject,
                ticket.description,
                ticket.category,
                ticket.priority,
                ticket.status,
                ticket.ticket_number,
                ticket.created_at,
                ticket.updated_at,
            ],
        )?;
        Ok(ticket)
    }

    async fn get_tickets(&self, limit: Option<usize>) -> Result<Vec<Ticket>, StorageError> {
        let conn = self.conn.lock().await;
        // Negative LIMIT means unbounded in SQLite.
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let mut stmt = conn.prepare(
            "SELECT id, name, email, subject, description, category, priority, status, \
             ticket_number, created_at, updated_at \
             FROM tickets ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], row_to_ticket)?;
        let mut tickets = Vec::new();
        for row in rows {
            tickets.push(row?);
        }
        Ok(tickets)
    }

    async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, StorageError> {
        let conn = self.conn.lock().await;
        let ticket = conn
            .query_row(
                "SELECT id, name, email, subject, description, category, priority, status, \
                 ticket_number, created_at, updated_at FROM tickets WHERE id = ?1",
                params![id.to_string()],
                row_to_ticket,
            )
            .optional()?;
        Ok(ticket)
    }

    async fn get_ticket_by_number(
        &self,
        ticket_number: &str,
    ) -> Result<Option<Ticket>, StorageError> {
        let conn = self.conn.lock().await;
        let ticket = conn
            .query_row(
                "SELECT id, name, email, subject, description, category, priority, status, \
                 ticket_number, created_at, updated_at FROM tickets WHERE ticket_number = ?1",
                params![ticket_number],
                row_to_ticket,
            )
            .optional()?;
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        id: Uuid,
        updates: TicketUpdate,
    ) -> Result<Option<Ticket>, StorageError> {
        let conn = self.conn.lock().await;
        let existing = conn
            .query_row(
                "SELECT id, name, email, subject, description, category, priority, status, \
                 ticket_number, created_at, updated_at FROM tickets WHERE id = ?1",
                params![id.to_string()],
                row_to_ticket,
            )
            .optional()?;
        let Some(mut ticket) = existing else {
            return Ok(None);
        };
        apply_updates(&mut ticket, updates);
        conn.execute(
            "UPDATE tickets SET name = ?1, email = ?2, subject = ?3, description = ?4, \
             category = ?5, priority = ?6, status = ?7, updated_at = ?8 WHERE id = ?9",
            params![
                ticket.name,
                ticket.email,
                ticket.subject,
                ticket.description,
                ticket.category,
                ticket.priority,
                ticket.status,
                ticket.updated_at,
                ticket.id.to_string(),
            ],
        )?;
        Ok(Some(ticket))
    }

    async fn create_chat_message(
        &self,
        new: NewChatMessage,
    ) -> Result<ChatMessage, StorageError> {
        let conn = self.conn.lock().await;
        let message = ChatMessage {
            id: Uuid::new_v4(),
            session_id: new.session_id,
            sender: new.sender,
            message: new.message,
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO chat_messages (id, session_id, sender, message, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                message.id.to_string(),
                message.session_id,
                message.sender.as_str(),
                message.message,
                message.created_at,
            ],
        )?;
        Ok(message)
    }

    async fn get_chat_messages_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, session_id, sender, message, created_at FROM chat_messages \
             WHERE session_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![session_id], row_to_chat_message)?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}
