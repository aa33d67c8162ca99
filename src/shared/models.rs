use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three accepted ticket priorities, lowest to highest.
pub const VALID_PRIORITIES: [&str; 3] = ["low", "medium", "high"];

pub const STATUS_OPEN: &str = "open";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("sender must be \"user\" or \"agent\", got {0:?}")]
pub struct ParseSenderError(String);

impl std::str::FromStr for Sender {
    type Err = ParseSenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "agent" => Ok(Sender::Agent),
            other => Err(ParseSenderError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: String,
    pub sender: Sender,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub session_id: String,
    pub sender: Sender,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub ticket_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert shape for tickets. Status, number and timestamps are assigned by
/// the store; callers cannot supply them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: String,
}

/// Partial update for a ticket. Missing fields are left untouched;
/// `updated_at` is refreshed on every update regardless.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

/// Candidate ticket fields proposed by triage, pending human confirmation
/// through the ticket form. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDraft {
    pub subject: String,
    pub category: String,
    pub priority: String,
    pub description: String,
}

/// What the triage pipeline hands back to the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotResponse {
    pub message: String,
    pub create_ticket: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_data: Option<TicketDraft>,
}

impl ChatbotResponse {
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            create_ticket: false,
            ticket_data: None,
        }
    }
}
