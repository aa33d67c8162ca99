use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::shared::error::ApiError;
use crate::shared::models::{ChatMessage, NewChatMessage, Sender, TicketDraft};
use crate::shared::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

/// Both persisted turns plus the triage outcome, so the widget can offer
/// the pre-filled ticket form when a draft is proposed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEnvelope {
    pub user_message: ChatMessage,
    pub bot_message: ChatMessage,
    pub create_ticket: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_data: Option<TicketDraft>,
}

pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatEnvelope>, ApiError> {
    if req.session_id.trim().is_empty() || req.message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Session ID and message are required".to_string(),
        ));
    }

    let user_message = state
        .storage
        .create_chat_message(NewChatMessage {
            session_id: req.session_id.clone(),
            sender: Sender::User,
            message: req.message.clone(),
        })
        .await?;

    let response = state
        .chatbot
        .process_message(&req.message, &req.session_id)
        .await;

    let bot_message = state
        .storage
        .create_chat_message(NewChatMessage {
            session_id: req.session_id,
            sender: Sender::Agent,
            message: response.message.clone(),
        })
        .await?;

    Ok(Json(ChatEnvelope {
        user_message,
        bot_message,
        create_ticket: response.create_ticket,
        ticket_data: response.ticket_data,
    }))
}

pub async fn get_session_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = state
        .storage
        .get_chat_messages_by_session(&session_id)
        .await?;
    Ok(Json(messages))
}

pub fn configure_chat_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/chat", post(post_chat))
        .route("/api/chat/:session_id", get(get_session_messages))
}
