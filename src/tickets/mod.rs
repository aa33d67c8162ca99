use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::shared::error::{ApiError, FieldError};
use crate::shared::models::{NewTicket, Ticket, TicketUpdate, VALID_PRIORITIES};
use crate::shared::state::AppState;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

pub fn validate_new_ticket(ticket: &NewTicket) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if ticket.name.trim().is_empty() {
        errors.push(field_error("name", "Name is required"));
    }
    if !EMAIL_RE.is_match(&ticket.email) {
        errors.push(field_error("email", "Invalid email address"));
    }
    if ticket.subject.chars().count() < 5 {
        errors.push(field_error(
            "subject",
            "Subject must be at least 5 characters",
        ));
    }
    if ticket.description.chars().count() < 10 {
        errors.push(field_error(
            "description",
            "Description must be at least 10 characters",
        ));
    }
    if ticket.category.trim().is_empty() {
        errors.push(field_error("category", "Category is required"));
    }
    if !VALID_PRIORITIES.contains(&ticket.priority.as_str()) {
        errors.push(field_error(
            "priority",
            "Priority must be low, medium, or high",
        ));
    }
    errors
}

/// Supplied fields must still satisfy the creation constraints; absent
/// fields are left alone.
pub fn validate_ticket_update(updates: &TicketUpdate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if updates.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        errors.push(field_error("name", "Name is required"));
    }
    if updates.email.as_deref().is_some_and(|e| !EMAIL_RE.is_match(e)) {
        errors.push(field_error("email", "Invalid email address"));
    }
    if updates
        .subject
        .as_deref()
        .is_some_and(|s| s.chars().count() < 5)
    {
        errors.push(field_error(
            "subject",
            "Subject must be at least 5 characters",
        ));
    }
    if updates
        .description
        .as_deref()
        .is_some_and(|d| d.chars().count() < 10)
    {
        errors.push(field_error(
            "description",
            "Description must be at least 10 characters",
        ));
    }
    if updates
        .category
        .as_deref()
        .is_some_and(|c| c.trim().is_empty())
    {
        errors.push(field_error("category", "Category is required"));
    }
    if updates
        .priority
        .as_deref()
        .is_some_and(|p| !VALID_PRIORITIES.contains(&p))
    {
        errors.push(field_error(
            "priority",
            "Priority must be low, medium, or high",
        ));
    }
    errors
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewTicket>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let errors = validate_new_ticket(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let ticket = state.storage.create_ticket(req).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets = state.storage.get_tickets(query.limit).await?;
    Ok(Json(tickets))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = state
        .storage
        .get_ticket(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;
    Ok(Json(ticket))
}

pub async fn get_ticket_by_number(
    State(state): State<Arc<AppState>>,
    Path(ticket_number): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = state
        .storage
        .get_ticket_by_number(&ticket_number)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;
    Ok(Json(ticket))
}

pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<TicketUpdate>,
) -> Result<Json<Ticket>, ApiError> {
    let errors = validate_ticket_update(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let ticket = state
        .storage
        .update_ticket(id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;
    Ok(Json(ticket))
}

pub fn configure_tickets_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tickets", get(list_tickets).post(create_ticket))
        .route(
            "/api/tickets/number/:ticket_number",
            get(get_ticket_by_number),
        )
        .route("/api/tickets/:id", get(get_ticket).put(update_ticket))
}
