use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::{Appointment, ContactForm, ConversationState, Intent, Session};
use crate::services::{booking, conversation};
use crate::state::AppState;

fn find_session(state: &AppState, id: &str) -> Result<Arc<Mutex<Session>>, AppError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))
}

#[derive(Serialize)]
pub struct CreatedSession {
    pub session_id: String,
}

// POST /api/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CreatedSession>) {
    let session_id = state.sessions.create();
    tracing::info!(session = %session_id, "session created");
    (StatusCode::CREATED, Json(CreatedSession { session_id }))
}

// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let session = find_session(&state, &id)?;
    let snapshot = session.lock().await.clone();
    Ok(Json(snapshot))
}

#[derive(Deserialize)]
pub struct IncomingMessage {
    pub message: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub intent: Option<Intent>,
    pub reply: String,
    pub state: ConversationState,
}

// POST /api/sessions/:id/messages
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<IncomingMessage>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::InvalidInput("message must not be empty".to_string()));
    }

    let session = find_session(&state, &id)?;
    let mut session = session.lock().await;
    let outcome = conversation::process_message(&state, &mut session, message).await;

    Ok(Json(MessageResponse {
        intent: outcome.intent,
        reply: outcome.reply,
        state: session.state.clone(),
    }))
}

#[derive(Serialize)]
pub struct ContactResponse {
    pub appointment: Appointment,
    pub reply: String,
}

// POST /api/sessions/:id/contact
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ContactResponse>, AppError> {
    let session = find_session(&state, &id)?;
    let mut session = session.lock().await;
    let appointment = booking::submit_contact(&state, &mut session, &form)?;

    Ok(Json(ContactResponse {
        reply: booking::confirmation_message(&appointment),
        appointment,
    }))
}

// POST /api/sessions/:id/reset
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let session = find_session(&state, &id)?;
    let mut session = session.lock().await;
    session.reset();
    tracing::info!(session = %id, "session reset");
    Ok(Json(session.clone()))
}

// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(&id) {
        return Err(AppError::NotFound(format!("session {id}")));
    }
    tracing::info!(session = %id, "session deleted");
    Ok(StatusCode::NO_CONTENT)
}
