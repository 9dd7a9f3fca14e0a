pub mod appointments;
pub mod chat;
pub mod health;
pub mod sessions;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/chat", get(chat::chat))
        .route("/parse_date", get(chat::parse_date))
        .route("/book_appointment", post(appointments::book_appointment))
        .route("/appointments", get(appointments::list_appointments))
        .route("/api/sessions", post(sessions::create_session))
        .route(
            "/api/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/api/sessions/:id/messages", post(sessions::send_message))
        .route("/api/sessions/:id/contact", post(sessions::submit_contact))
        .route("/api/sessions/:id/reset", post(sessions::reset_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
