use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{ConversationState, Intent};
use crate::services::conversation;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct QueryParams {
    pub query: String,
}

impl QueryParams {
    fn non_empty(&self) -> Result<&str, AppError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("query must not be empty".to_string()));
        }
        Ok(query)
    }
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub intent: Intent,
    pub response: String,
}

// GET /chat?query=
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<ChatResponse>, AppError> {
    let query = params.non_empty()?;

    // Stateless: booking progress is only tracked by the session endpoints.
    let mut conv = ConversationState::default();
    let (intent, response) = conversation::classify_and_route(&state, query, &mut conv).await;

    Ok(Json(ChatResponse { intent, response }))
}

#[derive(Serialize)]
pub struct ParsedDateResponse {
    pub parsed_date: NaiveDate,
}

// GET /parse_date?query=
pub async fn parse_date(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<ParsedDateResponse>, AppError> {
    let query = params.non_empty()?;
    let parsed_date = state.dates.resolve(query, state.today()).await?;
    Ok(Json(ParsedDateResponse { parsed_date }))
}
