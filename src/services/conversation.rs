use serde::Serialize;

use crate::models::{ConversationState, Intent, Session, Stage};
use crate::services::ai::intent::classify_intent;
use crate::services::booking;
use crate::state::AppState;

const DOCUMENT_ERROR_REPLY: &str =
    "Sorry, I couldn't look that up in the documents right now. Please try again.";
const GENERAL_CHAT_ERROR_REPLY: &str =
    "Sorry, I'm having trouble answering right now. Please try again.";

#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Only set when the turn went through intent classification.
    pub intent: Option<Intent>,
    pub reply: String,
}

async fn general_chat(state: &AppState, query: &str) -> String {
    let prompt = format!("You are a helpful assistant. Answer the following question concisely:\n{query}");
    match state.llm.complete(&prompt).await {
        Ok(answer) => answer.trim().to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "general chat failed");
            GENERAL_CHAT_ERROR_REPLY.to_string()
        }
    }
}

/// Classifies `query` once and dispatches to exactly one handling path.
/// Always produces a reply; downstream failures become an apology.
pub async fn classify_and_route(
    state: &AppState,
    query: &str,
    conv: &mut ConversationState,
) -> (Intent, String) {
    let intent = classify_intent(state.llm.as_ref(), query, &state.config.document_topics).await;
    tracing::info!(intent = intent.as_str(), "routing query");

    let reply = match intent {
        Intent::DocumentQuery => match state.documents.query_document(query).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "document query failed");
                DOCUMENT_ERROR_REPLY.to_string()
            }
        },
        Intent::AppointmentBooking => booking::start_booking(conv),
        Intent::GeneralChat => general_chat(state, query).await,
    };

    (intent, reply)
}

/// Runs one user turn against `session`: the user's text and exactly one bot
/// reply are appended to the transcript.
pub async fn process_message(state: &AppState, session: &mut Session, message: &str) -> TurnOutcome {
    session.push_user(message);

    tracing::info!(
        session = %session.id,
        stage = session.state.stage().as_str(),
        "processing message"
    );

    let outcome = match session.state.stage() {
        Stage::Idle => {
            let (intent, reply) = classify_and_route(state, message, &mut session.state).await;
            TurnOutcome {
                intent: Some(intent),
                reply,
            }
        }
        Stage::AwaitingDate => TurnOutcome {
            intent: None,
            reply: booking::handle_date_reply(state, &mut session.state, message).await,
        },
        Stage::AwaitingContact => {
            let date = session
                .state
                .pending_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            TurnOutcome {
                intent: None,
                reply: format!(
                    "Please submit your name, email and phone to confirm the appointment for {date}."
                ),
            }
        }
    };

    session.state.record_input(message);
    session.push_bot(&outcome.reply);
    outcome
}
