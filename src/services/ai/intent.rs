use crate::models::Intent;
use crate::services::ai::LlmProvider;

pub fn build_intent_prompt(query: &str, document_topics: &str) -> String {
    format!(
        "Classify the following query into one of these intents:\n\
         1. document_query (if the query is about {document_topics})\n\
         2. appointment_booking (if the query is about scheduling or calling booking an appointment)\n\
         3. general_chat (if the query is casual conversation or doesn't fit the above)\n\n\
         Query: {query}\n\
         Intent:"
    )
}

/// Buckets `query` with one oracle call. Never fails: an unusable reply or a
/// failed call both come back as `GeneralChat`.
pub async fn classify_intent(llm: &dyn LlmProvider, query: &str, document_topics: &str) -> Intent {
    let prompt = build_intent_prompt(query, document_topics);
    tracing::debug!(%prompt, "intent prompt");

    match llm.complete(&prompt).await {
        Ok(reply) => {
            tracing::debug!(reply = %reply, "intent oracle reply");
            Intent::from_oracle_reply(&reply)
        }
        Err(e) => {
            tracing::warn!(error = %e, "intent classification failed, defaulting to general_chat");
            Intent::GeneralChat
        }
    }
}
