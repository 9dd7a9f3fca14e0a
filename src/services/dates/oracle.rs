use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{DateResolver, Resolution};
use crate::errors::AppError;
use crate::services::ai::LlmProvider;

static ISO_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

pub fn build_date_prompt(query: &str, today: NaiveDate) -> String {
    format!(
        "Today's date is {}. Extract and return the date from the following query in ISO 8601 format (YYYY-MM-DD). \
         Correct any spelling mistakes if present. If no valid date is found, respond with 'None'. \
         Only return the date, nothing else.\n\
         Query: {query}",
        today.format("%Y-%m-%d")
    )
}

/// Reads the date off the start of an oracle reply. Anything that does not
/// begin with a real `YYYY-MM-DD` date is rejected.
pub fn parse_oracle_date(reply: &str) -> Option<NaiveDate> {
    let reply = reply.trim();
    let found = ISO_PREFIX.find(reply)?;
    NaiveDate::parse_from_str(found.as_str(), "%Y-%m-%d").ok()
}

/// Last pipeline stage. Unlike the rule stages it never declines: a reply
/// without a date is a `DateParseFailure`.
pub struct LlmDateExtractor {
    llm: Arc<dyn LlmProvider>,
}

impl LlmDateExtractor {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl DateResolver for LlmDateExtractor {
    fn name(&self) -> &'static str {
        "oracle"
    }

    async fn attempt(&self, query: &str, today: NaiveDate) -> Result<Resolution, AppError> {
        let prompt = build_date_prompt(query, today);
        tracing::debug!(%prompt, "date extraction prompt");

        let reply = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| AppError::OracleUnavailable(e.to_string()))?;
        tracing::debug!(reply = %reply, "date extraction reply");

        match parse_oracle_date(&reply) {
            Some(date) => Ok(Resolution::Matched(date)),
            None => Err(AppError::DateParseFailure {
                query: query.to_string(),
            }),
        }
    }
}
