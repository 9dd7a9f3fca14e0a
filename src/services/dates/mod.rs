//! Natural-language date resolution.
//!
//! A query is spell-corrected once, then offered to each resolver stage in
//! order: the "next <weekday>" rule, the structured parser, and finally the
//! oracle. The first stage that matches wins and later stages are never
//! called.

pub mod oracle;
pub mod spelling;
pub mod structured;
pub mod weekday;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::AppError;
use crate::services::ai::LlmProvider;

pub use oracle::LlmDateExtractor;
pub use spelling::SpellCorrector;
pub use structured::StructuredDateParser;
pub use weekday::RelativeWeekdayResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Matched(NaiveDate),
    /// The stage declines; the next one gets a turn.
    NoMatch,
}

impl From<Option<NaiveDate>> for Resolution {
    fn from(date: Option<NaiveDate>) -> Self {
        match date {
            Some(date) => Resolution::Matched(date),
            None => Resolution::NoMatch,
        }
    }
}

#[async_trait]
pub trait DateResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// `query` is already spell-corrected. Relative expressions are computed
    /// from `today`, never from the wall clock.
    async fn attempt(&self, query: &str, today: NaiveDate) -> Result<Resolution, AppError>;
}

pub struct DateResolutionPipeline {
    corrector: SpellCorrector,
    stages: Vec<Box<dyn DateResolver>>,
}

impl DateResolutionPipeline {
    pub fn new(corrector: SpellCorrector, stages: Vec<Box<dyn DateResolver>>) -> Self {
        Self { corrector, stages }
    }

    /// Weekday rule, structured parser, then the oracle.
    pub fn standard(llm: Arc<dyn LlmProvider>) -> Self {
        Self::new(
            SpellCorrector::default(),
            vec![
                Box::new(RelativeWeekdayResolver),
                Box::new(StructuredDateParser),
                Box::new(LlmDateExtractor::new(llm)),
            ],
        )
    }

    /// Resolves `query` to a date. Parse failures always carry the query as
    /// the user typed it, not the corrected text. Besides `DateParseFailure`,
    /// an unreachable oracle surfaces as `OracleUnavailable`.
    pub async fn resolve(&self, query: &str, today: NaiveDate) -> Result<NaiveDate, AppError> {
        let corrected = self.corrector.correct(query);
        if corrected != query.trim() {
            tracing::debug!(original = query, corrected = %corrected, "spell-corrected date query");
        }

        for stage in &self.stages {
            match stage.attempt(&corrected, today).await {
                Ok(Resolution::Matched(date)) => {
                    tracing::info!(stage = stage.name(), %date, "resolved date");
                    return Ok(date);
                }
                Ok(Resolution::NoMatch) => {
                    tracing::debug!(stage = stage.name(), "no match, falling through");
                }
                Err(AppError::DateParseFailure { .. }) => {
                    return Err(AppError::DateParseFailure {
                        query: query.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(stage = stage.name(), error = %e, "date resolution stage failed");
                    return Err(e);
                }
            }
        }

        Err(AppError::DateParseFailure {
            query: query.to_string(),
        })
    }
}
