use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::{DateResolver, Resolution};
use crate::errors::AppError;

pub const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

pub fn weekday_from_name(token: &str) -> Option<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, day)| *day)
}

/// Lowercased whitespace tokens with leading/trailing punctuation removed.
/// Inner punctuation is kept, so "monday's" stays distinct from "monday".
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Days from `today` to the next `target`, always in 1..=7.
pub fn days_until_next(today: NaiveDate, target: Weekday) -> i64 {
    let ahead = (target.num_days_from_monday() as i64 + 7
        - today.weekday().num_days_from_monday() as i64)
        % 7;
    if ahead == 0 {
        7
    } else {
        ahead
    }
}

/// Resolves "next <weekday>" where the weekday token directly follows a
/// "next" token. Several different weekdays in that position is ambiguous
/// and resolves to nothing.
pub fn resolve_next_weekday(query: &str, today: NaiveDate) -> Option<NaiveDate> {
    let tokens = tokenize(query);

    let mut target: Option<Weekday> = None;
    for pair in tokens.windows(2) {
        if pair[0] != "next" {
            continue;
        }
        if let Some(day) = weekday_from_name(&pair[1]) {
            match target {
                Some(existing) if existing != day => return None,
                _ => target = Some(day),
            }
        }
    }

    let target = target?;
    Some(today + Duration::days(days_until_next(today, target)))
}

pub struct RelativeWeekdayResolver;

#[async_trait]
impl DateResolver for RelativeWeekdayResolver {
    fn name(&self) -> &'static str {
        "relative_weekday"
    }

    async fn attempt(&self, query: &str, today: NaiveDate) -> Result<Resolution, AppError> {
        Ok(resolve_next_weekday(query, today).into())
    }
}
