//! Rule-based natural-language date parsing.
//!
//! Expressions are searched for anywhere in the query. Relative phrases are
//! computed from the caller's `today`, and an expression that could mean a
//! past or a future day (a bare weekday, a month and day without a year)
//! resolves to the future one.

use async_trait::async_trait;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use super::weekday::days_until_next;
use super::{DateResolver, Resolution};
use crate::errors::AppError;

const COUNT: &str = r"(\d{1,3}|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";
const UNIT: &str = r"(day|week|month|year)s?";
const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
const WEEKDAY: &str = r"(mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday)?|thu(?:r(?:s(?:day)?)?)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?)";

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").unwrap());
static US_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());
static DAY_AFTER_TOMORROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bday after tomorrow\b").unwrap());
static AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b{COUNT}\s+{UNIT}\s+ago\b")).unwrap());
static IN_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\bin\s+{COUNT}\s+{UNIT}\b")).unwrap());
static FROM_NOW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b{COUNT}\s+{UNIT}\s+(?:from\s+(?:now|today)|later)\b")).unwrap()
});
static NEXT_PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:next|this\s+coming|coming)\s+(week|month|year)\b").unwrap());
static TOMORROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btomorrow\b").unwrap());
static YESTERDAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\byesterday\b").unwrap());
static TODAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:today|tonight|now)\b").unwrap());
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b{MONTH}\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .unwrap()
});
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTH}\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .unwrap()
});
static LAST_WEEKDAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\blast\s+{WEEKDAY}\b")).unwrap());
static WEEKDAY_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?:(next|this\s+coming|this|coming|on)\s+)?{WEEKDAY}\b")).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Unit::Day),
            "week" => Some(Unit::Week),
            "month" => Some(Unit::Month),
            "year" => Some(Unit::Year),
            _ => None,
        }
    }
}

fn parse_count(s: &str) -> Option<u32> {
    let n = match s {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        digits => digits.parse().ok()?,
    };
    Some(n)
}

fn parse_month(s: &str) -> Option<u32> {
    let month = match s.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    let day = match s.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// Moves `count` units forwards or backwards. Month and year steps clamp to
/// the last day of the target month.
fn shift(today: NaiveDate, count: u32, unit: Unit, forward: bool) -> Option<NaiveDate> {
    match unit {
        Unit::Day | Unit::Week => {
            let days = if unit == Unit::Week { count as i64 * 7 } else { count as i64 };
            let delta = Duration::days(days);
            if forward {
                today.checked_add_signed(delta)
            } else {
                today.checked_sub_signed(delta)
            }
        }
        Unit::Month | Unit::Year => {
            let months = if unit == Unit::Year { count.checked_mul(12)? } else { count };
            if forward {
                today.checked_add_months(Months::new(months))
            } else {
                today.checked_sub_months(Months::new(months))
            }
        }
    }
}

fn count_and_unit(caps: &regex::Captures<'_>) -> Option<(u32, Unit)> {
    Some((parse_count(&caps[1])?, Unit::parse(&caps[2])?))
}

/// A month/day with an optional year; without a year the next occurrence
/// on or after `today` wins.
fn month_day(today: NaiveDate, month: u32, day: u32, year: Option<i32>) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn explicit_numeric(query: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(query) {
        if let Some(date) = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        ) {
            return Some(date);
        }
    }
    if let Some(caps) = US_DATE.captures(query) {
        if let Some(date) = NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
        ) {
            return Some(date);
        }
    }
    None
}

fn relative(query: &str, today: NaiveDate) -> Option<NaiveDate> {
    if DAY_AFTER_TOMORROW.is_match(query) {
        return today.checked_add_signed(Duration::days(2));
    }
    if let Some(caps) = AGO.captures(query) {
        let (count, unit) = count_and_unit(&caps)?;
        return shift(today, count, unit, false);
    }
    if let Some(caps) = IN_COUNT.captures(query).or_else(|| FROM_NOW.captures(query)) {
        let (count, unit) = count_and_unit(&caps)?;
        return shift(today, count, unit, true);
    }
    if let Some(caps) = NEXT_PERIOD.captures(query) {
        return shift(today, 1, Unit::parse(&caps[1])?, true);
    }
    if TOMORROW.is_match(query) {
        return today.checked_add_signed(Duration::days(1));
    }
    if YESTERDAY.is_match(query) {
        return today.checked_sub_signed(Duration::days(1));
    }
    if TODAY.is_match(query) {
        return Some(today);
    }
    None
}

fn calendar(query: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = MONTH_DAY.captures(query) {
        let year = caps.get(3).and_then(|y| y.as_str().parse().ok());
        if let Some(date) = month_day(today, parse_month(&caps[1])?, caps[2].parse().ok()?, year) {
            return Some(date);
        }
    }
    if let Some(caps) = DAY_MONTH.captures(query) {
        let year = caps.get(3).and_then(|y| y.as_str().parse().ok());
        if let Some(date) = month_day(today, parse_month(&caps[2])?, caps[1].parse().ok()?, year) {
            return Some(date);
        }
    }
    None
}

fn weekday(query: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = LAST_WEEKDAY.captures(query) {
        let target = parse_weekday(&caps[1])?;
        let back = 7 - days_until_next(today, target) % 7;
        return today.checked_sub_signed(Duration::days(back));
    }
    let caps = WEEKDAY_PHRASE.captures(query)?;
    let target = parse_weekday(&caps[2])?;
    let ahead = match caps.get(1).map(|m| m.as_str()) {
        Some("next") => days_until_next(today, target),
        _ => days_until_next(today, target) % 7,
    };
    today.checked_add_signed(Duration::days(ahead))
}

/// Parses a date expression out of `query`, or `None` when nothing in it
/// reads as a date.
pub fn parse_date(query: &str, today: NaiveDate) -> Option<NaiveDate> {
    let query = query.to_lowercase();
    explicit_numeric(&query)
        .or_else(|| relative(&query, today))
        .or_else(|| calendar(&query, today))
        .or_else(|| weekday(&query, today))
}

pub struct StructuredDateParser;

#[async_trait]
impl DateResolver for StructuredDateParser {
    fn name(&self) -> &'static str {
        "structured"
    }

    async fn attempt(&self, query: &str, today: NaiveDate) -> Result<Resolution, AppError> {
        Ok(parse_date(query, today).into())
    }
}
