//! Date and date-range detection for résumé lines.

use std::sync::OnceLock;

use chrono::{Datelike, Utc};
use regex::Regex;

use crate::engine::resume::DateFormat;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

/// Earliest year accepted as a résumé date.
const MIN_YEAR: i32 = 1950;
/// Expected graduation dates may lie a few years ahead.
const FUTURE_YEARS: i32 = 6;

/// A date or date range found in a line.
#[derive(Debug, Clone, PartialEq)]
pub struct DateSpan {
    pub text: String,
    pub formats: Vec<DateFormat>,
}

fn date_token() -> String {
    format!(r"(?:{MONTH}\s+\d{{4}}|\d{{1,2}}/\d{{4}}|\d{{4}}-\d{{2}}|\d{{4}})")
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let date = date_token();
        let pattern = format!(
            r"(?i)\b(?P<start>{date})\s*(?:-|–|—|to|until)\s*(?P<end>{date}|present|current|now|today)\b"
        );
        Regex::new(&pattern).expect("date range pattern is valid")
    })
}

fn single_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r"(?i)\b(?P<date>{})\b", date_token());
        Regex::new(&pattern).expect("date pattern is valid")
    })
}

/// Finds a date range ("Jan 2020 – Present", "2018 - 2021"), falling back to
/// a single plausible date.
pub fn find_dates(line: &str) -> Option<DateSpan> {
    find_range(line).or_else(|| find_single(line))
}

fn find_range(line: &str) -> Option<DateSpan> {
    range_regex().captures_iter(line).find_map(|caps| {
        let start = caps.name("start")?.as_str();
        let end = caps.name("end")?.as_str();
        if !plausible(start) {
            return None;
        }
        let mut formats = vec![classify(start)];
        if is_open_end(end) {
            // "Present" carries no format of its own.
        } else if plausible(end) {
            let format = classify(end);
            if !formats.contains(&format) {
                formats.push(format);
            }
        } else {
            return None;
        }
        Some(DateSpan {
            text: caps.get(0)?.as_str().to_string(),
            formats,
        })
    })
}

fn find_single(line: &str) -> Option<DateSpan> {
    single_regex().captures_iter(line).find_map(|caps| {
        let date = caps.name("date")?.as_str();
        plausible(date).then(|| DateSpan {
            text: date.to_string(),
            formats: vec![classify(date)],
        })
    })
}

fn is_open_end(token: &str) -> bool {
    matches!(
        token.to_lowercase().as_str(),
        "present" | "current" | "now" | "today"
    )
}

pub fn classify(token: &str) -> DateFormat {
    if token.starts_with(|c: char| c.is_alphabetic()) {
        DateFormat::MonthName
    } else if token.contains('/') {
        DateFormat::NumericSlash
    } else if token.contains('-') {
        DateFormat::Iso
    } else {
        DateFormat::YearOnly
    }
}

/// The token's four-digit year falls in a believable window.
fn plausible(token: &str) -> bool {
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    let year_digits = match classify(token) {
        DateFormat::Iso => digits.get(..4),
        _ => digits.get(digits.len().saturating_sub(4)..),
    };
    let Some(year) = year_digits.and_then(|d| d.parse::<i32>().ok()) else {
        return false;
    };
    (MIN_YEAR..=Utc::now().year() + FUTURE_YEARS).contains(&year)
}
