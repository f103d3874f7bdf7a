//! Travel-date parsing for process-answers.
//!
//! Accepts an ISO range, "Month D-D, YYYY", a single "Month D, YYYY", and
//! fuzzy markers ("mid-", "around", "sometime", "flexible", ...) that fall
//! back to a flexible week with no concrete dates. A parse failure never
//! panics -- it yields `flexibility: specific` with both dates null.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDates {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub flexibility: String,
    pub description: String,
}

const FLEXIBLE_MARKERS: &[&str] =
    &["around", "sometime", "mid-", "early", "late", "flexible", "approximately", "about", "roughly"];

static MONTH_DAY_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\w+)\s+(\d{1,2})\s*[-\u{2013}to]+\s*(\d{1,2}),?\s*(\d{4})").unwrap());
static ISO_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})-(\d{2})-(\d{2})\s*(?:to|-|\u{2013})\s*(\d{4})-(\d{2})-(\d{2})").unwrap()
});
static MONTH_DAY_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\w+)\s+(\d{1,2}),?\s*(\d{4})").unwrap());

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

pub fn parse_travel_dates(answer: &str) -> ParsedDates {
    let mut result = ParsedDates {
        start_date: None,
        end_date: None,
        flexibility: "specific".to_string(),
        description: answer.to_string(),
    };

    if answer.trim().is_empty() {
        return result;
    }

    let lower = answer.to_lowercase();
    if FLEXIBLE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        result.flexibility = "flexible_week".to_string();
        return result;
    }

    if let Some(caps) = MONTH_DAY_RANGE.captures(answer) {
        if let (Some(month), Ok(start_day), Ok(end_day), Ok(year)) = (
            month_number(&caps[1]),
            caps[2].parse::<u32>(),
            caps[3].parse::<u32>(),
            caps[4].parse::<i32>(),
        ) {
            if let (Some(start), Some(end)) =
                (NaiveDate::from_ymd_opt(year, month, start_day), NaiveDate::from_ymd_opt(year, month, end_day))
            {
                result.start_date = Some(start.format("%Y-%m-%d").to_string());
                result.end_date = Some(end.format("%Y-%m-%d").to_string());
                return result;
            }
        }
    }

    if let Some(caps) = ISO_RANGE.captures(answer) {
        result.start_date = Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]));
        result.end_date = Some(format!("{}-{}-{}", &caps[4], &caps[5], &caps[6]));
        return result;
    }

    if let Some(caps) = MONTH_DAY_SINGLE.captures(answer) {
        if let (Some(month), Ok(day), Ok(year)) =
            (month_number(&caps[1]), caps[2].parse::<u32>(), caps[3].parse::<i32>())
        {
            if let Some(start) = NaiveDate::from_ymd_opt(year, month, day) {
                result.start_date = Some(start.format("%Y-%m-%d").to_string());
                return result;
            }
        }
    }

    result
}
