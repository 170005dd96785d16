use chrono::{NaiveDateTime, NaiveTime};
use log::{debug, warn};
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

use crate::{ScraperError, ScraperResult};

/// `%B` parses both `Jun` and `June`.
const START_FORMATS: [&str; 2] = ["%B %d, %H:%M", "%B %d %H:%M"];
const END_TIME_FORMAT: &str = "%H:%M";

/// Outcome of reading an incident's `start - end` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    /// Whole minutes from start to end; zero while unresolved.
    pub duration: i64,
    pub start: Option<NaiveDateTime>,
}

impl TimeSpan {
    /// An incident with no end marker yet, or one whose timestamp could not be read.
    pub fn unresolved() -> Self {
        Self {
            duration: 0,
            start: None,
        }
    }

    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            duration: (end - start).num_minutes(),
            start: Some(start),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.start.is_some()
    }
}

/// Zone abbreviations are written in capitals (`PDT`, `CEST`, `AEST`); month names never are.
fn zone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:[A-Z]{2,5}|(?i:utc|gmt))\b").expect("valid regex"))
}

fn ordinal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d)(?:st|nd|rd|th)\b").expect("valid regex"))
}

/// Drops markup, timezone names, ordinal suffixes and parentheses, and collapses whitespace.
pub fn clean_timestamp(raw: &str) -> String {
    let text = if raw.contains('<') {
        Html::parse_fragment(raw)
            .root_element()
            .text()
            .collect::<String>()
    } else {
        raw.to_string()
    };

    let text = zone_regex().replace_all(&text, " ");
    let text = ordinal_regex().replace_all(&text, "$1");
    text.replace(['(', ')'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_start(text: &str, year: i32) -> Option<NaiveDateTime> {
    START_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(&format!("{year} {text}"), &format!("%Y {format}")).ok()
    })
}

/// Strict variant of [`normalize_time`]: an unreadable timestamp is an error.
///
/// Status pages omit the year, so `year` comes from the history page the
/// incident was listed on. An end without its own date falls on the start date.
pub fn parse_time_span(raw: &str, year: i32) -> ScraperResult<TimeSpan> {
    let cleaned = clean_timestamp(raw);
    let Some((start_text, end_text)) = cleaned.split_once('-') else {
        return Ok(TimeSpan::unresolved());
    };

    let parse_error = || ScraperError::TimeParseError {
        text: cleaned.clone(),
    };

    let start = parse_start(start_text.trim(), year).ok_or_else(parse_error)?;
    let end_text = end_text.trim();
    let end = match NaiveTime::parse_from_str(end_text, END_TIME_FORMAT) {
        Ok(time) => start.date().and_time(time),
        Err(_) => parse_start(end_text, year).ok_or_else(parse_error)?,
    };

    Ok(TimeSpan::between(start, end))
}

/// Duration in minutes and start time of an incident timestamp such as
/// `Jun 27, 06:13 - 07:00 PDT`. Unreadable text is treated like an
/// incident still in progress.
pub fn normalize_time(raw: &str, year: i32) -> TimeSpan {
    match parse_time_span(raw, year) {
        Ok(span) => {
            if !span.is_resolved() {
                debug!("No end marker in timestamp {:?}", raw);
            }
            span
        }
        Err(e) => {
            warn!("{}, treating incident as unresolved", e);
            TimeSpan::unresolved()
        }
    }
}
