use std::fmt::Display;

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One agenda entry as scraped from a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Desc")]
    pub description: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Start", with = "json_date")]
    pub start: NaiveDate,
    /// `None` for single-day events.
    #[serde(rename = "End", default, with = "json_optional_date")]
    pub end: Option<NaiveDate>,
}

impl Event {
    /// Last inclusive day of the event.
    pub fn last_day(&self) -> NaiveDate {
        self.end.unwrap_or(self.start)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} → {}] {}", self.start, self.last_day(), self.title)?;
        if !self.category.is_empty() {
            write!(f, " ({})", self.category)?;
        }
        Ok(())
    }
}

/// Extraction result of a single listing page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub events: Vec<Event>,
    /// Raw href of the `rel=next` link, unresolved.
    pub next: Option<String>,
}

/// Older tooling wrote `0001-01-01T00:00:00Z` for a missing end date.
fn is_zero_date(date: NaiveDate) -> bool {
    date.year() == 1 && date.ordinal() == 1
}

fn parse_json_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.date_naive()),
        Err(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d"),
    }
}

mod json_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{}T00:00:00Z", date.format("%Y-%m-%d")))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_json_date(raw.trim())
            .map_err(|e| de::Error::custom(format!("invalid date '{raw}': {e}")))
    }
}

mod json_optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => super::json_date::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => {
                let date = super::parse_json_date(value)
                    .map_err(|e| de::Error::custom(format!("invalid date '{value}': {e}")))?;
                Ok((!super::is_zero_date(date)).then_some(date))
            }
        }
    }
}
