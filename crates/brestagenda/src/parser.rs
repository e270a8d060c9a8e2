use std::sync::LazyLock;

use crate::types::{Event, Page};

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse date '{value}': {source}")]
    DateParseError {
        value: String,
        source: chrono::ParseError,
    },
    #[error("Invalid link '{href}': {source}")]
    InvalidLink {
        href: String,
        source: url::ParseError,
    },
    #[error("Missing required field: {0}")]
    MissingField(String),
}

const DATE_FORMAT: &str = "%Y-%m-%d";

static ITEM: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("article[class~='listItem']").expect("invalid selector: item")
});
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3[class~='title']").expect("invalid selector: title"));
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div[class~='chapeau']").expect("invalid selector: description")
});
static CATEGORY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p[class='category']").expect("invalid selector: category"));
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[class='linkView']").expect("invalid selector: link"));
static DATES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p[class='date'] time").expect("invalid selector: dates"));
static NEXT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel='next']").expect("invalid selector: next"));

fn first_text(item: ElementRef, selector: &Selector) -> String {
    item.select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn parse_date(value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| ParseError::DateParseError {
        value: value.to_string(),
        source,
    })
}

fn resolve_link(base: &Url, href: &str) -> Result<String, ParseError> {
    base.join(href)
        .map(String::from)
        .map_err(|source| ParseError::InvalidLink {
            href: href.to_string(),
            source,
        })
}

pub fn parse_listing_page(html: &str, base: &Url) -> Result<Page, ParseError> {
    let document = Html::parse_document(html);
    let events = extract_events(&document, base)?;
    let next = extract_next(&document);
    log::debug!(
        "Extracted {} event(s), next page: {}",
        events.len(),
        next.as_deref().unwrap_or("none")
    );
    Ok(Page { events, next })
}

/// Fails on the first item whose dates do not parse; no partial result is returned.
pub fn extract_events(document: &Html, base: &Url) -> Result<Vec<Event>, ParseError> {
    document
        .select(&ITEM)
        .map(|item| extract_event(item, base))
        .collect()
}

fn extract_event(item: ElementRef, base: &Url) -> Result<Event, ParseError> {
    let link = match item
        .select(&LINK)
        .next()
        .and_then(|e| e.value().attr("href"))
    {
        Some(href) => resolve_link(base, href.trim())?,
        None => String::new(),
    };

    let mut dates = item
        .select(&DATES)
        .map(|e| e.value().attr("datetime").unwrap_or_default().trim());

    let start = dates
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseError::MissingField("start date".to_string()))
        .and_then(parse_date)?;
    let end = dates
        .next()
        .filter(|s| !s.is_empty())
        .map(parse_date)
        .transpose()?;

    Ok(Event {
        title: first_text(item, &TITLE),
        description: first_text(item, &DESCRIPTION),
        category: first_text(item, &CATEGORY),
        link,
        start,
        end,
    })
}

pub fn extract_next(document: &Html) -> Option<String> {
    document
        .select(&NEXT)
        .next()
        .and_then(|e| e.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}
