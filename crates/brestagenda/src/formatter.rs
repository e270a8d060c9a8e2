use std::fmt::Display;

use crate::config::RenderConfig;
use crate::types::Event;

use chrono::{Datelike, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Started before today and not over yet.
    Before,
    /// Starts today or later.
    After,
}

/// One event prepared for the timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub link: String,
    pub start: String,
    /// Last inclusive day.
    pub end: String,
    /// Signed days to the end (Before, negative) or to the start (After).
    pub delta: i64,
    pub delta_label: String,
    pub weekday: &'static str,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timetable {
    pub before: Vec<DisplayEntry>,
    pub after: Vec<DisplayEntry>,
    /// Events already over, left out of the timetable.
    pub skipped: usize,
}

impl Timetable {
    pub fn build(events: &[Event], today: NaiveDate, config: &RenderConfig) -> Self {
        let mut timetable = Timetable::default();
        for event in events {
            match classify(event, today, config) {
                Some((Bucket::Before, entry)) => timetable.before.push(entry),
                Some((Bucket::After, entry)) => timetable.after.push(entry),
                None => timetable.skipped += 1,
            }
        }
        // Stable: events with the same delta keep their crawl order.
        timetable.before.sort_by_key(|e| e.delta);
        timetable.after.sort_by_key(|e| e.delta);
        timetable
    }

    pub fn to_html(&self, config: &RenderConfig) -> String {
        HtmlPage {
            timetable: self,
            config,
        }
        .to_string()
    }
}

/// Buckets `event` relative to `today`, or `None` once its last day has passed.
pub fn classify(
    event: &Event,
    today: NaiveDate,
    config: &RenderConfig,
) -> Option<(Bucket, DisplayEntry)> {
    let last_day = event.last_day();
    // Exclusive end boundary.
    let end_date = last_day.succ_opt()?;
    if today >= end_date {
        return None;
    }

    let (bucket, rel_date, sign) = if event.start < today {
        (Bucket::Before, end_date, -1)
    } else {
        (Bucket::After, event.start, 1)
    };
    let delta = sign * rel_date.signed_duration_since(today).num_days();

    let entry = DisplayEntry {
        link: event.link.clone(),
        start: event.start.format(DATE_FORMAT).to_string(),
        end: last_day.format(DATE_FORMAT).to_string(),
        delta,
        delta_label: format_delta(delta, config),
        weekday: config.weekdays[rel_date.weekday().num_days_from_sunday() as usize],
        title: event.title.clone(),
    };
    Some((bucket, entry))
}

/// `+15j`, `-2m`, or empty for zero. Months are whole `days_per_month` spans,
/// truncated toward zero.
pub fn format_delta(delta: i64, config: &RenderConfig) -> String {
    if delta == 0 {
        String::new()
    } else if delta.abs() > config.days_per_month {
        format!("{:+}m", delta / config.days_per_month)
    } else {
        format!("{:+}j", delta)
    }
}

pub fn render(events: &[Event], today: NaiveDate, config: &RenderConfig) -> String {
    Timetable::build(events, today, config).to_html(config)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const PAGE_STYLE: &str = "	a:link {
		text-decoration: none;
	}

	a:visited {
		text-decoration: none;
	}

	a:hover {
		text-decoration: underline;
	}

	a:active {
		text-decoration: underline;
	}
";

struct HtmlPage<'a> {
    timetable: &'a Timetable,
    config: &'a RenderConfig,
}

impl HtmlPage<'_> {
    fn write_rows(
        f: &mut std::fmt::Formatter<'_>,
        entries: &[DisplayEntry],
    ) -> std::fmt::Result {
        for entry in entries {
            writeln!(f, "\t<tr>")?;
            writeln!(f, "\t\t<td style=\"white-space:nowrap\">{}</td>", entry.start)?;
            writeln!(f, "\t\t<td>→</td>")?;
            writeln!(f, "\t\t<td style=\"white-space:nowrap\">{}</td>", entry.end)?;
            writeln!(f, "\t\t<td>[{}]</td>", entry.weekday)?;
            writeln!(f, "\t\t<td>{}</td>", entry.delta_label)?;
            writeln!(
                f,
                "\t\t<td><a href=\"{}\">{}</a></td>",
                escape_html(&entry.link),
                escape_html(&entry.title)
            )?;
            writeln!(f, "\t</tr>")?;
        }
        Ok(())
    }
}

impl Display for HtmlPage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Timetable { before, after, .. } = self.timetable;

        writeln!(f, "<html>")?;
        writeln!(f, "<head>")?;
        writeln!(f, "\t<meta charset=\"utf-8\">")?;
        writeln!(f, "\t<title>{}</title>", escape_html(self.config.page_title))?;
        write!(f, "\t<style>\n{}\t</style>\n", PAGE_STYLE)?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        writeln!(f, "<table>")?;
        Self::write_rows(f, before)?;
        if !before.is_empty() && !after.is_empty() {
            writeln!(f, "</table>")?;
            writeln!(f, "<hr id=\"now\">")?;
            writeln!(f, "<table>")?;
        }
        Self::write_rows(f, after)?;
        writeln!(f, "</table>")?;
        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}
