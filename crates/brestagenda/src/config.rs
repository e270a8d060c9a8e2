use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const BASE_URL: &str = "https://www.brest.fr";
pub const LISTING_PATH: &str = "/actus-agenda/agenda-132.html";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Weekday abbreviations indexed by days from Sunday.
pub const WEEKDAYS: [&str; 7] = ["Di", "Lu", "Ma", "Me", "Je", "Ve", "Sa"];
/// Deltas larger than this many days are shown in months of this length.
pub const DAYS_PER_MONTH: i64 = 30;
pub const PAGE_TITLE: &str = "Agenda Brest";

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Address item links and `next` hrefs are resolved against.
    pub base_url: Url,
    pub start_path: String,
    pub timeout: Duration,
    /// Raw page bodies are written here as `<n>.html` when set.
    pub dump_dir: Option<PathBuf>,
}

impl CrawlConfig {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            start_path: LISTING_PATH.to_string(),
            timeout: REQUEST_TIMEOUT,
            dump_dir: None,
        })
    }

    pub fn with_dump_dir(mut self, dump_dir: Option<PathBuf>) -> Self {
        self.dump_dir = dump_dir;
        self
    }

    pub fn start_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.start_path)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::new(BASE_URL).expect("BASE_URL is a valid URL")
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub weekdays: [&'static str; 7],
    pub days_per_month: i64,
    pub page_title: &'static str,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            weekdays: WEEKDAYS,
            days_per_month: DAYS_PER_MONTH,
            page_title: PAGE_TITLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_start_url() {
        let config = CrawlConfig::default();
        assert_eq!(
            config.start_url().unwrap().as_str(),
            "https://www.brest.fr/actus-agenda/agenda-132.html"
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.dump_dir.is_none());
    }

    #[test]
    fn test_custom_base_url() {
        let config = CrawlConfig::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(
            config.start_url().unwrap().as_str(),
            "http://127.0.0.1:8080/actus-agenda/agenda-132.html"
        );
        assert!(CrawlConfig::new("not a url").is_err());
    }
}
