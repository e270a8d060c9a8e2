use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CrawlConfig;
use crate::parser::{ParseError, parse_listing_page};
use crate::types::{Event, Page};

use reqwest::{Client, StatusCode};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("GET {url} got {status}")]
    UnexpectedStatus { url: Url, status: StatusCode },
    #[error("Parse error on {url}: {source}")]
    ParseError { url: Url, source: ParseError },
    #[error("Invalid page address '{0}': {1}")]
    InvalidUrl(String, url::ParseError),
    #[error("Failed to write {path}: {source}")]
    DumpError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no event found")]
    NoEvents,
}

/// Outcome of fetching one listing page.
enum Fetched {
    Page(Page),
    /// The server answered 500; crawling cannot go further.
    ServerError,
}

#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Events in page order.
    pub events: Vec<Event>,
    /// Listing pages successfully extracted.
    pub pages: usize,
    pub stopped_by_server_error: bool,
}

impl Display for CrawlReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} event(s) from {} page(s)",
            self.events.len(),
            self.pages
        )?;
        if self.stopped_by_server_error {
            write!(f, " (stopped early on a server error)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Crawler {
    client: Client,
    config: CrawlConfig,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Follows `rel=next` links from the start page until none is left.
    ///
    /// Pages are fetched one at a time. A 500 ends the crawl with whatever was
    /// gathered so far; any other failure aborts it.
    pub async fn crawl(&self) -> Result<CrawlReport, CrawlError> {
        if let Some(dir) = &self.config.dump_dir {
            fs::create_dir_all(dir).map_err(|source| CrawlError::DumpError {
                path: dir.clone(),
                source,
            })?;
        }

        let mut events = Vec::new();
        let mut pages = 0;
        let mut stopped_by_server_error = false;
        let mut next = Some(self.config.start_path.clone());

        while let Some(path) = next.take() {
            let url = self
                .config
                .base_url
                .join(&path)
                .map_err(|e| CrawlError::InvalidUrl(path.clone(), e))?;

            match self.fetch_page(&url, pages).await? {
                Fetched::Page(page) => {
                    events.extend(page.events);
                    next = page.next;
                    pages += 1;
                }
                Fetched::ServerError => {
                    log::warn!("GET {} got a server error, stopping crawl", url);
                    stopped_by_server_error = true;
                }
            }
        }

        if events.is_empty() {
            return Err(CrawlError::NoEvents);
        }

        let report = CrawlReport {
            events,
            pages,
            stopped_by_server_error,
        };
        log::info!("Crawled {}", report);
        Ok(report)
    }

    async fn fetch_page(&self, url: &Url, page_num: usize) -> Result<Fetched, CrawlError> {
        log::info!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::INTERNAL_SERVER_ERROR => return Ok(Fetched::ServerError),
            status => {
                return Err(CrawlError::UnexpectedStatus {
                    url: url.clone(),
                    status,
                });
            }
        }

        let body = response
            .bytes()
            .await
            .inspect_err(|e| log::error!("Body read error: {e:?}"))?;

        if let Some(dir) = &self.config.dump_dir {
            dump_page(dir, page_num, &body)?;
        }

        let html = String::from_utf8_lossy(&body);

        let page = parse_listing_page(&html, &self.config.base_url).map_err(|source| {
            CrawlError::ParseError {
                url: url.clone(),
                source,
            }
        })?;
        Ok(Fetched::Page(page))
    }
}

/// Writes the body exactly as received, before any decoding.
fn dump_page(dir: &Path, page_num: usize, body: &[u8]) -> Result<(), CrawlError> {
    let path = dir.join(format!("{}.html", page_num));
    log::info!("writing {}", path.display());
    fs::write(&path, body).map_err(|source| CrawlError::DumpError { path, source })
}
