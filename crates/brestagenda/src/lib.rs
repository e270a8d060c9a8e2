pub mod config;
pub mod formatter;
mod parser;
pub mod scraper;
pub mod store;
pub mod types;

pub use config::{CrawlConfig, RenderConfig};
pub use formatter::{Timetable, render};
pub use parser::{ParseError, parse_listing_page};
pub use scraper::{CrawlError, CrawlReport, Crawler};
pub use store::{StoreError, load_events, save_events};
