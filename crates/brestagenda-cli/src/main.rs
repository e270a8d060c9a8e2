use std::path::{Path, PathBuf};
use std::process;

use brestagenda::{CrawlConfig, Crawler, RenderConfig, Timetable};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "brestagenda")]
#[command(
    about = "Crawl the brest.fr agenda to JSON and render it as an HTML timetable",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "How much crawl and render progress to report on stderr"
    )]
    verbosity: Verbosity,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Verbosity {
    /// Nothing, not even errors
    Off,
    /// Fatal errors only
    Error,
    /// Also report a crawl cut short by a server error
    Warn,
    /// Also report each fetched page and written file
    Info,
    /// Also report per-page extraction counts
    Debug,
    /// Everything, including HTTP client internals
    Trace,
}

impl Verbosity {
    fn filter(self) -> LevelFilter {
        match self {
            Verbosity::Off => LevelFilter::Off,
            Verbosity::Error => LevelFilter::Error,
            Verbosity::Warn => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }

    /// HTTP stack crates stay at `warn` unless tracing is asked for.
    fn init_logging(self) {
        let level = self.filter();
        let dependencies = match self {
            Verbosity::Trace => LevelFilter::Trace,
            _ => level.min(LevelFilter::Warn),
        };
        env_logger::Builder::new()
            .filter_level(dependencies)
            .filter_module("brestagenda", level)
            .filter_module("brestagenda_cli", level)
            .init();
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the brest.fr agenda and write every event as JSON
    Crawl {
        #[arg(value_name = "PATH", help = "Output JSON path")]
        output: PathBuf,

        #[arg(long, value_name = "DIR", help = "Write each raw page body to DIR/<n>.html")]
        dump_dir: Option<PathBuf>,

        #[arg(
            long,
            value_name = "URL",
            default_value = brestagenda::config::BASE_URL,
            help = "Site the agenda is crawled from"
        )]
        base_url: String,
    },
    /// Write crawled events as an HTML timetable
    Format {
        #[arg(value_name = "JSON", help = "Input JSON path")]
        input: PathBuf,

        #[arg(value_name = "PATH", help = "Output HTML path")]
        output: PathBuf,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "Render relative to this date instead of today",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        today: Option<NaiveDate>,
    },
}

async fn run_crawl(config: CrawlConfig, output: &Path) {
    let crawler = Crawler::new(config).unwrap_or_else(|e| {
        log::error!("Error creating crawler: {}", e);
        process::exit(1);
    });

    log::info!("Crawling agenda from {}...", crawler.config().base_url);

    let report = crawler.crawl().await.unwrap_or_else(|e| {
        log::error!("Error crawling agenda: {}", e);
        process::exit(1);
    });

    if report.stopped_by_server_error {
        log::warn!("Agenda is incomplete: {}", report);
    }

    brestagenda::save_events(output, &report.events).unwrap_or_else(|e| {
        log::error!("Error writing events: {}", e);
        process::exit(1);
    });
}

fn run_format(config: &RenderConfig, input: &Path, output: &Path, today: NaiveDate) {
    let events = brestagenda::load_events(input).unwrap_or_else(|e| {
        log::error!("Error reading events: {}", e);
        process::exit(1);
    });

    let timetable = Timetable::build(&events, today, config);
    log::info!(
        "{} ongoing, {} upcoming, {} past event(s) skipped",
        timetable.before.len(),
        timetable.after.len(),
        timetable.skipped
    );

    std::fs::write(output, timetable.to_html(config)).unwrap_or_else(|e| {
        log::error!("Error writing {}: {}", output.display(), e);
        process::exit(1);
    });
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    cli.verbosity.init_logging();

    match cli.command {
        Commands::Crawl {
            output,
            dump_dir,
            base_url,
        } => {
            let config = CrawlConfig::new(&base_url)
                .unwrap_or_else(|e| {
                    log::error!("Invalid args: base URL '{}': {}", base_url, e);
                    process::exit(1);
                })
                .with_dump_dir(dump_dir);

            run_crawl(config, &output).await;
        }

        Commands::Format {
            input,
            output,
            today,
        } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            run_format(&RenderConfig::default(), &input, &output, today);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_args() {
        let cli = Cli::try_parse_from([
            "brestagenda",
            "-l",
            "debug",
            "crawl",
            "events.json",
            "--dump-dir",
            "pages",
        ])
        .unwrap();

        assert_eq!(cli.verbosity.filter(), LevelFilter::Debug);
        match cli.command {
            Commands::Crawl {
                output,
                dump_dir,
                base_url,
            } => {
                assert_eq!(output, PathBuf::from("events.json"));
                assert_eq!(dump_dir, Some(PathBuf::from("pages")));
                assert_eq!(base_url, brestagenda::config::BASE_URL);
            }
            Commands::Format { .. } => panic!("expected crawl"),
        }
    }

    #[test]
    fn test_format_args() {
        let cli = Cli::try_parse_from([
            "brestagenda",
            "format",
            "events.json",
            "agenda.html",
            "--today",
            "2024-07-13",
        ])
        .unwrap();

        assert_eq!(cli.verbosity.filter(), LevelFilter::Info);
        match cli.command {
            Commands::Format { today, .. } => {
                assert_eq!(today, NaiveDate::from_ymd_opt(2024, 7, 13));
            }
            Commands::Crawl { .. } => panic!("expected format"),
        }
    }

    #[test]
    fn test_invalid_args_rejected() {
        assert!(Cli::try_parse_from(["brestagenda", "format", "events.json"]).is_err());
        assert!(
            Cli::try_parse_from([
                "brestagenda",
                "format",
                "a.json",
                "b.html",
                "--today",
                "13/07/2024"
            ])
            .is_err()
        );
        assert!(Cli::try_parse_from(["brestagenda", "-l", "loud", "crawl", "x.json"]).is_err());
    }
}
