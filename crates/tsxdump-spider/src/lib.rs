/// Errors raised while fetching, parsing or storing scraped data.
pub mod error;

/// Environment driven configuration; database path, page cache and source URLs.
pub mod config;

/// HTTP page fetching, with an optional on-disk page cache.
pub mod fetch;

/// Page cache stored on the local filesystem.
pub mod fs;

/// Records produced by the parsers and held by the repository.
pub mod model;

/// SQLite storage for companies, prices and financial periods.
pub mod repo;

/// Filters stored companies down to the growing, fairly priced ones.
pub mod screener;

/// Scrape steps, their reports, and the sequencing of a full run.
pub mod steps;

/// TSX company data; listings, industries, prices and financial statements, per source.
pub mod stock;

mod tui;

pub use error::{Error, Result};

/// Shortcut for required API elements.
pub(crate) mod http {
    pub(crate) use reqwest::Client as HttpClient;
}

pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!("time elapsed: {:?}", time.elapsed())
}
