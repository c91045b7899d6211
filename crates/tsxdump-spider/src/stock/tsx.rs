use crate::config::Sources;
use crate::fetch::Fetch;
use crate::model::{Company, EXCHANGE_PREFIX};
use crate::repo::Repository;
use crate::steps::{Step, StepReport};
use crate::tui::Progress;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, trace};

/// The directory is split into one page per leading character of the symbol.
pub const PAGES: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// scrape
// ----------------------------------------------------------------------------

/// Walk every directory page and upsert the companies found. A symbol listed on more than one
/// page is kept from the first.
pub async fn scrape<F: Fetch>(
    fetcher: &F,
    repo: &Repository,
    sources: &Sources,
    tui: bool,
) -> Result<StepReport> {
    let time = std::time::Instant::now();
    let mut report = StepReport::new(Step::Companies);
    let progress = Progress::new(PAGES.len(), "TSX Companies", tui);

    let mut seen: HashSet<String> = HashSet::new();
    for page in PAGES.chars() {
        let url = sources.listing_url(page);
        let outcome = collect_page(fetcher, repo, &url, &mut seen).await;
        report.record(outcome, &url, &progress)?;
    }

    progress.finish();
    debug!(
        "{} TSX companies collected. {}",
        seen.len(),
        crate::time_elapsed(time)
    );
    Ok(report)
}

async fn collect_page<F: Fetch>(
    fetcher: &F,
    repo: &Repository,
    url: &str,
    seen: &mut HashSet<String>,
) -> Result<()> {
    let body = fetcher.fetch(url).await?;
    let companies: Vec<Company> = parse_listing(&body)?
        .into_iter()
        .filter(|company| seen.insert(company.symbol.clone()))
        .collect();
    trace!("{} new companies found at {url}", companies.len());

    repo.upsert_companies(&companies).await
}

/// Extracts the companies on one directory page. Symbols come back exchange-qualified
/// (`AW.UN` becomes `TSE:AW.UN`); industries are left unknown.
pub fn parse_listing(raw: &str) -> Result<Vec<Company>> {
    let directory: Directory = serde_json::from_str(raw).map_err(|err| {
        Error::parse(format!(
            "company directory page is not the expected JSON, error({err})"
        ))
    })?;

    Ok(directory
        .results
        .into_iter()
        .filter(|listing| !listing.symbol.trim().is_empty())
        .map(|listing| {
            Company::new(
                format!("{EXCHANGE_PREFIX}{}", listing.symbol.trim()),
                listing.name.trim(),
            )
        })
        .collect())
}

// de
// ----------------------------------------------------------------------------

// each page is in the form of:
// `{ "last_updated": 1700000000, "length": 2, "results": [
//     { "symbol": "AW.UN", "name": "A & W Food Services of Canada Inc.", "instruments": [...] },
//     ...
// ] }`
#[derive(Debug, Deserialize)]
struct Directory {
    #[serde(default)]
    results: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    symbol: String,
    name: String,
}
