use crate::config::Sources;
use crate::fetch::Fetch;
use crate::model::{ticker, Company};
use crate::repo::Repository;
use crate::steps::{Step, StepReport};
use crate::tui::Progress;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, trace};

// scrape
// ----------------------------------------------------------------------------

/// Fetch the latest price of every stored company. All prices of one run share a timestamp.
pub async fn scrape<F: Fetch>(
    fetcher: &F,
    repo: &Repository,
    sources: &Sources,
    tui: bool,
) -> Result<StepReport> {
    let time = std::time::Instant::now();
    let fetched_at = Utc::now();
    let companies = repo.companies().await?;
    let mut report = StepReport::new(Step::Prices);
    let progress = Progress::new(companies.len(), "Yahoo Finance Prices", tui);

    for company in &companies {
        let outcome = collect(fetcher, repo, sources, company, fetched_at).await;
        report.record(
            outcome,
            &format!("[{}] {}", company.symbol, company.name),
            &progress,
        )?;
    }

    progress.finish();
    debug!("prices collected. {}", crate::time_elapsed(time));
    Ok(report)
}

async fn collect<F: Fetch>(
    fetcher: &F,
    repo: &Repository,
    sources: &Sources,
    company: &Company,
    fetched_at: DateTime<Utc>,
) -> Result<()> {
    let yahoo = yahoo_symbol(&company.symbol);
    let body = fetcher.fetch(&sources.price_url(&yahoo)).await?;

    let quote = parse_price(&body)?
        .into_iter()
        .find(|quote| quote.symbol.eq_ignore_ascii_case(&yahoo))
        .ok_or_else(|| Error::parse(format!("no quote for {yahoo} within response")))?;
    trace!(
        "[{}] {} = {:?}",
        company.symbol,
        company.name,
        quote.price
    );

    repo.upsert_price(&company.symbol, quote.price, fetched_at)
        .await
}

/// Symbol form Yahoo lists TSX companies under; `TSE:AW.UN` becomes `aw-un.to`.
pub fn yahoo_symbol(symbol: &str) -> String {
    format!("{}.to", ticker(symbol).to_lowercase().replace('.', "-"))
}

/// A price found on a chart page, under Yahoo's form of the symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct Quote {
    pub symbol: String,
    /// `None` when the chart carries no market price.
    pub price: Option<f64>,
}

/// Extracts every quote on a chart page.
pub fn parse_price(raw: &str) -> Result<Vec<Quote>> {
    let response: PriceResponse = serde_json::from_str(raw).map_err(|err| {
        Error::parse(format!(
            "chart response is not the expected JSON, error({err})"
        ))
    })?;

    let Some(results) = response.chart.result else {
        return Err(Error::parse(match response.chart.error {
            Some(err) => format!("no results found within response, {}", err.description),
            None => "no results found within response".to_string(),
        }));
    };

    Ok(results
        .into_iter()
        .map(|result| Quote {
            symbol: result.meta.symbol,
            price: result
                .meta
                .regular_market_price
                .filter(|price| price.is_finite()),
        })
        .collect())
}

// de
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PriceResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    symbol: String,
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    description: String,
}
