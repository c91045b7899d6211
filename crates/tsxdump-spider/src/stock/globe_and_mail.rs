use crate::config::Sources;
use crate::fetch::Fetch;
use crate::model::{ticker, Company};
use crate::repo::Repository;
use crate::steps::{Step, StepReport};
use crate::tui::Progress;
use crate::{Error, Result};
use scraper::{Html, Selector};
use tracing::{debug, trace, warn};

lazy_static::lazy_static! {
    static ref INDUSTRY_FIELD: Selector =
        Selector::parse(r#"barchart-field[name="industryGroup"]"#).expect("industry selector");
}

// scrape
// ----------------------------------------------------------------------------

/// Look up the industry of every stored company. Companies without one on their profile page keep
/// what is already stored.
pub async fn scrape<F: Fetch>(
    fetcher: &F,
    repo: &Repository,
    sources: &Sources,
    tui: bool,
) -> Result<StepReport> {
    let time = std::time::Instant::now();
    let companies = repo.companies().await?;
    let mut report = StepReport::new(Step::Industries);
    let progress = Progress::new(companies.len(), "Industries", tui);

    for company in &companies {
        let outcome = collect(fetcher, repo, sources, company).await;
        report.record(
            outcome,
            &format!("[{}] {}", company.symbol, company.name),
            &progress,
        )?;
    }

    progress.finish();
    debug!("industries collected. {}", crate::time_elapsed(time));
    Ok(report)
}

async fn collect<F: Fetch>(
    fetcher: &F,
    repo: &Repository,
    sources: &Sources,
    company: &Company,
) -> Result<()> {
    let url = sources.industry_url(&profile_symbol(&company.symbol));
    let body = fetcher.fetch(&url).await?;

    match parse_industry(&body)? {
        Some(industry) => {
            trace!("[{}] {} is in {industry}", company.symbol, company.name);
            repo.upsert_industry(&company.symbol, &industry).await
        }
        None => {
            warn!(
                "cannot find industry in {url}; [{}] keeps {}",
                company.symbol, company.industry
            );
            Ok(())
        }
    }
}

/// Symbol form used in profile URLs; `TSE:AW.UN` becomes `AW-UN`.
pub fn profile_symbol(symbol: &str) -> String {
    ticker(symbol).to_uppercase().replace('.', "-")
}

/// Reads the industry group off a profile page. `None` when the page has no industry field, or
/// an empty one.
pub fn parse_industry(raw: &str) -> Result<Option<String>> {
    let document = Html::parse_document(raw);
    let Some(field) = document.select(&INDUSTRY_FIELD).next() else {
        return Ok(None);
    };

    match field.value().attr("value").map(str::trim) {
        Some("") => Ok(None),
        Some(industry) => Ok(Some(industry.to_string())),
        None => Err(Error::parse("industryGroup field has no value attribute")),
    }
}
