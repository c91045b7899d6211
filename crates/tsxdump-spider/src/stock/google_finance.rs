use crate::config::Sources;
use crate::fetch::Fetch;
use crate::model::{Company, FinancialPeriod, PeriodType};
use crate::repo::Repository;
use crate::steps::{Step, StepReport};
use crate::tui::Progress;
use crate::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

/// Statements are only read when the page says its figures are in millions.
const MILLIONS_MARKER: &str = "In Millions of";
const REVENUE_MULTIPLIER: f64 = 1_000_000.0;

const REVENUE_ROW: &str = "Revenue";
const EPS_ROW: &str = "Diluted Normalized EPS";

lazy_static::lazy_static! {
    static ref QUARTERLY: Selector = Selector::parse("div#incinterimdiv").expect("quarterly selector");
    static ref ANNUAL: Selector = Selector::parse("div#incannualdiv").expect("annual selector");
    static ref HEADER_CELL: Selector = Selector::parse("th").expect("header selector");
    static ref ROW: Selector = Selector::parse("tr").expect("row selector");
    static ref CELL: Selector = Selector::parse("td").expect("cell selector");
    static ref PERIOD_HEADER: Regex =
        Regex::new(r"\d+ (months|weeks) ending").expect("period header regex");
    static ref ISO_DATE: Regex = Regex::new(r"\d{4}-\d{2}-\d{2}").expect("date regex");
}

// scrape
// ----------------------------------------------------------------------------

/// Collect the income statement figures of every stored company.
pub async fn scrape<F: Fetch>(
    fetcher: &F,
    repo: &Repository,
    sources: &Sources,
    tui: bool,
) -> Result<StepReport> {
    let time = std::time::Instant::now();
    let companies = repo.companies().await?;
    let mut report = StepReport::new(Step::Financials);
    let progress = Progress::new(companies.len(), "Financials", tui);

    for company in &companies {
        let outcome = collect(fetcher, repo, sources, company).await;
        report.record(
            outcome,
            &format!("[{}] {}", company.symbol, company.name),
            &progress,
        )?;
    }

    progress.finish();
    debug!("financials collected. {}", crate::time_elapsed(time));
    Ok(report)
}

async fn collect<F: Fetch>(
    fetcher: &F,
    repo: &Repository,
    sources: &Sources,
    company: &Company,
) -> Result<()> {
    let url = sources.financials_url(&company.symbol.to_uppercase());
    trace!("scraping financials for [{}] from {url}", company.symbol);
    let body = fetcher.fetch(&url).await?;

    let periods = parse_financials(&body)?;
    trace!(
        "{} periods found for [{}] {}",
        periods.len(),
        company.symbol,
        company.name
    );

    repo.upsert_financials(&company.symbol, &periods).await
}

/// Reads the quarterly and annual columns of an income statement page.
///
/// Each column becomes one period, dated by its `N months ending YYYY-MM-DD` header; columns
/// without a date are dropped. Revenue is scaled out of millions. Cells that are `-` or not a
/// number come back as `None`.
pub fn parse_financials(raw: &str) -> Result<Vec<FinancialPeriod>> {
    if !raw.contains(MILLIONS_MARKER) {
        return Err(Error::parse(format!(
            "could not find \"{MILLIONS_MARKER}\""
        )));
    }

    let document = Html::parse_document(raw);
    let mut periods = statement(&document, &QUARTERLY, PeriodType::Quarterly)?;
    periods.extend(statement(&document, &ANNUAL, PeriodType::Annual)?);
    Ok(periods)
}

fn statement(
    document: &Html,
    selector: &Selector,
    period_type: PeriodType,
) -> Result<Vec<FinancialPeriod>> {
    let table = document
        .select(selector)
        .next()
        .ok_or_else(|| Error::parse(format!("no {period_type} statement found")))?;

    let dates: Vec<Option<NaiveDate>> = table
        .select(&HEADER_CELL)
        .map(text)
        .filter(|header| PERIOD_HEADER.is_match(header))
        .map(|header| {
            ISO_DATE
                .find(&header)
                .and_then(|date| NaiveDate::parse_from_str(date.as_str(), "%Y-%m-%d").ok())
        })
        .collect();

    let revenue = row_values(table, REVENUE_ROW);
    let eps = row_values(table, EPS_ROW);
    if revenue.is_none() && eps.is_none() {
        return Err(Error::parse(format!(
            "no \"{REVENUE_ROW}\" or \"{EPS_ROW}\" row in the {period_type} statement"
        )));
    }
    let revenue = revenue.unwrap_or_default();
    let eps = eps.unwrap_or_default();

    Ok(dates
        .into_iter()
        .enumerate()
        .filter_map(|(i, period_end)| {
            Some(FinancialPeriod {
                period_type,
                period_end: period_end?,
                eps: eps.get(i).copied().flatten(),
                revenue: revenue
                    .get(i)
                    .copied()
                    .flatten()
                    .map(|revenue| revenue * REVENUE_MULTIPLIER),
            })
        })
        .collect())
}

// The cells following the row whose first cell reads `label`.
fn row_values(table: ElementRef, label: &str) -> Option<Vec<Option<f64>>> {
    table.select(&ROW).find_map(|row| {
        let mut cells = row.select(&CELL);
        let first = cells.next()?;
        if text(first).trim() != label {
            return None;
        }
        Some(cells.map(|cell| parse_number(&text(cell))).collect())
    })
}

fn text(element: ElementRef) -> String {
    element.text().collect()
}

/// `1,234.5` gives `Some(1234.5)`; `-`, blanks and anything else non-numeric give `None`.
pub(crate) fn parse_number(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = r#"<html><body>
        <div id="incinterimdiv">
          <table id="fs-table">
            <thead><tr>
              <th class="lm lft nwp">In Millions of CAD (except for per share items)</th>
              <th class="rgt">13 weeks ending 2023-12-31</th>
              <th class="rgt">13 weeks ending 2023-09-30</th>
              <th class="rgt">13 weeks ending</th>
            </tr></thead>
            <tbody>
              <tr><td class="lft lm bld">Revenue
              </td><td class="r bld">1,250.50</td><td class="r bld">1,100.00</td><td class="r bld">900</td></tr>
              <tr><td class="lft lm">Diluted Normalized EPS</td><td class="r">0.52</td><td class="r">-</td><td class="r">0.40</td></tr>
            </tbody>
          </table>
        </div>
        <div id="incannualdiv">
          <table>
            <thead><tr>
              <th class="lm lft nwp">In Millions of CAD (except for per share items)</th>
              <th class="rgt">52 weeks ending 2023-12-31</th>
              <th class="rgt">12 months ending 2022-12-31</th>
            </tr></thead>
            <tbody>
              <tr><td class="lft lm bld">Revenue</td><td class="r bld">4,800.00</td><td class="r bld">n/a</td></tr>
              <tr><td class="lft lm">Diluted Normalized EPS</td><td class="r">2.10</td><td class="r">1.95</td></tr>
            </tbody>
          </table>
        </div>
    </body></html>"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_quarterly_and_annual_columns() {
        let periods = parse_financials(STATEMENT).unwrap();
        assert_eq!(
            periods,
            vec![
                FinancialPeriod {
                    period_type: PeriodType::Quarterly,
                    period_end: date(2023, 12, 31),
                    eps: Some(0.52),
                    revenue: Some(1_250_500_000.0),
                },
                FinancialPeriod {
                    period_type: PeriodType::Quarterly,
                    period_end: date(2023, 9, 30),
                    eps: None,
                    revenue: Some(1_100_000_000.0),
                },
                FinancialPeriod {
                    period_type: PeriodType::Annual,
                    period_end: date(2023, 12, 31),
                    eps: Some(2.10),
                    revenue: Some(4_800_000_000.0),
                },
                FinancialPeriod {
                    period_type: PeriodType::Annual,
                    period_end: date(2022, 12, 31),
                    eps: Some(1.95),
                    revenue: None,
                },
            ]
        );
    }

    #[test]
    fn page_without_millions_marker_is_a_parse_error() {
        let raw = r#"<div id="incinterimdiv"></div><div id="incannualdiv"></div>"#;
        assert!(matches!(
            parse_financials(raw).unwrap_err(),
            Error::Parse { .. }
        ));
    }

    #[test]
    fn missing_annual_statement_is_a_parse_error() {
        let raw = STATEMENT.replace("incannualdiv", "somethingelse");
        let err = parse_financials(&raw).unwrap_err();
        assert!(err.to_string().contains("annual"));
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_number(" 1,234.5 "), Some(1234.5));
        assert_eq!(parse_number("-0.12"), Some(-0.12));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
    }
}
