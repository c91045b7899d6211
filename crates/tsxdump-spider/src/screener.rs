use crate::model::{CompanyListing, PeriodType};
use colored::Colorize;

/// Constants of the screening rule.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenerConfig {
    /// Survivors must trade strictly below this P/E.
    pub max_pe: f64,
    /// Fewest annual revenue figures, and fewest annual EPS figures, a company needs; never less than 2.
    pub min_annual_periods: usize,
    /// Case-insensitive fragments of resource-sector industry names.
    pub excluded_industries: Vec<String>,
    /// Quarters summed into trailing EPS.
    pub trailing_quarters: usize,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            max_pe: 50.0,
            min_annual_periods: 2,
            excluded_industries: [
                "Oil",
                "Gas",
                "Mining",
                "Metals",
                "Mineral",
                "Diversified",
                "Forestry",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            trailing_quarters: 4,
        }
    }
}

impl ScreenerConfig {
    pub fn is_excluded(&self, industry: &str) -> bool {
        let industry = industry.to_lowercase();
        self.excluded_industries
            .iter()
            .any(|fragment| industry.contains(&fragment.to_lowercase()))
    }
}

/// A company that passed the screen, with the figures it was judged on.
#[derive(Clone, Debug, PartialEq)]
pub struct Screened<'a> {
    pub listing: &'a CompanyListing,
    /// Latest price over latest annual EPS.
    pub pe: f64,
    /// Mean year-over-year revenue growth, in percent.
    pub revenue_growth: Option<f64>,
    /// Mean year-over-year EPS growth, in percent.
    pub eps_growth: Option<f64>,
    /// Consecutive years of strict revenue growth, counted back from the latest year.
    pub years_of_revenue_growth: usize,
    pub years_of_eps_growth: usize,
    /// Sum of the latest quarterly EPS figures.
    pub trailing_eps: Option<f64>,
}

/// Screens `companies` for growing, fairly priced businesses outside the resource sectors.
///
/// A company survives when:
/// 1. its industry matches none of `config.excluded_industries`,
/// 2. it has at least `config.min_annual_periods` annual revenue figures and as many annual EPS
///    figures, and neither series ever falls from one reported period to the next,
/// 3. its newest annual period reports a positive EPS, it has a price, and price / EPS is below
///    `config.max_pe`.
///
/// Survivors are ordered by ascending P/E, ties by symbol. The function is pure; the same input
/// always gives the same output.
pub fn filt<'a>(companies: &'a [CompanyListing], config: &ScreenerConfig) -> Vec<Screened<'a>> {
    let mut survivors: Vec<Screened> = companies
        .iter()
        .filter_map(|listing| screen(listing, config))
        .collect();
    survivors.sort_by(|a, b| {
        a.pe.total_cmp(&b.pe)
            .then_with(|| a.listing.company.symbol.cmp(&b.listing.company.symbol))
    });
    survivors
}

fn screen<'a>(listing: &'a CompanyListing, config: &ScreenerConfig) -> Option<Screened<'a>> {
    if config.is_excluded(&listing.company.industry) {
        return None;
    }

    let annual = listing.periods(PeriodType::Annual);
    let revenue: Vec<f64> = annual.iter().filter_map(|period| period.revenue).collect();
    let eps: Vec<f64> = annual.iter().filter_map(|period| period.eps).collect();
    let min_periods = config.min_annual_periods.max(2);
    if revenue.len() < min_periods || eps.len() < min_periods {
        return None;
    }
    if !non_decreasing(&revenue) || !non_decreasing(&eps) {
        return None;
    }

    // the newest annual period must itself carry the EPS
    let latest_eps = annual.last()?.eps?;
    if latest_eps <= 0.0 {
        return None;
    }
    let pe = listing.latest_price()? / latest_eps;
    if !pe.is_finite() || pe < 0.0 || pe >= config.max_pe {
        return None;
    }

    Some(Screened {
        listing,
        pe,
        revenue_growth: average_growth(&revenue),
        eps_growth: average_growth(&eps),
        years_of_revenue_growth: years_of_growth(&revenue),
        years_of_eps_growth: years_of_growth(&eps),
        trailing_eps: trailing_eps(listing, config.trailing_quarters),
    })
}

fn non_decreasing(series: &[f64]) -> bool {
    series.windows(2).all(|pair| pair[1] >= pair[0])
}

// mean of the period-over-period growth rates; periods starting from zero or below are skipped
fn average_growth(series: &[f64]) -> Option<f64> {
    let rates: Vec<f64> = series
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0] * 100.0)
        .collect();
    if rates.is_empty() {
        return None;
    }
    Some(rates.iter().sum::<f64>() / rates.len() as f64)
}

fn years_of_growth(series: &[f64]) -> usize {
    series
        .windows(2)
        .rev()
        .take_while(|pair| pair[1] > pair[0])
        .count()
}

fn trailing_eps(listing: &CompanyListing, quarters: usize) -> Option<f64> {
    let periods = listing.periods(PeriodType::Quarterly);
    if quarters == 0 || periods.len() < quarters {
        return None;
    }
    periods[periods.len() - quarters..]
        .iter()
        .map(|period| period.eps)
        .sum()
}

/// Renders survivors as the `--process` table.
pub fn table(screened: &[Screened]) -> String {
    let percent = |value: Option<f64>| match value {
        Some(value) => format!("{value:.1}"),
        None => "-".to_string(),
    };

    let mut out = format!(
        "{:<13} {:>7} {:>7} {:>7} {:>5} {:>7} {}",
        "symbol", "P/E", "rev%", "eps%", "years", "ttm eps", "name"
    )
    .bold()
    .to_string();
    out.push('\n');

    for stock in screened {
        let company = &stock.listing.company;
        out.push_str(&format!(
            "{:<13} {:>7.1} {:>7} {:>7} {:>5} {:>7} {}\n",
            company.symbol,
            stock.pe,
            percent(stock.revenue_growth),
            percent(stock.eps_growth),
            stock.years_of_revenue_growth.min(stock.years_of_eps_growth),
            stock
                .trailing_eps
                .map(|eps| format!("{eps:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            company.name
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_figures() {
        assert_eq!(average_growth(&[100.0, 110.0, 121.0]), Some(10.0));
        assert_eq!(average_growth(&[0.0, 5.0]), None);
        assert_eq!(years_of_growth(&[1.0, 2.0, 2.0, 3.0, 4.0]), 2);
        assert_eq!(years_of_growth(&[3.0, 2.0]), 0);
        assert!(non_decreasing(&[1.0, 1.0, 2.0]));
        assert!(!non_decreasing(&[2.0, 1.0]));
    }

    #[test]
    fn resource_industries_are_excluded() {
        let config = ScreenerConfig::default();
        assert!(config.is_excluded("Oil & Gas"));
        assert!(config.is_excluded("Precious metals & minerals"));
        assert!(config.is_excluded("Forestry & Wood Products"));
        assert!(!config.is_excluded("Restaurants"));
        assert!(!config.is_excluded("N/A"));
    }
}
