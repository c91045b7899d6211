use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Industry stored for companies the industry source has nothing on.
pub const UNKNOWN_INDUSTRY: &str = "N/A";

/// Exchange qualifier carried by every stored symbol, e.g. `TSE:AW`.
pub const EXCHANGE_PREFIX: &str = "TSE:";

// company
// ----------------------------------------------------------------------------

/// A listed company, keyed by its exchange-qualified symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub symbol: String,
    pub name: String,
    pub industry: String,
}

impl Company {
    /// A company whose industry is not known yet.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            industry: UNKNOWN_INDUSTRY.to_string(),
        }
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = industry.into();
        self
    }

    pub fn industry_known(&self) -> bool {
        self.industry != UNKNOWN_INDUSTRY
    }
}

/// The symbol without its exchange qualifier; `TSE:AW.UN` gives `AW.UN`.
pub(crate) fn ticker(symbol: &str) -> &str {
    match symbol.get(..EXCHANGE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(EXCHANGE_PREFIX) => {
            &symbol[EXCHANGE_PREFIX.len()..]
        }
        _ => symbol,
    }
}

// price
// ----------------------------------------------------------------------------

/// The latest quote for a symbol. Only one is kept; each price scrape overwrites it.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRecord {
    pub symbol: String,
    /// `None` when the source returned no usable quote.
    pub price: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

// financials
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodType {
    Quarterly,
    Annual,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Quarterly => "quarterly",
            PeriodType::Annual => "annual",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quarterly" => Ok(PeriodType::Quarterly),
            "annual" => Ok(PeriodType::Annual),
            other => Err(format!("unknown period type \"{other}\"")),
        }
    }
}

/// One column of an income statement. Stored per symbol, keyed by `(period_type, period_end)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FinancialPeriod {
    pub period_type: PeriodType,
    pub period_end: NaiveDate,
    pub eps: Option<f64>,
    pub revenue: Option<f64>,
}

// listing
// ----------------------------------------------------------------------------

/// A company joined with everything stored against it.
#[derive(Clone, Debug, PartialEq)]
pub struct CompanyListing {
    pub company: Company,
    pub price: Option<PriceRecord>,
    /// Ordered by period type, then period end.
    pub financials: Vec<FinancialPeriod>,
}

impl CompanyListing {
    pub fn new(company: Company) -> Self {
        Self {
            company,
            price: None,
            financials: Vec::new(),
        }
    }

    /// Latest quote, if one was stored and usable.
    pub fn latest_price(&self) -> Option<f64> {
        self.price.as_ref().and_then(|price| price.price)
    }

    /// Periods of one type, oldest first.
    pub fn periods(&self, period_type: PeriodType) -> Vec<&FinancialPeriod> {
        let mut periods: Vec<&FinancialPeriod> = self
            .financials
            .iter()
            .filter(|period| period.period_type == period_type)
            .collect();
        periods.sort_by_key(|period| period.period_end);
        periods
    }
}

/// Serializes listings as the `--dump` JSON array: `symbol`, `name` and `industry` per company.
pub fn dump_json(listings: &[CompanyListing]) -> serde_json::Result<String> {
    let companies: Vec<&Company> = listings.iter().map(|listing| &listing.company).collect();
    serde_json::to_string(&companies)
}
