use dotenv::var;
use std::path::PathBuf;

const DEFAULT_DATABASE: &str = "tsxdump.db";

/// Runtime settings, read from the environment (and `.env`) then overridden by the CLI.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database file; created on first run.
    pub database: PathBuf,

    /// Directory of cached page bodies. `None` disables the cache.
    pub cache: Option<PathBuf>,

    pub user_agent: String,

    pub sources: Sources,
}

impl Config {
    /// Reads `TSXDUMP_DATABASE`, `TSXDUMP_CACHE`, `USER_AGENT` and the `TSXDUMP_*_URL` source
    /// templates, falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            database: var("TSXDUMP_DATABASE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATABASE)),
            cache: var("TSXDUMP_CACHE").ok().map(PathBuf::from),
            user_agent: var("USER_AGENT")
                .unwrap_or_else(|_| format!("tsxdump/{}", env!("CARGO_PKG_VERSION"))),
            sources: Sources::from_env(),
        }
    }
}

/// URL templates of the four sources. Each carries one `{}` placeholder, filled with the page
/// letter (listing) or the symbol in the form that source expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sources {
    pub listing: String,
    pub industry: String,
    pub price: String,
    pub financials: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            listing: "https://www.tsx.com/json/company-directory/search/tsx/{}".to_string(),
            industry: "https://www.theglobeandmail.com/investing/markets/stocks/{}-T/profile/"
                .to_string(),
            price: "https://query1.finance.yahoo.com/v8/finance/chart/{}?range=1d&interval=1d"
                .to_string(),
            financials: "https://www.google.com/finance?q={}&fstype=ii".to_string(),
        }
    }
}

impl Sources {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listing: var("TSXDUMP_LISTING_URL").unwrap_or(defaults.listing),
            industry: var("TSXDUMP_INDUSTRY_URL").unwrap_or(defaults.industry),
            price: var("TSXDUMP_PRICE_URL").unwrap_or(defaults.price),
            financials: var("TSXDUMP_FINANCIALS_URL").unwrap_or(defaults.financials),
        }
    }

    pub fn listing_url(&self, page: char) -> String {
        self.listing.replacen("{}", &page.to_string(), 1)
    }

    pub fn industry_url(&self, symbol: &str) -> String {
        self.industry.replacen("{}", symbol, 1)
    }

    pub fn price_url(&self, symbol: &str) -> String {
        self.price.replacen("{}", symbol, 1)
    }

    pub fn financials_url(&self, symbol: &str) -> String {
        self.financials.replacen("{}", symbol, 1)
    }
}
