//////////////////////////////////////////////////////////////////
// schema
//////////////////////////////////////////////////////////////////

/// Run on every open; each statement is a no-op once the tables exist.
pub(crate) static SCHEMA: [&str; 3] = [
    "
    CREATE TABLE IF NOT EXISTS companies (
        symbol TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        industry TEXT NOT NULL DEFAULT 'N/A'
    )",
    "
    CREATE TABLE IF NOT EXISTS prices (
        symbol TEXT PRIMARY KEY REFERENCES companies (symbol),
        price REAL,
        fetched_at INTEGER NOT NULL
    )",
    "
    CREATE TABLE IF NOT EXISTS financials (
        symbol TEXT NOT NULL REFERENCES companies (symbol),
        period_type TEXT NOT NULL,
        period_end TEXT NOT NULL,
        eps REAL,
        revenue REAL,
        PRIMARY KEY (symbol, period_type, period_end)
    )",
];

//////////////////////////////////////////////////////////////////
// companies
//////////////////////////////////////////////////////////////////

/// `companies` is the master table; every other table references its `symbol`.
///
/// A known industry overwrites the stored one, an unknown (`?4`) one never does.
pub(crate) static UPSERT_COMPANY: &str = "
    INSERT INTO companies (symbol, name, industry)
    VALUES (?1, ?2, ?3)
    ON CONFLICT (symbol) DO UPDATE SET
        name = excluded.name,
        industry = CASE
            WHEN excluded.industry = ?4 THEN companies.industry
            ELSE excluded.industry
        END
";

pub(crate) static UPDATE_INDUSTRY: &str = "
    UPDATE companies SET industry = ?1
    WHERE symbol = ?2
";

pub(crate) static SELECT_COMPANIES: &str = "
    SELECT symbol, name, industry
    FROM companies
    ORDER BY rowid
";

//////////////////////////////////////////////////////////////////
// prices
//////////////////////////////////////////////////////////////////

/// Latest quote only; a rescrape replaces it.
pub(crate) static UPSERT_PRICE: &str = "
    INSERT INTO prices (symbol, price, fetched_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT (symbol) DO UPDATE SET
        price = excluded.price,
        fetched_at = excluded.fetched_at
";

//////////////////////////////////////////////////////////////////
// financials
//////////////////////////////////////////////////////////////////

pub(crate) static UPSERT_FINANCIAL: &str = "
    INSERT INTO financials (symbol, period_type, period_end, eps, revenue)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (symbol, period_type, period_end) DO UPDATE SET
        eps = excluded.eps,
        revenue = excluded.revenue
";

//////////////////////////////////////////////////////////////////
// listings
//////////////////////////////////////////////////////////////////

pub(crate) static SELECT_LISTINGS: &str = "
    SELECT c.symbol, c.name, c.industry, p.price, p.fetched_at
    FROM companies c
    LEFT JOIN prices p ON p.symbol = c.symbol
    ORDER BY c.rowid
";

pub(crate) static SELECT_FINANCIALS: &str = "
    SELECT symbol, period_type, period_end, eps, revenue
    FROM financials
    ORDER BY symbol, period_type, period_end
";
