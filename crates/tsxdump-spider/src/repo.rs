use crate::model::{
    Company, CompanyListing, FinancialPeriod, PeriodType, PriceRecord, UNKNOWN_INDUSTRY,
};
use crate::stock::sql;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, error, trace};

/// Owns the SQLite database. Built once at start-up and passed to whatever needs storage.
///
/// The pool holds a single connection; there is never more than one writer.
#[derive(Clone, Debug)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Open the database file at `path`, creating it and its schema if absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening database at {path:?}");
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        Self::connect(options).await
    }

    /// A private, empty database that lives as long as the repository.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|err| {
                error!("failed to connect to database, error({err})");
                err
            })?;

        for statement in sql::SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        trace!("database schema in place");

        Ok(Self { pool })
    }

    /// Waits for the connection to close; any later use of a clone of this repository fails.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // writes
    // ----------------------------------------------------------------------------

    pub async fn upsert_companies(&self, companies: &[Company]) -> Result<()> {
        let time = std::time::Instant::now();
        let mut transaction = self.pool.begin().await?;
        for company in companies {
            sqlx::query(sql::UPSERT_COMPANY)
                .bind(&company.symbol)
                .bind(&company.name)
                .bind(&company.industry)
                .bind(UNKNOWN_INDUSTRY)
                .execute(&mut *transaction)
                .await?;
            trace!("upserted [{}] {}", company.symbol, company.name);
        }
        transaction.commit().await?;

        debug!(
            "{} companies upserted. {}",
            companies.len(),
            crate::time_elapsed(time)
        );
        Ok(())
    }

    pub async fn upsert_industry(&self, symbol: &str, industry: &str) -> Result<()> {
        let result = sqlx::query(sql::UPDATE_INDUSTRY)
            .bind(industry)
            .bind(symbol)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::UnknownSymbol(symbol.to_string()));
        }
        trace!("[{symbol}] industry set to {industry}");
        Ok(())
    }

    pub async fn upsert_price(
        &self,
        symbol: &str,
        price: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(sql::UPSERT_PRICE)
            .bind(symbol)
            .bind(price)
            .bind(timestamp.timestamp())
            .execute(&self.pool)
            .await
            .map_err(|err| unknown_symbol(err, symbol))?;
        trace!("[{symbol}] price set to {price:?}");
        Ok(())
    }

    /// Upserts every period for `symbol` in one transaction.
    pub async fn upsert_financials(&self, symbol: &str, periods: &[FinancialPeriod]) -> Result<()> {
        let mut transaction = self.pool.begin().await?;
        for period in periods {
            sqlx::query(sql::UPSERT_FINANCIAL)
                .bind(symbol)
                .bind(period.period_type.as_str())
                .bind(period.period_end.to_string())
                .bind(period.eps)
                .bind(period.revenue)
                .execute(&mut *transaction)
                .await
                .map_err(|err| unknown_symbol(err, symbol))?;
        }
        transaction.commit().await?;

        trace!("[{symbol}] {} financial periods upserted", periods.len());
        Ok(())
    }

    // reads
    // ----------------------------------------------------------------------------

    /// Every stored company, in the order they were first stored.
    pub async fn companies(&self) -> Result<Vec<Company>> {
        let companies = sqlx::query(sql::SELECT_COMPANIES)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| {
                Ok(Company {
                    symbol: row.try_get("symbol")?,
                    name: row.try_get("name")?,
                    industry: row.try_get("industry")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(companies)
    }

    /// Every stored company with its latest price and financial history, in the order the
    /// companies were first stored. Absent prices and periods are left empty.
    pub async fn list_companies(&self) -> Result<Vec<CompanyListing>> {
        let time = std::time::Instant::now();

        let mut financials: HashMap<String, Vec<FinancialPeriod>> = HashMap::new();
        let mut rows = sqlx::query(sql::SELECT_FINANCIALS).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            let symbol: String = row.try_get("symbol")?;
            financials
                .entry(symbol)
                .or_default()
                .push(financial_period(&row)?);
        }
        drop(rows);

        let mut listings = Vec::new();
        let mut rows = sqlx::query(sql::SELECT_LISTINGS).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            let company = Company {
                symbol: row.try_get("symbol")?,
                name: row.try_get("name")?,
                industry: row.try_get("industry")?,
            };
            let fetched_at: Option<i64> = row.try_get("fetched_at")?;
            let price = match fetched_at {
                Some(secs) => Some(PriceRecord {
                    symbol: company.symbol.clone(),
                    price: row.try_get("price")?,
                    timestamp: DateTime::from_timestamp(secs, 0)
                        .ok_or_else(|| decode_error(format!("invalid timestamp {secs}")))?,
                }),
                None => None,
            };
            let financials = financials.remove(&company.symbol).unwrap_or_default();

            listings.push(CompanyListing {
                company,
                price,
                financials,
            });
        }

        debug!(
            "{} company listings read. {}",
            listings.len(),
            crate::time_elapsed(time)
        );
        Ok(listings)
    }
}

fn financial_period(row: &SqliteRow) -> Result<FinancialPeriod, sqlx::Error> {
    let period_type: String = row.try_get("period_type")?;
    let period_end: String = row.try_get("period_end")?;
    Ok(FinancialPeriod {
        period_type: PeriodType::from_str(&period_type).map_err(decode_error)?,
        period_end: NaiveDate::parse_from_str(&period_end, "%Y-%m-%d")
            .map_err(|err| decode_error(format!("invalid period end {period_end}, {err}")))?,
        eps: row.try_get("eps")?,
        revenue: row.try_get("revenue")?,
    })
}

fn decode_error(reason: String) -> sqlx::Error {
    sqlx::Error::Decode(reason.into())
}

// A write against a symbol missing from `companies` trips the foreign key.
fn unknown_symbol(err: sqlx::Error, symbol: &str) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            Error::UnknownSymbol(symbol.to_string())
        }
        _ => Error::Storage(err),
    }
}
