use chrono::{NaiveDate, Utc};
use tsxdump_spider::model::{Company, CompanyListing, FinancialPeriod, PeriodType, PriceRecord};
use tsxdump_spider::screener::{filt, table, ScreenerConfig};

// (year, revenue, eps) per annual period
fn listing(
    symbol: &str,
    industry: &str,
    price: Option<f64>,
    years: &[(i32, Option<f64>, Option<f64>)],
) -> CompanyListing {
    let mut listing =
        CompanyListing::new(Company::new(symbol, format!("{symbol} Inc.")).with_industry(industry));
    listing.price = Some(PriceRecord {
        symbol: symbol.to_string(),
        price,
        timestamp: Utc::now(),
    });
    listing.financials = years
        .iter()
        .map(|(year, revenue, eps)| FinancialPeriod {
            period_type: PeriodType::Annual,
            period_end: NaiveDate::from_ymd_opt(*year, 12, 31).unwrap(),
            eps: *eps,
            revenue: *revenue,
        })
        .collect();
    listing
}

fn growing(symbol: &str, industry: &str, price: f64) -> CompanyListing {
    listing(
        symbol,
        industry,
        Some(price),
        &[
            (2021, Some(100e6), Some(1.0)),
            (2022, Some(110e6), Some(1.5)),
            (2023, Some(125e6), Some(2.0)),
        ],
    )
}

fn symbols(companies: &[CompanyListing], config: &ScreenerConfig) -> Vec<String> {
    filt(companies, config)
        .into_iter()
        .map(|screened| screened.listing.company.symbol.clone())
        .collect()
}

#[test]
fn survivors_are_ordered_by_pe_then_symbol() {
    let companies = vec![
        growing("TSE:ZZZ", "Restaurants", 40.0), // P/E 20
        growing("TSE:BBB", "Software", 20.0),    // P/E 10
        growing("TSE:AAA", "Software", 40.0),    // P/E 20
    ];

    let screened = filt(&companies, &ScreenerConfig::default());
    assert_eq!(
        screened
            .iter()
            .map(|s| s.listing.company.symbol.as_str())
            .collect::<Vec<_>>(),
        vec!["TSE:BBB", "TSE:AAA", "TSE:ZZZ"]
    );
    assert_eq!(screened[0].pe, 10.0);
    assert_eq!(screened[0].years_of_revenue_growth, 2);
    let eps_growth = screened[0].eps_growth.unwrap();
    assert!((eps_growth - 41.667).abs() < 0.01, "eps growth {eps_growth}");
}

#[test]
fn screening_is_deterministic() {
    let companies = vec![
        growing("TSE:CCC", "Software", 30.0),
        growing("TSE:AAA", "Software", 30.0),
        growing("TSE:BBB", "Retail", 10.0),
        listing("TSE:DDD", "Retail", Some(5.0), &[(2023, Some(1.0), Some(1.0))]),
    ];
    let config = ScreenerConfig::default();

    let first = symbols(&companies, &config);
    for _ in 0..10 {
        assert_eq!(symbols(&companies, &config), first);
    }

    let mut reversed = companies.clone();
    reversed.reverse();
    assert_eq!(symbols(&reversed, &config), first);
}

#[test]
fn resource_sectors_never_survive() {
    let companies = vec![
        growing("TSE:OIL", "Oil & Gas", 1.0),
        growing("TSE:GLD", "Gold Mining", 1.0),
        growing("TSE:WOOD", "Forestry & Wood Products", 1.0),
        growing("TSE:FOOD", "Restaurants", 1.0),
    ];
    assert_eq!(
        symbols(&companies, &ScreenerConfig::default()),
        vec!["TSE:FOOD"]
    );
}

#[test]
fn single_annual_period_never_survives() {
    let companies = vec![listing(
        "TSE:ONE",
        "Software",
        Some(10.0),
        &[(2023, Some(100e6), Some(5.0))],
    )];
    assert!(symbols(&companies, &ScreenerConfig::default()).is_empty());

    // even when the minimum is configured lower
    let lenient = ScreenerConfig {
        min_annual_periods: 1,
        ..ScreenerConfig::default()
    };
    assert!(symbols(&companies, &lenient).is_empty());
}

#[test]
fn periods_missing_figures_do_not_count_toward_history() {
    let companies = vec![listing(
        "TSE:GAP",
        "Software",
        Some(10.0),
        &[(2022, Some(100e6), None), (2023, Some(110e6), Some(2.0))],
    )];
    assert!(symbols(&companies, &ScreenerConfig::default()).is_empty());
}

#[test]
fn latest_eps_is_judged_even_without_revenue() {
    let companies = vec![
        // EPS collapses in the newest year, whose revenue cell is blank
        listing(
            "TSE:DROP",
            "Software",
            Some(30.0),
            &[
                (2022, Some(100e6), Some(1.0)),
                (2023, Some(110e6), Some(1.5)),
                (2024, None, Some(0.1)),
            ],
        ),
        // newest year reports revenue but no EPS
        listing(
            "TSE:NOEPS",
            "Software",
            Some(30.0),
            &[
                (2022, Some(100e6), Some(1.0)),
                (2023, Some(110e6), Some(1.5)),
                (2024, Some(120e6), None),
            ],
        ),
        // a blank revenue cell mid-history still leaves a growing company
        listing(
            "TSE:GAPREV",
            "Software",
            Some(30.0),
            &[
                (2022, Some(100e6), Some(1.0)),
                (2023, None, Some(1.2)),
                (2024, Some(120e6), Some(1.5)),
            ],
        ),
    ];

    let screened = filt(&companies, &ScreenerConfig::default());
    assert_eq!(screened.len(), 1);
    assert_eq!(screened[0].listing.company.symbol, "TSE:GAPREV");
    assert_eq!(screened[0].pe, 20.0);
}

#[test]
fn shrinking_revenue_or_eps_is_excluded() {
    let companies = vec![
        listing(
            "TSE:REV",
            "Software",
            Some(10.0),
            &[(2022, Some(120e6), Some(1.0)), (2023, Some(110e6), Some(2.0))],
        ),
        listing(
            "TSE:EPS",
            "Software",
            Some(10.0),
            &[(2022, Some(100e6), Some(2.0)), (2023, Some(110e6), Some(1.0))],
        ),
        listing(
            "TSE:FLAT",
            "Software",
            Some(10.0),
            &[(2022, Some(100e6), Some(1.0)), (2023, Some(100e6), Some(1.0))],
        ),
    ];
    assert_eq!(
        symbols(&companies, &ScreenerConfig::default()),
        vec!["TSE:FLAT"]
    );
}

#[test]
fn undefined_or_high_pe_is_excluded() {
    let companies = vec![
        listing(
            "TSE:LOSS",
            "Software",
            Some(10.0),
            &[(2022, Some(100e6), Some(-2.0)), (2023, Some(110e6), Some(0.0))],
        ),
        listing(
            "TSE:NOPX",
            "Software",
            None,
            &[(2022, Some(100e6), Some(1.0)), (2023, Some(110e6), Some(2.0))],
        ),
        growing("TSE:RICH", "Software", 100.0), // P/E 50
        growing("TSE:FAIR", "Software", 99.0),  // P/E 49.5
    ];
    assert_eq!(
        symbols(&companies, &ScreenerConfig::default()),
        vec!["TSE:FAIR"]
    );

    let strict = ScreenerConfig {
        max_pe: 15.0,
        ..ScreenerConfig::default()
    };
    assert!(symbols(&companies, &strict).is_empty());
}

#[test]
fn table_lists_each_survivor() {
    let companies = vec![
        growing("TSE:AW", "Restaurants", 40.0),
        growing("TSE:OIL", "Oil & Gas", 1.0),
    ];
    let screened = filt(&companies, &ScreenerConfig::default());
    let rendered = table(&screened);

    let header = rendered.lines().next().unwrap();
    for column in ["symbol", "P/E", "rev%", "eps%", "years", "ttm eps", "name"] {
        assert!(header.contains(column), "missing column {column}");
    }
    assert!(rendered.contains("TSE:AW"));
    assert!(rendered.contains("TSE:AW Inc."));
    assert!(rendered.contains("20.0"));
    assert!(!rendered.contains("TSE:OIL"));
}
