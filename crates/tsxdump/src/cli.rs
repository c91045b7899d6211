use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;
use tsxdump_spider::steps::Step;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub mode: Mode,

    /// Sets the level of tracing.
    ///
    /// Without it, progress bars are drawn instead of logs.
    #[arg(short, long)]
    pub trace: Option<TraceLevel>,

    /// SQLite database file [env: TSXDUMP_DATABASE, default: tsxdump.db].
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Directory to cache fetched pages in [env: TSXDUMP_CACHE].
    #[arg(long)]
    pub cache: Option<PathBuf>,
}

/// Exactly one mode runs per invocation.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Mode {
    /// Scrape companies, industries, prices and financials, in that order.
    #[arg(long)]
    pub all: bool,

    /// Scrape the TSX company directory only.
    #[arg(long)]
    pub companies: bool,

    /// Scrape industries of the stored companies only.
    #[arg(long)]
    pub industries: bool,

    /// Scrape prices of the stored companies only.
    #[arg(long)]
    pub prices: bool,

    /// Scrape financial statements of the stored companies only.
    #[arg(long)]
    pub financials: bool,

    /// Print the table of companies passing the growth & valuation screen.
    #[arg(long)]
    pub process: bool,

    /// Print every stored company as JSON.
    #[arg(long)]
    pub dump: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Scrape(Vec<Step>),
    Process,
    Dump,
}

impl Mode {
    pub fn command(&self) -> Command {
        if self.process {
            Command::Process
        } else if self.dump {
            Command::Dump
        } else if self.companies {
            Command::Scrape(vec![Step::Companies])
        } else if self.industries {
            Command::Scrape(vec![Step::Industries])
        } else if self.prices {
            Command::Scrape(vec![Step::Prices])
        } else if self.financials {
            Command::Scrape(vec![Step::Financials])
        } else {
            Command::Scrape(Step::ALL.to_vec())
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tsxdump").chain(args.iter().copied()))
    }

    #[test]
    fn modes_map_to_commands() {
        assert_eq!(
            parse(&["--all"]).unwrap().mode.command(),
            Command::Scrape(Step::ALL.to_vec())
        );
        assert_eq!(
            parse(&["--prices"]).unwrap().mode.command(),
            Command::Scrape(vec![Step::Prices])
        );
        assert_eq!(parse(&["--process"]).unwrap().mode.command(), Command::Process);
        assert_eq!(
            parse(&["--dump", "--trace", "DEBUG"]).unwrap().mode.command(),
            Command::Dump
        );
    }

    #[test]
    fn modes_are_exclusive_and_required() {
        assert!(parse(&["--all", "--dump"]).is_err());
        assert!(parse(&[]).is_err());
        assert!(parse(&["--everything"]).is_err());
    }
}
