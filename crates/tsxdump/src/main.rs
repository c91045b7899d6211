mod cli;
mod spider;

// remote imports
use clap::Parser;
use cli::{Cli, Command, TraceLevel};
use std::process::ExitCode;
use tracing::{debug, error, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;
use tsxdump_spider::config::Config;
use tsxdump_spider::model::dump_json;
use tsxdump_spider::repo::Repository;
use tsxdump_spider::screener::{self, ScreenerConfig};

////////////////////////////////////////////////////////////////////////////

// install the trace subscriber; logs go to stderr so `--dump` output stays clean JSON
fn preprocess(trace_level: Level) -> anyhow::Result<()> {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .with_writer(std::io::stderr)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        })?;
    }
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    let mut config = Config::from_env();
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Some(cache) = cli.cache {
        config.cache = Some(cache);
    }
    debug!("configuration: {config:?}");

    let repo = Repository::open(&config.database).await.map_err(|err| {
        error!("failed to open {:?}, error({err})", config.database);
        err
    })?;

    // read cli inputs
    let code = match cli.mode.command() {
        // `tsxdump --all | --companies | --industries | --prices | --financials`
        Command::Scrape(steps) => spider::run(&steps, &config, &repo, tui).await?,

        // `tsxdump --process`: screen the stored companies
        Command::Process => {
            let listings = repo.list_companies().await?;
            let screened = screener::filt(&listings, &ScreenerConfig::default());
            debug!(
                "{} of {} companies passed the screen",
                screened.len(),
                listings.len()
            );
            print!("{}", screener::table(&screened));
            ExitCode::SUCCESS
        }

        // `tsxdump --dump`: every stored company as JSON
        Command::Dump => {
            let listings = repo.list_companies().await?;
            println!("{}", dump_json(&listings)?);
            ExitCode::SUCCESS
        }
    };

    repo.close().await;
    Ok(code)
}
