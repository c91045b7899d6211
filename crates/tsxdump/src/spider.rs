use std::process::ExitCode;
use tracing::{error, info};
use tsxdump_spider as spider;
use tsxdump_spider::config::Config;
use tsxdump_spider::fetch::HttpFetcher;
use tsxdump_spider::repo::Repository;
use tsxdump_spider::steps::{Step, StepReport};

/// Run the scrape `steps` against the network, print a summary line per step, and fail the
/// process if any page or symbol was skipped.
pub(crate) async fn run(
    steps: &[Step],
    config: &Config,
    repo: &Repository,
    tui: bool,
) -> anyhow::Result<ExitCode> {
    let fetcher = HttpFetcher::new(config).await?;

    // start collecting data
    let time = std::time::Instant::now();
    let reports = spider::steps::run(&fetcher, repo, &config.sources, steps, tui)
        .await
        .map_err(|err| {
            error!("spider aborted, error({err})");
            err
        })?;

    for report in &reports {
        println!("{report}");
    }
    info!(
        "spider finished collecting data, time elapsed: {:?}",
        time.elapsed()
    );

    if reports.iter().all(StepReport::is_clean) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
