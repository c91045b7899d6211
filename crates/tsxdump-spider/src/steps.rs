use crate::config::Sources;
use crate::fetch::Fetch;
use crate::repo::Repository;
use crate::stock::{globe_and_mail, google_finance, tsx, yahoo_finance};
use crate::tui::Progress;
use crate::Result;
use std::fmt;
use tracing::{error, info, warn};

/// One pass over a source. A full run is every step, in [`Step::ALL`] order; later steps read the
/// companies the first one stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// TSX company directory; symbols and names.
    Companies,
    Industries,
    Prices,
    /// Quarterly and annual EPS and revenue.
    Financials,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::Companies,
        Step::Industries,
        Step::Prices,
        Step::Financials,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Companies => "companies",
            Step::Industries => "industries",
            Step::Prices => "prices",
            Step::Financials => "financials",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many pages or symbols a step got through, and how many it had to skip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    pub succeeded: usize,
    pub failed: usize,
}

impl StepReport {
    pub fn new(step: Step) -> Self {
        Self {
            step,
            succeeded: 0,
            failed: 0,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Tallies the outcome of one unit of work (`unit` names the page or symbol for the logs).
    /// Fatal errors are handed back so the caller can abort; everything else is counted and
    /// swallowed.
    pub(crate) fn record(
        &mut self,
        outcome: Result<()>,
        unit: &str,
        progress: &Progress,
    ) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.succeeded += 1;
                progress.succeed();
                Ok(())
            }
            Err(err) if err.is_fatal() => {
                error!("{} aborted at {unit}, error({err})", self.step);
                progress.finish();
                Err(err)
            }
            Err(err) => {
                warn!("{} skipped {unit}, error({err})", self.step);
                self.failed += 1;
                progress.fail();
                Ok(())
            }
        }
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} succeeded, {} failed",
            self.step, self.succeeded, self.failed
        )
    }
}

/// Run `steps` in order against `repo`. Stops at the first storage failure; any other failure is
/// only counted in that step's report.
pub async fn run<F: Fetch>(
    fetcher: &F,
    repo: &Repository,
    sources: &Sources,
    steps: &[Step],
    tui: bool,
) -> Result<Vec<StepReport>> {
    let time = std::time::Instant::now();

    let mut reports = Vec::with_capacity(steps.len());
    for step in steps {
        let report = match step {
            Step::Companies => tsx::scrape(fetcher, repo, sources, tui).await?,
            Step::Industries => globe_and_mail::scrape(fetcher, repo, sources, tui).await?,
            Step::Prices => yahoo_finance::scrape(fetcher, repo, sources, tui).await?,
            Step::Financials => google_finance::scrape(fetcher, repo, sources, tui).await?,
        };
        info!("{report}");
        reports.push(report);
    }

    info!("spider finished. {}", crate::time_elapsed(time));
    Ok(reports)
}
