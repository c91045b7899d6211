use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Total / successes / failures bars for one scrape step; every bar is hidden outside tui mode.
pub(crate) struct Progress {
    _multi: Option<MultiProgress>,
    total: ProgressBar,
    success: ProgressBar,
    fails: ProgressBar,
}

impl Progress {
    pub(crate) fn new(len: usize, name: &str, tui: bool) -> Self {
        if !tui {
            return Self {
                _multi: None,
                total: ProgressBar::hidden(),
                success: ProgressBar::hidden(),
                fails: ProgressBar::hidden(),
            };
        }

        println!(
            "{bar}\n{name:^40}\n{bar}",
            bar = "=".repeat(40),
            name = name
        );

        // overall multi progress bar
        let multi = MultiProgress::new();

        // total number of units to collect
        let total = multi.add(ProgressBar::new(len as u64).with_style(style(
            "{spinner:.magenta}\n \
                {msg:>9.white} |{bar:57.white/grey}| {pos:<2} / {human_len} \
                ({percent_precise}%) [Time: {elapsed}, Rate: {per_sec}, ETA: {eta}]",
        )));
        total.set_message("total");
        total.enable_steady_tick(Duration::from_millis(100));

        // total successful collections
        let success = multi.insert_after(
            &total,
            ProgressBar::new(len as u64)
                .with_style(style(" {msg:>9.green} |{bar:57.green}| {pos:<2.green}")),
        );
        success.set_message("successes");

        // total failed collections
        let fails = multi.insert_after(
            &success,
            ProgressBar::new(len as u64)
                .with_style(style(" {msg:>9.red} |{bar:57.red}| {pos:<2.red}")),
        );
        fails.set_message("failures");

        Self {
            _multi: Some(multi),
            total,
            success,
            fails,
        }
    }

    pub(crate) fn succeed(&self) {
        self.total.inc(1);
        self.success.inc(1);
    }

    pub(crate) fn fail(&self) {
        self.total.inc(1);
        self.fails.inc(1);
    }

    pub(crate) fn finish(&self) {
        self.total.finish_and_clear();
        self.success.finish_and_clear();
        self.fails.finish_and_clear();
    }
}

// templates are literals; fall back to the plain bar rather than fail a scrape over styling
fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .map(|style| style.progress_chars("## "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
