use std::io::stderr;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use log::info;
use parking_lot::Mutex;
use xsqtools::pipeline::{NoProgress, ProgressObserver};

const BAR_TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} regions ({elapsed})";

/// Region progress drawn as a bar on a terminal
pub struct BarProgress {
    bar: ProgressBar,
}
impl BarProgress {
    pub fn new(sample: &str) -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)?
                .progress_chars("=> "),
        );
        bar.set_message(sample.to_string());
        Ok(Self { bar })
    }
}
impl ProgressObserver for BarProgress {
    fn on_progress(&self, done: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Region progress reported through the log every tenth of the sample
pub struct LogProgress {
    sample: String,
    last_decile: Mutex<usize>,
}
impl LogProgress {
    pub fn new(sample: &str) -> Self {
        Self {
            sample: sample.to_string(),
            last_decile: Mutex::new(0),
        }
    }
}
impl ProgressObserver for LogProgress {
    fn on_progress(&self, done: usize, total: usize) {
        let decile = (done * 10).checked_div(total).unwrap_or(10);
        let mut last = self.last_decile.lock();
        if decile > *last {
            *last = decile;
            info!("{}: {done}/{total} regions converted", self.sample);
        }
    }
}

/// Picks the observer for a sample: a bar on a terminal, log lines otherwise.
pub fn observer_for(sample: &str, quiet: bool) -> Box<dyn ProgressObserver> {
    if quiet {
        return Box::new(NoProgress);
    }
    if stderr().is_terminal() {
        if let Ok(bar) = BarProgress::new(sample) {
            return Box::new(bar);
        }
    }
    Box::new(LogProgress::new(sample))
}
