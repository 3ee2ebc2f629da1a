use indicatif::{ProgressBar, ProgressStyle};

pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// A bar over one search pass: `total` options, labelled with the pass
    /// number.
    pub fn new(pass: usize, total: u64, enabled: bool) -> Self {
        if !enabled || total == 0 {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} pass {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.set_prefix(pass.to_string());
        Self { bar: Some(bar) }
    }

    pub fn disabled() -> Self {
        Self { bar: None }
    }

    pub fn set_message(&self, msg: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(msg.to_string());
        }
    }

    pub fn inc(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    /// Print a line above the bar without tearing it.
    pub fn println(&self, line: &str) {
        match self.bar {
            Some(ref bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
