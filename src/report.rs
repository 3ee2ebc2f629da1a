//! Console reporting of search progress.
//!
//! One progress bar per pass, one `Set key=value` line per accepted change
//! with the candidate costs that justified it, in the spirit of
//! `Set IndentWidth=4 cost 210=>96 {4:96 2:180 8:195 3:210}`.

use std::cell::RefCell;

use crate::colors::Colors;
use crate::cost::MAX_COST;
use crate::progress::ProgressReporter;
use crate::search::{CandidateResult, SearchReporter};

pub struct ConsoleReporter {
    colors: Colors,
    quiet: bool,
    show_progress: bool,
    bar: RefCell<ProgressReporter>,
}

impl ConsoleReporter {
    pub fn new(colors: Colors, quiet: bool, show_progress: bool) -> Self {
        Self {
            colors,
            quiet,
            show_progress,
            bar: RefCell::new(ProgressReporter::disabled()),
        }
    }

    fn println(&self, line: &str) {
        if !self.quiet {
            self.bar.borrow().println(line);
        }
    }
}

/// Candidate costs sorted ascending, cheapest first. Poisoned candidates
/// show as `!` rather than a number.
fn costs_to_string(results: &[CandidateResult]) -> String {
    let mut sorted: Vec<&CandidateResult> = results.iter().collect();
    sorted.sort_by_key(|r| r.cost);
    let parts: Vec<String> = sorted
        .iter()
        .map(|r| {
            if r.cost == MAX_COST {
                format!("{}:!", r.value)
            } else {
                format!("{}:{}", r.value, r.cost)
            }
        })
        .collect();
    format!("{{{}}}", parts.join(" "))
}

impl SearchReporter for ConsoleReporter {
    fn pass_started(&self, pass: usize, options: usize) {
        *self.bar.borrow_mut() =
            ProgressReporter::new(pass, options as u64, self.show_progress && !self.quiet);
    }

    fn option_visited(&self, name: &str) {
        let bar = self.bar.borrow();
        bar.set_message(name);
        bar.inc();
    }

    fn option_decided(
        &self,
        name: &str,
        previous: &str,
        results: &[CandidateResult],
        chosen: &str,
        changed: bool,
    ) {
        if !changed {
            return;
        }
        let previous_cost = results
            .iter()
            .find(|r| r.value == previous)
            .map(|r| r.cost.to_string())
            .unwrap_or_else(|| "?".to_string());
        let best_cost = results
            .iter()
            .find(|r| r.value == chosen)
            .map(|r| r.cost)
            .unwrap_or(0);
        self.println(&format!(
            "{} cost {previous_cost}=>{best_cost} {}",
            self.colors.success(&format!("Set {name}={chosen}")),
            costs_to_string(results)
        ));
    }

    fn pass_finished(&self, pass: usize, changes: usize) {
        self.bar.borrow().finish();
        self.println(&format!("Pass {pass}: {changes} option(s) changed"));
    }
}
