//! Cost model: how much would this configuration reformat this file?
//!
//! The metric is the line-diff size between the original text and the
//! formatter's output: the number of inserted plus deleted lines.
//! Character distance over-penalizes single insertions that shift many
//! lines, and whole-file equality cannot rank near-miss configurations.

use similar::{ChangeTag, TextDiff};

use crate::config::StyleConfig;
use crate::corpus::SourceFile;
use crate::formatter::Formatter;

/// Sentinel cost of a failed formatter invocation. Aggregation saturates
/// on it, so a candidate with any failing file is never selected over one
/// that works everywhere.
pub const MAX_COST: u64 = u64::MAX;

/// Number of inserted plus deleted lines between `original` and
/// `formatted`. Zero iff the formatter reproduced the input exactly.
pub fn line_diff_cost(original: &str, formatted: &str) -> u64 {
    TextDiff::from_lines(original, formatted)
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .count() as u64
}

/// Cost of reformatting one file under a total configuration. A formatter
/// failure (rejected option combination, crash, timeout) degrades to
/// [`MAX_COST`] for this pair instead of aborting the run.
pub fn evaluate(formatter: &dyn Formatter, file: &SourceFile, config: &StyleConfig) -> u64 {
    match formatter.format(&file.path, &file.text, config) {
        Ok(formatted) => line_diff_cost(&file.text, &formatted),
        Err(_) => MAX_COST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::FormatterError;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_identical_text_costs_zero() {
        assert_eq!(line_diff_cost("int x;\nint y;\n", "int x;\nint y;\n"), 0);
    }

    #[test]
    fn test_changed_line_costs_delete_plus_insert() {
        assert_eq!(line_diff_cost("int x;\n", "int  x;\n"), 2);
    }

    #[test]
    fn test_added_line_costs_one() {
        assert_eq!(line_diff_cost("int x;\n", "int x;\n\n"), 1);
    }

    #[test]
    fn test_removed_lines_count() {
        assert_eq!(line_diff_cost("a\nb\nc\n", "a\n"), 2);
    }

    #[test]
    fn test_insertion_does_not_cascade_like_char_distance() {
        // one new line at the top shifts everything; the line diff still
        // charges a single line
        let original = "a\nb\nc\nd\n";
        let formatted = "x\na\nb\nc\nd\n";
        assert_eq!(line_diff_cost(original, formatted), 1);
    }

    struct Failing;
    impl Formatter for Failing {
        fn format(
            &self,
            _path: &Path,
            _source: &str,
            _config: &StyleConfig,
        ) -> Result<String, FormatterError> {
            Err(FormatterError::Exit {
                code: Some(1),
                stderr: "invalid combination".into(),
            })
        }
    }

    #[test]
    fn test_formatter_failure_degrades_to_sentinel() {
        let file = SourceFile {
            path: PathBuf::from("a.cpp"),
            text: "int x;\n".into(),
        };
        assert_eq!(evaluate(&Failing, &file, &StyleConfig::new()), MAX_COST);
    }
}
