//! Line classification: comment/documentation vs. logical lines, bucketed
//! per scope via the context table.
//!
//! This is a single-flag, line-local heuristic. It does not track true
//! lexical nesting: a triple-quoted literal that opens or closes mid-line
//! (for example one assigned to a variable) can leave the flag in the wrong
//! state for the rest of the file. Known limitation, kept as-is.

use super::ScopeLineCounts;
use crate::core::normalize_scope_key;

const COMMENT_MARKER: char = '#';
const DOUBLE_DELIM: &str = "\"\"\"";
const SINGLE_DELIM: &str = "'''";

pub struct LineClassifier<'a> {
    contexts: &'a [String],
    prefix: &'a str,
}

impl<'a> LineClassifier<'a> {
    pub fn new(contexts: &'a [String], prefix: &'a str) -> Self {
        Self { contexts, prefix }
    }

    /// Classify every raw source line into its scope's comment or logical
    /// tally. Blank lines and lines whose scope key resolves empty are
    /// skipped outright.
    pub fn classify(&self, lines: &[&str]) -> ScopeLineCounts {
        let mut counts = ScopeLineCounts::default();
        let mut inside_literal = false;

        for (index, raw) in lines.iter().enumerate() {
            let key = normalize_scope_key(self.context_for(index + 1));
            let line = raw.trim();

            if line.is_empty() || key.is_empty() {
                continue;
            }

            if line.starts_with(COMMENT_MARKER) {
                counts.tally_comment(key);
            } else if is_self_contained_literal(line) {
                counts.tally_comment(key);
            } else if line.starts_with(DOUBLE_DELIM) || line.starts_with(SINGLE_DELIM) {
                inside_literal = !inside_literal;
                counts.tally_comment(key);
            } else if inside_literal {
                counts.tally_comment(key);
            } else {
                counts.tally_logical(key);
            }
        }

        counts
    }

    /// Context for a 1-based line number. Lines past the table (trailing
    /// content the classifier never reached) fall back to the prefix.
    fn context_for(&self, line: usize) -> &str {
        self.contexts
            .get(line - 1)
            .map(String::as_str)
            .unwrap_or(self.prefix)
    }
}

/// A literal that opens and closes the same triple delimiter on one line,
/// with exactly six of the delimiter's quote character in total.
fn is_self_contained_literal(line: &str) -> bool {
    opens_and_closes(line, DOUBLE_DELIM, '"') || opens_and_closes(line, SINGLE_DELIM, '\'')
}

fn opens_and_closes(line: &str, delim: &str, quote: char) -> bool {
    line.starts_with(delim) && line.ends_with(delim) && line.matches(quote).count() == 6
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LineTally;

    fn tally(comment: usize, logical: usize) -> LineTally {
        LineTally { comment, logical }
    }

    fn run(contexts: &[&str], prefix: &str, lines: &[&str]) -> ScopeLineCounts {
        let owned: Vec<String> = contexts.iter().map(|c| c.to_string()).collect();
        LineClassifier::new(&owned, prefix).classify(lines)
    }

    #[test]
    fn comments_and_code_split_per_scope() {
        let counts = run(
            &["m", "f(F)", "f(F)", "f(F)"],
            "m",
            &["import os", "def f():", "    # guard", "    return 1"],
        );
        assert_eq!(counts.get("m"), Some(tally(0, 1)));
        assert_eq!(counts.get("f"), Some(tally(1, 2)));
    }

    #[test]
    fn blank_lines_touch_nothing() {
        let counts = run(&["m", "m", "m"], "m", &["x = 1", "   ", "y = 2"]);
        assert_eq!(counts.get("m"), Some(tally(0, 2)));
    }

    #[test]
    fn empty_context_lines_are_skipped() {
        let counts = run(&["m", "", ""], "m", &["x = 1", "y = 2", "# tail"]);
        assert_eq!(counts.get("m"), Some(tally(0, 1)));
        assert_eq!(counts.get(""), None);
    }

    #[test]
    fn self_contained_literal_is_one_comment_line() {
        let counts = run(&["m"], "m", &[r#""""standalone docstring""""#]);
        assert_eq!(counts.get("m"), Some(tally(1, 0)));
    }

    #[test]
    fn literal_with_inner_quotes_is_not_self_contained() {
        // Eight quote characters: falls through to the toggle rule.
        let counts = run(
            &["m", "m"],
            "m",
            &[r#""""has "inner" quotes""""#, "x = 1"],
        );
        assert_eq!(counts.get("m"), Some(tally(2, 0)));
    }

    #[test]
    fn multi_line_literal_toggles_the_flag() {
        let counts = run(
            &["f(F)"; 5],
            "m",
            &["def f():", r#"    """"#, "    body text", r#"    """"#, "    return 1"],
        );
        assert_eq!(counts.get("f"), Some(tally(3, 2)));
    }

    #[test]
    fn single_quoted_delimiters_behave_the_same() {
        let counts = run(
            &["m"; 3],
            "m",
            &["'''", "text", "'''"],
        );
        assert_eq!(counts.get("m"), Some(tally(3, 0)));
    }

    #[test]
    fn lines_past_the_table_fall_back_to_the_prefix() {
        let counts = run(&["m"], "m", &["x = 1", "y = 2"]);
        assert_eq!(counts.get("m"), Some(tally(0, 2)));
    }

    #[test]
    fn hash_comment_wins_over_literal_state() {
        let counts = run(
            &["m"; 4],
            "m",
            &[r#"""""#, "# still counted as comment", "text", r#"""""#],
        );
        assert_eq!(counts.get("m"), Some(tally(4, 0)));
    }
}
