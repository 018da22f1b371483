//! Fixed legacy-dialect rewrite, attempted once when the initial parse
//! fails.
//!
//! This is a black-box, line-oriented source-to-source pass covering the
//! legacy constructs that dominate in practice: print statements,
//! comma-bound exception handlers, the old inequality operator, and
//! backtick repr. It is not a general dialect converter; a rewrite that
//! still does not parse classifies the file as a parse failure.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct NormalizeError(String);

static PRINT_CHEVRON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)print\s*>>\s*([\w.]+)\s*,\s*(.+?)\s*$").unwrap());
static PRINT_STMT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)print\s+(.+?)\s*$").unwrap());
static PRINT_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)print\s*$").unwrap());
static EXCEPT_TUPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)except\s+(.+?)\s*,\s*([A-Za-z_][A-Za-z0-9_]*)\s*:(.*)$").unwrap()
});
static BACKTICK_REPR: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Rewrite legacy-dialect constructs line by line.
///
/// Fails on indentation the legacy tokenizer would reject (a tab directly
/// following a space inside leading whitespace); everything else is
/// rewritten best-effort and judged by the re-parse.
pub fn rewrite_legacy_source(source: &str) -> Result<String, NormalizeError> {
    let mut rewritten = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if has_inconsistent_indentation(line) {
            return Err(NormalizeError(format!(
                "inconsistent use of tabs and spaces on line {}",
                index + 1
            )));
        }
        rewritten.push(rewrite_line(line));
    }
    Ok(rewritten.join("\n"))
}

fn rewrite_line(line: &str) -> String {
    let mut out = line.replace("<>", "!=");
    out = BACKTICK_REPR.replace_all(&out, "repr($1)").into_owned();

    if let Some(caps) = EXCEPT_TUPLE.captures(&out) {
        return format!("{}except {} as {}:{}", &caps[1], &caps[2], &caps[3], &caps[4]);
    }
    if let Some(caps) = PRINT_CHEVRON.captures(&out) {
        return format!("{}print({}, file={})", &caps[1], &caps[3], &caps[2]);
    }
    if let Some(caps) = PRINT_STMT.captures(&out) {
        return format!("{}print({})", &caps[1], &caps[2]);
    }
    if let Some(caps) = PRINT_BARE.captures(&out) {
        return format!("{}print()", &caps[1]);
    }
    out
}

fn has_inconsistent_indentation(line: &str) -> bool {
    let indent: &str = &line[..line.len() - line.trim_start().len()];
    indent.contains(" \t")
}
