pub mod errors;
pub mod naming;

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::PathBuf;

/// Kind of lexical container tracked during scope classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Class,
    Function,
    AsyncFunction,
}

impl ScopeKind {
    /// Short tag rendered into context strings, e.g. `handler(F)`.
    pub fn tag(&self) -> &'static str {
        match self {
            ScopeKind::Module => "M",
            ScopeKind::Class => "C",
            ScopeKind::Function => "F",
            ScopeKind::AsyncFunction => "AF",
        }
    }
}

/// One entry on the traversal-time scope stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeFrame {
    pub identifier: String,
    pub kind: ScopeKind,
}

impl ScopeFrame {
    pub fn new(identifier: impl Into<String>, kind: ScopeKind) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
        }
    }
}

impl fmt::Display for ScopeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.identifier, self.kind.tag())
    }
}

static TAG_SPANS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\(\[].*?[\)\]]").unwrap());

/// Turn a tagged context string into its public scope key: drop the
/// parenthesized/bracketed tag spans and spaces, then any leading separator
/// left behind when the enclosing context was empty.
pub fn normalize_scope_key(context: &str) -> String {
    let stripped = TAG_SPANS.replace_all(context, "");
    stripped
        .replace(' ', "")
        .trim_start_matches('.')
        .to_string()
}

/// One emitted metrics entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricsRow {
    pub path: PathBuf,
    pub qualified_name: String,
    pub own_complexity: u32,
    pub cumulative_complexity: u32,
    pub comment_lines: usize,
    pub logical_lines: usize,
}
