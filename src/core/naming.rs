//! Module-name derivation from file paths.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static MODULE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/?(__init__)?\.py[cwo]?").unwrap());

/// Derive the dotted module name for a source file.
///
/// The first search path that is a string prefix of the absolute file path
/// is stripped; the remainder has the package-init or source-file suffix
/// removed and its separators converted to dots. Paths that match no search
/// path keep their original spelling.
pub fn module_name(path: &Path, search_paths: &[PathBuf]) -> String {
    let file = slashed(&absolute(path));
    let mut trimmed = slashed(path);
    for base in search_paths {
        let base = slashed(&absolute(base));
        if file.starts_with(&base) {
            trimmed = file[base.len()..].to_string();
            break;
        }
    }

    let stripped = MODULE_SUFFIX.replace_all(&trimmed, "");
    stripped.trim_start_matches('/').replace('/', ".")
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
