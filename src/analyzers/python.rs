//! Per-file metrics pipeline: decode, parse (with one legacy-rewrite
//! retry), run the two classification passes, aggregate, and assemble rows.

use line_numbers::LinePositions;
use rustpython_parser::{ast::Mod, ast::Stmt, parse, Mode};
use std::path::{Path, PathBuf};

use crate::analyzers::normalize;
use crate::core::errors::{FileError, FileResult};
use crate::core::{naming, MetricsRow};
use crate::io::reader;
use crate::metrics::lines::LineClassifier;
use crate::metrics::rollup::{
    aggregate_complexity, aggregate_line_counts, AggregatedComplexity, AggregatedLineCounts,
};
use crate::metrics::scope::ScopeClassifier;

/// Analyzes one Python file at a time; holds only the search-path list used
/// for module-name derivation. No state survives a file.
pub struct PythonAnalyzer {
    search_paths: Vec<PathBuf>,
}

/// Source text that made it through the parser, possibly after the legacy
/// rewrite. The line classifier must see the same text the tree came from.
struct ParsedSource {
    source: String,
    body: Vec<Stmt>,
}

impl PythonAnalyzer {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Produce the complete row set for one file, or a classified error.
    /// Nothing is emitted for a failing file.
    pub fn analyze_file(&self, path: &Path) -> FileResult<Vec<MetricsRow>> {
        let bytes =
            std::fs::read(path).map_err(|e| FileError::unclassified(path, e.to_string()))?;
        let text = reader::decode_source(&bytes)
            .map_err(|e| FileError::unclassified(path, e.to_string()))?;
        let module = naming::module_name(path, &self.search_paths);
        let parsed = parse_source(text, path)?;
        extract_rows(path, &module, &parsed)
    }
}

/// Two-step parse contract: the plain parse first, then exactly one
/// normalized retry.
fn parse_source(text: String, path: &Path) -> FileResult<ParsedSource> {
    match try_parse(&text, path) {
        Ok(body) => Ok(ParsedSource { source: text, body }),
        Err(_) => try_parse_with_normalization(&text, path),
    }
}

fn try_parse(text: &str, path: &Path) -> Result<Vec<Stmt>, String> {
    let display = path.display().to_string();
    match parse(text, Mode::Module, &display) {
        Ok(Mod::Module(module)) => Ok(module.body),
        Ok(_) => Ok(Vec::new()),
        Err(err) => Err(err.to_string()),
    }
}

fn try_parse_with_normalization(text: &str, path: &Path) -> FileResult<ParsedSource> {
    let rewritten = normalize::rewrite_legacy_source(text)
        .map_err(|e| FileError::invalid_source(path, e.to_string()))?;
    match try_parse(&rewritten, path) {
        Ok(body) => Ok(ParsedSource {
            source: rewritten,
            body,
        }),
        Err(message) => Err(FileError::parse_failure(path, message)),
    }
}

fn extract_rows(path: &Path, module: &str, parsed: &ParsedSource) -> FileResult<Vec<MetricsRow>> {
    let positions = LinePositions::from(parsed.source.as_str());
    let tables = ScopeClassifier::new(module, &positions).classify(&parsed.body);

    let lines: Vec<&str> = parsed.source.lines().collect();
    let tallies = LineClassifier::new(&tables.contexts, module).classify(&lines);

    let complexity = aggregate_complexity(tables.complexity);
    let line_counts = aggregate_line_counts(tallies);
    assemble_rows(path, module, &complexity, &line_counts)
}

/// Join the two aggregated maps into emitted rows. Every surviving
/// complexity key must have line counts: the construct that produced its
/// complexity is itself a logical line.
fn assemble_rows(
    path: &Path,
    module: &str,
    complexity: &AggregatedComplexity,
    line_counts: &AggregatedLineCounts,
) -> FileResult<Vec<MetricsRow>> {
    let mut rows = Vec::with_capacity(complexity.len());
    for (entity, counts) in complexity.iter() {
        if entity.is_empty() {
            continue;
        }
        let tally = line_counts.get(entity).ok_or_else(|| {
            FileError::unclassified(path, format!("no line counts recorded for scope {entity}"))
        })?;
        rows.push(MetricsRow {
            path: path.to_path_buf(),
            qualified_name: format!("{module}.{entity}"),
            own_complexity: counts.own,
            cumulative_complexity: counts.cumulative,
            comment_lines: tally.comment,
            logical_lines: tally.logical,
        });
    }
    rows.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn analyzer_for(dir: &TempDir) -> PythonAnalyzer {
        PythonAnalyzer::new(vec![dir.path().to_path_buf()])
    }

    #[test]
    fn single_function_with_conditional() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "single.py",
            indoc! {r#"
                def f(x):
                    if x:
                        return 1
                    return 0
            "#},
        );
        let rows = analyzer_for(&dir).analyze_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.qualified_name, "single.f");
        assert_eq!(row.own_complexity, 2);
        assert_eq!(row.cumulative_complexity, 2);
        assert_eq!(row.comment_lines, 0);
        assert_eq!(row.logical_lines, 4);
    }

    #[test]
    fn class_container_is_folded_away() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "shapes.py",
            indoc! {r#"
                class C:
                    def m1(self):
                        if a:
                            pass
                    def m2(self):
                        if b:
                            pass
            "#},
        );
        let rows = analyzer_for(&dir).analyze_file(&path).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["shapes.C.m1", "shapes.C.m2"]);
        assert!(rows.iter().all(|r| r.own_complexity == 2));
    }

    #[test]
    fn function_docstring_counts_as_comment() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "doc.py",
            indoc! {r#"
                def f():
                    """One-line docstring."""
                    if x:
                        pass
            "#},
        );
        let rows = analyzer_for(&dir).analyze_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].comment_lines, 1);
        assert_eq!(rows[0].logical_lines, 3);
    }

    #[test]
    fn empty_file_emits_no_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.py", "");
        let rows = analyzer_for(&dir).analyze_file(&path).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn module_level_branch_before_definitions_emits_a_module_row() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "top.py",
            indoc! {r#"
                if flag:
                    x = 1
                def f():
                    pass
            "#},
        );
        let rows = analyzer_for(&dir).analyze_file(&path).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.qualified_name.as_str()).collect();
        // The module-level scope keys to the module name itself, so its
        // emitted qualified name repeats it.
        assert_eq!(names, vec!["top.f", "top.top"]);
        let module_row = rows.iter().find(|r| r.qualified_name == "top.top").unwrap();
        assert_eq!(module_row.own_complexity, 1);
        assert_eq!(module_row.logical_lines, 2);
    }

    #[test]
    fn unparseable_file_is_a_parse_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "broken.py", "def f(:\n");
        let err = analyzer_for(&dir).analyze_file(&path).unwrap_err();
        assert!(matches!(err, FileError::ParseFailure { .. }));
    }

    #[test]
    fn legacy_print_parses_after_normalization() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "legacy.py",
            indoc! {r#"
                def report(x):
                    if x:
                        print x
            "#},
        );
        let rows = analyzer_for(&dir).analyze_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].qualified_name, "legacy.report");
        assert_eq!(rows[0].own_complexity, 2);
        assert_eq!(rows[0].logical_lines, 3);
    }

    #[test]
    fn mixed_indentation_is_an_invalid_source_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "mixed.py", "def f():\n \tprint x\n");
        let err = analyzer_for(&dir).analyze_file(&path).unwrap_err();
        assert!(matches!(err, FileError::InvalidSourceFile { .. }));
    }

    #[test]
    fn nested_scopes_fold_into_parents() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "nest.py",
            indoc! {r#"
                def outer():
                    if a:
                        pass
                    def inner():
                        if b:
                            pass
                    return inner
            "#},
        );
        let rows = analyzer_for(&dir).analyze_file(&path).unwrap();
        let outer = rows
            .iter()
            .find(|r| r.qualified_name == "nest.outer")
            .unwrap();
        let inner = rows
            .iter()
            .find(|r| r.qualified_name == "nest.outer.inner")
            .unwrap();
        assert_eq!(outer.own_complexity, 2);
        assert_eq!(outer.cumulative_complexity, 4);
        assert_eq!(inner.own_complexity, 2);
        assert_eq!(inner.cumulative_complexity, 2);
    }
}
