//! Recursive discovery of candidate source files.

use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// File-name suffix a candidate must carry.
pub const SOURCE_SUFFIX: &str = ".py";
/// The packaging script is never analyzed.
const PACKAGING_SCRIPT: &str = "setup.py";

pub struct FileWalker {
    root: PathBuf,
    skip: Vec<PathBuf>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            skip: Vec::new(),
        }
    }

    /// Relative subpaths excluded from the walk entirely.
    pub fn with_skip_paths(mut self, skip: Vec<PathBuf>) -> Self {
        self.skip = skip;
        self
    }

    /// Collect candidate files in walk order. The walk is a plain recursive
    /// traversal: no ignore-file or hidden-file filtering, sorted by file
    /// name for a stable order.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        if !name.ends_with(SOURCE_SUFFIX) || name == PACKAGING_SCRIPT {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        !self.skip.iter().any(|skip| relative.starts_with(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, rel: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x = 1\n").unwrap();
    }

    fn relative_names(dir: &TempDir, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn only_python_files_are_collected() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.py");
        touch(&dir, "b.txt");
        touch(&dir, "pkg/c.py");
        let files = FileWalker::new(dir.path().to_path_buf()).walk().unwrap();
        assert_eq!(relative_names(&dir, &files), vec!["a.py", "pkg/c.py"]);
    }

    #[test]
    fn packaging_script_is_always_excluded() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "setup.py");
        touch(&dir, "pkg/setup.py");
        touch(&dir, "keep.py");
        let files = FileWalker::new(dir.path().to_path_buf()).walk().unwrap();
        assert_eq!(relative_names(&dir, &files), vec!["keep.py"]);
    }

    #[test]
    fn skip_paths_prune_whole_subtrees() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "keep/a.py");
        touch(&dir, "vendor/b.py");
        touch(&dir, "vendor/deep/c.py");
        let files = FileWalker::new(dir.path().to_path_buf())
            .with_skip_paths(vec![PathBuf::from("vendor")])
            .walk()
            .unwrap();
        assert_eq!(relative_names(&dir, &files), vec!["keep/a.py"]);
    }

    #[test]
    fn hidden_directories_are_not_filtered() {
        let dir = TempDir::new().unwrap();
        touch(&dir, ".tools/a.py");
        let files = FileWalker::new(dir.path().to_path_buf()).walk().unwrap();
        assert_eq!(relative_names(&dir, &files), vec![".tools/a.py"]);
    }
}
