//! Scan driver: walk the tree, analyze files (in parallel by default), and
//! emit each file's rows in walk order.

use anyhow::Result;
use log::debug;
use rayon::prelude::*;
use std::path::PathBuf;

use crate::analyzers::PythonAnalyzer;
use crate::config::ScanConfig;
use crate::core::MetricsRow;
use crate::io::output::{DelimitedWriter, MetricsWriter};
use crate::io::walker::FileWalker;

/// Run a scan and stream rows to stdout.
pub fn run_scan(config: ScanConfig) -> Result<()> {
    let stdout = std::io::stdout();
    let mut writer = DelimitedWriter::new(stdout.lock());
    scan_to_writer(&config, &mut writer)
}

/// Run a scan against any writer. Files are analyzed independently; a
/// failing file is logged and dropped without disturbing its neighbors,
/// and results are written in walk order regardless of worker scheduling.
pub fn scan_to_writer(config: &ScanConfig, writer: &mut impl MetricsWriter) -> Result<()> {
    let files = FileWalker::new(config.root.clone())
        .with_skip_paths(config.skip.clone())
        .walk()?;
    debug!("walk found {} candidate files", files.len());

    let analyzer = PythonAnalyzer::new(config.search_paths());
    let reports: Vec<Option<Vec<MetricsRow>>> = if !config.parallel {
        files.iter().map(|p| analyze_one(&analyzer, p)).collect()
    } else if config.jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()?;
        pool.install(|| files.par_iter().map(|p| analyze_one(&analyzer, p)).collect())
    } else {
        files.par_iter().map(|p| analyze_one(&analyzer, p)).collect()
    };

    for rows in reports.into_iter().flatten() {
        writer.write_rows(&rows)?;
    }
    Ok(())
}

fn analyze_one(analyzer: &PythonAnalyzer, path: &PathBuf) -> Option<Vec<MetricsRow>> {
    match analyzer.analyze_file(path) {
        Ok(rows) => Some(rows),
        Err(err) => {
            debug!("skipping {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct CollectingWriter(Vec<MetricsRow>);

    impl MetricsWriter for CollectingWriter {
        fn write_rows(&mut self, rows: &[MetricsRow]) -> Result<()> {
            self.0.extend(rows.iter().cloned());
            Ok(())
        }
    }

    fn config_for(dir: &TempDir) -> ScanConfig {
        ScanConfig {
            root: dir.path().to_path_buf(),
            skip: Vec::new(),
            extra_search_paths: Vec::new(),
            parallel: false,
            jobs: 0,
        }
    }

    #[test]
    fn failing_files_do_not_disturb_neighbors() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.py"), "def f(:\n").unwrap();
        fs::write(
            dir.path().join("fine.py"),
            "def g():\n    if x:\n        pass\n",
        )
        .unwrap();

        let mut writer = CollectingWriter(Vec::new());
        scan_to_writer(&config_for(&dir), &mut writer).unwrap();

        assert_eq!(writer.0.len(), 1);
        assert_eq!(writer.0[0].qualified_name, "fine.g");
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let dir = TempDir::new().unwrap();
        for name in ["a.py", "b.py", "c.py"] {
            fs::write(
                dir.path().join(name),
                "def f():\n    if x:\n        pass\n",
            )
            .unwrap();
        }

        let mut sequential = CollectingWriter(Vec::new());
        scan_to_writer(&config_for(&dir), &mut sequential).unwrap();

        let parallel_config = ScanConfig {
            parallel: true,
            jobs: 2,
            ..config_for(&dir)
        };
        let mut parallel = CollectingWriter(Vec::new());
        scan_to_writer(&parallel_config, &mut parallel).unwrap();

        assert_eq!(sequential.0, parallel.0);
    }
}
