//! Per-scope complexity and line metrics for Python source trees.
//!
//! For every lexical container in a file (module, class, function) the
//! scanner reports a decision-point complexity score and comment/logical
//! line counts, aggregated from innermost scopes outward, one row per
//! surviving entity.

pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod metrics;

pub use crate::analyzers::PythonAnalyzer;
pub use crate::config::ScanConfig;
pub use crate::core::errors::{FileError, FileResult};
pub use crate::core::{MetricsRow, ScopeFrame, ScopeKind};
pub use crate::metrics::rollup::{aggregate_complexity, aggregate_line_counts};
