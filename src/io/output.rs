//! Row emission.

use crate::core::MetricsRow;
use std::io::Write;

pub trait MetricsWriter {
    /// Write one file's complete row set. Called once per successful file.
    fn write_rows(&mut self, rows: &[MetricsRow]) -> anyhow::Result<()>;
}

/// `::`-delimited plain-text rows, one entity per line, flushed per file.
pub struct DelimitedWriter<W: Write> {
    writer: W,
}

impl<W: Write> DelimitedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> MetricsWriter for DelimitedWriter<W> {
    fn write_rows(&mut self, rows: &[MetricsRow]) -> anyhow::Result<()> {
        for row in rows {
            writeln!(
                self.writer,
                "{}::{}::{}::{}::{}::{}",
                row.path.display(),
                row.qualified_name,
                row.own_complexity,
                row.cumulative_complexity,
                row.comment_lines,
                row.logical_lines
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
