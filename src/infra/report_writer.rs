use std::io::Write;

use crate::app::ports::ReportSinkPort;
use crate::constants::SEPARATOR_WIDTH;
use crate::error::Result;
use crate::report::Table;

/// Writes report checkpoints as plain text to any writer (stdout in the binary)
pub struct WriterReportSink<W: Write> {
    out: W,
}

impl<W: Write> WriterReportSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl WriterReportSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ReportSinkPort for WriterReportSink<W> {
    fn write_section(&mut self, title: &str, table: &Table) -> Result<()> {
        writeln!(self.out, "\n{}\n", "=".repeat(SEPARATOR_WIDTH))?;
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}", table)?;
        self.out.flush()?;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line)?;
        Ok(())
    }
}
