//! JSON-lines metrics sink.
//!
//! Writes one JSON object per line: a `"type": "period"` line per period
//! followed by a single `"type": "summary"` line.

use std::io::Write;

use serde::Serialize;

use crate::domain::{PeriodReport, RunSummary};
use crate::error::Result;
use crate::port::MetricsSink;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Line<'a> {
    Period(&'a PeriodReport),
    Summary(&'a RunSummary),
}

/// Writes reports as JSON lines to any writer.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    lines: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Lines written so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &Line<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }
}

impl<W: Write> MetricsSink for JsonLinesSink<W> {
    fn record(&mut self, report: &PeriodReport) -> Result<()> {
        self.write_line(&Line::Period(report))
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<()> {
        self.write_line(&Line::Summary(summary))?;
        self.writer.flush()?;
        Ok(())
    }
}
