//! Accumulated benchmark rows and the sinks they are flushed to.

use comfy_table::presets::ASCII_FULL;
use comfy_table::{Cell, CellAlignment, Table};

use super::benchmark_types::BenchRow;
use crate::errors::BenchmarkResult;

pub const REPORT_HEADERS: [&str; 6] = [
    "Mode",
    "N1 / N2 / M",
    "Data size (MiB)",
    "Total FLOP",
    "Duration (ns)",
    "GFLOPS",
];

/// Rows of one sweep phase, rendered as a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    title: String,
    rows: Vec<BenchRow>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> &[BenchRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: BenchRow) {
        self.rows.push(row);
    }

    /// Renders the rows as an aligned text table.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(ASCII_FULL)
            .set_header(REPORT_HEADERS.to_vec());

        for row in &self.rows {
            table.add_row(vec![
                Cell::new(&row.mode),
                Cell::new(row.shape),
                Cell::new(format!("{:.2}", row.data_size_mib)),
                Cell::new(row.total_flop),
                Cell::new(row.duration_ns),
                Cell::new(format!("{:.2}", row.gflops)),
            ]);
        }

        for index in 2..REPORT_HEADERS.len() {
            if let Some(column) = table.column_mut(index) {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }

        table.to_string()
    }

    /// Hands the report to `sink`, then clears it for the next phase.
    pub fn flush_into(&mut self, sink: &mut dyn ReportSink) -> BenchmarkResult<()> {
        sink.emit(self)?;
        self.rows.clear();
        Ok(())
    }
}

/// Destination of completed reports.
pub trait ReportSink {
    fn emit(&mut self, report: &Report) -> BenchmarkResult<()>;
}

/// Prints the title and table to standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn emit(&mut self, report: &Report) -> BenchmarkResult<()> {
        use std::io::Write;

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\n{}", report.title())?;
        writeln!(stdout, "{}", report.render())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Keeps a copy of every emitted report.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub reports: Vec<Report>,
}

impl ReportSink for RecordingSink {
    fn emit(&mut self, report: &Report) -> BenchmarkResult<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}
