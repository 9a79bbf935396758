use super::stats::aggregate;
use super::types::ReportRow;
use crate::configuration::Configuration;
use crate::error::{SweepError, SweepResult};
use crate::{Correlation, RawSample};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Streaming CSV report with the fixed [`ReportRow::COLUMNS`] schema.
///
/// The header is written and flushed on creation, and every appended row is
/// flushed immediately, so an interrupted sweep leaves a readable file.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl ReportWriter<File> {
    pub fn create(path: &Path) -> SweepResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn from_writer(inner: W) -> SweepResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(ReportRow::COLUMNS)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn append(&mut self, row: &ReportRow) -> SweepResult<()> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> SweepResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| SweepError::Io(e.into_error()))
    }
}

/// One raw trial outcome, as stored in the sample log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub algorithm: String,
    pub correlation_type: Correlation,
    pub cardinality: u64,
    pub dimensionality: u32,
    pub tolerance: f64,
    pub error_probability: f64,
    pub run: usize,
    pub time: u64,
    pub comparisons: u64,
}

impl SampleRecord {
    pub fn new(config: &Configuration, run: usize, sample: RawSample) -> Self {
        let (tolerance, error_probability) = config.variant.report_values();
        Self {
            algorithm: config.algorithm.name.clone(),
            correlation_type: config.correlation,
            cardinality: config.cardinality,
            dimensionality: config.dimensionality,
            tolerance,
            error_probability,
            run,
            time: sample.time,
            comparisons: sample.comparisons,
        }
    }

    fn same_configuration(&self, other: &SampleRecord) -> bool {
        self.algorithm == other.algorithm
            && self.correlation_type == other.correlation_type
            && self.cardinality == other.cardinality
            && self.dimensionality == other.dimensionality
            && self.tolerance == other.tolerance
            && self.error_probability == other.error_probability
    }
}

/// Optional log of every raw sample, written as the trials complete.
pub struct SampleLog<W: Write> {
    writer: csv::Writer<W>,
}

impl SampleLog<File> {
    pub fn create(path: &Path) -> SweepResult<Self> {
        Ok(Self::from_writer(File::create(path)?))
    }
}

impl<W: Write> SampleLog<W> {
    pub fn from_writer(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    pub fn record(&mut self, record: &SampleRecord) -> SweepResult<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> SweepResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| SweepError::Io(e.into_error()))
    }
}

pub fn read_sample_log<R: Read>(reader: R) -> SweepResult<Vec<SampleRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Rebuild report rows from a sample log. Consecutive records with the same
/// configuration form one row.
pub fn rows_from_samples(records: &[SampleRecord]) -> SweepResult<Vec<ReportRow>> {
    let mut rows = Vec::new();
    for group in records.chunk_by(|a, b| a.same_configuration(b)) {
        let samples: Vec<RawSample> = group
            .iter()
            .map(|r| RawSample {
                time: r.time,
                comparisons: r.comparisons,
            })
            .collect();
        let stats = aggregate(&samples)?;
        let first = &group[0];
        rows.push(ReportRow {
            algorithm: first.algorithm.clone(),
            correlation_type: first.correlation_type,
            cardinality: first.cardinality,
            dimensionality: first.dimensionality,
            tolerance: first.tolerance,
            error_probability: first.error_probability,
            time_mean: stats.time_mean,
            time_stdev: stats.time_stdev,
            count_mean: stats.count_mean,
            count_stdev: stats.count_stdev,
        });
    }
    Ok(rows)
}

/// Print a summary table of all completed configurations.
pub fn print_sweep_summary(rows: &[ReportRow]) {
    println!("\n{}", "=".repeat(140));
    println!("Skyline Sweep Results Summary");
    println!("{}", "=".repeat(140));
    println!(
        "{:<16} {:<15} {:>10} {:>4} {:>6} {:>8} {:>14} {:>14} {:>16} {:>16}",
        "Algorithm",
        "Correlation",
        "N",
        "D",
        "Tol",
        "ErrProb",
        "Time mean",
        "Time stdev",
        "Cmp mean",
        "Cmp stdev"
    );
    println!("{}", "-".repeat(140));

    for row in rows {
        println!(
            "{:<16} {:<15} {:>10} {:>4} {:>6} {:>8} {:>14.2} {:>14.2} {:>16.1} {:>16.1}",
            row.algorithm,
            row.correlation_type,
            row.cardinality,
            row.dimensionality,
            format_param(row.tolerance),
            format_param(row.error_probability),
            row.time_mean,
            row.time_stdev,
            row.count_mean,
            row.count_stdev,
        );
    }
    println!("{}", "=".repeat(140));
}

fn format_param(value: f64) -> String {
    if value == 0.0 {
        "-".to_string()
    } else {
        value.to_string()
    }
}
