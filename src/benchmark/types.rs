use super::stats::AggregatedStats;
use crate::Correlation;
use crate::configuration::Configuration;
use crate::dataset::DatasetFormat;
use crate::sweep_spec::DEFAULT_RUNS;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Trials per configuration, fixed for the whole sweep.
    pub runs: usize,
    /// Exchange file written by the generator and read by the algorithm.
    pub dataset_path: PathBuf,
    /// Where the algorithm writes its skyline indices.
    pub skyline_path: PathBuf,
    pub dataset_format: DatasetFormat,
    /// Check the skyline of the first trial of every exact configuration.
    pub verify: bool,
    /// Flush the dataset's filesystem before each timed run.
    pub sync_filesystem: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            dataset_path: PathBuf::from("dataset.bin"),
            skyline_path: PathBuf::from("skyline.csv"),
            dataset_format: DatasetFormat::Binary,
            verify: false,
            sync_filesystem: true,
        }
    }
}

/// One line of the results report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    pub algorithm: String,
    pub correlation_type: Correlation,
    pub cardinality: u64,
    pub dimensionality: u32,
    pub tolerance: f64,
    pub error_probability: f64,
    pub time_mean: f64,
    pub time_stdev: f64,
    pub count_mean: f64,
    pub count_stdev: f64,
}

impl ReportRow {
    pub const COLUMNS: [&'static str; 10] = [
        "algorithm",
        "correlation_type",
        "cardinality",
        "dimensionality",
        "tolerance",
        "error_probability",
        "time_mean",
        "time_stdev",
        "count_mean",
        "count_stdev",
    ];

    pub fn new(config: &Configuration, stats: &AggregatedStats) -> Self {
        let (tolerance, error_probability) = config.variant.report_values();
        Self {
            algorithm: config.algorithm.name.clone(),
            correlation_type: config.correlation,
            cardinality: config.cardinality,
            dimensionality: config.dimensionality,
            tolerance,
            error_probability,
            time_mean: stats.time_mean,
            time_stdev: stats.time_stdev,
            count_mean: stats.count_mean,
            count_stdev: stats.count_stdev,
        }
    }

    pub fn stats(&self) -> AggregatedStats {
        AggregatedStats {
            time_mean: self.time_mean,
            time_stdev: self.time_stdev,
            count_mean: self.count_mean,
            count_stdev: self.count_stdev,
        }
    }
}
