pub mod reporting;
pub mod runner;
pub mod stats;
pub mod types;
pub mod verification;

pub use reporting::{
    ReportWriter, SampleLog, SampleRecord, print_sweep_summary, read_sample_log,
    rows_from_samples,
};
pub use runner::{SweepRunner, TrialPhase};
pub use stats::{AggregatedStats, aggregate};
pub use types::{HarnessConfig, ReportRow};
pub use verification::{ExactSkylineVerifier, OutputVerifier, dominates, skyline_indices};
