use crate::benchmark::runner::TrialPhase;
use thiserror::Error;
use std::path::PathBuf;

pub type SweepResult<T> = std::result::Result<T, SweepError>;

/// Everything that can abort a sweep.
///
/// Nothing here is retried: a failed trial would bias the aggregates, so the
/// runner stops at the first error and leaves already flushed rows in place.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The sweep file or harness settings violate an invariant.
    #[error("invalid sweep specification: {0}")]
    Spec(String),

    #[error("failed to parse sweep file {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The dataset generator exited abnormally or its output could not be stored.
    #[error("dataset generation failed: {0}")]
    GenerationFailed(String),

    /// The algorithm process exited with a non-zero status or was killed.
    #[error("{program:?} exited with {status}: {stderr}")]
    InvocationFailed {
        program: PathBuf,
        status: String,
        stderr: String,
    },

    /// The algorithm exited cleanly but did not print `<time> <comparisons>`.
    #[error("{program:?} printed a malformed report {output:?}: {reason}")]
    MalformedReport {
        program: PathBuf,
        output: String,
        reason: String,
    },

    #[error("skyline verification failed: {0}")]
    VerificationFailed(String),

    #[error("cannot aggregate an empty sample")]
    EmptySample,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A failure inside the trial loop, tagged with where it happened.
    #[error("{configuration}: run {run}/{runs} failed while {phase}")]
    Trial {
        configuration: String,
        run: usize,
        runs: usize,
        phase: TrialPhase,
        #[source]
        source: Box<SweepError>,
    },
}

impl SweepError {
    pub fn spec(message: impl Into<String>) -> Self {
        Self::Spec(message.into())
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationFailed(message.into())
    }

    pub fn verification(message: impl Into<String>) -> Self {
        Self::VerificationFailed(message.into())
    }
}
