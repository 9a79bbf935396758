// Skyline Algorithm Sweep Harness

use serde::{Deserialize, Serialize};

/// Relationship between the dimensions of a synthetic dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correlation {
    Independent,
    Correlated,
    Anticorrelated,
}

impl Correlation {
    pub const ALL: [Correlation; 3] = [
        Correlation::Independent,
        Correlation::Correlated,
        Correlation::Anticorrelated,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Correlation::Independent => "independent",
            Correlation::Correlated => "correlated",
            Correlation::Anticorrelated => "anticorrelated",
        }
    }

    /// Switch understood by randdataset-style generators.
    pub fn generator_flag(&self) -> &'static str {
        match self {
            Correlation::Independent => "-i",
            Correlation::Correlated => "-c",
            Correlation::Anticorrelated => "-a",
        }
    }
}

impl std::fmt::Display for Correlation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Correlation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "independent" => Ok(Correlation::Independent),
            "correlated" => Ok(Correlation::Correlated),
            "anticorrelated" => Ok(Correlation::Anticorrelated),
            other => Err(format!("unknown correlation type '{}'", other)),
        }
    }
}

/// Outcome of a single trial as reported by the algorithm process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSample {
    /// Elapsed time in the unit the algorithm reports (milliseconds for the
    /// reference binaries).
    pub time: u64,
    /// Number of dominance comparisons performed.
    pub comparisons: u64,
}

impl std::fmt::Display for RawSample {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "time={}, comparisons={}", self.time, self.comparisons)
    }
}

// Implementations
pub mod benchmark;
pub mod configuration;
pub mod dataset;
pub mod error;
pub mod invoker;
pub mod process;
pub mod rand;
pub mod sweep_spec;

// Export the main types
pub use benchmark::{
    AggregatedStats, ExactSkylineVerifier, HarnessConfig, OutputVerifier, ReportRow,
    ReportWriter, SampleLog, SweepRunner, aggregate,
};
pub use configuration::{Configuration, VariantParams, configurations};
pub use dataset::{CommandGenerator, DatasetFormat, DatasetGenerator, SyntheticGenerator};
pub use error::{SweepError, SweepResult};
pub use invoker::AlgorithmInvoker;
pub use process::{ProcessOutput, ProcessRunner, SystemRunner};
pub use sweep_spec::{AlgorithmSpec, BaseAxes, SweepSpec, VariantAxes};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_names_round_trip() {
        for correlation in Correlation::ALL {
            assert_eq!(correlation.name().parse::<Correlation>(), Ok(correlation));
        }
        assert!("uniform".parse::<Correlation>().is_err());
    }

    #[test]
    fn correlation_generator_flags() {
        assert_eq!(Correlation::Independent.generator_flag(), "-i");
        assert_eq!(Correlation::Correlated.generator_flag(), "-c");
        assert_eq!(Correlation::Anticorrelated.generator_flag(), "-a");
    }
}
