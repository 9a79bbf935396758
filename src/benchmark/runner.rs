use super::reporting::{ReportWriter, SampleLog, SampleRecord};
use super::stats::{AggregatedStats, aggregate};
use super::types::{HarnessConfig, ReportRow};
use super::verification::OutputVerifier;
use crate::RawSample;
use crate::configuration::{Configuration, configurations};
use crate::dataset::DatasetGenerator;
use crate::error::{SweepError, SweepResult};
use crate::invoker::AlgorithmInvoker;
use crate::sweep_spec::SweepSpec;
use tracing::{debug, info, trace};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Where a trial is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialPhase {
    Pending,
    Generating,
    Invoking,
    Verifying,
    Collected,
    Done,
}

impl std::fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TrialPhase::Pending => "pending",
            TrialPhase::Generating => "generating the dataset",
            TrialPhase::Invoking => "invoking the algorithm",
            TrialPhase::Verifying => "verifying the skyline",
            TrialPhase::Collected => "collecting the sample",
            TrialPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Drives a sweep: one configuration at a time, one trial at a time.
///
/// The dataset exchange file has exactly one writer (the generator) and one
/// reader (the algorithm) per trial, so nothing here may overlap.
pub struct SweepRunner {
    config: HarnessConfig,
    generator: Box<dyn DatasetGenerator>,
    invoker: AlgorithmInvoker,
    verifier: Option<Box<dyn OutputVerifier>>,
    sample_log: Option<SampleLog<Box<dyn Write>>>,
}

impl SweepRunner {
    pub fn new(
        config: HarnessConfig,
        generator: Box<dyn DatasetGenerator>,
        invoker: AlgorithmInvoker,
    ) -> Self {
        Self {
            config,
            generator,
            invoker,
            verifier: None,
            sample_log: None,
        }
    }

    pub fn set_verifier(&mut self, verifier: Box<dyn OutputVerifier>) {
        self.verifier = Some(verifier);
    }

    pub fn set_sample_log(&mut self, log: SampleLog<Box<dyn Write>>) {
        self.sample_log = Some(log);
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every configuration of `spec` in enumeration order, appending one
    /// report row per configuration as soon as its trials complete.
    pub fn run_sweep<W: Write>(
        &mut self,
        spec: &SweepSpec,
        report: &mut ReportWriter<W>,
    ) -> SweepResult<Vec<ReportRow>> {
        if self.config.runs == 0 {
            return Err(SweepError::spec("runs must be at least 1"));
        }

        self.print_sweep_header(spec);

        let mut rows = Vec::new();
        for config in configurations(spec) {
            let stats = self.run_configuration(&config)?;
            let row = ReportRow::new(&config, &stats);
            report.append(&row)?;
            println!(
                "  {}: time {:.2} ± {:.2}, comparisons {:.1} ± {:.1}",
                config, stats.time_mean, stats.time_stdev, stats.count_mean, stats.count_stdev
            );
            rows.push(row);
        }

        info!("sweep complete: {} configurations reported", rows.len());
        Ok(rows)
    }

    fn print_sweep_header(&self, spec: &SweepSpec) {
        let total = configurations(spec).count();

        println!("\n=== SKYLINE SWEEP ===");
        println!("Dataset source: {}", self.generator.description());
        println!(
            "Algorithms: {}",
            spec.algorithms
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("Configurations: {}", total);
        println!("Runs per configuration: {}", self.config.runs);
        println!("Dataset file: {:?}", self.config.dataset_path);
        println!("Skyline file: {:?}", self.config.skyline_path);
        println!("Verify output: {}", self.config.verify);
        println!();
    }

    /// Run all trials of one configuration and reduce them. Any failure
    /// aborts the configuration; partial samples are dropped and never
    /// reach the sample log.
    pub fn run_configuration(&mut self, config: &Configuration) -> SweepResult<AggregatedStats> {
        let runs = self.config.runs;
        info!("{}: {} runs", config, runs);

        let mut samples: Vec<RawSample> = Vec::with_capacity(runs);
        for run in 1..=runs {
            trace!("{} run {}: {}", config, run, TrialPhase::Pending);
            let sample =
                self.run_trial(config, run)
                    .map_err(|(phase, source)| SweepError::Trial {
                        configuration: config.to_string(),
                        run,
                        runs,
                        phase,
                        source: Box::new(source),
                    })?;
            debug!("[{}/{}] {}: {}", run, runs, config, sample);
            samples.push(sample);
        }

        let stats = aggregate(&samples)?;

        // Only complete configurations reach the sample log.
        if let Some(log) = self.sample_log.as_mut() {
            for (index, sample) in samples.iter().enumerate() {
                log.record(&SampleRecord::new(config, index + 1, *sample))
                    .map_err(|source| SweepError::Trial {
                        configuration: config.to_string(),
                        run: index + 1,
                        runs,
                        phase: TrialPhase::Collected,
                        source: Box::new(source),
                    })?;
            }
        }
        trace!("{}: {}", config, TrialPhase::Done);
        Ok(stats)
    }

    fn run_trial(
        &mut self,
        config: &Configuration,
        run: usize,
    ) -> Result<RawSample, (TrialPhase, SweepError)> {
        let dataset = self.config.dataset_path.as_path();
        let skyline = self.config.skyline_path.as_path();

        trace!("{} run {}: {}", config, run, TrialPhase::Generating);
        self.generator
            .generate(
                config.correlation,
                config.cardinality,
                config.dimensionality,
                dataset,
            )
            .map_err(|e| (TrialPhase::Generating, e))?;
        if self.config.sync_filesystem {
            sync_filesystem(dataset).map_err(|e| (TrialPhase::Generating, e))?;
        }

        trace!("{} run {}: {}", config, run, TrialPhase::Invoking);
        let sample = self
            .invoker
            .invoke(config, dataset, skyline)
            .map_err(|e| (TrialPhase::Invoking, e))?;

        if self.config.verify && run == 1 {
            if let Some(ref verifier) = self.verifier {
                trace!("{} run {}: {}", config, run, TrialPhase::Verifying);
                verifier
                    .verify(config, dataset, skyline)
                    .map_err(|e| (TrialPhase::Verifying, e))?;
            }
        }

        trace!("{} run {}: {}", config, run, TrialPhase::Collected);
        Ok(sample)
    }
}

/// Flush dirty pages of the dataset's filesystem so writeback does not
/// overlap the timed algorithm run.
fn sync_filesystem(dataset: &Path) -> SweepResult<()> {
    let dir = match dataset.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir_fd = File::open(dir)
        .map_err(|e| SweepError::generation(format!("failed to open directory {:?}: {}", dir, e)))?;

    #[cfg(unix)]
    {
        use std::os::fd::AsRawFd;

        #[cfg(target_os = "linux")]
        let rc = unsafe { libc::syncfs(dir_fd.as_raw_fd()) };

        #[cfg(not(target_os = "linux"))]
        let rc = unsafe { libc::fsync(dir_fd.as_raw_fd()) };

        if rc != 0 {
            return Err(std::io::Error::last_os_error().into());
        }
    }
    #[cfg(not(unix))]
    drop(dir_fd);

    Ok(())
}
