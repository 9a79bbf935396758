use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use skysweep::benchmark::{
    ExactSkylineVerifier, HarnessConfig, ReportWriter, SampleLog, SweepRunner, print_sweep_summary,
};
use skysweep::sweep_spec::{DEFAULT_RUNS, SweepSpec};
use skysweep::{
    AlgorithmInvoker, CommandGenerator, DatasetFormat, DatasetGenerator, SyntheticGenerator,
    SystemRunner, configurations,
};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GeneratorKind {
    /// Generate datasets in-process
    Builtin,
    /// Run an external randdataset-style program
    Command,
}

#[derive(Parser, Debug)]
#[command(
    name = "skyline-sweep",
    version,
    about = "Benchmark external skyline algorithms over a parameter sweep"
)]
struct SweepArgs {
    /// Sweep specification (TOML)
    #[arg(short, long)]
    sweep: PathBuf,

    /// Trials per configuration; overrides the sweep file (default 100)
    #[arg(short, long)]
    runs: Option<usize>,

    /// Dataset exchange file
    #[arg(long, default_value = "dataset.bin")]
    dataset: PathBuf,

    /// Skyline file written by the algorithms
    #[arg(long, default_value = "skyline.csv")]
    skyline: PathBuf,

    /// Aggregated results report
    #[arg(long, default_value = "results.csv")]
    report: PathBuf,

    /// Also log every raw sample to this CSV file
    #[arg(long)]
    samples: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = GeneratorKind::Builtin)]
    generator: GeneratorKind,

    /// Generator program for `--generator command`
    #[arg(long, default_value = "./randdataset")]
    generator_program: PathBuf,

    /// Leading argument for the generator program (repeatable)
    #[arg(long = "generator-arg", allow_hyphen_values = true)]
    generator_args: Vec<String>,

    /// Encoding of the dataset exchange file
    #[arg(long, value_enum, default_value_t = DatasetFormat::Binary)]
    dataset_format: DatasetFormat,

    /// Seed for the built-in generator
    #[arg(long)]
    seed: Option<u64>,

    /// Only run these algorithms (comma-separated)
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Verify the skyline of the first run of every exact configuration
    #[arg(short, long)]
    verify: bool,

    /// Do not sync the filesystem after generating each dataset
    #[arg(long)]
    no_sync: bool,

    /// Print the configurations that would run and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = SweepArgs::parse();

    let mut spec = SweepSpec::load(&args.sweep)
        .with_context(|| format!("failed to load sweep file {:?}", args.sweep))?;
    if !args.only.is_empty() {
        spec = spec.select(&args.only)?;
    }

    if args.list {
        let mut count = 0;
        for config in configurations(&spec) {
            println!("{}", config);
            count += 1;
        }
        println!("{} configurations", count);
        return Ok(());
    }

    let config = HarnessConfig {
        runs: args.runs.or(spec.runs).unwrap_or(DEFAULT_RUNS),
        dataset_path: args.dataset.clone(),
        skyline_path: args.skyline.clone(),
        dataset_format: args.dataset_format,
        verify: args.verify,
        sync_filesystem: !args.no_sync,
    };

    let generator: Box<dyn DatasetGenerator> = match args.generator {
        GeneratorKind::Builtin => Box::new(SyntheticGenerator::new(args.seed, args.dataset_format)),
        GeneratorKind::Command => {
            if args.seed.is_some() {
                tracing::warn!("--seed has no effect on an external generator");
            }
            Box::new(CommandGenerator::new(
                args.generator_program.clone(),
                args.generator_args.clone(),
                Box::new(SystemRunner),
            ))
        }
    };

    // Opened before anything runs so an unwritable report fails fast.
    let mut report = ReportWriter::create(&args.report)
        .with_context(|| format!("failed to create report {:?}", args.report))?;

    let mut runner = SweepRunner::new(config, generator, AlgorithmInvoker::new(Box::new(SystemRunner)));
    if args.verify {
        runner.set_verifier(Box::new(ExactSkylineVerifier::new(args.dataset_format)));
    }
    if let Some(ref path) = args.samples {
        let file = File::create(path)
            .with_context(|| format!("failed to create sample log {:?}", path))?;
        runner.set_sample_log(SampleLog::from_writer(Box::new(file) as Box<dyn Write>));
    }

    let rows = runner.run_sweep(&spec, &mut report).with_context(|| {
        format!(
            "sweep aborted; {} completed rows kept in {:?}",
            report.rows_written(),
            args.report
        )
    })?;

    print_sweep_summary(&rows);
    println!("Report written to {:?}", args.report);

    Ok(())
}
