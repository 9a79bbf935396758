#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use skysweep::process::{ProcessOutput, ProcessRunner};
use skysweep::sweep_spec::{AlgorithmSpec, BaseAxes, VariantAxes};
use skysweep::{Correlation, DatasetGenerator, HarnessConfig, SweepError, SweepResult};

/// Shared ordered log of everything the fakes were asked to do.
pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Writes a tiny placeholder dataset and records each call.
pub struct FakeGenerator {
    pub events: EventLog,
    pub fail_on_call: Option<usize>,
    calls: usize,
}

impl FakeGenerator {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            fail_on_call: None,
            calls: 0,
        }
    }

    pub fn failing_on(events: EventLog, call: usize) -> Self {
        Self {
            events,
            fail_on_call: Some(call),
            calls: 0,
        }
    }
}

impl DatasetGenerator for FakeGenerator {
    fn generate(
        &mut self,
        correlation: Correlation,
        cardinality: u64,
        dimensionality: u32,
        path: &Path,
    ) -> SweepResult<()> {
        self.calls += 1;
        self.events.borrow_mut().push(format!(
            "generate {} {} {}",
            correlation, cardinality, dimensionality
        ));
        if self.fail_on_call == Some(self.calls) {
            return Err(SweepError::generation("generator crashed"));
        }
        std::fs::write(path, format!("{} {} {}\n", correlation, cardinality, self.calls))?;
        Ok(())
    }

    fn description(&self) -> String {
        "fake generator".to_string()
    }
}

/// Answers each invocation with the next scripted output.
pub struct FakeRunner {
    pub events: EventLog,
    replies: RefCell<VecDeque<ProcessOutput>>,
    pub calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
}

impl FakeRunner {
    pub fn new(events: EventLog, replies: Vec<ProcessOutput>) -> Rc<Self> {
        Rc::new(Self {
            events,
            replies: RefCell::new(replies.into()),
            calls: RefCell::new(Vec::new()),
        })
    }

    /// Every invocation reports the given `(time, comparisons)` pairs in turn.
    pub fn reporting(events: EventLog, samples: &[(u64, u64)]) -> Rc<Self> {
        let replies = samples
            .iter()
            .map(|(t, c)| ProcessOutput::success(format!("{} {}\n", t, c)))
            .collect();
        Self::new(events, replies)
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ProcessOutput> {
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.events
            .borrow_mut()
            .push(format!("invoke {}", program.display()));
        self.calls
            .borrow_mut()
            .push((program.to_path_buf(), args));
        Ok(self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| ProcessOutput::failure(99, "no scripted reply left")))
    }
}

pub fn exact_algorithm(
    name: &str,
    correlation: Vec<Correlation>,
    cardinality: Vec<u64>,
    dimensionality: Vec<u32>,
) -> AlgorithmSpec {
    AlgorithmSpec {
        name: name.to_string(),
        program: PathBuf::from(format!("./{}", name)),
        args: Vec::new(),
        shape_args: false,
        axes: BaseAxes {
            correlation,
            cardinality,
            dimensionality,
        },
        variant: VariantAxes::Exact,
    }
}

pub fn approximate_algorithm(
    name: &str,
    correlation: Vec<Correlation>,
    cardinality: Vec<u64>,
    dimensionality: Vec<u32>,
    tolerance: Vec<f64>,
    error_probability: Vec<f64>,
) -> AlgorithmSpec {
    AlgorithmSpec {
        variant: VariantAxes::Approximate {
            tolerance,
            error_probability,
        },
        ..exact_algorithm(name, correlation, cardinality, dimensionality)
    }
}

pub fn harness_config(dir: &Path, runs: usize) -> HarnessConfig {
    HarnessConfig {
        runs,
        dataset_path: dir.join("dataset.bin"),
        skyline_path: dir.join("skyline.csv"),
        ..HarnessConfig::default()
    }
}
