use crate::RawSample;
use crate::configuration::Configuration;
use crate::error::{SweepError, SweepResult};
use crate::process::ProcessRunner;
use crate::sweep_spec::AlgorithmSpec;
use std::ffi::OsString;
use std::path::Path;

pub struct AlgorithmInvoker {
    runner: Box<dyn ProcessRunner>,
}

impl AlgorithmInvoker {
    pub fn new(runner: Box<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Run the configuration's algorithm on `dataset`, writing its skyline to
    /// `skyline`, and return the reported sample.
    pub fn invoke(
        &self,
        config: &Configuration,
        dataset: &Path,
        skyline: &Path,
    ) -> SweepResult<RawSample> {
        let args = algorithm_args(config, dataset, skyline);
        self.invoke_with(config.algorithm, &args)
    }

    /// Run `algorithm` with a fully assembled argument list.
    pub fn invoke_with(&self, algorithm: &AlgorithmSpec, args: &[OsString]) -> SweepResult<RawSample> {
        let output = self.runner.run(&algorithm.program, args)?;
        if !output.is_success() {
            return Err(SweepError::InvocationFailed {
                program: algorithm.program.clone(),
                status: output.status_string(),
                stderr: output.stderr_tail(),
            });
        }
        parse_report(&output.stdout).map_err(|reason| SweepError::MalformedReport {
            program: algorithm.program.clone(),
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
            reason,
        })
    }
}

/// `[leading args..] dataset skyline [cardinality dimensionality] [extra params..]`
pub fn algorithm_args(config: &Configuration, dataset: &Path, skyline: &Path) -> Vec<OsString> {
    let algorithm = config.algorithm;
    let mut args: Vec<OsString> = algorithm.args.iter().map(OsString::from).collect();
    args.push(dataset.as_os_str().to_owned());
    args.push(skyline.as_os_str().to_owned());
    if algorithm.shape_args {
        args.push(config.cardinality.to_string().into());
        args.push(config.dimensionality.to_string().into());
    }
    args.extend(config.variant.extra_params().into_iter().map(OsString::from));
    args
}

/// Parse `<elapsed_time> <comparison_count>` from an algorithm's stdout.
pub fn parse_report(stdout: &[u8]) -> Result<RawSample, String> {
    let text = std::str::from_utf8(stdout).map_err(|e| format!("output is not UTF-8: {}", e))?;
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(format!("expected 2 integers, found {} tokens", tokens.len()));
    }
    let time = tokens[0]
        .parse::<u64>()
        .map_err(|e| format!("bad elapsed time '{}': {}", tokens[0], e))?;
    let comparisons = tokens[1]
        .parse::<u64>()
        .map_err(|e| format!("bad comparison count '{}': {}", tokens[1], e))?;
    Ok(RawSample { time, comparisons })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Correlation;
    use crate::configuration::VariantParams;
    use crate::process::ProcessOutput;
    use crate::sweep_spec::{BaseAxes, VariantAxes};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(PathBuf, Vec<OsString>)>>,
        reply: RefCell<Option<ProcessOutput>>,
    }

    impl ProcessRunner for Recorder {
        fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ProcessOutput> {
            self.calls
                .borrow_mut()
                .push((program.to_path_buf(), args.to_vec()));
            Ok(self.reply.borrow().clone().unwrap_or_default())
        }
    }

    fn algorithm(shape_args: bool, approximate: bool) -> AlgorithmSpec {
        AlgorithmSpec {
            name: "noisy".to_string(),
            program: PathBuf::from("./noisy"),
            args: vec!["--quiet".to_string()],
            shape_args,
            axes: BaseAxes {
                correlation: vec![Correlation::Independent],
                cardinality: vec![1000],
                dimensionality: vec![4],
            },
            variant: if approximate {
                VariantAxes::Approximate {
                    tolerance: vec![0.2],
                    error_probability: vec![0.01],
                }
            } else {
                VariantAxes::Exact
            },
        }
    }

    fn config(algorithm: &AlgorithmSpec) -> Configuration<'_> {
        Configuration {
            algorithm,
            correlation: Correlation::Independent,
            cardinality: 1000,
            dimensionality: 4,
            variant: if algorithm.is_approximate() {
                VariantParams::Approximate {
                    tolerance: 0.2,
                    error_probability: 0.01,
                }
            } else {
                VariantParams::Exact
            },
        }
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_parse_report() {
        assert_eq!(
            parse_report(b"1500 342\n"),
            Ok(RawSample {
                time: 1500,
                comparisons: 342
            })
        );
        assert_eq!(
            parse_report(b"  7\t\n9 "),
            Ok(RawSample {
                time: 7,
                comparisons: 9
            })
        );
    }

    #[test]
    fn test_parse_report_rejects_malformed() {
        assert!(parse_report(b"").is_err());
        assert!(parse_report(b"1500").is_err());
        assert!(parse_report(b"1500 342 7").is_err());
        assert!(parse_report(b"1500 abc").is_err());
        assert!(parse_report(b"-3 10").is_err());
        assert!(parse_report(b"1.5 10").is_err());
        assert!(parse_report(&[0xff, 0xfe, b' ', b'1']).is_err());
    }

    #[test]
    fn test_argument_order_exact() {
        let alg = algorithm(false, false);
        let args = algorithm_args(&config(&alg), Path::new("data.bin"), Path::new("sky.csv"));
        assert_eq!(strings(&args), vec!["--quiet", "data.bin", "sky.csv"]);
    }

    #[test]
    fn test_argument_order_approximate_with_shape() {
        let alg = algorithm(true, true);
        let args = algorithm_args(&config(&alg), Path::new("data.bin"), Path::new("sky.csv"));
        assert_eq!(
            strings(&args),
            vec!["--quiet", "data.bin", "sky.csv", "1000", "4", "0.2", "0.01"]
        );
    }

    #[test]
    fn test_invoke_records_sample() {
        let recorder = Rc::new(Recorder::default());
        *recorder.reply.borrow_mut() = Some(ProcessOutput::success("1500 342\n"));
        let invoker = AlgorithmInvoker::new(Box::new(Rc::clone(&recorder)));

        let alg = algorithm(false, true);
        let sample = invoker
            .invoke(&config(&alg), Path::new("d"), Path::new("s"))
            .unwrap();
        assert_eq!(
            sample,
            RawSample {
                time: 1500,
                comparisons: 342
            }
        );

        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("./noisy"));
        assert_eq!(strings(&calls[0].1), vec!["--quiet", "d", "s", "0.2", "0.01"]);
    }

    #[test]
    fn test_nonzero_exit_is_fatal() {
        let recorder = Rc::new(Recorder::default());
        *recorder.reply.borrow_mut() = Some(ProcessOutput {
            code: Some(2),
            stdout: b"1500 342".to_vec(),
            stderr: b"segfault in dominance test".to_vec(),
        });
        let invoker = AlgorithmInvoker::new(Box::new(Rc::clone(&recorder)));
        let alg = algorithm(false, false);
        let err = invoker
            .invoke(&config(&alg), Path::new("d"), Path::new("s"))
            .unwrap_err();
        match err {
            SweepError::InvocationFailed { status, stderr, .. } => {
                assert_eq!(status, "exit status 2");
                assert!(stderr.contains("segfault"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_malformed_output_is_fatal() {
        let recorder = Rc::new(Recorder::default());
        *recorder.reply.borrow_mut() = Some(ProcessOutput::success("done in 15ms"));
        let invoker = AlgorithmInvoker::new(Box::new(Rc::clone(&recorder)));
        let alg = algorithm(false, false);
        let err = invoker
            .invoke(&config(&alg), Path::new("d"), Path::new("s"))
            .unwrap_err();
        assert!(matches!(err, SweepError::MalformedReport { .. }));
    }
}
