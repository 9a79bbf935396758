use super::DatasetGenerator;
use crate::Correlation;
use crate::error::{SweepError, SweepResult};
use crate::process::ProcessRunner;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Delegates generation to an external randdataset-style program:
/// `<program> [args..] -i|-c|-a -n <cardinality> -d <dimensionality>`,
/// whose stdout is streamed into the dataset file.
pub struct CommandGenerator {
    program: PathBuf,
    args: Vec<String>,
    runner: Box<dyn ProcessRunner>,
}

impl CommandGenerator {
    pub fn new(program: PathBuf, args: Vec<String>, runner: Box<dyn ProcessRunner>) -> Self {
        Self {
            program,
            args,
            runner,
        }
    }

    fn command_args(&self, correlation: Correlation, cardinality: u64, dimensionality: u32) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(correlation.generator_flag().into());
        args.push("-n".into());
        args.push(cardinality.to_string().into());
        args.push("-d".into());
        args.push(dimensionality.to_string().into());
        args
    }
}

impl DatasetGenerator for CommandGenerator {
    fn generate(
        &mut self,
        correlation: Correlation,
        cardinality: u64,
        dimensionality: u32,
        path: &Path,
    ) -> SweepResult<()> {
        let args = self.command_args(correlation, cardinality, dimensionality);
        let file = File::create(path)?;
        let sink = file.try_clone()?;
        let output = match self.runner.run_to_file(&self.program, &args, sink) {
            Ok(output) => output,
            Err(e) => {
                discard(path);
                return Err(SweepError::generation(format!(
                    "cannot run {:?}: {}",
                    self.program, e
                )));
            }
        };
        if !output.is_success() {
            discard(path);
            return Err(SweepError::generation(format!(
                "{:?} exited with {}: {}",
                self.program,
                output.status_string(),
                output.stderr_tail()
            )));
        }
        if file.metadata()?.len() == 0 {
            discard(path);
            return Err(SweepError::generation(format!(
                "{:?} produced no data for n={}, d={}",
                self.program, cardinality, dimensionality
            )));
        }

        file.sync_all()?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("external generator {:?}", self.program)
    }
}

/// Drop a partial dataset so no trial can pick it up.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::debug!("could not remove {:?}: {}", path, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessOutput;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Scripted {
        reply: ProcessOutput,
        seen: RefCell<Vec<Vec<OsString>>>,
    }

    impl ProcessRunner for Scripted {
        fn run(&self, _program: &Path, args: &[OsString]) -> std::io::Result<ProcessOutput> {
            self.seen.borrow_mut().push(args.to_vec());
            Ok(self.reply.clone())
        }
    }

    fn scripted(reply: ProcessOutput) -> Rc<Scripted> {
        Rc::new(Scripted {
            reply,
            seen: RefCell::new(Vec::new()),
        })
    }

    #[test]
    fn test_writes_stdout_to_exchange_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.txt");
        let runner = scripted(ProcessOutput::success("0.1 0.9\n0.8 0.2\n"));
        let mut generator = CommandGenerator::new(
            PathBuf::from("./randdataset"),
            vec!["-s".to_string()],
            Box::new(Rc::clone(&runner)),
        );

        generator
            .generate(Correlation::Anticorrelated, 2, 2, &path)
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.1 0.9\n0.8 0.2\n");

        let seen = runner.seen.borrow();
        let args: Vec<String> = seen[0]
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["-s", "-a", "-n", "2", "-d", "2"]);
    }

    /// Only supports the streaming call.
    struct StreamOnly;

    impl ProcessRunner for StreamOnly {
        fn run(&self, _program: &Path, _args: &[OsString]) -> std::io::Result<ProcessOutput> {
            panic!("generator output must not be buffered");
        }

        fn run_to_file(
            &self,
            _program: &Path,
            _args: &[OsString],
            mut stdout: File,
        ) -> std::io::Result<ProcessOutput> {
            use std::io::Write;
            stdout.write_all(b"0.3 0.7\n")?;
            Ok(ProcessOutput::success(""))
        }
    }

    #[test]
    fn test_output_is_streamed_into_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.txt");
        let mut generator =
            CommandGenerator::new(PathBuf::from("./randdataset"), Vec::new(), Box::new(StreamOnly));
        generator
            .generate(Correlation::Independent, 1, 2, &path)
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.3 0.7\n");
    }

    #[test]
    fn test_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.txt");
        let runner = scripted(ProcessOutput::failure(1, "bad dimension"));
        let mut generator =
            CommandGenerator::new(PathBuf::from("./randdataset"), Vec::new(), Box::new(runner));

        let err = generator
            .generate(Correlation::Correlated, 10, 1, &path)
            .unwrap_err();
        assert!(matches!(err, SweepError::GenerationFailed(_)));
        assert!(err.to_string().contains("bad dimension"));
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_output_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let runner = scripted(ProcessOutput::success(""));
        let mut generator =
            CommandGenerator::new(PathBuf::from("./randdataset"), Vec::new(), Box::new(runner));
        assert!(
            generator
                .generate(Correlation::Independent, 10, 2, &dir.path().join("d"))
                .is_err()
        );
    }
}
