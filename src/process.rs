use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human readable exit status.
    pub fn status_string(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {}", code),
            None => "termination by signal".to_string(),
        }
    }

    /// Last few lines of stderr, for diagnostics.
    pub fn stderr_tail(&self) -> String {
        const TAIL_LINES: usize = 5;
        let text = String::from_utf8_lossy(&self.stderr);
        let lines: Vec<&str> = text.lines().collect();
        let start = lines.len().saturating_sub(TAIL_LINES);
        lines[start..].join(" | ")
    }
}

pub trait ProcessRunner {
    /// Run `program` with `args` to completion. Only failures to start or
    /// wait on the process are errors; a non-zero exit is reported in the
    /// returned output.
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ProcessOutput>;

    /// Like [`run`](Self::run), but stdout goes straight into `stdout`
    /// and the returned output carries none of it.
    fn run_to_file(
        &self,
        program: &Path,
        args: &[OsString],
        mut stdout: File,
    ) -> std::io::Result<ProcessOutput> {
        let mut output = self.run(program, args)?;
        stdout.write_all(&output.stdout)?;
        output.stdout.clear();
        Ok(output)
    }
}

/// Runs real child processes, blocking until they exit. No timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ProcessOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn run_to_file(
        &self,
        program: &Path,
        args: &[OsString],
        stdout: File,
    ) -> std::io::Result<ProcessOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::piped())
            .output()?;
        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: Vec::new(),
            stderr: output.stderr,
        })
    }
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for Box<T> {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ProcessOutput> {
        (**self).run(program, args)
    }

    fn run_to_file(
        &self,
        program: &Path,
        args: &[OsString],
        stdout: File,
    ) -> std::io::Result<ProcessOutput> {
        (**self).run_to_file(program, args, stdout)
    }
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for std::rc::Rc<T> {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ProcessOutput> {
        (**self).run(program, args)
    }

    fn run_to_file(
        &self,
        program: &Path,
        args: &[OsString],
        stdout: File,
    ) -> std::io::Result<ProcessOutput> {
        (**self).run_to_file(program, args, stdout)
    }
}
