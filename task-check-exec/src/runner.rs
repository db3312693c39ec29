use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

/// The outcome of a single validator invocation.
///
/// A failing run is a legitimate negative result, not an error: the validator
/// is expected to reject the files that do not belong to a subtask. The
/// invocations that cannot produce a verdict at all are a [`RunnerError`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Verdict {
    /// The validator accepted the file for the subtask.
    Pass,
    /// The validator exited with a non-zero status.
    Fail,
}

/// The errors that prevent the validator from producing a verdict.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The validator process could not be started at all (binary missing,
    /// permission denied, ...). Fatal for the whole task: without the oracle
    /// no group can be matched.
    #[error("cannot launch validator {validator}: {error}")]
    Unavailable {
        /// Path of the validator binary.
        validator: PathBuf,
        /// The underlying spawn error.
        #[source]
        error: std::io::Error,
    },
    /// The test file could not be opened for feeding the validator.
    #[error("cannot open test file {file}: {error}")]
    UnreadableFile {
        /// Path of the test file.
        file: PathBuf,
        /// The underlying open error.
        #[source]
        error: std::io::Error,
    },
}

/// A handle to a compiled validator binary.
///
/// The binary is invoked as `validator --group <subtask>` with the test
/// file's bytes on its standard input; exit status 0 means the file is valid
/// for that subtask. Whatever the validator prints is not interpreted.
#[derive(Debug, Clone)]
pub struct Validator {
    binary: PathBuf,
}

impl Validator {
    /// Make a new `Validator` from the path of the compiled binary.
    pub fn new<P: Into<PathBuf>>(binary: P) -> Validator {
        Validator {
            binary: binary.into(),
        }
    }

    /// Check a single test file against a single subtask.
    ///
    /// There is no retry and no timeout here: a non-zero exit is a final
    /// [`Verdict::Fail`], and hanging validators are the author's problem.
    pub fn check(&self, file: &Path, subtask: u32) -> Result<Verdict, RunnerError> {
        let input = File::open(file).map_err(|error| RunnerError::UnreadableFile {
            file: file.to_path_buf(),
            error,
        })?;
        let status = Command::new(&self.binary)
            .arg("--group")
            .arg(subtask.to_string())
            .stdin(Stdio::from(input))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|error| RunnerError::Unavailable {
                validator: self.binary.clone(),
                error,
            })?;
        if status.success() {
            debug!("{}: subtask {:3} ok", file.display(), subtask);
            Ok(Verdict::Pass)
        } else {
            debug!("{}: subtask {:3} rejected", file.display(), subtask);
            Ok(Verdict::Fail)
        }
    }
}
