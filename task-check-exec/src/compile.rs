use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// The compiler used for building the validators.
const COMPILER: &str = "g++";

/// The errors of the validator compilation step.
///
/// All of them are configuration errors: without a working validator binary
/// the task cannot be checked at all.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The C++ compiler is not installed or not in `$PATH`.
    #[error("compiler '{compiler}' not found in PATH")]
    CompilerNotFound {
        /// Name of the compiler that was searched.
        compiler: &'static str,
    },
    /// The compiler process could not be spawned.
    #[error("failed to run '{compiler}': {error}")]
    SpawnFailed {
        /// Name of the compiler that was invoked.
        compiler: &'static str,
        /// The underlying spawn error.
        #[source]
        error: std::io::Error,
    },
    /// The compiler exited with a non-zero status.
    #[error("compilation of {source_path} failed:\n{stderr}")]
    CompilationFailed {
        /// Path of the source file that failed to build.
        source_path: PathBuf,
        /// What the compiler printed on standard error.
        stderr: String,
    },
}

/// Compile the validator at `source` into the binary at `dest`.
///
/// The validator is built with `g++ -Wall -std=c++17 -O2`, capturing the
/// compiler's standard error into the returned error on failure.
pub fn compile_validator(source: &Path, dest: &Path) -> Result<(), CompileError> {
    let compiler =
        which::which(COMPILER).map_err(|_| CompileError::CompilerNotFound { compiler: COMPILER })?;
    info!("Compiling validator {}", source.display());
    let output = Command::new(compiler)
        .arg("-Wall")
        .arg("-std=c++17")
        .arg("-O2")
        .arg("-o")
        .arg(dest)
        .arg(source)
        .output()
        .map_err(|error| CompileError::SpawnFailed {
            compiler: COMPILER,
            error,
        })?;
    if !output.status.success() {
        return Err(CompileError::CompilationFailed {
            source_path: source.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}
