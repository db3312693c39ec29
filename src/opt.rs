use std::path::PathBuf;

use clap::Parser;

/// Check the test data of tasks for informatics competitions.
///
/// For every task the test archive is extracted, the validator is compiled
/// and run on every test file under every subtask, and the resulting group →
/// subtask assignment is verified against the required subtask points.
#[derive(Parser, Debug)]
#[command(name = "task-check", version)]
pub struct Opt {
    /// Yaml files each defining a contest or a single task
    #[arg(required = true)]
    pub config: Vec<PathBuf>,

    /// Normalize the line endings of the extracted test files
    #[arg(long)]
    pub dos2unix: bool,

    /// Use the tests already extracted in the work directory, do not extract
    /// the archive
    #[arg(long)]
    pub use_extracted: bool,

    /// Directory keeping the extracted tests and the compiled validators
    #[arg(long, default_value = "task-check-work")]
    pub work_dir: PathBuf,

    /// The number of worker threads running the validator checks
    #[arg(long)]
    pub num_cores: Option<usize>,

    #[command(flatten)]
    pub logger: LoggerOpt,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LoggerOpt {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl LoggerOpt {
    /// Configure the logger and the panic handler based on the verbosity
    /// level.
    pub fn enable_log(&self) {
        if self.verbose > 0 {
            std::env::set_var("RUST_BACKTRACE", "1");
            match self.verbose {
                0 => unreachable!(),
                1 => std::env::set_var("RUST_LOG", "info"),
                2 => std::env::set_var("RUST_LOG", "debug"),
                _ => std::env::set_var("RUST_LOG", "trace"),
            }
        }
        env_logger::Builder::from_default_env()
            .format_timestamp_nanos()
            .init();
        better_panic::install();
    }
}
