//! The external-process layer of task-check.
//!
//! A task's correctness oracle is an external, task-specific validator
//! program. This crate compiles it from source and runs the compiled binary
//! on single test files, turning each run into a [`Verdict`].

#[macro_use]
extern crate log;

mod compile;
mod runner;

pub use compile::{compile_validator, CompileError};
pub use runner::{RunnerError, Validator, Verdict};
