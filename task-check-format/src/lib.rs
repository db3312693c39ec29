//! The test-data checking engine.
//!
//! A task's test data is organized in _test groups_: bundles of one or more
//! test files sharing a group id and worth a fixed number of points. The
//! scoring scheme of the task is a sequence of _subtasks_, each requiring a
//! fixed number of points. This crate decides whether the two are consistent:
//!
//! 1. the [`PointTable`] assigns points to every group and the [`TestCorpus`]
//!    indexes the test files on disk into groups;
//! 2. the matching engine ([`match_groups`]) drives every group through the
//!    task's external validator once per candidate subtask, computing the set
//!    of subtasks each group's data is valid for;
//! 3. the [`Assignment`] solver greedily assigns every group to at most one
//!    subtask so that each subtask's required points are exactly covered, and
//!    reports every violated condition when that is not possible.

#![deny(missing_docs)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod assignment;
mod corpus;
mod matching;
mod points;
mod report;
mod task;

pub use assignment::{Assignment, AssignmentSummary, UnfilledSubtask, TOTAL_POINTS};
pub use corpus::{CorpusError, TestCorpus, TestFile, TestGroup};
pub use matching::{match_groups, FnOracle, MatchingError, MatchingOptions, Oracle};
pub use points::{PointEntry, PointTable, PointTableError};
pub use report::{
    print_assignment_report, print_contest_header, print_corpus_summary, print_task_header,
    print_verdict,
};
pub use task::{load_task, load_unit, ConfigUnit, ContestConfig, TaskConfig};

pub use task_check_exec::{RunnerError, Verdict};

/// The test group ids are non-negative 0-based integers.
pub type GroupId = u32;
/// The subtask ids are non-negative 0-based indices in the sequence of the
/// required subtask points.
pub type SubtaskId = u32;
