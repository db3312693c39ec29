use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use regex::Regex;
use thiserror::Error;

use crate::points::PointTable;
use crate::{GroupId, SubtaskId};

lazy_static! {
    /// The test filename convention: `<anything>.i<group><letters>` for the
    /// inputs and `<anything>.o<group><letters>` for the expected outputs.
    static ref TEST_FILE_PATTERN: Regex =
        Regex::new(r"\.([io])(\d+)([a-z]*)$").expect("invalid test file regex");
}

/// The errors produced while indexing a test directory.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A file matches neither the input nor the output naming convention.
    /// A stray file is a configuration error, it is never silently skipped.
    #[error("file {path} does not follow the test naming convention")]
    UnrecognizedFile {
        /// The offending file.
        path: PathBuf,
    },
    /// Two input files map to the same `(group, sub id)` pair.
    #[error("duplicate test {sub_id:?} of group {group} ({path})")]
    DuplicateSubId {
        /// The group of the duplicate.
        group: GroupId,
        /// The sub-identifier appearing twice.
        sub_id: String,
        /// The second file with that sub-identifier.
        path: PathBuf,
    },
    /// A nested directory was found where flat files are expected.
    #[error("unexpected directory {path} inside the test directory")]
    UnexpectedSubdirectory {
        /// The offending directory.
        path: PathBuf,
    },
    /// A test file belongs to a group with no entry in the point table.
    #[error("test file {path} belongs to group {group} which has no points assigned")]
    UnknownGroup {
        /// The group without points.
        group: GroupId,
        /// The file of that group.
        path: PathBuf,
    },
    /// A public group id has no entry in the point table.
    #[error("public group {group} has no points assigned")]
    UnknownPublicGroup {
        /// The group without points.
        group: GroupId,
    },
    /// The same group id is listed twice among the public groups.
    #[error("public group {group} is listed more than once")]
    DuplicatePublicGroup {
        /// The duplicated group.
        group: GroupId,
    },
    /// The test directory itself could not be read.
    #[error("cannot read test directory {path}: {error}")]
    UnreadableDirectory {
        /// The directory that was being scanned.
        path: PathBuf,
        /// The underlying io error.
        #[source]
        error: std::io::Error,
    },
}

/// A single input file of a test group.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TestFile {
    /// The group the file belongs to.
    pub group: GroupId,
    /// Short alphabetic tag distinguishing the files of the same group. May
    /// be empty when the group has a single file.
    pub sub_id: String,
    /// Where the file is on disk.
    pub path: PathBuf,
}

/// One scoring unit of the test data: a fixed point value and the input
/// files sharing the same group id.
#[derive(Debug, Clone)]
pub struct TestGroup {
    /// The id of the group.
    pub gid: GroupId,
    /// The points the group is worth.
    pub points: u32,
    /// The input files of the group, keyed by sub-identifier.
    pub tests: BTreeMap<String, TestFile>,
    /// The subtasks this group's data has been proven to satisfy. Empty
    /// until the matching runs, read-only afterwards.
    pub(crate) subtask_matches: BTreeSet<SubtaskId>,
}

impl TestGroup {
    fn new(gid: GroupId, points: u32) -> TestGroup {
        TestGroup {
            gid,
            points,
            tests: BTreeMap::new(),
            subtask_matches: BTreeSet::new(),
        }
    }

    /// The set of subtasks this group's data satisfies.
    pub fn subtask_matches(&self) -> &BTreeSet<SubtaskId> {
        &self.subtask_matches
    }
}

/// The indexed test data of a task: every group of the point table together
/// with its input files found on disk.
#[derive(Debug, Clone)]
pub struct TestCorpus {
    /// All the groups of the task, keyed by group id.
    pub groups: BTreeMap<GroupId, TestGroup>,
    /// The groups whose tests are visible to the contestants.
    pub public_groups: Vec<GroupId>,
}

impl TestCorpus {
    /// Scan `dir` and index every test input file against the point table.
    ///
    /// Every group of the table is present in the result, with or without
    /// files; a group left without files fails later during the matching.
    /// The expected-output files are recognized and skipped: producing and
    /// checking the answers is not this tool's concern.
    pub fn index(
        dir: &Path,
        table: &PointTable,
        public_groups: &[GroupId],
    ) -> Result<TestCorpus, CorpusError> {
        let mut seen = BTreeSet::new();
        for &public in public_groups {
            if table.points(public).is_none() {
                return Err(CorpusError::UnknownPublicGroup { group: public });
            }
            if !seen.insert(public) {
                return Err(CorpusError::DuplicatePublicGroup { group: public });
            }
        }

        let mut groups: BTreeMap<GroupId, TestGroup> = table
            .iter()
            .map(|(gid, points)| (gid, TestGroup::new(gid, points)))
            .collect();

        let entries = std::fs::read_dir(dir)
            .map_err(|error| CorpusError::UnreadableDirectory {
                path: dir.to_path_buf(),
                error,
            })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| CorpusError::UnreadableDirectory {
                path: dir.to_path_buf(),
                error,
            })?;
        // scan in name order so the first error is deterministic
        for entry in entries.iter().sorted_by_key(|e| e.file_name()) {
            let path = entry.path();
            if path.is_dir() {
                return Err(CorpusError::UnexpectedSubdirectory { path });
            }
            let name = entry.file_name();
            let captures = name
                .to_str()
                .and_then(|name| TEST_FILE_PATTERN.captures(name))
                .ok_or_else(|| CorpusError::UnrecognizedFile { path: path.clone() })?;
            if &captures[1] == "o" {
                continue;
            }
            let group: GroupId = captures[2]
                .parse()
                .map_err(|_| CorpusError::UnrecognizedFile { path: path.clone() })?;
            let sub_id = captures[3].to_string();
            if table.points(group).is_none() {
                return Err(CorpusError::UnknownGroup { group, path });
            }
            let test = TestFile {
                group,
                sub_id: sub_id.clone(),
                path: path.clone(),
            };
            let tests = &mut groups
                .get_mut(&group)
                .expect("group missing after table check")
                .tests;
            if tests.insert(sub_id.clone(), test).is_some() {
                return Err(CorpusError::DuplicateSubId {
                    group,
                    sub_id,
                    path,
                });
            }
        }
        Ok(TestCorpus {
            groups,
            public_groups: public_groups.to_vec(),
        })
    }

    /// Total number of input files in the corpus.
    pub fn total_tests(&self) -> usize {
        self.groups.values().map(|group| group.tests.len()).sum()
    }

    /// Total points of the public groups.
    pub fn public_points(&self) -> u32 {
        self.public_groups
            .iter()
            .map(|gid| self.groups[gid].points)
            .sum()
    }
}
