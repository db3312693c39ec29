use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::unbounded;
use itertools::Itertools;
use thiserror::Error;

use task_check_exec::{RunnerError, Validator, Verdict};

use crate::corpus::{TestCorpus, TestFile};
use crate::{GroupId, SubtaskId};

/// The external correctness oracle driven by the matching engine.
///
/// The engine sees exactly two outcomes per `(file, subtask)` check, plus
/// the fatal case in which no verdict could be produced at all.
pub trait Oracle: Sync {
    /// Decide whether `file` is valid input for `subtask`.
    fn check(&self, file: &TestFile, subtask: SubtaskId) -> Result<Verdict, RunnerError>;
}

impl Oracle for Validator {
    fn check(&self, file: &TestFile, subtask: SubtaskId) -> Result<Verdict, RunnerError> {
        Validator::check(self, &file.path, subtask)
    }
}

/// Adapter turning a plain function into an [`Oracle`]. Handy for exercising
/// the engine without spawning processes.
pub struct FnOracle<F>(
    /// The function deciding the verdicts.
    pub F,
);

impl<F> Oracle for FnOracle<F>
where
    F: Fn(&TestFile, SubtaskId) -> Result<Verdict, RunnerError> + Sync,
{
    fn check(&self, file: &TestFile, subtask: SubtaskId) -> Result<Verdict, RunnerError> {
        (self.0)(file, subtask)
    }
}

/// The errors that invalidate a whole matching run.
#[derive(Debug, Error)]
pub enum MatchingError {
    /// A group has no test files: an untested group cannot be matched to
    /// anything and must not silently pass.
    #[error("group {group} has no test files")]
    EmptyGroup {
        /// The group without tests.
        group: GroupId,
    },
    /// A group's data is valid for no subtask at all.
    #[error("group {group} does not match any subtask")]
    NoSubtaskMatch {
        /// The group that fits nowhere.
        group: GroupId,
    },
    /// The oracle could not produce a verdict.
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Options of the matching fan-out.
#[derive(Debug, Clone)]
pub struct MatchingOptions {
    /// Number of worker threads running the validator checks.
    pub workers: usize,
}

impl Default for MatchingOptions {
    fn default() -> MatchingOptions {
        MatchingOptions {
            workers: num_cpus::get(),
        }
    }
}

/// Populate `subtask_matches` of every group of the corpus.
///
/// A group matches a subtask iff every one of its input files passes the
/// oracle check for that subtask; within one `(group, subtask)` pair the
/// files are checked in order and the first failure stops the pair (never the
/// checks of other subtasks). The independent `(group, subtask)` pairs are
/// fanned out on a pool of worker threads: they share no mutable state and
/// the matched sets are written only after every worker has finished, so the
/// result does not depend on the scheduling.
///
/// Re-running the matching on the same corpus and oracle yields the same
/// sets: any previous matches are discarded first.
pub fn match_groups<O: Oracle>(
    corpus: &mut TestCorpus,
    candidates: &[SubtaskId],
    oracle: &O,
    options: &MatchingOptions,
) -> Result<(), MatchingError> {
    for group in corpus.groups.values_mut() {
        if group.tests.is_empty() {
            return Err(MatchingError::EmptyGroup { group: group.gid });
        }
        group.subtask_matches.clear();
    }

    let (job_tx, job_rx) = unbounded::<(GroupId, SubtaskId)>();
    let (result_tx, result_rx) = unbounded::<Result<(GroupId, SubtaskId), RunnerError>>();
    for gid in corpus.groups.keys() {
        for &subtask in candidates {
            let _ = job_tx.send((*gid, subtask));
        }
    }
    drop(job_tx);

    // raised by the first worker whose oracle cannot run at all, making the
    // others drop the remaining jobs
    let aborted = AtomicBool::new(false);
    let groups = &corpus.groups;
    let workers = options.workers.max(1);
    std::thread::scope(|scope| {
        for index in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let aborted = &aborted;
            std::thread::Builder::new()
                .name(format!("Matching worker {}", index))
                .spawn_scoped(scope, move || {
                    while let Ok((gid, subtask)) = job_rx.recv() {
                        if aborted.load(Ordering::SeqCst) {
                            return;
                        }
                        let group = &groups[&gid];
                        let mut all_pass = true;
                        for test in group.tests.values() {
                            match oracle.check(test, subtask) {
                                Ok(Verdict::Pass) => {}
                                Ok(Verdict::Fail) => {
                                    all_pass = false;
                                    break;
                                }
                                Err(error) => {
                                    aborted.store(true, Ordering::SeqCst);
                                    let _ = result_tx.send(Err(error));
                                    return;
                                }
                            }
                        }
                        if all_pass {
                            let _ = result_tx.send(Ok((gid, subtask)));
                        }
                    }
                })
                .expect("failed to spawn a matching worker");
        }
    });
    drop(result_tx);

    let mut matched = Vec::new();
    while let Ok(result) = result_rx.recv() {
        matched.push(result?);
    }
    for (gid, subtask) in matched {
        if let Some(group) = corpus.groups.get_mut(&gid) {
            group.subtask_matches.insert(subtask);
        }
    }

    for group in corpus.groups.values() {
        if group.subtask_matches.is_empty() {
            return Err(MatchingError::NoSubtaskMatch { group: group.gid });
        }
        info!(
            "group {} matches subtasks [{}]",
            group.gid,
            group.subtask_matches.iter().join(", ")
        );
    }
    Ok(())
}
