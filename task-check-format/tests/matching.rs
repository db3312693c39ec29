use std::path::PathBuf;

use pretty_assertions::assert_eq;

use task_check_format::{
    match_groups, FnOracle, MatchingError, MatchingOptions, RunnerError, SubtaskId, TestFile,
    Verdict,
};

mod utils;
use utils::{corpus, oracle_by_group};

fn options() -> MatchingOptions {
    MatchingOptions { workers: 4 }
}

#[test]
fn test_group_matches_iff_all_files_pass() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut corpus = corpus(dir.path(), "0 100\n", &["t.i00a", "t.i00b"], &[]);
    // file "a" passes both subtasks, file "b" only subtask 1
    let oracle = FnOracle(|file: &TestFile, subtask: SubtaskId| -> Result<Verdict, RunnerError> {
        Ok(if file.sub_id == "a" || subtask == 1 {
            Verdict::Pass
        } else {
            Verdict::Fail
        })
    });
    match_groups(&mut corpus, &[0, 1], &oracle, &options()).unwrap();
    assert_eq!(
        corpus.groups[&0].subtask_matches().iter().copied().collect::<Vec<_>>(),
        vec![1]
    );
}

#[test]
fn test_empty_group_is_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    // group 1 has points but no files on disk
    let mut corpus = corpus(dir.path(), "0 50\n1 50\n", &["t.i00"], &[]);
    let oracle = oracle_by_group(|_, _| true);
    match match_groups(&mut corpus, &[0], &oracle, &options()) {
        Err(MatchingError::EmptyGroup { group: 1 }) => {}
        other => panic!("expected EmptyGroup, got {:?}", other),
    }
}

#[test]
fn test_group_matching_nothing_is_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut corpus = corpus(dir.path(), "0 50\n1 50\n", &["t.i00", "t.i01"], &[]);
    let oracle = oracle_by_group(|group, _| group == 0);
    match match_groups(&mut corpus, &[0, 1], &oracle, &options()) {
        Err(MatchingError::NoSubtaskMatch { group: 1 }) => {}
        other => panic!("expected NoSubtaskMatch, got {:?}", other),
    }
}

#[test]
fn test_matching_is_idempotent() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut corpus = corpus(
        dir.path(),
        "0 20\n1 80\n",
        &["t.i00", "t.i01a", "t.i01b"],
        &[],
    );
    let oracle = oracle_by_group(|group, subtask| subtask <= group);
    match_groups(&mut corpus, &[0, 1], &oracle, &options()).unwrap();
    let first: Vec<_> = corpus
        .groups
        .values()
        .map(|g| g.subtask_matches().clone())
        .collect();
    match_groups(&mut corpus, &[0, 1], &oracle, &options()).unwrap();
    let second: Vec<_> = corpus
        .groups
        .values()
        .map(|g| g.subtask_matches().clone())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_result_does_not_depend_on_the_pool_size() {
    let dir = tempfile::TempDir::new().unwrap();
    let files = ["t.i00", "t.i01", "t.i02a", "t.i02b", "t.i03"];
    let table = "0 0\n1 10\n2 40\n3 50\n";
    let oracle = oracle_by_group(|group, subtask| (group + subtask) % 3 != 1);
    let mut serial = corpus(dir.path(), table, &files, &[]);
    match_groups(&mut serial, &[0, 1, 2], &oracle, &MatchingOptions { workers: 1 }).unwrap();
    let mut parallel = serial.clone();
    match_groups(
        &mut parallel,
        &[0, 1, 2],
        &oracle,
        &MatchingOptions { workers: 8 },
    )
    .unwrap();
    for (a, b) in serial.groups.values().zip(parallel.groups.values()) {
        assert_eq!(a.subtask_matches(), b.subtask_matches());
    }
}

#[test]
fn test_unavailable_oracle_aborts_the_matching() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut corpus = corpus(dir.path(), "0 100\n", &["t.i00"], &[]);
    let oracle = FnOracle(|_: &TestFile, _: SubtaskId| -> Result<Verdict, RunnerError> {
        Err(RunnerError::Unavailable {
            validator: PathBuf::from("/no/such/validator"),
            error: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    });
    match match_groups(&mut corpus, &[0], &oracle, &options()) {
        Err(MatchingError::Runner(RunnerError::Unavailable { .. })) => {}
        other => panic!("expected a runner error, got {:?}", other),
    }
}
