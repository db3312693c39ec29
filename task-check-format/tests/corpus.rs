use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use task_check_format::{CorpusError, PointTable, TestCorpus};

mod utils;
use utils::touch_tests;

#[test]
fn test_round_trip_of_the_file_set() {
    // the (group, sub id) pairs are a bijection with the input files
    let dir = tempfile::TempDir::new().unwrap();
    let files = [
        "sum.i00", "sum.i01a", "sum.i01b", "sum.i02", "sum.i10", "sum.o00", "sum.o01a",
    ];
    touch_tests(dir.path(), &files);
    let table = PointTable::parse("1-2 10\n3-10 10\n").unwrap();
    let corpus = TestCorpus::index(dir.path(), &table, &[]).unwrap();

    let mut derived = BTreeSet::new();
    let mut paths = BTreeSet::new();
    for group in corpus.groups.values() {
        for (sub_id, test) in &group.tests {
            assert_eq!(test.group, group.gid);
            assert_eq!(&test.sub_id, sub_id);
            derived.insert((test.group, test.sub_id.clone()));
            paths.insert(test.path.clone());
        }
    }
    let expected: BTreeSet<_> = [
        (0, "".to_string()),
        (1, "a".to_string()),
        (1, "b".to_string()),
        (2, "".to_string()),
        (10, "".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(derived, expected);
    // distinct pairs come from distinct files
    assert_eq!(paths.len(), derived.len());
}

#[test]
fn test_same_sub_id_from_two_prefixes_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    touch_tests(dir.path(), &["a.i00", "b.i00"]);
    let table = PointTable::parse("0 0\n").unwrap();
    match TestCorpus::index(dir.path(), &table, &[]) {
        Err(CorpusError::DuplicateSubId { group: 0, sub_id, .. }) => assert_eq!(sub_id, ""),
        other => panic!("expected DuplicateSubId, got {:?}", other),
    }
}

#[test]
fn test_output_files_do_not_create_groups() {
    let dir = tempfile::TempDir::new().unwrap();
    touch_tests(dir.path(), &["sum.i00", "sum.o00", "sum.o00a"]);
    let table = PointTable::parse("0 0\n").unwrap();
    let corpus = TestCorpus::index(dir.path(), &table, &[]).unwrap();
    assert_eq!(corpus.total_tests(), 1);
}
