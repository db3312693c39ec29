use std::path::PathBuf;
use std::thread::{Scope, ScopedJoinHandle};

use anyhow::{Context, Error};
use itertools::Itertools;

use task_check_diagnostics::{Diagnostic, DiagnosticLevel};
use task_check_exec::{compile_validator, Validator};
use task_check_format::{
    match_groups, print_assignment_report, print_contest_header, print_corpus_summary,
    print_task_header, print_verdict, Assignment, AssignmentSummary, ConfigUnit, MatchingOptions,
    PointTable, SubtaskId, TaskConfig, TestCorpus,
};

use crate::archive;
use crate::opt::Opt;

/// The resolved options of a checking run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory keeping the extracted tests and the compiled validators.
    pub work_dir: PathBuf,
    /// Normalize the line endings of the extracted tests.
    pub dos2unix: bool,
    /// Skip the extraction and use the work directory as-is.
    pub use_extracted: bool,
    /// Options of the matching fan-out.
    pub matching: MatchingOptions,
}

impl RunOptions {
    pub fn from_opt(opt: &Opt) -> RunOptions {
        RunOptions {
            work_dir: opt.work_dir.clone(),
            dos2unix: opt.dos2unix,
            use_extracted: opt.use_extracted,
            matching: MatchingOptions {
                workers: opt.num_cores.unwrap_or_else(num_cpus::get),
            },
        }
    }
}

/// Everything the validation of one task produced. The partial results are
/// kept even on failure so the summary can show how far the task got.
#[derive(Debug)]
pub struct TaskOutcome {
    pub task: TaskConfig,
    pub corpus: Option<TestCorpus>,
    pub assignment: Option<(Assignment, AssignmentSummary)>,
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<Error>,
}

impl TaskOutcome {
    pub fn passed(&self) -> bool {
        self.error.is_none()
            && self
                .diagnostics
                .iter()
                .all(|d| d.level() != DiagnosticLevel::Error)
    }

    pub fn print_summary(&self) -> Result<(), Error> {
        print_task_header(&self.task)?;
        if let Some(corpus) = &self.corpus {
            print_corpus_summary(corpus)?;
            if let Some((assignment, summary)) = &self.assignment {
                print_assignment_report(corpus, assignment, summary, &self.diagnostics)?;
            }
        }
        print_verdict(self.passed())?;
        if let Some(error) = &self.error {
            eprintln!("{:?}", error);
        }
        Ok(())
    }
}

/// The outcome of one configuration unit.
#[derive(Debug)]
pub enum UnitOutcome {
    Task(Box<TaskOutcome>),
    Contest {
        name: String,
        description: String,
        tasks: Vec<TaskOutcome>,
    },
}

impl UnitOutcome {
    pub fn passed(&self) -> bool {
        match self {
            UnitOutcome::Task(task) => task.passed(),
            UnitOutcome::Contest { tasks, .. } => tasks.iter().all(TaskOutcome::passed),
        }
    }

    pub fn print_summary(&self) -> Result<(), Error> {
        match self {
            UnitOutcome::Task(task) => task.print_summary(),
            UnitOutcome::Contest {
                name,
                description,
                tasks,
            } => {
                let names = tasks.iter().map(|t| t.task.name.as_str()).collect_vec();
                print_contest_header(name, description, &names)?;
                for task in tasks {
                    task.print_summary()?;
                }
                Ok(())
            }
        }
    }
}

/// Validate every task of every unit, one thread per task. A failure in one
/// task never affects its siblings: every outcome is reported.
pub fn validate_units(units: Vec<ConfigUnit>, options: &RunOptions) -> Vec<UnitOutcome> {
    std::thread::scope(|scope| {
        let handles = units
            .into_iter()
            .map(|unit| match unit {
                ConfigUnit::Task(task) => (None, vec![spawn_task(scope, task, options)]),
                ConfigUnit::Contest(contest) => (
                    Some((contest.name, contest.description)),
                    contest
                        .tasks
                        .into_iter()
                        .map(|task| spawn_task(scope, task, options))
                        .collect(),
                ),
            })
            .collect_vec();
        handles
            .into_iter()
            .map(|(contest, handles)| {
                let mut outcomes: Vec<_> = handles
                    .into_iter()
                    .map(|handle| handle.join().expect("task thread panicked"))
                    .collect();
                match contest {
                    Some((name, description)) => UnitOutcome::Contest {
                        name,
                        description,
                        tasks: outcomes,
                    },
                    None => UnitOutcome::Task(Box::new(
                        outcomes.pop().expect("a task unit has exactly one outcome"),
                    )),
                }
            })
            .collect()
    })
}

fn spawn_task<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    task: TaskConfig,
    options: &'env RunOptions,
) -> ScopedJoinHandle<'scope, TaskOutcome> {
    std::thread::Builder::new()
        .name(format!("Task {}", task.name))
        .spawn_scoped(scope, move || validate_task(task, options))
        .expect("failed to spawn a task thread")
}

/// Run the whole validation of a single task, capturing the failure, if any,
/// together with the partial results.
fn validate_task(task: TaskConfig, options: &RunOptions) -> TaskOutcome {
    info!("Checking task {}", task.name);
    let mut corpus = None;
    match validate_task_inner(&task, options, &mut corpus) {
        Ok((assignment, summary)) => {
            let diagnostics = assignment.diagnostics(&summary);
            TaskOutcome {
                task,
                corpus,
                assignment: Some((assignment, summary)),
                diagnostics,
                error: None,
            }
        }
        Err(error) => TaskOutcome {
            task,
            corpus,
            assignment: None,
            diagnostics: Vec::new(),
            error: Some(error),
        },
    }
}

fn validate_task_inner(
    task: &TaskConfig,
    options: &RunOptions,
    corpus_slot: &mut Option<TestCorpus>,
) -> Result<(Assignment, AssignmentSummary), Error> {
    let work_dir = options.work_dir.join(&task.name);
    std::fs::create_dir_all(&work_dir)
        .with_context(|| format!("cannot create work directory {}", work_dir.display()))?;

    let test_dir = match &task.test_dir {
        Some(dir) => dir.clone(),
        None => {
            let dir = work_dir.join("tests");
            if !options.use_extracted {
                archive::extract_tests(&task.test_archive, &dir)?;
                if options.dos2unix {
                    archive::normalize_line_endings(&dir)?;
                }
            }
            dir
        }
    };

    let table = PointTable::from_file(&task.point_file)?;
    let mut corpus = TestCorpus::index(&test_dir, &table, &task.public_groups)?;

    let binary = work_dir.join("validator");
    compile_validator(&task.validator, &binary)?;
    let validator = Validator::new(binary);

    let candidates: Vec<SubtaskId> = (0..task.subtask_points.len() as SubtaskId).collect();
    let matching = match_groups(&mut corpus, &candidates, &validator, &options.matching);
    // keep the corpus for the summary even when the matching fails
    let corpus = corpus_slot.insert(corpus);
    matching?;

    let assignment = Assignment::solve(corpus, &task.subtask_points);
    let summary = assignment.summary(corpus);
    Ok((assignment, summary))
}
