use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::GroupId;

/// A task description as written in its yaml file, before resolving the
/// defaults and the relative paths.
#[derive(Debug, Deserialize)]
struct RawTask {
    name: String,
    title: String,
    public_groups: Option<Vec<GroupId>>,
    test_archive: Option<PathBuf>,
    test_dir: Option<PathBuf>,
    validator: Option<PathBuf>,
    point_file: Option<PathBuf>,
    subtask_points: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct RawContest {
    name: String,
    description: String,
    tasks: IndexMap<String, Option<RawTaskRef>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTaskRef {
    config: Option<PathBuf>,
}

/// An immutable, fully-resolved task description: every default is applied
/// and every path is absolute-ized against the configuration file's directory
/// before the engine sees it.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    /// The short name of the task.
    pub name: String,
    /// The long title of the task.
    pub title: String,
    /// The groups whose tests are visible to the contestants. They are
    /// excluded from nothing: public data is validated like the rest.
    pub public_groups: Vec<GroupId>,
    /// The archive with the task's test files.
    pub test_archive: PathBuf,
    /// When set, use this already-extracted directory instead of the archive.
    pub test_dir: Option<PathBuf>,
    /// The C++ source of the task's input validator.
    pub validator: PathBuf,
    /// The file assigning points to the test groups.
    pub point_file: PathBuf,
    /// The points required by every subtask, in order.
    pub subtask_points: Vec<u32>,
}

/// A fully-resolved contest description: a named list of tasks.
#[derive(Debug, Clone)]
pub struct ContestConfig {
    /// The name of the contest.
    pub name: String,
    /// The description of the contest.
    pub description: String,
    /// The tasks of the contest, in file order.
    pub tasks: Vec<TaskConfig>,
}

/// What a configuration file may describe.
#[derive(Debug, Clone)]
pub enum ConfigUnit {
    /// A single task.
    Task(TaskConfig),
    /// A whole contest.
    Contest(ContestConfig),
}

impl ConfigUnit {
    /// The names of the tasks of this unit.
    pub fn task_names(&self) -> Vec<&str> {
        match self {
            ConfigUnit::Task(task) => vec![&task.name],
            ConfigUnit::Contest(contest) => {
                contest.tasks.iter().map(|task| task.name.as_str()).collect()
            }
        }
    }
}

/// Load a configuration file, detecting whether it describes a contest (it
/// has a `tasks` mapping) or a single task.
pub fn load_unit(path: &Path) -> Result<ConfigUnit, Error> {
    let value = read_yaml(path)?;
    if value.get("tasks").is_some() {
        Ok(ConfigUnit::Contest(load_contest(path, value)?))
    } else {
        Ok(ConfigUnit::Task(load_task_value(path, value)?))
    }
}

fn read_yaml(path: &Path) -> Result<serde_yaml::Value, Error> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read configuration file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("invalid yaml in {}", path.display()))
}

fn load_contest(path: &Path, value: serde_yaml::Value) -> Result<ContestConfig, Error> {
    let raw: RawContest = serde_yaml::from_value(value)
        .with_context(|| format!("invalid contest description {}", path.display()))?;
    let contest_dir = config_dir(path);
    let mut tasks = Vec::new();
    for (name, task_ref) in raw.tasks {
        let task_path = contest_dir.join(
            task_ref
                .unwrap_or_default()
                .config
                .unwrap_or_else(|| Path::new(&name).join("task.yaml")),
        );
        let task = load_task(&task_path)
            .with_context(|| format!("cannot load task '{}' of contest '{}'", name, raw.name))?;
        tasks.push(task);
    }
    Ok(ContestConfig {
        name: raw.name,
        description: raw.description,
        tasks,
    })
}

/// Load a single task description.
pub fn load_task(path: &Path) -> Result<TaskConfig, Error> {
    load_task_value(path, read_yaml(path)?)
}

fn load_task_value(path: &Path, value: serde_yaml::Value) -> Result<TaskConfig, Error> {
    let raw: RawTask = serde_yaml::from_value(value)
        .with_context(|| format!("invalid task description {}", path.display()))?;
    if raw.subtask_points.is_empty() {
        bail!("task '{}' has no subtask points", raw.name);
    }
    let task_dir = config_dir(path);
    Ok(TaskConfig {
        name: raw.name,
        title: raw.title,
        public_groups: raw.public_groups.unwrap_or_else(|| vec![0, 1]),
        test_archive: task_dir.join(raw.test_archive.unwrap_or_else(|| "tests.zip".into())),
        test_dir: raw.test_dir.map(|dir| task_dir.join(dir)),
        validator: task_dir.join(raw.validator.unwrap_or_else(|| "validator.cpp".into())),
        point_file: task_dir.join(raw.point_file.unwrap_or_else(|| "points.txt".into())),
        subtask_points: raw.subtask_points,
    })
}

/// The directory the relative paths of a configuration file resolve against.
fn config_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_task_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("task.yaml");
        std::fs::write(
            &config,
            "name: sum\ntitle: Grand Sum\nsubtask_points: [0, 2, 98]\n",
        )
        .unwrap();
        let ConfigUnit::Task(task) = load_unit(&config).unwrap() else {
            panic!("expected a task");
        };
        assert_eq!(task.name, "sum");
        assert_eq!(task.public_groups, vec![0, 1]);
        assert_eq!(task.test_archive, dir.path().join("tests.zip"));
        assert_eq!(task.validator, dir.path().join("validator.cpp"));
        assert_eq!(task.point_file, dir.path().join("points.txt"));
        assert_eq!(task.subtask_points, vec![0, 2, 98]);
        assert!(task.test_dir.is_none());
    }

    #[test]
    fn test_task_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("task.yaml");
        std::fs::write(
            &config,
            concat!(
                "name: sum\n",
                "title: Grand Sum\n",
                "public_groups: [0]\n",
                "test_dir: tests\n",
                "validator: tools/validator.cpp\n",
                "point_file: groups.txt\n",
                "subtask_points: [100]\n",
            ),
        )
        .unwrap();
        let task = load_task(&config).unwrap();
        assert_eq!(task.public_groups, vec![0]);
        assert_eq!(task.test_dir, Some(dir.path().join("tests")));
        assert_eq!(task.validator, dir.path().join("tools/validator.cpp"));
        assert_eq!(task.point_file, dir.path().join("groups.txt"));
    }

    #[test]
    fn test_empty_subtask_points_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("task.yaml");
        std::fs::write(&config, "name: sum\ntitle: Grand Sum\nsubtask_points: []\n").unwrap();
        assert!(load_task(&config).is_err());
    }

    #[test]
    fn test_contest_loads_its_tasks_in_order() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["beta", "alpha"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
            std::fs::write(
                dir.path().join(name).join("task.yaml"),
                format!("name: {}\ntitle: Task {}\nsubtask_points: [100]\n", name, name),
            )
            .unwrap();
        }
        let config = dir.path().join("contest.yaml");
        std::fs::write(
            &config,
            "name: finals\ndescription: The Finals\ntasks:\n  beta: {}\n  alpha: {}\n",
        )
        .unwrap();
        let ConfigUnit::Contest(contest) = load_unit(&config).unwrap() else {
            panic!("expected a contest");
        };
        assert_eq!(contest.name, "finals");
        // the file order is preserved, not sorted
        assert_eq!(
            contest.tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["beta", "alpha"]
        );
    }

    #[test]
    fn test_contest_task_config_override() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("other.yaml"),
            "name: sum\ntitle: Grand Sum\nsubtask_points: [100]\n",
        )
        .unwrap();
        let config = dir.path().join("contest.yaml");
        std::fs::write(
            &config,
            "name: finals\ndescription: The Finals\ntasks:\n  sum:\n    config: other.yaml\n",
        )
        .unwrap();
        let ConfigUnit::Contest(contest) = load_unit(&config).unwrap() else {
            panic!("expected a contest");
        };
        assert_eq!(contest.tasks[0].name, "sum");
    }
}
