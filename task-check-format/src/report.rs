use std::io::Write;

use anyhow::Error;
use itertools::Itertools;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use task_check_diagnostics::Diagnostic;

use crate::assignment::{Assignment, AssignmentSummary};
use crate::corpus::TestCorpus;
use crate::task::TaskConfig;

lazy_static! {
    static ref ERROR: ColorSpec = {
        let mut color = ColorSpec::new();
        color
            .set_fg(Some(Color::Red))
            .set_intense(true)
            .set_bold(true);
        color
    };
    static ref SUCCESS: ColorSpec = {
        let mut color = ColorSpec::new();
        color
            .set_fg(Some(Color::Green))
            .set_intense(true)
            .set_bold(true);
        color
    };
    static ref WARNING: ColorSpec = {
        let mut color = ColorSpec::new();
        color
            .set_fg(Some(Color::Yellow))
            .set_intense(true)
            .set_bold(true);
        color
    };
    static ref TITLE: ColorSpec = {
        let mut color = ColorSpec::new();
        color.set_fg(Some(Color::Yellow));
        color
    };
    static ref BANNER: ColorSpec = {
        let mut color = ColorSpec::new();
        color.set_fg(Some(Color::Blue));
        color
    };
    static ref DIM: ColorSpec = {
        let mut color = ColorSpec::new();
        color.set_fg(Some(Color::Black)).set_intense(true);
        color
    };
}

/// Write to the stream with the given color, resetting it afterwards.
macro_rules! cwrite {
    ($stream:expr, $color:expr, $($arg:tt)*) => {{
        $stream.set_color(&$color)?;
        write!($stream, $($arg)*)?;
        $stream.reset()?;
    }};
}

/// Glyphs of the coverage table.
const GLYPH_ELIGIBLE: char = '░';
const GLYPH_ASSIGNED: char = '▓';
const GLYPH_PUBLIC: char = '│';

/// Print the banner of a contest before the reports of its tasks.
pub fn print_contest_header(name: &str, description: &str, task_names: &[&str]) -> Result<(), Error> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let text = format!("Contest: {}: {}", name, description);
    writeln!(stdout)?;
    cwrite!(stdout, BANNER, "{}\n", "=".repeat(text.len()));
    cwrite!(stdout, TITLE, "{}\n", text);
    writeln!(stdout, "    Tasks: {}", task_names.iter().join(", "))?;
    cwrite!(stdout, BANNER, "{}\n", "-".repeat(text.len()));
    Ok(())
}

/// Print the header of a task report.
pub fn print_task_header(task: &TaskConfig) -> Result<(), Error> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let text = format!("Task: {}: {}", task.name, task.title);
    writeln!(stdout)?;
    cwrite!(stdout, DIM, "{}\n", "#".repeat(text.len()));
    cwrite!(stdout, TITLE, "{}\n", text);
    writeln!(
        stdout,
        "    Public groups: [{}]",
        task.public_groups.iter().join(", ")
    )?;
    Ok(())
}

/// Print the counters of an indexed corpus.
pub fn print_corpus_summary(corpus: &TestCorpus) -> Result<(), Error> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    writeln!(stdout, "    Test group cnt: {}", corpus.groups.len())?;
    writeln!(stdout, "    Total test cnt: {}", corpus.total_tests())?;
    writeln!(stdout, "    Total public points: {}", corpus.public_points())?;
    Ok(())
}

/// Print the full assignment report: the per-subtask assignments with the
/// running point total, the group → subtask coverage table and the collected
/// diagnostics.
pub fn print_assignment_report(
    corpus: &TestCorpus,
    assignment: &Assignment,
    summary: &AssignmentSummary,
    diagnostics: &[Diagnostic],
) -> Result<(), Error> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    writeln!(stdout)?;
    writeln!(
        stdout,
        "    Expected points:     [{}]",
        assignment.subtask_points().iter().join(", ")
    )?;
    writeln!(
        stdout,
        "    Points per subtask:  [{}]",
        summary.subtask_assigned_points.iter().join(", ")
    )?;
    if summary.unused_groups.is_empty() {
        writeln!(stdout, "    Unused groups:       none")?;
    } else {
        write!(stdout, "    Unused groups:       ")?;
        cwrite!(stdout, ERROR, "{}\n", summary.unused_groups.iter().join(", "));
    }
    writeln!(stdout)?;

    let mut running_total = 0;
    for (subtask, groups) in summary.subtask_groups.iter().enumerate() {
        running_total += summary.subtask_assigned_points[subtask];
        write!(
            stdout,
            "    Subtask {:2} ({:3} pts): groups [{}], total {}",
            subtask,
            assignment.subtask_points()[subtask],
            groups.iter().join(", "),
            running_total,
        )?;
        if let Some(unfilled) = assignment
            .unfilled()
            .iter()
            .find(|u| u.subtask == subtask as u32)
        {
            cwrite!(stdout, WARNING, "  UNFILLED ({} missing)", unfilled.missing);
        }
        writeln!(stdout)?;
    }
    writeln!(stdout)?;

    print_coverage_table(&mut stdout, corpus, summary)?;
    writeln!(
        stdout,
        "Points {} / {}",
        summary.points_assigned, summary.total_points
    )?;

    for diagnostic in diagnostics {
        writeln!(stdout)?;
        write!(stdout, "{}", diagnostic)?;
    }
    Ok(())
}

/// The table visualizing the group → subtask coverage: one row per subtask,
/// one column per group.
fn print_coverage_table(
    stdout: &mut StandardStream,
    corpus: &TestCorpus,
    summary: &AssignmentSummary,
) -> Result<(), Error> {
    let columns: Vec<_> = corpus.groups.keys().copied().collect();
    let public = |gid| corpus.public_groups.contains(&gid);

    let mut header = String::new();
    for &gid in &columns {
        header.push(if public(gid) { 'X' } else { ' ' });
    }
    writeln!(stdout, "{:7} {}", "Public", header)?;
    let mut digits = String::new();
    for &gid in &columns {
        digits.push(char::from_digit(gid % 10, 10).unwrap_or('?'));
    }
    writeln!(stdout, "{:7} {}", "Group", digits)?;

    for (subtask, assigned) in summary.subtask_groups.iter().enumerate() {
        let mut row = String::new();
        for &gid in &columns {
            let glyph = if assigned.contains(&gid) {
                GLYPH_ASSIGNED
            } else if corpus.groups[&gid].subtask_matches().contains(&(subtask as u32)) {
                GLYPH_ELIGIBLE
            } else if public(gid) {
                GLYPH_PUBLIC
            } else {
                ' '
            };
            row.push(glyph);
        }
        writeln!(stdout, "{:7} {}", subtask, row)?;
    }
    Ok(())
}

/// Print the final verdict line of a task.
pub fn print_verdict(passed: bool) -> Result<(), Error> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    if passed {
        cwrite!(stdout, SUCCESS, "VALIDATION PASSED\n");
    } else {
        cwrite!(stdout, ERROR, "VALIDATION FAILED\n");
    }
    Ok(())
}
