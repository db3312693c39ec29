use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use task_check_diagnostics::Diagnostic;

use crate::corpus::TestCorpus;
use crate::{GroupId, SubtaskId};

/// The fixed total the subtask points of a task must sum to.
pub const TOTAL_POINTS: u32 = 100;

/// A subtask whose required points could not be covered by the greedy solve.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UnfilledSubtask {
    /// The subtask that was left unfilled.
    pub subtask: SubtaskId,
    /// How many points are still missing.
    pub missing: u32,
}

/// The group → subtask assignment computed for one validation run.
///
/// Produced fresh by [`Assignment::solve`] and never mutated afterwards; the
/// four post-conditions are checked post-hoc by [`Assignment::diagnostics`],
/// all of them, so a broken assignment reports every violated condition at
/// once.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Assignment {
    /// The required points of every subtask, in order.
    subtask_points: Vec<u32>,
    /// For every group, the subtask it was assigned to, if any.
    assigned: BTreeMap<GroupId, Option<SubtaskId>>,
    /// The subtasks whose target was not reached, in ascending order.
    unfilled: Vec<UnfilledSubtask>,
}

/// The totals of an [`Assignment`], mirroring the post-conditions.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AssignmentSummary {
    /// Sum of the points of all the assigned groups.
    pub points_assigned: u32,
    /// The groups that were assigned to no subtask.
    pub unused_groups: BTreeSet<GroupId>,
    /// Points actually assigned to every subtask.
    pub subtask_assigned_points: Vec<u32>,
    /// The groups assigned to every subtask.
    pub subtask_groups: Vec<BTreeSet<GroupId>>,
    /// Sum of the required subtask points.
    pub total_points: u32,
}

impl Assignment {
    /// Assign every group to at most one subtask with a deterministic greedy:
    /// for each subtask in ascending order, scan the groups in ascending id
    /// order and assign every still-unassigned matching group whose points do
    /// not overshoot what the subtask still needs.
    ///
    /// Ascending id is the sole tie-break. The greedy does not backtrack, so
    /// it can miss a feasible packing that exists under a different order;
    /// point tables are expected to be designed so that the ascending-order
    /// greedy succeeds.
    pub fn solve(corpus: &TestCorpus, subtask_points: &[u32]) -> Assignment {
        let mut assigned: BTreeMap<GroupId, Option<SubtaskId>> =
            corpus.groups.keys().map(|gid| (*gid, None)).collect();
        let mut unfilled = Vec::new();
        for (subtask, &target) in subtask_points.iter().enumerate() {
            let subtask = subtask as SubtaskId;
            debug!("filling subtask {}: {} points needed", subtask, target);
            let mut remaining = target;
            for (gid, group) in corpus.groups.iter() {
                if assigned[gid].is_some() {
                    continue;
                }
                if !group.subtask_matches().contains(&subtask) {
                    continue;
                }
                if group.points > remaining {
                    // would overshoot, never assign
                    continue;
                }
                remaining -= group.points;
                assigned.insert(*gid, Some(subtask));
            }
            if remaining != 0 {
                info!(
                    "could not fill subtask {}: {} points missing",
                    subtask, remaining
                );
                unfilled.push(UnfilledSubtask {
                    subtask,
                    missing: remaining,
                });
            }
        }
        Assignment {
            subtask_points: subtask_points.to_vec(),
            assigned,
            unfilled,
        }
    }

    /// The subtask a group was assigned to, if any.
    pub fn subtask_of(&self, group: GroupId) -> Option<SubtaskId> {
        self.assigned.get(&group).copied().flatten()
    }

    /// The subtasks left unfilled by the solve.
    pub fn unfilled(&self) -> &[UnfilledSubtask] {
        &self.unfilled
    }

    /// The required points of every subtask.
    pub fn subtask_points(&self) -> &[u32] {
        &self.subtask_points
    }

    /// Compute the totals of this assignment over the corpus it was solved
    /// against.
    pub fn summary(&self, corpus: &TestCorpus) -> AssignmentSummary {
        let mut summary = AssignmentSummary {
            points_assigned: 0,
            unused_groups: BTreeSet::new(),
            subtask_assigned_points: vec![0; self.subtask_points.len()],
            subtask_groups: vec![BTreeSet::new(); self.subtask_points.len()],
            total_points: self.subtask_points.iter().sum(),
        };
        for (gid, subtask) in self.assigned.iter() {
            let Some(subtask) = subtask else {
                summary.unused_groups.insert(*gid);
                continue;
            };
            let points = corpus.groups[gid].points;
            summary.points_assigned += points;
            summary.subtask_assigned_points[*subtask as usize] += points;
            summary.subtask_groups[*subtask as usize].insert(*gid);
        }
        summary
    }

    /// Check the four post-conditions of the solve, returning one diagnostic
    /// per violated condition (all of them, not just the first):
    ///
    /// 1. every group is assigned to exactly one subtask;
    /// 2. the points assigned to every subtask equal its required points;
    /// 3. the required points sum to [`TOTAL_POINTS`];
    /// 4. the assigned points sum to [`TOTAL_POINTS`].
    pub fn diagnostics(&self, summary: &AssignmentSummary) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if summary.points_assigned != TOTAL_POINTS {
            diagnostics.push(Diagnostic::error(format!(
                "assigned {} points out of {}",
                summary.points_assigned, TOTAL_POINTS
            )));
        }
        if !summary.unused_groups.is_empty() {
            diagnostics.push(
                Diagnostic::error(format!(
                    "unused groups: {}",
                    summary.unused_groups.iter().join(", ")
                ))
                .with_note("every group must be assigned to exactly one subtask"),
            );
        }
        if summary.subtask_assigned_points != self.subtask_points {
            let mut diagnostic = Diagnostic::error(format!(
                "incorrectly assigned points, expected [{}], got [{}]",
                self.subtask_points.iter().join(", "),
                summary.subtask_assigned_points.iter().join(", ")
            ));
            if !self.unfilled.is_empty() {
                diagnostic = diagnostic.with_note(format!(
                    "unfilled subtasks: {}",
                    self.unfilled
                        .iter()
                        .map(|u| format!("{} ({} points missing)", u.subtask, u.missing))
                        .join(", ")
                ));
            }
            diagnostics.push(diagnostic);
        }
        if summary.total_points != TOTAL_POINTS {
            diagnostics.push(Diagnostic::error(format!(
                "subtask points sum to {}, not {}",
                summary.total_points, TOTAL_POINTS
            )));
        }
        diagnostics
    }
}
