use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use thiserror::Error;

use crate::GroupId;

/// The errors produced while parsing a point table.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PointTableError {
    /// A line could not be parsed into `(range, points)`.
    #[error("line {line}: malformed point entry {content:?}")]
    MalformedRange {
        /// 1-based number of the offending line.
        line: usize,
        /// The offending line, as read.
        content: String,
    },
    /// The same group id was assigned points twice.
    #[error("group {group} is assigned points more than once")]
    DuplicateGroup {
        /// The group with more than one entry.
        group: GroupId,
    },
    /// Some group id in `0..=max_group` has no entry.
    #[error("point table is not contiguous, group {group} has no points")]
    GapInTable {
        /// The first group without points.
        group: GroupId,
    },
}

/// One line of the point table: an inclusive range of group ids worth the
/// same number of points, with an optional free-text comment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PointEntry {
    /// First group of the range.
    pub first: GroupId,
    /// Last group of the range, inclusive.
    pub last: GroupId,
    /// Points of every group in the range.
    pub points: u32,
    /// The rest of the line, not interpreted.
    pub comment: String,
}

impl PointEntry {
    /// Parse a single non-empty line, `<range> <points> [comment]` where
    /// `<range>` is `N` or `N-M` with whitespace tolerated around the dash.
    fn parse(line: &str) -> Option<PointEntry> {
        let mut tokens = line.split_whitespace().peekable();
        let mut range = tokens.next()?.to_string();
        // the dash may be surrounded by spaces: "10 - 15", "10- 15", "10 -15"
        if range.ends_with('-') {
            range.push_str(tokens.next()?);
        } else if !range.contains('-') {
            if let Some(next) = tokens.peek() {
                if next.starts_with('-') {
                    range.push_str(tokens.next()?);
                    if range.ends_with('-') {
                        range.push_str(tokens.next()?);
                    }
                }
            }
        }
        let (first, last) = match range.split_once('-') {
            Some((first, last)) => (first.parse().ok()?, last.parse().ok()?),
            None => {
                let group = range.parse().ok()?;
                (group, group)
            }
        };
        if first > last {
            return None;
        }
        let points = tokens.next()?.parse().ok()?;
        let comment = tokens.collect::<Vec<_>>().join(" ");
        Some(PointEntry {
            first,
            last,
            points,
            comment,
        })
    }
}

/// The points-per-group table of a task.
///
/// Built once from the task's point file; the parsed entries must tile
/// `0..=max_group` with no gaps and no overlaps. Group 0 is implicitly worth
/// 0 points when the table does not mention it.
#[derive(Debug, Clone)]
pub struct PointTable {
    entries: Vec<PointEntry>,
    points: BTreeMap<GroupId, u32>,
}

impl PointTable {
    /// Parse the content of a point file. Pure: no filesystem access.
    pub fn parse(content: &str) -> Result<PointTable, PointTableError> {
        let mut entries: Vec<PointEntry> = Vec::new();
        let mut points = BTreeMap::new();
        let mut max_group = 0;
        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let entry = PointEntry::parse(line).ok_or_else(|| PointTableError::MalformedRange {
                line: index + 1,
                content: raw.to_string(),
            })?;
            for group in entry.first..=entry.last {
                if points.insert(group, entry.points).is_some() {
                    return Err(PointTableError::DuplicateGroup { group });
                }
            }
            max_group = max_group.max(entry.last);
            entries.push(entry);
        }
        // group 0 (usually the samples) defaults to zero points
        points.entry(0).or_insert(0);
        for group in 0..=max_group {
            if !points.contains_key(&group) {
                return Err(PointTableError::GapInTable { group });
            }
        }
        Ok(PointTable { entries, points })
    }

    /// Read and parse the point file at `path`.
    pub fn from_file(path: &Path) -> Result<PointTable, anyhow::Error> {
        info!("Reading point file {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read point file {}", path.display()))?;
        Ok(Self::parse(&content)?)
    }

    /// The points of a group, if the group is in the table.
    pub fn points(&self, group: GroupId) -> Option<u32> {
        self.points.get(&group).copied()
    }

    /// The total `group -> points` mapping, ascending by group id.
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, u32)> + '_ {
        self.points.iter().map(|(gid, points)| (*gid, *points))
    }

    /// The parsed entries, in file order.
    pub fn entries(&self) -> &[PointEntry] {
        &self.entries
    }

    /// The largest group id of the table.
    pub fn max_group(&self) -> GroupId {
        // the table always contains at least group 0
        *self.points.keys().next_back().expect("empty point table")
    }
}
