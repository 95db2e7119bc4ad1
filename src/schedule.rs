//! Decoded schedules, the solution file format and schedule checking.
//!
//! # Solution File
//!
//! ```text
//! <objective>
//! <golfers of week 0, group 0>
//!
//! <golfers of week 0, group 1>
//!
//! ...
//! ```
//!
//! Golfer indices are 0-based, ascending, each followed by a space. Every group
//! line is followed by one blank line, so weeks are not visually separated from
//! groups. The reader skips blank lines and therefore accepts both this layout
//! and one with a blank line per week.

use std::{
    ffi::OsString,
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use itertools::Itertools;
use rayon::prelude::*;
use thiserror::Error;

use crate::{instance::Instance, lp_solver::OptimisationStatus};

/// Ways a schedule fails to be a perfect social golfer schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleViolation {
    #[error("golfer {golfer} in week {week}, group {group} is out of range")]
    GolferOutOfRange {
        week: usize,
        group: usize,
        golfer: usize,
    },
    #[error("golfer {golfer} plays more than once in week {week}")]
    DuplicateGolfer { week: usize, golfer: usize },
    #[error("golfer {golfer} does not play in week {week}")]
    MissingGolfer { week: usize, golfer: usize },
    #[error("week {week}, group {group} has {size} golfers")]
    WrongGroupSize {
        week: usize,
        group: usize,
        size: usize,
    },
    #[error("golfers {p0} and {p1} meet {count} times")]
    RepeatedMeeting { p0: usize, p1: usize, count: u32 },
}

/// Errors reading a solution file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("solution file is empty")]
    MissingObjective,
    #[error("'{0}' is not a valid objective value")]
    BadObjective(String),
    #[error("missing line for week {week}, group {group}")]
    MissingGroup { week: usize, group: usize },
    #[error("'{token}' on line {line} is not a golfer index")]
    BadGolfer { line: usize, token: String },
}

/// The golfers of every group of every week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    instance: Instance,
    // indexed by week * groups + group
    groups: Vec<Vec<usize>>,
}

impl Schedule {
    /// Build a schedule from `groups[week * instance.groups() + group]`.
    ///
    /// Returns `None` unless `groups` holds exactly `weeks * groups` entries.
    pub fn new(instance: Instance, groups: Vec<Vec<usize>>) -> Option<Self> {
        (groups.len() == instance.weeks() * instance.groups())
            .then(|| Self::from_slots(instance, groups))
    }

    // Callers fill `groups` with one week-by-group loop over `instance`
    pub(crate) fn from_slots(instance: Instance, groups: Vec<Vec<usize>>) -> Self {
        debug_assert_eq!(groups.len(), instance.weeks() * instance.groups());
        Self { instance, groups }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn group(&self, week: usize, group: usize) -> &[usize] {
        &self.groups[week * self.instance.groups() + group]
    }

    /// Groups of `week` in order.
    pub fn week(&self, week: usize) -> impl Iterator<Item = &[usize]> {
        let g = self.instance.groups();
        self.groups[week * g..(week + 1) * g].iter().map(Vec::as_slice)
    }

    /// Number of times each pair shares a group, indexed by [`Instance::pair_index`].
    ///
    /// Golfers outside `0..golfers` are ignored.
    pub fn meeting_counts(&self) -> Vec<u32> {
        let instance = &self.instance;
        let golfers = instance.golfers();
        self.groups
            .par_iter()
            .fold(
                || vec![0u32; instance.pairs()],
                |mut counts, members| {
                    for (&a, &b) in members.iter().tuple_combinations() {
                        if a != b && a < golfers && b < golfers {
                            counts[instance.pair_index(a.min(b), a.max(b))] += 1;
                        }
                    }
                    counts
                },
            )
            .reduce(
                || vec![0u32; instance.pairs()],
                |mut acc, counts| {
                    acc.iter_mut().zip(counts).for_each(|(a, c)| *a += c);
                    acc
                },
            )
    }

    /// Sum over all pairs of `max(0, meetings - 1)`.
    pub fn redundant_meetings(&self) -> u64 {
        self.meeting_counts()
            .into_iter()
            .map(|c| u64::from(c.saturating_sub(1)))
            .sum()
    }

    /// Pairs meeting more than once, as `(p0, p1, meetings)` with `p0 < p1`.
    pub fn repeated_pairs(&self) -> Vec<(usize, usize, u32)> {
        let counts = self.meeting_counts();
        (0..self.instance.golfers())
            .tuple_combinations()
            .filter_map(|(p0, p1)| {
                let count = counts[self.instance.pair_index(p0, p1)];
                (count > 1).then_some((p0, p1, count))
            })
            .collect()
    }

    /// Every week partitions all golfers into groups of the right size.
    pub fn check_partition(&self) -> Result<(), ScheduleViolation> {
        let golfers = self.instance.golfers();

        for week in 0..self.instance.weeks() {
            let mut plays = vec![false; golfers];
            for (group, members) in self.week(week).enumerate() {
                for &golfer in members {
                    let slot = plays
                        .get_mut(golfer)
                        .ok_or(ScheduleViolation::GolferOutOfRange {
                            week,
                            group,
                            golfer,
                        })?;
                    if *slot {
                        return Err(ScheduleViolation::DuplicateGolfer { week, golfer });
                    }
                    *slot = true;
                }
                if members.len() != self.instance.group_size() {
                    return Err(ScheduleViolation::WrongGroupSize {
                        week,
                        group,
                        size: members.len(),
                    });
                }
            }
            if let Some(golfer) = plays.iter().position(|&p| !p) {
                return Err(ScheduleViolation::MissingGolfer { week, golfer });
            }
        }

        Ok(())
    }

    /// A valid partition in which no two golfers meet twice.
    pub fn check(&self) -> Result<(), ScheduleViolation> {
        self.check_partition()?;
        match self.repeated_pairs().first() {
            Some(&(p0, p1, count)) => Err(ScheduleViolation::RepeatedMeeting { p0, p1, count }),
            None => Ok(()),
        }
    }
}

/// A schedule read back from a solved model.
#[derive(Debug, Clone)]
pub struct SolvedSchedule {
    /// Redundant meetings of `schedule`
    pub objective: u64,
    pub status: OptimisationStatus,
    pub schedule: Schedule,
}

/// Write the objective followed by one line per group.
pub fn write_solution<W: Write>(out: &mut W, objective: u64, schedule: &Schedule) -> io::Result<()> {
    writeln!(out, "{}", objective)?;
    for week in 0..schedule.instance().weeks() {
        for members in schedule.week(week) {
            for golfer in members {
                write!(out, "{} ", golfer)?;
            }
            writeln!(out)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write a solution file to `path`.
pub fn write_solution_file(path: &Path, solved: &SolvedSchedule) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create solution file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_solution(&mut out, solved.objective, &solved.schedule)?;
    out.flush()?;
    tracing::info!(path = %path.display(), objective = solved.objective, "solution written");
    Ok(())
}

/// Parse a solution file for `instance`.
pub fn read_solution(text: &str, instance: &Instance) -> Result<(u64, Schedule), ScheduleError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (_, objective) = lines.next().ok_or(ScheduleError::MissingObjective)?;
    let objective = objective
        .parse()
        .map_err(|_| ScheduleError::BadObjective(objective.to_string()))?;

    let mut groups = Vec::with_capacity(instance.weeks() * instance.groups());
    for week in 0..instance.weeks() {
        for group in 0..instance.groups() {
            let (line, content) = lines
                .next()
                .ok_or(ScheduleError::MissingGroup { week, group })?;
            let members = content
                .split_whitespace()
                .map(|token| {
                    token.parse().map_err(|_| ScheduleError::BadGolfer {
                        line,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<usize>, _>>()?;
            groups.push(members);
        }
    }

    Ok((objective, Schedule::from_slots(*instance, groups)))
}

/// `<path>.check`
pub fn check_file_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".check");
    PathBuf::from(name)
}

/// Re-read a written solution, check it, and record the verdict next to it.
///
/// Returns whether the schedule is a perfect social golfer schedule.
pub fn check_solution_file(path: &Path, instance: &Instance) -> Result<bool> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read solution file {}", path.display()))?;

    let verdict = read_solution(&text, instance)
        .map_err(|e| e.to_string())
        .and_then(|(_, schedule)| schedule.check().map_err(|e| e.to_string()));
    let valid = match verdict {
        Ok(()) => true,
        Err(reason) => {
            tracing::info!(%reason, "solution is not a perfect schedule");
            false
        }
    };

    let check_path = check_file_path(path);
    fs::write(&check_path, if valid { "valid\n" } else { "invalid\n" })
        .with_context(|| format!("failed to write {}", check_path.display()))?;
    Ok(valid)
}
