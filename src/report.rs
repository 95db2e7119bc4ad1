//! Human-readable schedule report.

use std::{cmp::Reverse, io::Write};

use anyhow::Result;
use itertools::Itertools;
use prettytable::{Table, cell, format, row};
use rayon::prelude::*;

use crate::schedule::SolvedSchedule;

/// Write one table per week and a table of pairs meeting more than once.
pub fn write_report<W: Write>(out: &mut W, solved: &SolvedSchedule) -> Result<()> {
    let schedule = &solved.schedule;
    let instance = schedule.instance();

    writeln!(out, "Instance: {}", instance)?;
    writeln!(out, "Solver status: {}", solved.status)?;
    writeln!(out, "Redundant meetings: {}", solved.objective)?;

    for week in 0..instance.weeks() {
        let mut table = Table::new();
        table.set_titles(row!["Group", "Golfers"]);
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        for (group, members) in schedule.week(week).enumerate() {
            table.add_row(row![group, members.iter().join(" ")]);
        }

        writeln!(out, "\nWeek {}:", week)?;
        table.print(out)?;
    }

    let mut repeated = schedule.repeated_pairs();
    repeated.par_sort_unstable_by_key(|&(p0, p1, count)| (Reverse(count), p0, p1));

    writeln!(out, "\nRepeated pairs: {}", repeated.len())?;
    if !repeated.is_empty() {
        let mut table = Table::new();
        table.set_titles(row!["Golfer", "Golfer", "Meetings"]);
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        for (p0, p1, count) in repeated {
            table.add_row(row![p0, p1, count]);
        }
        table.print(out)?;
    }

    Ok(())
}
