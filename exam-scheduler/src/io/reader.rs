use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use super::rows;
use crate::compiler::GapRule;
use crate::compiler::HintRow;
use crate::compiler::PinRule;
use crate::compiler::PrecedenceRule;
use crate::compiler::RuleSet;
use crate::compiler::Table;
use crate::error::SchedulerResult;
use crate::error::TableError;
use crate::registry::Registry;

/// Everything read from an input directory.
#[derive(Clone, Debug)]
pub struct InputTables {
    pub registry: Registry,
    pub rules: RuleSet,
}

/// Reads the table files of a run from `directory`.
///
/// `exams.tsv`, `dates.tsv`, `gaps.tsv` and `precedences.tsv` must exist; a missing `pins.tsv`
/// means there are no pins. `schedule.tsv` is only read when `warm_start` is set.
pub fn read_input(
    directory: &Path,
    placeholder_prefix: &str,
    warm_start: bool,
) -> SchedulerResult<InputTables> {
    let mut registry = Registry::new(placeholder_prefix);
    parse_exams(&read_table(directory, Table::Exams)?, &mut registry)?;
    parse_dates(&read_table(directory, Table::Dates)?, &mut registry)?;

    let pins = match read_optional_table(directory, Table::Pins)? {
        Some(content) => parse_pins(&content),
        None => vec![],
    };
    let hints = if warm_start {
        parse_hints(&read_table(directory, Table::Schedule)?)
    } else {
        vec![]
    };
    let rules = RuleSet {
        gaps: parse_gaps(&read_table(directory, Table::Gaps)?)?,
        precedences: parse_precedences(&read_table(directory, Table::Precedences)?),
        pins,
        hints,
    };

    debug!(
        "Read {} exams, {} dates, {} gap rules, {} precedence rules, {} pin rules and {} hints",
        registry.num_exams(),
        registry.horizon(),
        rules.gaps.len(),
        rules.precedences.len(),
        rules.pins.len(),
        rules.hints.len()
    );

    Ok(InputTables { registry, rules })
}

fn read_optional_table(directory: &Path, table: Table) -> Result<Option<String>, TableError> {
    match fs::read_to_string(directory.join(table.file_name())) {
        Ok(content) => Ok(Some(content)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(TableError::Io { table, source }),
    }
}

fn read_table(directory: &Path, table: Table) -> Result<String, TableError> {
    read_optional_table(directory, table)?.ok_or_else(|| TableError::Missing {
        table,
        path: directory.join(table.file_name()),
    })
}

/// Columns: name, demand. Rows without a name are skipped.
pub fn parse_exams(content: &str, registry: &mut Registry) -> SchedulerResult<()> {
    for row in rows(Table::Exams, content) {
        if row.any_blank([0]) {
            continue;
        }
        row.expect_columns(2)?;
        let _ = registry.add_exam(row.cell(0), row.integer(1)?)?;
    }
    Ok(())
}

/// Columns: label, capacity. A blank capacity is 0.
pub fn parse_dates(content: &str, registry: &mut Registry) -> SchedulerResult<()> {
    for row in rows(Table::Dates, content) {
        if row.any_blank([0]) {
            continue;
        }
        let capacity = row.optional_integer(1)?.unwrap_or(0);
        let _ = registry.add_date(row.cell(0), capacity)?;
    }
    Ok(())
}

/// Columns: pattern 1, pattern 2, minimal days, ideal days, weight.
///
/// Blank day counts are absent and a blank weight is 1. Rows without both patterns are skipped.
pub fn parse_gaps(content: &str) -> Result<Vec<GapRule>, TableError> {
    rows(Table::Gaps, content)
        .filter(|row| !row.any_blank([0, 1]))
        .map(|row| -> Result<GapRule, TableError> {
            Ok(GapRule {
                row: row.row_ref(),
                first: row.cell(0).to_owned(),
                second: row.cell(1).to_owned(),
                min_days: row.optional_integer(2)?,
                ideal_days: row.optional_integer(3)?,
                weight: row.optional_integer(4)?.unwrap_or(1),
            })
        })
        .collect()
}

/// Columns: pattern 1, pattern 2; the exams of pattern 1 take place no later than those of
/// pattern 2.
pub fn parse_precedences(content: &str) -> Vec<PrecedenceRule> {
    rows(Table::Precedences, content)
        .filter(|row| !row.any_blank([0, 1]))
        .map(|row| PrecedenceRule {
            row: row.row_ref(),
            first: row.cell(0).to_owned(),
            second: row.cell(1).to_owned(),
        })
        .collect()
}

/// Columns: pattern, date label.
pub fn parse_pins(content: &str) -> Vec<PinRule> {
    rows(Table::Pins, content)
        .filter(|row| !row.any_blank([0, 1]))
        .map(|row| PinRule {
            row: row.row_ref(),
            pattern: row.cell(0).to_owned(),
            date: row.cell(1).to_owned(),
        })
        .collect()
}

/// Columns: exam, date label; a schedule written by an earlier run.
pub fn parse_hints(content: &str) -> Vec<HintRow> {
    rows(Table::Schedule, content)
        .filter(|row| !row.any_blank([0, 1]))
        .map(|row| HintRow {
            row: row.row_ref(),
            exam: row.cell(0).to_owned(),
            date: row.cell(1).to_owned(),
        })
        .collect()
}
