//! Rule rows as they come out of the data source, before any pattern is applied.
use std::fmt::Display;
use std::fmt::Formatter;

/// The input and output tables of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    Exams,
    Dates,
    Gaps,
    Precedences,
    Pins,
    Schedule,
    Violations,
    Log,
}

impl Table {
    pub fn file_name(self) -> &'static str {
        match self {
            Table::Exams => "exams.tsv",
            Table::Dates => "dates.tsv",
            Table::Gaps => "gaps.tsv",
            Table::Precedences => "precedences.tsv",
            Table::Pins => "pins.tsv",
            Table::Schedule => "schedule.tsv",
            Table::Violations => "violations.tsv",
            Table::Log => "log.txt",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Identifies a row for the messages about it; `line` is the 1-based line in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowRef {
    pub table: Table,
    pub line: usize,
}

impl RowRef {
    pub fn new(table: Table, line: usize) -> RowRef {
        RowRef { table, line }
    }
}

impl Display for RowRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, row {}", self.table, self.line)
    }
}

/// `first` and `second` should be `min_days` (hard) or preferably `ideal_days` (soft, weighted)
/// apart. A day count of [`None`] means the row does not ask for that gap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GapRule {
    pub row: RowRef,
    pub first: String,
    pub second: String,
    pub min_days: Option<u32>,
    pub ideal_days: Option<u32>,
    pub weight: i64,
}

/// Every exam matched by `first` takes place no later than its counterpart matched by `second`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecedenceRule {
    pub row: RowRef,
    pub first: String,
    pub second: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinRule {
    pub row: RowRef,
    pub pattern: String,
    pub date: String,
}

/// A line of an earlier schedule; names the exam exactly, without patterns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintRow {
    pub row: RowRef,
    pub exam: String,
    pub date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub gaps: Vec<GapRule>,
    pub precedences: Vec<PrecedenceRule>,
    pub pins: Vec<PinRule>,
    pub hints: Vec<HintRow>,
}
