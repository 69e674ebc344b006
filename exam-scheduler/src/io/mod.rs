//! The tables of a scheduling run, stored as tab-separated files in one directory.
//!
//! Every table starts with a header line. Lines are numbered from 1 (the header), and these
//! numbers are the rows referred to in messages.
mod reader;
mod writer;

pub use reader::*;
pub use writer::*;

use crate::compiler::RowRef;
use crate::compiler::Table;
use crate::error::TableError;

/// One data line of a table with its cells trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Row<'content> {
    table: Table,
    line: usize,
    cells: Vec<&'content str>,
}

impl<'content> Row<'content> {
    fn row_ref(&self) -> RowRef {
        RowRef::new(self.table, self.line)
    }

    /// The cell in `column` (0-based); missing cells are blank.
    fn cell(&self, column: usize) -> &'content str {
        self.cells.get(column).copied().unwrap_or("")
    }

    fn any_blank(&self, columns: impl IntoIterator<Item = usize>) -> bool {
        columns.into_iter().any(|column| self.cell(column).is_empty())
    }

    fn expect_columns(&self, expected: usize) -> Result<(), TableError> {
        if self.cells.len() < expected {
            return Err(TableError::MissingColumns {
                table: self.table,
                line: self.line,
                expected,
                found: self.cells.len(),
            });
        }
        Ok(())
    }

    fn malformed(&self, column: usize) -> TableError {
        TableError::MalformedInteger {
            table: self.table,
            line: self.line,
            column: column + 1,
            value: self.cell(column).to_owned(),
        }
    }

    fn integer<T: TryFrom<u32>>(&self, column: usize) -> Result<T, TableError> {
        self.cell(column)
            .parse::<u32>()
            .ok()
            .and_then(|value| T::try_from(value).ok())
            .ok_or_else(|| self.malformed(column))
    }

    /// A non-negative integer, or [`None`] for a blank cell.
    fn optional_integer<T: TryFrom<u32>>(&self, column: usize) -> Result<Option<T>, TableError> {
        if self.cell(column).is_empty() {
            return Ok(None);
        }
        self.integer(column).map(Some)
    }
}

/// Splits `content` into its data lines, skipping the header and lines without any content.
fn rows(table: Table, content: &str) -> impl Iterator<Item = Row<'_>> {
    content
        .lines()
        .enumerate()
        .skip(1)
        .map(move |(index, line)| Row {
            table,
            line: index + 1,
            cells: line.split('\t').map(str::trim).collect(),
        })
        .filter(|row| row.cells.iter().any(|cell| !cell.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_empty_lines_are_skipped() {
        let content = "name\tdemand\nAlgebra\t2\n\n \t \nPhysics\t1\r\n";

        let rows = rows(Table::Exams, content).collect::<Vec<_>>();

        assert_eq!(2, rows.len());
        assert_eq!((2, vec!["Algebra", "2"]), (rows[0].line, rows[0].cells.clone()));
        assert_eq!((5, vec!["Physics", "1"]), (rows[1].line, rows[1].cells.clone()));
    }

    #[test]
    fn integers_must_be_non_negative() {
        let row = Row {
            table: Table::Gaps,
            line: 7,
            cells: vec!["A", "B", "-1", "", "x"],
        };

        assert_eq!(None, row.optional_integer::<u32>(3).expect("blank"));
        let Err(TableError::MalformedInteger { column, value, .. }) = row.integer::<u32>(2) else {
            panic!("a negative day count is malformed");
        };
        assert_eq!((3, "-1".to_owned()), (column, value));
        assert!(row.integer::<i64>(4).is_err());
    }

    #[test]
    fn short_rows_are_reported() {
        let row = Row {
            table: Table::Exams,
            line: 3,
            cells: vec!["Algebra"],
        };

        assert!(matches!(
            row.expect_columns(2),
            Err(TableError::MissingColumns {
                line: 3,
                expected: 2,
                found: 1,
                ..
            })
        ));
    }
}
