use std::fmt::Display;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use log::info;

use crate::compiler::Table;
use crate::interpreter::Interpretation;
use crate::run_log::LogEntry;
use crate::run_log::Notice;
use crate::run_log::RunLog;

/// Writes the run log and, if the run produced one, the schedule with its unmet ideal gaps.
///
/// Without an interpretation the schedule and violation tables of an earlier run are left
/// untouched.
pub fn write_output(
    directory: &Path,
    interpretation: Option<&Interpretation>,
    log: &RunLog,
) -> std::io::Result<()> {
    if let Some(interpretation) = interpretation {
        write_table(directory, Table::Schedule, |writer| {
            write_schedule(writer, interpretation)
        })?;
        write_table(directory, Table::Violations, |writer| {
            write_violations(writer, interpretation)
        })?;
    }
    write_table(directory, Table::Log, |writer| write_log(writer, log))
}

/// Writes the run log of a run which stopped with a fatal error, ending with that error.
///
/// The schedule and violation tables of an earlier run are left untouched.
pub fn write_failure_log(
    directory: &Path,
    log: &RunLog,
    error: &impl Display,
) -> std::io::Result<()> {
    write_table(directory, Table::Log, |writer| write_failure(writer, log, error))
}

fn write_table(
    directory: &Path,
    table: Table,
    write: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let path = directory.join(table.file_name());
    let mut writer = BufWriter::new(File::create(&path)?);
    write(&mut writer)?;
    writer.flush()?;
    info!("Wrote {}", path.display());
    Ok(())
}

pub fn write_schedule(
    writer: &mut impl Write,
    interpretation: &Interpretation,
) -> std::io::Result<()> {
    writeln!(writer, "exam\tdate")?;
    for entry in &interpretation.schedule {
        writeln!(writer, "{}\t{}", entry.exam, entry.date)?;
    }
    Ok(())
}

pub fn write_violations(
    writer: &mut impl Write,
    interpretation: &Interpretation,
) -> std::io::Result<()> {
    writeln!(writer, "exam A\texam B\trequested gap\tactual gap")?;
    for violation in &interpretation.violations {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            violation.first, violation.second, violation.requested_days, violation.actual_days
        )?;
    }
    Ok(())
}

pub fn write_log(writer: &mut impl Write, log: &RunLog) -> std::io::Result<()> {
    for entry in log.entries() {
        writeln!(writer, "{entry}")?;
    }
    Ok(())
}

/// The entries of `log` followed by an entry for `error`, which is not recorded in `log` itself.
pub fn write_failure(
    writer: &mut impl Write,
    log: &RunLog,
    error: &impl Display,
) -> std::io::Result<()> {
    write_log(writer, log)?;
    let failure = LogEntry {
        elapsed: log.elapsed(),
        notice: Notice::ExecutionFailed {
            reason: error.to_string(),
        },
    };
    writeln!(writer, "{failure}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::RowRef;
    use crate::interpreter::GapViolation;
    use crate::interpreter::ScheduledExam;

    #[test]
    fn violations_are_written_one_per_line() {
        let interpretation = Interpretation {
            schedule: vec![ScheduledExam {
                exam: "Algebra".to_owned(),
                date: "Mon".to_owned(),
            }],
            violations: vec![GapViolation {
                first: "Algebra".to_owned(),
                second: "Physics".to_owned(),
                requested_days: 3,
                actual_days: 1,
            }],
        };
        let mut buffer = vec![];

        write_violations(&mut buffer, &interpretation).expect("in memory");

        assert_eq!(
            "exam A\texam B\trequested gap\tactual gap\nAlgebra\tPhysics\t3\t1\n",
            String::from_utf8(buffer).expect("utf-8")
        );
    }

    #[test]
    fn log_lines_carry_the_elapsed_time() {
        let mut log = RunLog::default();
        log.record(Notice::UnmetIdealGaps { count: 2 });
        let mut buffer = vec![];

        write_log(&mut buffer, &log).expect("in memory");

        let written = String::from_utf8(buffer).expect("utf-8");
        assert!(written.ends_with(
            "s >>> 2 requested gap constraint(s) could not be satisfied (see the violations table)\n"
        ));
    }

    #[test]
    fn failure_log_ends_with_the_error() {
        let mut log = RunLog::default();
        log.record(Notice::ZeroMatches {
            row: RowRef::new(Table::Gaps, 3),
        });
        let mut buffer = vec![];

        write_failure(&mut buffer, &log, &"unknown date 'Fri'").expect("in memory");

        let written = String::from_utf8(buffer).expect("utf-8");
        let lines = written.lines().collect::<Vec<_>>();
        assert_eq!(2, lines.len());
        assert!(lines[0].ends_with("Constraint in gaps.tsv, row 3 yielded 0 matches"));
        assert!(lines[1].ends_with(">>> Execution failed, error: unknown date 'Fri'"));
        assert_eq!(1, log.entries().len());
    }
}
