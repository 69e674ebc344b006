#![cfg(test)]

use std::fs;
use std::path::Path;

use exam_scheduler::builder::HintPolicy;
use exam_scheduler::compiler::Table;
use exam_scheduler::io::read_input;
use exam_scheduler::io::write_failure_log;
use exam_scheduler::io::write_output;
use exam_scheduler::run::schedule;
use exam_scheduler::run::RunOptions;
use exam_scheduler::run::RunState;
use exam_scheduler::Notice;
use exam_scheduler::RunLog;
use exam_scheduler::SchedulerError;
use exam_scheduler::TableError;
use scheduler_oracle::PumpkinOracle;
use scheduler_oracle::SolveStatus;

fn write(directory: &Path, table: Table, content: &str) {
    fs::write(directory.join(table.file_name()), content).expect("writable temporary directory");
}

fn read(directory: &Path, table: Table) -> String {
    fs::read_to_string(directory.join(table.file_name())).expect("written table")
}

fn write_input(directory: &Path) {
    write(
        directory,
        Table::Exams,
        "name\tdemand\nAlgebra 1\t1\nAlgebra  2\t1\nPhysics\t1\n_Reserved\t1\n",
    );
    write(directory, Table::Dates, "date\tcapacity\nMon\t2\nTue\t2\nWed\t2\n");
    write(
        directory,
        Table::Gaps,
        "pattern 1\tpattern 2\tmin days\tideal days\tweight\n\
         Algebra 1\tAlgebra 2\t2\t\t\n\
         Physics\tAlgebra #\t\t3\t5\n",
    );
    write(
        directory,
        Table::Precedences,
        "pattern 1\tpattern 2\nAlgebra 1\tAlgebra 2\n",
    );
    write(directory, Table::Pins, "pattern\tdate\n_Reserved\tTue\n");
}

#[test]
fn tables_round_trip_through_a_run() {
    let input = tempfile::tempdir().expect("temporary directory");
    let output = tempfile::tempdir().expect("temporary directory");
    write_input(input.path());
    let mut log = RunLog::default();

    let tables = read_input(input.path(), "_", false).expect("valid tables");
    let run = schedule(
        &tables.registry,
        &tables.rules,
        &RunOptions::default(),
        &mut PumpkinOracle::default(),
        &mut log,
    )
    .expect("valid rules");
    write_output(output.path(), run.interpret().as_ref(), &log).expect("writable output");

    assert_eq!(RunState::Optimal, run.state());
    let schedule = read(output.path(), Table::Schedule);
    let lines = schedule.lines().collect::<Vec<_>>();
    assert_eq!("exam\tdate", lines[0]);
    assert_eq!(4, lines.len());
    assert!(lines.contains(&"Algebra 1\tMon"));
    assert!(lines.contains(&"Algebra 2\tWed"));
    assert!(!schedule.contains("_Reserved"));

    let violations = read(output.path(), Table::Violations);
    let violation_count = violations.lines().count() - 1;
    assert_eq!(Some(5 * violation_count as i64), run.objective_value());

    let written_log = read(output.path(), Table::Log);
    assert_eq!(log.entries().len(), written_log.lines().count());
    assert!(written_log.contains("Solver status: OPTIMAL"));
}

#[test]
fn earlier_schedule_is_used_as_hints() {
    let directory = tempfile::tempdir().expect("temporary directory");
    write_input(directory.path());
    write(
        directory.path(),
        Table::Schedule,
        "exam\tdate\nAlgebra 1\tMon\nAlgebra 2\tWed\nChemistry\tTue\nPhysics\tFri\n",
    );
    let mut log = RunLog::default();

    let tables = read_input(directory.path(), "_", true).expect("valid tables");
    assert_eq!(4, tables.rules.hints.len());

    let options = RunOptions {
        hints: HintPolicy {
            enabled: true,
            ..HintPolicy::default()
        },
        ..RunOptions::default()
    };
    let run = schedule(
        &tables.registry,
        &tables.rules,
        &options,
        &mut PumpkinOracle::default(),
        &mut log,
    )
    .expect("valid rules");

    assert_eq!(2, run.schedule_model().model().hints().len());
    assert!(log.notices().any(
        |notice| matches!(notice, Notice::UnknownHintExam { exam, .. } if exam == "Chemistry")
    ));
    assert!(log.notices().any(
        |notice| matches!(notice, Notice::UnknownHintDate { label, .. } if label == "Fri")
    ));
    assert_eq!(RunState::Optimal, run.state());
}

#[test]
fn missing_tables_are_reported() {
    let directory = tempfile::tempdir().expect("temporary directory");
    write_input(directory.path());
    fs::remove_file(directory.path().join(Table::Gaps.file_name())).expect("existing table");

    let result = read_input(directory.path(), "_", false);

    assert!(matches!(
        result,
        Err(SchedulerError::Table(TableError::Missing {
            table: Table::Gaps,
            ..
        }))
    ));
}

#[test]
fn pins_are_optional() {
    let directory = tempfile::tempdir().expect("temporary directory");
    write_input(directory.path());
    fs::remove_file(directory.path().join(Table::Pins.file_name())).expect("existing table");

    let tables = read_input(directory.path(), "_", false).expect("valid tables");

    assert!(tables.rules.pins.is_empty());
}

#[test]
fn failed_runs_only_write_the_log() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let mut log = RunLog::default();
    log.record(Notice::SolverStatus(SolveStatus::Infeasible));

    write_output(directory.path(), None, &log).expect("writable output");

    assert!(!directory.path().join(Table::Schedule.file_name()).exists());
    assert!(read(directory.path(), Table::Log).contains("INFEASIBLE"));
}

#[test]
fn fatal_errors_still_leave_a_log() {
    let directory = tempfile::tempdir().expect("temporary directory");
    write_input(directory.path());
    write(directory.path(), Table::Pins, "pattern\tdate\nPhysics\tFri\n");
    let mut log = RunLog::default();

    let tables = read_input(directory.path(), "_", false).expect("valid tables");
    let error = schedule(
        &tables.registry,
        &tables.rules,
        &RunOptions::default(),
        &mut PumpkinOracle::default(),
        &mut log,
    )
    .err()
    .expect("unknown pinned date");
    write_failure_log(directory.path(), &log, &error).expect("writable output");

    assert!(!directory.path().join(Table::Schedule.file_name()).exists());
    let written_log = read(directory.path(), Table::Log);
    let last_line = written_log.lines().last().expect("a failure entry");
    assert!(last_line.contains("Execution failed"));
    assert!(last_line.contains("unknown date 'Fri'"));
}
