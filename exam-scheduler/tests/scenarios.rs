#![cfg(test)]

use std::time::Duration;

use exam_scheduler::compiler::compile;
use exam_scheduler::compiler::GapRule;
use exam_scheduler::compiler::PinRule;
use exam_scheduler::compiler::PrecedenceRule;
use exam_scheduler::compiler::RowRef;
use exam_scheduler::compiler::RuleSet;
use exam_scheduler::compiler::Table;
use exam_scheduler::interpreter::GapViolation;
use exam_scheduler::interpreter::Interpretation;
use exam_scheduler::run::schedule;
use exam_scheduler::run::BuiltRun;
use exam_scheduler::run::FinishedRun;
use exam_scheduler::run::RunOptions;
use exam_scheduler::run::RunState;
use exam_scheduler::DuplicateKind;
use exam_scheduler::Notice;
use exam_scheduler::Registry;
use exam_scheduler::RunLog;
use scheduler_oracle::constraints::Constraint;
use scheduler_oracle::PumpkinOracle;
use scheduler_oracle::SolveLimits;

fn registry(exams: &[(&str, i32)], capacities: &[i32]) -> Registry {
    let mut registry = Registry::default();
    for &(name, demand) in exams {
        let _ = registry.add_exam(name, demand).expect("distinct exams");
    }
    for (i, &capacity) in capacities.iter().enumerate() {
        let _ = registry
            .add_date(&format!("d{i}"), capacity)
            .expect("distinct dates");
    }
    registry
}

fn gap(line: usize, first: &str, second: &str, min: Option<u32>, ideal: Option<u32>) -> GapRule {
    GapRule {
        row: RowRef::new(Table::Gaps, line),
        first: first.to_owned(),
        second: second.to_owned(),
        min_days: min,
        ideal_days: ideal,
        weight: 1,
    }
}

fn precedence(line: usize, first: &str, second: &str) -> PrecedenceRule {
    PrecedenceRule {
        row: RowRef::new(Table::Precedences, line),
        first: first.to_owned(),
        second: second.to_owned(),
    }
}

fn pin(line: usize, pattern: &str, date: &str) -> PinRule {
    PinRule {
        row: RowRef::new(Table::Pins, line),
        pattern: pattern.to_owned(),
        date: date.to_owned(),
    }
}

fn solve<'registry>(
    registry: &'registry Registry,
    rules: &RuleSet,
    log: &mut RunLog,
) -> FinishedRun<'registry> {
    schedule(
        registry,
        rules,
        &RunOptions::default(),
        &mut PumpkinOracle::default(),
        log,
    )
    .expect("valid rules")
}

/// The date label of a scheduled exam.
fn date_of<'a>(interpretation: &'a Interpretation, exam: &str) -> &'a str {
    interpretation
        .schedule
        .iter()
        .find(|entry| entry.exam == exam)
        .map(|entry| entry.date.as_str())
        .expect("scheduled exam")
}

fn position(label: &str) -> i32 {
    label
        .trim_start_matches('d')
        .parse()
        .expect("dates are labelled d<position>")
}

#[test]
fn pinned_exam_and_minimal_gap() {
    let registry = registry(
        &[("Exam 1", 1), ("Exam 2", 1), ("Exam 3", 1)],
        &[2, 2, 2],
    );
    let rules = RuleSet {
        gaps: vec![gap(2, "Exam 1", "Exam 2", Some(2), None)],
        pins: vec![pin(2, "Exam 3", "d0")],
        ..RuleSet::default()
    };
    let mut log = RunLog::default();

    let run = solve(&registry, &rules, &mut log);

    assert!(run.state().has_solution());
    let interpretation = run.interpret().expect("solved");
    assert_eq!("d0", date_of(&interpretation, "Exam 3"));
    let first = position(date_of(&interpretation, "Exam 1"));
    let second = position(date_of(&interpretation, "Exam 2"));
    assert!((first - second).abs() >= 2);
    assert!(interpretation.violations.is_empty());
    for date in ["d0", "d1", "d2"] {
        let on_date = interpretation
            .schedule
            .iter()
            .filter(|entry| entry.date == date)
            .count();
        assert!(on_date <= 2);
    }
}

#[test]
fn unmet_ideal_gap_is_reported() {
    let registry = registry(&[("Algebra", 1), ("Physics", 1)], &[1, 1]);
    let rules = RuleSet {
        gaps: vec![gap(2, "Algebra", "Physics", None, Some(3))],
        ..RuleSet::default()
    };
    let mut log = RunLog::default();

    let run = solve(&registry, &rules, &mut log);

    assert_eq!(RunState::Optimal, run.state());
    assert_eq!(Some(1), run.objective_value());
    assert_eq!(
        vec![GapViolation {
            first: "Algebra".to_owned(),
            second: "Physics".to_owned(),
            requested_days: 3,
            actual_days: 1,
        }],
        run.interpret().expect("solved").violations
    );
}

#[test]
fn capacity_cannot_be_exceeded() {
    let registry = registry(&[("Algebra", 3), ("Physics", 3)], &[4]);
    let mut log = RunLog::default();

    let run = solve(&registry, &RuleSet::default(), &mut log);

    assert_eq!(RunState::Infeasible, run.state());
    assert!(run.interpret().is_none());
    assert!(log
        .notices()
        .any(|notice| notice.to_string().starts_with("Solver status: INFEASIBLE")));
}

#[test]
fn smaller_dates_hold_fewer_exams() {
    let registry = registry(
        &[("Algebra", 1), ("Physics", 1), ("Biology", 1)],
        &[1, 2],
    );
    let mut log = RunLog::default();

    let run = solve(&registry, &RuleSet::default(), &mut log);

    let interpretation = run.interpret().expect("solved");
    let on_first_date = interpretation
        .schedule
        .iter()
        .filter(|entry| entry.date == "d0")
        .count();
    assert_eq!(1, on_first_date);
    assert_eq!(3, interpretation.schedule.len());
}

#[test]
fn precedences_are_respected() {
    let registry = registry(&[("Algebra", 1), ("Physics", 1), ("Biology", 1)], &[1, 1, 1]);
    let rules = RuleSet {
        precedences: vec![precedence(2, "Physics", "Algebra")],
        pins: vec![pin(2, "Biology", "d0")],
        ..RuleSet::default()
    };
    let mut log = RunLog::default();

    let run = solve(&registry, &rules, &mut log);

    let interpretation = run.interpret().expect("solved");
    assert_eq!("d1", date_of(&interpretation, "Physics"));
    assert_eq!("d2", date_of(&interpretation, "Algebra"));
}

#[test]
fn precedence_allows_the_same_date() {
    let registry = registry(&[("Algebra", 1), ("Physics", 1)], &[2]);
    let rules = RuleSet {
        precedences: vec![precedence(2, "Algebra", "Physics")],
        ..RuleSet::default()
    };
    let mut log = RunLog::default();

    let run = solve(&registry, &rules, &mut log);

    assert_eq!(RunState::Optimal, run.state());
}

#[test]
fn redundant_ideal_gap_is_not_optimised() {
    let registry = registry(&[("Algebra", 1), ("Physics", 1)], &[1, 1, 1]);
    let rules = RuleSet {
        gaps: vec![gap(2, "Algebra", "Physics", Some(2), Some(2))],
        ..RuleSet::default()
    };
    let mut log = RunLog::default();
    let relations = compile(&registry, &rules, &mut log).expect("valid rules");

    let run = BuiltRun::new(&registry, &relations, &RunOptions::default()).expect("valid model");

    assert!(run.schedule_model().soft_gaps().is_empty());
    assert!(run.schedule_model().model().objective().is_none());
    assert!(log.notices().any(|notice| matches!(
        notice,
        Notice::RedundantIdealGap {
            min_days: 2,
            ideal_days: 2,
            ..
        }
    )));

    let run = run.solve(&mut PumpkinOracle::default(), &mut log);
    assert!(run.interpret().expect("solved").violations.is_empty());
}

#[test]
fn repeated_rules_are_reported_once() {
    let registry = registry(&[("Algebra", 1), ("Physics", 1)], &[1, 1, 1]);
    let rules = RuleSet {
        gaps: vec![
            gap(2, "Algebra", "Physics", Some(1), None),
            gap(3, "Physics", "Algebra", Some(1), None),
            gap(4, "Algebra", "Physics", Some(2), None),
        ],
        ..RuleSet::default()
    };
    let mut log = RunLog::default();

    let relations = compile(&registry, &rules, &mut log).expect("valid rules");

    let duplicates = log
        .notices()
        .filter_map(|notice| match notice {
            Notice::Duplicate { row, kind } => Some((row.line, *kind)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            (3, DuplicateKind::NonOverriding),
            (4, DuplicateKind::Overriding)
        ],
        duplicates
    );
    let (_, relation) = relations.gaps.iter().next().expect("one pair");
    assert_eq!(Some(2), relation.min_days);
}

#[test]
fn wildcard_rules_pair_related_exams() {
    let registry = registry(
        &[
            ("Algebra A", 1),
            ("Algebra B", 1),
            ("Physics A", 1),
            ("Physics B", 1),
        ],
        &[2, 2],
    );
    let rules = RuleSet {
        gaps: vec![gap(2, "Algebra (#)", r"Physics \1", Some(1), None)],
        ..RuleSet::default()
    };
    let mut log = RunLog::default();

    let run = solve(&registry, &rules, &mut log);

    let interpretation = run.interpret().expect("solved");
    for variant in ["A", "B"] {
        assert_ne!(
            date_of(&interpretation, &format!("Algebra {variant}")),
            date_of(&interpretation, &format!("Physics {variant}"))
        );
    }
    let gaps = run
        .schedule_model()
        .model()
        .constraints()
        .iter()
        .filter(|constraint| matches!(constraint, Constraint::NoOverlap { .. }))
        .count();
    assert_eq!(2, gaps);
}

#[test]
fn unmatched_rules_are_warned_about() {
    let registry = registry(&[("Algebra", 1)], &[1]);
    let rules = RuleSet {
        precedences: vec![precedence(5, "Chemistry", "Algebra")],
        ..RuleSet::default()
    };
    let mut log = RunLog::default();

    let run = solve(&registry, &rules, &mut log);

    assert_eq!(RunState::Optimal, run.state());
    assert_eq!(
        Some("Constraint in precedences.tsv, row 5 yielded 0 matches".to_owned()),
        log.notices().next().map(ToString::to_string)
    );
}

#[test]
fn course_families_with_ideal_gaps_are_solved_within_a_short_time_limit() {
    // Two years of eight courses, each with an A and a B session.
    let mut exams = vec![];
    for year in 1..=2 {
        for course in 1..=8 {
            for session in ["A", "B"] {
                exams.push(format!("Y{year} C{course:02} {session}"));
            }
        }
    }
    let exams = exams
        .iter()
        .map(|name| (name.as_str(), 1))
        .collect::<Vec<_>>();
    let capacities = (0..40).map(|day| 4 + day % 5).collect::<Vec<_>>();
    let registry = registry(&exams, &capacities);

    let rules = RuleSet {
        gaps: vec![
            gap(2, "(Y#) (C##) A", r"\1 \2 B", Some(7), Some(14)),
            gap(3, "(Y#) C## A", r"\1 C## A", Some(1), Some(3)),
            gap(4, "(Y#) C## B", r"\1 C## B", Some(1), Some(3)),
        ],
        ..RuleSet::default()
    };
    let options = RunOptions {
        limits: SolveLimits {
            time_limit: Some(Duration::from_secs(10)),
            absolute_gap_limit: None,
        },
        ..RunOptions::default()
    };
    let mut log = RunLog::default();

    let run = schedule(
        &registry,
        &rules,
        &options,
        &mut PumpkinOracle::default(),
        &mut log,
    )
    .expect("valid rules");

    assert!(run.state().has_solution());
    let interpretation = run.interpret().expect("solved");
    assert_eq!(32, interpretation.schedule.len());

    for year in 1..=2 {
        for session in ["A", "B"] {
            let mut days = (1..=8)
                .map(|course| {
                    position(date_of(
                        &interpretation,
                        &format!("Y{year} C{course:02} {session}"),
                    ))
                })
                .collect::<Vec<_>>();
            days.sort_unstable();
            days.dedup();
            assert_eq!(8, days.len(), "Y{year} {session} sessions share a date");
        }
        for course in 1..=8 {
            let first = position(date_of(&interpretation, &format!("Y{year} C{course:02} A")));
            let second = position(date_of(&interpretation, &format!("Y{year} C{course:02} B")));
            assert!((first - second).abs() >= 7);
        }
    }
    for (day, &capacity) in capacities.iter().enumerate() {
        let label = format!("d{day}");
        let on_date = interpretation
            .schedule
            .iter()
            .filter(|entry| entry.date == label)
            .count();
        assert!(i32::try_from(on_date).expect("small") <= capacity);
    }
}
