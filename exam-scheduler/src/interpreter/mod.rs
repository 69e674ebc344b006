//! Reads a schedule and the unmet ideal gaps off an assignment of the oracle.
//!
//! The assignment is trusted to satisfy every hard constraint; nothing is re-checked here.
use scheduler_oracle::Solution;

use crate::builder::ScheduleModel;
use crate::registry::DateId;
use crate::registry::ExamId;
use crate::registry::Registry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledExam {
    pub exam: String,
    pub date: String,
}

/// An ideal gap which the assignment does not meet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GapViolation {
    pub first: String,
    pub second: String,
    pub requested_days: u32,
    pub actual_days: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Interpretation {
    /// Sorted by date; exams on the same date keep their registry order.
    pub schedule: Vec<ScheduledExam>,
    pub violations: Vec<GapViolation>,
}

fn assigned_date(
    registry: &Registry,
    schedule_model: &ScheduleModel,
    solution: &Solution,
    exam: ExamId,
) -> Option<DateId> {
    registry.date_at(solution.get_integer_value(schedule_model.exam_variable(exam)))
}

pub fn interpret(
    registry: &Registry,
    schedule_model: &ScheduleModel,
    solution: &Solution,
) -> Interpretation {
    let mut placed = registry
        .exams()
        .filter(|&(exam, _)| !registry.is_placeholder(exam))
        .filter_map(|(exam, info)| {
            assigned_date(registry, schedule_model, solution, exam).map(|date| (date, info))
        })
        .collect::<Vec<_>>();
    placed.sort_by_key(|&(date, _)| date);

    let schedule = placed
        .into_iter()
        .map(|(date, info)| ScheduledExam {
            exam: info.name.clone(),
            date: registry.date(date).label.clone(),
        })
        .collect();

    let violations = schedule_model
        .soft_gaps()
        .iter()
        .filter(|gap| solution.get_boolean_value(gap.violated))
        .filter(|gap| {
            !registry.is_placeholder(gap.pair.first()) && !registry.is_placeholder(gap.pair.second())
        })
        .map(|gap| {
            let first = solution.get_integer_value(schedule_model.exam_variable(gap.pair.first()));
            let second =
                solution.get_integer_value(schedule_model.exam_variable(gap.pair.second()));
            GapViolation {
                first: registry.exam(gap.pair.first()).name.clone(),
                second: registry.exam(gap.pair.second()).name.clone(),
                requested_days: gap.days,
                actual_days: first.abs_diff(second),
            }
        })
        .collect();

    Interpretation {
        schedule,
        violations,
    }
}
