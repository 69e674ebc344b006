//! Translates the registry and the compiled relations into a [`Model`] for an oracle.
//!
//! Every exam gets one variable: the position of its date on the timeline `[0, horizon)`. A pinned
//! exam has its variable fixed before any constraint is added.
//!
//! A gap of `d` days between two exams is a no-overlap of two intervals of length `d` anchored at
//! the exam variables. Minimal gaps share their intervals per exam and length. An ideal gap gets a
//! violation indicator; its intervals are only present when the indicator is false, and the
//! objective is the weighted sum of the indicators.
//!
//! The capacities of the dates are enforced by one cumulative constraint with the largest capacity
//! as its limit. Each exam uses its demand for one time unit at its date, and every date with a
//! lower capacity is filled up with a fixed phantom consumer of `max capacity - capacity`.
use std::collections::BTreeMap;

use log::debug;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;
use scheduler_oracle::constraints;
use scheduler_oracle::containers::KeyedVec;
use scheduler_oracle::containers::StorageKey;
use scheduler_oracle::BoolVar;
use scheduler_oracle::IntVar;
use scheduler_oracle::IntervalId;
use scheduler_oracle::LinearExpression;
use scheduler_oracle::Model;

use crate::compiler::CompiledRelations;
use crate::compiler::ExamPair;
use crate::error::BuildError;
use crate::registry::ExamId;
use crate::registry::Registry;

/// Which hints of an earlier schedule are passed on to the oracle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HintPolicy {
    pub enabled: bool,
    /// Every hint is kept independently with this probability.
    pub probability: f64,
    pub seed: u64,
}

impl Default for HintPolicy {
    fn default() -> Self {
        HintPolicy {
            enabled: true,
            probability: 1.0,
            seed: 42,
        }
    }
}

/// An ideal gap which made it into the objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoftGap {
    pub pair: ExamPair,
    pub days: u32,
    pub weight: i64,
    /// True when the exams are closer than `days`.
    pub violated: BoolVar,
}

#[derive(Clone, Debug)]
pub struct ScheduleModel {
    model: Model,
    exam_variables: KeyedVec<ExamId, IntVar>,
    soft_gaps: Vec<SoftGap>,
}

impl ScheduleModel {
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn exam_variable(&self, exam: ExamId) -> IntVar {
        self.exam_variables[exam]
    }

    pub fn exam_variables(&self) -> impl Iterator<Item = (ExamId, IntVar)> + '_ {
        self.exam_variables
            .iter_with_keys()
            .map(|(exam, &variable)| (exam, variable))
    }

    pub fn soft_gaps(&self) -> &[SoftGap] {
        &self.soft_gaps
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn check_relations(registry: &Registry, relations: &CompiledRelations) -> Result<(), BuildError> {
    let exams = relations
        .gaps
        .iter()
        .flat_map(|(pair, _)| [pair.first(), pair.second()])
        .chain(relations.precedences.iter().flat_map(|&(a, b)| [a, b]))
        .chain(relations.pins.iter().map(|(&exam, _)| exam))
        .chain(relations.hints.keys().copied());
    for exam in exams {
        if !registry.contains_exam(exam) {
            return Err(BuildError::ExamOutOfRange(exam));
        }
    }

    let dates = relations
        .pins
        .iter()
        .map(|(_, &date)| date)
        .chain(relations.hints.values().copied());
    for date in dates {
        if !registry.contains_date(date) {
            return Err(BuildError::DateOutOfRange(date));
        }
    }
    Ok(())
}

pub fn build(
    registry: &Registry,
    relations: &CompiledRelations,
    hint_policy: &HintPolicy,
) -> Result<ScheduleModel, BuildError> {
    let horizon = registry.horizon();
    if horizon == 0 {
        return Err(BuildError::NoDates);
    }
    if registry.num_exams() == 0 {
        return Err(BuildError::NoExams);
    }
    check_relations(registry, relations)?;

    let last_position = i32::try_from(horizon - 1).unwrap_or(i32::MAX);
    let mut model = Model::default();

    let exam_variables = registry
        .exams()
        .map(|(exam, _)| {
            model.new_bounded_integer(0, last_position, format!("exam_{}", exam.index()))
        })
        .collect::<KeyedVec<ExamId, IntVar>>();

    for (&exam, &date) in relations.pins.iter() {
        model.fix(exam_variables[exam], date.position())?;
    }

    let mut gap_intervals: BTreeMap<(ExamId, u32), IntervalId> = BTreeMap::new();
    let mut min_gap_interval =
        |model: &mut Model, exam: ExamId, days: u32| -> Result<IntervalId, BuildError> {
            if let Some(&interval) = gap_intervals.get(&(exam, days)) {
                return Ok(interval);
            }
            let interval = model.new_fixed_size_interval(
                exam_variables[exam],
                to_i32(days),
                format!("mingap_{}_{days}", exam.index()),
            )?;
            let _ = gap_intervals.insert((exam, days), interval);
            Ok(interval)
        };
    for (&pair, relation) in relations.gaps.iter() {
        let Some(days) = relation.enabled_min_days() else {
            continue;
        };
        let first = min_gap_interval(&mut model, pair.first(), days)?;
        let second = min_gap_interval(&mut model, pair.second(), days)?;
        model.add_constraint(constraints::no_overlap([first, second]))?;
    }

    let mut soft_gaps = vec![];
    for (&pair, relation) in relations.gaps.iter() {
        let Some(ideal) = relation.enabled_ideal() else {
            continue;
        };
        let (first, second) = (pair.first(), pair.second());
        let (i, j) = (first.index(), second.index());
        let violated = model.new_boolean(format!("violation_{i}_{j}"));
        let first_interval = model.new_optional_fixed_size_interval(
            exam_variables[first],
            to_i32(ideal.days),
            violated.negated(),
            format!("idealgap_{i}_{j}"),
        )?;
        let second_interval = model.new_optional_fixed_size_interval(
            exam_variables[second],
            to_i32(ideal.days),
            violated.negated(),
            format!("idealgap_{j}_{i}"),
        )?;
        model.add_constraint(constraints::no_overlap([first_interval, second_interval]))?;
        soft_gaps.push(SoftGap {
            pair,
            days: ideal.days,
            weight: ideal.weight,
            violated,
        });
    }

    add_capacity(registry, &exam_variables, &mut model)?;

    for &(before, after) in &relations.precedences {
        model.add_constraint(constraints::less_than_or_equals(
            exam_variables[before],
            exam_variables[after],
        ))?;
    }

    if !soft_gaps.is_empty() {
        model.minimise(LinearExpression::weighted_sum(
            soft_gaps
                .iter()
                .map(|gap| (gap.weight, gap.violated.as_integer())),
        ))?;
    }

    if hint_policy.enabled {
        add_hints(relations, hint_policy, &exam_variables, &mut model)?;
    }

    debug!(
        "Built a model with {} variables, {} intervals, {} constraints and {} hints",
        model.num_variables(),
        model.num_intervals(),
        model.constraints().len(),
        model.hints().len()
    );

    Ok(ScheduleModel {
        model,
        exam_variables,
        soft_gaps,
    })
}

fn add_capacity(
    registry: &Registry,
    exam_variables: &KeyedVec<ExamId, IntVar>,
    model: &mut Model,
) -> Result<(), BuildError> {
    let max_capacity = registry.max_capacity().ok_or(BuildError::NoDates)?.max(0);

    let mut intervals = vec![];
    let mut demands = vec![];
    for (exam, info) in registry.exams() {
        intervals.push(model.new_fixed_size_interval(
            exam_variables[exam],
            1,
            format!("demand_{}", exam.index()),
        )?);
        demands.push(info.demand);
    }

    for (date, info) in registry.dates() {
        let headroom = max_capacity - info.capacity.max(0);
        if headroom == 0 {
            continue;
        }
        let position = model.new_constant(date.position(), format!("date_{}", date.index()));
        intervals.push(model.new_fixed_size_interval(
            position,
            1,
            format!("phantom_demand_{}", date.index()),
        )?);
        demands.push(headroom);
    }

    model.add_constraint(constraints::cumulative(intervals, demands, max_capacity))?;
    Ok(())
}

/// Passes every hint on with the probability of the policy; hints of pinned exams are dropped.
fn add_hints(
    relations: &CompiledRelations,
    hint_policy: &HintPolicy,
    exam_variables: &KeyedVec<ExamId, IntVar>,
    model: &mut Model,
) -> Result<(), BuildError> {
    let probability = if hint_policy.probability.is_nan() {
        0.0
    } else {
        hint_policy.probability.clamp(0.0, 1.0)
    };
    let mut rng = SmallRng::seed_from_u64(hint_policy.seed);

    for (&exam, &date) in &relations.hints {
        if relations.pins.contains_key(&exam) {
            continue;
        }
        if rng.gen_bool(probability) {
            model.add_hint(exam_variables[exam], date.position())?;
        }
    }
    Ok(())
}
