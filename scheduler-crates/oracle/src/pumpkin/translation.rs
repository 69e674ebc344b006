//! Translation of a [`Model`] into a Pumpkin [`Solver`].
use itertools::Itertools;
use pumpkin_core::constraints;
use pumpkin_core::constraints::Constraint as _;
use pumpkin_core::proof::ConstraintTag;
use pumpkin_core::variables::AffineView;
use pumpkin_core::variables::DomainId;
use pumpkin_core::variables::Literal as PumpkinLiteral;
use pumpkin_core::variables::TransformableVariable;
use pumpkin_core::ConstraintOperationError;
use pumpkin_core::Solver;
use thiserror::Error;

use crate::containers::KeyedVec;
use crate::model::Constraint;
use crate::model::IntVar;
use crate::model::Interval;
use crate::model::IntervalId;
use crate::model::Literal;
use crate::model::Model;

#[derive(Debug, Error)]
pub(super) enum TranslationError {
    #[error("the model is infeasible at the root")]
    Infeasible,
    #[error("{0} does not fit in a 32-bit integer")]
    OutOfRange(String),
    #[error("variable '{0}' is used as a literal but its domain is not within [0, 1]")]
    NotBoolean(String),
}

impl From<ConstraintOperationError> for TranslationError {
    fn from(_: ConstraintOperationError) -> Self {
        TranslationError::Infeasible
    }
}

pub(super) struct Translation {
    pub(super) solver: Solver,
    /// The Pumpkin view of every model variable.
    pub(super) views: KeyedVec<IntVar, AffineView<DomainId>>,
    pub(super) objective: DomainId,
    /// The smallest objective value the variable bounds allow.
    pub(super) objective_lower_bound: i64,
}

/// Posts every variable and constraint of `model` on a fresh solver.
///
/// Variables with a domain within `[0, 1]` become Pumpkin literals so they can guard the
/// decomposed no-overlap constraints; every other variable becomes a bounded domain.
pub(super) fn translate(model: &Model) -> Result<Translation, TranslationError> {
    let mut translator = Translator {
        solver: Solver::default(),
        views: KeyedVec::default(),
        literals: KeyedVec::default(),
    };

    for (_, info) in model.variables() {
        if info.lower_bound > info.upper_bound {
            return Err(TranslationError::Infeasible);
        }

        if info.lower_bound >= 0 && info.upper_bound <= 1 {
            let literal = translator.solver.new_named_literal(info.name.clone());
            let _ = translator.views.push(literal.get_integer_variable());
            let _ = translator.literals.push(Some(literal));

            if info.lower_bound == info.upper_bound {
                let fixed = if info.lower_bound == 1 {
                    literal
                } else {
                    !literal
                };
                let tag = translator.solver.new_constraint_tag();
                constraints::clause(vec![fixed], tag).post(&mut translator.solver)?;
            }
        } else {
            let domain = translator.solver.new_named_bounded_integer(
                info.lower_bound,
                info.upper_bound,
                info.name.clone(),
            );
            let _ = translator.views.push(domain.scaled(1));
            let _ = translator.literals.push(None);
        }
    }

    for constraint in model.constraints() {
        translator.post(model, constraint)?;
    }

    let (objective, objective_lower_bound) = translator.objective(model)?;
    Ok(Translation {
        solver: translator.solver,
        views: translator.views,
        objective,
        objective_lower_bound,
    })
}

struct Translator {
    solver: Solver,
    views: KeyedVec<IntVar, AffineView<DomainId>>,
    literals: KeyedVec<IntVar, Option<PumpkinLiteral>>,
}

impl Translator {
    fn post(&mut self, model: &Model, constraint: &Constraint) -> Result<(), TranslationError> {
        let tag = self.solver.new_constraint_tag();
        match constraint {
            Constraint::Equals { variable, value } => {
                constraints::equals(vec![self.views[*variable]], *value, tag)
                    .post(&mut self.solver)?;
            }
            Constraint::LessThanOrEquals { lhs, rhs, offset } => {
                // lhs + offset <= rhs  <=>  lhs - rhs <= -offset
                let bound = offset
                    .checked_neg()
                    .ok_or_else(|| TranslationError::OutOfRange(format!("offset {offset}")))?;
                constraints::less_than_or_equals(
                    vec![self.views[*lhs], self.views[*rhs].scaled(-1)],
                    bound,
                    tag,
                )
                .post(&mut self.solver)?;
            }
            Constraint::NoOverlap { intervals } => {
                for (&first, &second) in intervals.iter().tuple_combinations() {
                    self.post_disjunction(model.interval(first), model.interval(second), tag)?;
                }
            }
            Constraint::Cumulative {
                intervals,
                demands,
                capacity,
            } => self.post_cumulative(model, intervals, demands, *capacity, tag)?,
        }
        Ok(())
    }

    /// Either interval is absent, or one of them ends before the other starts.
    fn post_disjunction(
        &mut self,
        first: &Interval,
        second: &Interval,
        tag: ConstraintTag,
    ) -> Result<(), TranslationError> {
        if first.size == 0 || second.size == 0 {
            return Ok(());
        }

        let first_start = self.views[first.start];
        let second_start = self.views[second.start];

        let first_before_second = self.solver.new_literal();
        constraints::less_than_or_equals(
            vec![first_start, second_start.scaled(-1)],
            -first.size,
            tag,
        )
        .implied_by(&mut self.solver, first_before_second)?;

        let second_before_first = self.solver.new_literal();
        constraints::less_than_or_equals(
            vec![second_start, first_start.scaled(-1)],
            -second.size,
            tag,
        )
        .implied_by(&mut self.solver, second_before_first)?;

        let mut clause = vec![first_before_second, second_before_first];
        for presence in [first.presence, second.presence].into_iter().flatten() {
            clause.push(!self.literal(presence)?);
        }
        constraints::clause(clause, tag).post(&mut self.solver)?;
        Ok(())
    }

    fn post_cumulative(
        &mut self,
        model: &Model,
        intervals: &[IntervalId],
        demands: &[i32],
        capacity: i32,
        tag: ConstraintTag,
    ) -> Result<(), TranslationError> {
        let mut start_times = vec![];
        let mut durations = vec![];
        let mut resource_requirements = vec![];
        for (&interval, &demand) in intervals.iter().zip(demands) {
            let interval = model.interval(interval);
            if interval.size == 0 || demand == 0 {
                continue;
            }
            if demand > capacity {
                return Err(TranslationError::Infeasible);
            }

            start_times.push(self.views[interval.start]);
            durations.push(interval.size);
            resource_requirements.push(demand);
        }

        if start_times.is_empty() {
            return Ok(());
        }
        constraints::cumulative(start_times, durations, resource_requirements, capacity, tag)
            .post(&mut self.solver)?;
        Ok(())
    }

    /// Creates the objective domain and ties it to the expression; without an objective every
    /// solution is optimal, which is expressed by the domain `[0, 0]`.
    fn objective(&mut self, model: &Model) -> Result<(DomainId, i64), TranslationError> {
        let Some(expression) = model.objective() else {
            return Ok((self.solver.new_named_bounded_integer(0, 0, "objective"), 0));
        };

        let mut lower_bound = 0_i64;
        let mut upper_bound = 0_i64;
        let mut terms = Vec::with_capacity(expression.terms().len() + 1);
        for &(coefficient, variable) in expression.terms() {
            let scale = i32::try_from(coefficient).map_err(|_| {
                TranslationError::OutOfRange(format!("objective coefficient {coefficient}"))
            })?;
            let info = model.variable(variable);
            let at_lower = coefficient * i64::from(info.lower_bound);
            let at_upper = coefficient * i64::from(info.upper_bound);
            lower_bound += at_lower.min(at_upper);
            upper_bound += at_lower.max(at_upper);

            terms.push(self.views[variable].scaled(scale));
        }

        let out_of_range = |bound: i64| TranslationError::OutOfRange(format!("objective {bound}"));
        let objective = self.solver.new_named_bounded_integer(
            i32::try_from(lower_bound).map_err(|_| out_of_range(lower_bound))?,
            i32::try_from(upper_bound).map_err(|_| out_of_range(upper_bound))?,
            "objective",
        );
        terms.push(objective.scaled(-1));

        let tag = self.solver.new_constraint_tag();
        constraints::equals(terms, 0, tag).post(&mut self.solver)?;
        Ok((objective, lower_bound))
    }

    fn literal(&self, literal: Literal) -> Result<PumpkinLiteral, TranslationError> {
        let variable = literal.variable().as_integer();
        let Some(pumpkin_literal) = self.literals[variable] else {
            return Err(TranslationError::NotBoolean(variable.to_string()));
        };
        Ok(if literal.polarity() {
            pumpkin_literal
        } else {
            !pumpkin_literal
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearExpression;

    #[test]
    fn empty_domains_are_infeasible_before_solving() {
        let mut model = Model::default();
        let _ = model.new_bounded_integer(3, 2, "x");

        assert!(matches!(translate(&model), Err(TranslationError::Infeasible)));
    }

    #[test]
    fn demand_above_capacity_is_infeasible_before_solving() {
        let mut model = Model::default();
        let x = model.new_bounded_integer(0, 4, "x");
        let interval = model.new_fixed_size_interval(x, 1, "x").expect("valid");
        model
            .add_constraint(crate::model::cumulative([interval], [3], 2))
            .expect("valid constraint");

        assert!(matches!(translate(&model), Err(TranslationError::Infeasible)));
    }

    #[test]
    fn objective_lower_bound_follows_the_signs_of_the_coefficients() {
        let mut model = Model::default();
        let x = model.new_bounded_integer(-2, 5, "x");
        let violated = model.new_boolean("violated");
        model
            .minimise(LinearExpression::weighted_sum([
                (3, x),
                (-4, violated.as_integer()),
            ]))
            .expect("valid objective");

        let translation = translate(&model).expect("translatable");
        assert_eq!(-10, translation.objective_lower_bound);
        assert_eq!(2, translation.views.len());
    }

    #[test]
    fn coefficients_beyond_32_bits_are_reported() {
        let mut model = Model::default();
        let x = model.new_bounded_integer(0, 5, "x");
        model
            .minimise(LinearExpression::weighted_sum([(i64::from(i32::MAX) + 1, x)]))
            .expect("valid objective");

        assert!(matches!(
            translate(&model),
            Err(TranslationError::OutOfRange(_))
        ));
    }
}
