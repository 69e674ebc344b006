//! The solver-agnostic model which is handed to an [`Oracle`](crate::Oracle).
//!
//! A [`Model`] consists of bounded integer variables, fixed-size intervals anchored at those
//! variables, a set of hard [`Constraint`]s, an optional linear objective which is minimised, and
//! optional per-variable hints.
//!
//! # Example
//! ```
//! # use scheduler_oracle::constraints;
//! # use scheduler_oracle::Model;
//! let mut model = Model::default();
//!
//! let a = model.new_bounded_integer(0, 4, "a");
//! let b = model.new_bounded_integer(0, 4, "b");
//!
//! // `a` and `b` have to be at least two apart
//! let interval_a = model.new_fixed_size_interval(a, 2, "a_gap").expect("a exists");
//! let interval_b = model.new_fixed_size_interval(b, 2, "b_gap").expect("b exists");
//! model
//!     .add_constraint(constraints::no_overlap([interval_a, interval_b]))
//!     .expect("valid constraint");
//! ```
mod constraints;
mod objective;

use std::fmt::Display;
use std::fmt::Formatter;

pub use constraints::*;
pub use objective::*;

use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::error::ModelError;

/// A bounded integer decision variable of a [`Model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVar(u32);

impl StorageKey for IntVar {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        IntVar(u32::try_from(index).expect("variable indices fit in a u32"))
    }
}

impl Display for IntVar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A 0-1 integer variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(IntVar);

impl BoolVar {
    /// The underlying integer variable with domain `[0, 1]`.
    pub fn as_integer(self) -> IntVar {
        self.0
    }

    /// The literal which is true when this variable is 1.
    pub fn literal(self) -> Literal {
        Literal {
            variable: self,
            polarity: true,
        }
    }

    /// The literal which is true when this variable is 0.
    pub fn negated(self) -> Literal {
        Literal {
            variable: self,
            polarity: false,
        }
    }
}

/// A [`BoolVar`] with a polarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    variable: BoolVar,
    polarity: bool,
}

impl Literal {
    pub fn variable(self) -> BoolVar {
        self.variable
    }

    pub fn polarity(self) -> bool {
        self.polarity
    }

    /// The value the underlying variable takes when this literal is true.
    pub fn true_value(self) -> i32 {
        i32::from(self.polarity)
    }

    /// Evaluate the literal given the value of its variable.
    pub fn evaluate(self, value: i32) -> bool {
        (value != 0) == self.polarity
    }
}

/// Key of an [`Interval`] in a [`Model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId(u32);

impl StorageKey for IntervalId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        IntervalId(u32::try_from(index).expect("interval indices fit in a u32"))
    }
}

/// An interval `[start, start + size)` with a fixed size; if `presence` is given then the interval
/// only takes part in constraints when that literal is true.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interval {
    pub start: IntVar,
    pub size: i32,
    pub presence: Option<Literal>,
    pub name: String,
}

impl Interval {
    /// Whether the interval is present given a value for its presence literal.
    pub fn is_present(&self, presence_value: Option<i32>) -> bool {
        match (self.presence, presence_value) {
            (None, _) => true,
            (Some(literal), Some(value)) => literal.evaluate(value),
            (Some(_), None) => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableInfo {
    pub lower_bound: i32,
    pub upper_bound: i32,
    pub name: String,
}

/// A model over bounded integer variables; see the module documentation.
#[derive(Clone, Debug, Default)]
pub struct Model {
    variables: KeyedVec<IntVar, VariableInfo>,
    intervals: KeyedVec<IntervalId, Interval>,
    constraints: Vec<Constraint>,
    objective: Option<LinearExpression>,
    hints: Vec<(IntVar, i32)>,
}

impl Model {
    /// Creates a variable with domain `[lower_bound, upper_bound]`.
    ///
    /// An empty range is allowed; the oracle will then report the model infeasible.
    pub fn new_bounded_integer(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
        name: impl Into<String>,
    ) -> IntVar {
        self.variables.push(VariableInfo {
            lower_bound,
            upper_bound,
            name: name.into(),
        })
    }

    /// Creates a variable whose domain is the single value `value`.
    pub fn new_constant(&mut self, value: i32, name: impl Into<String>) -> IntVar {
        self.new_bounded_integer(value, value, name)
    }

    pub fn new_boolean(&mut self, name: impl Into<String>) -> BoolVar {
        BoolVar(self.new_bounded_integer(0, 1, name))
    }

    /// Restricts the domain of `variable` to the single value `value` before any constraint is
    /// considered.
    pub fn fix(&mut self, variable: IntVar, value: i32) -> Result<(), ModelError> {
        let info = self
            .variables
            .get(variable)
            .ok_or(ModelError::UnknownVariable(variable))?;
        if value < info.lower_bound || value > info.upper_bound {
            return Err(ModelError::ValueOutsideDomain {
                variable,
                value,
                lower_bound: info.lower_bound,
                upper_bound: info.upper_bound,
            });
        }

        let info = &mut self.variables[variable];
        info.lower_bound = value;
        info.upper_bound = value;
        Ok(())
    }

    /// Creates the interval `[start, start + size)`.
    pub fn new_fixed_size_interval(
        &mut self,
        start: IntVar,
        size: i32,
        name: impl Into<String>,
    ) -> Result<IntervalId, ModelError> {
        self.new_interval(start, size, None, name.into())
    }

    /// Creates the interval `[start, start + size)` which is only present when `presence` holds.
    pub fn new_optional_fixed_size_interval(
        &mut self,
        start: IntVar,
        size: i32,
        presence: Literal,
        name: impl Into<String>,
    ) -> Result<IntervalId, ModelError> {
        self.check_variable(presence.variable().as_integer())?;
        self.new_interval(start, size, Some(presence), name.into())
    }

    fn new_interval(
        &mut self,
        start: IntVar,
        size: i32,
        presence: Option<Literal>,
        name: String,
    ) -> Result<IntervalId, ModelError> {
        self.check_variable(start)?;
        if size < 0 {
            return Err(ModelError::NegativeSize { name, size });
        }

        Ok(self.intervals.push(Interval {
            start,
            size,
            presence,
            name,
        }))
    }

    /// Adds a hard constraint to the model after checking that everything it refers to exists.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        constraint.validate(self)?;
        self.constraints.push(constraint);
        Ok(())
    }

    /// Sets the expression which the oracle minimises; replaces an earlier objective.
    pub fn minimise(&mut self, objective: LinearExpression) -> Result<(), ModelError> {
        for &(_, variable) in objective.terms() {
            self.check_variable(variable)?;
        }
        self.objective = Some(objective);
        Ok(())
    }

    /// Suggests `value` for `variable`; hints are advisory and never make a model infeasible.
    pub fn add_hint(&mut self, variable: IntVar, value: i32) -> Result<(), ModelError> {
        self.check_variable(variable)?;
        self.hints.push((variable, value));
        Ok(())
    }

    pub(crate) fn check_variable(&self, variable: IntVar) -> Result<(), ModelError> {
        if self.variables.contains_key(variable) {
            Ok(())
        } else {
            Err(ModelError::UnknownVariable(variable))
        }
    }

    pub(crate) fn check_interval(&self, interval: IntervalId) -> Result<(), ModelError> {
        if self.intervals.contains_key(interval) {
            Ok(())
        } else {
            Err(ModelError::UnknownInterval(interval))
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = (IntVar, &VariableInfo)> {
        self.variables.iter_with_keys()
    }

    pub fn variable(&self, variable: IntVar) -> &VariableInfo {
        &self.variables[variable]
    }

    pub fn interval(&self, interval: IntervalId) -> &Interval {
        &self.intervals[interval]
    }

    pub fn intervals(&self) -> impl Iterator<Item = (IntervalId, &Interval)> {
        self.intervals.iter_with_keys()
    }

    pub fn num_intervals(&self) -> usize {
        self.intervals.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&LinearExpression> {
        self.objective.as_ref()
    }

    pub fn hints(&self) -> &[(IntVar, i32)] {
        &self.hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "variable indices fit in a u32")]
    fn variable_indices_beyond_u32_panic_instead_of_wrapping() {
        let _ = IntVar::create_from_index(u32::MAX as usize + 1);
    }

    #[test]
    #[should_panic(expected = "interval indices fit in a u32")]
    fn interval_indices_beyond_u32_panic_instead_of_wrapping() {
        let _ = IntervalId::create_from_index(u32::MAX as usize + 1);
    }

    #[test]
    fn fixing_outside_the_domain_is_rejected() {
        let mut model = Model::default();
        let x = model.new_bounded_integer(0, 3, "x");

        assert!(matches!(
            model.fix(x, 4),
            Err(ModelError::ValueOutsideDomain { value: 4, .. })
        ));

        model.fix(x, 2).expect("inside the domain");
        assert_eq!(2, model.variable(x).lower_bound);
        assert_eq!(2, model.variable(x).upper_bound);
    }

    #[test]
    fn intervals_need_existing_variables() {
        let mut model = Model::default();
        let mut other = Model::default();
        let _ = other.new_bounded_integer(0, 1, "y");
        let y = other.new_bounded_integer(0, 1, "z");

        assert!(matches!(
            model.new_fixed_size_interval(y, 1, "i"),
            Err(ModelError::UnknownVariable(_))
        ));
    }

    #[test]
    fn negative_interval_sizes_are_rejected() {
        let mut model = Model::default();
        let x = model.new_bounded_integer(0, 3, "x");

        assert!(matches!(
            model.new_fixed_size_interval(x, -1, "i"),
            Err(ModelError::NegativeSize { size: -1, .. })
        ));
    }

    #[test]
    fn optional_interval_presence_follows_the_literal() {
        let mut model = Model::default();
        let x = model.new_bounded_integer(0, 3, "x");
        let violated = model.new_boolean("violated");
        let id = model
            .new_optional_fixed_size_interval(x, 2, violated.negated(), "i")
            .expect("valid interval");

        let interval = model.interval(id);
        assert!(interval.is_present(Some(0)));
        assert!(!interval.is_present(Some(1)));
    }
}
