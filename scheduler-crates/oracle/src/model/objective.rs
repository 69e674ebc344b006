use super::IntVar;

/// A linear expression `sum(coefficient * variable)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearExpression {
    terms: Vec<(i64, IntVar)>,
}

impl LinearExpression {
    /// Creates `sum(coefficients[i] * variables[i])`.
    pub fn weighted_sum(terms: impl IntoIterator<Item = (i64, IntVar)>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    pub fn add_term(&mut self, coefficient: i64, variable: IntVar) {
        self.terms.push((coefficient, variable));
    }

    pub fn terms(&self) -> &[(i64, IntVar)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression given a value for every variable.
    pub fn evaluate(&self, value_of: impl Fn(IntVar) -> i32) -> i64 {
        self.terms
            .iter()
            .map(|&(coefficient, variable)| coefficient * i64::from(value_of(variable)))
            .sum()
    }
}
