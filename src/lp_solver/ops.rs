//! Addition, subtraction and summation of linear expressions
//!
//! Anything that converts into a [`LinearExpression`] (a variable, a
//! constant, another expression) can be added to or subtracted from a
//! variable or an expression:
//!
//! ```ignore
//! let link = a + b - m;
//! let excess = meetings - 1.0;
//! let total: LinearExpression<_> = row.iter().copied().sum();
//! ```
//!
//! Scaled terms go through [`LinearExpression::add_term`]. The brand is
//! preserved, so variables of different models never mix.

use std::ops::{Add, Sub};

use super::{LinearExpression, LinearTerm, VariableId};

impl<Brand, R: Into<LinearExpression<Brand>>> Add<R> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(mut self, other: R) -> Self::Output {
        let other = other.into();
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }
}

impl<Brand, R: Into<LinearExpression<Brand>>> Sub<R> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(mut self, other: R) -> Self::Output {
        let other = other.into();
        self.terms
            .extend(other.terms.into_iter().map(|term| LinearTerm {
                coefficient: -term.coefficient,
                variable: term.variable,
            }));
        self.constant -= other.constant;
        self
    }
}

impl<Brand, R: Into<LinearExpression<Brand>>> Add<R> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: R) -> Self::Output {
        LinearExpression::from_variable(self) + other
    }
}

impl<Brand, R: Into<LinearExpression<Brand>>> Sub<R> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: R) -> Self::Output {
        LinearExpression::from_variable(self) - other
    }
}

impl<Brand> std::iter::Sum<VariableId<Brand>> for LinearExpression<Brand> {
    fn sum<I: Iterator<Item = VariableId<Brand>>>(iter: I) -> Self {
        let mut expr = LinearExpression::new(0.0);
        for variable in iter {
            expr.add_term(1.0, variable);
        }
        expr
    }
}
