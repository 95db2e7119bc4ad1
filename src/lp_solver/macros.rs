//! Macros for building models and constraints

/// Create a new model builder with a unique brand
///
/// Each invocation defines its own brand type, so variables of two builders
/// can never end up in the same constraint.
///
/// ```rust
/// use golfer::lp_model_builder;
///
/// let mut schedule = lp_model_builder!(ScheduleModel);
/// let x = schedule.add_binary();
///
/// let mut scratch = lp_model_builder!();
/// let y = scratch.add_binary();
///
/// // Does not compile, the brands differ:
/// // schedule.add_constraint(golfer::constraint!((x + y) == 1.0));
/// ```
#[macro_export]
macro_rules! lp_model_builder {
    ($brand_name:ident) => {{
        struct $brand_name;
        $crate::lp_solver::LPModelBuilder::<$brand_name>::new()
    }};

    // `UniqueBrand` is local to the block, so every expansion gets a distinct type
    () => {{
        struct UniqueBrand;
        $crate::lp_solver::LPModelBuilder::<UniqueBrand>::new()
    }};
}

/// Create constraints using comparison syntax
///
/// The left-hand side must be parenthesised.
///
/// ```rust
/// use golfer::constraint;
/// use golfer::lp_model_builder;
///
/// let mut builder = lp_model_builder!();
/// let x = builder.add_binary();
/// let y = builder.add_binary();
///
/// builder.add_constraint(constraint!((x + y) == 1.0));
/// builder.add_constraint(constraint!((x - y) <= 0.0));
/// builder.add_constraint(constraint!((x + y) >= 1));
/// ```
#[macro_export]
macro_rules! constraint {
    (($lhs:expr) == $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $lhs,
            $crate::lp_solver::ConstraintSense::Equal,
            $rhs as f64,
        )
    };
    (($lhs:expr) <= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $lhs,
            $crate::lp_solver::ConstraintSense::LessEqual,
            $rhs as f64,
        )
    };
    (($lhs:expr) >= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $lhs,
            $crate::lp_solver::ConstraintSense::GreaterEqual,
            $rhs as f64,
        )
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_named_brand_lp_model_builder() {
        let mut model1 = lp_model_builder!(TestModel1);
        let mut model2 = lp_model_builder!(TestModel2);

        let x1 = model1.add_binary();
        let x2 = model2.add_binary();

        let _expr1 = x1 + 5.0;
        let _expr2 = x2 + 5.0;

        // Different brands, would not compile:
        // let _mixed = x1 + x2;
    }

    #[test]
    fn test_branded_constraints_work() {
        use crate::constraint;

        let mut model = lp_model_builder!(ConstraintTestModel);
        let x = model.add_binary();
        let y = model.add_binary();

        model.add_constraint(constraint!((x + y) == 1));
        model.add_constraint(constraint!((x - y) <= 0.0));

        assert_eq!(model.num_constraints(), 2);
        assert_eq!(model.constraints()[0].rhs(), 1.0);
    }
}
