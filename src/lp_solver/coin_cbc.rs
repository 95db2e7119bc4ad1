use crate::lp_solver::solver_output::SolverOutput;
use crate::lp_solver::*;
use ::coin_cbc::{Col, Model, Sense};

/// Round a floating-point number to a specified number of significant digits
/// This is an workaround to mask floating point errors in CBC.
fn round_to_sig_digits(value: f64, digits: u32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(digits as i32 - magnitude - 1);
    (value * scale).round() / scale
}

fn column<Brand>(cols: &[Col], variable: VariableId<Brand>) -> Result<Col> {
    cols.get(variable.id)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Variable {:?} not found in model", variable))
}

/// CBC command-line parameters for `options`. The time limit is wall-clock.
fn engine_parameters(options: &SolveOptions) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("timeMode", "elapsed".to_string()),
        ("seconds", options.time_limit.as_secs_f64().to_string()),
    ];
    if let Some(threads) = options.threads {
        params.push(("threads", threads.to_string()));
    }
    params
}

/// Solve a model using Coin CBC
pub fn solve_coin_cbc<Brand>(
    builder: &LPModelBuilder<Brand>,
    options: &SolveOptions,
) -> Result<LPSolution<Brand>> {
    let mut model = Model::default();

    for (name, value) in engine_parameters(options) {
        model.set_parameter(name, &value);
    }

    let cols: Vec<Col> = builder
        .variables
        .iter()
        .map(|var_info| match var_info.var_type {
            VariableType::Integer => {
                let col = model.add_integer();
                model.set_col_lower(col, var_info.lower_bound);
                model.set_col_upper(col, var_info.upper_bound);
                col
            }
            VariableType::Binary => model.add_binary(),
        })
        .collect();

    for constraint in &builder.constraints {
        let row = model.add_row();

        for term in &constraint.expression.terms {
            model.set_weight(row, column(&cols, term.variable)?, term.coefficient);
        }

        let rhs_adjusted = constraint.rhs - constraint.expression.constant;

        match constraint.sense {
            ConstraintSense::LessEqual => model.set_row_upper(row, rhs_adjusted),
            ConstraintSense::Equal => model.set_row_equal(row, rhs_adjusted),
            ConstraintSense::GreaterEqual => model.set_row_lower(row, rhs_adjusted),
        }
    }

    if let Some(obj_info) = &builder.objective {
        for term in &obj_info.expression.terms {
            model.set_obj_coeff(column(&cols, term.variable)?, term.coefficient);
        }

        model.set_obj_sense(match obj_info.sense {
            OptimisationSense::Minimise => Sense::Minimize,
            OptimisationSense::Maximise => Sense::Maximize,
        });
    }

    let solution = {
        let _output = SolverOutput::for_solve(options.solver_log.as_deref());
        model.solve()
    };

    let variable_values: Vec<f64> = cols
        .iter()
        .map(|&col| round_to_sig_digits(solution.col(col), 8))
        .collect();

    let objective_value = builder
        .objective
        .as_ref()
        .map(|obj_info| round_to_sig_digits(obj_info.expression.evaluate(&variable_values), 8))
        .unwrap_or(0.0);

    let raw = solution.raw();
    let status = if raw.is_proven_optimal() {
        OptimisationStatus::Optimal
    } else if raw.is_proven_infeasible() {
        OptimisationStatus::Infeasible
    } else if raw.is_seconds_limit_reached() {
        OptimisationStatus::TimeLimit
    } else {
        OptimisationStatus::Other("Unknown status")
    };
    tracing::debug!(?status, objective_value, "CBC returned");

    Ok(LPSolution {
        status,
        objective_value,
        variable_values,
        _brand: std::marker::PhantomData,
    })
}
