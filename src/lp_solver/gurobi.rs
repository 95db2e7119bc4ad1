use ::gurobi::{ConstrSense, Env, LinExpr, Model, ModelSense, Status, Var, VarType, attr, param};

use crate::lp_solver::solver_output::SolverOutput;
use crate::lp_solver::*;

fn linear_expr<Brand>(vars: &[Var], expression: &LinearExpression<Brand>) -> Result<LinExpr> {
    let mut expr = LinExpr::new();
    for term in &expression.terms {
        let var = vars.get(term.variable.id).ok_or_else(|| {
            anyhow::anyhow!("Variable {:?} not found in model", term.variable)
        })?;
        expr = expr.add_term(term.coefficient, var.clone());
    }
    Ok(expr.add_constant(expression.constant))
}

/// Solve a model using Gurobi
pub fn solve_gurobi<Brand>(
    builder: &LPModelBuilder<Brand>,
    options: &SolveOptions,
) -> Result<LPSolution<Brand>> {
    let _output = SolverOutput::for_solve(options.solver_log.as_deref());

    let mut env = Env::new("")?;
    env.set(param::TimeLimit, options.time_limit.as_secs_f64())?;
    if let Some(threads) = options.threads {
        env.set(param::Threads, threads as i32)?;
    }
    let mut model = Model::new("social_golfer", &env)?;

    let mut vars = Vec::with_capacity(builder.variables.len());
    for (idx, var_info) in builder.variables.iter().enumerate() {
        let vtype = match var_info.var_type {
            VariableType::Integer => VarType::Integer,
            VariableType::Binary => VarType::Binary,
        };

        vars.push(model.add_var(
            &format!("v{}", idx),
            vtype,
            0.0,
            var_info.lower_bound,
            var_info.upper_bound,
            &[],
            &[],
        )?);
    }

    for (idx, constraint) in builder.constraints.iter().enumerate() {
        let sense = match constraint.sense {
            ConstraintSense::LessEqual => ConstrSense::Less,
            ConstraintSense::Equal => ConstrSense::Equal,
            ConstraintSense::GreaterEqual => ConstrSense::Greater,
        };

        model.add_constr(
            &format!("c{}", idx),
            linear_expr(&vars, &constraint.expression)?,
            sense,
            constraint.rhs,
        )?;
    }

    model.update()?;

    if let Some(obj_info) = &builder.objective {
        let sense = match obj_info.sense {
            OptimisationSense::Minimise => ModelSense::Minimize,
            OptimisationSense::Maximise => ModelSense::Maximize,
        };
        model.set_objective(linear_expr(&vars, &obj_info.expression)?, sense)?;
    }

    model.optimize()?;

    let has_incumbent = model.get(attr::SolCount)? > 0;
    let status = match model.status()? {
        Status::Optimal => OptimisationStatus::Optimal,
        Status::SubOptimal => OptimisationStatus::Feasible,
        Status::Infeasible => OptimisationStatus::Infeasible,
        Status::TimeLimit => OptimisationStatus::TimeLimit,
        _ => OptimisationStatus::Other("Unknown status"),
    };

    let mut variable_values = vec![0.0; vars.len()];
    let mut objective_value = 0.0;
    if has_incumbent {
        for (value, var) in variable_values.iter_mut().zip(&vars) {
            *value = var.get(&model, attr::X)?;
        }
        objective_value = model.get(attr::ObjVal)?;
    }

    Ok(LPSolution {
        status,
        objective_value,
        variable_values,
        _brand: std::marker::PhantomData,
    })
}
