//! Mixed-integer model builder, independent of the optimisation engine
//!
//! The golfer model never talks to an engine directly. It declares variables,
//! linear constraints and a single objective on an [`LPModelBuilder`], and the
//! builder hands the finished model to whichever backend was compiled in.
//!
//! # Branded Variables
//!
//! [`VariableId`], [`LinearExpression`], [`Constraint`] and [`LPModelBuilder`]
//! carry a zero-sized `Brand` type parameter. A variable created by one builder
//! cannot be used in a constraint of another builder; the mismatch is a type
//! error. Use [`lp_model_builder!`](crate::lp_model_builder) to get a builder
//! with a fresh brand:
//!
//! ```rust
//! use golfer::constraint;
//! use golfer::lp_model_builder;
//!
//! let mut builder = lp_model_builder!();
//! let a = builder.add_binary();
//! let b = builder.add_binary();
//!
//! builder.add_constraint(constraint!((a + b) == 1.0));
//! let both = builder.add_conjunction(a, b);
//! builder.minimise(both.into());
//! ```
//!
//! # Capability Surface
//!
//! Besides the raw [`LPModelBuilder::add_variable`] and
//! [`LPModelBuilder::add_constraint`], the builder offers the handful of
//! modelling primitives the scheduler needs:
//!
//! - [`LPModelBuilder::add_binary`]: a 0/1 decision variable
//! - [`LPModelBuilder::add_conjunction`]: a binary tied to `a AND b`
//! - [`LPModelBuilder::add_positive_part`]: an integer bounded below by `max(expr, 0)`
//! - [`LPModelBuilder::minimise`]: register the objective
//! - [`LPModelBuilder::solve`]: run the engine under [`SolveOptions`]
//!
//! Variables are stored in a `Vec` and [`VariableId`] is an index into it, so
//! solution lookups are O(1).
//!
//! # Solver Selection
//!
//! The backend can be selected via the `GOLFER_LP_SOLVER` environment variable:
//! - `"gurobi"` - Use Gurobi (requires `gurobi` feature)
//! - `"coin_cbc"` or `"cbc"` - Use COIN-OR CBC (requires `coin_cbc` feature)
//!
//! If not set, the solver defaults to Gurobi if available, otherwise CBC.

use anyhow::Result;
use std::env;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Environment variable naming the backend to use
pub const SOLVER_ENV_VAR: &str = "GOLFER_LP_SOLVER";

/// Variable types supported by the engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Integer variable within its bounds
    Integer,
    /// Binary variable (0 or 1)
    Binary,
}

/// Constraint sense for linear constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// Less than or equal to (≤)
    LessEqual,
    /// Equal to (=)
    Equal,
    /// Greater than or equal to (≥)
    GreaterEqual,
}

/// Optimisation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimisationSense {
    Minimise,
    Maximise,
}

/// Status reported by the engine once it returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimisationStatus {
    /// Proven optimal solution
    Optimal,
    /// Feasible solution, optimality not proven
    Feasible,
    /// No solution exists
    Infeasible,
    /// The time limit elapsed; an incumbent may or may not exist
    TimeLimit,
    /// Other status (solver-specific)
    Other(&'static str),
}

impl std::fmt::Display for OptimisationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimisationStatus::Optimal => write!(f, "optimal"),
            OptimisationStatus::Feasible => write!(f, "feasible"),
            OptimisationStatus::Infeasible => write!(f, "infeasible"),
            OptimisationStatus::TimeLimit => write!(f, "time limit reached"),
            OptimisationStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Available engine backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    #[cfg(feature = "gurobi")]
    /// Gurobi commercial solver
    Gurobi,
    #[cfg(feature = "coin_cbc")]
    /// Coin CBC open-source solver
    CoinCbc,
}

impl SolverBackend {
    /// Get the solver backend from environment variable or use fallback logic
    pub fn from_env_or_default() -> Result<Self> {
        match env::var(SOLVER_ENV_VAR) {
            Ok(name) => Self::from_name(&name),
            Err(_) => Self::default_backend(),
        }
    }

    /// Resolve a backend by its user-facing name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "gurobi" => {
                #[cfg(feature = "gurobi")]
                return Ok(SolverBackend::Gurobi);
                #[cfg(not(feature = "gurobi"))]
                return Err(anyhow::anyhow!(
                    "Gurobi solver requested via {} but gurobi feature not enabled",
                    SOLVER_ENV_VAR
                ));
            }
            "coin_cbc" | "coin-cbc" | "cbc" => {
                #[cfg(feature = "coin_cbc")]
                return Ok(SolverBackend::CoinCbc);
                #[cfg(not(feature = "coin_cbc"))]
                return Err(anyhow::anyhow!(
                    "Coin CBC solver requested via {} but coin_cbc feature not enabled",
                    SOLVER_ENV_VAR
                ));
            }
            _ => Err(anyhow::anyhow!(
                "Invalid solver '{}' in {}. Valid options: gurobi, coin_cbc",
                name,
                SOLVER_ENV_VAR
            )),
        }
    }

    fn default_backend() -> Result<Self> {
        // Prefer gurobi if available, then coin_cbc
        #[cfg(feature = "gurobi")]
        return Ok(SolverBackend::Gurobi);

        #[allow(unreachable_code)]
        #[cfg(feature = "coin_cbc")]
        return Ok(SolverBackend::CoinCbc);

        #[cfg(not(any(feature = "gurobi", feature = "coin_cbc")))]
        Err(anyhow::anyhow!(
            "No LP solver backend available. Please enable a solver feature (e.g., 'gurobi' or 'coin_cbc')"
        ))
    }
}

/// Parameters handed to the engine for a single solve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOptions {
    /// Wall-clock budget; advisory, the engine returns its best incumbent
    pub time_limit: Duration,
    /// Engine worker threads, `None` leaves the engine default
    pub threads: Option<u32>,
    /// Append engine output to this file instead of discarding it
    pub solver_log: Option<PathBuf>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(10),
            threads: Some(1),
            solver_log: None,
        }
    }
}

/// A linear expression term: coefficient * variable
#[derive(Debug)]
pub struct LinearTerm<Brand> {
    pub coefficient: f64,
    pub variable: VariableId<Brand>,
}

// Clone without requiring `Brand: Clone`
impl<Brand> Clone for LinearTerm<Brand> {
    fn clone(&self) -> Self {
        Self {
            coefficient: self.coefficient,
            variable: self.variable,
        }
    }
}

/// A linear expression: sum of terms plus constant
#[derive(Debug)]
pub struct LinearExpression<Brand> {
    pub terms: Vec<LinearTerm<Brand>>,
    pub constant: f64,
}

impl<Brand> Clone for LinearExpression<Brand> {
    fn clone(&self) -> Self {
        Self {
            terms: self.terms.clone(),
            constant: self.constant,
        }
    }
}

impl<Brand> LinearExpression<Brand> {
    /// Create a new linear expression with a constant term
    pub fn new(constant: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    /// Add a term to the expression
    pub fn add_term(&mut self, coefficient: f64, variable: VariableId<Brand>) {
        self.terms.push(LinearTerm {
            coefficient,
            variable,
        });
    }

    /// Create a linear expression from a single variable
    pub fn from_variable(variable: VariableId<Brand>) -> Self {
        Self {
            terms: vec![LinearTerm {
                coefficient: 1.0,
                variable,
            }],
            constant: 0.0,
        }
    }

    /// Evaluate the expression against a variable assignment
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(t.variable.id).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

impl<Brand> From<VariableId<Brand>> for LinearExpression<Brand> {
    fn from(variable: VariableId<Brand>) -> Self {
        Self::from_variable(variable)
    }
}

impl<Brand> From<f64> for LinearExpression<Brand> {
    fn from(constant: f64) -> Self {
        Self::new(constant)
    }
}

/// Unique identifier for a variable in the model
///
/// The `Brand` type parameter ensures that variables can only be used with the
/// builder that created them. This is enforced at compile time.
pub struct VariableId<Brand> {
    id: usize,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> VariableId<Brand> {
    fn new(id: usize) -> Self {
        Self {
            id,
            _brand: PhantomData,
        }
    }

    /// Position of the variable in its builder
    pub fn index(&self) -> usize {
        self.id
    }
}

// Manual trait implementations that don't require Brand to implement anything
impl<Brand> std::fmt::Debug for VariableId<Brand> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableId").field("id", &self.id).finish()
    }
}

impl<Brand> Clone for VariableId<Brand> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Brand> Copy for VariableId<Brand> {}

impl<Brand> PartialEq for VariableId<Brand> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<Brand> Eq for VariableId<Brand> {}

impl<Brand> std::hash::Hash for VariableId<Brand> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Unique identifier for a constraint in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(usize);

/// A linear constraint `expression <sense> rhs`
///
/// ```rust
/// use golfer::constraint;
/// use golfer::lp_model_builder;
/// use golfer::lp_solver::{Constraint, ConstraintSense};
///
/// let mut builder = lp_model_builder!();
/// let x = builder.add_binary();
/// let y = builder.add_binary();
///
/// let c = constraint!((x + y) == 1.0);
/// let c = Constraint::eq(x + y, 1.0);
/// let c = Constraint::new(x + y, ConstraintSense::Equal, 1.0);
/// ```
#[derive(Debug)]
pub struct Constraint<Brand> {
    expression: LinearExpression<Brand>,
    sense: ConstraintSense,
    rhs: f64,
}

impl<Brand> Constraint<Brand> {
    /// Create a new constraint
    pub fn new(
        expression: impl Into<LinearExpression<Brand>>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Self {
        Self {
            expression: expression.into(),
            sense,
            rhs,
        }
    }

    /// Create an equality constraint: expression == rhs
    pub fn eq(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(expression, ConstraintSense::Equal, rhs)
    }

    /// Create a less-than-or-equal constraint: expression <= rhs
    pub fn le(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(expression, ConstraintSense::LessEqual, rhs)
    }

    /// Create a greater-than-or-equal constraint: expression >= rhs
    pub fn ge(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(expression, ConstraintSense::GreaterEqual, rhs)
    }

    pub fn sense(&self) -> ConstraintSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn expression(&self) -> &LinearExpression<Brand> {
        &self.expression
    }

    /// Whether the assignment satisfies the constraint, up to `tolerance`
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expression.evaluate(values);
        match self.sense {
            ConstraintSense::LessEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
            ConstraintSense::GreaterEqual => lhs >= self.rhs - tolerance,
        }
    }
}

/// Variable information stored in the model
#[derive(Debug, Clone)]
struct VariableInfo {
    var_type: VariableType,
    lower_bound: f64,
    upper_bound: f64,
}

/// Objective function information
#[derive(Debug)]
struct ObjectiveInfo<Brand> {
    expression: LinearExpression<Brand>,
    sense: OptimisationSense,
}

/// Result of solving a model
#[derive(Debug)]
pub struct LPSolution<Brand> {
    pub status: OptimisationStatus,
    pub objective_value: f64,
    variable_values: Vec<f64>,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPSolution<Brand> {
    /// Wrap values produced outside the built-in backends
    pub fn new(status: OptimisationStatus, objective_value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status,
            objective_value,
            variable_values,
            _brand: PhantomData,
        }
    }

    /// Get the value of a variable from the solution
    pub fn get_value(&self, var_id: VariableId<Brand>) -> Option<f64> {
        self.variable_values.get(var_id.id).copied()
    }

    /// Read a binary variable, rounding at one half
    pub fn get_bool(&self, var_id: VariableId<Brand>) -> Option<bool> {
        self.get_value(var_id).map(|v| v > 0.5)
    }

    pub fn values(&self) -> &[f64] {
        &self.variable_values
    }
}

/// Builder for mixed-integer models that can work with different backends
pub struct LPModelBuilder<Brand> {
    variables: Vec<VariableInfo>,
    constraints: Vec<Constraint<Brand>>,
    objective: Option<ObjectiveInfo<Brand>>,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPModelBuilder<Brand> {
    /// Create a new model builder
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            _brand: PhantomData,
        }
    }

    /// Add a variable to the model
    pub fn add_variable(
        &mut self,
        var_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> VariableId<Brand> {
        let var_id = VariableId::new(self.variables.len());
        self.variables.push(VariableInfo {
            var_type,
            lower_bound,
            upper_bound,
        });
        var_id
    }

    /// Add a 0/1 decision variable
    pub fn add_binary(&mut self) -> VariableId<Brand> {
        self.add_variable(VariableType::Binary, 0.0, 1.0)
    }

    /// Add a constraint to the model
    pub fn add_constraint(&mut self, constraint: Constraint<Brand>) -> ConstraintId {
        let constr_id = ConstraintId(self.constraints.len());
        self.constraints.push(constraint);
        constr_id
    }

    /// Add a binary `m` linked to `a AND b`
    ///
    /// `m <= a`, `m <= b` and `a + b - m <= 1` pin `m` to the conjunction in
    /// every feasible assignment, whatever the objective.
    pub fn add_conjunction(
        &mut self,
        a: VariableId<Brand>,
        b: VariableId<Brand>,
    ) -> VariableId<Brand> {
        let m = self.add_binary();
        self.add_constraint(Constraint::le(m - a, 0.0));
        self.add_constraint(Constraint::le(m - b, 0.0));
        self.add_constraint(Constraint::le(a + b - m, 1.0));
        m
    }

    /// Add an integer `z` in `[0, upper_bound]` with `z >= expression`
    ///
    /// When `z` carries a positive objective coefficient under minimisation,
    /// every optimum has `z == max(expression, 0)`.
    pub fn add_positive_part(
        &mut self,
        expression: LinearExpression<Brand>,
        upper_bound: f64,
    ) -> VariableId<Brand> {
        let z = self.add_variable(VariableType::Integer, 0.0, upper_bound);
        self.add_constraint(Constraint::ge(z - expression, 0.0));
        z
    }

    /// Set the objective function
    pub fn set_objective(&mut self, expression: LinearExpression<Brand>, sense: OptimisationSense) {
        self.objective = Some(ObjectiveInfo { expression, sense });
    }

    /// Register `expression` as the minimisation target
    pub fn minimise(&mut self, expression: LinearExpression<Brand>) {
        self.set_objective(expression, OptimisationSense::Minimise);
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[Constraint<Brand>] {
        &self.constraints
    }

    /// Solve the model with the backend selected by [`SolverBackend::from_env_or_default`]
    pub fn solve(&self, options: &SolveOptions) -> Result<LPSolution<Brand>> {
        self.solve_with(SolverBackend::from_env_or_default()?, options)
    }

    /// Solve the model with an explicit backend
    pub fn solve_with(
        &self,
        backend: SolverBackend,
        options: &SolveOptions,
    ) -> Result<LPSolution<Brand>> {
        tracing::info!(
            backend = ?backend,
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            time_limit_s = options.time_limit.as_secs(),
            "solving model"
        );
        let start = Instant::now();

        let solution = match backend {
            #[cfg(feature = "gurobi")]
            SolverBackend::Gurobi => crate::lp_solver::gurobi::solve_gurobi(self, options),

            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => crate::lp_solver::coin_cbc::solve_coin_cbc(self, options),
        }?;

        tracing::info!(
            status = %solution.status,
            objective = solution.objective_value,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "solver finished"
        );
        Ok(solution)
    }
}

impl<Brand> Default for LPModelBuilder<Brand> {
    fn default() -> Self {
        Self::new()
    }
}

// Macros for convenient syntax
pub mod macros;

// Operator overloading for linear expressions
pub mod ops;

pub mod solver_output;

#[cfg(feature = "gurobi")]
pub mod gurobi;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc;
