//! Mixed-integer formulation of the social golfer problem.
//!
//! # Variables
//!
//! - `x[w, g, p]`: binary, golfer `p` plays in group `g` in week `w`
//! - `meet[w, g, p0, p1]`: binary tied to `x[w, g, p0] AND x[w, g, p1]`, `p0 < p1`
//! - `over[p0, p1]`: integer, redundant meetings of the pair
//!
//! # Constraints
//!
//! - each week every golfer plays in exactly one group
//! - each week every group holds exactly `group_size` golfers
//! - `over[p0, p1] >= Σ meet[·, ·, p0, p1] - 1`, `over >= 0`
//!
//! The objective minimises `Σ over`, so at an optimum each `over` equals
//! `max(0, meetings - 1)`.
//!
//! Indexed variables live in flat vectors; offsets are computed from the
//! instance sizes.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use golfer::{Instance, lp_solver::SolveOptions, model::GolferModel};
//!
//! let instance: Instance = "3 2 2".parse()?;
//! let solved = GolferModel::build(&instance).solve(&SolveOptions::default())?;
//! println!("{} redundant meetings", solved.objective);
//! # Ok(())
//! # }
//! ```

use crate::AppError;
use crate::instance::Instance;
use crate::lp_solver::*;
use crate::schedule::{Schedule, SolvedSchedule};
use crate::constraint;


/// `x[w, g, p]` for every week, group and golfer.
pub struct AssignmentVars<Brand> {
    instance: Instance,
    vars: Vec<VariableId<Brand>>,
}

impl<Brand> AssignmentVars<Brand> {
    fn offset(&self, week: usize, group: usize, golfer: usize) -> usize {
        (week * self.instance.groups() + group) * self.instance.golfers() + golfer
    }

    pub fn get(&self, week: usize, group: usize, golfer: usize) -> VariableId<Brand> {
        self.vars[self.offset(week, group, golfer)]
    }

    /// All golfer variables of group `group` in week `week`.
    pub fn group(&self, week: usize, group: usize) -> &[VariableId<Brand>] {
        let start = self.offset(week, group, 0);
        &self.vars[start..start + self.instance.golfers()]
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// `meet[w, g, p0, p1]` for every week, group and pair `p0 < p1`.
pub struct MeetingVars<Brand> {
    instance: Instance,
    vars: Vec<VariableId<Brand>>,
}

impl<Brand> MeetingVars<Brand> {
    pub fn get(&self, week: usize, group: usize, p0: usize, p1: usize) -> VariableId<Brand> {
        let slot = week * self.instance.groups() + group;
        self.vars[slot * self.instance.pairs() + self.instance.pair_index(p0, p1)]
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// One boolean per (week, group, golfer) triple.
pub fn create_variables<Brand>(
    builder: &mut LPModelBuilder<Brand>,
    instance: &Instance,
) -> AssignmentVars<Brand> {
    let count = instance.weeks() * instance.groups() * instance.golfers();
    AssignmentVars {
        instance: *instance,
        vars: (0..count).map(|_| builder.add_binary()).collect(),
    }
}

/// Each week, each golfer is assigned to exactly one group.
pub fn add_assignment_constraints<Brand>(
    builder: &mut LPModelBuilder<Brand>,
    x: &AssignmentVars<Brand>,
) {
    let instance = &x.instance;
    for w in 0..instance.weeks() {
        for p in 0..instance.golfers() {
            let plays: LinearExpression<Brand> =
                (0..instance.groups()).map(|g| x.get(w, g, p)).sum();
            builder.add_constraint(constraint!((plays) == 1.0));
        }
    }
}

/// Each week, each group holds exactly `group_size` golfers.
pub fn add_group_size_constraints<Brand>(
    builder: &mut LPModelBuilder<Brand>,
    x: &AssignmentVars<Brand>,
) {
    let instance = &x.instance;
    for w in 0..instance.weeks() {
        for g in 0..instance.groups() {
            let occupancy: LinearExpression<Brand> = x.group(w, g).iter().copied().sum();
            builder.add_constraint(constraint!((occupancy) == instance.group_size() as f64));
        }
    }
}

/// `meet[w, g, p0, p1] = x[w, g, p0] AND x[w, g, p1]` for every pair.
pub fn build_meeting_indicators<Brand>(
    builder: &mut LPModelBuilder<Brand>,
    x: &AssignmentVars<Brand>,
) -> MeetingVars<Brand> {
    let instance = &x.instance;
    let golfers = instance.golfers();
    let mut vars =
        Vec::with_capacity(instance.weeks() * instance.groups() * instance.pairs());

    for w in 0..instance.weeks() {
        for g in 0..instance.groups() {
            for p0 in 0..golfers {
                for p1 in p0 + 1..golfers {
                    vars.push(builder.add_conjunction(x.get(w, g, p0), x.get(w, g, p1)));
                }
            }
        }
    }

    MeetingVars {
        instance: *instance,
        vars,
    }
}

/// `over[p0, p1] = max(Σ_{w, g} meet[w, g, p0, p1] - 1, 0)`, indexed by pair.
pub fn build_redundancy_terms<Brand>(
    builder: &mut LPModelBuilder<Brand>,
    meet: &MeetingVars<Brand>,
) -> Vec<VariableId<Brand>> {
    let instance = &meet.instance;
    let golfers = instance.golfers();
    // A pair meets at most once a week
    let upper = instance.weeks().saturating_sub(1) as f64;

    let mut over = Vec::with_capacity(instance.pairs());
    for p0 in 0..golfers {
        for p1 in p0 + 1..golfers {
            let meetings: LinearExpression<Brand> = (0..instance.weeks())
                .flat_map(|w| (0..instance.groups()).map(move |g| (w, g)))
                .map(|(w, g)| meet.get(w, g, p0, p1))
                .sum();
            over.push(builder.add_positive_part(meetings - 1.0, upper));
        }
    }
    over
}

/// Minimise the total number of redundant meetings.
pub fn build_objective<Brand>(
    builder: &mut LPModelBuilder<Brand>,
    over: &[VariableId<Brand>],
) -> LinearExpression<Brand> {
    let objective: LinearExpression<Brand> = over.iter().copied().sum();
    builder.minimise(objective.clone());
    objective
}

/// Sizes of a built model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStats {
    pub assignment_vars: usize,
    pub meeting_vars: usize,
    pub redundancy_vars: usize,
    pub constraints: usize,
}

/// A social golfer model ready to hand to an engine.
pub struct GolferModel<Brand> {
    instance: Instance,
    builder: LPModelBuilder<Brand>,
    x: AssignmentVars<Brand>,
    meet: MeetingVars<Brand>,
    over: Vec<VariableId<Brand>>,
    objective: LinearExpression<Brand>,
}

/// Brand of models built by [`GolferModel::build`].
pub struct ScheduleModel;

impl GolferModel<ScheduleModel> {
    /// Build the complete model for `instance`.
    pub fn build(instance: &Instance) -> Self {
        Self::build_on(LPModelBuilder::new(), instance)
    }
}

impl<Brand> GolferModel<Brand> {
    /// Build the complete model on an empty builder.
    pub fn build_on(mut builder: LPModelBuilder<Brand>, instance: &Instance) -> Self {
        let x = create_variables(&mut builder, instance);
        add_assignment_constraints(&mut builder, &x);
        add_group_size_constraints(&mut builder, &x);
        let meet = build_meeting_indicators(&mut builder, &x);
        let over = build_redundancy_terms(&mut builder, &meet);
        let objective = build_objective(&mut builder, &over);

        let model = Self {
            instance: *instance,
            builder,
            x,
            meet,
            over,
            objective,
        };
        let stats = model.stats();
        tracing::info!(
            assignment_vars = stats.assignment_vars,
            meeting_vars = stats.meeting_vars,
            redundancy_vars = stats.redundancy_vars,
            constraints = stats.constraints,
            "model built"
        );
        model
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            assignment_vars: self.x.len(),
            meeting_vars: self.meet.len(),
            redundancy_vars: self.over.len(),
            constraints: self.builder.num_constraints(),
        }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn assignment(&self) -> &AssignmentVars<Brand> {
        &self.x
    }

    pub fn meetings(&self) -> &MeetingVars<Brand> {
        &self.meet
    }

    pub fn redundancy(&self) -> &[VariableId<Brand>] {
        &self.over
    }

    pub fn objective(&self) -> &LinearExpression<Brand> {
        &self.objective
    }

    pub fn builder(&self) -> &LPModelBuilder<Brand> {
        &self.builder
    }

    /// Solve with the backend picked from the environment and decode the schedule.
    pub fn solve(&self, options: &SolveOptions) -> anyhow::Result<SolvedSchedule> {
        let solution = self.builder.solve(options)?;
        self.decode(&solution)
    }

    /// Read the schedule back from a solution of this model.
    pub fn decode(&self, solution: &LPSolution<Brand>) -> anyhow::Result<SolvedSchedule> {
        if solution.status == OptimisationStatus::Infeasible {
            return Err(AppError::Infeasible.into());
        }

        let instance = &self.instance;
        let mut groups = Vec::with_capacity(instance.weeks() * instance.groups());
        for w in 0..instance.weeks() {
            for g in 0..instance.groups() {
                let members: Vec<usize> = self
                    .x
                    .group(w, g)
                    .iter()
                    .enumerate()
                    .filter(|&(_, &var)| solution.get_bool(var).unwrap_or(false))
                    .map(|(p, _)| p)
                    .collect();
                groups.push(members);
            }
        }
        let schedule = Schedule::from_slots(*instance, groups);

        if let Err(violation) = schedule.check_partition() {
            tracing::warn!(status = %solution.status, %violation, "solver returned no usable schedule");
            return Err(AppError::NoSolution(solution.status).into());
        }

        let objective = schedule.redundant_meetings();
        if (solution.objective_value - objective as f64).abs() > 0.5 {
            tracing::warn!(
                reported = solution.objective_value,
                recomputed = objective,
                "solver objective differs from the schedule's redundant meetings"
            );
        }

        Ok(SolvedSchedule {
            objective,
            status: solution.status,
            schedule,
        })
    }
}
