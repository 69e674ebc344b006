//! An [`Oracle`] backed by the Pumpkin constraint solver.
//!
//! Every solve translates the [`Model`] into a fresh [`Solver`]. A pair of intervals in a
//! no-overlap constraint becomes two half-reified orderings `a + size(a) <= b` and
//! `b + size(b) <= a`, of which one has to hold unless an interval is absent. A cumulative
//! constraint maps onto Pumpkin's time-table cumulative. The objective is a domain tied to the
//! linear expression by an equality and is minimised with the chosen [`OptimisationStrategy`].
//!
//! Hints are followed through a warm-start brancher, after which the default brancher of the
//! solver takes over.
mod gap_limit;
mod translation;

use std::cell::Cell;
use std::cell::RefCell;
use std::time::Duration;
use std::time::Instant;

use log::debug;
use log::error;
use pumpkin_core::branching::branchers::dynamic_brancher::DynamicBrancher;
use pumpkin_core::branching::branchers::warm_start::WarmStart;
use pumpkin_core::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_core::optimisation::linear_unsat_sat::LinearUnsatSat;
use pumpkin_core::optimisation::OptimisationDirection;
use pumpkin_core::optimisation::OptimisationStrategy;
use pumpkin_core::results::OptimisationResult;
use pumpkin_core::results::ProblemSolution;
use pumpkin_core::results::SolutionReference;
use pumpkin_core::statistics::log_statistic;
use pumpkin_core::termination::Combinator;
use pumpkin_core::termination::TimeBudget;
use pumpkin_core::variables::AffineView;
use pumpkin_core::variables::DomainId;
use pumpkin_core::Solver;

use self::gap_limit::is_within_gap;
use self::gap_limit::GapLimit;
use self::translation::translate;
use self::translation::Translation;
use self::translation::TranslationError;
use crate::containers::KeyedVec;
use crate::model::IntVar;
use crate::model::Model;
use crate::oracle::Oracle;
use crate::oracle::SolutionCallback;
use crate::oracle::SolveLimits;
use crate::results::Solution;
use crate::results::SolutionProgress;
use crate::results::SolveOutcome;

/// Options which influence the search, but not its result.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct SearchOptions {
    /// Determines how the solver drives the objective to its optimum.
    #[cfg_attr(
        feature = "clap",
        arg(long = "optimisation-strategy", value_enum, default_value_t)
    )]
    pub optimisation_strategy: OptimisationStrategy,
}

/// Counters kept over all solves of one [`PumpkinOracle`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveStatistics {
    pub num_solves: usize,
    pub num_solutions: usize,
    pub time_spent: Duration,
}

impl SolveStatistics {
    pub fn log(&self) {
        log_statistic("solves", self.num_solves);
        log_statistic("solutions", self.num_solutions);
        log_statistic("timeSpentInSolverInMilliseconds", self.time_spent.as_millis());
    }
}

/// The oracle which ships with this crate; see the module documentation.
#[derive(Debug, Default)]
pub struct PumpkinOracle {
    options: SearchOptions,
    statistics: SolveStatistics,
}

impl PumpkinOracle {
    pub fn new(options: SearchOptions) -> Self {
        PumpkinOracle {
            options,
            statistics: SolveStatistics::default(),
        }
    }

    pub fn statistics(&self) -> &SolveStatistics {
        &self.statistics
    }

    pub fn log_statistics(&self) {
        self.statistics.log();
    }

    fn optimise(
        &mut self,
        model: &Model,
        translation: Translation,
        limits: &SolveLimits,
        callback: &mut dyn SolutionCallback,
    ) -> SolveOutcome {
        let Translation {
            mut solver,
            views,
            objective,
            objective_lower_bound,
        } = translation;

        let (hinted_variables, hinted_values): (Vec<_>, Vec<_>) = model
            .hints()
            .iter()
            .map(|&(variable, value)| (views[variable], value))
            .unzip();
        let mut brancher = DynamicBrancher::new(vec![
            Box::new(WarmStart::new(&hinted_variables, &hinted_values)),
            Box::new(solver.default_brancher()),
        ]);

        let solution_count = Cell::new(0_usize);
        let gap_reached = Cell::new(false);
        let callback = RefCell::new(callback);
        let on_solution = |_: &Solver, solution: SolutionReference<'_>, _: &DynamicBrancher| {
            let solution = extract_solution(&views, &solution);
            let objective_value = evaluate_objective(model, &solution);
            solution_count.set(solution_count.get() + 1);
            if is_within_gap(
                objective_value,
                objective_lower_bound,
                limits.absolute_gap_limit,
            ) {
                gap_reached.set(true);
            }
            debug!(
                "Solution {} with objective {objective_value}",
                solution_count.get()
            );

            callback.borrow_mut().on_solution(SolutionProgress {
                solution: &solution,
                objective_value,
                best_bound: Some(objective_lower_bound),
                solution_count: solution_count.get(),
            });
        };

        let mut termination = Combinator::new(
            limits.time_limit.map(TimeBudget::starting_now),
            GapLimit::new(&gap_reached),
        );

        let result = match self.options.optimisation_strategy {
            OptimisationStrategy::LinearSatUnsat => solver.optimise(
                &mut brancher,
                &mut termination,
                LinearSatUnsat::new(OptimisationDirection::Minimise, objective, on_solution),
            ),
            OptimisationStrategy::LinearUnsatSat => solver.optimise(
                &mut brancher,
                &mut termination,
                LinearUnsatSat::new(OptimisationDirection::Minimise, objective, on_solution),
            ),
        };
        self.statistics.num_solutions += solution_count.get();

        match result {
            OptimisationResult::Optimal(solution) => {
                let solution = extract_solution(&views, &solution);
                let objective_value = evaluate_objective(model, &solution);
                SolveOutcome::Optimal {
                    solution,
                    objective_value,
                }
            }
            OptimisationResult::Satisfiable(solution) => {
                let solution = extract_solution(&views, &solution);
                let objective_value = evaluate_objective(model, &solution);
                // Stopped by a limit, but no better objective exists.
                if objective_value <= objective_lower_bound {
                    SolveOutcome::Optimal {
                        solution,
                        objective_value,
                    }
                } else {
                    SolveOutcome::Feasible {
                        solution,
                        objective_value,
                        best_bound: objective_lower_bound,
                    }
                }
            }
            OptimisationResult::Unsatisfiable => SolveOutcome::Infeasible,
            OptimisationResult::Unknown => SolveOutcome::Unknown,
        }
    }
}

impl Oracle for PumpkinOracle {
    fn solve(
        &mut self,
        model: &Model,
        limits: &SolveLimits,
        callback: &mut dyn SolutionCallback,
    ) -> SolveOutcome {
        let started_at = Instant::now();

        let outcome = match translate(model) {
            Ok(translation) => {
                debug!(
                    "Translated {} variables and {} constraints",
                    model.num_variables(),
                    model.constraints().len()
                );
                self.optimise(model, translation, limits, callback)
            }
            Err(TranslationError::Infeasible) => {
                debug!("The model is infeasible at the root");
                SolveOutcome::Infeasible
            }
            Err(error) => {
                error!("The model cannot be handed to the solver: {error}");
                SolveOutcome::Unknown
            }
        };

        self.statistics.num_solves += 1;
        self.statistics.time_spent += started_at.elapsed();
        outcome
    }
}

fn extract_solution(
    views: &KeyedVec<IntVar, AffineView<DomainId>>,
    solution: &impl ProblemSolution,
) -> Solution {
    views
        .iter()
        .map(|&view| solution.get_integer_value(view))
        .collect()
}

fn evaluate_objective(model: &Model, solution: &Solution) -> i64 {
    model.objective().map_or(0, |objective| {
        objective.evaluate(|variable| solution.get_integer_value(variable))
    })
}
