//! Optimization of a pump schedule for one demand scenario and cycle count.

use tracing::{error, info, warn};

use crate::config::SimulationConfig;
use crate::devices::DemandScenario;
use crate::error::OptimizationError;
use crate::objective::ObjectiveFunction;
use crate::optimizer::{Bounds, DifferentialEvolution, Minimizer, MinimizerSettings};
use crate::sim::kpi::KpiReport;
use crate::sim::{Schedule, SimulationOutcome};

/// An accepted optimum together with its full simulation.
#[derive(Debug, Clone)]
pub struct Solution {
    pub scenario: DemandScenario,
    pub cycles: usize,
    /// Decoded optimum, in coordinate order.
    pub schedule: Schedule,
    /// Re-simulation of the optimum.
    pub outcome: SimulationOutcome,
    pub kpi: KpiReport,
    /// Objective value of the optimum.
    pub score: f64,
    pub generations: usize,
    pub evaluations: usize,
}

/// Builds the search box for a schedule, hands it to a minimizer, and
/// accepts the result only when the minimizer reports convergence.
#[derive(Debug, Clone)]
pub struct OptimizationDriver<M = DifferentialEvolution> {
    config: SimulationConfig,
    minimizer: M,
}

impl OptimizationDriver {
    /// Creates a driver using differential evolution tuned by
    /// `config.optimizer`.
    pub fn new(config: SimulationConfig) -> Self {
        let minimizer = DifferentialEvolution::new(MinimizerSettings::from(&config.optimizer));
        Self { config, minimizer }
    }
}

impl<M: Minimizer> OptimizationDriver<M> {
    pub fn with_minimizer(config: SimulationConfig, minimizer: M) -> Self {
        Self { config, minimizer }
    }

    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Search box for `cycles` cycles: starts in `[0, horizon - step]`,
    /// then durations in `[min_duration, max_duration]`.
    ///
    /// # Errors
    ///
    /// Returns `OptimizationError::Minimizer` for zero cycles or an empty box.
    pub fn bounds(&self, cycles: usize) -> Result<Bounds, OptimizationError> {
        if cycles == 0 {
            return Err(OptimizationError::Minimizer(
                "a schedule needs at least one cycle".to_string(),
            ));
        }
        let latest_start = self.config.time.horizon - self.config.time.step;
        let durations = &self.config.cycles;

        let mut lower = vec![0.0; cycles];
        lower.extend(std::iter::repeat_n(durations.min_duration, cycles));
        let mut upper = vec![latest_start; cycles];
        upper.extend(std::iter::repeat_n(durations.max_duration, cycles));
        Bounds::new(lower, upper)
    }

    /// Optimizes the schedule for `scenario` with `cycles` cycles.
    ///
    /// # Errors
    ///
    /// Returns `OptimizationError::NotConverged` when the generation budget
    /// runs out, and propagates minimizer and re-simulation failures. No
    /// partial result is returned in either case.
    pub fn optimize(
        &self,
        scenario: DemandScenario,
        cycles: usize,
    ) -> Result<Solution, OptimizationError> {
        self.try_optimize(scenario, cycles).inspect_err(|e| {
            error!(%scenario, cycles, error = %e, "no solution found");
        })
    }

    fn try_optimize(
        &self,
        scenario: DemandScenario,
        cycles: usize,
    ) -> Result<Solution, OptimizationError> {
        let bounds = self.bounds(cycles)?;
        let objective = ObjectiveFunction::new(&self.config, scenario, cycles);
        info!(%scenario, cycles, "optimizing pump schedule");

        let result = self.minimizer.minimize(&objective, &bounds)?;
        if !result.converged {
            return Err(OptimizationError::NotConverged {
                generations: result.generations,
            });
        }

        let schedule = objective.decode(&result.x)?;
        let outcome = objective.simulator().run(&schedule)?;
        report_violations(scenario, cycles, &outcome);

        let kpi = KpiReport::from_outcome(&outcome, self.config.time.step);
        info!(
            %scenario,
            cycles,
            score = result.score,
            cost = kpi.total_cost,
            generations = result.generations,
            evaluations = result.evaluations,
            "optimization finished"
        );

        Ok(Solution {
            scenario,
            cycles,
            schedule,
            outcome,
            kpi,
            score: result.score,
            generations: result.generations,
            evaluations: result.evaluations,
        })
    }
}

/// Logs the penalty and the offending hours of an accepted solution.
fn report_violations(scenario: DemandScenario, cycles: usize, outcome: &SimulationOutcome) {
    if outcome.violations.is_empty() {
        return;
    }
    warn!(
        %scenario,
        cycles,
        penalty = outcome.penalty,
        hours = ?outcome.violations.hours(),
        "accepted schedule leaves the level band"
    );
}
