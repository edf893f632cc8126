//! Scalar objective over raw schedule coordinates.

use crate::config::SimulationConfig;
use crate::devices::DemandScenario;
use crate::error::SimulationError;
use crate::optimizer::Objective;
use crate::sim::{Schedule, SimulationOutcome, Simulator};

/// Score returned when a candidate cannot be simulated.
pub const WORST_SCORE: f64 = f64::INFINITY;

/// Additive parts of an objective value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Terminal cumulative cost, violation penalty included.
    pub terminal_cost: f64,
    /// Quadratic term for the lowest level below the tank floor.
    pub floor_excess: f64,
    /// Quadratic term for the highest level above the tank ceiling.
    pub ceiling_excess: f64,
    /// Quadratic term for the terminal level differing from the initial one.
    pub drift: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.terminal_cost + self.floor_excess + self.ceiling_excess + self.drift
    }
}

/// Maps `2N` coordinates (N starts, then N durations) to a cost to minimize.
///
/// Pure: the same vector always yields the same score, and evaluations
/// share nothing mutable.
#[derive(Debug, Clone)]
pub struct ObjectiveFunction {
    simulator: Simulator,
    cycles: usize,
    floor: f64,
    ceiling: f64,
    weight: f64,
}

impl ObjectiveFunction {
    pub fn new(config: &SimulationConfig, scenario: DemandScenario, cycles: usize) -> Self {
        Self {
            simulator: Simulator::new(config, scenario),
            cycles,
            floor: config.tank.min_level,
            ceiling: config.tank.max_level,
            weight: config.penalty.constraint_weight,
        }
    }

    pub const fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// Number of pump cycles per schedule.
    pub const fn cycles(&self) -> usize {
        self.cycles
    }

    /// Number of decision variables.
    pub const fn dimension(&self) -> usize {
        2 * self.cycles
    }

    /// Decodes `x` into a schedule of the configured cycle count.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidSchedule` if `x` does not hold
    /// exactly `2N` coordinates.
    pub fn decode(&self, x: &[f64]) -> Result<Schedule, SimulationError> {
        if x.len() != self.dimension() {
            return Err(SimulationError::InvalidSchedule(format!(
                "expected {} coordinates for {} cycles, got {}",
                self.dimension(),
                self.cycles,
                x.len()
            )));
        }
        Schedule::from_coordinates(x)
    }

    /// Decodes and simulates `x`.
    ///
    /// # Errors
    ///
    /// Propagates decoding and simulation failures.
    pub fn simulate(&self, x: &[f64]) -> Result<SimulationOutcome, SimulationError> {
        let schedule = self.decode(x)?;
        self.simulator.run(&schedule)
    }

    /// Splits the score of a completed run into its terms.
    pub fn breakdown(&self, outcome: &SimulationOutcome) -> ScoreBreakdown {
        let series = &outcome.series;
        let terminal_cost = series.terminal_cost().unwrap_or(WORST_SCORE);
        let initial = series.initial_level().unwrap_or(0.0);
        let terminal = series.terminal_level().unwrap_or(initial);
        let min_level = series.min_level().unwrap_or(initial);
        let max_level = series.max_level().unwrap_or(initial);

        let floor_excess = if min_level < self.floor {
            self.weight * (self.floor - min_level).powi(2)
        } else {
            0.0
        };
        let ceiling_excess = if max_level > self.ceiling {
            self.weight * (max_level - self.ceiling).powi(2)
        } else {
            0.0
        };

        ScoreBreakdown {
            terminal_cost,
            floor_excess,
            ceiling_excess,
            drift: self.weight * (terminal - initial).powi(2),
        }
    }

    /// Objective value of `x`; [`WORST_SCORE`] when it cannot be simulated.
    pub fn score(&self, x: &[f64]) -> f64 {
        match self.simulate(x) {
            Ok(outcome) => {
                let total = self.breakdown(&outcome).total();
                if total.is_nan() { WORST_SCORE } else { total }
            }
            Err(_) => WORST_SCORE,
        }
    }
}

impl Objective for ObjectiveFunction {
    fn evaluate(&self, x: &[f64]) -> f64 {
        self.score(x)
    }
}
