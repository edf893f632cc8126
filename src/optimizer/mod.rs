//! Minimizer contract: objective, box bounds, budget in; best vector and
//! a success flag out.

use crate::config::OptimizerConfig;
use crate::error::OptimizationError;

pub mod differential_evolution;
/// Local refinement of a global optimum.
pub mod polish;

pub use differential_evolution::DifferentialEvolution;

/// Scalar cost over a flat coordinate vector.
///
/// Implementations must be pure; minimizers evaluate them concurrently.
pub trait Objective: Sync {
    fn evaluate(&self, x: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn evaluate(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

/// Axis-aligned search box.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates a box from per-coordinate limits.
    ///
    /// # Errors
    ///
    /// Returns `OptimizationError::Minimizer` if the limits are empty,
    /// differ in length, are non-finite, or are inverted.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, OptimizationError> {
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(OptimizationError::Minimizer(format!(
                "bounds need matching non-empty limits, got {} lower and {} upper",
                lower.len(),
                upper.len()
            )));
        }
        for (i, (lo, hi)) in lower.iter().zip(&upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(OptimizationError::Minimizer(format!(
                    "invalid bound {i}: [{lo}, {hi}]"
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Projects `x` into the box.
    pub fn clamp(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&v, (&lo, &hi))| v.clamp(lo, hi))
            .collect()
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&v, (&lo, &hi))| v >= lo && v <= hi)
    }

    /// Maps a point of the unit cube onto the box.
    pub fn scale_unit(&self, u: &[f64]) -> Vec<f64> {
        u.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&s, (&lo, &hi))| lo + s * (hi - lo))
            .collect()
    }
}

/// Budget and tuning shared by all minimizers.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerSettings {
    pub max_generations: usize,
    pub population_per_dimension: usize,
    pub tolerance: f64,
    pub polish: bool,
    pub seed: u64,
    pub mutation: (f64, f64),
    pub recombination: f64,
}

impl From<&OptimizerConfig> for MinimizerSettings {
    fn from(config: &OptimizerConfig) -> Self {
        Self {
            max_generations: config.max_generations,
            population_per_dimension: config.population_per_dimension,
            tolerance: config.tolerance,
            polish: config.polish,
            seed: config.seed,
            mutation: config.mutation,
            recombination: config.recombination,
        }
    }
}

impl Default for MinimizerSettings {
    fn default() -> Self {
        Self::from(&OptimizerConfig::default())
    }
}

/// Result of a minimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeOutcome {
    /// Best vector found, inside the bounds.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub score: f64,
    /// Generations performed.
    pub generations: usize,
    /// Objective evaluations performed, polish included.
    pub evaluations: usize,
    /// Whether the convergence criterion was met within budget.
    pub converged: bool,
}

/// A global minimizer behind the `(objective, bounds, budget)` seam.
pub trait Minimizer {
    /// Searches `bounds` for the minimum of `objective`.
    ///
    /// # Errors
    ///
    /// Returns an `OptimizationError` if the search cannot run at all.
    /// Budget exhaustion is not an error; it is reported through
    /// [`MinimizeOutcome::converged`].
    fn minimize(
        &self,
        objective: &dyn Objective,
        bounds: &Bounds,
    ) -> Result<MinimizeOutcome, OptimizationError>;
}
