use std::sync::atomic::{AtomicUsize, Ordering};

use argmin::core::{CostFunction, Error as ArgminError, Executor, State};
use argmin::solver::neldermead::NelderMead;
use tracing::debug;

use super::{Bounds, Objective};
use crate::error::OptimizationError;

/// Simplex edge as a fraction of each coordinate's box width.
const SIMPLEX_SCALE: f64 = 0.05;
/// Standard deviation of vertex costs at which the simplex has collapsed.
const SD_TOLERANCE: f64 = 1e-6;
/// Iteration budget per decision variable.
const ITERATIONS_PER_DIMENSION: u64 = 200;

/// Refined point returned by [`nelder_mead`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polished {
    /// Best vertex, projected into the box.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub score: f64,
    /// Objective evaluations spent.
    pub evaluations: usize,
}

/// Evaluates the wrapped objective at the box projection of every vertex,
/// so the simplex may leave the box without the score doing so.
struct BoxedObjective<'a> {
    objective: &'a dyn Objective,
    bounds: &'a Bounds,
    evaluations: &'a AtomicUsize,
}

impl CostFunction for BoxedObjective<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, ArgminError> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let score = self.objective.evaluate(&self.bounds.clamp(x));
        Ok(if score.is_nan() { f64::INFINITY } else { score })
    }
}

/// Runs a Nelder–Mead search from `start`.
///
/// The initial simplex steps each coordinate by a fraction of its box
/// width, towards the interior when the step would cross the upper bound.
///
/// # Errors
///
/// Returns `OptimizationError::Polish` if the solver cannot be set up or
/// terminates with an error.
pub fn nelder_mead(
    objective: &dyn Objective,
    bounds: &Bounds,
    start: &[f64],
) -> Result<Polished, OptimizationError> {
    let origin = bounds.clamp(start);
    let mut simplex = Vec::with_capacity(origin.len() + 1);
    simplex.push(origin.clone());
    for (j, (&lo, &hi)) in bounds.lower().iter().zip(bounds.upper()).enumerate() {
        let step = SIMPLEX_SCALE * (hi - lo).max(f64::EPSILON);
        let mut vertex = origin.clone();
        vertex[j] = if vertex[j] + step <= hi {
            vertex[j] + step
        } else {
            vertex[j] - step
        };
        simplex.push(vertex);
    }

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(SD_TOLERANCE)
        .map_err(|e| OptimizationError::Polish(e.to_string()))?;
    let evaluations = AtomicUsize::new(0);
    let problem = BoxedObjective {
        objective,
        bounds,
        evaluations: &evaluations,
    };
    let max_iters = ITERATIONS_PER_DIMENSION * bounds.dim() as u64;

    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(max_iters))
        .run()
        .map_err(|e| OptimizationError::Polish(e.to_string()))?;

    let state = result.state();
    let Some(best) = state.get_best_param() else {
        return Err(OptimizationError::Polish("no vertex was evaluated".to_string()));
    };
    let evaluations = evaluations.load(Ordering::Relaxed);
    debug!(
        iterations = state.get_iter(),
        evaluations,
        score = state.get_best_cost(),
        "polish finished"
    );

    Ok(Polished {
        x: bounds.clamp(best),
        score: state.get_best_cost(),
        evaluations,
    })
}
