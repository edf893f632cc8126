//! Error types for simulation passes and optimization runs.

use thiserror::Error;

/// Failure of a single simulation pass.
///
/// Any pass that produces one of these is discarded as a whole; no partial
/// time series is ever handed back.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A state quantity became NaN or infinite.
    #[error("non-finite {quantity} at step {step}")]
    NonFinite {
        /// Time-step index where the value was produced.
        step: usize,
        /// Name of the offending quantity (`level`, `power`, `cost`, ...).
        quantity: &'static str,
    },
    /// The raw coordinate vector cannot be decoded into a schedule.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}

/// Failure of an optimization run for one scenario and cycle count.
#[derive(Debug, Error)]
pub enum OptimizationError {
    /// The generation budget ran out before the population converged.
    #[error("population did not converge within {generations} generations")]
    NotConverged {
        /// Generations performed.
        generations: usize,
    },
    /// The minimizer rejected its input or failed internally.
    #[error("minimizer failed: {0}")]
    Minimizer(String),
    /// The local polish step failed.
    #[error("polish failed: {0}")]
    Polish(String),
    /// Re-simulating the accepted optimum did not yield a valid result.
    #[error("accepted optimum could not be simulated: {0}")]
    Simulation(#[from] SimulationError),
}
